//! Trajectory shape functions.
//!
//! A [`ShapePath`] maps a phase in `[0, 1)` to an offset from the trajectory
//! center. Closed shapes return to their start at phase 1; open shapes do
//! not, so wrapping playback modes jump back to the start.
//!
//! Validation happens once, in [`ShapePath::new`]. Sampling never fails.

use std::f32::consts::{FRAC_PI_2, TAU};

use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::Vector3;

/// Minimum length for a line trajectory.
const MIN_LINE_LENGTH: f32 = 1e-6;

/// Named trajectory shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryShape {
    Circle,
    FigureEight,
    Lissajous,
    Rose,
    TorusKnot,
    Spiral,
    Line,
    Helix,
    Wave,
    RandomWalk,
}

impl TrajectoryShape {
    pub fn name(self) -> &'static str {
        match self {
            TrajectoryShape::Circle => "circle",
            TrajectoryShape::FigureEight => "figure_eight",
            TrajectoryShape::Lissajous => "lissajous",
            TrajectoryShape::Rose => "rose",
            TrajectoryShape::TorusKnot => "torus_knot",
            TrajectoryShape::Spiral => "spiral",
            TrajectoryShape::Line => "line",
            TrajectoryShape::Helix => "helix",
            TrajectoryShape::Wave => "wave",
            TrajectoryShape::RandomWalk => "random_walk",
        }
    }

    /// `true` when `shape(0) == shape(1)`.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            TrajectoryShape::Circle
                | TrajectoryShape::FigureEight
                | TrajectoryShape::Lissajous
                | TrajectoryShape::Rose
                | TrajectoryShape::TorusKnot
        )
    }
}

/// Shape parameters. Fields a shape does not use are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeParams {
    /// Per-axis scale (radius for circular shapes).
    pub size: Vector3,
    /// Trajectory center. `None` lets the caller pick (source position or macro centroid).
    pub center: Option<Vector3>,
    /// Lissajous frequency ratios per axis.
    pub frequencies: Vector3,
    /// Rose petal parameter `k` in `r = cos(kθ)`.
    pub petals: u32,
    /// Torus knot winding numbers `(p, q)`.
    pub knot: (u32, u32),
    /// Revolutions over one phase cycle (spiral, helix, wave).
    pub turns: f32,
    /// Direction and length of a line, from the center.
    pub extent: Vector3,
    /// Control point count for the random walk.
    pub walk_points: usize,
    /// Seed for the random walk.
    pub seed: u64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        ShapeParams {
            size: Vector3::ONE,
            center: None,
            frequencies: Vector3::new(3.0, 2.0, 0.0),
            petals: 3,
            knot: (2, 3),
            turns: 3.0,
            extent: Vector3::X,
            walk_points: 8,
            seed: 0,
        }
    }
}

impl ShapeParams {
    pub fn with_size(mut self, size: Vector3) -> Self {
        self.size = size;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.size = Vector3::splat(radius);
        self
    }

    pub fn with_center(mut self, center: Vector3) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_extent(mut self, extent: Vector3) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_walk(mut self, points: usize, seed: u64) -> Self {
        self.walk_points = points;
        self.seed = seed;
        self
    }
}

/// A validated shape ready for sampling.
#[derive(Clone, Debug)]
pub struct ShapePath {
    shape: TrajectoryShape,
    params: ShapeParams,
    /// Random-walk control points, empty for every other shape.
    points: Vec<Vector3>,
}

impl ShapePath {
    /// Validate `params` for `shape` and precompute what sampling needs.
    pub fn new(shape: TrajectoryShape, params: ShapeParams) -> Result<Self, MathError> {
        let degenerate = |reason: &str| MathError::DegenerateShape {
            shape: shape.name(),
            reason: reason.to_string(),
        };

        if !params.size.is_finite() {
            return Err(degenerate("size must be finite"));
        }
        if params.center.is_some_and(|c| !c.is_finite()) {
            return Err(degenerate("center must be finite"));
        }

        let mut points = Vec::new();
        match shape {
            TrajectoryShape::Line => {
                if !params.extent.is_finite() || params.extent.length() < MIN_LINE_LENGTH {
                    return Err(degenerate("zero-length line"));
                }
            }
            TrajectoryShape::RandomWalk => {
                if params.walk_points < 2 {
                    return Err(degenerate("random walk needs at least two points"));
                }
                points = random_walk_points(params.walk_points, params.size, params.seed);
            }
            TrajectoryShape::Lissajous => {
                if !params.frequencies.is_finite() || params.frequencies == Vector3::ZERO {
                    return Err(degenerate("all frequencies are zero"));
                }
            }
            TrajectoryShape::TorusKnot => {
                if params.knot.0 == 0 || params.knot.1 == 0 {
                    return Err(degenerate("winding numbers must be non-zero"));
                }
            }
            TrajectoryShape::Spiral | TrajectoryShape::Helix | TrajectoryShape::Wave => {
                if !params.turns.is_finite() {
                    return Err(degenerate("turns must be finite"));
                }
            }
            TrajectoryShape::Circle | TrajectoryShape::FigureEight | TrajectoryShape::Rose => {}
        }

        Ok(ShapePath {
            shape,
            params,
            points,
        })
    }

    pub fn shape(&self) -> TrajectoryShape {
        self.shape
    }

    pub fn params(&self) -> &ShapeParams {
        &self.params
    }

    /// Offset from the trajectory center at `phase`.
    pub fn sample(&self, phase: f32) -> Vector3 {
        let p = if phase.is_finite() {
            phase.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let s = self.params.size;
        let theta = TAU * p;
        let offset = match self.shape {
            TrajectoryShape::Circle => Vector3::new(s.x * theta.cos(), s.y * theta.sin(), 0.0),
            TrajectoryShape::FigureEight => Vector3::new(
                s.x * theta.sin(),
                s.y * theta.sin() * theta.cos(),
                0.0,
            ),
            TrajectoryShape::Lissajous => {
                let f = self.params.frequencies;
                Vector3::new(
                    s.x * (f.x * theta + FRAC_PI_2).sin(),
                    s.y * (f.y * theta).sin(),
                    s.z * (f.z * theta).sin(),
                )
            }
            TrajectoryShape::Rose => {
                let r = (self.params.petals as f32 * theta).cos();
                Vector3::new(s.x * r * theta.cos(), s.y * r * theta.sin(), 0.0)
            }
            TrajectoryShape::TorusKnot => {
                let (kp, kq) = (self.params.knot.0 as f32, self.params.knot.1 as f32);
                let r = 2.0 + (kq * theta).cos();
                Vector3::new(
                    s.x * r * (kp * theta).cos() / 3.0,
                    s.y * r * (kp * theta).sin() / 3.0,
                    -s.z * (kq * theta).sin() / 3.0,
                )
            }
            TrajectoryShape::Spiral => {
                let a = self.params.turns * theta;
                Vector3::new(s.x * p * a.cos(), s.y * p * a.sin(), 0.0)
            }
            TrajectoryShape::Line => self.params.extent * p,
            TrajectoryShape::Helix => {
                let a = self.params.turns * theta;
                Vector3::new(s.x * a.cos(), s.y * a.sin(), s.z * p)
            }
            TrajectoryShape::Wave => Vector3::new(
                s.x * (2.0 * p - 1.0),
                s.y * (self.params.turns * theta).sin(),
                0.0,
            ),
            TrajectoryShape::RandomWalk => catmull_rom(&self.points, p),
        };
        if offset.is_finite() { offset } else { Vector3::ZERO }
    }
}

fn random_walk_points(count: usize, size: Vector3, seed: u64) -> Vec<Vector3> {
    let mut rng = Rng::with_seed(seed);
    let mut current = Vector3::ZERO;
    let mut points = Vec::with_capacity(count);
    points.push(current);
    for _ in 1..count {
        let step = Vector3::new(
            rng.f32() * 2.0 - 1.0,
            rng.f32() * 2.0 - 1.0,
            rng.f32() * 2.0 - 1.0,
        );
        current += step * size;
        points.push(current);
    }
    points
}

/// Sample a Catmull-Rom spline through `points` at `t` in `[0, 1]`.
fn catmull_rom(points: &[Vector3], t: f32) -> Vector3 {
    match points.len() {
        0 => return Vector3::ZERO,
        1 => return points[0],
        _ => {}
    }
    let segments = points.len() - 1;
    let scaled = t * segments as f32;
    let i = (scaled.floor() as usize).min(segments - 1);
    let u = scaled - i as f32;

    let p0 = points[i.saturating_sub(1)];
    let p1 = points[i];
    let p2 = points[i + 1];
    let p3 = points[(i + 2).min(points.len() - 1)];

    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn vec_approx_eq(a: Vector3, b: Vector3) -> bool {
        (a - b).length() < EPSILON
    }

    const ALL_SHAPES: [TrajectoryShape; 10] = [
        TrajectoryShape::Circle,
        TrajectoryShape::FigureEight,
        TrajectoryShape::Lissajous,
        TrajectoryShape::Rose,
        TrajectoryShape::TorusKnot,
        TrajectoryShape::Spiral,
        TrajectoryShape::Line,
        TrajectoryShape::Helix,
        TrajectoryShape::Wave,
        TrajectoryShape::RandomWalk,
    ];

    #[test]
    fn test_closed_shapes_return_to_start() {
        for shape in ALL_SHAPES.into_iter().filter(|s| s.is_closed()) {
            let path = ShapePath::new(shape, ShapeParams::default()).unwrap();
            assert!(
                vec_approx_eq(path.sample(0.0), path.sample(1.0)),
                "{:?} should be closed",
                shape
            );
        }
    }

    #[test]
    fn test_all_shapes_sample_finite() {
        for shape in ALL_SHAPES {
            let path = ShapePath::new(shape, ShapeParams::default()).unwrap();
            for i in 0..=100 {
                let v = path.sample(i as f32 / 100.0);
                assert!(v.is_finite(), "{:?} produced {:?}", shape, v);
            }
        }
    }

    #[test]
    fn test_circle_radius() {
        let path = ShapePath::new(TrajectoryShape::Circle, ShapeParams::default().with_radius(2.5))
            .unwrap();
        for i in 0..16 {
            let v = path.sample(i as f32 / 16.0);
            assert!((v.length() - 2.5).abs() < EPSILON);
        }
        assert!(vec_approx_eq(path.sample(0.25), Vector3::new(0.0, 2.5, 0.0)));
    }

    #[test]
    fn test_line_interpolates_extent() {
        let params = ShapeParams::default().with_extent(Vector3::new(4.0, 0.0, 2.0));
        let path = ShapePath::new(TrajectoryShape::Line, params).unwrap();
        assert!(vec_approx_eq(path.sample(0.5), Vector3::new(2.0, 0.0, 1.0)));
        assert!(!TrajectoryShape::Line.is_closed());
    }

    #[test]
    fn test_zero_length_line_is_degenerate() {
        let params = ShapeParams::default().with_extent(Vector3::ZERO);
        let err = ShapePath::new(TrajectoryShape::Line, params).unwrap_err();
        assert!(matches!(err, MathError::DegenerateShape { shape: "line", .. }));
    }

    #[test]
    fn test_single_point_random_walk_is_degenerate() {
        let params = ShapeParams::default().with_walk(1, 9);
        assert!(ShapePath::new(TrajectoryShape::RandomWalk, params).is_err());
    }

    #[test]
    fn test_random_walk_passes_through_control_points() {
        let params = ShapeParams::default().with_walk(5, 11);
        let path = ShapePath::new(TrajectoryShape::RandomWalk, params.clone()).unwrap();
        let points = random_walk_points(5, params.size, 11);
        for (i, p) in points.iter().enumerate() {
            let t = i as f32 / 4.0;
            assert!(vec_approx_eq(path.sample(t), *p), "point {i}");
        }
    }

    #[test]
    fn test_random_walk_is_deterministic_per_seed() {
        let a = ShapePath::new(TrajectoryShape::RandomWalk, ShapeParams::default().with_walk(6, 3))
            .unwrap();
        let b = ShapePath::new(TrajectoryShape::RandomWalk, ShapeParams::default().with_walk(6, 3))
            .unwrap();
        assert!(vec_approx_eq(a.sample(0.37), b.sample(0.37)));
    }

    #[test]
    fn test_helix_rises_with_phase() {
        let params = ShapeParams::default().with_size(Vector3::new(1.0, 1.0, 4.0));
        let path = ShapePath::new(TrajectoryShape::Helix, params).unwrap();
        assert!(path.sample(0.75).z > path.sample(0.25).z);
    }

    #[test]
    fn test_non_finite_size_rejected() {
        let params = ShapeParams::default().with_size(Vector3::new(f32::NAN, 1.0, 1.0));
        assert!(ShapePath::new(TrajectoryShape::Circle, params).is_err());
    }
}
