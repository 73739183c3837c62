//! Rotation components.
//!
//! - [`AlgorithmicRotation`] spins a source about a center at constant
//!   angular velocities.
//! - [`ManualRotation`] eases the source's rotation toward a target
//!   yaw/pitch/roll along the shortest path.
//!
//! Both exist at individual and macro scope; the scope only changes which
//! [`ComponentKind`] slot the instance occupies and who owns it. Macro scope
//! fans out one instance per member with a shared center, so every member
//! advances the same angles and the group rotates rigidly.
//!
//! Each tick the component rotates the *live* offset `position - center` by
//! the rotation between last tick's angles and this tick's angles, using the
//! canonical yaw → pitch → roll composition from [`crate::math`].

use std::any::Any;

use crate::components::motioncomponent::{ComponentKind, MotionComponent, Scope};
use crate::components::motionstate::{MotionDelta, MotionState};
use crate::math::{Vector3, incremental_rotation, normalize_angle, normalize_orientation};

/// Differences below this many radians snap to the target.
pub const SNAP_THRESHOLD: f32 = 0.001;

/// Frame rate the interpolation speed is calibrated against.
const REFERENCE_FPS: f32 = 60.0;

/// Smallest accepted interpolation speed.
pub const MIN_INTERPOLATION_SPEED: f32 = 1e-4;

/// Rotate `position` about `center` from orientation `from` to `to` and
/// return the resulting position change.
fn rotation_delta(position: Vector3, center: Vector3, from: Vector3, to: Vector3) -> Vector3 {
    let offset = position - center;
    let rotated = incremental_rotation(from, to) * offset;
    rotated + center - position
}

/// Constant angular velocity about a center.
#[derive(Clone, Debug)]
pub struct AlgorithmicRotation {
    pub enabled: bool,
    /// Angular velocity about the X, Y and Z axes, in rad/s.
    pub speed: Vector3,
    pub center: Vector3,
    /// Accumulated orientation as `(yaw, pitch, roll)`.
    angles: Vector3,
    scope: Scope,
}

impl AlgorithmicRotation {
    pub fn new(speed: Vector3, center: Vector3) -> Self {
        AlgorithmicRotation {
            enabled: true,
            speed,
            center,
            angles: Vector3::ZERO,
            scope: Scope::Individual,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Accumulated `(yaw, pitch, roll)`, each within `[-π, π]`.
    pub fn angles(&self) -> Vector3 {
        self.angles
    }
}

impl MotionComponent for AlgorithmicRotation {
    fn kind(&self) -> ComponentKind {
        match self.scope {
            Scope::Individual => ComponentKind::IndividualRotation,
            Scope::Macro(_) => ComponentKind::MacroRotation,
        }
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn calculate_delta(&mut self, state: &MotionState, _t: f32, dt: f32) -> Option<MotionDelta> {
        if !self.enabled || !dt.is_finite() || dt <= 0.0 || !self.speed.is_finite() {
            return None;
        }
        // speed_z turns the yaw, speed_x the pitch, speed_y the roll
        let step = Vector3::new(self.speed.z, self.speed.x, self.speed.y) * dt;
        let from = self.angles;
        let to = from + step;
        self.angles = normalize_orientation(to);

        let delta = rotation_delta(state.position, self.center, from, to);
        MotionDelta::translation(delta, self.kind())
            .with_orientation(step)
            .significant()
    }

    fn box_clone(&self) -> Box<dyn MotionComponent> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Smoothly interpolated rotation toward a target orientation.
#[derive(Clone, Debug)]
pub struct ManualRotation {
    pub enabled: bool,
    /// Target `(yaw, pitch, roll)`.
    target: Vector3,
    /// Current `(yaw, pitch, roll)`, each within `[-π, π]`.
    current: Vector3,
    /// Fraction of the remaining angle covered per 1/60 s, in `(0, 1]`.
    interpolation_speed: f32,
    pub center: Vector3,
    scope: Scope,
}

impl ManualRotation {
    pub fn new(target: Vector3, interpolation_speed: f32, center: Vector3) -> Self {
        ManualRotation {
            enabled: true,
            target: normalize_orientation(target),
            current: Vector3::ZERO,
            interpolation_speed: clamp_interpolation_speed(interpolation_speed),
            center,
            scope: Scope::Individual,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn target(&self) -> Vector3 {
        self.target
    }

    pub fn current(&self) -> Vector3 {
        self.current
    }

    pub fn interpolation_speed(&self) -> f32 {
        self.interpolation_speed
    }

    /// Retarget without losing the angles reached so far.
    pub fn set_target(&mut self, target: Vector3, interpolation_speed: f32) {
        self.target = normalize_orientation(target);
        self.interpolation_speed = clamp_interpolation_speed(interpolation_speed);
    }

    pub fn is_converged(&self) -> bool {
        let diff = self.target - self.current;
        normalize_angle(diff.x).abs() < SNAP_THRESHOLD
            && normalize_angle(diff.y).abs() < SNAP_THRESHOLD
            && normalize_angle(diff.z).abs() < SNAP_THRESHOLD
    }

    /// Angle change for one tick, per axis.
    fn step(&self, dt: f32) -> Vector3 {
        let smooth = 1.0 - (1.0 - self.interpolation_speed).powf(dt * REFERENCE_FPS);
        let axis = |target: f32, current: f32| {
            let diff = normalize_angle(target - current);
            if diff.abs() < SNAP_THRESHOLD {
                diff
            } else {
                diff * smooth
            }
        };
        Vector3::new(
            axis(self.target.x, self.current.x),
            axis(self.target.y, self.current.y),
            axis(self.target.z, self.current.z),
        )
    }
}

fn clamp_interpolation_speed(speed: f32) -> f32 {
    if speed.is_finite() {
        speed.clamp(MIN_INTERPOLATION_SPEED, 1.0)
    } else {
        1.0
    }
}

impl MotionComponent for ManualRotation {
    fn kind(&self) -> ComponentKind {
        match self.scope {
            Scope::Individual => ComponentKind::IndividualManualRotation,
            Scope::Macro(_) => ComponentKind::MacroManualRotation,
        }
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn calculate_delta(&mut self, state: &MotionState, _t: f32, dt: f32) -> Option<MotionDelta> {
        if !self.enabled || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        let step = self.step(dt);
        if step == Vector3::ZERO {
            return None;
        }
        let from = self.current;
        let to = from + step;
        self.current = normalize_orientation(to);
        // snapped axes land exactly on the target
        for axis in 0..3 {
            if normalize_angle(self.target[axis] - self.current[axis]).abs() < SNAP_THRESHOLD
                && step[axis].abs() < SNAP_THRESHOLD
            {
                self.current[axis] = self.target[axis];
            }
        }

        let delta = rotation_delta(state.position, self.center, from, to);
        MotionDelta::translation(delta, self.kind())
            .with_orientation(step)
            .significant()
    }

    fn box_clone(&self) -> Box<dyn MotionComponent> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
