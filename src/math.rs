//! Small vector and angle helpers shared by the motion components.
//!
//! Orientation triples are stored in a [`Vector3`] with the layout
//! `x = yaw`, `y = pitch`, `z = roll`, all in radians.
//!
//! Rotations use one canonical composition: yaw (about the vertical Z axis)
//! is applied first, then pitch (about X), then roll (about Y).

use glam::Mat3;

/// Floating-point triple used for positions, centers and targets.
pub type Vector3 = glam::Vec3;

/// Wrap an angle to `[-π, π]` using `atan2(sin, cos)`.
///
/// Applied to an angular difference this yields the shortest signed path.
pub fn normalize_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}

/// Wrap every component of an orientation triple to `[-π, π]`.
pub fn normalize_orientation(orientation: Vector3) -> Vector3 {
    Vector3::new(
        normalize_angle(orientation.x),
        normalize_angle(orientation.y),
        normalize_angle(orientation.z),
    )
}

/// Build the canonical rotation matrix for a yaw/pitch/roll triple.
pub fn rotation_matrix(yaw: f32, pitch: f32, roll: f32) -> Mat3 {
    Mat3::from_rotation_y(roll) * Mat3::from_rotation_x(pitch) * Mat3::from_rotation_z(yaw)
}

/// Rotation that takes a point already rotated by `from` to the same point
/// rotated by `to` (both orientation triples).
pub fn incremental_rotation(from: Vector3, to: Vector3) -> Mat3 {
    let old = rotation_matrix(from.x, from.y, from.z);
    let new = rotation_matrix(to.x, to.y, to.z);
    new * old.transpose()
}

/// Arithmetic mean of a set of points. `None` when the set is empty.
pub fn centroid<I>(points: I) -> Option<Vector3>
where
    I: IntoIterator<Item = Vector3>,
{
    let mut sum = Vector3::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

/// Linearly interpolate between two floats.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
