//! Per-source motion state and the per-tick delta value type.
//!
//! [`MotionState`] is owned by a [`SourceMotion`](super::sourcemotion::SourceMotion)
//! and is the only authoritative copy of a source's position. The engine
//! mirrors it into flat output arrays after every tick.
//!
//! [`MotionDelta`] is what a single motion component contributes in one tick.
//! Deltas are plain values and are never kept across ticks.

use serde::{Deserialize, Serialize};

use crate::components::motioncomponent::ComponentKind;
use crate::math::{Vector3, normalize_orientation};

/// Combined magnitude below which a delta is considered "no motion".
pub const MOTION_EPSILON: f32 = 1e-6;

/// Authoritative kinematic state of one source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// World-space position.
    pub position: Vector3,
    /// Orientation as `(yaw, pitch, roll)` in radians, each within `[-π, π]`.
    pub orientation: Vector3,
    /// Aperture in `[0, 1]`.
    pub aperture: f32,
    /// Velocity derived from the last applied position delta.
    pub velocity: Vector3,
}

impl Default for MotionState {
    fn default() -> Self {
        Self::at(Vector3::ZERO)
    }
}

impl MotionState {
    /// State at rest at `position` with neutral orientation and full aperture.
    pub fn at(position: Vector3) -> Self {
        MotionState {
            position,
            orientation: Vector3::ZERO,
            aperture: 1.0,
            velocity: Vector3::ZERO,
        }
    }

    pub fn with_orientation(mut self, orientation: Vector3) -> Self {
        self.orientation = normalize_orientation(orientation);
        self
    }

    pub fn with_aperture(mut self, aperture: f32) -> Self {
        self.aperture = aperture.clamp(0.0, 1.0);
        self
    }
}

/// One component's contribution for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionDelta {
    pub position: Vector3,
    /// Orientation change as `(yaw, pitch, roll)` in radians.
    pub orientation: Vector3,
    pub aperture: f32,
    /// Which component kind produced this delta.
    pub provenance: ComponentKind,
}

impl MotionDelta {
    /// A delta that only moves the source.
    pub fn translation(position: Vector3, provenance: ComponentKind) -> Self {
        MotionDelta {
            position,
            orientation: Vector3::ZERO,
            aperture: 0.0,
            provenance,
        }
    }

    pub fn with_orientation(mut self, orientation: Vector3) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_aperture(mut self, aperture: f32) -> Self {
        self.aperture = aperture;
        self
    }

    /// Combined magnitude of every channel of the delta.
    pub fn magnitude(&self) -> f32 {
        (self.position.length_squared()
            + self.orientation.length_squared()
            + self.aperture * self.aperture)
            .sqrt()
    }

    /// `true` when every channel is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite() && self.aperture.is_finite()
    }

    /// `Some(self)` unless the delta is too small to matter.
    ///
    /// Components call this last so that negligible contributions are
    /// reported as "nothing" instead of a near-zero vector.
    pub fn significant(self) -> Option<Self> {
        if self.magnitude() < MOTION_EPSILON {
            None
        } else {
            Some(self)
        }
    }
}
