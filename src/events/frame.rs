//! Per-tick snapshot handed to the renderer collaborator.

use serde::{Deserialize, Serialize};

use crate::components::sourcemotion::SourceId;
use crate::math::Vector3;

/// Position, orientation and aperture of one source after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub id: SourceId,
    pub position: Vector3,
    /// `(yaw, pitch, roll)` in radians.
    pub orientation: Vector3,
    pub aperture: f32,
}

/// Every registered source after tick number `tick`, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub tick: u64,
    /// Engine time in seconds.
    pub time: f32,
    pub sources: Vec<SourceSnapshot>,
}

impl RenderFrame {
    pub fn get(&self, id: SourceId) -> Option<&SourceSnapshot> {
        self.sources.iter().find(|snapshot| snapshot.id == id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
