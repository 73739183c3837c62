//! Flat per-source output arrays.
//!
//! Rewritten after every tick from the authoritative `SourceMotion` states,
//! in registry order. Read-only for everything outside the sync system.

use bevy_ecs::prelude::*;

use crate::components::sourcemotion::SourceId;
use crate::events::frame::{RenderFrame, SourceSnapshot};
use crate::math::Vector3;

#[derive(Resource, Debug, Default, Clone)]
pub struct OutputFrame {
    pub tick: u64,
    pub time: f32,
    pub ids: Vec<SourceId>,
    pub positions: Vec<Vector3>,
    pub orientations: Vec<Vector3>,
    pub apertures: Vec<f32>,
}

impl OutputFrame {
    pub fn clear(&mut self) {
        self.ids.clear();
        self.positions.clear();
        self.orientations.clear();
        self.apertures.clear();
    }

    pub fn push(&mut self, id: SourceId, position: Vector3, orientation: Vector3, aperture: f32) {
        self.ids.push(id);
        self.positions.push(position);
        self.orientations.push(orientation);
        self.apertures.push(aperture);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: SourceId) -> Option<usize> {
        self.ids.iter().position(|other| *other == id)
    }

    pub fn position_of(&self, id: SourceId) -> Option<Vector3> {
        self.index_of(id).map(|i| self.positions[i])
    }

    pub fn to_render_frame(&self) -> RenderFrame {
        let sources = (0..self.len())
            .map(|i| SourceSnapshot {
                id: self.ids[i],
                position: self.positions[i],
                orientation: self.orientations[i],
                aperture: self.apertures[i],
            })
            .collect();
        RenderFrame {
            tick: self.tick,
            time: self.time,
            sources,
        }
    }
}
