//! Mirror authoritative source state into the flat output arrays.

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::sourcemotion::SourceMotion;
use crate::resources::enginetime::EngineTime;
use crate::resources::output::OutputFrame;
use crate::resources::sourceregistry::SourceRegistry;

pub fn sync_output_system(
    registry: Res<SourceRegistry>,
    time: Res<EngineTime>,
    query: Query<&SourceMotion>,
    mut output: ResMut<OutputFrame>,
) {
    output.clear();
    output.tick = time.tick;
    output.time = time.elapsed;
    for (id, entity) in registry.iter() {
        match query.get(entity) {
            Ok(motion) => {
                let state = motion.state();
                output.push(id, state.position, state.orientation, state.aperture);
            }
            Err(_) => warn!("source {} is registered but has no motion state", id),
        }
    }
}
