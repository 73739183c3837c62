//! Per-tick composition for every source.
//!
//! Each [`SourceMotion`] is independent, so the order sources are visited
//! in does not matter. The registries are not touched here.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::sourcemotion::SourceMotion;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::enginetime::EngineTime;

pub fn motion_system(
    time: Res<EngineTime>,
    config: Res<EngineConfig>,
    mut query: Query<&mut SourceMotion>,
) {
    for mut motion in query.iter_mut() {
        let report = motion.compose(time.elapsed, time.delta, config.max_speed);
        if report.clamped {
            debug!(
                "source {}: summed delta clamped to {} u/s ({:?})",
                motion.id(),
                config.max_speed,
                report.contributors
            );
        }
    }
}
