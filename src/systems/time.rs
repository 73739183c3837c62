//! Time update system.
//!
//! Advances the shared [`EngineTime`](crate::resources::enginetime::EngineTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::enginetime::EngineTime;

/// Update elapsed, delta and the tick counter on the `EngineTime` resource.
///
/// `dt` is the unscaled tick delta in seconds.
pub fn update_engine_time(world: &mut World, dt: f32) {
    let mut time = world.resource_mut::<EngineTime>();
    let scaled_dt = dt * time.time_scale;
    time.elapsed += scaled_dt;
    time.delta = scaled_dt;
    time.tick += 1;
}
