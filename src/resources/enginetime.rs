use bevy_ecs::prelude::Resource;

/// Simulation clock advanced once per engine tick.
#[derive(Resource, Clone, Copy, Debug)]
pub struct EngineTime {
    /// Scaled seconds since the engine started ticking.
    pub elapsed: f32,
    /// Scaled duration of the current tick.
    pub delta: f32,
    pub time_scale: f32,
    /// Number of ticks run so far.
    pub tick: u64,
}

impl Default for EngineTime {
    fn default() -> Self {
        EngineTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            tick: 0,
        }
    }
}
