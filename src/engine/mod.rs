//! The motion engine façade.
//!
//! [`Engine`] owns a bevy_ecs [`World`] holding one entity per source, the
//! macro registry and the output arrays, plus the [`Schedule`] that runs a
//! tick. Configuration goes through `&mut Engine` (see [`configure`]) or
//! through [`EngineCommand`]s queued from other threads, which are applied
//! at the start of [`Engine::update`] before any tick runs.
//!
//! # Rate limiting
//!
//! `update` accumulates elapsed time and runs a single tick once at least
//! one configured period has built up. The tick's `dt` is the whole
//! accumulated time. Calls arriving faster than the period are no-ops.

pub mod commands;
pub mod configure;

use std::time::Instant;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::components::motionstate::MotionState;
use crate::components::sourcemotion::{SourceId, SourceMotion};
use crate::events::command::EngineCommand;
use crate::events::frame::{RenderFrame, SourceSnapshot};
use crate::resources::engineconfig::EngineConfig;
use crate::resources::enginetime::EngineTime;
use crate::resources::macroregistry::MacroRegistry;
use crate::resources::output::OutputFrame;
use crate::resources::renderer::RendererBridge;
use crate::resources::sourceregistry::SourceRegistry;
use crate::systems::centroid::macro_centroid_system;
use crate::systems::dispatch::dispatch_frame_system;
use crate::systems::motion::motion_system;
use crate::systems::sync::sync_output_system;
use crate::systems::time::update_engine_time;

/// Slack when comparing accumulated time against the tick period.
const PERIOD_TOLERANCE: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

/// Addresses either a single source or every member of a macro.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Source(SourceId),
    Macro(String),
}

impl From<SourceId> for Target {
    fn from(id: SourceId) -> Self {
        Target::Source(id)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Macro(name.to_string())
    }
}

pub struct Engine {
    world: World,
    schedule: Schedule,
    state: EngineState,
    accumulator: f32,
    last_update: Option<Instant>,
    tx_cmd: Sender<EngineCommand>,
    rx_cmd: Receiver<EngineCommand>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(EngineTime {
            time_scale: config.time_scale,
            ..Default::default()
        });
        world.insert_resource(config);
        world.insert_resource(SourceRegistry::default());
        world.insert_resource(MacroRegistry::default());
        world.insert_resource(OutputFrame::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                macro_centroid_system,
                motion_system,
                sync_output_system,
                dispatch_frame_system,
            )
                .chain(),
        );

        let (tx_cmd, rx_cmd) = unbounded::<EngineCommand>();

        Engine {
            world,
            schedule,
            state: EngineState::Stopped,
            accumulator: 0.0,
            last_update: None,
            tx_cmd,
            rx_cmd,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.resource::<EngineConfig>()
    }

    pub fn time(&self) -> &EngineTime {
        self.world.resource::<EngineTime>()
    }

    /// Read access to the underlying ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    // ==================== LIFECYCLE ====================

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn start(&mut self) {
        if self.state == EngineState::Running {
            return;
        }
        self.state = EngineState::Running;
        self.accumulator = 0.0;
        self.last_update = None;
        info!("Engine started at {} Hz", self.config().tick_rate);
    }

    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.state = EngineState::Stopped;
        info!("Engine stopped after {} ticks", self.time().tick);
    }

    /// Sender for queuing configuration from other threads.
    pub fn command_sender(&self) -> Sender<EngineCommand> {
        self.tx_cmd.clone()
    }

    /// Start publishing a [`RenderFrame`] after every tick.
    ///
    /// Replaces any previously attached renderer.
    pub fn attach_renderer(&mut self, capacity: usize) -> Receiver<RenderFrame> {
        let (bridge, rx_frame) = RendererBridge::bounded(capacity);
        self.world.insert_resource(bridge);
        rx_frame
    }

    pub fn detach_renderer(&mut self) {
        self.world.remove_resource::<RendererBridge>();
    }

    pub fn renderer(&self) -> Option<&RendererBridge> {
        self.world.get_resource::<RendererBridge>()
    }

    // ==================== TICK ====================

    /// Apply queued commands, then run a tick if a full period has elapsed.
    ///
    /// `dt` is the time since the previous call. With `None` the wall clock
    /// is used. Returns whether a tick ran.
    pub fn update(&mut self, dt: Option<f32>) -> bool {
        self.drain_commands();

        if self.state == EngineState::Stopped {
            return false;
        }

        let elapsed = match dt {
            Some(dt) => dt,
            None => {
                let now = Instant::now();
                let elapsed = self
                    .last_update
                    .map(|last| now.duration_since(last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last_update = Some(now);
                elapsed
            }
        };
        if !elapsed.is_finite() || elapsed < 0.0 {
            warn!("Ignoring update with invalid dt {}", elapsed);
            return false;
        }

        self.accumulator += elapsed;
        if self.accumulator + PERIOD_TOLERANCE < self.config().tick_period() {
            return false;
        }
        let tick_dt = self.accumulator;
        self.accumulator = 0.0;
        self.tick(tick_dt);
        true
    }

    fn tick(&mut self, dt: f32) {
        update_engine_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    fn drain_commands(&mut self) {
        let pending: Vec<EngineCommand> = self.rx_cmd.try_iter().collect();
        for command in pending {
            if let Err(e) = self.apply(command) {
                warn!("Queued command failed: {}", e);
            }
        }
    }

    // ==================== OUTPUT ====================

    /// Flat arrays written by the last tick.
    pub fn output(&self) -> &OutputFrame {
        self.world.resource::<OutputFrame>()
    }

    /// Current state of every source, in registration order.
    ///
    /// Unlike [`output`](Self::output) this reflects configuration changes
    /// made since the last tick.
    pub fn snapshot(&self) -> RenderFrame {
        let time = self.time();
        let sources = self
            .world
            .resource::<SourceRegistry>()
            .iter()
            .filter_map(|(id, entity)| {
                let state = self.world.get::<SourceMotion>(entity)?.state();
                Some(SourceSnapshot {
                    id,
                    position: state.position,
                    orientation: state.orientation,
                    aperture: state.aperture,
                })
            })
            .collect();
        RenderFrame {
            tick: time.tick,
            time: time.elapsed,
            sources,
        }
    }

    pub fn source_state(&self, id: SourceId) -> Option<MotionState> {
        self.source_motion(id).map(|motion| *motion.state())
    }

    pub fn source_motion(&self, id: SourceId) -> Option<&SourceMotion> {
        let entity = self.world.resource::<SourceRegistry>().get(id)?;
        self.world.get::<SourceMotion>(entity)
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.world.resource::<SourceRegistry>().ids().to_vec()
    }

    pub fn source_count(&self) -> usize {
        self.world.resource::<SourceRegistry>().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn engine_at(rate: u32) -> Engine {
        let mut engine = Engine::new(EngineConfig::new().with_tick_rate(rate));
        engine.start();
        engine
    }

    #[test]
    fn test_stopped_engine_does_not_tick() {
        let mut engine = Engine::default();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(!engine.update(Some(1.0)));
        assert_eq!(engine.time().tick, 0);
    }

    #[test]
    fn test_calls_faster_than_period_are_noops() {
        let mut engine = engine_at(60);
        assert!(!engine.update(Some(1.0 / 120.0)));
        assert_eq!(engine.time().tick, 0);
        assert!(engine.update(Some(1.0 / 120.0)));
        assert_eq!(engine.time().tick, 1);
        assert!((engine.time().delta - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut engine = engine_at(60);
        assert!(!engine.update(Some(f32::NAN)));
        assert!(!engine.update(Some(-1.0)));
        assert!(engine.update(Some(1.0 / 60.0)));
    }

    #[test]
    fn test_wall_clock_first_call_is_noop() {
        let mut engine = engine_at(60);
        assert!(!engine.update(None));
    }

    #[test]
    fn test_output_follows_registration_order() {
        let mut engine = engine_at(60);
        engine.create_source_at(SourceId(9), Vector3::X).unwrap();
        engine.create_source_at(SourceId(1), Vector3::Y).unwrap();
        engine.update(Some(1.0 / 60.0));
        let output = engine.output();
        assert_eq!(output.ids, vec![SourceId(9), SourceId(1)]);
        assert_eq!(output.positions, vec![Vector3::X, Vector3::Y]);
        assert_eq!(output.tick, 1);
    }

    #[test]
    fn test_snapshot_reflects_changes_before_first_tick() {
        let mut engine = Engine::default();
        engine.create_source_at(SourceId(3), Vector3::ONE).unwrap();
        let frame = engine.snapshot();
        assert_eq!(frame.get(SourceId(3)).unwrap().position, Vector3::ONE);
        assert!(engine.output().is_empty());
    }
}
