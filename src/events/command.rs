//! Configuration commands queued from other threads.
//!
//! Hosts that cannot hold `&mut Engine` send these through the sender
//! returned by [`Engine::command_sender`](crate::engine::Engine::command_sender).
//! The engine drains the queue at the start of each `update`, before any
//! tick runs, so configuration never interleaves with composition.

use crate::components::concentration::ConcentrationCurve;
use crate::components::motioncomponent::ComponentKind;
use crate::components::playback::PlaybackMode;
use crate::components::shape::{ShapeParams, TrajectoryShape};
use crate::components::sourcemotion::SourceId;
use crate::engine::Target;
use crate::math::Vector3;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    CreateSource {
        id: SourceId,
        position: Vector3,
    },
    RemoveSource {
        id: SourceId,
    },
    SetSourcePosition {
        id: SourceId,
        position: Vector3,
    },
    CreateMacro {
        name: String,
        members: Vec<SourceId>,
    },
    DeleteMacro {
        name: String,
    },
    AddSourceToMacro {
        name: String,
        id: SourceId,
    },
    RemoveSourceFromMacro {
        name: String,
        id: SourceId,
    },
    SetIndividualTrajectory {
        id: SourceId,
        shape: TrajectoryShape,
        params: ShapeParams,
        mode: PlaybackMode,
        speed: f32,
    },
    SetMacroTrajectory {
        name: String,
        shape: TrajectoryShape,
        params: ShapeParams,
        mode: PlaybackMode,
        speed: f32,
    },
    SetIndividualRotation {
        id: SourceId,
        speed: Vector3,
        center: Option<Vector3>,
    },
    SetMacroRotation {
        name: String,
        speed: Vector3,
        center: Option<Vector3>,
    },
    SetManualIndividualRotation {
        id: SourceId,
        /// `(yaw, pitch, roll)`
        target: Vector3,
        interpolation_speed: f32,
        center: Option<Vector3>,
    },
    SetManualMacroRotation {
        name: String,
        target: Vector3,
        interpolation_speed: f32,
        center: Option<Vector3>,
    },
    SetConcentration {
        target: Target,
        point: Option<Vector3>,
        factor: f32,
        duration: Option<f32>,
        curve: Option<ConcentrationCurve>,
    },
    SetComponentEnabled {
        target: Target,
        kind: ComponentKind,
        enabled: bool,
    },
    RemoveComponent {
        target: Target,
        kind: ComponentKind,
    },
    FreezeTrajectory {
        target: Target,
        value: f32,
    },
    UnfreezeTrajectory {
        target: Target,
    },
    Start,
    Stop,
}
