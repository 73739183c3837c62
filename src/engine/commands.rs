//! Applying queued [`EngineCommand`]s.

use crate::engine::{Engine, Target};
use crate::error::EngineResult;
use crate::events::command::EngineCommand;

impl Engine {
    /// Apply one command as if the matching method had been called.
    pub fn apply(&mut self, command: EngineCommand) -> EngineResult<()> {
        match command {
            EngineCommand::CreateSource { id, position } => self.create_source_at(id, position),
            EngineCommand::RemoveSource { id } => self.remove_source(id),
            EngineCommand::SetSourcePosition { id, position } => {
                self.set_source_position(id, position)
            }
            EngineCommand::CreateMacro { name, members } => self.create_macro(&name, &members),
            EngineCommand::DeleteMacro { name } => self.delete_macro(&name),
            EngineCommand::AddSourceToMacro { name, id } => self.add_source_to_macro(&name, id),
            EngineCommand::RemoveSourceFromMacro { name, id } => {
                self.remove_source_from_macro(&name, id)
            }
            EngineCommand::SetIndividualTrajectory {
                id,
                shape,
                params,
                mode,
                speed,
            } => self.set_individual_trajectory(id, shape, params, mode, speed),
            EngineCommand::SetMacroTrajectory {
                name,
                shape,
                params,
                mode,
                speed,
            } => self.set_macro_trajectory(&name, shape, params, mode, speed),
            EngineCommand::SetIndividualRotation { id, speed, center } => {
                self.set_individual_rotation(id, speed, center)
            }
            EngineCommand::SetMacroRotation {
                name,
                speed,
                center,
            } => self.set_macro_rotation(&name, speed, center),
            EngineCommand::SetManualIndividualRotation {
                id,
                target,
                interpolation_speed,
                center,
            } => self.set_manual_individual_rotation(id, target, interpolation_speed, center),
            EngineCommand::SetManualMacroRotation {
                name,
                target,
                interpolation_speed,
                center,
            } => self.set_manual_macro_rotation(&name, target, interpolation_speed, center),
            EngineCommand::SetConcentration {
                target,
                point,
                factor,
                duration,
                curve,
            } => self.set_concentration(target, point, factor, duration, curve),
            EngineCommand::SetComponentEnabled {
                target,
                kind,
                enabled,
            } => match target {
                Target::Source(id) => self.set_component_enabled(id, kind, enabled),
                Target::Macro(name) => self.set_macro_component_enabled(&name, kind, enabled),
            },
            EngineCommand::RemoveComponent { target, kind } => match target {
                Target::Source(id) => self.remove_component(id, kind),
                Target::Macro(name) => self.clear_macro_component(&name, kind),
            },
            EngineCommand::FreezeTrajectory { target, value } => {
                self.freeze_trajectory(target, value)
            }
            EngineCommand::UnfreezeTrajectory { target } => self.unfreeze_trajectory(target),
            EngineCommand::Start => {
                self.start();
                Ok(())
            }
            EngineCommand::Stop => {
                self.stop();
                Ok(())
            }
        }
    }
}
