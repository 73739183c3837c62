//! Configuration surface of the [`Engine`].
//!
//! Every call resolves and checks all the sources it will touch before
//! changing anything, so a failed call leaves the engine as it was. Macro
//! calls store a template on the macro and give each member its own copy.
//! Rotation and concentration calls update a member's existing instance in
//! place (keeping the angles or factor it has reached); trajectory calls
//! replace it.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::concentration::{Concentration, ConcentrationCurve, ConcentrationState};
use crate::components::motioncomponent::{ComponentKind, MotionComponent, Scope};
use crate::components::playback::{PlaybackController, PlaybackMode};
use crate::components::rotation::{AlgorithmicRotation, ManualRotation};
use crate::components::shape::{ShapeParams, ShapePath, TrajectoryShape};
use crate::components::sourcemotion::{SourceId, SourceMotion};
use crate::components::trajectory::{IndividualTrajectory, MacroTrajectory};
use crate::engine::{Engine, Target};
use crate::error::{ConfigError, EngineResult, InvariantViolation};
use crate::math::Vector3;
use crate::resources::macroregistry::{Macro, MacroRegistry};
use crate::resources::sourceregistry::SourceRegistry;
use crate::systems::centroid::members_centroid;

fn require_finite(name: &'static str, value: Vector3) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("{:?} is not finite", value),
        })
    }
}

fn require_finite_scalar(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("{} is not finite", value),
        })
    }
}

fn require_interpolation_speed(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name: "interpolation_speed",
            reason: format!("{} is outside (0, 1]", value),
        })
    }
}

/// Kinds a macro can own.
fn require_macro_kind(kind: ComponentKind) -> Result<(), ConfigError> {
    if kind.is_macro_scope() || kind == ComponentKind::Concentration {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name: "kind",
            reason: format!("{} is not a macro component", kind),
        })
    }
}

fn apply_factor(
    concentration: &mut Concentration,
    factor: f32,
    duration: Option<f32>,
    curve: Option<ConcentrationCurve>,
) {
    match duration {
        Some(duration) => concentration.animate_to(factor, duration, curve.unwrap_or_default()),
        None => concentration.set_factor(factor),
    }
}

impl Engine {
    // ==================== LOOKUP ====================

    fn entity_of(&self, id: SourceId) -> Result<Entity, ConfigError> {
        self.world
            .resource::<SourceRegistry>()
            .get(id)
            .ok_or(ConfigError::UnknownSource(id))
    }

    fn motion_of(&self, id: SourceId) -> Result<&SourceMotion, ConfigError> {
        let entity = self.entity_of(id)?;
        self.world
            .get::<SourceMotion>(entity)
            .ok_or(ConfigError::UnknownSource(id))
    }

    fn motion_mut(&mut self, id: SourceId) -> Result<Mut<'_, SourceMotion>, ConfigError> {
        let entity = self.entity_of(id)?;
        self.world
            .get_mut::<SourceMotion>(entity)
            .ok_or(ConfigError::UnknownSource(id))
    }

    fn position_of(&self, id: SourceId) -> Option<Vector3> {
        self.source_motion(id).map(|motion| motion.state().position)
    }

    fn macro_ref(&self, name: &str) -> Result<&Macro, ConfigError> {
        self.world.resource::<MacroRegistry>().require(name)
    }

    fn with_macro_mut<R>(&mut self, name: &str, f: impl FnOnce(&mut Macro) -> R) -> Option<R> {
        self.world
            .resource_mut::<MacroRegistry>()
            .get_mut(name)
            .map(f)
    }

    /// Members of `name`, each checked to have motion state.
    fn resolve_members(&self, name: &str) -> EngineResult<Vec<SourceId>> {
        let group = self.macro_ref(name)?;
        for id in group.members() {
            if self.motion_of(*id).is_err() {
                return Err(InvariantViolation::DanglingMacroMember {
                    macro_name: name.to_string(),
                    source_id: *id,
                }
                .into());
            }
        }
        Ok(group.members().to_vec())
    }

    fn resolve_target(&self, target: &Target) -> EngineResult<(Vec<SourceId>, Scope)> {
        match target {
            Target::Source(id) => {
                self.motion_of(*id)?;
                Ok((vec![*id], Scope::Individual))
            }
            Target::Macro(name) => Ok((self.resolve_members(name)?, Scope::Macro(name.clone()))),
        }
    }

    fn members_centroid_or_origin(&self, members: &[SourceId]) -> Vector3 {
        members_centroid(members, |id| self.position_of(id)).unwrap_or(Vector3::ZERO)
    }

    fn check_slots(
        &self,
        members: &[SourceId],
        kind: ComponentKind,
        scope: &Scope,
    ) -> Result<(), ConfigError> {
        for id in members {
            self.motion_of(*id)?.can_accept(kind, scope)?;
        }
        Ok(())
    }

    /// Run `f` on every member instance of `kind` owned by macro `name`.
    fn for_each_owned(
        &mut self,
        name: &str,
        members: &[SourceId],
        kind: ComponentKind,
        mut f: impl FnMut(&mut (dyn MotionComponent + 'static)),
    ) {
        for id in members {
            let Ok(mut motion) = self.motion_mut(*id) else {
                continue;
            };
            if let Some(component) = motion.get_mut(kind)
                && component.scope().is_owned_by(name)
            {
                f(component);
            }
        }
    }

    // ==================== SOURCES ====================

    pub fn create_source(&mut self, id: SourceId) -> EngineResult<()> {
        self.create_source_at(id, Vector3::ZERO)
    }

    pub fn create_source_at(&mut self, id: SourceId, position: Vector3) -> EngineResult<()> {
        require_finite("position", position)?;
        if self.world.resource::<SourceRegistry>().contains(id) {
            return Err(ConfigError::DuplicateSource(id).into());
        }
        let entity = self.world.spawn(SourceMotion::at(id, position)).id();
        self.world
            .resource_mut::<SourceRegistry>()
            .insert(id, entity);
        debug!("Created source {} at {:?}", id, position);
        Ok(())
    }

    /// Remove a source, dropping it from every macro it belongs to.
    pub fn remove_source(&mut self, id: SourceId) -> EngineResult<()> {
        let entity = self.entity_of(id)?;
        {
            let mut macros = self.world.resource_mut::<MacroRegistry>();
            for name in macros.macros_containing(id) {
                if let Some(group) = macros.get_mut(&name) {
                    group.remove_member(id);
                }
            }
        }
        self.world.resource_mut::<SourceRegistry>().remove(id);
        self.world.despawn(entity);
        debug!("Removed source {}", id);
        Ok(())
    }

    /// Move a source directly. Components keep targeting from the new position.
    pub fn set_source_position(&mut self, id: SourceId, position: Vector3) -> EngineResult<()> {
        require_finite("position", position)?;
        self.motion_mut(id)?.set_position(position);
        Ok(())
    }

    /// Set a source's aperture, clamped to `[0, 1]`.
    pub fn set_source_aperture(&mut self, id: SourceId, aperture: f32) -> EngineResult<()> {
        require_finite_scalar("aperture", aperture)?;
        self.motion_mut(id)?.set_aperture(aperture);
        Ok(())
    }

    // ==================== MACROS ====================

    /// Create a macro. Duplicate ids in `source_ids` are ignored.
    pub fn create_macro(&mut self, name: &str, source_ids: &[SourceId]) -> EngineResult<()> {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "name",
                reason: "macro name is empty".to_string(),
            }
            .into());
        }
        if self.world.resource::<MacroRegistry>().contains(name) {
            return Err(ConfigError::DuplicateMacro(name.to_string()).into());
        }
        for id in source_ids {
            self.motion_of(*id)?;
        }
        let group = Macro::new(name, source_ids.iter().copied());
        let count = group.members().len();
        self.world.resource_mut::<MacroRegistry>().insert(group)?;
        info!("Created macro '{}' with {} sources", name, count);
        Ok(())
    }

    /// Delete a macro and strip every component it owns from its members.
    pub fn delete_macro(&mut self, name: &str) -> EngineResult<()> {
        let group = self
            .world
            .resource_mut::<MacroRegistry>()
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownMacro(name.to_string()))?;
        let mut stripped = 0;
        for id in group.members() {
            if let Ok(mut motion) = self.motion_mut(*id) {
                stripped += motion.remove_owned_by(name);
            }
        }
        info!(
            "Deleted macro '{}' ({} components stripped from {} sources)",
            name,
            stripped,
            group.members().len()
        );
        Ok(())
    }

    /// Add a source to a macro and give it the macro's current components.
    ///
    /// The newcomer copies the live state of an existing member where there
    /// is one, so it moves in step with the group. A joining trajectory keeps
    /// the source where it is relative to the formation.
    pub fn add_source_to_macro(&mut self, name: &str, id: SourceId) -> EngineResult<()> {
        let group = self.macro_ref(name)?;
        let position = self.motion_of(id)?.state().position;
        if group.contains(id) {
            return Ok(());
        }

        let scope = Scope::Macro(name.to_string());
        let mut instances: Vec<Box<dyn MotionComponent>> = Vec::new();
        for kind in group.templates.kinds() {
            self.motion_of(id)?.can_accept(kind, &scope)?;
            let live = group.members().iter().find_map(|member| {
                self.source_motion(*member)
                    .and_then(|motion| motion.get(kind))
                    .filter(|component| component.scope().is_owned_by(name))
                    .map(|component| component.box_clone())
            });
            let Some(mut instance) = live.or_else(|| group.templates.instantiate(kind)) else {
                continue;
            };
            if let Some(traj) = instance.as_any_mut().downcast_mut::<MacroTrajectory>() {
                let formation_origin = traj.target() - traj.offset;
                traj.offset = position - formation_origin;
            }
            instances.push(instance);
        }

        let mut motion = self.motion_mut(id)?;
        for instance in instances {
            motion.replace(instance);
        }
        self.with_macro_mut(name, |group| group.add_member(id));
        debug!("Added source {} to macro '{}'", id, name);
        Ok(())
    }

    /// Remove a source from a macro, stripping the components the macro owns.
    pub fn remove_source_from_macro(&mut self, name: &str, id: SourceId) -> EngineResult<()> {
        if !self.macro_ref(name)?.contains(id) {
            return Err(ConfigError::InvalidParameter {
                name: "source_id",
                reason: format!("source {} is not a member of macro '{}'", id, name),
            }
            .into());
        }
        if let Ok(mut motion) = self.motion_mut(id) {
            motion.remove_owned_by(name);
        }
        self.with_macro_mut(name, |group| group.remove_member(id));
        debug!("Removed source {} from macro '{}'", id, name);
        Ok(())
    }

    pub fn macro_members(&self, name: &str) -> EngineResult<Vec<SourceId>> {
        Ok(self.macro_ref(name)?.members().to_vec())
    }

    pub fn macro_names(&self) -> Vec<String> {
        self.world.resource::<MacroRegistry>().names()
    }

    /// Live centroid of a macro's members. `None` for an empty macro.
    pub fn macro_centroid(&self, name: &str) -> EngineResult<Option<Vector3>> {
        let members = self.resolve_members(name)?;
        Ok(members_centroid(&members, |id| self.position_of(id)))
    }

    // ==================== TRAJECTORIES ====================

    /// Give a source its own trajectory, replacing any previous one.
    ///
    /// The path is centered on `params.center`, or on the source's current
    /// position when that is `None`.
    pub fn set_individual_trajectory(
        &mut self,
        id: SourceId,
        shape: TrajectoryShape,
        params: ShapeParams,
        mode: PlaybackMode,
        speed: f32,
    ) -> EngineResult<()> {
        require_finite_scalar("speed", speed)?;
        let position = self.motion_of(id)?.state().position;
        let path = ShapePath::new(shape, params)?;
        let center = path.params().center.unwrap_or(position);
        let trajectory =
            IndividualTrajectory::new(path, PlaybackController::new(mode, speed), center);
        self.motion_mut(id)?.replace(Box::new(trajectory));
        debug!(
            "Source {}: {} trajectory ({:?}, speed {})",
            id,
            shape.name(),
            mode,
            speed
        );
        Ok(())
    }

    /// Give every member of a macro its own copy of a group trajectory.
    ///
    /// Members keep their offset from the macro centroid, so the formation
    /// moves along the path as a whole.
    pub fn set_macro_trajectory(
        &mut self,
        name: &str,
        shape: TrajectoryShape,
        params: ShapeParams,
        mode: PlaybackMode,
        speed: f32,
    ) -> EngineResult<()> {
        require_finite_scalar("speed", speed)?;
        let members = self.resolve_members(name)?;
        let path = ShapePath::new(shape, params)?;
        let scope = Scope::Macro(name.to_string());
        self.check_slots(&members, ComponentKind::MacroTrajectory, &scope)?;

        let centroid = self.members_centroid_or_origin(&members);
        let center = path.params().center.unwrap_or(centroid);
        let follow = self
            .macro_ref(name)?
            .templates
            .trajectory
            .as_ref()
            .is_some_and(|t| t.follow_centroid);
        let template =
            MacroTrajectory::new(name, path, PlaybackController::new(mode, speed), center)
                .with_follow_centroid(follow);

        for id in &members {
            let offset = self.position_of(*id).unwrap_or(centroid) - centroid;
            self.motion_mut(*id)?
                .replace(Box::new(template.for_member(offset)));
        }
        self.with_macro_mut(name, |group| group.templates.trajectory = Some(template));
        debug!(
            "Macro '{}': {} trajectory on {} sources ({:?}, speed {})",
            name,
            shape.name(),
            members.len(),
            mode,
            speed
        );
        Ok(())
    }

    /// Make a macro's trajectory follow the live centroid of its members.
    pub fn set_macro_trajectory_follow_centroid(
        &mut self,
        name: &str,
        follow: bool,
    ) -> EngineResult<()> {
        let members = self.resolve_members(name)?;
        if self.macro_ref(name)?.templates.trajectory.is_none() {
            return Err(ConfigError::InvalidParameter {
                name: "follow_centroid",
                reason: format!("macro '{}' has no trajectory", name),
            }
            .into());
        }
        self.for_each_owned(name, &members, ComponentKind::MacroTrajectory, |component| {
            if let Some(traj) = component.as_any_mut().downcast_mut::<MacroTrajectory>() {
                traj.follow_centroid = follow;
            }
        });
        self.with_macro_mut(name, |group| {
            if let Some(template) = group.templates.trajectory.as_mut() {
                template.follow_centroid = follow;
            }
        });
        Ok(())
    }

    /// Pin the trajectory phase of a source or of every macro member.
    pub fn freeze_trajectory(&mut self, target: impl Into<Target>, value: f32) -> EngineResult<()> {
        require_finite_scalar("value", value)?;
        self.with_playback(target.into(), |playback| playback.freeze(value))
    }

    pub fn unfreeze_trajectory(&mut self, target: impl Into<Target>) -> EngineResult<()> {
        self.with_playback(target.into(), |playback| playback.unfreeze())
    }

    fn with_playback(
        &mut self,
        target: Target,
        mut f: impl FnMut(&mut PlaybackController),
    ) -> EngineResult<()> {
        match target {
            Target::Source(id) => {
                let mut motion = self.motion_mut(id)?;
                let playback = motion
                    .get_mut(ComponentKind::IndividualTrajectory)
                    .and_then(|component| component.playback_mut())
                    .ok_or_else(|| ConfigError::InvalidParameter {
                        name: "target",
                        reason: format!("source {} has no individual trajectory", id),
                    })?;
                f(playback);
            }
            Target::Macro(name) => {
                let members = self.resolve_members(&name)?;
                if self.macro_ref(&name)?.templates.trajectory.is_none() {
                    return Err(ConfigError::InvalidParameter {
                        name: "target",
                        reason: format!("macro '{}' has no trajectory", name),
                    }
                    .into());
                }
                self.for_each_owned(&name, &members, ComponentKind::MacroTrajectory, |component| {
                    if let Some(playback) = component.playback_mut() {
                        f(playback);
                    }
                });
                self.with_macro_mut(&name, |group| {
                    if let Some(template) = group.templates.trajectory.as_mut() {
                        f(&mut template.playback);
                    }
                });
            }
        }
        Ok(())
    }

    // ==================== ROTATIONS ====================

    /// Constant rotation of a source about `center` (the origin if `None`).
    ///
    /// `speed` holds angular velocities about the X, Y and Z axes in rad/s.
    /// An existing rotation keeps its accumulated angles.
    pub fn set_individual_rotation(
        &mut self,
        id: SourceId,
        speed: Vector3,
        center: Option<Vector3>,
    ) -> EngineResult<()> {
        require_finite("speed", speed)?;
        if let Some(center) = center {
            require_finite("center", center)?;
        }
        let mut motion = self.motion_mut(id)?;
        match motion.component_mut::<AlgorithmicRotation>(ComponentKind::IndividualRotation) {
            Some(rotation) => {
                rotation.speed = speed;
                if let Some(center) = center {
                    rotation.center = center;
                }
            }
            None => {
                let rotation = AlgorithmicRotation::new(speed, center.unwrap_or(Vector3::ZERO));
                motion.replace(Box::new(rotation));
            }
        }
        debug!("Source {}: rotation speed {:?}", id, speed);
        Ok(())
    }

    /// Constant rotation of a whole macro about `center`, which defaults to
    /// the members' centroid at the time of the call.
    pub fn set_macro_rotation(
        &mut self,
        name: &str,
        speed: Vector3,
        center: Option<Vector3>,
    ) -> EngineResult<()> {
        require_finite("speed", speed)?;
        if let Some(center) = center {
            require_finite("center", center)?;
        }
        let members = self.resolve_members(name)?;
        let scope = Scope::Macro(name.to_string());
        self.check_slots(&members, ComponentKind::MacroRotation, &scope)?;

        let center = center.unwrap_or_else(|| self.members_centroid_or_origin(&members));
        let template = AlgorithmicRotation::new(speed, center).with_scope(scope);
        for id in &members {
            let mut motion = self.motion_mut(*id)?;
            match motion.component_mut::<AlgorithmicRotation>(ComponentKind::MacroRotation) {
                Some(rotation) => {
                    rotation.speed = speed;
                    rotation.center = center;
                }
                None => {
                    motion.replace(Box::new(template.clone()));
                }
            }
        }
        self.with_macro_mut(name, |group| group.templates.rotation = Some(template));
        debug!(
            "Macro '{}': rotation speed {:?} about {:?}",
            name, speed, center
        );
        Ok(())
    }

    /// Rotate a source smoothly toward `target` = `(yaw, pitch, roll)` about
    /// `center` (the origin if `None`).
    pub fn set_manual_individual_rotation(
        &mut self,
        id: SourceId,
        target: Vector3,
        interpolation_speed: f32,
        center: Option<Vector3>,
    ) -> EngineResult<()> {
        require_finite("target", target)?;
        require_interpolation_speed(interpolation_speed)?;
        if let Some(center) = center {
            require_finite("center", center)?;
        }
        let mut motion = self.motion_mut(id)?;
        match motion.component_mut::<ManualRotation>(ComponentKind::IndividualManualRotation) {
            Some(rotation) => {
                rotation.set_target(target, interpolation_speed);
                if let Some(center) = center {
                    rotation.center = center;
                }
            }
            None => {
                let rotation = ManualRotation::new(
                    target,
                    interpolation_speed,
                    center.unwrap_or(Vector3::ZERO),
                );
                motion.replace(Box::new(rotation));
            }
        }
        debug!("Source {}: manual rotation to {:?}", id, target);
        Ok(())
    }

    /// Rotate a whole macro smoothly toward `target` about `center`, which
    /// defaults to the members' centroid at the time of the call.
    ///
    /// Members already rotating continue from the angles they reached.
    pub fn set_manual_macro_rotation(
        &mut self,
        name: &str,
        target: Vector3,
        interpolation_speed: f32,
        center: Option<Vector3>,
    ) -> EngineResult<()> {
        require_finite("target", target)?;
        require_interpolation_speed(interpolation_speed)?;
        if let Some(center) = center {
            require_finite("center", center)?;
        }
        let members = self.resolve_members(name)?;
        let scope = Scope::Macro(name.to_string());
        self.check_slots(&members, ComponentKind::MacroManualRotation, &scope)?;

        let center = center.unwrap_or_else(|| self.members_centroid_or_origin(&members));
        let template =
            ManualRotation::new(target, interpolation_speed, center).with_scope(scope);
        for id in &members {
            let mut motion = self.motion_mut(*id)?;
            match motion.component_mut::<ManualRotation>(ComponentKind::MacroManualRotation) {
                Some(rotation) => {
                    rotation.set_target(target, interpolation_speed);
                    rotation.center = center;
                }
                None => {
                    motion.replace(Box::new(template.clone()));
                }
            }
        }
        self.with_macro_mut(name, |group| group.templates.manual_rotation = Some(template));
        debug!(
            "Macro '{}': manual rotation to {:?} about {:?}",
            name, target, center
        );
        Ok(())
    }

    // ==================== CONCENTRATION ====================

    /// Pull a source or every macro member toward `point`.
    ///
    /// `factor` is clamped to `[0, 1]` (0 = fully concentrated, 1 = no
    /// effect). With a `duration` the factor animates there along `curve`
    /// (linear by default); a new instance starts that animation from 1.
    ///
    /// With `point` set to `None` an existing instance keeps its point; a new
    /// one uses the macro centroid, or the origin for a single source.
    pub fn set_concentration(
        &mut self,
        target: impl Into<Target>,
        point: Option<Vector3>,
        factor: f32,
        duration: Option<f32>,
        curve: Option<ConcentrationCurve>,
    ) -> EngineResult<()> {
        require_finite_scalar("factor", factor)?;
        if let Some(point) = point {
            require_finite("point", point)?;
        }
        if let Some(duration) = duration {
            require_finite_scalar("duration", duration)?;
        }
        let target = target.into();
        let (members, scope) = self.resolve_target(&target)?;
        self.check_slots(&members, ComponentKind::Concentration, &scope)?;

        let default_point = match scope {
            Scope::Individual => Vector3::ZERO,
            Scope::Macro(_) => self.members_centroid_or_origin(&members),
        };
        let start_factor = if duration.is_some() { 1.0 } else { factor };
        let fresh = |point: Option<Vector3>| {
            let mut concentration = Concentration::new(point.unwrap_or(default_point), start_factor)
                .with_scope(scope.clone());
            apply_factor(&mut concentration, factor, duration, curve);
            concentration
        };

        for id in &members {
            let mut motion = self.motion_mut(*id)?;
            let existing = motion
                .component_mut::<Concentration>(ComponentKind::Concentration)
                .filter(|c| c.scope() == &scope);
            match existing {
                Some(concentration) => {
                    if let Some(point) = point {
                        concentration.target_point = point;
                    }
                    apply_factor(concentration, factor, duration, curve);
                }
                None => {
                    motion.replace(Box::new(fresh(point)));
                }
            }
        }

        if let Target::Macro(name) = &target {
            let template = self
                .macro_ref(name)?
                .templates
                .concentration
                .clone()
                .map(|mut template| {
                    if let Some(point) = point {
                        template.target_point = point;
                    }
                    apply_factor(&mut template, factor, duration, curve);
                    template
                })
                .unwrap_or_else(|| fresh(point));
            self.with_macro_mut(name, |group| group.templates.concentration = Some(template));
        }
        debug!(
            "{:?}: concentration factor {} over {:?}s",
            target, factor, duration
        );
        Ok(())
    }

    /// Concentration status of a source or macro. `None` if it has none.
    ///
    /// For a macro this reads the first member's instance, falling back to
    /// the macro's template when it has no members.
    pub fn get_concentration_state(
        &self,
        target: impl Into<Target>,
    ) -> EngineResult<Option<ConcentrationState>> {
        match target.into() {
            Target::Source(id) => Ok(self
                .motion_of(id)?
                .component::<Concentration>(ComponentKind::Concentration)
                .map(Concentration::state)),
            Target::Macro(name) => {
                let group = self.macro_ref(&name)?;
                let live = group.members().iter().find_map(|id| {
                    self.source_motion(*id)
                        .and_then(|motion| {
                            motion.component::<Concentration>(ComponentKind::Concentration)
                        })
                        .filter(|c| c.scope().is_owned_by(&name))
                        .map(Concentration::state)
                });
                Ok(live.or_else(|| group.templates.concentration.as_ref().map(Concentration::state)))
            }
        }
    }

    // ==================== ENABLE / REMOVE ====================

    /// Enable or disable one component of a source without touching the others.
    pub fn set_component_enabled(
        &mut self,
        id: SourceId,
        kind: ComponentKind,
        enabled: bool,
    ) -> EngineResult<()> {
        if !self.motion_mut(id)?.set_enabled(kind, enabled) {
            return Err(ConfigError::InvalidParameter {
                name: "kind",
                reason: format!("source {} has no {} component", id, kind),
            }
            .into());
        }
        debug!("Source {}: {} enabled={}", id, kind, enabled);
        Ok(())
    }

    /// Enable or disable a macro's component on every member.
    pub fn set_macro_component_enabled(
        &mut self,
        name: &str,
        kind: ComponentKind,
        enabled: bool,
    ) -> EngineResult<()> {
        require_macro_kind(kind)?;
        let members = self.resolve_members(name)?;
        if !self.macro_ref(name)?.templates.has(kind) {
            return Err(ConfigError::InvalidParameter {
                name: "kind",
                reason: format!("macro '{}' has no {} component", name, kind),
            }
            .into());
        }
        self.for_each_owned(name, &members, kind, |component| {
            component.set_enabled(enabled)
        });
        self.with_macro_mut(name, |group| group.templates.set_enabled(kind, enabled));
        debug!("Macro '{}': {} enabled={}", name, kind, enabled);
        Ok(())
    }

    /// Remove one component from a source.
    pub fn remove_component(&mut self, id: SourceId, kind: ComponentKind) -> EngineResult<()> {
        if self.motion_mut(id)?.remove(kind).is_none() {
            return Err(ConfigError::InvalidParameter {
                name: "kind",
                reason: format!("source {} has no {} component", id, kind),
            }
            .into());
        }
        debug!("Source {}: removed {}", id, kind);
        Ok(())
    }

    /// Forget a macro's component and strip it from every member.
    pub fn clear_macro_component(&mut self, name: &str, kind: ComponentKind) -> EngineResult<()> {
        require_macro_kind(kind)?;
        let members = self.macro_ref(name)?.members().to_vec();
        for id in &members {
            if let Ok(mut motion) = self.motion_mut(*id)
                && motion
                    .get(kind)
                    .is_some_and(|component| component.scope().is_owned_by(name))
            {
                motion.remove(kind);
            }
        }
        self.with_macro_mut(name, |group| group.templates.clear(kind));
        debug!("Macro '{}': cleared {}", name, kind);
        Ok(())
    }
}
