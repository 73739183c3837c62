//! Per-source motion aggregation.
//!
//! A [`SourceMotion`] is the ECS component attached to every source entity.
//! It owns the source's authoritative [`MotionState`] and a fixed table with
//! one optional slot per [`ComponentKind`].
//!
//! # Composition
//!
//! Each tick [`SourceMotion::compose`]:
//!
//! 1. asks every enabled component for its delta against the live state,
//!    discarding `None` and non-finite results;
//! 2. **sums** the deltas with equal weight (never averages);
//! 3. clamps the summed position delta to `max_speed * dt`;
//! 4. applies the result to the state exactly once and derives velocity.
//!
//! Every component sees the same pre-tick state, so the outcome does not
//! depend on slot order.

use std::fmt;

use bevy_ecs::prelude::Component;
use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::motioncomponent::{ComponentKind, MotionComponent, Scope};
use crate::components::motionstate::MotionState;
use crate::error::ConfigError;
use crate::math::{Vector3, normalize_orientation};

/// Identifier of an addressable source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SourceId {
    fn from(id: u32) -> Self {
        SourceId(id)
    }
}

/// What happened to one source during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Position change actually applied (after clamping).
    pub position: Vector3,
    /// Orientation change applied, as `(yaw, pitch, roll)`.
    pub orientation: Vector3,
    pub aperture: f32,
    /// Kinds that contributed a delta, in slot order.
    pub contributors: SmallVec<[ComponentKind; 4]>,
    /// Kinds whose delta was dropped because it was not finite.
    pub discarded: SmallVec<[ComponentKind; 2]>,
    /// `true` when the summed position delta exceeded `max_speed * dt`.
    pub clamped: bool,
}

/// Motion state and active components of one source.
#[derive(Component, Clone)]
pub struct SourceMotion {
    id: SourceId,
    state: MotionState,
    slots: [Option<Box<dyn MotionComponent>>; ComponentKind::COUNT],
}

impl SourceMotion {
    pub fn new(id: SourceId) -> Self {
        Self::at(id, Vector3::ZERO)
    }

    pub fn at(id: SourceId, position: Vector3) -> Self {
        SourceMotion {
            id,
            state: MotionState::at(position),
            slots: Default::default(),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Teleport the source. Velocity is reset.
    pub fn set_position(&mut self, position: Vector3) {
        if position.is_finite() {
            self.state.position = position;
            self.state.velocity = Vector3::ZERO;
        }
    }

    pub fn set_orientation(&mut self, orientation: Vector3) {
        if orientation.is_finite() {
            self.state.orientation = normalize_orientation(orientation);
        }
    }

    pub fn set_aperture(&mut self, aperture: f32) {
        if aperture.is_finite() {
            self.state.aperture = aperture.clamp(0.0, 1.0);
        }
    }

    // ==================== SLOTS ====================

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&(dyn MotionComponent + 'static)> {
        self.slots[kind.index()].as_deref()
    }

    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut (dyn MotionComponent + 'static)> {
        self.slots[kind.index()].as_deref_mut()
    }

    /// Typed access to the component in `kind`'s slot.
    pub fn component<T: 'static>(&self, kind: ComponentKind) -> Option<&T> {
        self.get(kind).and_then(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn component_mut<T: 'static>(&mut self, kind: ComponentKind) -> Option<&mut T> {
        self.get_mut(kind)
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Kinds currently held, in slot order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| self.has(*kind))
    }

    /// Check whether a component of `kind` configured under `scope` may be
    /// placed here.
    ///
    /// Only the scope that holds a slot may reconfigure it. This matters for
    /// [`ComponentKind::Concentration`], the one slot shared by individual and
    /// macro scope, as well as for two macros with a common member.
    pub fn can_accept(&self, kind: ComponentKind, scope: &Scope) -> Result<(), ConfigError> {
        match self.get(kind) {
            Some(existing) if existing.scope() != scope => Err(ConfigError::DuplicateComponent {
                source_id: self.id,
                kind,
                owner: existing.scope().to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Add a component to an empty slot.
    pub fn attach(&mut self, component: Box<dyn MotionComponent>) -> Result<(), ConfigError> {
        let kind = component.kind();
        if let Some(existing) = self.get(kind) {
            return Err(ConfigError::DuplicateComponent {
                source_id: self.id,
                kind,
                owner: existing.scope().to_string(),
            });
        }
        self.slots[kind.index()] = Some(component);
        Ok(())
    }

    /// Put a component in its slot, returning whatever was there.
    pub fn replace(&mut self, component: Box<dyn MotionComponent>) -> Option<Box<dyn MotionComponent>> {
        let kind = component.kind();
        self.slots[kind.index()].replace(component)
    }

    pub fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn MotionComponent>> {
        self.slots[kind.index()].take()
    }

    /// Drop every component owned by `macro_name`. Returns how many were removed.
    pub fn remove_owned_by(&mut self, macro_name: &str) -> usize {
        let mut removed = 0;
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|c| c.scope().is_owned_by(macro_name)) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    /// Enable or disable the component in `kind`'s slot. Returns `false` if empty.
    pub fn set_enabled(&mut self, kind: ComponentKind, enabled: bool) -> bool {
        match self.get_mut(kind) {
            Some(component) => {
                component.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    // ==================== COMPOSITION ====================

    /// Run one tick: gather, sum, clamp, apply once.
    ///
    /// `max_speed` bounds the summed position delta to `max_speed * dt`.
    /// A non-positive or non-finite `max_speed` disables the bound.
    pub fn compose(&mut self, t: f32, dt: f32, max_speed: f32) -> TickReport {
        let mut report = TickReport::default();
        let mut position = Vector3::ZERO;
        let mut orientation = Vector3::ZERO;
        let mut aperture = 0.0;

        let state = &self.state;
        for component in self.slots.iter_mut().flatten() {
            if !component.is_enabled() {
                continue;
            }
            let Some(delta) = component.calculate_delta(state, t, dt) else {
                continue;
            };
            if !delta.is_finite() {
                warn!(
                    "source {}: discarding non-finite {} delta",
                    self.id, delta.provenance
                );
                report.discarded.push(delta.provenance);
                continue;
            }
            position += delta.position;
            orientation += delta.orientation;
            aperture += delta.aperture;
            report.contributors.push(delta.provenance);
        }

        if dt.is_finite() && dt > 0.0 && max_speed.is_finite() && max_speed > 0.0 {
            let limit = max_speed * dt;
            let length = position.length();
            if length > limit {
                position *= limit / length;
                report.clamped = true;
            }
        }

        self.state.position += position;
        self.state.orientation = normalize_orientation(self.state.orientation + orientation);
        self.state.aperture = (self.state.aperture + aperture).clamp(0.0, 1.0);
        self.state.velocity = if dt.is_finite() && dt > 0.0 {
            position / dt
        } else {
            Vector3::ZERO
        };

        report.position = position;
        report.orientation = orientation;
        report.aperture = aperture;
        report
    }
}

impl fmt::Debug for SourceMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMotion")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("components", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}
