//! Named macros and their group-scope component templates.
//!
//! A [`Macro`] keeps the configuration it was last given for each group
//! kind. The engine clones these templates into every member's
//! `SourceMotion`, so members never share an instance. Templates are also
//! used to configure sources that join the macro later.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::concentration::Concentration;
use crate::components::motioncomponent::{ComponentKind, MotionComponent};
use crate::components::rotation::{AlgorithmicRotation, ManualRotation};
use crate::components::sourcemotion::SourceId;
use crate::components::trajectory::MacroTrajectory;
use crate::error::ConfigError;

/// Group-scope configuration owned by a macro.
#[derive(Clone, Debug, Default)]
pub struct MacroTemplates {
    pub trajectory: Option<MacroTrajectory>,
    pub rotation: Option<AlgorithmicRotation>,
    pub manual_rotation: Option<ManualRotation>,
    pub concentration: Option<Concentration>,
}

impl MacroTemplates {
    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::MacroTrajectory => self.trajectory.is_some(),
            ComponentKind::MacroRotation => self.rotation.is_some(),
            ComponentKind::MacroManualRotation => self.manual_rotation.is_some(),
            ComponentKind::Concentration => self.concentration.is_some(),
            _ => false,
        }
    }

    /// Forget the template for `kind`. Returns whether one existed.
    pub fn clear(&mut self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::MacroTrajectory => self.trajectory.take().is_some(),
            ComponentKind::MacroRotation => self.rotation.take().is_some(),
            ComponentKind::MacroManualRotation => self.manual_rotation.take().is_some(),
            ComponentKind::Concentration => self.concentration.take().is_some(),
            _ => false,
        }
    }

    /// Set `enabled` on the template for `kind`. Returns whether one existed.
    pub fn set_enabled(&mut self, kind: ComponentKind, enabled: bool) -> bool {
        match kind {
            ComponentKind::MacroTrajectory => self.trajectory.as_mut().map(|t| t.enabled = enabled),
            ComponentKind::MacroRotation => self.rotation.as_mut().map(|t| t.enabled = enabled),
            ComponentKind::MacroManualRotation => {
                self.manual_rotation.as_mut().map(|t| t.enabled = enabled)
            }
            ComponentKind::Concentration => self.concentration.as_mut().map(|t| t.enabled = enabled),
            _ => None,
        }
        .is_some()
    }

    /// Boxed copy of the template for `kind`.
    pub fn instantiate(&self, kind: ComponentKind) -> Option<Box<dyn MotionComponent>> {
        match kind {
            ComponentKind::MacroTrajectory => self
                .trajectory
                .clone()
                .map(|t| Box::new(t) as Box<dyn MotionComponent>),
            ComponentKind::MacroRotation => self
                .rotation
                .clone()
                .map(|t| Box::new(t) as Box<dyn MotionComponent>),
            ComponentKind::MacroManualRotation => self
                .manual_rotation
                .clone()
                .map(|t| Box::new(t) as Box<dyn MotionComponent>),
            ComponentKind::Concentration => self
                .concentration
                .clone()
                .map(|t| Box::new(t) as Box<dyn MotionComponent>),
            _ => None,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

/// A named, ordered set of unique source ids.
#[derive(Clone, Debug)]
pub struct Macro {
    name: String,
    members: Vec<SourceId>,
    pub templates: MacroTemplates,
}

impl Macro {
    /// Duplicate ids are dropped, keeping the first occurrence.
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = SourceId>) -> Self {
        let mut group = Macro {
            name: name.into(),
            members: Vec::new(),
            templates: MacroTemplates::default(),
        };
        for id in members {
            group.add_member(id);
        }
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[SourceId] {
        &self.members
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.members.contains(&id)
    }

    pub fn add_member(&mut self, id: SourceId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub fn remove_member(&mut self, id: SourceId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != id);
        self.members.len() != before
    }
}

#[derive(Resource, Debug, Default)]
pub struct MacroRegistry {
    macros: FxHashMap<String, Macro>,
}

impl MacroRegistry {
    pub fn insert(&mut self, group: Macro) -> Result<(), ConfigError> {
        if self.macros.contains_key(group.name()) {
            return Err(ConfigError::DuplicateMacro(group.name().to_string()));
        }
        self.macros.insert(group.name().to_string(), group);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Macro> {
        self.macros.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Macro> {
        self.macros.get_mut(name)
    }

    /// Look up a macro or fail with [`ConfigError::UnknownMacro`].
    pub fn require(&self, name: &str) -> Result<&Macro, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownMacro(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Macro names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.macros.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of every macro `id` belongs to, sorted.
    pub fn macros_containing(&self, id: SourceId) -> Vec<String> {
        let mut names: Vec<String> = self
            .macros
            .values()
            .filter(|group| group.contains(id))
            .map(|group| group.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
