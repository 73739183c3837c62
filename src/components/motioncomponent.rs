//! The motion component abstraction.
//!
//! A motion component is a stateful unit that contributes one delta per tick
//! to a single source. Every concrete component implements
//! [`MotionComponent`]; a [`SourceMotion`](super::sourcemotion::SourceMotion)
//! holds at most one instance per [`ComponentKind`] and sums their deltas.
//!
//! Components never write to the source state themselves. They read the live
//! [`MotionState`] and return a [`MotionDelta`]; summation and write-back
//! happen exactly once, inside `SourceMotion`.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::motionstate::{MotionDelta, MotionState};
use crate::components::playback::PlaybackController;

/// Closed set of component slots a source can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    IndividualTrajectory,
    MacroTrajectory,
    IndividualRotation,
    MacroRotation,
    IndividualManualRotation,
    MacroManualRotation,
    Concentration,
}

impl ComponentKind {
    pub const COUNT: usize = 7;

    /// Every kind, in summation order.
    pub const ALL: [ComponentKind; Self::COUNT] = [
        ComponentKind::IndividualTrajectory,
        ComponentKind::MacroTrajectory,
        ComponentKind::IndividualRotation,
        ComponentKind::MacroRotation,
        ComponentKind::IndividualManualRotation,
        ComponentKind::MacroManualRotation,
        ComponentKind::Concentration,
    ];

    /// Slot index inside a source's component table.
    pub fn index(self) -> usize {
        match self {
            ComponentKind::IndividualTrajectory => 0,
            ComponentKind::MacroTrajectory => 1,
            ComponentKind::IndividualRotation => 2,
            ComponentKind::MacroRotation => 3,
            ComponentKind::IndividualManualRotation => 4,
            ComponentKind::MacroManualRotation => 5,
            ComponentKind::Concentration => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::IndividualTrajectory => "individual_trajectory",
            ComponentKind::MacroTrajectory => "macro_trajectory",
            ComponentKind::IndividualRotation => "individual_rotation",
            ComponentKind::MacroRotation => "macro_rotation",
            ComponentKind::IndividualManualRotation => "individual_manual_rotation",
            ComponentKind::MacroManualRotation => "macro_manual_rotation",
            ComponentKind::Concentration => "concentration",
        }
    }

    /// Kinds that are only ever configured through a macro.
    pub fn is_macro_scope(self) -> bool {
        matches!(
            self,
            ComponentKind::MacroTrajectory
                | ComponentKind::MacroRotation
                | ComponentKind::MacroManualRotation
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who configured a component instance.
///
/// Macro-scope instances remember the owning macro so that deleting the
/// macro, or removing a member from it, strips exactly the instances it
/// created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    Individual,
    Macro(String),
}

impl Scope {
    pub fn macro_name(&self) -> Option<&str> {
        match self {
            Scope::Individual => None,
            Scope::Macro(name) => Some(name.as_str()),
        }
    }

    pub fn is_owned_by(&self, macro_name: &str) -> bool {
        self.macro_name() == Some(macro_name)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Individual => f.write_str("individual scope"),
            Scope::Macro(name) => write!(f, "macro '{}'", name),
        }
    }
}

/// A stateful unit producing one motion delta per tick.
///
/// # Contract
///
/// - `calculate_delta` returns `None` when the component is disabled or when
///   its contribution is below [`MOTION_EPSILON`](super::motionstate::MOTION_EPSILON).
/// - Each call advances internal phase/angle state exactly once. Callers must
///   query a component at most once per tick.
/// - The delta is computed against the `state` passed in, which is always the
///   live state of the source. Nothing may be cached from configuration time.
/// - Implementations never block, never perform I/O and never return
///   non-finite values for finite inputs.
pub trait MotionComponent: Send + Sync + fmt::Debug {
    fn kind(&self) -> ComponentKind;

    fn scope(&self) -> &Scope;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn calculate_delta(&mut self, state: &MotionState, t: f32, dt: f32) -> Option<MotionDelta>;

    /// Deep copy, used to fan a macro template out to each member.
    fn box_clone(&self) -> Box<dyn MotionComponent>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Phase driver, for components that have one.
    fn playback_mut(&mut self) -> Option<&mut PlaybackController> {
        None
    }
}

impl Clone for Box<dyn MotionComponent> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
