//! Error taxonomy for the configuration surface.
//!
//! Configuration calls validate every referenced id up front and return one
//! of these errors without touching engine state. Per-tick math never
//! returns an error; degenerate numeric cases fall back to a zero delta
//! inside the components themselves.

use thiserror::Error;

use crate::components::motioncomponent::ComponentKind;
use crate::components::sourcemotion::SourceId;

/// Errors caused by a configuration call referencing something that does not
/// exist, or that would break the one-instance-per-kind rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown macro '{0}'")]
    UnknownMacro(String),

    #[error("unknown source {0}")]
    UnknownSource(SourceId),

    #[error("source {source_id} already holds a {kind} owned by {owner}")]
    DuplicateComponent {
        source_id: SourceId,
        kind: ComponentKind,
        owner: String,
    },

    #[error("source {0} already exists")]
    DuplicateSource(SourceId),

    #[error("macro '{0}' already exists")]
    DuplicateMacro(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Geometry that cannot produce a usable trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("degenerate {shape} shape: {reason}")]
    DegenerateShape { shape: &'static str, reason: String },
}

/// Internal bookkeeping went out of sync. Seeing one of these is a bug in
/// the engine, not in the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("macro '{macro_name}' references source {source_id} which has no motion state")]
    DanglingMacroMember {
        macro_name: String,
        source_id: SourceId,
    },
}

/// Any error the [`Engine`](crate::engine::Engine) configuration surface can return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

pub type EngineResult<T> = Result<T, EngineError>;
