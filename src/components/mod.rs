//! ECS components and motion algorithms for sources.
//!
//! Every source entity carries one [`sourcemotion::SourceMotion`], which owns
//! the source's authoritative state and at most one motion component per
//! [`motioncomponent::ComponentKind`]. The remaining modules implement the
//! concrete components that produce per-tick deltas.
//!
//! Submodules overview:
//! - [`concentration`] – pull toward a target point with animated factor transitions
//! - [`motioncomponent`] – the `MotionComponent` trait, component kinds and scopes
//! - [`motionstate`] – per-source state and the per-tick delta value type
//! - [`playback`] – phase driver for trajectories (Fix/Random/Freeze/Vibration/Spin)
//! - [`rotation`] – algorithmic and manually interpolated rotations about a center
//! - [`shape`] – parametric trajectory shapes sampled by phase
//! - [`sourcemotion`] – per-source aggregation: sum, clamp, apply once
//! - [`trajectory`] – individual and macro trajectories

pub mod concentration;
pub mod motioncomponent;
pub mod motionstate;
pub mod playback;
pub mod rotation;
pub mod shape;
pub mod sourcemotion;
pub mod trajectory;
