//! Messages crossing the engine boundary.
//!
//! Submodules:
//! - [`command`] – configuration commands queued by other threads
//! - [`frame`] – per-tick snapshot sent to the renderer collaborator
pub mod command;
pub mod frame;
