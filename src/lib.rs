//! Spatial motion engine library.
//!
//! Drives the position, orientation and aperture of many addressable sound
//! sources, grouped into named macros, by summing the per-tick deltas of
//! independent motion components. This module exposes the engine's ECS
//! components, resources, systems and events for integration tests and
//! embedding hosts.

pub mod components;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod resources;
pub mod systems;
