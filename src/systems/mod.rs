//! Engine systems.
//!
//! The per-tick schedule runs these in order:
//! [`centroid`] → [`motion`] → [`sync`] → [`dispatch`].
//!
//! Submodules overview
//! - [`centroid`] – refresh centroid-following macro trajectories
//! - [`dispatch`] – best-effort send of the output frame to the renderer
//! - [`motion`] – compose every source's component deltas
//! - [`sync`] – copy source state into the flat output arrays
//! - [`time`] – advance simulation time and the tick counter

pub mod centroid;
pub mod dispatch;
pub mod motion;
pub mod sync;
pub mod time;
