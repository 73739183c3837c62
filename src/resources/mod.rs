//! ECS resources made available to systems.
//!
//! Long-lived data injected into the engine's world and read by systems
//! during a tick. The registries are only mutated between ticks by the
//! engine's configuration surface.
//!
//! Overview
//! - `engineconfig` – tick rate, speed limit and renderer settings (INI-backed)
//! - `enginetime` – simulation time, delta and tick counter
//! - `macroregistry` – named macros, their members and group-scope templates
//! - `output` – flat position/orientation/aperture arrays rewritten each tick
//! - `renderer` – bounded channel to the renderer collaborator
//! - `sourceregistry` – source id to entity lookup in registration order
pub mod engineconfig;
pub mod enginetime;
pub mod macroregistry;
pub mod output;
pub mod renderer;
pub mod sourceregistry;
