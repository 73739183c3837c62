//! Engine configuration resource.
//!
//! Settings loaded from an INI file. Defaults are safe for startup, so a
//! missing or partial file only overrides what it names.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! tick_rate = 60
//! max_speed = 100.0
//! time_scale = 1.0
//!
//! [renderer]
//! enabled = true
//! queue_capacity = 64
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_TICK_RATE: u32 = 60;
const DEFAULT_MAX_SPEED: f32 = 100.0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_RENDERER_ENABLED: bool = true;
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_CONFIG_PATH: &str = "./spatialmotion.ini";

/// Engine configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Ticks per second. Calls to `update` faster than this are no-ops.
    pub tick_rate: u32,
    /// Upper bound on a source's summed position change, in units per second.
    pub max_speed: f32,
    /// Multiplier applied to every tick's delta.
    pub time_scale: f32,
    /// Whether the demo host attaches a renderer channel.
    pub renderer_enabled: bool,
    /// Frames the renderer channel buffers before dropping.
    pub queue_capacity: usize,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_speed: DEFAULT_MAX_SPEED,
            time_scale: DEFAULT_TIME_SCALE,
            renderer_enabled: DEFAULT_RENDERER_ENABLED,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate.max(1);
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        if max_speed.is_finite() && max_speed > 0.0 {
            self.max_speed = max_speed;
        }
        self
    }

    /// Seconds between ticks.
    pub fn tick_period(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Out-of-range
    /// values are ignored with a warning.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [engine] section
        if let Some(rate) = config.getuint("engine", "tick_rate").ok().flatten() {
            if rate == 0 {
                warn!("Ignoring tick_rate = 0");
            } else {
                self.tick_rate = rate.min(u32::MAX as u64) as u32;
            }
        }
        if let Some(speed) = config.getfloat("engine", "max_speed").ok().flatten() {
            let speed = speed as f32;
            if speed.is_finite() && speed > 0.0 {
                self.max_speed = speed;
            } else {
                warn!("Ignoring max_speed = {}", speed);
            }
        }
        if let Some(scale) = config.getfloat("engine", "time_scale").ok().flatten() {
            let scale = scale as f32;
            if scale.is_finite() && scale >= 0.0 {
                self.time_scale = scale;
            } else {
                warn!("Ignoring time_scale = {}", scale);
            }
        }

        // [renderer] section
        if let Some(enabled) = config.getbool("renderer", "enabled").ok().flatten() {
            self.renderer_enabled = enabled;
        }
        if let Some(capacity) = config.getuint("renderer", "queue_capacity").ok().flatten() {
            self.queue_capacity = (capacity as usize).max(1);
        }

        info!(
            "Loaded config: tick_rate={}, max_speed={}, time_scale={}, renderer={} (capacity {})",
            self.tick_rate,
            self.max_speed,
            self.time_scale,
            self.renderer_enabled,
            self.queue_capacity
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [engine] section
        config.set("engine", "tick_rate", Some(self.tick_rate.to_string()));
        config.set("engine", "max_speed", Some(self.max_speed.to_string()));
        config.set("engine", "time_scale", Some(self.time_scale.to_string()));

        // [renderer] section
        config.set("renderer", "enabled", Some(self.renderer_enabled.to_string()));
        config.set(
            "renderer",
            "queue_capacity",
            Some(self.queue_capacity.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
