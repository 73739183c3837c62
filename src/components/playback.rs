//! Phase driver for trajectory components.
//!
//! A [`PlaybackController`] advances a normalized phase under one of several
//! mutually exclusive [`PlaybackMode`]s. Trajectory components own one
//! controller each and call [`PlaybackController::advance`] exactly once per
//! tick.
//!
//! # Modes
//!
//! - **Fix** – constant speed, wraps around `[0, 1)`; speed may be negative
//! - **Random** – resamples speed and direction every `change_interval`
//!   seconds and reflects at the ends instead of wrapping
//! - **Freeze** – pins the phase until [`unfreeze`](PlaybackController::unfreeze)
//! - **Vibration** – oscillates around the phase held when the mode started
//! - **Spin** – monotonic advance with periodic speed modulation
//!
//! Switching modes resets the internal timers. There is no terminal state.

use std::f32::consts::TAU;

use fastrand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest random-mode resample interval, in seconds.
const MIN_CHANGE_INTERVAL: f32 = 0.01;

/// How a trajectory's phase advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Fix,
    Random,
    Freeze,
    Vibration,
    Spin,
}

/// Parameters for [`PlaybackMode::Random`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomSettings {
    /// Seconds between speed/direction resamples.
    pub change_interval: f32,
    /// Lower bound of the resampled speed, as a factor of the base speed.
    pub min_speed_factor: f32,
    /// Upper bound of the resampled speed, as a factor of the base speed.
    pub max_speed_factor: f32,
}

impl Default for RandomSettings {
    fn default() -> Self {
        RandomSettings {
            change_interval: 2.0,
            min_speed_factor: 0.5,
            max_speed_factor: 1.5,
        }
    }
}

/// Parameters for [`PlaybackMode::Vibration`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VibrationSettings {
    /// Peak phase offset around the base value.
    pub amplitude: f32,
    /// Oscillation frequency in Hz.
    pub frequency: f32,
}

impl Default for VibrationSettings {
    fn default() -> Self {
        VibrationSettings {
            amplitude: 0.05,
            frequency: 2.0,
        }
    }
}

/// Parameters for [`PlaybackMode::Spin`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinSettings {
    /// Relative speed modulation depth. Values below 1 keep the phase monotonic.
    pub variation: f32,
    /// Modulation frequency in Hz.
    pub frequency: f32,
}

impl Default for SpinSettings {
    fn default() -> Self {
        SpinSettings {
            variation: 0.5,
            frequency: 0.25,
        }
    }
}

/// Advances a normalized phase according to the active [`PlaybackMode`].
#[derive(Clone, Debug)]
pub struct PlaybackController {
    mode: PlaybackMode,
    /// Base speed in cycles per second.
    speed: f32,
    pub random: RandomSettings,
    pub vibration: VibrationSettings,
    pub spin: SpinSettings,
    /// Seconds since the current mode was entered.
    elapsed: f32,
    random_timer: f32,
    random_speed: Option<f32>,
    direction: f32,
    vibration_base: Option<f32>,
    freeze_value: Option<f32>,
    /// Mode restored by `unfreeze`.
    resume_mode: PlaybackMode,
    rng: Rng,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackMode::Fix, 0.1)
    }
}

impl PlaybackController {
    pub fn new(mode: PlaybackMode, speed: f32) -> Self {
        PlaybackController {
            mode,
            speed: if speed.is_finite() { speed } else { 0.0 },
            random: RandomSettings::default(),
            vibration: VibrationSettings::default(),
            spin: SpinSettings::default(),
            elapsed: 0.0,
            random_timer: 0.0,
            random_speed: None,
            direction: 1.0,
            vibration_base: None,
            freeze_value: None,
            resume_mode: PlaybackMode::Fix,
            rng: Rng::new(),
        }
    }

    /// Use a deterministic random generator (Random mode).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    pub fn with_random(mut self, settings: RandomSettings) -> Self {
        self.random = settings;
        self
    }

    pub fn with_vibration(mut self, settings: VibrationSettings) -> Self {
        self.vibration = settings;
        self
    }

    pub fn with_spin(mut self, settings: SpinSettings) -> Self {
        self.spin = settings;
        self
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.speed = speed;
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.mode == PlaybackMode::Freeze
    }

    /// Switch to another mode and reset timers.
    ///
    /// While frozen, the new mode is remembered and takes effect on
    /// [`unfreeze`](Self::unfreeze).
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        if self.is_frozen() && mode != PlaybackMode::Freeze {
            self.resume_mode = mode;
            return;
        }
        if mode == PlaybackMode::Freeze && !self.is_frozen() {
            self.resume_mode = self.mode;
        }
        self.mode = mode;
        self.reset_timers();
    }

    /// Pin the phase at `value` until [`unfreeze`](Self::unfreeze).
    pub fn freeze(&mut self, value: f32) {
        if !self.is_frozen() {
            self.resume_mode = self.mode;
            self.mode = PlaybackMode::Freeze;
            self.reset_timers();
        }
        self.freeze_value = Some(if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        });
    }

    /// Leave Freeze and return to the mode active before it.
    pub fn unfreeze(&mut self) {
        if self.is_frozen() {
            self.mode = self.resume_mode;
            self.freeze_value = None;
            self.reset_timers();
        }
    }

    fn reset_timers(&mut self) {
        self.elapsed = 0.0;
        self.random_timer = 0.0;
        self.random_speed = None;
        self.direction = 1.0;
        self.vibration_base = None;
    }

    /// Advance `phase` by one tick of `dt` seconds and return the new phase.
    pub fn advance(&mut self, dt: f32, phase: f32) -> f32 {
        let phase = if phase.is_finite() { phase } else { 0.0 };
        if !dt.is_finite() || dt <= 0.0 {
            return phase;
        }
        self.elapsed += dt;
        match self.mode {
            PlaybackMode::Fix => wrap_phase(phase + self.speed * dt),
            PlaybackMode::Random => self.advance_random(dt, phase),
            PlaybackMode::Freeze => *self.freeze_value.get_or_insert(phase.clamp(0.0, 1.0)),
            PlaybackMode::Vibration => {
                let base = *self.vibration_base.get_or_insert(phase);
                let swing = (TAU * self.vibration.frequency * self.elapsed).sin();
                (base + self.vibration.amplitude * swing).clamp(0.0, 1.0)
            }
            PlaybackMode::Spin => {
                let modulation = (TAU * self.spin.frequency * self.elapsed).sin();
                wrap_phase(phase + dt * self.speed * (1.0 + self.spin.variation * modulation))
            }
        }
    }

    fn advance_random(&mut self, dt: f32, phase: f32) -> f32 {
        let interval = self.random.change_interval.max(MIN_CHANGE_INTERVAL);
        if self.random_speed.is_none() || self.random_timer >= interval {
            self.resample();
            self.random_timer = 0.0;
        }
        self.random_timer += dt;

        let speed = self.random_speed.unwrap_or(self.speed.abs());
        let mut next = phase + speed * self.direction * dt;
        // Reflect off the ends; a few passes cover steps longer than the range.
        for _ in 0..4 {
            if next < 0.0 {
                next = -next;
                self.direction = -self.direction;
            } else if next > 1.0 {
                next = 2.0 - next;
                self.direction = -self.direction;
            } else {
                break;
            }
        }
        next.clamp(0.0, 1.0)
    }

    fn resample(&mut self) {
        let lo = self.random.min_speed_factor.min(self.random.max_speed_factor);
        let hi = self.random.min_speed_factor.max(self.random.max_speed_factor);
        let factor = lo + (hi - lo) * self.rng.f32();
        self.random_speed = Some(self.speed.abs() * factor);
        self.direction = if self.rng.bool() { 1.0 } else { -1.0 };
    }

    /// Instantaneous phase rate in cycles per second.
    pub fn effective_speed(&self) -> f32 {
        match self.mode {
            PlaybackMode::Fix => self.speed,
            PlaybackMode::Random => self.random_speed.unwrap_or(self.speed.abs()) * self.direction,
            PlaybackMode::Freeze => 0.0,
            PlaybackMode::Vibration => {
                let w = TAU * self.vibration.frequency;
                self.vibration.amplitude * w * (w * self.elapsed).cos()
            }
            PlaybackMode::Spin => {
                let modulation = (TAU * self.spin.frequency * self.elapsed).sin();
                self.speed * (1.0 + self.spin.variation * modulation)
            }
        }
    }
}

/// Wrap a phase into `[0, 1)`.
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
