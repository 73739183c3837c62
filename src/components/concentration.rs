//! Concentration component: pulls sources toward a point.
//!
//! `factor` runs from 0 (fully concentrated on `target_point`) to 1 (fully
//! dispersed, no effect). Each tick the source is moved to
//! `lerp(position, target_point, 1 - factor)`.
//!
//! A factor change can be animated over a duration with one of the
//! [`ConcentrationCurve`]s, in the same way tweens ease their progress.

use std::any::Any;
use std::f32::consts::LN_2;

use serde::{Deserialize, Serialize};

use crate::components::motioncomponent::{ComponentKind, MotionComponent, Scope};
use crate::components::motionstate::{MotionDelta, MotionState};
use crate::math::{Vector3, lerp_f32};

/// Easing curves for animated factor transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationCurve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Exponential,
    Bounce,
}

/// Apply an easing curve to a normalized time value.
///
/// The input is clamped to `[0, 1]`; every curve maps 0 to 0 and 1 to 1.
pub fn ease(curve: ConcentrationCurve, t: f32) -> f32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    match curve {
        ConcentrationCurve::Linear => t,
        ConcentrationCurve::EaseIn => t * t,
        ConcentrationCurve::EaseOut => t * (2.0 - t),
        ConcentrationCurve::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        ConcentrationCurve::Exponential => {
            // (2^(10t) - 1) / (2^10 - 1)
            ((10.0 * LN_2 * t).exp() - 1.0) / 1023.0
        }
        ConcentrationCurve::Bounce => bounce_out(t),
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// In-flight factor animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorTransition {
    pub start_factor: f32,
    pub target_factor: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub curve: ConcentrationCurve,
}

/// Scope reported by [`ConcentrationState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationMode {
    Individual,
    Macro,
}

/// Introspection snapshot of a concentration instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationState {
    pub enabled: bool,
    pub factor: f32,
    pub animating: bool,
    pub mode: ConcentrationMode,
    pub target_factor: Option<f32>,
    pub curve: Option<ConcentrationCurve>,
}

/// Pulls a source toward `target_point` by `1 - factor` each tick.
#[derive(Clone, Debug)]
pub struct Concentration {
    pub enabled: bool,
    pub target_point: Vector3,
    factor: f32,
    transition: Option<FactorTransition>,
    scope: Scope,
}

impl Concentration {
    pub fn new(target_point: Vector3, factor: f32) -> Self {
        Concentration {
            enabled: true,
            target_point,
            factor: clamp_factor(factor),
            transition: None,
            scope: Scope::Individual,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Jump straight to `factor`, cancelling any animation.
    pub fn set_factor(&mut self, factor: f32) {
        self.factor = clamp_factor(factor);
        self.transition = None;
    }

    /// Animate from the current factor to `target_factor` over `duration` seconds.
    pub fn animate_to(&mut self, target_factor: f32, duration: f32, curve: ConcentrationCurve) {
        let target_factor = clamp_factor(target_factor);
        if !duration.is_finite() || duration <= 0.0 {
            self.set_factor(target_factor);
            return;
        }
        self.transition = Some(FactorTransition {
            start_factor: self.factor,
            target_factor,
            duration,
            elapsed: 0.0,
            curve,
        });
    }

    pub fn state(&self) -> ConcentrationState {
        ConcentrationState {
            enabled: self.enabled,
            factor: self.factor,
            animating: self.is_animating(),
            mode: match self.scope {
                Scope::Individual => ConcentrationMode::Individual,
                Scope::Macro(_) => ConcentrationMode::Macro,
            },
            target_factor: self.transition.map(|t| t.target_factor),
            curve: self.transition.map(|t| t.curve),
        }
    }

    fn advance_transition(&mut self, dt: f32) {
        let Some(mut tr) = self.transition else {
            return;
        };
        tr.elapsed += dt.max(0.0);
        let u = tr.elapsed / tr.duration;
        if !u.is_finite() || u >= 1.0 {
            self.factor = tr.target_factor;
            self.transition = None;
        } else {
            self.factor = clamp_factor(lerp_f32(tr.start_factor, tr.target_factor, ease(tr.curve, u)));
            self.transition = Some(tr);
        }
    }
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

impl MotionComponent for Concentration {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Concentration
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn calculate_delta(&mut self, state: &MotionState, _t: f32, dt: f32) -> Option<MotionDelta> {
        if !self.enabled {
            return None;
        }
        if dt.is_finite() {
            self.advance_transition(dt);
        }
        if self.factor >= 1.0 {
            return None;
        }
        let pulled = state.position.lerp(self.target_point, 1.0 - self.factor);
        MotionDelta::translation(pulled - state.position, self.kind()).significant()
    }

    fn box_clone(&self) -> Box<dyn MotionComponent> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
