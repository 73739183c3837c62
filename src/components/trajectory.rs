//! Trajectory components.
//!
//! Both variants compute a target point from a [`ShapePath`] sampled at the
//! phase produced by their [`PlaybackController`], then return the
//! difference between that target and the source's live position:
//!
//! ```text
//! target = center (+ member offset) + shape(phase)
//! delta  = target - state.position
//! ```
//!
//! Because the target is recomputed against the live state every tick, other
//! components can perturb the source in the same tick; the summed delta is
//! bounded by [`SourceMotion`](super::sourcemotion::SourceMotion).

use std::any::Any;

use crate::components::motioncomponent::{ComponentKind, MotionComponent, Scope};
use crate::components::motionstate::{MotionDelta, MotionState};
use crate::components::playback::PlaybackController;
use crate::components::shape::ShapePath;
use crate::math::Vector3;

/// Per-source trajectory.
#[derive(Clone, Debug)]
pub struct IndividualTrajectory {
    pub enabled: bool,
    pub path: ShapePath,
    pub playback: PlaybackController,
    pub center: Vector3,
    phase: f32,
    scope: Scope,
}

impl IndividualTrajectory {
    pub fn new(path: ShapePath, playback: PlaybackController, center: Vector3) -> Self {
        IndividualTrajectory {
            enabled: true,
            path,
            playback,
            center,
            phase: 0.0,
            scope: Scope::Individual,
        }
    }

    /// Start at `phase` instead of 0.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase.clamp(0.0, 1.0);
        self
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Point the source is steered to at the current phase.
    pub fn target(&self) -> Vector3 {
        self.center + self.path.sample(self.phase)
    }
}

impl MotionComponent for IndividualTrajectory {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IndividualTrajectory
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
        self.phase = self.playback.advance(dt, self.phase);
        let delta = self.target() - state.position;
        MotionDelta::translation(delta, self.kind()).significant()
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

    fn playback_mut(&mut self) -> Option<&mut PlaybackController> {
        Some(&mut self.playback)
    }
}

/// Group trajectory, one independent instance per macro member.
///
/// Each member keeps its configuration-time `offset` from the group center so
/// the formation travels along the shape instead of collapsing onto it.
///
/// With `follow_centroid` set, the engine refreshes `center` every tick from
/// the macro's live centroid, minus the shape offset this trajectory applied
/// on the previous tick and the members' mean offset. The group then follows motion contributed by other
/// components without chasing its own displacement.
#[derive(Clone, Debug)]
pub struct MacroTrajectory {
    pub enabled: bool,
    pub path: ShapePath,
    pub playback: PlaybackController,
    pub center: Vector3,
    pub offset: Vector3,
    pub follow_centroid: bool,
    phase: f32,
    last_sample: Vector3,
    scope: Scope,
}

impl MacroTrajectory {
    pub fn new(
        macro_name: impl Into<String>,
        path: ShapePath,
        playback: PlaybackController,
        center: Vector3,
    ) -> Self {
        let last_sample = path.sample(0.0);
        MacroTrajectory {
            enabled: true,
            path,
            playback,
            center,
            offset: Vector3::ZERO,
            follow_centroid: false,
            phase: 0.0,
            last_sample,
            scope: Scope::Macro(macro_name.into()),
        }
    }

    /// Copy of this template for one member at `offset` from the center.
    pub fn for_member(&self, offset: Vector3) -> Self {
        let mut member = self.clone();
        member.offset = offset;
        member
    }

    pub fn with_follow_centroid(mut self, follow: bool) -> Self {
        self.follow_centroid = follow;
        self
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Update `center` from the group's live centroid.
    ///
    /// `mean_offset` is the average member offset over the same members the
    /// centroid was taken from. It is non-zero once members have joined or
    /// left after configuration.
    pub fn follow(&mut self, live_centroid: Vector3, mean_offset: Vector3) {
        if self.follow_centroid && live_centroid.is_finite() && mean_offset.is_finite() {
            self.center = live_centroid - self.last_sample - mean_offset;
        }
    }

    pub fn target(&self) -> Vector3 {
        self.center + self.offset + self.path.sample(self.phase)
    }
}

impl MotionComponent for MacroTrajectory {
    fn kind(&self) -> ComponentKind {
        ComponentKind::MacroTrajectory
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
        self.phase = self.playback.advance(dt, self.phase);
        self.last_sample = self.path.sample(self.phase);
        let target = self.center + self.offset + self.last_sample;
        MotionDelta::translation(target - state.position, self.kind()).significant()
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

    fn playback_mut(&mut self) -> Option<&mut PlaybackController> {
        Some(&mut self.playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::playback::PlaybackMode;
    use crate::components::shape::{ShapeParams, TrajectoryShape};

    const EPSILON: f32 = 1e-4;

    fn vec_approx_eq(a: Vector3, b: Vector3) -> bool {
        (a - b).length() < EPSILON
    }

    fn circle(radius: f32) -> ShapePath {
        ShapePath::new(TrajectoryShape::Circle, ShapeParams::default().with_radius(radius)).unwrap()
    }

    #[test]
    fn test_individual_targets_center_plus_shape() {
        let mut tr = IndividualTrajectory::new(
            circle(2.0),
            PlaybackController::new(PlaybackMode::Fix, 0.25),
            Vector3::new(1.0, 1.0, 0.0),
        );
        let state = MotionState::at(Vector3::ZERO);
        let d = tr.calculate_delta(&state, 0.0, 1.0).unwrap();
        // phase 0.25 on a radius-2 circle is (0, 2, 0)
        assert!(vec_approx_eq(d.position, Vector3::new(1.0, 3.0, 0.0)));
        assert_eq!(d.provenance, ComponentKind::IndividualTrajectory);
    }

    #[test]
    fn test_disabled_trajectory_returns_none_and_holds_phase() {
        let mut tr = IndividualTrajectory::new(
            circle(1.0),
            PlaybackController::new(PlaybackMode::Fix, 0.5),
            Vector3::ZERO,
        );
        tr.set_enabled(false);
        assert!(tr.calculate_delta(&MotionState::default(), 0.0, 0.1).is_none());
        assert_eq!(tr.phase(), 0.0);
    }

    #[test]
    fn test_trajectory_reads_live_state() {
        let mut tr = IndividualTrajectory::new(
            circle(1.0),
            PlaybackController::new(PlaybackMode::Freeze, 0.0),
            Vector3::ZERO,
        );
        let a = tr.calculate_delta(&MotionState::at(Vector3::ZERO), 0.0, 0.1).unwrap();
        let b = tr
            .calculate_delta(&MotionState::at(Vector3::new(5.0, 0.0, 0.0)), 0.0, 0.1)
            .unwrap();
        assert!(vec_approx_eq(a.position - b.position, Vector3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_on_target_yields_none() {
        let mut tr = IndividualTrajectory::new(
            circle(1.0),
            PlaybackController::new(PlaybackMode::Freeze, 0.0),
            Vector3::ZERO,
        );
        let state = MotionState::at(Vector3::new(1.0, 0.0, 0.0));
        assert!(tr.calculate_delta(&state, 0.0, 0.1).is_none());
    }

    #[test]
    fn test_macro_members_keep_offsets() {
        let template = MacroTrajectory::new(
            "ring",
            circle(1.0),
            PlaybackController::new(PlaybackMode::Fix, 0.0),
            Vector3::ZERO,
        );
        let mut a = template.for_member(Vector3::new(3.0, 0.0, 0.0));
        let mut b = template.for_member(Vector3::new(-3.0, 0.0, 0.0));
        let da = a.calculate_delta(&MotionState::default(), 0.0, 0.1).unwrap();
        let db = b.calculate_delta(&MotionState::default(), 0.0, 0.1).unwrap();
        assert!(vec_approx_eq(da.position, Vector3::new(4.0, 0.0, 0.0)));
        assert!(vec_approx_eq(db.position, Vector3::new(-2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_member_instances_are_independent() {
        let template = MacroTrajectory::new(
            "ring",
            circle(1.0),
            PlaybackController::new(PlaybackMode::Fix, 0.1),
            Vector3::ZERO,
        );
        let mut a = template.for_member(Vector3::ZERO);
        let b = template.for_member(Vector3::ZERO);
        a.calculate_delta(&MotionState::default(), 0.0, 1.0);
        a.center = Vector3::splat(9.0);
        assert!(a.phase() > 0.0);
        assert_eq!(b.phase(), 0.0);
        assert_eq!(b.center, Vector3::ZERO);
    }

    #[test]
    fn test_follow_centroid_subtracts_own_offset() {
        let mut tr = MacroTrajectory::new(
            "ring",
            circle(1.0),
            PlaybackController::new(PlaybackMode::Freeze, 0.0),
            Vector3::ZERO,
        )
        .with_follow_centroid(true);
        // last applied shape offset is (1, 0, 0); a group sitting on it has not moved
        tr.follow(Vector3::new(1.0, 0.0, 0.0), Vector3::ZERO);
        assert!(vec_approx_eq(tr.center, Vector3::ZERO));
        // the group was pushed by +2 in y by something else
        tr.follow(Vector3::new(1.0, 2.0, 0.0), Vector3::ZERO);
        assert!(vec_approx_eq(tr.center, Vector3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_follow_centroid_absorbs_mean_offset() {
        let template = MacroTrajectory::new(
            "ring",
            circle(1.0),
            PlaybackController::new(PlaybackMode::Freeze, 0.0),
            Vector3::ZERO,
        )
        .with_follow_centroid(true);
        // two members left of a square at (+-1, +-1): offsets average to (1, 0, 0)
        let mut a = template.for_member(Vector3::new(1.0, 1.0, 0.0));
        let b = template.for_member(Vector3::new(1.0, -1.0, 0.0));
        let mean_offset = (a.offset + b.offset) / 2.0;
        // both sit at center + offset + sample, so their centroid is (2, 0, 0)
        a.follow(Vector3::new(2.0, 0.0, 0.0), mean_offset);
        assert!(vec_approx_eq(a.center, Vector3::ZERO));
        assert!(vec_approx_eq(a.target(), Vector3::new(2.0, 1.0, 0.0)));
    }

    #[test]
    fn test_follow_ignored_when_disabled_flag() {
        let mut tr = MacroTrajectory::new(
            "ring",
            circle(1.0),
            PlaybackController::new(PlaybackMode::Fix, 0.0),
            Vector3::ZERO,
        );
        tr.follow(Vector3::splat(4.0), Vector3::ZERO);
        assert_eq!(tr.center, Vector3::ZERO);
    }

    #[test]
    fn test_playback_is_exposed() {
        let mut tr = IndividualTrajectory::new(
            circle(1.0),
            PlaybackController::new(PlaybackMode::Fix, 0.1),
            Vector3::ZERO,
        );
        tr.playback_mut().unwrap().freeze(0.5);
        tr.calculate_delta(&MotionState::default(), 0.0, 0.1);
        assert!((tr.phase() - 0.5).abs() < EPSILON);
    }
}
