//! Macro bookkeeping integration tests: fan-out, ownership, isolation and
//! all-or-nothing configuration.

use spatialmotion::components::concentration::ConcentrationMode;
use spatialmotion::components::motioncomponent::ComponentKind;
use spatialmotion::components::playback::PlaybackMode;
use spatialmotion::components::rotation::ManualRotation;
use spatialmotion::components::shape::{ShapeParams, TrajectoryShape};
use spatialmotion::components::sourcemotion::SourceId;
use spatialmotion::engine::Engine;
use spatialmotion::error::{ConfigError, EngineError};
use spatialmotion::math::Vector3;
use spatialmotion::resources::engineconfig::EngineConfig;

const DT: f32 = 1.0 / 60.0;

fn engine_with_sources(positions: &[Vector3]) -> Engine {
    let mut engine = Engine::new(EngineConfig::new());
    for (i, position) in positions.iter().enumerate() {
        engine
            .create_source_at(SourceId(i as u32), *position)
            .unwrap();
    }
    engine.start();
    engine
}

fn ids(raw: &[u32]) -> Vec<SourceId> {
    raw.iter().copied().map(SourceId).collect()
}

fn run(engine: &mut Engine, ticks: usize) {
    for _ in 0..ticks {
        engine.update(Some(DT));
    }
}

fn manual(engine: &Engine, id: u32, kind: ComponentKind) -> ManualRotation {
    engine
        .source_motion(SourceId(id))
        .unwrap()
        .component::<ManualRotation>(kind)
        .unwrap()
        .clone()
}

fn two_groups() -> Engine {
    let mut engine = engine_with_sources(&[
        Vector3::new(3.0, 3.0, 0.0),
        Vector3::new(-3.0, 3.0, 0.0),
        Vector3::new(-3.0, -3.0, 0.0),
        Vector3::new(3.0, -3.0, 0.0),
        Vector3::new(10.0, 0.0, 0.0),
        Vector3::new(12.0, 0.0, 0.0),
        Vector3::new(0.0, 20.0, 0.0),
    ]);
    engine.create_macro("a", &ids(&[0, 1, 2, 3])).unwrap();
    engine.create_macro("b", &ids(&[4, 5])).unwrap();
    engine
}

// ==================== ISOLATION ====================

#[test]
fn test_configuring_one_macro_leaves_another_alone() {
    let mut engine = two_groups();
    engine
        .set_manual_macro_rotation("b", Vector3::new(1.0, 0.0, 0.0), 0.05, None)
        .unwrap();
    run(&mut engine, 20);

    let before: Vec<_> = [4, 5]
        .iter()
        .map(|id| manual(&engine, *id, ComponentKind::MacroManualRotation))
        .map(|rot| (rot.target(), rot.current(), rot.center))
        .collect();

    engine
        .set_manual_macro_rotation("a", Vector3::new(-2.0, 0.5, 0.0), 0.3, None)
        .unwrap();
    engine
        .set_macro_rotation("a", Vector3::new(0.0, 0.0, 2.0), None)
        .unwrap();
    engine
        .set_concentration("a", None, 0.5, None, None)
        .unwrap();

    let after: Vec<_> = [4, 5]
        .iter()
        .map(|id| manual(&engine, *id, ComponentKind::MacroManualRotation))
        .map(|rot| (rot.target(), rot.current(), rot.center))
        .collect();
    assert_eq!(before, after);

    let outsider = engine.source_motion(SourceId(6)).unwrap();
    assert_eq!(outsider.kinds().count(), 0);
    for id in [4, 5] {
        let motion = engine.source_motion(SourceId(id)).unwrap();
        assert!(!motion.has(ComponentKind::MacroRotation));
        assert!(!motion.has(ComponentKind::Concentration));
    }
}

#[test]
fn test_outsider_does_not_move() {
    let mut engine = two_groups();
    engine
        .set_macro_rotation("a", Vector3::new(0.0, 0.0, 1.0), None)
        .unwrap();
    engine
        .set_concentration("b", Some(Vector3::ZERO), 0.0, None, None)
        .unwrap();
    run(&mut engine, 120);
    assert_eq!(
        engine.source_state(SourceId(6)).unwrap().position,
        Vector3::new(0.0, 20.0, 0.0)
    );
}

#[test]
fn test_member_instances_are_independent() {
    let mut engine = two_groups();
    engine
        .set_manual_macro_rotation("a", Vector3::new(1.0, 0.0, 0.0), 0.1, None)
        .unwrap();
    engine
        .set_component_enabled(SourceId(0), ComponentKind::MacroManualRotation, false)
        .unwrap();
    run(&mut engine, 30);

    assert_eq!(
        engine.source_state(SourceId(0)).unwrap().position,
        Vector3::new(3.0, 3.0, 0.0)
    );
    assert_ne!(
        engine.source_state(SourceId(1)).unwrap().position,
        Vector3::new(-3.0, 3.0, 0.0)
    );
    assert_eq!(
        manual(&engine, 0, ComponentKind::MacroManualRotation).current(),
        Vector3::ZERO
    );
}

// ==================== OWNERSHIP ====================

#[test]
fn test_overlapping_macros_cannot_share_a_slot() {
    let mut engine = engine_with_sources(&[Vector3::X, Vector3::Y, Vector3::Z]);
    engine.create_macro("left", &ids(&[0, 1])).unwrap();
    engine.create_macro("right", &ids(&[1, 2])).unwrap();
    engine
        .set_macro_rotation("left", Vector3::new(0.0, 0.0, 1.0), None)
        .unwrap();

    let result = engine.set_macro_rotation("right", Vector3::new(0.0, 0.0, -1.0), None);
    match result {
        Err(EngineError::Config(ConfigError::DuplicateComponent {
            source_id,
            kind,
            owner,
        })) => {
            assert_eq!(source_id, SourceId(1));
            assert_eq!(kind, ComponentKind::MacroRotation);
            assert_eq!(owner, "macro 'left'");
        }
        other => panic!("expected DuplicateComponent, got {:?}", other),
    }

    // nothing from the failed call is visible
    assert!(
        !engine
            .source_motion(SourceId(2))
            .unwrap()
            .has(ComponentKind::MacroRotation)
    );
    assert!(
        engine
            .set_macro_component_enabled("right", ComponentKind::MacroRotation, false)
            .is_err()
    );

    engine.delete_macro("left").unwrap();
    engine
        .set_macro_rotation("right", Vector3::new(0.0, 0.0, -1.0), None)
        .unwrap();
    assert!(
        engine
            .source_motion(SourceId(1))
            .unwrap()
            .has(ComponentKind::MacroRotation)
    );
}

#[test]
fn test_failed_macro_call_is_all_or_nothing() {
    let mut engine = engine_with_sources(&[Vector3::X, Vector3::Y, Vector3::Z]);
    engine.create_macro("left", &ids(&[2])).unwrap();
    engine.create_macro("right", &ids(&[0, 1, 2])).unwrap();
    engine
        .set_concentration("left", Some(Vector3::ZERO), 0.5, None, None)
        .unwrap();

    let result = engine.set_concentration("right", Some(Vector3::ONE), 0.0, None, None);
    assert!(matches!(
        result,
        Err(EngineError::Config(ConfigError::DuplicateComponent { .. }))
    ));
    for id in [0, 1] {
        assert!(
            !engine
                .source_motion(SourceId(id))
                .unwrap()
                .has(ComponentKind::Concentration)
        );
    }
    assert_eq!(engine.get_concentration_state("right").unwrap(), None);
}

#[test]
fn test_individual_concentration_cannot_take_macro_slot() {
    let mut engine = engine_with_sources(&[Vector3::X, Vector3::Y]);
    engine.create_macro("pair", &ids(&[0, 1])).unwrap();
    engine
        .set_concentration("pair", Some(Vector3::ZERO), 0.5, None, None)
        .unwrap();

    let result = engine.set_concentration(SourceId(0), Some(Vector3::ONE), 0.2, None, None);
    match result {
        Err(EngineError::Config(ConfigError::DuplicateComponent { source_id, kind, owner })) => {
            assert_eq!(source_id, SourceId(0));
            assert_eq!(kind, ComponentKind::Concentration);
            assert_eq!(owner, "macro 'pair'");
        }
        other => panic!("expected DuplicateComponent, got {:?}", other),
    }

    let state = engine.get_concentration_state(SourceId(0)).unwrap().unwrap();
    assert_eq!(state.mode, ConcentrationMode::Macro);
    assert_eq!(state.factor, 0.5);

    // the macro still controls every member
    engine
        .set_concentration("pair", None, 0.8, None, None)
        .unwrap();
    for id in [0, 1] {
        let state = engine.get_concentration_state(SourceId(id)).unwrap().unwrap();
        assert_eq!(state.factor, 0.8);
    }
}

#[test]
fn test_macro_concentration_cannot_take_individual_slot() {
    let mut engine = engine_with_sources(&[Vector3::X, Vector3::Y]);
    engine.create_macro("pair", &ids(&[0, 1])).unwrap();
    engine
        .set_concentration(SourceId(1), Some(Vector3::ONE), 0.2, None, None)
        .unwrap();

    let result = engine.set_concentration("pair", Some(Vector3::ZERO), 0.5, None, None);
    match result {
        Err(EngineError::Config(ConfigError::DuplicateComponent { source_id, owner, .. })) => {
            assert_eq!(source_id, SourceId(1));
            assert_eq!(owner, "individual scope");
        }
        other => panic!("expected DuplicateComponent, got {:?}", other),
    }

    let state = engine.get_concentration_state(SourceId(1)).unwrap().unwrap();
    assert_eq!(state.mode, ConcentrationMode::Individual);
    assert_eq!(state.factor, 0.2);
    assert!(engine.get_concentration_state(SourceId(0)).unwrap().is_none());
    assert_eq!(engine.get_concentration_state("pair").unwrap(), None);
}

// ==================== MEMBERSHIP ====================

#[test]
fn test_delete_macro_mid_run_stops_group_motion() {
    let mut engine = two_groups();
    engine
        .set_macro_rotation("a", Vector3::new(0.0, 0.0, 1.0), None)
        .unwrap();
    run(&mut engine, 10);
    engine.delete_macro("a").unwrap();
    let frozen = engine.source_state(SourceId(0)).unwrap().position;
    run(&mut engine, 10);
    assert_eq!(engine.source_state(SourceId(0)).unwrap().position, frozen);
    assert!(engine.macro_members("a").is_err());
}

#[test]
fn test_joining_member_rotates_with_the_group() {
    let mut engine = two_groups();
    engine
        .set_manual_macro_rotation("a", Vector3::new(1.5, 0.0, 0.0), 0.05, None)
        .unwrap();
    run(&mut engine, 20);

    engine
        .create_source_at(SourceId(9), Vector3::new(0.0, 5.0, 0.0))
        .unwrap();
    engine.add_source_to_macro("a", SourceId(9)).unwrap();
    assert_eq!(
        manual(&engine, 9, ComponentKind::MacroManualRotation).current(),
        manual(&engine, 0, ComponentKind::MacroManualRotation).current()
    );

    run(&mut engine, 400);
    let joined = engine.source_state(SourceId(9)).unwrap().position;
    assert!((joined.length() - 5.0).abs() < 0.01, "{:?}", joined);
    assert_eq!(
        manual(&engine, 9, ComponentKind::MacroManualRotation).current(),
        manual(&engine, 0, ComponentKind::MacroManualRotation).current()
    );
}

#[test]
fn test_leaving_member_stops_following() {
    let mut engine = two_groups();
    engine
        .set_concentration("b", Some(Vector3::ZERO), 0.0, None, None)
        .unwrap();
    engine.remove_source_from_macro("b", SourceId(5)).unwrap();
    run(&mut engine, 60);
    assert_eq!(
        engine.source_state(SourceId(5)).unwrap().position,
        Vector3::new(12.0, 0.0, 0.0)
    );
    assert!(engine.source_state(SourceId(4)).unwrap().position.length() < 1e-3);
}

// ==================== CENTROID FOLLOW ====================

fn following_square() -> Engine {
    let mut engine = engine_with_sources(&[
        Vector3::new(3.0, 3.0, 0.0),
        Vector3::new(-3.0, 3.0, 0.0),
        Vector3::new(-3.0, -3.0, 0.0),
        Vector3::new(3.0, -3.0, 0.0),
    ]);
    engine.create_macro("sq", &ids(&[0, 1, 2, 3])).unwrap();
    engine
        .set_macro_trajectory(
            "sq",
            TrajectoryShape::Circle,
            ShapeParams::default().with_radius(1.0),
            PlaybackMode::Freeze,
            0.0,
        )
        .unwrap();
    engine
        .set_macro_trajectory_follow_centroid("sq", true)
        .unwrap();
    engine
}

fn assert_near(a: Vector3, b: Vector3) {
    assert!((a - b).length() < 1e-3, "{:?} vs {:?}", a, b);
}

#[test]
fn test_follow_holds_after_member_leaves() {
    let mut engine = following_square();
    run(&mut engine, 60);
    let kept: Vec<Vector3> = (1..4)
        .map(|id| engine.source_state(SourceId(id)).unwrap().position)
        .collect();

    engine.remove_source_from_macro("sq", SourceId(0)).unwrap();
    let before = engine.macro_centroid("sq").unwrap().unwrap();
    run(&mut engine, 300);

    assert_near(engine.macro_centroid("sq").unwrap().unwrap(), before);
    for (id, position) in (1..4).zip(kept) {
        assert_near(engine.source_state(SourceId(id)).unwrap().position, position);
    }
}

#[test]
fn test_follow_holds_after_member_joins_and_source_is_removed() {
    let mut engine = following_square();
    run(&mut engine, 60);

    engine
        .create_source_at(SourceId(8), Vector3::new(10.0, 0.0, 0.0))
        .unwrap();
    engine.add_source_to_macro("sq", SourceId(8)).unwrap();
    let joined = engine.macro_centroid("sq").unwrap().unwrap();
    run(&mut engine, 300);
    assert_near(engine.macro_centroid("sq").unwrap().unwrap(), joined);
    assert_near(
        engine.source_state(SourceId(8)).unwrap().position,
        Vector3::new(10.0, 0.0, 0.0),
    );

    engine.remove_source(SourceId(2)).unwrap();
    let remaining = engine.macro_centroid("sq").unwrap().unwrap();
    run(&mut engine, 300);
    assert_near(engine.macro_centroid("sq").unwrap().unwrap(), remaining);
}
