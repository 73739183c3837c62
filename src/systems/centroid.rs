//! Centroid-follow for macro trajectories.
//!
//! Runs before composition. For every macro whose members carry a
//! [`MacroTrajectory`] with `follow_centroid` set, the live centroid and the
//! mean offset of those members are computed once and pushed into each
//! member's instance.

use bevy_ecs::prelude::*;

use crate::components::motioncomponent::{ComponentKind, MotionComponent};
use crate::components::sourcemotion::{SourceId, SourceMotion};
use crate::components::trajectory::MacroTrajectory;
use crate::math::{Vector3, centroid};
use crate::resources::macroregistry::MacroRegistry;
use crate::resources::sourceregistry::SourceRegistry;

/// Live centroid of `members`, skipping ids `position` cannot resolve.
pub fn members_centroid<F>(members: &[SourceId], position: F) -> Option<Vector3>
where
    F: Fn(SourceId) -> Option<Vector3>,
{
    centroid(members.iter().filter_map(|id| position(*id)))
}

fn follows_centroid(motion: &SourceMotion, macro_name: &str) -> bool {
    motion
        .component::<MacroTrajectory>(ComponentKind::MacroTrajectory)
        .is_some_and(|traj| traj.follow_centroid && traj.scope().is_owned_by(macro_name))
}

pub fn macro_centroid_system(
    macros: Res<MacroRegistry>,
    registry: Res<SourceRegistry>,
    mut query: Query<&mut SourceMotion>,
) {
    for group in macros.iter() {
        let name = group.name();

        // position and offset of every member whose formation is followed
        let followers: Vec<(Entity, Vector3, Vector3)> = group
            .members()
            .iter()
            .filter_map(|id| registry.get(*id))
            .filter_map(|entity| {
                let motion = query.get(entity).ok()?;
                if !follows_centroid(motion, name) {
                    return None;
                }
                let traj =
                    motion.component::<MacroTrajectory>(ComponentKind::MacroTrajectory)?;
                Some((entity, motion.state().position, traj.offset))
            })
            .collect();

        let Some(live) = centroid(followers.iter().map(|(_, position, _)| *position)) else {
            continue;
        };
        let mean_offset =
            centroid(followers.iter().map(|(_, _, offset)| *offset)).unwrap_or(Vector3::ZERO);

        for (entity, _, _) in &followers {
            let Ok(mut motion) = query.get_mut(*entity) else {
                continue;
            };
            if let Some(traj) =
                motion.component_mut::<MacroTrajectory>(ComponentKind::MacroTrajectory)
            {
                traj.follow(live, mean_offset);
            }
        }
    }
}
