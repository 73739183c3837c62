//! Lookup from source id to the entity carrying its [`SourceMotion`].
//!
//! Registration order is kept so output arrays have a stable layout.
//!
//! [`SourceMotion`]: crate::components::sourcemotion::SourceMotion

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::sourcemotion::SourceId;

#[derive(Resource, Debug, Default)]
pub struct SourceRegistry {
    entities: FxHashMap<SourceId, Entity>,
    order: Vec<SourceId>,
}

impl SourceRegistry {
    /// Register `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: SourceId, entity: Entity) -> bool {
        if self.entities.contains_key(&id) {
            return false;
        }
        self.entities.insert(id, entity);
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: SourceId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(entity)
    }

    pub fn get(&self, id: SourceId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> &[SourceId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, Entity)> + '_ {
        self.order.iter().map(|id| (*id, self.entities[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_rejects_duplicates() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut registry = SourceRegistry::default();
        assert!(registry.insert(SourceId(5), a));
        assert!(registry.insert(SourceId(2), b));
        assert!(!registry.insert(SourceId(5), b));
        assert_eq!(registry.ids(), &[SourceId(5), SourceId(2)]);
        assert_eq!(registry.get(SourceId(5)), Some(a));
    }

    #[test]
    fn test_remove() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let mut registry = SourceRegistry::default();
        registry.insert(SourceId(1), a);
        assert_eq!(registry.remove(SourceId(1)), Some(a));
        assert_eq!(registry.remove(SourceId(1)), None);
        assert!(registry.is_empty());
    }
}
