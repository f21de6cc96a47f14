// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use super::{EntityChange, EntityId, EntityState};
use std::collections::HashMap;

/// Last published state of each entity.
#[derive(Debug, Default)]
pub struct EntityStore {
    states: HashMap<EntityId, EntityState>,
}

impl EntityStore {
    /// Store a new state. Returns the change to publish, or `None` if the state didn't change.
    pub fn publish(
        &mut self,
        entity_id: EntityId,
        state: impl Into<EntityState>,
    ) -> Option<EntityChange> {
        let state = state.into();
        if self.states.get(&entity_id) == Some(&state) {
            return None;
        }
        self.states.insert(entity_id, state.clone());
        Some(EntityChange {
            entity_type: entity_id.entity_type(),
            entity_id: entity_id.to_string(),
            state,
        })
    }

    pub fn get(&self, entity_id: EntityId) -> Option<&EntityState> {
        self.states.get(&entity_id)
    }

    /// All known states in entity order.
    pub fn snapshot(&self) -> Vec<EntityChange> {
        EntityId::stateful()
            .filter_map(|id| {
                self.states.get(&id).map(|state| EntityChange {
                    entity_type: id.entity_type(),
                    entity_id: id.to_string(),
                    state: state.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    #[test]
    fn first_publish_is_a_change() {
        let mut store = EntityStore::default();
        let change = store.publish(EntityId::SomeoneExists, true);

        assert_eq!(
            Some(EntityChange {
                entity_type: EntityType::BinarySensor,
                entity_id: "someone_exists".into(),
                state: EntityState::Bool(true),
            }),
            change
        );
    }

    #[test]
    fn unchanged_state_is_suppressed() {
        let mut store = EntityStore::default();
        assert!(store.publish(EntityId::MotionStatus, "Active").is_some());
        assert!(store.publish(EntityId::MotionStatus, "Active").is_none());
        assert!(store.publish(EntityId::MotionStatus, "None").is_some());
        assert_eq!(
            Some(&EntityState::Text("None".into())),
            store.get(EntityId::MotionStatus)
        );
    }

    #[test]
    fn snapshot_is_ordered() {
        let mut store = EntityStore::default();
        store.publish(EntityId::SceneMode, "Bedroom");
        store.publish(EntityId::Heartbeat, "Normal");

        let ids: Vec<String> = store.snapshot().into_iter().map(|c| c.entity_id).collect();
        assert_eq!(vec!["heartbeat", "scene_mode"], ids);
    }
}
