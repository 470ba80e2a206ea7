use serde::{Deserialize, Serialize};

/// Identifier for a branch in a [`crate::plant::PlantState`].
///
/// This is an index into `PlantState::branches`, and is only meaningful
/// until the next session reset clears the branch list.
pub type BranchId = usize;

/// Identity of a spawned resource entity.
///
/// Ids are handed out by [`crate::entity::EntityRegistry`] from a
/// monotonically increasing counter and are never reused within a
/// registry, so a removed entity can not be confused with its
/// replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Tagged handle naming which registry collection an entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Nutrient(EntityId),
    Water(EntityId),
    Obstacle(EntityId),
}

impl EntityRef {
    pub fn id(self) -> EntityId {
        match self {
            EntityRef::Nutrient(id) | EntityRef::Water(id) | EntityRef::Obstacle(id) => id,
        }
    }
}
