//! Typed collections of spawned resource entities.

use glam::Vec3;
use rand::Rng;

use crate::{
    config::GameConfig,
    field::SpatialField,
    nutrient::{NutrientKind, NutrientProfile, select_nutrient},
    types::{EntityId, EntityRef},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Nutrient {
    pub id: EntityId,
    pub kind: NutrientKind,
    pub position: Vec3,
}

impl Nutrient {
    pub fn profile(&self) -> &'static NutrientProfile {
        self.kind.profile()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaterUnit {
    pub id: EntityId,
    pub position: Vec3,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Vec3,
    pub radius: f32,
}

/// Any spawned entity, as handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceEntity {
    Nutrient(Nutrient),
    Water(WaterUnit),
    Obstacle(Obstacle),
}

impl ResourceEntity {
    pub fn handle(&self) -> EntityRef {
        match self {
            ResourceEntity::Nutrient(n) => EntityRef::Nutrient(n.id),
            ResourceEntity::Water(w) => EntityRef::Water(w.id),
            ResourceEntity::Obstacle(o) => EntityRef::Obstacle(o.id),
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            ResourceEntity::Nutrient(n) => n.position,
            ResourceEntity::Water(w) => w.position,
            ResourceEntity::Obstacle(o) => o.position,
        }
    }
}

/// Spawn parameters pulled out of [`GameConfig`].
#[derive(Clone, Copy, Debug)]
pub struct SpawnRules {
    pub nutrient_clearance: f32,
    pub attempts: u32,
    pub macro_chance: f32,
    pub water_value: f64,
    pub obstacle_radius: [f32; 2],
}

impl SpawnRules {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            nutrient_clearance: cfg.nutrient_clearance,
            attempts: cfg.spawn_attempts,
            macro_chance: cfg.macro_nutrient_chance,
            water_value: cfg.water_unit_value,
            obstacle_radius: cfg.obstacle_radius,
        }
    }
}

/// Append-only-with-removal collections, one per entity kind.
///
/// Every spawned entity gets a fresh [`EntityId`]; removal is by identity.
#[derive(Debug)]
pub struct EntityRegistry {
    pub nutrients: Vec<Nutrient>,
    pub water: Vec<WaterUnit>,
    pub obstacles: Vec<Obstacle>,
    rules: SpawnRules,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new(rules: SpawnRules) -> Self {
        Self {
            nutrients: Vec::new(),
            water: Vec::new(),
            obstacles: Vec::new(),
            rules,
            next_id: 0,
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.nutrients.len() + self.water.len() + self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawns a nutrient, weighted toward the micro tier, kept clear of obstacles.
    pub fn spawn_nutrient(&mut self, rng: &mut impl Rng, field: &SpatialField) -> ResourceEntity {
        let kind = select_nutrient(rng.random(), rng.random(), self.rules.macro_chance);
        let position = field
            .sample_position(
                rng,
                &self.obstacles,
                self.rules.nutrient_clearance,
                self.rules.attempts,
            )
            .unwrap_or_else(|| field.random_position(rng));
        let id = self.alloc_id();
        let nutrient = Nutrient { id, kind, position };
        self.nutrients.push(nutrient.clone());
        ResourceEntity::Nutrient(nutrient)
    }

    pub fn spawn_water(&mut self, rng: &mut impl Rng, field: &SpatialField) -> ResourceEntity {
        let position = field.random_position(rng);
        let id = self.alloc_id();
        let unit = WaterUnit {
            id,
            position,
            value: self.rules.water_value,
        };
        self.water.push(unit.clone());
        ResourceEntity::Water(unit)
    }

    pub fn spawn_obstacle(&mut self, rng: &mut impl Rng, field: &SpatialField) -> ResourceEntity {
        let position = field.random_position(rng);
        let [lo, hi] = self.rules.obstacle_radius;
        let radius = if hi > lo { rng.random_range(lo..hi) } else { lo };
        let id = self.alloc_id();
        let obstacle = Obstacle {
            id,
            position,
            radius,
        };
        self.obstacles.push(obstacle.clone());
        ResourceEntity::Obstacle(obstacle)
    }

    /// Inserts an already-built entity, e.g. a hand-placed obstacle.
    ///
    /// The entity keeps a fresh id from this registry regardless of the id
    /// it was built with.
    pub fn insert(&mut self, entity: ResourceEntity) -> EntityRef {
        let id = self.alloc_id();
        match entity {
            ResourceEntity::Nutrient(mut n) => {
                n.id = id;
                self.nutrients.push(n);
                EntityRef::Nutrient(id)
            }
            ResourceEntity::Water(mut w) => {
                w.id = id;
                self.water.push(w);
                EntityRef::Water(id)
            }
            ResourceEntity::Obstacle(mut o) => {
                o.id = id;
                self.obstacles.push(o);
                EntityRef::Obstacle(id)
            }
        }
    }

    /// Removes an entity by identity.
    ///
    /// ### Returns
    /// The removed entity, or `None` if nothing with that handle exists.
    pub fn remove(&mut self, handle: EntityRef) -> Option<ResourceEntity> {
        match handle {
            EntityRef::Nutrient(id) => {
                let idx = self.nutrients.iter().position(|n| n.id == id)?;
                Some(ResourceEntity::Nutrient(self.nutrients.remove(idx)))
            }
            EntityRef::Water(id) => {
                let idx = self.water.iter().position(|w| w.id == id)?;
                Some(ResourceEntity::Water(self.water.remove(idx)))
            }
            EntityRef::Obstacle(id) => {
                let idx = self.obstacles.iter().position(|o| o.id == id)?;
                Some(ResourceEntity::Obstacle(self.obstacles.remove(idx)))
            }
        }
    }

    /// Empties every collection and returns the handles that were removed.
    ///
    /// Ids keep counting up so stale handles never match a new entity.
    pub fn clear(&mut self) -> Vec<EntityRef> {
        self.nutrients
            .drain(..)
            .map(|n| EntityRef::Nutrient(n.id))
            .chain(self.water.drain(..).map(|w| EntityRef::Water(w.id)))
            .chain(self.obstacles.drain(..).map(|o| EntityRef::Obstacle(o.id)))
            .collect()
    }
}
