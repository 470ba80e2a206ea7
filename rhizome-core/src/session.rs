//! The game session aggregate and every operation that mutates it.

use glam::Vec3;
use rand::{Rng, rngs::SmallRng};
use tracing::{debug, info, trace};

use crate::{
    config::{ConfigError, GameConfig},
    entity::{EntityRegistry, ResourceEntity, SpawnRules},
    field::SpatialField,
    gauges::ResourceGauges,
    input::SessionCommand,
    nutrient::NutrientKind,
    plant::{PlantState, auto_branch_chance},
    schedule::{DeferredAction, Scheduler},
    types::{BranchId, EntityId, EntityRef},
};

/// Something the collaborators need to hear about.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    EntitySpawned(ResourceEntity),
    EntityRemoved(EntityRef),
    BranchCreated { id: BranchId, count: usize, at: Vec3 },
    BranchGrew(BranchId),
    BranchesCleared,
    Collision { obstacle: EntityId },
    NutrientAbsorbed(NutrientKind),
    WaterAbsorbed,
    /// A fresh session is waiting for the first unpause.
    AwaitingStart,
    Paused,
    Resumed,
    GameOver { score: u32 },
    Reset,
}

/// What one absorption pass consumed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbsorptionReport {
    pub nutrients: Vec<NutrientKind>,
    pub water_units: usize,
}

impl AbsorptionReport {
    pub fn is_empty(&self) -> bool {
        self.nutrients.is_empty() && self.water_units == 0
    }
}

/// Aggregate root of one play session.
///
/// All mutation goes through methods on this type, called from
/// [`crate::phases::step`] or from deferred tasks it fires.
pub struct GameSession {
    config: GameConfig,
    rng: SmallRng,
    pub field: SpatialField,
    pub registry: EntityRegistry,
    pub plant: PlantState,
    pub gauges: ResourceGauges,
    pub score: u32,
    paused: bool,
    game_over: bool,
    /// Bumped on every reset; deferred tasks from older generations are dropped.
    generation: u64,
    ticks: u64,
    scheduler: Scheduler,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Builds a fully seeded session.
    ///
    /// The session starts paused when `config.start_paused` is set.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config.seeded_rng();
        let field = SpatialField::from_config(&config);
        let registry = EntityRegistry::new(SpawnRules::from_config(&config));
        let plant = PlantState::new(
            config.max_branches,
            config.branch_energy_cost,
            config.root_growth_rate,
        );
        let gauges = ResourceGauges::new(
            config.max_water,
            config.max_energy,
            config.starting_water,
            config.starting_energy,
        );

        let mut session = Self {
            config,
            rng,
            field,
            registry,
            plant,
            gauges,
            score: 0,
            paused: false,
            game_over: false,
            generation: 0,
            ticks: 0,
            scheduler: Scheduler::new(),
            events: Vec::new(),
        };
        session.seed();
        if session.config.start_paused {
            session.paused = true;
            session.events.push(SessionEvent::AwaitingStart);
        }
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Ticks advance only while neither paused nor over.
    pub fn is_running(&self) -> bool {
        !self.paused && !self.game_over
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn active_tip(&self) -> Option<Vec3> {
        self.plant.active_tip()
    }

    /// Takes every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Plants the first branch and spawns the initial entities.
    ///
    /// Obstacles go first so the initial nutrients keep their clearance.
    fn seed(&mut self) {
        let id = self.plant.replant(Vec3::ZERO);
        self.events.push(SessionEvent::BranchCreated {
            id,
            count: 1,
            at: Vec3::ZERO,
        });

        for _ in 0..self.config.initial_obstacles {
            let entity = self.registry.spawn_obstacle(&mut self.rng, &self.field);
            self.events.push(SessionEvent::EntitySpawned(entity));
        }
        for _ in 0..self.config.initial_nutrients {
            self.spawn_nutrient();
        }
        for _ in 0..self.config.initial_water_units {
            self.spawn_water();
        }
    }

    fn spawn_nutrient(&mut self) {
        let entity = self.registry.spawn_nutrient(&mut self.rng, &self.field);
        self.events.push(SessionEvent::EntitySpawned(entity));
    }

    fn spawn_water(&mut self) {
        let entity = self.registry.spawn_water(&mut self.rng, &self.field);
        self.events.push(SessionEvent::EntitySpawned(entity));
    }

    /// Returns to a fresh, running session.
    ///
    /// Clears all entities and branches, reseeds the initial counts, restores
    /// the starting gauges and score, and invalidates pending deferred tasks.
    pub fn reset(&mut self) {
        self.generation += 1;

        for handle in self.registry.clear() {
            self.events.push(SessionEvent::EntityRemoved(handle));
        }
        self.events.push(SessionEvent::BranchesCleared);

        self.score = 0;
        self.gauges = ResourceGauges::new(
            self.config.max_water,
            self.config.max_energy,
            self.config.starting_water,
            self.config.starting_energy,
        );
        self.game_over = false;
        self.paused = false;
        self.ticks = 0;

        self.seed();
        self.events.push(SessionEvent::Reset);
        info!(generation = self.generation, "session reset");
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.events.push(if self.paused {
            SessionEvent::Paused
        } else {
            SessionEvent::Resumed
        });
    }

    pub fn apply_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::NewBranch => {
                self.create_branch();
            }
            SessionCommand::TogglePause => self.toggle_pause(),
            SessionCommand::Reset => self.reset(),
        }
    }

    /// Branches off the active tip if capacity, energy and state allow.
    ///
    /// Fails silently, with no side effect, when a precondition is not met.
    pub fn create_branch(&mut self) -> Option<BranchId> {
        let id = self.plant.create_branch(&mut self.gauges, self.game_over)?;
        self.events.push(SessionEvent::BranchCreated {
            id,
            count: self.plant.len(),
            at: self.plant.branches[id].start,
        });
        Some(id)
    }

    /// Advances the deferred-task clock and runs whatever came due.
    ///
    /// Tasks from an older generation are dropped; tasks that fire after game
    /// over do nothing.
    pub fn advance_clock(&mut self, dt: f64) {
        for task in self.scheduler.advance(dt) {
            if task.generation != self.generation {
                trace!(?task, current = self.generation, "dropping stale task");
                continue;
            }
            if self.game_over {
                trace!(?task, "dropping task after game over");
                continue;
            }
            debug!(action = ?task.action, at = task.fire_at, "deferred task fired");
            match task.action {
                DeferredAction::CreateBranch => {
                    self.create_branch();
                }
                DeferredAction::RespawnWater => self.spawn_water(),
            }
        }
    }

    /// Grows the active branch one tick, if any water remains.
    ///
    /// ### Returns
    /// Ids of branches whose geometry changed.
    pub fn grow(&mut self, steer: Option<Vec3>) -> Vec<BranchId> {
        if !self.is_running() || self.gauges.water() <= 0.0 {
            return Vec::new();
        }
        let grown = self.plant.grow_all(
            &mut self.rng,
            steer,
            self.gauges.water_fraction(),
            &self.field,
        );
        for &id in &grown {
            self.events.push(SessionEvent::BranchGrew(id));
        }
        grown
    }

    /// Bounces the active branch off the first obstacle it is touching.
    ///
    /// Only the first obstacle in iteration order counts.
    pub fn check_obstacle_collision(&mut self) -> Option<EntityId> {
        let reach = self.config.collision_distance;
        let branch = self.plant.active_mut()?;
        let hit = self
            .registry
            .obstacles
            .iter()
            .find(|o| branch.tip.distance(o.position) < reach)?;
        let obstacle = hit.id;

        branch.bounce();
        debug!(?obstacle, "branch hit an obstacle");
        self.events.push(SessionEvent::Collision { obstacle });
        Some(obstacle)
    }

    /// Absorbs every nutrient and water unit within reach of the active tip.
    pub fn check_absorption(&mut self) -> AbsorptionReport {
        let mut report = AbsorptionReport::default();
        let Some(tip) = self.plant.active_tip() else {
            return report;
        };
        let reach = self.config.absorption_distance;

        for i in (0..self.registry.nutrients.len()).rev() {
            if tip.distance(self.registry.nutrients[i].position) < reach {
                report.nutrients.push(self.absorb_nutrient(i));
            }
        }
        for i in (0..self.registry.water.len()).rev() {
            if tip.distance(self.registry.water[i].position) < reach {
                self.absorb_water(i);
                report.water_units += 1;
            }
        }
        report
    }

    /// Consumes the nutrient at `index` and spawns its replacement.
    /// `index` must be in range; only [`Self::check_absorption`] calls this.
    ///
    /// Credits score, water and energy, records the kind on the active
    /// branch, then may schedule an automatic branch.
    fn absorb_nutrient(&mut self, index: usize) -> NutrientKind {
        let nutrient = self.registry.nutrients.remove(index);
        let profile = nutrient.profile();
        self.events
            .push(SessionEvent::EntityRemoved(EntityRef::Nutrient(nutrient.id)));

        self.score += profile.score;
        self.gauges.add_water(profile.water);
        self.gauges.add_energy(profile.energy);
        if let Some(branch) = self.plant.active_mut() {
            branch.absorbed.push(nutrient.kind);
        }
        self.events.push(SessionEvent::NutrientAbsorbed(nutrient.kind));
        debug!(kind = nutrient.kind.name(), score = self.score, "nutrient absorbed");

        self.spawn_nutrient();

        let chance = auto_branch_chance(
            self.gauges.energy_fraction(),
            self.config.auto_branch_chance_scale,
        );
        if self.rng.random::<f32>() < chance && self.plant.has_capacity() {
            self.scheduler.schedule(
                self.config.auto_branch_delay,
                self.generation,
                DeferredAction::CreateBranch,
            );
        }
        nutrient.kind
    }

    /// Consumes the water unit at `index`; a replacement appears after a
    /// random delay.
    fn absorb_water(&mut self, index: usize) {
        let unit = self.registry.water.remove(index);
        self.events
            .push(SessionEvent::EntityRemoved(EntityRef::Water(unit.id)));
        self.gauges.add_water(unit.value);
        self.events.push(SessionEvent::WaterAbsorbed);

        let max_delay = self.config.water_respawn_max_delay;
        let delay = if max_delay > 0.0 {
            self.rng.random_range(0.0..max_delay)
        } else {
            0.0
        };
        self.scheduler
            .schedule(delay, self.generation, DeferredAction::RespawnWater);
    }

    /// Applies one tick of gauge decay and checks for game over.
    pub fn update_gauges(&mut self) {
        if !self.is_running() {
            return;
        }
        self.gauges.tick(
            self.config.water_decay_rate,
            self.config.energy_gain_rate,
            self.plant.len(),
        );
        if self.gauges.is_depleted() {
            self.game_over = true;
            self.plant.freeze_active();
            self.events.push(SessionEvent::GameOver { score: self.score });
            info!(score = self.score, ticks = self.ticks, "game over");
        }
    }

    /// Runs the state-changing part of one tick: growth, collision,
    /// absorption and gauges.
    pub fn tick(&mut self, steer: Option<Vec3>) {
        if !self.is_running() {
            return;
        }
        self.grow(steer);
        self.resolve_contacts();
    }

    /// Second half of a tick, after the tips have moved.
    pub fn resolve_contacts(&mut self) {
        if !self.is_running() {
            return;
        }
        self.check_obstacle_collision();
        self.check_absorption();
        self.update_gauges();
        self.ticks += 1;
    }
}
