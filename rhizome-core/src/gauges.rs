//! Water and energy gauges.

/// Branch count at which energy regeneration reaches its full rate.
pub const FULL_REGEN_BRANCHES: f64 = 5.0;

/// Water and energy levels, each clamped to `[0, max]` on every update.
///
/// Levels are `f64`: per-tick rates are tiny next to the maxima and would
/// be lost to rounding in `f32`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceGauges {
    water: f64,
    energy: f64,
    max_water: f64,
    max_energy: f64,
}

impl ResourceGauges {
    /// Creates gauges; the starting levels are clamped into range.
    pub fn new(max_water: f64, max_energy: f64, water: f64, energy: f64) -> Self {
        Self {
            water: water.clamp(0.0, max_water),
            energy: energy.clamp(0.0, max_energy),
            max_water,
            max_energy,
        }
    }

    pub fn water(&self) -> f64 {
        self.water
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn max_water(&self) -> f64 {
        self.max_water
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    /// Fill fraction in `[0, 1]`, narrowed for the `f32` growth math.
    pub fn water_fraction(&self) -> f32 {
        (self.water / self.max_water) as f32
    }

    pub fn energy_fraction(&self) -> f32 {
        (self.energy / self.max_energy) as f32
    }

    pub fn set_water(&mut self, water: f64) {
        self.water = water.clamp(0.0, self.max_water);
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy.clamp(0.0, self.max_energy);
    }

    pub fn add_water(&mut self, amount: f64) {
        self.set_water(self.water + amount);
    }

    pub fn add_energy(&mut self, amount: f64) {
        self.set_energy(self.energy + amount);
    }

    /// Deducts `cost` energy if at least that much is available.
    pub fn try_spend_energy(&mut self, cost: f64) -> bool {
        if self.energy < cost {
            return false;
        }
        self.set_energy(self.energy - cost);
        true
    }

    /// Applies one tick of decay and regeneration.
    ///
    /// Water drops by `water_decay`. While any water remains, energy rises by
    /// `energy_gain` scaled with the branch count, capped at
    /// [`FULL_REGEN_BRANCHES`] branches.
    pub fn tick(&mut self, water_decay: f64, energy_gain: f64, branch_count: usize) {
        self.set_water(self.water - water_decay);
        if self.water > 0.0 {
            let branch_factor = (branch_count as f64 / FULL_REGEN_BRANCHES).min(1.0);
            self.add_energy(energy_gain * branch_factor);
        }
    }

    /// Both gauges are empty.
    pub fn is_depleted(&self) -> bool {
        self.water <= 0.0 && self.energy <= 0.0
    }
}
