//! The forest of branches and the branching policy.

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::{
    branch::Branch, field::SpatialField, gauges::ResourceGauges, types::BranchId,
};

/// Chance of spontaneous branching after a nutrient is absorbed.
///
/// Scales linearly with the energy fill fraction, so the result lies in
/// `[0, scale]` for a fraction in `[0, 1]`.
#[inline]
pub fn auto_branch_chance(energy_fraction: f32, scale: f32) -> f32 {
    energy_fraction.clamp(0.0, 1.0) * scale
}

/// All branches of one plant. At most one is active at a time.
#[derive(Debug)]
pub struct PlantState {
    pub branches: Vec<Branch>,
    active: Option<BranchId>,
    max_branches: usize,
    /// Energy charged per new branch.
    branch_cost: f64,
    /// Initial speed of freshly created branches.
    initial_speed: f32,
}

impl PlantState {
    pub fn new(max_branches: usize, branch_cost: f64, initial_speed: f32) -> Self {
        Self {
            branches: Vec::with_capacity(max_branches),
            active: None,
            max_branches,
            branch_cost,
            initial_speed,
        }
    }

    /// Drops every branch and plants a single active one at `origin`.
    pub fn replant(&mut self, origin: Vec3) -> BranchId {
        self.branches.clear();
        self.branches
            .push(Branch::new(origin, None, self.initial_speed));
        self.active = Some(0);
        0
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn max_branches(&self) -> usize {
        self.max_branches
    }

    pub fn has_capacity(&self) -> bool {
        self.branches.len() < self.max_branches
    }

    pub fn active_id(&self) -> Option<BranchId> {
        self.active
    }

    pub fn active(&self) -> Option<&Branch> {
        self.active.and_then(|id| self.branches.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Branch> {
        self.active.and_then(|id| self.branches.get_mut(id))
    }

    pub fn active_tip(&self) -> Option<Vec3> {
        self.active().map(|b| b.tip)
    }

    /// Grows a new branch from the active tip.
    ///
    /// Allowed only while the plant has capacity, a branch is active, the
    /// session is not over, and `gauges` hold at least the branch cost in
    /// energy. The active branch is frozen and the new one inherits its
    /// tip and heading.
    ///
    /// ### Returns
    /// The new branch id, or `None` with no state change if any
    /// precondition fails.
    pub fn create_branch(
        &mut self,
        gauges: &mut ResourceGauges,
        game_over: bool,
    ) -> Option<BranchId> {
        if !self.has_capacity() || game_over {
            return None;
        }
        let parent_id = self.active?;
        if !gauges.try_spend_energy(self.branch_cost) {
            return None;
        }

        let parent = &mut self.branches[parent_id];
        parent.freeze();
        let child = Branch::new(parent.tip, Some(parent.direction), self.initial_speed);

        let id = self.branches.len();
        self.branches.push(child);
        self.active = Some(id);
        debug!(parent = parent_id, branch = id, count = self.branches.len(), "branch created");
        Some(id)
    }

    /// Freezes the active branch, leaving no branch active.
    pub fn freeze_active(&mut self) {
        if let Some(branch) = self.active_mut() {
            branch.freeze();
        }
        self.active = None;
    }

    /// Advances every branch by one tick. Only the active branch changes.
    ///
    /// ### Returns
    /// Ids of the branches whose geometry changed.
    pub fn grow_all(
        &mut self,
        rng: &mut impl Rng,
        steer: Option<Vec3>,
        water_fraction: f32,
        field: &SpatialField,
    ) -> Vec<BranchId> {
        let mut grown = Vec::with_capacity(1);
        for (id, branch) in self.branches.iter_mut().enumerate() {
            if branch.grow(rng, steer, water_fraction, field) {
                grown.push(id);
            }
        }
        grown
    }

    /// Number of branches currently growing.
    pub fn active_count(&self) -> usize {
        self.branches.iter().filter(|b| b.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant_with_root() -> PlantState {
        let mut plant = PlantState::new(15, 10.0, 0.05);
        plant.replant(Vec3::ZERO);
        plant
    }

    #[test]
    fn replant_leaves_one_active_branch() {
        let plant = plant_with_root();
        assert_eq!(plant.len(), 1);
        assert_eq!(plant.active_id(), Some(0));
        assert_eq!(plant.active_count(), 1);
    }

    #[test]
    fn create_branch_costs_energy_and_freezes_parent() {
        let mut plant = plant_with_root();
        let mut gauges = ResourceGauges::new(100.0, 100.0, 100.0, 50.0);
        plant.branches[0].tip = Vec3::new(1.0, -2.0, 3.0);
        plant.branches[0].direction = Vec3::X;

        let id = plant.create_branch(&mut gauges, false).expect("branch allowed");

        assert_eq!(id, 1);
        assert_eq!(gauges.energy(), 40.0);
        assert_eq!(plant.len(), 2);
        assert!(!plant.branches[0].is_active());
        assert!(plant.branches[1].is_active());
        assert_eq!(plant.branches[1].start, Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(plant.branches[1].direction, Vec3::X);
        assert_eq!(plant.active_count(), 1);
    }

    #[test]
    fn create_branch_at_cap_is_a_no_op() {
        let mut plant = PlantState::new(2, 10.0, 0.05);
        plant.replant(Vec3::ZERO);
        let mut gauges = ResourceGauges::new(100.0, 100.0, 100.0, 90.0);

        assert!(plant.create_branch(&mut gauges, false).is_some());
        assert_eq!(gauges.energy(), 80.0);

        assert!(plant.create_branch(&mut gauges, false).is_none());
        assert_eq!(plant.len(), 2);
        assert_eq!(gauges.energy(), 80.0);
        assert_eq!(plant.active_id(), Some(1));
    }

    #[test]
    fn create_branch_needs_energy() {
        let mut plant = plant_with_root();
        let mut gauges = ResourceGauges::new(100.0, 100.0, 100.0, 9.5);

        assert!(plant.create_branch(&mut gauges, false).is_none());
        assert_eq!(gauges.energy(), 9.5);
        assert!(plant.branches[0].is_active());
    }

    #[test]
    fn create_branch_refused_after_game_over() {
        let mut plant = plant_with_root();
        let mut gauges = ResourceGauges::new(100.0, 100.0, 100.0, 50.0);

        assert!(plant.create_branch(&mut gauges, true).is_none());
        assert_eq!(gauges.energy(), 50.0);
    }

    #[test]
    fn freeze_active_leaves_no_active_branch() {
        let mut plant = plant_with_root();
        plant.freeze_active();
        assert_eq!(plant.active_count(), 0);

        let mut gauges = ResourceGauges::new(100.0, 100.0, 100.0, 50.0);
        assert!(plant.create_branch(&mut gauges, false).is_none());
    }

    #[test]
    fn auto_branch_chance_is_bounded() {
        assert_eq!(auto_branch_chance(0.0, 0.3), 0.0);
        assert!((auto_branch_chance(1.0, 0.3) - 0.3).abs() < 1e-7);
        assert!((auto_branch_chance(2.0, 0.3) - 0.3).abs() < 1e-7);
    }
}
