//! Growth state machine for a single root branch.

use glam::Vec3;
use rand::Rng;

use crate::{field::SpatialField, nutrient::NutrientKind};

/// Slowest growth, reached with an empty water gauge.
pub const MIN_GROWTH_SPEED: f32 = 0.03;
/// Extra speed added at a full water gauge.
pub const WATER_SPEED_BONUS: f32 = 0.04;
/// Max random drift added to `direction.x` and `direction.z` per tick.
const LATERAL_DRIFT: f32 = 0.01;
/// Max downward bias subtracted from `direction.y` per tick.
const DOWNWARD_DRIFT: f32 = 0.01;
/// Ticks between samples of the tip into `path`.
pub const PATH_SAMPLE_INTERVAL: u32 = 5;
/// Weight of operator steering against organic drift.
const STEER_WEIGHT: f32 = 0.5;
/// Direction multiplier applied on an obstacle hit.
pub const BOUNCE_FACTOR: f32 = -0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchState {
    Growing,
    /// Superseded by a newer branch. Terminal.
    Frozen,
}

/// Growth speed for a water fill fraction, clamped to `[0, 1]`.
///
/// Result lies in `[MIN_GROWTH_SPEED, MIN_GROWTH_SPEED + WATER_SPEED_BONUS]`.
#[inline]
pub fn growth_speed_for(water_fraction: f32) -> f32 {
    let f = if water_fraction.is_nan() {
        0.0
    } else {
        water_fraction.clamp(0.0, 1.0)
    };
    MIN_GROWTH_SPEED + f * WATER_SPEED_BONUS
}

/// One growth thread of the root system.
#[derive(Clone, Debug)]
pub struct Branch {
    pub start: Vec3,
    pub tip: Vec3,
    /// Heading, unit length after every growth step.
    pub direction: Vec3,
    pub growth_speed: f32,
    /// Tip samples, starting with `start`. Append-only.
    pub path: Vec<Vec3>,
    pub age: u32,
    pub state: BranchState,
    /// Nutrients absorbed while this branch was active, in order.
    pub absorbed: Vec<NutrientKind>,
}

impl Branch {
    /// Creates a growing branch at `start`.
    ///
    /// `heading` is normalized; a missing or degenerate heading points the
    /// branch straight down.
    pub fn new(start: Vec3, heading: Option<Vec3>, growth_speed: f32) -> Self {
        let direction = heading
            .and_then(Vec3::try_normalize)
            .unwrap_or(Vec3::NEG_Y);
        Self {
            start,
            tip: start,
            direction,
            growth_speed,
            path: vec![start],
            age: 0,
            state: BranchState::Growing,
            absorbed: Vec::new(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BranchState::Growing
    }

    /// Permanently stops this branch.
    pub fn freeze(&mut self) {
        self.state = BranchState::Frozen;
    }

    /// Adds small random drift to the heading, biased downward, and renormalizes.
    pub fn perturb(&mut self, rng: &mut impl Rng) {
        self.direction.x += rng.random_range(-LATERAL_DRIFT..LATERAL_DRIFT);
        self.direction.z += rng.random_range(-LATERAL_DRIFT..LATERAL_DRIFT);
        self.direction.y -= rng.random_range(0.0..DOWNWARD_DRIFT);
        self.direction = self.direction.try_normalize().unwrap_or(Vec3::NEG_Y);
    }

    /// Averages the heading with an operator steering direction.
    pub fn steer(&mut self, input: Vec3) {
        let blended = input * STEER_WEIGHT + self.direction * (1.0 - STEER_WEIGHT);
        if let Some(dir) = blended.try_normalize() {
            self.direction = dir;
        }
    }

    /// Advances a growing branch by one tick.
    ///
    /// 1. Perturb the heading.
    /// 2. Blend in `steer` if present.
    /// 3. Move the tip by `direction * growth_speed`.
    /// 4. Recompute the speed from `water_fraction`.
    /// 5. Every [`PATH_SAMPLE_INTERVAL`] ticks, sample the tip into `path`.
    /// 6. Clamp the tip into `field`.
    /// 7. Increment `age`.
    ///
    /// Frozen branches are left untouched.
    ///
    /// ### Returns
    /// `true` if the branch changed.
    pub fn grow(
        &mut self,
        rng: &mut impl Rng,
        steer: Option<Vec3>,
        water_fraction: f32,
        field: &SpatialField,
    ) -> bool {
        if !self.is_active() {
            return false;
        }

        self.perturb(rng);
        if let Some(input) = steer {
            self.steer(input);
        }

        self.tip += self.direction * self.growth_speed;
        self.growth_speed = growth_speed_for(water_fraction);

        if self.age % PATH_SAMPLE_INTERVAL == 0 {
            self.path.push(self.tip);
        }

        self.tip = field.clamp(self.tip);
        self.age += 1;
        true
    }

    /// Reverses and dampens the heading and halves the speed.
    pub fn bounce(&mut self) {
        self.direction *= BOUNCE_FACTOR;
        self.growth_speed *= 0.5;
    }

    /// Path samples followed by the current tip, ready for tessellation.
    pub fn outline(&self) -> Vec<Vec3> {
        let mut pts = Vec::with_capacity(self.path.len() + 1);
        pts.extend_from_slice(&self.path);
        pts.push(self.tip);
        pts
    }
}
