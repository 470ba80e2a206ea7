//! World bounds and random resource placement.

use glam::Vec3;
use rand::Rng;

use crate::{config::GameConfig, entity::Obstacle};

/// Bookkeeping for the playable volume.
///
/// Resources are placed inside a horizontal square of half-size
/// `spawn_half_extent` and a vertical band
/// `[min_depth, max_depth]`. Branch tips are clamped to `bounds`, with the
/// surface plane `y = 0` as the upper limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialField {
    pub bounds: Vec3,
    pub spawn_half_extent: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl SpatialField {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            bounds: cfg.world_bounds,
            spawn_half_extent: cfg.spawn_half_extent,
            min_depth: cfg.min_resource_depth,
            max_depth: cfg.max_resource_depth,
        }
    }

    /// Draws one uniform position inside the spawn region.
    pub fn random_position(&self, rng: &mut impl Rng) -> Vec3 {
        let h = self.spawn_half_extent;
        let x = if h > 0.0 { rng.random_range(-h..h) } else { 0.0 };
        let z = if h > 0.0 { rng.random_range(-h..h) } else { 0.0 };
        let y = if self.max_depth > self.min_depth {
            rng.random_range(self.min_depth..self.max_depth)
        } else {
            self.min_depth
        };
        Vec3::new(x, y, z)
    }

    /// Samples a spawn position away from existing obstacles.
    ///
    /// Candidates closer than `min_separation` to any obstacle center are
    /// rejected and redrawn, up to `max_attempts` draws in total. When every
    /// attempt is rejected the last candidate is returned anyway, so placement
    /// always succeeds but separation is not guaranteed.
    ///
    /// ### Returns
    /// `None` only when `max_attempts` is zero and nothing was drawn.
    pub fn sample_position(
        &self,
        rng: &mut impl Rng,
        obstacles: &[Obstacle],
        min_separation: f32,
        max_attempts: u32,
    ) -> Option<Vec3> {
        let mut candidate = None;
        for _ in 0..max_attempts {
            let pos = self.random_position(rng);
            candidate = Some(pos);
            if obstacles
                .iter()
                .all(|o| pos.distance(o.position) >= min_separation)
            {
                break;
            }
        }
        candidate
    }

    /// Clamps a point into the world box; `y` may not rise above the surface.
    #[inline]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(-self.bounds.x, self.bounds.x),
            p.y.clamp(-self.bounds.y, 0.0),
            p.z.clamp(-self.bounds.z, self.bounds.z),
        )
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        self.clamp(p) == p
    }
}
