//! Interfaces of the drawing and text collaborators, plus the small pure
//! helpers the step uses to feed them.

use glam::{Vec2, Vec3};

use crate::{
    branch::Branch,
    entity::ResourceEntity,
    types::{BranchId, EntityRef},
};

/// Distance within which resources light up near the active tip.
pub const GLOW_RADIUS: f32 = 5.0;
pub const GLOW_NEAR: f32 = 1.0;
pub const GLOW_FAR: f32 = 0.3;

/// Water level below which the HUD flags water as low.
pub const LOW_WATER: f64 = 30.0;
/// Energy level below which the HUD flags energy as low.
pub const LOW_ENERGY: f64 = 20.0;

/// Scene side of the game: entity meshes, branch geometry, camera.
pub trait Renderer {
    fn add_entity(&mut self, entity: &ResourceEntity);
    fn remove_entity(&mut self, handle: EntityRef);
    /// World point under the pointer, if the pointer hits the ground.
    fn raycast_from_pointer(&mut self, pointer: Vec2) -> Option<Vec3>;
    /// Called whenever a branch's path or tip changed.
    fn rebuild_branch_geometry(&mut self, id: BranchId, branch: &Branch);
    /// Drops every branch mesh, e.g. on reset.
    fn clear_branches(&mut self);
    fn set_entity_glow(&mut self, handle: EntityRef, intensity: f32);
    /// Short-lived flash where a new branch split off.
    fn branching_effect(&mut self, at: Vec3);
    fn follow_camera(&mut self, target: CameraTarget);
}

/// Text side of the game.
pub trait Display {
    fn set_water_text(&mut self, text: &str, low: bool);
    fn set_energy_text(&mut self, text: &str, low: bool);
    fn set_score_text(&mut self, text: &str);
    /// Shows `text` for `duration_ms`; `0` keeps it until replaced.
    fn set_message(&mut self, text: &str, duration_ms: u32);
}

/// Where the camera should head for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTarget {
    pub eye: Vec3,
    pub look_at: Vec3,
}

/// Camera above and behind the tip, never below the surface.
pub fn camera_target(tip: Vec3) -> CameraTarget {
    CameraTarget {
        eye: Vec3::new(tip.x, (tip.y + 10.0).max(0.0), tip.z + 15.0),
        look_at: tip,
    }
}

#[inline]
pub fn glow_intensity(distance: f32) -> f32 {
    if distance < GLOW_RADIUS { GLOW_NEAR } else { GLOW_FAR }
}

/// HUD lines derived from the session's gauges and score.
#[derive(Clone, Debug, PartialEq)]
pub struct HudText {
    pub water: String,
    pub water_low: bool,
    pub energy: String,
    pub energy_low: bool,
    pub score: String,
}

impl HudText {
    pub fn new(water: f64, energy: f64, score: u32, branches: usize, max_branches: usize) -> Self {
        Self {
            water: format!("Water: {}%", water.floor()),
            water_low: water < LOW_WATER,
            energy: format!("Energy: {}%", energy.floor()),
            energy_low: energy < LOW_ENERGY,
            score: format!("Score: {score} | Branches: {branches}/{max_branches}"),
        }
    }

    pub fn apply(&self, display: &mut impl Display) {
        display.set_water_text(&self.water, self.water_low);
        display.set_energy_text(&self.energy, self.energy_low);
        display.set_score_text(&self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_never_dips_below_surface() {
        let t = camera_target(Vec3::new(3.0, -20.0, 1.0));
        assert_eq!(t.eye, Vec3::new(3.0, 0.0, 16.0));
        assert_eq!(t.look_at, Vec3::new(3.0, -20.0, 1.0));

        let shallow = camera_target(Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(shallow.eye.y, 8.0);
    }

    #[test]
    fn glow_switches_at_radius() {
        assert_eq!(glow_intensity(4.99), GLOW_NEAR);
        assert_eq!(glow_intensity(5.0), GLOW_FAR);
    }

    #[test]
    fn hud_text_floors_and_flags_low_levels() {
        let hud = HudText::new(29.9, 75.6, 120, 3, 15);
        assert_eq!(hud.water, "Water: 29%");
        assert!(hud.water_low);
        assert_eq!(hud.energy, "Energy: 75%");
        assert!(!hud.energy_low);
        assert_eq!(hud.score, "Score: 120 | Branches: 3/15");
    }
}
