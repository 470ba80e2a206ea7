//! Scene and HUD state fed by the core's collaborator traits.
//!
//! [`Scene`] is the drawing side: it mirrors spawned entities, branch
//! outlines and short-lived effects, and owns the oblique projection used
//! to turn 3-D world points into screen positions. [`Hud`] holds the text
//! lines and the timed message.

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect};
use glam::{Vec2, Vec3};
use rhizome_core::{
    branch::Branch,
    collab::{CameraTarget, Display, Renderer},
    entity::ResourceEntity,
    types::{BranchId, EntityRef},
};

/// Screen offset per unit of world depth, in world units.
///
/// Points further back (`-z`) shift right and up, which gives a cheap
/// oblique view of the soil volume.
pub const DEPTH_SHEAR: Vec2 = Vec2::new(-0.35, -0.2);
/// Fraction of the remaining distance the focus moves toward the camera
/// target each frame.
pub const CAMERA_EASE: f32 = 0.05;

const WATER_COLOR: Color32 = Color32::from_rgb(0x1e, 0x90, 0xff);
const OBSTACLE_COLOR: Color32 = Color32::from_rgb(0x80, 0x80, 0x80);
const WATER_RADIUS: f32 = 0.3;

/// Visual record of one spawned entity.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEntity {
    pub position: Vec3,
    pub radius: f32,
    pub color: Color32,
    pub glow: f32,
}

impl SceneEntity {
    fn from_resource(entity: &ResourceEntity) -> Self {
        let (radius, color, glow) = match entity {
            ResourceEntity::Nutrient(n) => {
                let profile = n.profile();
                (profile.size * 0.5, rgb(profile.color), 0.3)
            }
            ResourceEntity::Water(_) => (WATER_RADIUS, WATER_COLOR, 0.3),
            ResourceEntity::Obstacle(o) => (o.radius, OBSTACLE_COLOR, 1.0),
        };
        Self {
            position: entity.position(),
            radius,
            color,
            glow,
        }
    }

    /// Display color with the glow applied as brightness.
    pub fn shaded(&self) -> Color32 {
        self.color.gamma_multiply(0.5 + 0.5 * self.glow)
    }
}

/// Expanding, fading ring left where a branch split off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flash {
    pub at: Vec3,
    pub size: f32,
    pub opacity: f32,
}

fn rgb(c: u32) -> Color32 {
    Color32::from_rgb((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

/// Everything the viewer draws, plus the projection that places it.
pub struct Scene {
    pub entities: HashMap<EntityRef, SceneEntity>,
    pub branches: HashMap<BranchId, Vec<Vec3>>,
    pub flashes: Vec<Flash>,
    /// World point kept at the center of the view.
    pub focus: Vec3,
    /// Pixels per world unit.
    pub zoom: f32,
    /// Drawing area from the last frame, used for pointer raycasts.
    pub rect: Rect,
}

impl Scene {
    pub fn new(zoom: f32) -> Self {
        Self {
            entities: HashMap::new(),
            branches: HashMap::new(),
            flashes: Vec::new(),
            focus: Vec3::ZERO,
            zoom,
            rect: Rect::NOTHING,
        }
    }

    /// Projects a world point into screen space.
    ///
    /// The view is a side projection centered on `focus`, with depth
    /// sheared by [`DEPTH_SHEAR`]. Screen y grows downward, world y upward.
    pub fn world_to_screen(&self, p: Vec3, rect: Rect) -> Pos2 {
        let rel = p - self.focus;
        let u = rel.x + rel.z * DEPTH_SHEAR.x;
        let v = rel.y + rel.z * DEPTH_SHEAR.y;
        let center = rect.center();
        egui::pos2(center.x + u * self.zoom, center.y - v * self.zoom)
    }

    /// Inverse of [`Scene::world_to_screen`] on the plane at depth `z`.
    pub fn screen_to_world(&self, p: Pos2, z: f32, rect: Rect) -> Vec3 {
        let center = rect.center();
        let u = (p.x - center.x) / self.zoom;
        let v = (center.y - p.y) / self.zoom;
        let rel_z = z - self.focus.z;
        Vec3::new(
            self.focus.x + u - rel_z * DEPTH_SHEAR.x,
            self.focus.y + v - rel_z * DEPTH_SHEAR.y,
            z,
        )
    }

    /// Converts a screen position into normalized device coordinates of `rect`.
    pub fn to_ndc(p: Pos2, rect: Rect) -> Option<Vec2> {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }
        let c = rect.center();
        Some(Vec2::new(
            (p.x - c.x) / (rect.width() * 0.5),
            (c.y - p.y) / (rect.height() * 0.5),
        ))
    }

    fn from_ndc(ndc: Vec2, rect: Rect) -> Pos2 {
        let c = rect.center();
        egui::pos2(
            c.x + ndc.x * rect.width() * 0.5,
            c.y - ndc.y * rect.height() * 0.5,
        )
    }

    /// Advances every flash by one frame and drops the faded ones.
    pub fn fade_flashes(&mut self) {
        for f in &mut self.flashes {
            f.size += 0.1;
            f.opacity -= 0.05;
        }
        self.flashes.retain(|f| f.opacity > 0.0);
    }

    /// Entities ordered back to front for painting.
    pub fn depth_sorted(&self) -> Vec<&SceneEntity> {
        let mut all: Vec<&SceneEntity> = self.entities.values().collect();
        all.sort_by(|a, b| a.position.z.total_cmp(&b.position.z));
        all
    }
}

impl Renderer for Scene {
    fn add_entity(&mut self, entity: &ResourceEntity) {
        self.entities
            .insert(entity.handle(), SceneEntity::from_resource(entity));
    }

    fn remove_entity(&mut self, handle: EntityRef) {
        self.entities.remove(&handle);
    }

    /// Maps the pointer onto the vertical plane through the focus.
    fn raycast_from_pointer(&mut self, pointer: Vec2) -> Option<Vec3> {
        if !self.rect.is_positive() {
            return None;
        }
        let screen = Self::from_ndc(pointer, self.rect);
        let mut hit = self.screen_to_world(screen, self.focus.z, self.rect);
        hit.y = hit.y.min(0.0);
        Some(hit)
    }

    fn rebuild_branch_geometry(&mut self, id: BranchId, branch: &Branch) {
        self.branches.insert(id, branch.outline());
    }

    fn clear_branches(&mut self) {
        self.branches.clear();
    }

    fn set_entity_glow(&mut self, handle: EntityRef, intensity: f32) {
        if let Some(e) = self.entities.get_mut(&handle) {
            e.glow = intensity;
        }
    }

    fn branching_effect(&mut self, at: Vec3) {
        self.flashes.push(Flash {
            at,
            size: 0.5,
            opacity: 0.7,
        });
    }

    fn follow_camera(&mut self, target: CameraTarget) {
        self.focus = self.focus.lerp(target.look_at, CAMERA_EASE);
    }
}

/// A message and the time it disappears, if ever.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedMessage {
    pub text: String,
    pub expires_at: Option<f64>,
}

/// HUD lines as last pushed by the core.
#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub water: String,
    pub water_low: bool,
    pub energy: String,
    pub energy_low: bool,
    pub score: String,
    message: Option<TimedMessage>,
    /// Viewer time in seconds, set before each step.
    pub now: f64,
}

impl Hud {
    /// Current message, if one is set and not yet expired.
    pub fn message(&self) -> Option<&str> {
        let m = self.message.as_ref()?;
        match m.expires_at {
            Some(t) if self.now >= t => None,
            _ => Some(m.text.as_str()),
        }
    }
}

impl Display for Hud {
    fn set_water_text(&mut self, text: &str, low: bool) {
        text.clone_into(&mut self.water);
        self.water_low = low;
    }

    fn set_energy_text(&mut self, text: &str, low: bool) {
        text.clone_into(&mut self.energy);
        self.energy_low = low;
    }

    fn set_score_text(&mut self, text: &str) {
        text.clone_into(&mut self.score);
    }

    fn set_message(&mut self, text: &str, duration_ms: u32) {
        let expires_at = (duration_ms > 0).then(|| self.now + f64::from(duration_ms) / 1000.0);
        self.message = Some(TimedMessage {
            text: text.to_owned(),
            expires_at,
        });
    }
}
