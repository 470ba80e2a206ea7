//! Operator intent: held direction flags, pointer steering and one-shot commands.

use glam::{Vec2, Vec3};

/// Edge-triggered session commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    NewBranch,
    TogglePause,
    Reset,
}

/// Input gathered for one frame.
///
/// Axis flags follow the view's convention: forward is `-z`, right is `+x`,
/// up is `+y`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Pointer in normalized device coordinates while a button is held.
    pub pointer: Option<Vec2>,
    pub commands: Vec<SessionCommand>,
}

impl InputIntent {
    /// Raw direction from the held axis flags, not normalized.
    ///
    /// When both flags of an axis are held the later one in the table wins
    /// (back over forward, right over left, up over down).
    pub fn key_vector(&self) -> Vec3 {
        let mut v = Vec3::ZERO;
        if self.forward {
            v.z = -1.0;
        }
        if self.back {
            v.z = 1.0;
        }
        if self.left {
            v.x = -1.0;
        }
        if self.right {
            v.x = 1.0;
        }
        if self.down {
            v.y = -1.0;
        }
        if self.up {
            v.y = 1.0;
        }
        v
    }

    pub fn has_direction(&self) -> bool {
        self.key_vector() != Vec3::ZERO || self.pointer.is_some()
    }
}

/// Combines key flags with a pointer target into one steering direction.
///
/// `target` is the world point under the pointer; it is pulled down to the
/// surface plane before aiming at it from `tip`. Keys and pointer are
/// averaged 50/50 when the pointer hit something.
///
/// ### Returns
/// A unit vector, or `None` if there is no steering this frame.
pub fn resolve_steering(intent: &InputIntent, tip: Vec3, target: Option<Vec3>) -> Option<Vec3> {
    let mut dir = intent.key_vector();
    if let Some(mut target) = target {
        target.y = target.y.min(0.0);
        let toward = (target - tip).normalize_or_zero();
        dir = dir * 0.5 + toward * 0.5;
    }
    dir.try_normalize()
}
