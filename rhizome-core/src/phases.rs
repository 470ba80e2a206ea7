//! Per-frame orchestration of a [`GameSession`].
//!
//! One call to [`step`] runs a whole frame:
//! 1. Edge-triggered commands (new branch, pause, reset) are applied.
//! 2. The deferred-task clock advances; due tasks run.
//! 3. While the session is running:
//!    [`steering_phase`] turns input into a direction, the active branch
//!    grows, [`glow_phase`] updates entity highlights, then collisions,
//!    absorption and gauges are resolved.
//! 4. Events raised along the way are flushed to the collaborators
//!    ([`flush_events`]), and the camera and HUD are refreshed.

use glam::Vec3;

use crate::{
    collab::{Display, HudText, Renderer, camera_target, glow_intensity},
    input::{InputIntent, resolve_steering},
    session::{GameSession, SessionEvent},
    types::EntityRef,
};

pub const BRANCH_MESSAGE_MS: u32 = 2_000;
pub const EVENT_MESSAGE_MS: u32 = 1_000;
/// Duration for messages that stay until replaced.
pub const PERSISTENT: u32 = 0;

/// Runs one frame of the game.
///
/// ### Parameters
/// - `session` - The session to advance; the only state mutated.
/// - `intent` - Input gathered since the previous frame.
/// - `dt` - Seconds since the previous frame, fed to the deferred-task clock.
/// - `renderer` - Scene collaborator; receives entity, branch and camera updates.
/// - `display` - Text collaborator; receives HUD lines and messages.
pub fn step(
    session: &mut GameSession,
    intent: &InputIntent,
    dt: f64,
    renderer: &mut impl Renderer,
    display: &mut impl Display,
) {
    for &command in &intent.commands {
        session.apply_command(command);
    }
    session.advance_clock(dt);

    if session.is_running() {
        let steer = steering_phase(session, intent, renderer);
        session.grow(steer);
        glow_phase(session, renderer);
        session.resolve_contacts();
    }

    flush_events(session, renderer, display);

    if session.is_running()
        && let Some(tip) = session.active_tip()
    {
        renderer.follow_camera(camera_target(tip));
    }
    hud_phase(session, display);
}

/// Combines held keys with the pointer ray into a steering direction.
///
/// The renderer is asked for a world point only while the pointer is held.
pub fn steering_phase(
    session: &GameSession,
    intent: &InputIntent,
    renderer: &mut impl Renderer,
) -> Option<Vec3> {
    let tip = session.active_tip()?;
    let target = intent
        .pointer
        .and_then(|pointer| renderer.raycast_from_pointer(pointer));
    resolve_steering(intent, tip, target)
}

/// Highlights nutrients and water near the active tip.
pub fn glow_phase(session: &GameSession, renderer: &mut impl Renderer) {
    let Some(tip) = session.active_tip() else {
        return;
    };
    for n in &session.registry.nutrients {
        renderer.set_entity_glow(
            EntityRef::Nutrient(n.id),
            glow_intensity(tip.distance(n.position)),
        );
    }
    for w in &session.registry.water {
        renderer.set_entity_glow(
            EntityRef::Water(w.id),
            glow_intensity(tip.distance(w.position)),
        );
    }
}

/// Drains the session outbox into the collaborators, in order.
pub fn flush_events(
    session: &mut GameSession,
    renderer: &mut impl Renderer,
    display: &mut impl Display,
) {
    let max_branches = session.plant.max_branches();
    for event in session.drain_events() {
        match event {
            SessionEvent::EntitySpawned(entity) => renderer.add_entity(&entity),
            SessionEvent::EntityRemoved(handle) => renderer.remove_entity(handle),
            SessionEvent::BranchCreated { id, count, at } => {
                if let Some(branch) = session.plant.branches.get(id) {
                    renderer.rebuild_branch_geometry(id, branch);
                }
                if count > 1 {
                    renderer.branching_effect(at);
                }
                display.set_message(
                    &format!("New root branch ({count}/{max_branches})"),
                    BRANCH_MESSAGE_MS,
                );
            }
            SessionEvent::BranchGrew(id) => {
                if let Some(branch) = session.plant.branches.get(id) {
                    renderer.rebuild_branch_geometry(id, branch);
                }
            }
            SessionEvent::BranchesCleared => renderer.clear_branches(),
            SessionEvent::Collision { .. } => display.set_message("Hit a rock!", EVENT_MESSAGE_MS),
            SessionEvent::NutrientAbsorbed(kind) => {
                display.set_message(&format!("Absorbed {}", kind.name()), EVENT_MESSAGE_MS);
            }
            SessionEvent::WaterAbsorbed => display.set_message("Water absorbed!", EVENT_MESSAGE_MS),
            SessionEvent::AwaitingStart => display.set_message("Press P to start", PERSISTENT),
            SessionEvent::Paused => display.set_message("Paused", EVENT_MESSAGE_MS),
            SessionEvent::Resumed => display.set_message("Resumed", EVENT_MESSAGE_MS),
            SessionEvent::GameOver { score } => display.set_message(
                &format!("Game Over! Final Score: {score} - Press R to restart"),
                PERSISTENT,
            ),
            SessionEvent::Reset => display.set_message("Game Restarted", BRANCH_MESSAGE_MS),
        }
    }
}

/// Pushes the gauge and score lines to the display.
///
/// Runs every frame, paused or not, so the HUD always shows the current levels.
pub fn hud_phase(session: &GameSession, display: &mut impl Display) {
    HudText::new(
        session.gauges.water(),
        session.gauges.energy(),
        session.score,
        session.plant.len(),
        session.plant.max_branches(),
    )
    .apply(display);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        branch::Branch,
        collab::CameraTarget,
        config::GameConfig,
        entity::{Nutrient, Obstacle, ResourceEntity, WaterUnit},
        input::SessionCommand,
        nutrient::NutrientKind,
        types::{BranchId, EntityId},
    };
    use glam::Vec2;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Scene {
        entities: HashMap<EntityRef, Vec3>,
        glow: HashMap<EntityRef, f32>,
        branches: HashMap<BranchId, Vec3>,
        effects: Vec<Vec3>,
        camera: Option<CameraTarget>,
        ground: Option<Vec3>,
        raycasts: usize,
    }

    impl Renderer for Scene {
        fn add_entity(&mut self, entity: &ResourceEntity) {
            self.entities.insert(entity.handle(), entity.position());
        }
        fn remove_entity(&mut self, handle: EntityRef) {
            self.entities.remove(&handle);
            self.glow.remove(&handle);
        }
        fn raycast_from_pointer(&mut self, _pointer: Vec2) -> Option<Vec3> {
            self.raycasts += 1;
            self.ground
        }
        fn rebuild_branch_geometry(&mut self, id: BranchId, branch: &Branch) {
            self.branches.insert(id, branch.tip);
        }
        fn clear_branches(&mut self) {
            self.branches.clear();
        }
        fn set_entity_glow(&mut self, handle: EntityRef, intensity: f32) {
            self.glow.insert(handle, intensity);
        }
        fn branching_effect(&mut self, at: Vec3) {
            self.effects.push(at);
        }
        fn follow_camera(&mut self, target: CameraTarget) {
            self.camera = Some(target);
        }
    }

    #[derive(Default)]
    struct Hud {
        water: String,
        score: String,
        messages: Vec<(String, u32)>,
    }

    impl Display for Hud {
        fn set_water_text(&mut self, text: &str, _low: bool) {
            self.water = text.to_owned();
        }
        fn set_energy_text(&mut self, _text: &str, _low: bool) {}
        fn set_score_text(&mut self, text: &str) {
            self.score = text.to_owned();
        }
        fn set_message(&mut self, text: &str, duration_ms: u32) {
            self.messages.push((text.to_owned(), duration_ms));
        }
    }

    fn running_session() -> GameSession {
        GameSession::new(GameConfig {
            initial_nutrients: 0,
            initial_water_units: 0,
            initial_obstacles: 0,
            start_paused: false,
            rng_seed: Some(3),
            ..GameConfig::default()
        })
        .expect("valid config")
    }

    fn last_message(hud: &Hud) -> Option<&str> {
        hud.messages.last().map(|(m, _)| m.as_str())
    }

    #[test]
    fn paused_session_waits_for_start() {
        let mut session = GameSession::new(GameConfig {
            rng_seed: Some(3),
            ..GameConfig::default()
        })
        .expect("valid config");
        let (mut scene, mut hud) = (Scene::default(), Hud::default());

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        assert_eq!(hud.messages.last(), Some(&("Press P to start".to_owned(), 0)));
        assert_eq!(scene.entities.len(), 160);
        assert_eq!(session.ticks(), 0);
        assert!(scene.camera.is_none());
        assert_eq!(hud.water, "Water: 100%");
        assert_eq!(hud.score, "Score: 0 | Branches: 1/15");
    }

    #[test]
    fn running_frame_grows_and_follows_camera() {
        let mut session = running_session();
        let (mut scene, mut hud) = (Scene::default(), Hud::default());

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        assert_eq!(session.ticks(), 1);
        let tip = session.active_tip().expect("active branch");
        assert_ne!(tip, Vec3::ZERO);
        assert_eq!(scene.branches.get(&0), Some(&tip));
        assert_eq!(scene.camera, Some(camera_target(tip)));
    }

    #[test]
    fn pointer_only_raycasts_while_held() {
        let mut session = running_session();
        let (mut scene, mut hud) = (Scene::default(), Hud::default());
        scene.ground = Some(Vec3::new(10.0, -1.0, 0.0));

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);
        assert_eq!(scene.raycasts, 0);

        let held = InputIntent {
            pointer: Some(Vec2::ZERO),
            ..InputIntent::default()
        };
        step(&mut session, &held, 0.016, &mut scene, &mut hud);
        assert_eq!(scene.raycasts, 1);
    }

    #[test]
    fn commands_produce_messages_in_order() {
        let mut session = running_session();
        let (mut scene, mut hud) = (Scene::default(), Hud::default());
        let intent = InputIntent {
            commands: vec![SessionCommand::NewBranch, SessionCommand::TogglePause],
            ..InputIntent::default()
        };

        step(&mut session, &intent, 0.016, &mut scene, &mut hud);

        let texts: Vec<&str> = hud.messages.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(texts, vec!["New root branch (1/15)", "New root branch (2/15)", "Paused"]);
        assert_eq!(scene.effects.len(), 1);
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn glow_follows_distance_to_tip() {
        let mut session = running_session();
        let near = session.registry.insert(ResourceEntity::Water(WaterUnit {
            id: EntityId(0),
            position: Vec3::new(0.0, -3.0, 0.0),
            value: 10.0,
        }));
        let far = session.registry.insert(ResourceEntity::Nutrient(Nutrient {
            id: EntityId(0),
            kind: NutrientKind::Iron,
            position: Vec3::new(0.0, -20.0, 0.0),
        }));
        let (mut scene, mut hud) = (Scene::default(), Hud::default());

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        assert_eq!(scene.glow.get(&near), Some(&1.0));
        assert_eq!(scene.glow.get(&far), Some(&0.3));
    }

    #[test]
    fn collision_and_absorption_reach_the_display() {
        let mut session = running_session();
        session.registry.insert(ResourceEntity::Obstacle(Obstacle {
            id: EntityId(0),
            position: Vec3::new(1.5, 0.0, 0.0),
            radius: 1.0,
        }));
        session.registry.insert(ResourceEntity::Nutrient(Nutrient {
            id: EntityId(0),
            kind: NutrientKind::Nitrogen,
            position: Vec3::ZERO,
        }));
        let (mut scene, mut hud) = (Scene::default(), Hud::default());

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        let texts: Vec<&str> = hud.messages.iter().map(|(m, _)| m.as_str()).collect();
        assert!(texts.contains(&"Hit a rock!"));
        assert_eq!(last_message(&hud), Some("Absorbed Nitrogen"));
        assert_eq!(hud.score, "Score: 40 | Branches: 1/15");
    }

    #[test]
    fn reset_clears_scene_and_reseeds() {
        let mut session = running_session();
        let (mut scene, mut hud) = (Scene::default(), Hud::default());
        session.registry.insert(ResourceEntity::Water(WaterUnit {
            id: EntityId(0),
            position: Vec3::new(5.0, -18.0, 5.0),
            value: 10.0,
        }));
        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        let intent = InputIntent {
            commands: vec![SessionCommand::Reset],
            ..InputIntent::default()
        };
        step(&mut session, &intent, 0.016, &mut scene, &mut hud);

        assert!(scene.entities.is_empty());
        assert_eq!(scene.branches.len(), 1);
        assert_eq!(last_message(&hud), Some("Game Restarted"));
    }

    #[test]
    fn game_over_message_is_persistent() {
        let mut session = GameSession::new(GameConfig {
            initial_nutrients: 0,
            initial_water_units: 0,
            initial_obstacles: 0,
            start_paused: false,
            starting_water: 0.0,
            starting_energy: 0.0,
            rng_seed: Some(3),
            ..GameConfig::default()
        })
        .expect("valid config");
        let (mut scene, mut hud) = (Scene::default(), Hud::default());

        step(&mut session, &InputIntent::default(), 0.016, &mut scene, &mut hud);

        assert!(session.is_game_over());
        assert_eq!(
            hud.messages.last(),
            Some(&("Game Over! Final Score: 0 - Press R to restart".to_owned(), 0))
        );
    }
}
