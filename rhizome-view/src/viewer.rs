//! Interactive root-growth game built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`GameSession`] together
//! with the [`Scene`] and [`Hud`] collaborators, and implements
//! [`eframe::App`] to drive one [`phases::step`] per frame.

use eframe::App;
use egui::{Color32, Key, Stroke};
use rhizome_core::{
    ConfigError, GameConfig, GameSession,
    input::{InputIntent, SessionCommand},
    phases,
};
use tracing::debug;

use crate::scene::{Hud, Scene};

/// Longest frame delta fed to the deferred-task clock, in seconds.
const MAX_FRAME_DT: f64 = 0.25;

const SOIL: Color32 = Color32::from_rgb(0x3d, 0x2b, 0x1f);
const SKY: Color32 = Color32::from_rgb(0x87, 0xce, 0xeb);
const ACTIVE_ROOT: Color32 = Color32::from_rgb(0xf5, 0xde, 0xb3);
const FROZEN_ROOT: Color32 = Color32::from_rgb(0x8b, 0x5a, 0x2b);

/// Main application state for the game window.
///
/// ### Fields
/// - `session` - The game being played.
/// - `scene` - Drawing-side mirror of the session, fed through [`phases::step`].
/// - `hud` - Text lines and the current message.
/// - `pending` - Commands from toolbar buttons, applied on the next step.
/// - `last_time` - egui time of the previous frame.
pub struct Viewer {
    session: GameSession,
    scene: Scene,
    hud: Hud,
    pending: Vec<SessionCommand>,
    last_time: Option<f64>,
}

/// Builds the frame's intent from keyboard state.
///
/// `held` answers whether a key is down, `pressed` whether it went down
/// this frame.
pub fn intent_from_keys(held: impl Fn(Key) -> bool, pressed: impl Fn(Key) -> bool) -> InputIntent {
    let mut commands = Vec::new();
    if pressed(Key::Space) {
        commands.push(SessionCommand::NewBranch);
    }
    if pressed(Key::P) {
        commands.push(SessionCommand::TogglePause);
    }
    if pressed(Key::R) {
        commands.push(SessionCommand::Reset);
    }

    InputIntent {
        forward: held(Key::W) || held(Key::ArrowUp),
        back: held(Key::S) || held(Key::ArrowDown),
        left: held(Key::A) || held(Key::ArrowLeft),
        right: held(Key::D) || held(Key::ArrowRight),
        up: held(Key::E),
        down: held(Key::Q),
        pointer: None,
        commands,
    }
}

impl Viewer {
    /// Creates a viewer around a fresh session.
    ///
    /// The scene and HUD are filled from the session's initial events on
    /// the first frame.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let session = GameSession::new(config)?;
        Ok(Self {
            session,
            scene: Scene::new(18.0),
            hud: Hud::default(),
            pending: Vec::new(),
            last_time: None,
        })
    }

    /// Runs one game step at viewer time `now`.
    fn step(&mut self, mut intent: InputIntent, now: f64) {
        let dt = self
            .last_time
            .map_or(0.0, |t| (now - t).clamp(0.0, MAX_FRAME_DT));
        self.last_time = Some(now);

        let mut commands = std::mem::take(&mut self.pending);
        commands.append(&mut intent.commands);
        intent.commands = commands;
        if !intent.commands.is_empty() {
            debug!(commands = ?intent.commands, "applying commands");
        }

        self.hud.now = now;
        phases::step(&mut self.session, &intent, dt, &mut self.scene, &mut self.hud);
        self.scene.fade_flashes();
    }

    /// Builds the top toolbar (pause, new branch, reset, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = if self.session.is_paused() {
                    "▶ Resume"
                } else {
                    "⏸ Pause"
                };
                if ui.button(label).clicked() {
                    self.pending.push(SessionCommand::TogglePause);
                }
                if ui.button("New Branch").clicked() {
                    self.pending.push(SessionCommand::NewBranch);
                }
                if ui.button("Reset").clicked() {
                    self.pending.push(SessionCommand::Reset);
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.scene.zoom, 4.0..=60.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar with the HUD lines.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let tint = |low: bool| if low { Color32::RED } else { Color32::LIGHT_GRAY };
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.hud.water).color(tint(self.hud.water_low)));
                ui.separator();
                ui.label(egui::RichText::new(&self.hud.energy).color(tint(self.hud.energy_low)));
                ui.separator();
                ui.label(&self.hud.score);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("ticks = {}", self.session.ticks()));
                });
            });
        });
    }

    /// Builds the central view: reads input, steps the game and draws it.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;
                self.scene.rect = rect;

                // Zoom with the scroll wheel.
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.scene.zoom = (self.scene.zoom * factor).clamp(4.0, 60.0);
                }

                let mut intent = ctx.input(|i| {
                    intent_from_keys(|k| i.key_down(k), |k| i.key_pressed(k))
                });
                if response.is_pointer_button_down_on() {
                    intent.pointer = response
                        .interact_pointer_pos()
                        .and_then(|p| Scene::to_ndc(p, rect));
                }

                let now = ctx.input(|i| i.time);
                self.step(intent, now);

                self.paint(&ui.painter_at(rect), rect);
            });
    }

    fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        let scene = &self.scene;

        // Sky above the surface plane, soil below.
        let surface = scene
            .world_to_screen(glam::Vec3::new(scene.focus.x, 0.0, scene.focus.z), rect)
            .y
            .clamp(rect.top(), rect.bottom());
        painter.rect_filled(
            egui::Rect::from_min_max(rect.min, egui::pos2(rect.right(), surface)),
            egui::CornerRadius::ZERO,
            SKY,
        );
        painter.rect_filled(
            egui::Rect::from_min_max(egui::pos2(rect.left(), surface), rect.max),
            egui::CornerRadius::ZERO,
            SOIL,
        );

        for e in scene.depth_sorted() {
            let p = scene.world_to_screen(e.position, rect);
            let r = (e.radius * scene.zoom).max(2.0);
            painter.circle_filled(p, r, e.shaded());
        }

        let active = self.session.plant.active_id();
        for (&id, outline) in &scene.branches {
            let (color, width) = if Some(id) == active {
                (ACTIVE_ROOT, 3.0)
            } else {
                (FROZEN_ROOT, 2.0)
            };
            let points: Vec<egui::Pos2> = outline
                .iter()
                .map(|&p| scene.world_to_screen(p, rect))
                .collect();
            painter.line(points, Stroke::new(width, color));
        }

        if let Some(tip) = self.session.active_tip() {
            painter.circle_filled(scene.world_to_screen(tip, rect), 3.0, Color32::WHITE);
        }

        for f in &scene.flashes {
            let alpha = (f.opacity.clamp(0.0, 1.0) * 255.0) as u8;
            painter.circle_filled(
                scene.world_to_screen(f.at, rect),
                f.size * scene.zoom,
                Color32::from_rgba_unmultiplied(255, 255, 255, alpha),
            );
        }

        if let Some(message) = self.hud.message() {
            painter.text(
                egui::pos2(rect.center().x, rect.top() + 40.0),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(22.0),
                Color32::WHITE,
            );
        }
    }
}

impl App for Viewer {
    /// eframe callback that builds all panels and advances the game once.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
        ctx.request_repaint();
    }
}
