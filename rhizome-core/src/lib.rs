//! Core root-growth game library.
//!
//! Main components:
//! - [`session`]: the [`session::GameSession`] aggregate and its mutations.
//! - [`phases`]: the per-frame step that drives a session.
//! - [`branch`] / [`plant`]: single-branch growth and the branching policy.
//! - [`entity`] / [`nutrient`]: spawned resources and the nutrient table.
//! - [`field`]: world bounds and spawn placement.
//! - [`gauges`]: water and energy levels.
//! - [`schedule`]: deferred actions guarded by session generation.
//! - [`input`]: operator intent and steering resolution.
//! - [`collab`]: renderer and display interfaces.
//! - [`config`]: tunables and config loading.
//! - [`types`]: shared ids.

pub mod branch;
pub mod collab;
pub mod config;
pub mod entity;
pub mod field;
pub mod gauges;
pub mod input;
pub mod nutrient;
pub mod phases;
pub mod plant;
pub mod schedule;
pub mod session;
pub mod types;

pub use config::{ConfigError, GameConfig};
pub use session::{GameSession, SessionEvent};
