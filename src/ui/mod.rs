//! # User Interface Module
//!
//! Dear ImGui overlay drawn after the scene and the glitch pass.
//!
//! - [`UiManager`] - ImGui context, winit input glue and the wgpu renderer
//! - [`hud`] - the fragment card, help window and status line, fed by the
//!   engine through [`HudChannel`] and [`RouteLog`]

pub mod hud;
pub mod manager;

pub use hud::{draw_hud, shared_hud, HudChannel, HudModel, RouteLog, SharedHud};
pub use manager::UiManager;
