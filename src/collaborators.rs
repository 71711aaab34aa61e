//! Boundaries to the host: navigation, the overlay card and the frame
//! renderer. The engine only talks to these traits, so it runs without a GPU
//! or a window in tests.

use crate::artifact::Department;
use crate::error::EngineError;
use crate::gfx::camera::TunnelCamera;
use crate::gfx::rendering::PostProcessSettings;
use crate::gfx::scene::{ObjectId, Scene, SpriteInstance};

/// Receives the destination path once a selection completes.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Screen placement of the card describing the focused fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAnchor {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
    pub fragment: usize,
    pub department: &'static Department,
}

/// Told every tick where the overlay card belongs, or that it should hide.
pub trait OverlaySink {
    fn update(&mut self, anchor: Option<&OverlayAnchor>);
}

/// Everything a renderer needs to draw one frame.
pub struct FrameView<'a> {
    pub scene: &'a Scene,
    pub camera: &'a TunnelCamera,
    pub sprites: &'a [SpriteInstance],
    pub post: PostProcessSettings,
    /// Objects removed from the scene since the previous frame.
    pub released: &'a [ObjectId],
}

pub trait FrameRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError>;

    /// Drops every GPU resource the renderer owns. Safe to call twice.
    fn release(&mut self);
}

/// Navigator that only logs, for hosts without routing.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, path: &str) {
        log::info!("Navigate to {}", path);
    }
}
