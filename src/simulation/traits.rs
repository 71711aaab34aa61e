//! Core animation traits
//!
//! Everything that moves on its own every frame (the tunnel, particle fields,
//! ornaments, lights) implements [`Animated`] and is advanced by the frame
//! scheduler in a fixed order.

use crate::gfx::scene::{Scene, SpriteInstance};

/// Timing for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, already clamped.
    pub dt: f32,
    /// Seconds since the engine started.
    pub elapsed: f32,
}

impl FrameTime {
    pub fn new(dt: f32, elapsed: f32) -> Self {
        Self { dt, elapsed }
    }
}

/// A self-driven part of the scene.
pub trait Animated {
    /// Name for logging.
    fn name(&self) -> &str;

    /// Advances the component by one tick.
    ///
    /// # Arguments
    /// * `time` - Frame delta and total elapsed time
    /// * `scene` - Scene holding any objects this component owns
    fn animate(&mut self, time: FrameTime, scene: &mut Scene);
}

/// A component that draws billboard sprites.
pub trait SpriteEmitter {
    /// Appends this tick's sprite instances to `out`.
    fn emit_sprites(&self, out: &mut Vec<SpriteInstance>);
}
