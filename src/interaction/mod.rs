//! Pointer and keyboard interaction: gesture tracking and the semantic events
//! the engine raises from it.

pub mod events;
pub mod gesture;

pub use events::{InputKey, SceneEvent};
pub use gesture::{Gesture, GestureState, GestureTracker};
