//! Semantic events raised by the engine and the input it understands.

use cgmath::Vector3;

use crate::artifact::Department;

/// Emitted by the engine, drained by the host with
/// [`Engine::drain_events`](crate::engine::Engine::drain_events).
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// The intact artifact was hit and replaced by fragments.
    Shattered,
    /// A fragment was clicked.
    CategorySelected {
        fragment: usize,
        department: &'static Department,
        world_position: Vector3<f32>,
    },
    HoverChanged {
        fragment: usize,
        department: &'static Department,
    },
    HoverCleared,
    /// A fly-to landed, or a direct link fired.
    TransitionComplete { path: String },
    HelpToggled { visible: bool },
    DistortionToggled { enabled: bool },
}

/// Keys with a meaning inside the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Arrow up or W.
    Forward,
    /// Arrow down or S.
    Backward,
    ToggleHelp,
    ToggleDistortion,
}
