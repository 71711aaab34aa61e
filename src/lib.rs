// src/lib.rs
//! Shardvault
//!
//! A real-time 3D tunnel scene built on wgpu and winit. The camera travels a
//! corridor of procedural rings toward a cube that shatters into eight
//! labelled fragments; selecting one flies the camera to it and navigates to
//! its department.
//!
//! [`engine::Engine`] holds all scene state and runs without a GPU;
//! [`ShardvaultApp`] hosts it in a window with the wgpu renderer and an ImGui
//! HUD.

pub mod animation;
pub mod app;
pub mod artifact;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod gfx;
pub mod interaction;
pub mod simulation;
pub mod ui;
pub mod wgpu_utils;

pub use app::ShardvaultApp;
