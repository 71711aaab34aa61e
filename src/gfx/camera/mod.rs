pub mod camera_controller;
pub mod camera_utils;
pub mod tunnel_camera;

pub use camera_controller::{CameraController, MoveKey, FLIGHT_STANDOFF};
pub use camera_utils::{Camera, CameraUniform};
pub use tunnel_camera::TunnelCamera;
