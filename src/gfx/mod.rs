//! # Graphics Module
//!
//! Everything between the engine's scene state and the screen.
//!
//! - **Camera** ([`camera`]) - the tunnel camera, its key/follow controller and fly-to flights
//! - **Geometry** ([`geometry`]) - procedural meshes; there are no model files
//! - **Picking** ([`picking`]) - pointer rays and mesh-bounds hit tests
//! - **Rendering** ([`rendering`]) - pipelines, draw ordering and the glitch post-process
//! - **Resources** ([`resources`]) - procedural rasters, the sprite atlas and global bindings
//! - **Scene** ([`scene`]) - the object arena with parent/child transforms and tags
//!
//! Only [`rendering`] and parts of [`resources`] touch the GPU. The rest is
//! plain data and runs in tests without a device.

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::TunnelCamera;
pub use rendering::RenderEngine;
