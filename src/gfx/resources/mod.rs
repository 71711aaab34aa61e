//! GPU resource management
//!
//! Handles textures, procedural rasters, the sprite atlas and the global bind group.

pub mod atlas;
pub mod global_bindings;
pub mod raster;
pub mod texture_resource;

pub use atlas::{department_cell, SpriteAtlas};
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalsUniform};
pub use texture_resource::TextureResource;
