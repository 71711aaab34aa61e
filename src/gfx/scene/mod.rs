//! # Scene Management Module
//!
//! The scene is an arena of [`SceneObject`]s addressed by [`ObjectId`], linked
//! into a strict parent/child tree. Each object carries a local [`Transform`],
//! an optional procedural [`MeshKind`], a [`Material`] and an [`ObjectTag`]
//! naming its role (ring, artifact, fragment, ...).
//!
//! ## Usage
//!
//! ```no_run
//! use shardvault::gfx::scene::{Material, MeshKind, ObjectTag, Scene, SceneObject};
//!
//! let mut scene = Scene::new();
//! let group = scene.add(SceneObject::group("shatteredCube").with_tag(ObjectTag::FragmentGroup));
//! let body = scene.add_child(
//!     group,
//!     SceneObject::mesh("fragment-0", MeshKind::Cube, Material::lit(0xff0000)),
//! );
//! let world = scene.world_position(body);
//! ```

pub mod lighting;
pub mod object;
pub mod scene;
pub mod vertex;

pub use lighting::{Fog, Lighting, PointLight, MAX_POINT_LIGHTS};
pub use object::{
    rgb_hex, BlendMode, Material, MeshKind, ObjectId, ObjectTag, SceneObject, Transform,
};
pub use scene::Scene;
pub use vertex::{SpriteInstance, Vertex3D};
