//! Scene objects: transform, material, mesh kind and semantic tag.

use cgmath::{Euler, Matrix4, One, Quaternion, Rad, Vector3};

use crate::gfx::geometry::{
    generate_annulus, generate_cube, generate_icosahedron, generate_octahedron, generate_quad,
    generate_sphere, generate_torus, GeometryData,
};

/// Stable handle of an object inside a [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Local transform relative to the parent object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Replaces the rotation with Euler angles in radians.
    pub fn set_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quaternion::from(Euler::new(Rad(x), Rad(y), Rad(z)));
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Alpha,
    Additive,
}

/// Converts a `0xRRGGBB` literal to linear-ish float RGB.
pub fn rgb_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Surface description consumed by the scene shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub blend: BlendMode,
    /// Unlit materials output `color * opacity` plus emissive, ignoring lights.
    pub lit: bool,
    pub wireframe: bool,
    /// Atlas cell sampled as a color mask.
    pub texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
            opacity: 1.0,
            blend: BlendMode::Opaque,
            lit: true,
            wireframe: false,
            texture: None,
        }
    }
}

impl Material {
    pub fn lit(color: u32) -> Self {
        Self {
            color: rgb_hex(color),
            ..Default::default()
        }
    }

    pub fn unlit(color: u32) -> Self {
        Self {
            color: rgb_hex(color),
            lit: false,
            ..Default::default()
        }
    }

    pub fn with_emissive(mut self, color: u32, intensity: f32) -> Self {
        self.emissive = rgb_hex(color);
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode, opacity: f32) -> Self {
        self.blend = blend;
        self.opacity = opacity;
        self
    }

    pub fn with_texture(mut self, cell: usize) -> Self {
        self.texture = Some(cell);
        self
    }

    pub fn with_wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }
}

/// Procedural meshes shared by every object of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    RingTorus,
    Sphere,
    Icosahedron,
    Octahedron,
    HaloAnnulus,
    Quad,
}

impl MeshKind {
    pub const ALL: [MeshKind; 7] = [
        MeshKind::Cube,
        MeshKind::RingTorus,
        MeshKind::Sphere,
        MeshKind::Icosahedron,
        MeshKind::Octahedron,
        MeshKind::HaloAnnulus,
        MeshKind::Quad,
    ];

    pub fn geometry(self) -> GeometryData {
        match self {
            MeshKind::Cube => generate_cube(),
            MeshKind::RingTorus => generate_torus(2.0, 0.1, 16, 100),
            MeshKind::Sphere => generate_sphere(16, 12),
            MeshKind::Icosahedron => generate_icosahedron(1.0),
            MeshKind::Octahedron => generate_octahedron(1.0),
            MeshKind::HaloAnnulus => generate_annulus(2.45, 2.7, 96),
            MeshKind::Quad => generate_quad(),
        }
    }

    /// Object-space bounds used for ray picking.
    pub fn local_bounds(self) -> (Vector3<f32>, Vector3<f32>) {
        match self {
            MeshKind::Cube => (Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5)),
            MeshKind::Quad => (Vector3::new(-0.5, -0.5, 0.0), Vector3::new(0.5, 0.5, 0.0)),
            other => {
                let (min, max) = other.geometry().bounds();
                (Vector3::from(min), Vector3::from(max))
            }
        }
    }
}

/// Semantic role of an object, used for lookups instead of name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectTag {
    #[default]
    Untagged,
    Ring(usize),
    Artifact,
    FragmentGroup,
    Fragment(usize),
    /// Glyph decal on a face of fragment `i`.
    FragmentDecal(usize),
    FragmentCore,
    Ornament,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    /// `None` for pure grouping nodes.
    pub mesh: Option<MeshKind>,
    pub material: Material,
    pub tag: ObjectTag,
    pub visible: bool,
    pub(super) parent: Option<ObjectId>,
    pub(super) children: Vec<ObjectId>,
}

impl SceneObject {
    /// Creates an empty grouping node.
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            transform: Transform::default(),
            mesh: None,
            material: Material::default(),
            tag: ObjectTag::Untagged,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: &str, mesh: MeshKind, material: Material) -> Self {
        Self {
            mesh: Some(mesh),
            material,
            ..Self::group(name)
        }
    }

    pub fn with_tag(mut self, tag: ObjectTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.transform.set_uniform_scale(scale);
        self
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}
