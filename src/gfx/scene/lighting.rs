//! Scene-wide lighting and fog state consumed by the scene shader.

use cgmath::Vector3;

use super::object::rgb_hex;

/// Maximum point lights the shader evaluates.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light fades out completely. `0` means unbounded.
    pub range: f32,
}

impl PointLight {
    pub fn new(color: u32, intensity: f32, position: Vector3<f32>) -> Self {
        Self {
            position,
            color: rgb_hex(color),
            intensity,
            range: 0.0,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

/// Exponential-squared fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub density: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub background: [f32; 3],
    pub ambient: ([f32; 3], f32),
    pub hemisphere_sky: [f32; 3],
    pub hemisphere_ground: [f32; 3],
    pub hemisphere_intensity: f32,
    pub key: PointLight,
    pub fill: PointLight,
    pub rim: PointLight,
    /// Light inside the fragment group; present once the artifact shatters.
    pub core: Option<PointLight>,
    pub fog: Fog,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            background: rgb_hex(0x04060a),
            ambient: (rgb_hex(0xa0e8ff), 0.25),
            hemisphere_sky: rgb_hex(0x66ccff),
            hemisphere_ground: rgb_hex(0x1a0f2e),
            hemisphere_intensity: 0.35,
            key: PointLight::new(0x00ffff, 2.2, Vector3::new(5.0, 5.0, 5.0)),
            fill: PointLight::new(0xff00ff, 1.5, Vector3::new(-5.0, 2.0, 5.0)),
            rim: PointLight::new(0xffffff, 1.5, Vector3::new(0.0, 5.0, -10.0)),
            core: None,
            fog: Fog {
                color: rgb_hex(0x0a0f12),
                density: 0.018,
            },
        }
    }
}

impl Lighting {
    /// Active point lights in shader order.
    pub fn point_lights(&self) -> impl Iterator<Item = &PointLight> {
        [&self.key, &self.fill, &self.rim]
            .into_iter()
            .chain(self.core.as_ref())
            .take(MAX_POINT_LIGHTS)
    }
}
