//! Global uniform bindings for camera, lights and the sprite atlas
//!
//! Group 0 of every scene pipeline: one uniform block with per-frame camera,
//! lighting and fog state, plus the atlas texture and its sampler.

use crate::{
    gfx::{
        camera::CameraUniform,
        scene::{Lighting, MAX_POINT_LIGHTS},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::texture_resource::TextureResource;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// xyz position, w range (`0` = unbounded).
    pub position_range: [f32; 4],
    /// rgb color, w intensity.
    pub color_intensity: [f32; 4],
}

/// MUST match `Globals` in the scene and sprite shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub camera: CameraUniform,
    /// rgb already scaled by intensity.
    pub ambient: [f32; 4],
    /// rgb sky color, w intensity.
    pub hemisphere_sky: [f32; 4],
    pub hemisphere_ground: [f32; 4],
    /// rgb fog color, w density.
    pub fog: [f32; 4],
    pub lights: [PointLightUniform; MAX_POINT_LIGHTS],
    /// x light count, y elapsed seconds.
    pub params: [f32; 4],
}

impl GlobalsUniform {
    pub fn new(camera: CameraUniform, lighting: &Lighting, time: f32) -> Self {
        let mut lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
        let mut count = 0;
        for (slot, light) in lights.iter_mut().zip(lighting.point_lights()) {
            *slot = PointLightUniform {
                position_range: [light.position.x, light.position.y, light.position.z, light.range],
                color_intensity: [light.color[0], light.color[1], light.color[2], light.intensity],
            };
            count += 1;
        }

        let (ambient_color, ambient_intensity) = lighting.ambient;
        Self {
            camera,
            ambient: [
                ambient_color[0] * ambient_intensity,
                ambient_color[1] * ambient_intensity,
                ambient_color[2] * ambient_intensity,
                1.0,
            ],
            hemisphere_sky: [
                lighting.hemisphere_sky[0],
                lighting.hemisphere_sky[1],
                lighting.hemisphere_sky[2],
                lighting.hemisphere_intensity,
            ],
            hemisphere_ground: [
                lighting.hemisphere_ground[0],
                lighting.hemisphere_ground[1],
                lighting.hemisphere_ground[2],
                0.0,
            ],
            fog: [
                lighting.fog.color[0],
                lighting.fog.color[1],
                lighting.fog.color[2],
                lighting.fog.density,
            ],
            lights,
            params: [count as f32, time, 0.0, 0.0],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalsUniform>;

/// Bind group layout and bind group for group 0.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// (Re)creates the bind group over the uniform buffer and atlas.
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating the bind group
    /// * `ubo` - The global uniform buffer to bind
    /// * `atlas` - Sprite atlas texture sampled by decals and sprites
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO, atlas: &TextureResource) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&atlas.view)
                .sampler(&atlas.sampler)
                .create(device, "Globals Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// `None` until [`create_bind_group`](Self::create_bind_group) ran.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    pub fn release(&mut self) {
        self.bind_group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::PointLight;
    use cgmath::Vector3;

    #[test]
    fn uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 112);
    }

    #[test]
    fn packs_lights_in_shader_order() {
        let mut lighting = Lighting::default();
        let globals = GlobalsUniform::new(CameraUniform::default(), &lighting, 1.5);
        assert_eq!(globals.params[0], 3.0);
        assert_eq!(globals.params[1], 1.5);
        assert_eq!(globals.lights[0].color_intensity, [0.0, 1.0, 1.0, 2.2]);

        lighting.core = Some(PointLight::new(0xffffff, 3.0, Vector3::new(0.0, 0.0, -94.0)).with_range(20.0));
        let globals = GlobalsUniform::new(CameraUniform::default(), &lighting, 0.0);
        assert_eq!(globals.params[0], 4.0);
        assert_eq!(globals.lights[3].position_range, [0.0, 0.0, -94.0, 20.0]);
    }
}
