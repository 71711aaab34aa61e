//! Glitch post-process: settings, the pass plan they imply and the GPU pass
//! that applies them.

use crate::error::EngineError;
use crate::gfx::resources::TextureResource;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

pub const RGB_SHIFT: f32 = 0.003;
pub const BLOCKINESS: f32 = 64.0;

const PIPELINE_NAME: &str = "Glitch";

/// Distortion state read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessSettings {
    pub enabled: bool,
    /// Clamped to `0..=1`.
    pub amount: f32,
    pub time: f32,
    /// Fresh random value each frame.
    pub jitter: f32,
}

impl Default for PostProcessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            amount: 0.0,
            time: 0.0,
            jitter: 0.0,
        }
    }
}

/// Which passes a frame runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPlan {
    /// Scene straight to the surface.
    Direct,
    /// Scene to the offscreen target, then the glitch pass to the surface.
    Composite,
}

impl PostProcessSettings {
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
    }

    pub fn plan(&self) -> PassPlan {
        if self.enabled {
            PassPlan::Composite
        } else {
            PassPlan::Direct
        }
    }

    pub fn uniform(&self) -> GlitchUniform {
        GlitchUniform {
            time: self.time,
            amount: self.amount,
            rgb_shift: RGB_SHIFT,
            blockiness: BLOCKINESS,
            jitter: self.jitter,
            _padding: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlitchUniform {
    pub time: f32,
    pub amount: f32,
    pub rgb_shift: f32,
    pub blockiness: f32,
    pub jitter: f32,
    _padding: [f32; 3],
}

/// Full-screen pass sampling the offscreen scene target.
pub struct GlitchPass {
    layout: BindGroupLayoutWithDesc,
    uniform: UniformBuffer<GlitchUniform>,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlitchPass {
    pub fn new(device: &wgpu::Device, pipelines: &mut PipelineManager, format: wgpu::TextureFormat) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Glitch Layout");

        if let Err(e) = pipelines.load_shader("glitch", include_str!("glitch.wgsl")) {
            log::error!("Failed to load glitch shader: {}", e);
        }
        pipelines.register_pipeline(
            PIPELINE_NAME,
            PipelineConfig::default()
                .with_label("GLITCH")
                .with_shader("glitch")
                .with_bind_group_layouts(vec![layout.layout.clone()])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_cull_mode(None)
                .with_no_vertex_buffers(),
        );

        Self {
            layout,
            uniform: UniformBuffer::new(device),
            bind_group: None,
        }
    }

    /// Points the pass at a (re)created offscreen target.
    pub fn bind_source(&mut self, device: &wgpu::Device, source: &TextureResource) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.layout)
                .resource(self.uniform.binding_resource())
                .texture(&source.view)
                .sampler(&source.sampler)
                .create(device, "Glitch Bind Group"),
        );
    }

    pub fn update(&mut self, queue: &wgpu::Queue, settings: &PostProcessSettings) {
        self.uniform.update_content(queue, settings.uniform());
    }

    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &mut PipelineManager,
        target: &wgpu::TextureView,
    ) -> Result<(), EngineError> {
        let bind_group = self
            .bind_group
            .as_ref()
            .ok_or_else(|| EngineError::MissingPipeline("glitch source".to_owned()))?;
        let pipeline = pipelines
            .get_pipeline(PIPELINE_NAME)
            .ok_or_else(|| EngineError::MissingPipeline(PIPELINE_NAME.to_owned()))?;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Glitch Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    pub fn release(&mut self) {
        self.bind_group = None;
        self.uniform.destroy();
    }
}
