//! WGPU rendering engine
//!
//! Draws a [`FrameView`] in one scene pass (opaque meshes, wireframes,
//! blended meshes sorted back to front, then particle sprites) into either the
//! surface or an offscreen target, and runs the glitch pass over the offscreen
//! target when distortion is enabled. The UI overlay is recorded last.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use cgmath::{InnerSpace, Matrix4, Vector3};
use wgpu::util::DeviceExt;
use wgpu::TextureFormat;

use crate::collaborators::FrameView;
use crate::error::EngineError;
use crate::gfx::resources::{GlobalBindings, GlobalUBO, GlobalsUniform, SpriteAtlas, TextureResource};
use crate::gfx::scene::{BlendMode, Material, MeshKind, ObjectId, Scene, SpriteInstance};
use crate::wgpu_utils::{binding_types, ArrayBuffer, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer};

use super::pipeline_manager::{PipelineConfig, PipelineManager, VertexInput};
use super::post_process::{GlitchPass, PassPlan};

const OPAQUE_PIPELINE: &str = "Scene Opaque";
const WIRE_PIPELINE: &str = "Scene Wire";
const ALPHA_PIPELINE: &str = "Scene Alpha";
const ADDITIVE_PIPELINE: &str = "Scene Additive";
const SPRITE_PIPELINE: &str = "Sprites";

const INITIAL_SPRITE_CAPACITY: usize = 1024;

/// Per-object data for group 1 of the scene shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb, opacity
    pub color: [f32; 4],
    /// rgb, intensity
    pub emissive: [f32; 4],
    pub uv_rect: [f32; 4],
    /// x lit, y textured
    pub flags: [f32; 4],
}

impl ObjectUniform {
    pub fn from_object(world: Matrix4<f32>, material: &Material) -> Self {
        let uv_rect = material
            .texture
            .map(SpriteAtlas::uv_rect)
            .unwrap_or([0.0, 0.0, 1.0, 1.0]);
        let flag = |on: bool| if on { 1.0 } else { 0.0 };

        Self {
            model: world.into(),
            color: [material.color[0], material.color[1], material.color[2], material.opacity],
            emissive: [
                material.emissive[0],
                material.emissive[1],
                material.emissive[2],
                material.emissive_intensity,
            ],
            uv_rect,
            flags: [flag(material.lit), flag(material.texture.is_some()), 0.0, 0.0],
        }
    }
}

/// Visible mesh objects split by the pipeline that draws them.
#[derive(Debug, Default, PartialEq)]
pub struct DrawList {
    pub opaque: Vec<ObjectId>,
    pub wire: Vec<ObjectId>,
    /// Farthest first.
    pub blended: Vec<(ObjectId, BlendMode)>,
}

impl DrawList {
    pub fn classify(scene: &Scene, eye: Vector3<f32>) -> Self {
        let mut list = DrawList::default();
        let mut blended: Vec<(ObjectId, BlendMode, f32)> = Vec::new();

        for (id, object) in scene.iter() {
            if object.mesh.is_none() || !scene.is_visible(id) {
                continue;
            }
            let material = &object.material;
            if material.wireframe {
                list.wire.push(id);
            } else if material.blend == BlendMode::Opaque {
                list.opaque.push(id);
            } else {
                let distance = (scene.world_position(id) - eye).magnitude2();
                blended.push((id, material.blend, distance));
            }
        }

        blended.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        list.blended = blended.into_iter().map(|(id, blend, _)| (id, blend)).collect();
        list
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, kind: MeshKind) -> Self {
        let geometry = kind.geometry();
        let (vertices, indices) = geometry.to_scene_format();
        let edges = geometry.edge_indices();
        let label = format!("{:?}", kind);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Edge Buffer", label)),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            edge_buffer,
            edge_count: edges.len() as u32,
        }
    }

    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.edge_buffer.destroy();
    }
}

struct ObjectGpu {
    mesh: MeshKind,
    ubo: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    scene_target: TextureResource,
    atlas_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    meshes: HashMap<MeshKind, GpuMesh>,
    objects: HashMap<ObjectId, ObjectGpu>,
    sprites: ArrayBuffer<SpriteInstance>,
    glitch: GlitchPass,
    released: bool,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, EngineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, config.width, config.height, "depth_texture");
        let scene_target =
            TextureResource::create_render_target(&device, config.width, config.height, format, "scene_target");

        let atlas = SpriteAtlas::build();
        if !atlas.degraded_cells().is_empty() {
            log::warn!("Atlas cells {:?} fell back to blank", atlas.degraded_cells());
        }
        let atlas_texture = TextureResource::create_from_rgba_data_with_filter(
            &device,
            &queue,
            atlas.rgba(),
            atlas.width(),
            atlas.height(),
            "sprite_atlas",
            wgpu::FilterMode::Linear,
        );

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo, &atlas_texture);

        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Object Bind Group Layout");

        let mut pipeline_manager = PipelineManager::new(device.clone());
        if let Err(e) = pipeline_manager.load_shader("scene", include_str!("scene.wgsl")) {
            log::error!("Failed to load scene shader: {}", e);
        }
        if let Err(e) = pipeline_manager.load_shader("sprite", include_str!("sprite.wgsl")) {
            log::error!("Failed to load sprite shader: {}", e);
        }

        let scene_layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_layout.layout.clone(),
        ];
        let depth = TextureResource::DEPTH_FORMAT;

        pipeline_manager.register_pipeline(
            OPAQUE_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE OPAQUE")
                .with_shader("scene")
                .with_bind_group_layouts(scene_layouts.clone())
                .with_depth_stencil(depth, true)
                .with_blend_mode(format, BlendMode::Opaque),
        );
        pipeline_manager.register_pipeline(
            WIRE_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE WIRE")
                .with_shader("scene")
                .with_bind_group_layouts(scene_layouts.clone())
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_depth_stencil(depth, false)
                .with_blend_mode(format, BlendMode::Alpha),
        );
        pipeline_manager.register_pipeline(
            ALPHA_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE ALPHA")
                .with_shader("scene")
                .with_bind_group_layouts(scene_layouts.clone())
                .with_cull_mode(None)
                .with_depth_stencil(depth, false)
                .with_blend_mode(format, BlendMode::Alpha),
        );
        pipeline_manager.register_pipeline(
            ADDITIVE_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE ADDITIVE")
                .with_shader("scene")
                .with_bind_group_layouts(scene_layouts)
                .with_cull_mode(None)
                .with_depth_stencil(depth, false)
                .with_blend_mode(format, BlendMode::Additive),
        );
        pipeline_manager.register_pipeline(
            SPRITE_PIPELINE,
            PipelineConfig::default()
                .with_label("SPRITES")
                .with_shader("sprite")
                .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()])
                .with_vertex_input(VertexInput::Sprites)
                .with_cull_mode(None)
                .with_depth_stencil(depth, false)
                .with_blend_mode(format, BlendMode::Additive),
        );

        let mut glitch = GlitchPass::new(&device, &mut pipeline_manager, format);
        glitch.bind_source(&device, &scene_target);

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        let meshes = MeshKind::ALL
            .iter()
            .map(|&kind| (kind, GpuMesh::upload(&device, kind)))
            .collect();

        let sprites = ArrayBuffer::new(&device, INITIAL_SPRITE_CAPACITY);

        log::info!(
            "Render engine ready: {}x{} {:?}",
            config.width,
            config.height,
            format
        );

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            format,
            depth_texture,
            scene_target,
            atlas_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_layout,
            meshes,
            objects: HashMap::new(),
            sprites,
            glitch,
            released: false,
        })
    }

    /// Renders one frame, then lets `ui_callback` record on top of the surface.
    ///
    /// Lost or outdated surfaces are reconfigured and the frame is skipped.
    pub fn render_frame<F>(&mut self, frame: &FrameView<'_>, ui_callback: Option<F>) -> Result<(), EngineError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        if self.released {
            return Ok(());
        }

        self.forget_objects(frame.released);

        let globals = GlobalsUniform::new(frame.camera.uniform, &frame.scene.lighting, frame.post.time);
        self.global_ubo.update_content(&self.queue, globals);
        self.sync_objects(frame.scene);
        self.sprites.write(&self.device, &self.queue, frame.sprites);
        self.glitch.update(&self.queue, &frame.post);

        let draw_list = DrawList::classify(frame.scene, frame.camera.position);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let plan = frame.post.plan();
        let scene_view = match plan {
            PassPlan::Composite => &self.scene_target.view,
            PassPlan::Direct => &surface_view,
        };
        let background = frame.scene.lighting.background;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background[0] as f64,
                            g: background[1] as f64,
                            b: background[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let globals_group = self
                .global_bindings
                .bind_group()
                .ok_or_else(|| EngineError::MissingPipeline("globals".to_owned()))?;
            render_pass.set_bind_group(0, globals_group, &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(OPAQUE_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for id in &draw_list.opaque {
                    draw_object(&mut render_pass, &self.meshes, &self.objects, *id, false);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(WIRE_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for id in &draw_list.wire {
                    draw_object(&mut render_pass, &self.meshes, &self.objects, *id, true);
                }
            }

            let mut bound: Option<BlendMode> = None;
            for (id, blend) in &draw_list.blended {
                if bound != Some(*blend) {
                    let name = match blend {
                        BlendMode::Additive => ADDITIVE_PIPELINE,
                        _ => ALPHA_PIPELINE,
                    };
                    let Some(pipeline) = self.pipeline_manager.get_pipeline(name) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    bound = Some(*blend);
                }
                draw_object(&mut render_pass, &self.meshes, &self.objects, *id, false);
            }

            if !self.sprites.is_empty() {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline(SPRITE_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_vertex_buffer(0, self.sprites.slice());
                    render_pass.draw(0..6, 0..self.sprites.len() as u32);
                }
            }
        }

        if plan == PassPlan::Composite {
            self.glitch
                .draw(&mut encoder, &mut self.pipeline_manager, &surface_view)?;
        }

        if let Some(callback) = ui_callback {
            callback(&self.device, &self.queue, &mut encoder, &surface_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Writes per-object uniforms, creating GPU state for new objects.
    fn sync_objects(&mut self, scene: &Scene) {
        for (id, object) in scene.iter() {
            let Some(mesh) = object.mesh else {
                continue;
            };
            let uniform = ObjectUniform::from_object(scene.world_matrix(id), &object.material);

            if let Some(gpu) = self.objects.get_mut(&id) {
                gpu.mesh = mesh;
                gpu.ubo.update_content(&self.queue, uniform);
                continue;
            }

            let ubo = UniformBuffer::new_with_data(&self.device, &uniform);
            let bind_group = BindGroupBuilder::new(&self.object_layout)
                .resource(ubo.binding_resource())
                .create(&self.device, &format!("{} Bind Group", object.name));
            self.objects.insert(id, ObjectGpu { mesh, ubo, bind_group });
        }
    }

    fn forget_objects(&mut self, released: &[ObjectId]) {
        for id in released {
            if let Some(gpu) = self.objects.remove(id) {
                gpu.ubo.destroy();
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        if self.released {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture.destroy();
        self.depth_texture = TextureResource::create_depth_texture(&self.device, width, height, "depth_texture");
        self.scene_target.destroy();
        self.scene_target =
            TextureResource::create_render_target(&self.device, width, height, self.format, "scene_target");
        self.glitch.bind_source(&self.device, &self.scene_target);
    }

    /// Destroys every GPU resource this engine created. Safe to call twice.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for (_, gpu) in self.objects.drain() {
            gpu.ubo.destroy();
        }
        for (_, mesh) in self.meshes.drain() {
            mesh.destroy();
        }
        self.sprites.destroy();
        self.glitch.release();
        self.global_bindings.release();
        self.global_ubo.destroy();
        self.pipeline_manager.release();
        self.depth_texture.destroy();
        self.scene_target.destroy();
        self.atlas_texture.destroy();
        log::info!("Render engine released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn draw_object(
    render_pass: &mut wgpu::RenderPass<'_>,
    meshes: &HashMap<MeshKind, GpuMesh>,
    objects: &HashMap<ObjectId, ObjectGpu>,
    id: ObjectId,
    edges: bool,
) {
    let Some(gpu) = objects.get(&id) else {
        return;
    };
    let Some(mesh) = meshes.get(&gpu.mesh) else {
        return;
    };

    render_pass.set_bind_group(1, &gpu.bind_group, &[]);
    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    if edges {
        render_pass.set_index_buffer(mesh.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.edge_count, 0, 0..1);
    } else {
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{rgb_hex, SceneObject};

    #[test]
    fn object_uniform_packs_material() {
        let material = Material::unlit(0xff0000)
            .with_emissive(0x00ff00, 0.4)
            .with_blend(BlendMode::Additive, 0.95)
            .with_texture(4);
        let uniform = ObjectUniform::from_object(Matrix4::from_scale(2.0), &material);

        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 0.95]);
        assert_eq!(uniform.emissive, [0.0, 1.0, 0.0, 0.4]);
        assert_eq!(uniform.flags, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.uv_rect, SpriteAtlas::uv_rect(4));
        assert_eq!(uniform.model[0][0], 2.0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
    }

    #[test]
    fn untextured_lit_material_uses_full_uv() {
        let uniform = ObjectUniform::from_object(Matrix4::from_scale(1.0), &Material::lit(0x00ffff));
        assert_eq!(uniform.uv_rect, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(uniform.flags[0], 1.0);
        assert_eq!(&uniform.color[..3], &rgb_hex(0x00ffff)[..]);
    }

    #[test]
    fn draw_list_sorts_blended_far_to_near_and_skips_hidden() {
        let mut scene = Scene::new();
        let solid = scene.add(SceneObject::mesh("solid", MeshKind::Cube, Material::lit(0xffffff)));
        let wire = scene.add(SceneObject::mesh(
            "wire",
            MeshKind::Octahedron,
            Material::unlit(0xffffff).with_wireframe(),
        ));
        let near = scene.add(
            SceneObject::mesh(
                "near",
                MeshKind::Quad,
                Material::unlit(0xffffff).with_blend(BlendMode::Additive, 1.0),
            )
            .with_position(Vector3::new(0.0, 0.0, 2.0)),
        );
        let far = scene.add(
            SceneObject::mesh(
                "far",
                MeshKind::Quad,
                Material::unlit(0xffffff).with_blend(BlendMode::Alpha, 0.5),
            )
            .with_position(Vector3::new(0.0, 0.0, -40.0)),
        );
        let hidden = scene.add(SceneObject::mesh("hidden", MeshKind::Cube, Material::lit(0xffffff)));
        if let Some(object) = scene.get_mut(hidden) {
            object.visible = false;
        }
        scene.add(SceneObject::group("group"));

        let list = DrawList::classify(&scene, Vector3::new(0.0, 0.0, 6.0));
        assert_eq!(list.opaque, vec![solid]);
        assert_eq!(list.wire, vec![wire]);
        assert_eq!(
            list.blended,
            vec![(far, BlendMode::Alpha), (near, BlendMode::Additive)]
        );
    }
}
