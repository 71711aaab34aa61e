use anyhow::Context;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::collaborators::{FrameRenderer, FrameView};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::gfx::rendering::RenderEngine;
use crate::interaction::InputKey;
use crate::ui::{draw_hud, shared_hud, HudChannel, RouteLog, SharedHud, UiManager};

const WINDOW_TITLE: &str = "shardvault";

/// Windowed host for the [`Engine`]: owns the event loop, the GPU renderer and
/// the ImGui overlay.
pub struct ShardvaultApp {
    config: EngineConfig,
}

struct AppState {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    engine: Option<Engine>,
    hud: SharedHud,
    cursor: (f32, f32),
    startup_error: Option<anyhow::Error>,
}

/// Lends the renderer and the UI to one engine frame.
struct SurfaceRenderer<'a> {
    render_engine: &'a mut RenderEngine,
    ui_manager: &'a mut UiManager,
    window: &'a Window,
    hud: &'a SharedHud,
}

impl FrameRenderer for SurfaceRenderer<'_> {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError> {
        let window = self.window;
        let model = self.hud.borrow().clone();
        let ui_manager = &mut *self.ui_manager;
        self.render_engine.render_frame(
            frame,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    let drawn = ui_manager.draw(device, queue, encoder, window, view, |ui| {
                        draw_hud(ui, &model)
                    });
                    if let Err(e) = drawn {
                        log::error!("HUD skipped: {}", e);
                    }
                },
            ),
        )
    }

    fn release(&mut self) {
        self.render_engine.release();
    }
}

impl ShardvaultApp {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Opens the window and runs until it is closed or Escape is pressed.
    pub fn run(self) -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("shardvault=info"))
            .try_init()
            .ok();

        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = AppState {
            config: self.config,
            window: None,
            render_engine: None,
            ui_manager: None,
            engine: None,
            hud: shared_hud(),
            cursor: (0.0, 0.0),
            startup_error: None,
        };
        event_loop
            .run_app(&mut state)
            .context("event loop terminated abnormally")?;

        match state.startup_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(winit::dpi::LogicalSize::new(1280, 800)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);
        let (width, height) = window.inner_size().into();

        let target = window.clone();
        let renderer = pollster::block_on(async move { RenderEngine::new(target, width, height).await })
            .context("failed to initialize the renderer")?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);

        let engine = Engine::init(
            self.config.clone(),
            (width, height),
            Box::new(RouteLog::new(self.hud.clone())),
            Box::new(HudChannel::new(self.hud.clone())),
        );

        self.window = Some(window);
        self.render_engine = Some(renderer);
        self.ui_manager = Some(ui_manager);
        self.engine = Some(engine);
        Ok(())
    }

    fn teardown(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.as_deref(),
        ) {
            (Some(render_engine), Some(ui_manager), Some(window)) => {
                let mut surface = SurfaceRenderer {
                    render_engine,
                    ui_manager,
                    window,
                    hud: &self.hud,
                };
                engine.teardown(Some(&mut surface));
            }
            _ => engine.teardown(None),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(render_engine), Some(ui_manager), Some(window)) = (
            self.engine.as_mut(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.as_deref(),
        ) else {
            return;
        };

        engine.set_text_focus(ui_manager.wants_text_input());
        {
            let mut hud = self.hud.borrow_mut();
            hud.help_visible = engine.help_visible();
            hud.distortion_enabled = engine.post().enabled;
        }

        let mut surface = SurfaceRenderer {
            render_engine,
            ui_manager,
            window,
            hud: &self.hud,
        };
        if let Err(e) = engine.frame(&mut surface) {
            log::error!("Rendering stopped: {}", e);
            engine.teardown(Some(&mut surface));
            event_loop.exit();
        }
    }

    fn keyboard(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;

        let key = match code {
            KeyCode::ArrowUp | KeyCode::KeyW => InputKey::Forward,
            KeyCode::ArrowDown | KeyCode::KeyS => InputKey::Backward,
            KeyCode::KeyH => InputKey::ToggleHelp,
            KeyCode::KeyG => InputKey::ToggleDistortion,
            KeyCode::Escape => {
                if pressed {
                    self.teardown();
                    event_loop.exit();
                }
                return;
            }
            _ => return,
        };

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let toggle = matches!(key, InputKey::ToggleHelp | InputKey::ToggleDistortion);
        if pressed && !(toggle && event.repeat) {
            engine.key_down(key);
        } else if !pressed {
            engine.key_up(key);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("Startup failed: {:#}", e);
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.keyboard(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if let Some(engine) = self.engine.as_mut() {
                    engine.pointer_move(self.cursor.0, self.cursor.1);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                let (x, y) = self.cursor;
                match state {
                    ElementState::Pressed => engine.pointer_down(x, y),
                    ElementState::Released => engine.pointer_up(x, y),
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.pointer_leave();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(width, height);
                }
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
