//! # Engine
//!
//! The one context object that owns the scene and everything that animates
//! it. The host feeds it input and calls [`Engine::frame`] once per redraw; the
//! engine advances all components in a fixed order and hands the result to a
//! [`FrameRenderer`].
//!
//! Tick order:
//!
//! 1. timeline samples and completion events
//! 2. camera follow (suspended during a flight)
//! 3. tunnel rings
//! 4. artifact emissive (while intact) and fragment cosmetics
//! 5. particle fields, beacon and lights
//! 6. post-process time and jitter
//! 7. overlay anchor
//! 8. render
//!
//! ## Usage
//!
//! ```no_run
//! use shardvault::collaborators::{LogNavigator, OverlayAnchor, OverlaySink};
//! use shardvault::config::EngineConfig;
//! use shardvault::engine::Engine;
//!
//! struct NoOverlay;
//! impl OverlaySink for NoOverlay {
//!     fn update(&mut self, _anchor: Option<&OverlayAnchor>) {}
//! }
//!
//! let mut engine = Engine::init(
//!     EngineConfig::default().with_seed(1),
//!     (1280, 720),
//!     Box::new(LogNavigator),
//!     Box::new(NoOverlay),
//! );
//! engine.pointer_down(640.0, 360.0);
//! engine.pointer_up(640.0, 360.0);
//! ```

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::animation::{Easing, Timeline, Tween, TweenEvent, TweenValue};
use crate::artifact::shatter::FRAGMENT_EDGE;
use crate::artifact::{Artifact, ArtifactState, Fragment, REST_EMISSIVE};
use crate::collaborators::{FrameRenderer, FrameView, Navigator, OverlayAnchor, OverlaySink};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::frame::FrameScheduler;
use crate::gfx::camera::{CameraController, MoveKey, TunnelCamera};
use crate::gfx::picking::ObjectPicker;
use crate::gfx::rendering::PostProcessSettings;
use crate::gfx::scene::{Scene, SpriteInstance};
use crate::interaction::{Gesture, GestureTracker, InputKey, SceneEvent};
use crate::simulation::{Animated, EmberField, FrameTime, Godhead, LightRig, SpriteEmitter, Starfield, Tunnel};

/// Distortion while the camera is in flight.
const FLIGHT_DISTORTION: f32 = 0.45;
const HOVER_EMISSIVE: f32 = 1.2;
const HOVER_IN_SECONDS: f32 = 0.2;
const HOVER_OUT_SECONDS: f32 = 0.3;
/// Overlay anchor height above a fragment center, in fragment edges.
const OVERLAY_LIFT: f32 = 0.85;

pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    camera: TunnelCamera,
    controller: CameraController,
    timeline: Timeline,
    picker: ObjectPicker,
    gestures: GestureTracker,
    tunnel: Tunnel,
    artifact: Artifact,
    starfield: Starfield,
    embers: EmberField,
    godhead: Godhead,
    lights: LightRig,
    post: PostProcessSettings,
    scheduler: FrameScheduler,
    rng: StdRng,
    viewport: (u32, u32),
    sprites: Vec<SpriteInstance>,
    hovered: Option<usize>,
    selected: Option<usize>,
    help_visible: bool,
    text_focus: bool,
    torn_down: bool,
    click_hit_tests: usize,
    events: Vec<SceneEvent>,
    navigator: Box<dyn Navigator>,
    overlay: Box<dyn OverlaySink>,
}

impl Engine {
    /// Builds the whole scene for a `width` x `height` viewport.
    pub fn init(
        config: EngineConfig,
        viewport: (u32, u32),
        navigator: Box<dyn Navigator>,
        overlay: Box<dyn OverlaySink>,
    ) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut scene = Scene::new();

        let tunnel = Tunnel::build(&mut scene, config.ring_count, config.ring_spacing, seed);
        let artifact = Artifact::build(&mut scene, config.artifact_z(), seed.wrapping_add(1));
        let godhead = Godhead::build(&mut scene);
        let lights = LightRig::install(&mut scene);
        let starfield = Starfield::new(config.starfield.clone(), seed.wrapping_add(2));
        let embers = EmberField::new(config.embers.clone(), seed.wrapping_add(3));

        let (width, height) = (viewport.0.max(1), viewport.1.max(1));
        let mut camera = TunnelCamera::new(
            Vector3::new(0.0, 0.0, config.camera_max_z),
            width as f32 / height as f32,
        );
        camera.update_view_proj();

        let controller = CameraController::new(
            config.key_speed,
            config.follow_ease,
            config.camera_min_z(),
            config.camera_max_z,
            config.camera_max_z,
        )
        .with_flight_seconds(config.flight_seconds);

        let mut post = PostProcessSettings {
            enabled: config.distortion_enabled,
            ..Default::default()
        };
        post.set_amount(config.distortion_amount);

        log::info!(
            "Engine initialised: {} rings, {} stars, {} embers, seed {}",
            tunnel.len(),
            starfield.len(),
            embers.len(),
            seed
        );
        let animated: [&dyn Animated; 5] = [&tunnel, &starfield, &embers, &godhead, &lights];
        for component in animated {
            log::debug!("Animating {}", component.name());
        }

        Self {
            gestures: GestureTracker::new(config.drag_threshold),
            scheduler: FrameScheduler::new(config.max_frame_dt),
            rng: StdRng::seed_from_u64(seed.wrapping_add(4)),
            config,
            scene,
            camera,
            controller,
            timeline: Timeline::new(),
            picker: ObjectPicker::new(),
            tunnel,
            artifact,
            starfield,
            embers,
            godhead,
            lights,
            post,
            viewport: (width, height),
            sprites: Vec::new(),
            hovered: None,
            selected: None,
            help_visible: false,
            text_focus: false,
            torn_down: false,
            click_hit_tests: 0,
            events: Vec::new(),
            navigator,
            overlay,
        }
    }

    /// Updates camera aspect and the picking viewport together.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Skipping resize to {}x{}", width, height);
            return;
        }
        self.viewport = (width, height);
        self.camera.resize_projection(width, height);
        self.camera.update_view_proj();
    }

    fn viewport_f32(&self) -> (f32, f32) {
        (self.viewport.0 as f32, self.viewport.1 as f32)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.torn_down {
            return;
        }
        self.gestures.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.torn_down {
            return;
        }
        match self.gestures.pointer_move(x, y) {
            Gesture::Drag { dx, dy } => self.artifact.rotate_by_drag(&mut self.scene, dx, dy),
            Gesture::Hover { x, y } => self.hover(x, y),
            Gesture::None | Gesture::Click { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        if self.torn_down {
            return;
        }
        if let Gesture::Click { x, y } = self.gestures.pointer_up(x, y) {
            self.click(x, y);
        }
    }

    /// Pointer left the viewport: drop any gesture and the hover.
    pub fn pointer_leave(&mut self) {
        if self.torn_down {
            return;
        }
        self.gestures.cancel();
        if let Some(previous) = self.hovered.take() {
            self.fade_hover(previous, HOVER_OUT_SECONDS, REST_EMISSIVE);
            self.events.push(SceneEvent::HoverCleared);
        }
    }

    pub fn key_down(&mut self, key: InputKey) {
        if self.torn_down {
            return;
        }
        match key {
            InputKey::Forward => self.controller.set_key(MoveKey::Forward, true),
            InputKey::Backward => self.controller.set_key(MoveKey::Backward, true),
            InputKey::ToggleHelp => {
                if self.text_focus {
                    return;
                }
                self.help_visible = !self.help_visible;
                self.events.push(SceneEvent::HelpToggled {
                    visible: self.help_visible,
                });
            }
            InputKey::ToggleDistortion => {
                if self.text_focus {
                    return;
                }
                self.post.enabled = !self.post.enabled;
                log::info!("Distortion {}", if self.post.enabled { "on" } else { "off" });
                self.events.push(SceneEvent::DistortionToggled {
                    enabled: self.post.enabled,
                });
            }
        }
    }

    pub fn key_up(&mut self, key: InputKey) {
        if self.torn_down {
            return;
        }
        match key {
            InputKey::Forward => self.controller.set_key(MoveKey::Forward, false),
            InputKey::Backward => self.controller.set_key(MoveKey::Backward, false),
            InputKey::ToggleHelp | InputKey::ToggleDistortion => {}
        }
    }

    /// While set, the help and distortion toggles are ignored.
    pub fn set_text_focus(&mut self, focused: bool) {
        self.text_focus = focused;
    }

    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.post.enabled = enabled;
    }

    pub fn set_distortion_amount(&mut self, amount: f32) {
        self.post.set_amount(amount);
    }

    pub fn set_help_visible(&mut self, visible: bool) {
        self.help_visible = visible;
    }

    fn click(&mut self, x: f32, y: f32) {
        self.click_hit_tests += 1;
        let viewport = self.viewport_f32();
        let ray = self.picker.screen_to_ray((x, y), viewport, &self.camera);

        if self.artifact.has_fragments() {
            let bodies = self.artifact.fragment_bodies();
            let hits = self.picker.intersect_all(&self.scene, &bodies, &ray);
            let chosen = self
                .picker
                .closest_on_screen(&self.scene, &hits, (x, y), viewport, &self.camera)
                .and_then(|hit| self.artifact.fragment_for_object(&self.scene, hit.id));
            if let Some(index) = chosen {
                self.select_fragment(index);
            }
        } else if let Some(cube) = self.artifact.cube() {
            if self.picker.intersect(&self.scene, cube, &ray).is_some() {
                self.shatter();
            }
        }
    }

    fn shatter(&mut self) {
        if self
            .artifact
            .shatter(&mut self.scene, &mut self.timeline, &self.config.direct_links)
        {
            self.events.push(SceneEvent::Shattered);
        }
    }

    /// Activates fragment `index` as if it had been clicked.
    ///
    /// Fragments with a direct link navigate at once; the rest start a camera
    /// flight that navigates when it lands. A new selection supersedes a
    /// flight in progress.
    pub fn select_fragment(&mut self, index: usize) {
        if self.torn_down {
            return;
        }
        let Some(fragment) = self.artifact.fragment(index) else {
            return;
        };
        let department = fragment.department;
        let direct_link = fragment.direct_link.clone();
        let world_position = self
            .artifact
            .fragment_world_position(&self.scene, index)
            .unwrap_or_else(|| self.artifact.position());

        self.selected = Some(index);
        self.events.push(SceneEvent::CategorySelected {
            fragment: index,
            department,
            world_position,
        });
        log::info!("Selected {} ({})", department.title, department.code);

        if let Some(path) = direct_link {
            if self.controller.abort_flight(&self.camera, &mut self.timeline) {
                self.post.set_amount(self.config.distortion_amount);
            }
            self.selected = None;
            self.navigator.navigate(&path);
            self.events.push(SceneEvent::TransitionComplete { path });
            return;
        }

        self.controller
            .fly_to(&self.camera, &mut self.timeline, world_position, department.path);
        self.post.set_amount(FLIGHT_DISTORTION);
    }

    fn hover(&mut self, x: f32, y: f32) {
        let target = if self.artifact.has_fragments() {
            let viewport = self.viewport_f32();
            let ray = self.picker.screen_to_ray((x, y), viewport, &self.camera);
            let bodies = self.artifact.fragment_bodies();
            let hits = self.picker.intersect_all(&self.scene, &bodies, &ray);
            self.picker
                .closest_on_screen(&self.scene, &hits, (x, y), viewport, &self.camera)
                .and_then(|hit| self.artifact.fragment_for_object(&self.scene, hit.id))
        } else {
            None
        };

        match (self.hovered, target) {
            (previous, Some(index)) if previous != Some(index) => {
                if let Some(previous) = previous {
                    self.fade_hover(previous, HOVER_OUT_SECONDS, REST_EMISSIVE);
                }
                self.fade_hover(index, HOVER_IN_SECONDS, HOVER_EMISSIVE);
                self.hovered = Some(index);
                if let Some(fragment) = self.artifact.fragment(index) {
                    log::debug!("Hover {}", fragment.department.code);
                    self.events.push(SceneEvent::HoverChanged {
                        fragment: index,
                        department: fragment.department,
                    });
                }
            }
            (Some(previous), None) => {
                self.fade_hover(previous, HOVER_OUT_SECONDS, REST_EMISSIVE);
                self.hovered = None;
                log::debug!("Hover cleared");
                self.events.push(SceneEvent::HoverCleared);
            }
            _ => {}
        }
    }

    fn fade_hover(&mut self, index: usize, seconds: f32, level: f32) {
        let Some(fragment) = self.artifact.fragment(index) else {
            return;
        };
        self.timeline.start(
            Tween::new(
                Fragment::emissive_key(index),
                TweenValue::Scalar(fragment.emissive_level),
                TweenValue::Scalar(level),
                seconds,
            )
            .with_easing(Easing::Power2Out),
        );
    }

    /// Reads the monotonic clock and runs one tick.
    pub fn frame(&mut self, renderer: &mut dyn FrameRenderer) -> Result<(), EngineError> {
        let Some(time) = self.scheduler.next() else {
            return Ok(());
        };
        self.step(time);
        self.render(renderer)
    }

    /// Runs one tick with an externally measured delta.
    pub fn tick(&mut self, dt: f32, renderer: &mut dyn FrameRenderer) -> Result<(), EngineError> {
        let Some(time) = self.scheduler.advance(dt) else {
            return Ok(());
        };
        self.step(time);
        self.render(renderer)
    }

    fn step(&mut self, time: FrameTime) {
        let step = self.timeline.advance(time.dt);
        for (key, value) in step.samples {
            if CameraController::is_flight_key(key) {
                if let Some(position) = value.as_vec3() {
                    self.controller.apply_flight_sample(&mut self.camera, position);
                }
            } else {
                self.artifact.apply_sample(key, value);
            }
        }
        for event in step.completed {
            match event {
                TweenEvent::FragmentLaunched(_) => self.artifact.on_event(event),
                TweenEvent::FlightLanded(ticket) => self.land_flight(ticket),
            }
        }

        self.controller.follow(&mut self.camera, time.dt);

        self.tunnel.animate(time, &mut self.scene);

        if self.artifact.state() == ArtifactState::Intact {
            self.artifact
                .update_emissive(&mut self.scene, self.camera.position.z, self.config.camera_max_z);
        }
        self.artifact.update_fragments(&mut self.scene, time);

        self.starfield.animate(time, &mut self.scene);
        self.embers.animate(time, &mut self.scene);
        self.godhead.animate(time, &mut self.scene);
        self.lights.animate(time, &mut self.scene);
        self.sprites.clear();
        self.starfield.emit_sprites(&mut self.sprites);
        self.embers.emit_sprites(&mut self.sprites);
        self.godhead.emit_sprites(&mut self.sprites);

        self.post.time = time.elapsed;
        self.post.jitter = self.rng.random::<f32>();

        self.camera.update_view_proj();
        let anchor = self.overlay_anchor();
        self.overlay.update(anchor.as_ref());
    }

    fn land_flight(&mut self, ticket: u64) {
        let Some(path) = self.controller.finish_flight(&self.camera, ticket) else {
            return;
        };
        self.post.set_amount(self.config.distortion_amount);
        self.selected = None;
        log::info!("Flight landed, navigating to {}", path);
        self.navigator.navigate(&path);
        self.events.push(SceneEvent::TransitionComplete { path });
    }

    /// Screen anchor for the selected fragment, else the hovered one.
    fn overlay_anchor(&self) -> Option<OverlayAnchor> {
        let index = self.selected.or(self.hovered)?;
        let fragment = self.artifact.fragment(index)?;
        let center = self.artifact.fragment_world_position(&self.scene, index)?;
        let lifted = center + Vector3::new(0.0, OVERLAY_LIFT * FRAGMENT_EDGE, 0.0);
        let (x, y) = self.camera.project_to_screen(lifted, self.viewport_f32())?;
        Some(OverlayAnchor {
            x,
            y,
            fragment: index,
            department: fragment.department,
        })
    }

    fn render(&mut self, renderer: &mut dyn FrameRenderer) -> Result<(), EngineError> {
        let released = self.scene.take_released();
        renderer.render(&FrameView {
            scene: &self.scene,
            camera: &self.camera,
            sprites: &self.sprites,
            post: self.post,
            released: &released,
        })
    }

    /// Stops ticking, ignores further input, cancels every tween and releases
    /// the scene and the renderer's GPU resources. Safe to call repeatedly.
    pub fn teardown(&mut self, renderer: Option<&mut dyn FrameRenderer>) {
        if let Some(renderer) = renderer {
            renderer.release();
        }
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.scheduler.stop();
        self.controller.abort_flight(&self.camera, &mut self.timeline);
        self.timeline.clear();
        self.gestures.cancel();
        self.controller.release_keys();
        self.hovered = None;
        self.selected = None;
        self.sprites.clear();
        self.scene.clear();
        self.scene.take_released();
        self.overlay.update(None);

        log::info!("Engine torn down");
    }

    /// Events raised since the previous call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &TunnelCamera {
        &self.camera
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn tunnel(&self) -> &Tunnel {
        &self.tunnel
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn embers(&self) -> &EmberField {
        &self.embers
    }

    pub fn post(&self) -> &PostProcessSettings {
        &self.post
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Clicks that reached ray picking.
    pub fn click_hit_tests(&self) -> usize {
        self.click_hit_tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmberConfig, StarfieldConfig};
    use crate::gfx::rendering::PassPlan;
    use crate::gfx::scene::ObjectTag;
    use std::cell::RefCell;
    use std::rc::Rc;

    const VIEWPORT: (u32, u32) = (800, 600);
    const CENTER: (f32, f32) = (400.0, 300.0);

    #[derive(Default)]
    struct Record {
        paths: Vec<String>,
        anchors: Vec<Option<OverlayAnchor>>,
        plans: Vec<PassPlan>,
        released_ids: usize,
        releases: usize,
    }

    type Shared = Rc<RefCell<Record>>;

    struct RecordingNavigator(Shared);

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, path: &str) {
            self.0.borrow_mut().paths.push(path.to_owned());
        }
    }

    struct RecordingOverlay(Shared);

    impl OverlaySink for RecordingOverlay {
        fn update(&mut self, anchor: Option<&OverlayAnchor>) {
            self.0.borrow_mut().anchors.push(anchor.cloned());
        }
    }

    struct RecordingRenderer(Shared);

    impl FrameRenderer for RecordingRenderer {
        fn render(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError> {
            let mut record = self.0.borrow_mut();
            record.plans.push(frame.post.plan());
            record.released_ids += frame.released.len();
            Ok(())
        }

        fn release(&mut self) {
            self.0.borrow_mut().releases += 1;
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig::default()
            .with_ring_count(3)
            .with_seed(7)
            .with_starfield(StarfieldConfig {
                count: 40,
                ..Default::default()
            })
            .with_embers(EmberConfig {
                count: 30,
                ..Default::default()
            })
    }

    fn engine_with(config: EngineConfig) -> (Engine, RecordingRenderer, Shared) {
        let record = Shared::default();
        let engine = Engine::init(
            config,
            VIEWPORT,
            Box::new(RecordingNavigator(record.clone())),
            Box::new(RecordingOverlay(record.clone())),
        );
        (engine, RecordingRenderer(record.clone()), record)
    }

    fn run(engine: &mut Engine, renderer: &mut RecordingRenderer, seconds: f32) {
        let ticks = (seconds / 0.05).ceil() as usize;
        for _ in 0..ticks {
            assert!(engine.tick(0.05, renderer).is_ok());
        }
    }

    fn click(engine: &mut Engine, at: (f32, f32)) {
        engine.pointer_down(at.0, at.1);
        engine.pointer_up(at.0, at.1);
    }

    fn fragments(engine: &Engine) -> usize {
        engine
            .scene()
            .count_tagged(|tag| matches!(tag, ObjectTag::Fragment(_)))
    }

    fn artifacts(engine: &Engine) -> usize {
        engine.scene().count_tagged(|tag| tag == ObjectTag::Artifact)
    }

    fn shattered() -> (Engine, RecordingRenderer, Shared) {
        let (mut engine, mut renderer, record) = engine_with(small_config());
        click(&mut engine, CENTER);
        run(&mut engine, &mut renderer, 1.6);
        assert_eq!(engine.artifact().state(), ArtifactState::Shattered);
        engine.drain_events();
        (engine, renderer, record)
    }

    fn fragment_on_screen(engine: &Engine, index: usize) -> (f32, f32) {
        let position = engine
            .artifact()
            .fragment_world_position(engine.scene(), index)
            .unwrap_or_else(|| engine.artifact().position());
        engine
            .camera()
            .project_to_screen(position, (VIEWPORT.0 as f32, VIEWPORT.1 as f32))
            .unwrap_or(CENTER)
    }

    #[test]
    fn default_scene_layout() {
        let (engine, _, _) = engine_with(EngineConfig::default().with_seed(1).with_starfield(
            StarfieldConfig {
                count: 10,
                ..Default::default()
            },
        ));
        assert_eq!(engine.tunnel().len(), 23);
        assert_eq!(engine.controller().min_z, -90.0);
        assert_eq!(engine.controller().max_z, 6.0);
        assert_eq!(artifacts(&engine), 1);
        assert_eq!(engine.artifact().position().z, -94.0);
    }

    #[test]
    fn clicking_artifact_shatters_within_one_tick() {
        let (mut engine, mut renderer, _) = engine_with(small_config());
        assert_eq!(artifacts(&engine), 1);

        click(&mut engine, CENTER);
        assert!(engine.tick(0.016, &mut renderer).is_ok());

        assert_eq!(artifacts(&engine), 0);
        assert_eq!(fragments(&engine), 8);
        assert_eq!(engine.click_hit_tests(), 1);
        assert_eq!(engine.drain_events(), vec![SceneEvent::Shattered]);
    }

    #[test]
    fn shatter_fires_at_most_once() {
        let (mut engine, mut renderer, _) = engine_with(small_config());
        click(&mut engine, CENTER);
        run(&mut engine, &mut renderer, 0.1);
        click(&mut engine, CENTER);
        click(&mut engine, (5.0, 5.0));
        run(&mut engine, &mut renderer, 0.1);

        let shatters = engine
            .drain_events()
            .into_iter()
            .filter(|e| *e == SceneEvent::Shattered)
            .count();
        assert_eq!(shatters, 1);
        assert_eq!(artifacts(&engine), 0);
        assert_eq!(fragments(&engine), 8);
    }

    #[test]
    fn click_under_threshold_hit_tests_once_without_rotation() {
        let (mut engine, _, _) = engine_with(small_config());
        let cube = engine.artifact().cube();
        let before = cube.and_then(|id| engine.scene().get(id)).map(|o| o.transform.rotation);

        engine.pointer_down(10.0, 10.0);
        engine.pointer_move(11.5, 11.0);
        engine.pointer_up(11.5, 11.0);

        let after = cube.and_then(|id| engine.scene().get(id)).map(|o| o.transform.rotation);
        assert_eq!(engine.click_hit_tests(), 1);
        assert_eq!(before, after);
        assert_eq!(artifacts(&engine), 1);
    }

    #[test]
    fn drag_rotates_and_never_hit_tests() {
        let (mut engine, _, _) = engine_with(small_config());
        let cube = engine.artifact().cube();
        let before = cube.and_then(|id| engine.scene().get(id)).map(|o| o.transform.rotation);

        engine.pointer_down(CENTER.0, CENTER.1);
        engine.pointer_move(CENTER.0 + 10.0, CENTER.1);
        engine.pointer_move(CENTER.0 + 30.0, CENTER.1 + 5.0);
        engine.pointer_up(CENTER.0 + 30.0, CENTER.1 + 5.0);

        let after = cube.and_then(|id| engine.scene().get(id)).map(|o| o.transform.rotation);
        assert_eq!(engine.click_hit_tests(), 0);
        assert_ne!(before, after);
        assert_eq!(artifacts(&engine), 1);
    }

    #[test]
    fn held_keys_keep_target_in_bounds() {
        let (mut engine, mut renderer, _) = engine_with(small_config());
        engine.key_down(InputKey::Forward);
        run(&mut engine, &mut renderer, 5.0);
        assert_eq!(engine.controller().target_z(), engine.config().camera_min_z());

        engine.key_up(InputKey::Forward);
        engine.key_down(InputKey::Backward);
        run(&mut engine, &mut renderer, 5.0);
        assert_eq!(engine.controller().target_z(), 6.0);
    }

    #[test]
    fn rings_and_particle_counts_are_stable_across_ticks() {
        let (mut engine, mut renderer, _) = engine_with(small_config());
        run(&mut engine, &mut renderer, 2.0);
        for ring in engine.tunnel().rings() {
            let z = engine.scene().world_position(ring.group).z;
            assert!((z - Tunnel::ring_z(ring.index, 4.0)).abs() < 1e-5);
        }
        assert_eq!(engine.starfield().len(), 40);
        assert_eq!(engine.embers().len(), 30);
    }

    #[test]
    fn distortion_toggle_bypasses_on_next_frame() {
        let (mut engine, mut renderer, record) = engine_with(small_config());
        engine.set_distortion_amount(1.0);
        run(&mut engine, &mut renderer, 0.05);
        engine.key_down(InputKey::ToggleDistortion);
        run(&mut engine, &mut renderer, 0.05);

        let plans = record.borrow().plans.clone();
        assert_eq!(plans, vec![PassPlan::Composite, PassPlan::Direct]);
        assert_eq!(
            engine.drain_events(),
            vec![SceneEvent::DistortionToggled { enabled: false }]
        );
    }

    #[test]
    fn toggles_ignored_while_text_focused() {
        let (mut engine, _, _) = engine_with(small_config());
        engine.set_text_focus(true);
        engine.key_down(InputKey::ToggleHelp);
        engine.key_down(InputKey::ToggleDistortion);
        assert!(!engine.help_visible());
        assert!(engine.post().enabled);

        engine.set_text_focus(false);
        engine.key_down(InputKey::ToggleHelp);
        assert!(engine.help_visible());
        assert_eq!(
            engine.drain_events(),
            vec![SceneEvent::HelpToggled { visible: true }]
        );
    }

    #[test]
    fn flight_lands_and_navigates_once() {
        let (mut engine, mut renderer, record) = shattered();
        engine.select_fragment(1);
        assert!(engine.controller().is_flying());
        assert!((engine.post().amount - 0.45).abs() < 1e-6);

        run(&mut engine, &mut renderer, 1.2);
        assert!(!engine.controller().is_flying());
        assert_eq!(record.borrow().paths, vec!["/security".to_owned()]);
        assert!((engine.post().amount - 0.1).abs() < 1e-6);

        let completions: Vec<_> = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SceneEvent::TransitionComplete { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![SceneEvent::TransitionComplete {
                path: "/security".to_owned()
            }]
        );
    }

    #[test]
    fn superseded_flight_navigates_only_to_last_selection() {
        let (mut engine, mut renderer, record) = shattered();
        engine.select_fragment(0);
        run(&mut engine, &mut renderer, 0.3);
        engine.select_fragment(3);
        run(&mut engine, &mut renderer, 2.0);
        assert_eq!(record.borrow().paths, vec!["/ai-systems".to_owned()]);
    }

    #[test]
    fn direct_link_navigates_without_flight() {
        let (mut engine, mut renderer, record) = engine_with(small_config().with_direct_link(2, "/about-us"));
        click(&mut engine, CENTER);
        run(&mut engine, &mut renderer, 1.6);
        engine.drain_events();

        engine.select_fragment(2);
        assert!(!engine.controller().is_flying());
        assert_eq!(record.borrow().paths, vec!["/about-us".to_owned()]);
        assert!(engine.drain_events().contains(&SceneEvent::TransitionComplete {
            path: "/about-us".to_owned()
        }));
    }

    #[test]
    fn animated_components_have_distinct_names() {
        let (engine, _, _) = engine_with(small_config());
        let names = [
            engine.tunnel.name(),
            engine.starfield.name(),
            engine.embers.name(),
            engine.godhead.name(),
            engine.lights.name(),
        ];
        for (i, name) in names.iter().enumerate() {
            assert!(!name.is_empty());
            assert!(!names[i + 1..].contains(name));
        }
    }

    #[test]
    fn direct_link_during_flight_restores_follow_and_distortion() {
        let (mut engine, mut renderer, record) = engine_with(small_config().with_direct_link(2, "/about-us"));
        click(&mut engine, CENTER);
        run(&mut engine, &mut renderer, 1.6);

        engine.select_fragment(0);
        run(&mut engine, &mut renderer, 0.6);
        let stopped_at = engine.camera().position.z;
        assert!(stopped_at < 5.0);

        engine.select_fragment(2);
        assert!(!engine.controller().is_flying());
        assert!((engine.post().amount - 0.1).abs() < 1e-6);
        assert!((engine.controller().target_z() - stopped_at).abs() < 1e-4);

        run(&mut engine, &mut renderer, 3.0);
        assert!((engine.camera().position.z - stopped_at).abs() < 1e-3);
        assert!((engine.post().amount - 0.1).abs() < 1e-6);
        assert_eq!(record.borrow().paths, vec!["/about-us".to_owned()]);
    }

    #[test]
    fn hover_events_fire_only_on_change() {
        let (mut engine, mut renderer, record) = shattered();
        let target = fragment_on_screen(&engine, 4);

        engine.pointer_move(target.0, target.1);
        engine.pointer_move(target.0, target.1);
        assert_eq!(engine.hovered(), Some(4));

        run(&mut engine, &mut renderer, 0.3);
        let level = engine.artifact().fragment(4).map(|f| f.emissive_level);
        assert!(level.is_some_and(|l| (l - 1.2).abs() < 1e-4));
        let anchor = record.borrow().anchors.last().cloned().flatten();
        assert_eq!(anchor.map(|a| a.fragment), Some(4));

        engine.pointer_move(1.0, 1.0);
        engine.pointer_move(2.0, 1.0);
        assert_eq!(engine.hovered(), None);

        let events = engine.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SceneEvent::HoverChanged { fragment: 4, .. }));
        assert_eq!(events[1], SceneEvent::HoverCleared);

        run(&mut engine, &mut renderer, 0.05);
        assert_eq!(record.borrow().anchors.last().cloned().flatten(), None);
    }

    #[test]
    fn hover_is_ignored_before_shatter() {
        let (mut engine, _, _) = engine_with(small_config());
        engine.pointer_move(CENTER.0, CENTER.1);
        assert_eq!(engine.hovered(), None);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn pointer_leave_cancels_drag_and_clears_hover() {
        let (mut engine, _, _) = shattered();
        let target = fragment_on_screen(&engine, 6);
        engine.pointer_move(target.0, target.1);
        engine.pointer_down(target.0, target.1);
        engine.pointer_leave();
        engine.pointer_up(target.0, target.1);

        assert_eq!(engine.hovered(), None);
        assert_eq!(engine.click_hit_tests(), 1);
        assert!(engine.drain_events().contains(&SceneEvent::HoverCleared));
    }

    #[test]
    fn zero_resize_is_skipped() {
        let (mut engine, _, _) = engine_with(small_config());
        engine.resize(0, 300);
        assert_eq!(engine.viewport(), VIEWPORT);
        engine.resize(1024, 512);
        assert_eq!(engine.viewport(), (1024, 512));
        assert_eq!(engine.camera().aspect, 2.0);
    }

    #[test]
    fn shatter_releases_the_artifact_on_next_frame() {
        let (mut engine, mut renderer, record) = engine_with(small_config());
        click(&mut engine, CENTER);
        assert!(engine.tick(0.016, &mut renderer).is_ok());
        assert_eq!(record.borrow().released_ids, 1);
    }

    #[test]
    fn teardown_is_idempotent_and_stops_everything() {
        let (mut engine, mut renderer, record) = shattered();
        engine.select_fragment(0);
        let frames = record.borrow().plans.len();

        engine.teardown(Some(&mut renderer));
        engine.teardown(Some(&mut renderer));
        engine.teardown(None);

        assert!(engine.is_torn_down());
        assert!(engine.timeline().is_empty());
        assert!(engine.scene().is_empty());
        assert_eq!(record.borrow().releases, 2);

        click(&mut engine, CENTER);
        engine.key_down(InputKey::ToggleHelp);
        run(&mut engine, &mut renderer, 1.0);
        assert_eq!(record.borrow().plans.len(), frames);
        assert!(record.borrow().paths.is_empty());
        assert_eq!(engine.click_hit_tests(), 1);
    }
}
