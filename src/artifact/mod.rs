//! # Central Artifact
//!
//! The intact cube at the end of the tunnel and its one-way transition into
//! eight department fragments.
//!
//! ```text
//! Intact --(hit)--> Shattering --(all launches done)--> Shattered
//! ```
//!
//! The artifact never comes back once shattered.

pub mod departments;
pub mod shatter;

use std::collections::HashMap;

use cgmath::{Euler, Quaternion, Rad, Vector3};

use crate::animation::{Timeline, TweenEvent, TweenKey, TweenProperty, TweenTarget, TweenValue};
use crate::gfx::scene::{Material, MeshKind, ObjectId, ObjectTag, Scene, SceneObject};
use crate::simulation::FrameTime;

pub use departments::{department_for_index, Department, DEPARTMENTS};
pub use shatter::{corner_offsets, Fragment, ShatterSet, ARTIFACT_EDGE, FRAGMENT_COUNT, LAUNCH_SPREAD, REST_EMISSIVE};

/// Radians of group rotation per dragged pixel.
const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;
const WOBBLE_AMPLITUDE: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Intact,
    Shattering,
    Shattered,
}

pub struct Artifact {
    state: ArtifactState,
    cube: Option<ObjectId>,
    group: Option<ObjectId>,
    core: Option<ObjectId>,
    fragments: Vec<Fragment>,
    position: Vector3<f32>,
    /// Accumulated drag rotation of the fragment group, `(x, y)` radians.
    group_euler: (f32, f32),
    seed: u64,
}

impl Artifact {
    /// Adds the intact artifact at `z` on the tunnel axis.
    pub fn build(scene: &mut Scene, z: f32, seed: u64) -> Self {
        let position = Vector3::new(0.0, 0.0, z);
        let cube = scene.add(
            SceneObject::mesh(
                "mainCube",
                MeshKind::Cube,
                Material::lit(0xffffff).with_emissive(0xffffff, 0.0),
            )
            .with_tag(ObjectTag::Artifact)
            .with_position(position)
            .with_scale(ARTIFACT_EDGE),
        );

        Self {
            state: ArtifactState::Intact,
            cube: Some(cube),
            group: None,
            core: None,
            fragments: Vec::new(),
            position,
            group_euler: (0.0, 0.0),
            seed,
        }
    }

    pub fn state(&self) -> ArtifactState {
        self.state
    }

    /// The intact cube, until it shatters.
    pub fn cube(&self) -> Option<ObjectId> {
        self.cube
    }

    pub fn group(&self) -> Option<ObjectId> {
        self.group
    }

    pub fn core(&self) -> Option<ObjectId> {
        self.core
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn has_fragments(&self) -> bool {
        !self.fragments.is_empty()
    }

    pub fn fragment(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    /// Fragment bodies in index order, for hit testing.
    pub fn fragment_bodies(&self) -> Vec<ObjectId> {
        self.fragments.iter().map(|fragment| fragment.body).collect()
    }

    /// Index of the fragment owning `id`, whether it is the body or a decal.
    pub fn fragment_for_object(&self, scene: &Scene, id: ObjectId) -> Option<usize> {
        match scene.get(id)?.tag {
            ObjectTag::Fragment(index) | ObjectTag::FragmentDecal(index) => {
                self.fragments.get(index).map(|fragment| fragment.index)
            }
            _ => None,
        }
    }

    /// Brightens the intact cube as the camera closes in, from zero at the
    /// tunnel mouth to nearly full at the deepest follow position.
    pub fn update_emissive(&self, scene: &mut Scene, camera_z: f32, camera_max_z: f32) {
        let Some(cube) = self.cube.and_then(|id| scene.get_mut(id)) else {
            return;
        };
        let cube_z = cube.transform.position.z;
        let max_distance = match (camera_max_z - cube_z).abs() {
            d if d > f32::EPSILON => d,
            _ => 1.0,
        };
        let distance = (cube_z - camera_z).abs();
        cube.material.emissive_intensity = (1.0 - distance / max_distance).clamp(0.0, 1.0);
    }

    /// Applies a drag delta in pixels to whatever is currently on screen.
    pub fn rotate_by_drag(&mut self, scene: &mut Scene, dx: f32, dy: f32) {
        if let Some(group) = self.group.and_then(|id| scene.get_mut(id)) {
            self.group_euler.0 += dy * DRAG_RADIANS_PER_PIXEL;
            self.group_euler.1 += dx * DRAG_RADIANS_PER_PIXEL;
            group
                .transform
                .set_euler(self.group_euler.0, self.group_euler.1, 0.0);
        } else if let Some(cube) = self.cube.and_then(|id| scene.get_mut(id)) {
            let delta = Quaternion::from(Euler::new(
                Rad(dy.to_radians()),
                Rad(dx.to_radians()),
                Rad(0.0),
            ));
            cube.transform.rotation = delta * cube.transform.rotation;
        }
    }

    /// Replaces the intact cube with the fragment set.
    ///
    /// Returns `false` without touching anything unless the artifact is
    /// still intact.
    pub fn shatter(
        &mut self,
        scene: &mut Scene,
        timeline: &mut Timeline,
        direct_links: &HashMap<usize, String>,
    ) -> bool {
        if self.state != ArtifactState::Intact {
            return false;
        }
        let Some(cube) = self.cube.take() else {
            return false;
        };

        if scene.contains(cube) {
            self.position = scene.world_position(cube);
        }
        scene.remove(cube);

        let set = shatter::build_fragments(scene, timeline, self.position, self.seed, direct_links);
        self.group = Some(set.group);
        self.core = Some(set.core);
        self.fragments = set.fragments;
        self.group_euler = (0.0, 0.0);
        self.state = ArtifactState::Shattering;

        log::info!(
            "Artifact shattered into {} fragments at z={:.1}",
            self.fragments.len(),
            self.position.z
        );
        true
    }

    /// Routes a timeline sample addressed to a fragment. Returns `true` if
    /// the key belonged here.
    pub fn apply_sample(&mut self, key: TweenKey, value: TweenValue) -> bool {
        let TweenTarget::Fragment(index) = key.target else {
            return false;
        };
        let Some(fragment) = self.fragments.get_mut(index) else {
            return false;
        };

        match (key.property, value) {
            (TweenProperty::Position, TweenValue::Vec3(v)) => fragment.base_position = v,
            (TweenProperty::Jitter, TweenValue::Vec3(v)) => fragment.jitter = v,
            (TweenProperty::EmissiveIntensity, TweenValue::Scalar(v)) => fragment.emissive_level = v,
            _ => return false,
        }
        true
    }

    pub fn on_event(&mut self, event: TweenEvent) {
        let TweenEvent::FragmentLaunched(index) = event else {
            return;
        };
        if let Some(fragment) = self.fragments.get_mut(index) {
            fragment.launched = true;
            fragment.base_position = fragment.destination();
        }
        if self.state == ArtifactState::Shattering && self.fragments.iter().all(|f| f.launched) {
            self.state = ArtifactState::Shattered;
            log::debug!("All fragments launched");
        }
    }

    /// Per-frame cosmetics: wobble on top of the tweened position and a
    /// twinkling emissive pulse.
    pub fn update_fragments(&self, scene: &mut Scene, time: FrameTime) {
        let t = time.elapsed;
        for fragment in &self.fragments {
            let Some(body) = scene.get_mut(fragment.body) else {
                continue;
            };
            let swing = t * fragment.orbit_speed + fragment.wobble_phase;
            let wobble = Vector3::new(swing.sin(), swing.cos(), 0.0) * WOBBLE_AMPLITUDE;
            body.transform.position = fragment.base_position + fragment.jitter + wobble;

            let twinkle = 0.85 + 0.15 * (t * 3.0 + fragment.twinkle_phase).sin();
            body.material.emissive_intensity = fragment.emissive_level * twinkle;
        }
    }

    /// World position of a fragment body, if it exists.
    pub fn fragment_world_position(&self, scene: &Scene, index: usize) -> Option<Vector3<f32>> {
        let fragment = self.fragments.get(index)?;
        scene
            .contains(fragment.body)
            .then(|| scene.world_position(fragment.body))
    }

    /// Last position of the intact cube, which is also the group origin.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn intact(scene: &mut Scene) -> Artifact {
        Artifact::build(scene, -94.0, 11)
    }

    fn run_timeline(artifact: &mut Artifact, timeline: &mut Timeline, seconds: f32) {
        let mut elapsed = 0.0;
        while elapsed < seconds {
            let step = timeline.advance(0.05);
            for (key, value) in step.samples {
                artifact.apply_sample(key, value);
            }
            for event in step.completed {
                artifact.on_event(event);
            }
            elapsed += 0.05;
        }
    }

    #[test]
    fn shatter_fires_once() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        assert_eq!(scene.count_tagged(|tag| tag == ObjectTag::Artifact), 1);

        assert!(artifact.shatter(&mut scene, &mut timeline, &HashMap::new()));
        assert_eq!(scene.count_tagged(|tag| tag == ObjectTag::Artifact), 0);
        let group = artifact.group().unwrap();
        assert_eq!(
            scene.children(group).iter().filter(|id| matches!(scene.get(**id).unwrap().tag, ObjectTag::Fragment(_))).count(),
            8
        );

        let objects = scene.len();
        assert!(!artifact.shatter(&mut scene, &mut timeline, &HashMap::new()));
        assert_eq!(scene.len(), objects);
        assert_eq!(scene.count_tagged(|tag| tag == ObjectTag::FragmentGroup), 1);
    }

    #[test]
    fn group_sits_at_last_artifact_position() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        artifact.shatter(&mut scene, &mut timeline, &HashMap::new());
        let group = artifact.group().unwrap();
        assert_eq!(scene.world_position(group), Vector3::new(0.0, 0.0, -94.0));
    }

    #[test]
    fn launches_land_on_scaled_corners() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        artifact.shatter(&mut scene, &mut timeline, &HashMap::new());
        assert_eq!(artifact.state(), ArtifactState::Shattering);

        run_timeline(&mut artifact, &mut timeline, 1.6);
        assert_eq!(artifact.state(), ArtifactState::Shattered);

        let corners = corner_offsets();
        for (fragment, corner) in artifact.fragments().iter().zip(corners) {
            let expected = corner * 4.0;
            assert!((fragment.base_position - expected).magnitude2() < 1e-10);
            assert_eq!(fragment.department, &DEPARTMENTS[fragment.index % 8]);
        }
    }

    #[test]
    fn jitter_and_wobble_stay_small() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        artifact.shatter(&mut scene, &mut timeline, &HashMap::new());
        run_timeline(&mut artifact, &mut timeline, 2.0);
        artifact.update_fragments(&mut scene, FrameTime::new(0.016, 2.0));

        for fragment in artifact.fragments() {
            let body = scene.get(fragment.body).unwrap();
            let drift = body.transform.position - fragment.destination();
            assert!(drift.magnitude2() <= (0.03_f32 + WOBBLE_AMPLITUDE).powi(2) + 1e-6);
            assert!(body.material.emissive_intensity <= REST_EMISSIVE + 1e-6);
        }
    }

    #[test]
    fn emissive_grows_as_camera_approaches() {
        let mut scene = Scene::new();
        let artifact = intact(&mut scene);
        let cube = artifact.cube().unwrap();

        artifact.update_emissive(&mut scene, 6.0, 6.0);
        let far = scene.get(cube).unwrap().material.emissive_intensity;
        artifact.update_emissive(&mut scene, -90.0, 6.0);
        let near = scene.get(cube).unwrap().material.emissive_intensity;
        assert_eq!(far, 0.0);
        assert!(near > 0.9);
    }

    #[test]
    fn drag_rotates_cube_then_group() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        let cube = artifact.cube().unwrap();

        artifact.rotate_by_drag(&mut scene, 10.0, 0.0);
        let rotation = scene.get(cube).unwrap().transform.rotation;
        assert!((rotation.s - 1.0).abs() > 1e-6);

        artifact.shatter(&mut scene, &mut timeline, &HashMap::new());
        artifact.rotate_by_drag(&mut scene, 100.0, 40.0);
        assert!((artifact.group_euler.0 - 0.2).abs() < 1e-6);
        assert!((artifact.group_euler.1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn decals_resolve_to_their_fragment() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let mut artifact = intact(&mut scene);
        artifact.shatter(&mut scene, &mut timeline, &HashMap::new());
        let decal = artifact.fragments()[5].decals[2];
        assert_eq!(artifact.fragment_for_object(&scene, decal), Some(5));
        assert_eq!(artifact.fragment_for_object(&scene, artifact.core().unwrap()), None);
    }
}
