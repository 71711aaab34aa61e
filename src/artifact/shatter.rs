//! Fragment construction for the shatter transition.
//!
//! Builds the fragment group, the eight corner fragments with their face
//! decals and the glowing core, and queues every launch and jitter tween.
//! Nothing here is observable until the whole set exists.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use cgmath::{Euler, InnerSpace, Quaternion, Rad, Vector3, Zero};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::animation::{
    Easing, Repeat, Timeline, Tween, TweenEvent, TweenKey, TweenProperty, TweenTarget, TweenValue,
};
use crate::gfx::resources::department_cell;
use crate::gfx::scene::{
    BlendMode, Material, MeshKind, ObjectId, ObjectTag, PointLight, Scene, SceneObject,
};

use super::departments::{department_for_index, Department};

pub const ARTIFACT_EDGE: f32 = 1.5;
pub const FRAGMENT_EDGE: f32 = ARTIFACT_EDGE / 2.0;
/// Corner offset magnitude per axis.
pub const HALF_FRAGMENT: f32 = FRAGMENT_EDGE / 2.0;
pub const LAUNCH_SPREAD: f32 = 4.0;
pub const FRAGMENT_COUNT: usize = 8;
pub const REST_EMISSIVE: f32 = 0.4;

const JITTER_AMPLITUDE: f32 = 0.03;
const CORE_RADIUS: f32 = FRAGMENT_EDGE * 0.3;
const DECAL_SIZE: f32 = 0.7;
const DECAL_INSET: f32 = 0.004;

const PALETTE: [u32; FRAGMENT_COUNT] = [
    0xff0000, 0x00ff00, 0x0000ff, 0xffff00, 0xff00ff, 0x00ffff, 0xffa500, 0x800080,
];

/// One piece of the shattered artifact.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub index: usize,
    pub body: ObjectId,
    pub decals: Vec<ObjectId>,
    /// Corner offset inside the intact artifact, `±HALF_FRAGMENT` per axis.
    pub offset: Vector3<f32>,
    pub department: &'static Department,
    /// Navigates immediately on activation instead of flying.
    pub direct_link: Option<String>,
    pub orbit_speed: f32,
    pub wobble_phase: f32,
    pub twinkle_phase: f32,
    /// Tween-driven launch position.
    pub base_position: Vector3<f32>,
    /// Tween-driven micro jitter, added on top of the base.
    pub jitter: Vector3<f32>,
    /// Hover-driven emissive level the per-frame pulse modulates.
    pub emissive_level: f32,
    pub launched: bool,
}

impl Fragment {
    pub fn position_key(index: usize) -> TweenKey {
        TweenKey::new(TweenTarget::Fragment(index), TweenProperty::Position)
    }

    pub fn jitter_key(index: usize) -> TweenKey {
        TweenKey::new(TweenTarget::Fragment(index), TweenProperty::Jitter)
    }

    pub fn emissive_key(index: usize) -> TweenKey {
        TweenKey::new(TweenTarget::Fragment(index), TweenProperty::EmissiveIntensity)
    }

    /// Launch destination relative to the fragment group.
    pub fn destination(&self) -> Vector3<f32> {
        self.offset * LAUNCH_SPREAD
    }
}

/// Corner offsets in a fixed order: x major, then y, then z.
pub fn corner_offsets() -> [Vector3<f32>; FRAGMENT_COUNT] {
    let mut offsets = [Vector3::zero(); FRAGMENT_COUNT];
    for (i, offset) in offsets.iter_mut().enumerate() {
        let sign = |bit: usize| if i & bit != 0 { HALF_FRAGMENT } else { -HALF_FRAGMENT };
        *offset = Vector3::new(sign(4), sign(2), sign(1));
    }
    offsets
}

/// Result of [`build_fragments`].
pub struct ShatterSet {
    pub group: ObjectId,
    pub core: ObjectId,
    pub fragments: Vec<Fragment>,
}

fn decal_faces() -> [(Vector3<f32>, Euler<Rad<f32>>); 6] {
    let face = 0.5 + DECAL_INSET / FRAGMENT_EDGE;
    [
        (Vector3::new(face, 0.0, 0.0), Euler::new(Rad(0.0), Rad(FRAC_PI_2), Rad(0.0))),
        (Vector3::new(-face, 0.0, 0.0), Euler::new(Rad(0.0), Rad(-FRAC_PI_2), Rad(0.0))),
        (Vector3::new(0.0, face, 0.0), Euler::new(Rad(-FRAC_PI_2), Rad(0.0), Rad(0.0))),
        (Vector3::new(0.0, -face, 0.0), Euler::new(Rad(FRAC_PI_2), Rad(0.0), Rad(0.0))),
        (Vector3::new(0.0, 0.0, face), Euler::new(Rad(0.0), Rad(0.0), Rad(0.0))),
        (Vector3::new(0.0, 0.0, -face), Euler::new(Rad(0.0), Rad(PI), Rad(0.0))),
    ]
}

/// Adds the fragment group at `position` with all eight fragments, then queues
/// their launch and jitter tweens.
///
/// # Arguments
/// * `scene` - Scene receiving the group
/// * `timeline` - Timeline receiving the tweens
/// * `position` - Last world position of the intact artifact
/// * `seed` - Seed for per-fragment phases and launch durations
/// * `direct_links` - Fragment index to path for fragments that skip the flight
pub fn build_fragments(
    scene: &mut Scene,
    timeline: &mut Timeline,
    position: Vector3<f32>,
    seed: u64,
    direct_links: &HashMap<usize, String>,
) -> ShatterSet {
    let group = scene.add(
        SceneObject::group("shatteredCube")
            .with_tag(ObjectTag::FragmentGroup)
            .with_position(position),
    );

    let mut fragments = Vec::with_capacity(FRAGMENT_COUNT);
    for (index, offset) in corner_offsets().into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
        let department = department_for_index(index);

        let body = scene.add_child(
            group,
            SceneObject::mesh(
                &format!("fragment-{}", index),
                MeshKind::Cube,
                Material::lit(PALETTE[index]).with_emissive(department.color, REST_EMISSIVE),
            )
            .with_tag(ObjectTag::Fragment(index))
            .with_scale(FRAGMENT_EDGE),
        );

        let decals = decal_faces()
            .into_iter()
            .enumerate()
            .map(|(face, (local, euler))| {
                scene.add_child(
                    body,
                    SceneObject::mesh(
                        &format!("fragment-{}-decal-{}", index, face),
                        MeshKind::Quad,
                        Material::unlit(department.color)
                            .with_blend(BlendMode::Additive, 0.95)
                            .with_texture(department_cell(index)),
                    )
                    .with_tag(ObjectTag::FragmentDecal(index))
                    .with_position(local)
                    .with_rotation(Quaternion::from(euler))
                    .with_scale(DECAL_SIZE),
                )
            })
            .collect();

        let launch_seconds = rng.random_range(1.0..=1.2);
        timeline.start(
            Tween::new(
                Fragment::position_key(index),
                TweenValue::Vec3(Vector3::zero()),
                TweenValue::Vec3(offset * LAUNCH_SPREAD),
                launch_seconds,
            )
            .with_delay(index as f32 * 0.03)
            .with_easing(Easing::Power2Out)
            .on_complete(TweenEvent::FragmentLaunched(index)),
        );

        let jitter_direction = Vector3::new(
            rng.random_range(-1.0_f32..=1.0),
            rng.random_range(-1.0_f32..=1.0),
            rng.random_range(-1.0_f32..=1.0),
        );
        let jitter_target = if jitter_direction.magnitude2() > f32::EPSILON {
            jitter_direction.normalize() * JITTER_AMPLITUDE
        } else {
            Vector3::unit_y() * JITTER_AMPLITUDE
        };
        timeline.start(
            Tween::new(
                Fragment::jitter_key(index),
                TweenValue::Vec3(Vector3::zero()),
                TweenValue::Vec3(jitter_target),
                rng.random_range(0.6..=1.0),
            )
            .with_easing(Easing::SineInOut)
            .with_repeat(Repeat::YoyoForever),
        );

        fragments.push(Fragment {
            index,
            body,
            decals,
            offset,
            department,
            direct_link: direct_links.get(&index).cloned(),
            orbit_speed: rng.random_range(0.6..=1.4),
            wobble_phase: rng.random_range(0.0..TAU),
            twinkle_phase: rng.random_range(0.0..TAU),
            base_position: Vector3::zero(),
            jitter: Vector3::zero(),
            emissive_level: REST_EMISSIVE,
            launched: false,
        });
    }

    let core = scene.add_child(
        group,
        SceneObject::mesh("fragment-core", MeshKind::Sphere, Material::unlit(0xffffff))
            .with_tag(ObjectTag::FragmentCore)
            .with_scale(CORE_RADIUS),
    );
    scene.lighting.core = Some(PointLight::new(0xffffff, 3.0, position).with_range(20.0));

    ShatterSet {
        group,
        core,
        fragments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_cover_all_sign_combinations() {
        let offsets = corner_offsets();
        for (i, a) in offsets.iter().enumerate() {
            assert_eq!(a.x.abs(), 0.375);
            assert_eq!(a.y.abs(), 0.375);
            assert_eq!(a.z.abs(), 0.375);
            for b in &offsets[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(offsets[0], Vector3::new(-0.375, -0.375, -0.375));
        assert_eq!(offsets[7], Vector3::new(0.375, 0.375, 0.375));
    }

    #[test]
    fn builds_complete_set_with_decals_and_tweens() {
        let mut scene = Scene::new();
        let mut timeline = Timeline::new();
        let links = HashMap::from([(0, "/about-us".to_owned())]);
        let set = build_fragments(&mut scene, &mut timeline, Vector3::new(0.0, 0.0, -94.0), 3, &links);

        assert_eq!(set.fragments.len(), 8);
        assert_eq!(scene.children(set.group).len(), 9);
        for fragment in &set.fragments {
            assert_eq!(fragment.decals.len(), 6);
            for decal in &fragment.decals {
                assert_eq!(scene.get(*decal).map(|d| d.tag), Some(ObjectTag::FragmentDecal(fragment.index)));
            }
            assert_eq!(fragment.department.code, department_for_index(fragment.index).code);
            assert!(timeline.is_active(Fragment::position_key(fragment.index)));
            assert!(timeline.is_active(Fragment::jitter_key(fragment.index)));
        }
        assert_eq!(set.fragments[0].direct_link.as_deref(), Some("/about-us"));
        assert!(set.fragments[1].direct_link.is_none());
        assert!(scene.lighting.core.is_some());
    }
}
