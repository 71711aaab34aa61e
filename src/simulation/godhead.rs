//! Off-axis beacon: a pulsing gold core inside a rotating wire cage, wrapped
//! in a breathing halo and a soft aura sprite.

use cgmath::{Euler, Quaternion, Rad, Vector3};

use crate::gfx::resources::atlas::{SpriteAtlas, CELL_AURA};
use crate::gfx::scene::{BlendMode, Material, MeshKind, ObjectId, ObjectTag, Scene, SceneObject, SpriteInstance};

use super::traits::{Animated, FrameTime, SpriteEmitter};

pub const GODHEAD_POSITION: Vector3<f32> = Vector3::new(30.0, 20.0, -80.0);
const CORE_RADIUS: f32 = 1.25;
const CAGE_SIZE: f32 = 2.1;
const AURA_SCALE: f32 = CORE_RADIUS * 4.5;

pub struct Godhead {
    group: ObjectId,
    core: ObjectId,
    cage: ObjectId,
    halo: ObjectId,
    cage_rotation: (f32, f32),
    pulse: f32,
}

impl Godhead {
    pub fn build(scene: &mut Scene) -> Self {
        let group = scene.add(
            SceneObject::group("godhead")
                .with_tag(ObjectTag::Ornament)
                .with_position(GODHEAD_POSITION),
        );
        let core = scene.add_child(
            group,
            SceneObject::mesh("godhead-core", MeshKind::Icosahedron, Material::unlit(0xffd700))
                .with_tag(ObjectTag::Ornament)
                .with_scale(CORE_RADIUS),
        );
        let cage = scene.add_child(
            group,
            SceneObject::mesh(
                "godhead-cage",
                MeshKind::Octahedron,
                Material::unlit(0xffffff)
                    .with_blend(BlendMode::Alpha, 0.9)
                    .with_wireframe(),
            )
            .with_tag(ObjectTag::Ornament)
            .with_scale(CAGE_SIZE),
        );
        let halo = scene.add_child(
            group,
            SceneObject::mesh(
                "godhead-halo",
                MeshKind::HaloAnnulus,
                Material::unlit(0xffffff).with_blend(BlendMode::Additive, 0.55),
            )
            .with_tag(ObjectTag::Ornament)
            .with_rotation(Quaternion::from(Euler::new(
                Rad(std::f32::consts::FRAC_PI_2),
                Rad(0.0),
                Rad(std::f32::consts::PI * 0.07),
            ))),
        );

        Self {
            group,
            core,
            cage,
            halo,
            cage_rotation: (0.0, 0.0),
            pulse: 1.0,
        }
    }

    pub fn group(&self) -> ObjectId {
        self.group
    }

    /// Current core pulse factor, `1 ± 0.045`.
    pub fn pulse(&self) -> f32 {
        self.pulse
    }
}

impl Animated for Godhead {
    fn name(&self) -> &str {
        "godhead"
    }

    fn animate(&mut self, time: FrameTime, scene: &mut Scene) {
        let t = time.elapsed;
        self.pulse = 1.0 + (t * 1.2).sin() * 0.045;
        if let Some(core) = scene.get_mut(self.core) {
            core.transform.set_uniform_scale(CORE_RADIUS * self.pulse);
        }

        self.cage_rotation.0 += time.dt * 0.18;
        self.cage_rotation.1 += time.dt * 0.135;
        if let Some(cage) = scene.get_mut(self.cage) {
            cage.transform
                .set_euler(self.cage_rotation.0, self.cage_rotation.1, 0.0);
        }

        if let Some(halo) = scene.get_mut(self.halo) {
            halo.material.opacity = 0.42 + (t * 2.7).sin() * 0.18;
        }
    }
}

impl SpriteEmitter for Godhead {
    fn emit_sprites(&self, out: &mut Vec<SpriteInstance>) {
        out.push(SpriteInstance {
            position: GODHEAD_POSITION.into(),
            size: AURA_SCALE * self.pulse,
            color: [1.0, 1.0, 1.0, 0.8],
            uv_rect: SpriteAtlas::uv_rect(CELL_AURA),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_cage_and_halo_follow_time() {
        let mut scene = Scene::new();
        let mut godhead = Godhead::build(&mut scene);
        assert_eq!(scene.count_tagged(|tag| tag == ObjectTag::Ornament), 4);

        let mut elapsed = 0.0;
        for _ in 0..50 {
            elapsed += 0.1;
            godhead.animate(FrameTime::new(0.1, elapsed), &mut scene);
            assert!((godhead.pulse() - 1.0).abs() <= 0.045 + 1e-6);
            let halo = scene.get(godhead.halo).unwrap();
            assert!(halo.material.opacity >= 0.24 - 1e-6 && halo.material.opacity <= 0.6 + 1e-6);
        }
        assert!((godhead.cage_rotation.0 - 0.9).abs() < 1e-4);

        let mut sprites = Vec::new();
        godhead.emit_sprites(&mut sprites);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].position, [30.0, 20.0, -80.0]);
    }
}
