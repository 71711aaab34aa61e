//! Procedural ring tunnel.
//!
//! Ring `i` sits at `z = -i * spacing` for its whole life. Spin, breathing and
//! glow pulse are animated; the per-ring parameters come from a PRNG seeded
//! with the ring index, so the same seed always yields the same tunnel.

use std::f32::consts::TAU;

use cgmath::{Euler, Quaternion, Rad, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::gfx::scene::{BlendMode, Material, MeshKind, ObjectId, ObjectTag, Scene, SceneObject};

use super::traits::{Animated, FrameTime};

const CORE_COLOR: u32 = 0x00ffff;
const GLOW_COLOR: u32 = 0xff00ff;
const GLOW_SCALE: f32 = 1.2;

/// One ring of the tunnel.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub index: usize,
    pub group: ObjectId,
    pub glow: ObjectId,
    pub spin_speed: f32,
    pub pulse_phase: f32,
    /// Small fixed tilt about X and Y, radians.
    pub tilt: (f32, f32),
    /// Accumulated spin about Z, radians.
    pub spin: f32,
}

pub struct Tunnel {
    rings: Vec<Ring>,
    spacing: f32,
}

impl Tunnel {
    /// Z of ring `index`.
    pub fn ring_z(index: usize, spacing: f32) -> f32 {
        -(index as f32) * spacing
    }

    /// Adds `count` rings to `scene`. A count of zero builds an empty tunnel.
    pub fn build(scene: &mut Scene, count: usize, spacing: f32, seed: u64) -> Self {
        let rings = (0..count)
            .map(|index| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                let spin_speed = rng.random_range(0.12..0.28);
                let pulse_phase = rng.random_range(0.0..TAU);
                let tilt = (rng.random_range(-0.04..0.04), rng.random_range(-0.04..0.04));

                let group = scene.add(
                    SceneObject::group(&format!("ring-{}", index))
                        .with_tag(ObjectTag::Ring(index))
                        .with_position(Vector3::new(0.0, 0.0, Self::ring_z(index, spacing))),
                );
                scene.add_child(
                    group,
                    SceneObject::mesh(
                        &format!("ring-{}-core", index),
                        MeshKind::RingTorus,
                        Material::unlit(CORE_COLOR),
                    ),
                );
                let glow = scene.add_child(
                    group,
                    SceneObject::mesh(
                        &format!("ring-{}-glow", index),
                        MeshKind::RingTorus,
                        Material::unlit(GLOW_COLOR).with_blend(BlendMode::Additive, 1.0),
                    )
                    .with_scale(GLOW_SCALE),
                );

                let mut ring = Ring {
                    index,
                    group,
                    glow,
                    spin_speed,
                    pulse_phase,
                    tilt,
                    spin: 0.0,
                };
                ring.apply(scene, 0.0);
                ring
            })
            .collect();

        Self { rings, spacing }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

impl Ring {
    fn apply(&mut self, scene: &mut Scene, elapsed: f32) {
        let breathe = 1.0 + (elapsed * 0.8 + self.pulse_phase).sin() * 0.02;
        let pulse = 0.5 + 0.5 * (elapsed * 1.6 + self.pulse_phase).sin();

        if let Some(group) = scene.get_mut(self.group) {
            group.transform.rotation =
                Quaternion::from(Euler::new(Rad(self.tilt.0), Rad(self.tilt.1), Rad(self.spin)));
            group.transform.set_uniform_scale(breathe);
        }
        if let Some(glow) = scene.get_mut(self.glow) {
            glow.material.opacity = 0.55 + 0.45 * pulse;
            glow.material.emissive = glow.material.color;
            glow.material.emissive_intensity = 0.3 + 0.7 * pulse;
        }
    }
}

impl Animated for Tunnel {
    fn name(&self) -> &str {
        "tunnel"
    }

    fn animate(&mut self, time: FrameTime, scene: &mut Scene) {
        for ring in &mut self.rings {
            ring.spin = (ring.spin + time.dt * ring.spin_speed) % TAU;
            ring.apply(scene, time.elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_z_is_fixed_across_ticks() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::build(&mut scene, 23, 4.0, 11);
        let mut elapsed = 0.0;
        for dt in [0.016, 0.1, 0.0, 0.05, 0.033] {
            elapsed += dt;
            tunnel.animate(FrameTime::new(dt, elapsed), &mut scene);
            for ring in tunnel.rings() {
                let position = scene.world_position(ring.group);
                assert_eq!(position.z, -(ring.index as f32) * 4.0);
            }
        }
        assert_eq!(tunnel.len(), 23);
        assert_eq!(scene.count_tagged(|tag| matches!(tag, ObjectTag::Ring(_))), 23);
    }

    #[test]
    fn zero_rings_is_empty_not_an_error() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::build(&mut scene, 0, 4.0, 1);
        tunnel.animate(FrameTime::new(0.1, 0.1), &mut scene);
        assert!(tunnel.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn same_seed_same_tunnel() {
        let a = Tunnel::build(&mut Scene::new(), 5, 4.0, 99);
        let b = Tunnel::build(&mut Scene::new(), 5, 4.0, 99);
        for (ra, rb) in a.rings().iter().zip(b.rings()) {
            assert_eq!(ra.spin_speed, rb.spin_speed);
            assert_eq!(ra.pulse_phase, rb.pulse_phase);
            assert_eq!(ra.tilt, rb.tilt);
        }
    }

    #[test]
    fn spin_accumulates_and_glow_pulses() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::build(&mut scene, 1, 4.0, 3);
        let speed = tunnel.rings()[0].spin_speed;
        tunnel.animate(FrameTime::new(0.1, 0.1), &mut scene);
        assert!((tunnel.rings()[0].spin - speed * 0.1).abs() < 1e-6);

        let glow = scene.get(tunnel.rings()[0].glow).unwrap();
        assert!(glow.material.opacity >= 0.55 && glow.material.opacity <= 1.0);
        assert_eq!(glow.material.blend, BlendMode::Additive);
    }
}
