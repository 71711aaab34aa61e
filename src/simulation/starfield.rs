//! Binary-digit starfield.
//!
//! A sphere of `0`/`1` sprites around the origin that drifts, swirls about Z
//! and twinkles. Stars that wander past `radius + 20` are re-seeded in place,
//! so the population never changes size.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::StarfieldConfig;
use crate::gfx::resources::atlas::{SpriteAtlas, CELL_DIGIT_ONE, CELL_DIGIT_ZERO};
use crate::gfx::scene::{Scene, SpriteInstance};

use super::traits::{Animated, FrameTime, SpriteEmitter};

const RESPAWN_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Position in field space (before the field's own Z rotation).
    pub position: Vector3<f32>,
    pub base_scale: f32,
    pub twinkle_speed: f32,
    pub twinkle_phase: f32,
    pub drift: Vector3<f32>,
    /// Distance from the Z axis at spawn; faster swirl further out.
    pub ring_radius: f32,
    pub one: bool,
}

pub struct Starfield {
    config: StarfieldConfig,
    stars: Vec<Star>,
    rotation_z: f32,
    rng: StdRng,
    instances: Vec<SpriteInstance>,
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

impl Starfield {
    pub fn new(config: StarfieldConfig, seed: u64) -> Self {
        let config = config.normalized();
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..config.count)
            .map(|_| Self::spawn(&config, &mut rng))
            .collect();

        let mut field = Self {
            config,
            stars,
            rotation_z: 0.0,
            rng,
            instances: Vec::new(),
        };
        field.rebuild_instances(0.0);
        field
    }

    fn spawn(config: &StarfieldConfig, rng: &mut StdRng) -> Star {
        let r = rng.random::<f32>().cbrt() * config.radius;
        let theta = rng.random_range(-1.0_f32..=1.0).acos();
        let phi = rng.random_range(0.0..TAU);
        let position = Vector3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        );

        let distance = position.magnitude();
        let base_scale = map_linear(distance, 0.0, config.radius, 0.9, 2.2)
            * rng.random_range(0.8..1.4);
        let drift = Vector3::new(
            rng.random_range(-config.drift..=config.drift),
            rng.random_range(-config.drift..=config.drift),
            rng.random_range(-config.drift..=config.drift),
        );

        Star {
            position,
            base_scale,
            twinkle_speed: rng.random_range(config.twinkle_speed.0..=config.twinkle_speed.1),
            twinkle_phase: rng.random_range(0.0..TAU),
            drift,
            ring_radius: position.x.hypot(position.y),
            one: rng.random::<bool>(),
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }

    fn rebuild_instances(&mut self, elapsed: f32) {
        let radius = self.config.radius;
        let (sin_z, cos_z) = self.rotation_z.sin_cos();
        let zero_uv = SpriteAtlas::uv_rect(CELL_DIGIT_ZERO);
        let one_uv = SpriteAtlas::uv_rect(CELL_DIGIT_ONE);

        self.instances.clear();
        self.instances.extend(self.stars.iter().map(|star| {
            let tw = 0.5 + 0.5 * (elapsed * star.twinkle_speed * 2.0 + star.twinkle_phase).sin();
            let scale = star.base_scale * (0.9 + 0.2 * tw);
            let depth_fade = smoothstep(radius - 10.0, radius + RESPAWN_MARGIN, star.position.magnitude());
            let alpha = (0.85 * tw * (1.0 - depth_fade) + 0.15).clamp(0.05, 1.0);

            let p = star.position;
            SpriteInstance {
                position: [p.x * cos_z - p.y * sin_z, p.x * sin_z + p.y * cos_z, p.z],
                size: scale,
                color: [1.0, 1.0, 1.0, alpha],
                uv_rect: if star.one { one_uv } else { zero_uv },
            }
        }));
    }
}

impl Animated for Starfield {
    fn name(&self) -> &str {
        "starfield"
    }

    fn animate(&mut self, time: FrameTime, _scene: &mut Scene) {
        let FrameTime { dt, elapsed } = time;
        self.rotation_z = (self.rotation_z + self.config.spin * dt) % TAU;

        let limit = self.config.radius + RESPAWN_MARGIN;
        for index in 0..self.stars.len() {
            let star = &mut self.stars[index];
            star.position += star.drift * (dt * 0.5);

            let angle = star.position.y.atan2(star.position.x) + dt * (0.05 + star.ring_radius * 0.00005);
            let r = star.position.x.hypot(star.position.y);
            let z = star.position.z + (elapsed * 0.5 + star.twinkle_phase).sin() * 0.02;
            star.position = Vector3::new(r * angle.cos(), r * angle.sin(), z);

            if star.position.magnitude() > limit {
                self.stars[index] = Self::spawn(&self.config, &mut self.rng);
            }
        }

        self.rebuild_instances(elapsed);
    }
}

impl SpriteEmitter for Starfield {
    fn emit_sprites(&self, out: &mut Vec<SpriteInstance>) {
        out.extend_from_slice(&self.instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> StarfieldConfig {
        StarfieldConfig {
            count: 300,
            ..StarfieldConfig::default()
        }
    }

    #[test]
    fn count_is_invariant_across_ticks() {
        let mut scene = Scene::new();
        let mut field = Starfield::new(small_config(), 5);
        let mut elapsed = 0.0;
        for _ in 0..200 {
            elapsed += 0.1;
            field.animate(FrameTime::new(0.1, elapsed), &mut scene);
            assert_eq!(field.len(), 300);
        }
        let mut sprites = Vec::new();
        field.emit_sprites(&mut sprites);
        assert_eq!(sprites.len(), 300);
    }

    #[test]
    fn stars_spawn_inside_radius_with_bounded_params() {
        let field = Starfield::new(small_config(), 9);
        for star in field.stars() {
            assert!(star.position.magnitude() <= 120.0 + 1e-3);
            assert!(star.twinkle_speed >= 0.6 && star.twinkle_speed <= 2.2);
            assert!(star.drift.x.abs() <= 0.02);
            assert!(star.base_scale >= 0.9 * 0.8 - 1e-4 && star.base_scale <= 2.2 * 1.4 + 1e-4);
        }
    }

    #[test]
    fn zero_radius_gives_finite_scales() {
        let field = Starfield::new(
            StarfieldConfig {
                count: 20,
                radius: 0.0,
                twinkle_speed: (2.2, 0.6),
                ..StarfieldConfig::default()
            },
            6,
        );
        for star in field.stars() {
            assert!(star.base_scale.is_finite());
            assert!(star.twinkle_speed >= 0.6 && star.twinkle_speed <= 2.2);
        }
    }

    #[test]
    fn escaped_stars_are_respawned() {
        let mut field = Starfield::new(small_config(), 1);
        field.stars[0].position = Vector3::new(0.0, 0.0, 500.0);
        field.stars[0].drift = Vector3::new(0.0, 0.0, 0.0);
        field.animate(FrameTime::new(0.016, 0.016), &mut Scene::new());
        assert!(field.stars()[0].position.magnitude() <= 120.0 + 1e-3);
    }

    #[test]
    fn sprite_alpha_and_scale_stay_in_range() {
        let mut field = Starfield::new(small_config(), 2);
        field.animate(FrameTime::new(0.05, 3.7), &mut Scene::new());
        let mut sprites = Vec::new();
        field.emit_sprites(&mut sprites);
        for (sprite, star) in sprites.iter().zip(field.stars()) {
            assert!(sprite.color[3] >= 0.05 && sprite.color[3] <= 1.0);
            assert!(sprite.size >= star.base_scale * 0.9 - 1e-5);
            assert!(sprite.size <= star.base_scale * 1.1 + 1e-5);
        }
    }

    #[test]
    fn field_spins_about_z() {
        let mut field = Starfield::new(small_config(), 2);
        field.animate(FrameTime::new(0.1, 0.1), &mut Scene::new());
        assert!((field.rotation_z() - 0.005).abs() < 1e-6);
    }
}
