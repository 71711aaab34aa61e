//! Ember field: additive motes streaming toward the viewer along +Z.

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::EmberConfig;
use crate::gfx::resources::atlas::{SpriteAtlas, CELL_EMBER};
use crate::gfx::scene::{Scene, SpriteInstance};

use super::traits::{Animated, FrameTime, SpriteEmitter};

/// World size of a sprite per unit of ember size.
const EMBER_WORLD_SCALE: f32 = 0.45;

#[derive(Debug, Clone, PartialEq)]
pub struct Ember {
    pub position: Vector3<f32>,
    pub speed: f32,
    pub size: f32,
    pub color: [f32; 3],
}

pub struct EmberField {
    config: EmberConfig,
    embers: Vec<Ember>,
    rng: StdRng,
}

/// HSL to RGB, all components in `0..=1`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

impl EmberField {
    pub fn new(config: EmberConfig, seed: u64) -> Self {
        let config = config.normalized();
        let mut rng = StdRng::seed_from_u64(seed);
        let embers = (0..config.count)
            .map(|_| {
                let position = Vector3::new(
                    rng.random_range(-config.half_width..=config.half_width),
                    rng.random_range(-config.half_height..=config.half_height),
                    rng.random_range(config.z_back..=config.z_front),
                );
                let hue = rng.random_range(config.hue.0..=config.hue.1);
                Ember {
                    position,
                    speed: rng.random_range(config.speed.0..=config.speed.1),
                    size: rng.random_range(config.size.0..=config.size.1),
                    color: hsl_to_rgb(hue, 1.0, 0.6),
                }
            })
            .collect();

        Self { config, embers, rng }
    }

    pub fn embers(&self) -> &[Ember] {
        &self.embers
    }

    pub fn len(&self) -> usize {
        self.embers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embers.is_empty()
    }
}

impl Animated for EmberField {
    fn name(&self) -> &str {
        "embers"
    }

    fn animate(&mut self, time: FrameTime, _scene: &mut Scene) {
        let EmberConfig {
            half_width,
            half_height,
            z_front,
            z_back,
            ..
        } = self.config;

        for ember in &mut self.embers {
            ember.position.z += ember.speed * time.dt;
            if ember.position.z > z_front {
                ember.position = Vector3::new(
                    self.rng.random_range(-half_width..=half_width),
                    self.rng.random_range(-half_height..=half_height),
                    z_back,
                );
            }
        }
    }
}

impl SpriteEmitter for EmberField {
    fn emit_sprites(&self, out: &mut Vec<SpriteInstance>) {
        let uv_rect = SpriteAtlas::uv_rect(CELL_EMBER);
        out.extend(self.embers.iter().map(|ember| SpriteInstance {
            position: ember.position.into(),
            size: ember.size * EMBER_WORLD_SCALE,
            color: [ember.color[0], ember.color[1], ember.color[2], 1.0],
            uv_rect,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_invariant_and_embers_wrap() {
        let mut scene = Scene::new();
        let mut field = EmberField::new(
            EmberConfig {
                count: 200,
                ..EmberConfig::default()
            },
            4,
        );
        let mut elapsed = 0.0;
        for _ in 0..300 {
            elapsed += 0.1;
            field.animate(FrameTime::new(0.1, elapsed), &mut scene);
            assert_eq!(field.len(), 200);
            for ember in field.embers() {
                assert!(ember.position.z <= 6.0 && ember.position.z >= -180.0);
                assert!(ember.position.x.abs() <= 20.0);
            }
        }
    }

    #[test]
    fn colors_are_purple_to_magenta() {
        let field = EmberField::new(EmberConfig::default(), 8);
        for ember in field.embers().iter().take(50) {
            let [r, g, b] = ember.color;
            assert!(g < r.max(b));
            assert!(ember.size >= 0.05 && ember.size <= 0.22);
        }
    }

    #[test]
    fn inverted_ranges_still_spawn() {
        let field = EmberField::new(
            EmberConfig {
                count: 50,
                speed: (18.0, 4.0),
                size: (0.22, 0.05),
                z_front: -180.0,
                z_back: 6.0,
                ..EmberConfig::default()
            },
            3,
        );
        assert_eq!(field.len(), 50);
        for ember in field.embers() {
            assert!(ember.speed >= 4.0 && ember.speed <= 18.0);
            assert!(ember.position.z >= -180.0 && ember.position.z <= 6.0);
        }
    }

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.6), [0.6, 0.6, 0.6]);
    }
}
