//! Engine configuration
//!
//! Plain structs with `Default` values matching the shipped scene and fluent
//! `with_*` setters for overriding individual parameters.
//!
//! ## Usage
//!
//! ```no_run
//! use shardvault::config::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_ring_count(12)
//!     .with_seed(42);
//! assert_eq!(config.camera_min_z(), -((12 - 1) as f32 * 4.0) - 2.0);
//! ```

use std::collections::HashMap;

/// Parameters of the binary-digit starfield.
#[derive(Debug, Clone, PartialEq)]
pub struct StarfieldConfig {
    pub count: usize,
    pub radius: f32,
    /// Per-axis drift magnitude, sampled in `[-drift, drift]`.
    pub drift: f32,
    pub twinkle_speed: (f32, f32),
    /// Rotation of the whole field about Z, radians per second.
    pub spin: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 4300,
            radius: 120.0,
            drift: 0.02,
            twinkle_speed: (0.6, 2.2),
            spin: 0.05,
        }
    }
}

/// Smallest starfield radius; keeps the distance-to-scale mapping finite.
const MIN_STARFIELD_RADIUS: f32 = 1e-3;

fn ordered((a, b): (f32, f32)) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl StarfieldConfig {
    /// Orders every range and clamps magnitudes so sampling never sees an
    /// empty range or a zero radius.
    pub fn normalized(self) -> Self {
        Self {
            radius: self.radius.abs().max(MIN_STARFIELD_RADIUS),
            drift: self.drift.abs(),
            twinkle_speed: ordered(self.twinkle_speed),
            ..self
        }
    }
}

/// Parameters of the ember point field drifting toward the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct EmberConfig {
    pub count: usize,
    pub half_width: f32,
    pub half_height: f32,
    pub z_front: f32,
    pub z_back: f32,
    pub speed: (f32, f32),
    pub size: (f32, f32),
    pub hue: (f32, f32),
}

impl Default for EmberConfig {
    fn default() -> Self {
        Self {
            count: 1400,
            half_width: 20.0,
            half_height: 20.0,
            z_front: 6.0,
            z_back: -180.0,
            speed: (4.0, 18.0),
            size: (0.05, 0.22),
            hue: (0.75, 0.95),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ring_count: usize,
    pub ring_spacing: f32,
    /// Camera target speed along Z while a move key is held, units per second.
    pub key_speed: f32,
    /// Fraction of the remaining distance the camera covers each tick.
    pub follow_ease: f32,
    pub camera_max_z: f32,
    pub flight_seconds: f32,
    /// Pixels the pointer must travel before a press becomes a drag.
    pub drag_threshold: f32,
    /// Upper clamp for a single frame delta, seconds.
    pub max_frame_dt: f32,
    pub distortion_enabled: bool,
    pub distortion_amount: f32,
    pub starfield: StarfieldConfig,
    pub embers: EmberConfig,
    /// Seed for every procedural generator. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Fragments that navigate immediately instead of flying the camera.
    pub direct_links: HashMap<usize, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ring_count: 23,
            ring_spacing: 4.0,
            key_speed: 30.0,
            follow_ease: 0.1,
            camera_max_z: 6.0,
            flight_seconds: 0.9,
            drag_threshold: 2.0,
            max_frame_dt: 0.1,
            distortion_enabled: true,
            distortion_amount: 0.1,
            starfield: StarfieldConfig::default(),
            embers: EmberConfig::default(),
            seed: None,
            direct_links: HashMap::new(),
        }
    }
}

impl EmberConfig {
    /// Orders every range and makes the half extents non-negative.
    pub fn normalized(self) -> Self {
        let (z_back, z_front) = ordered((self.z_back, self.z_front));
        Self {
            half_width: self.half_width.abs(),
            half_height: self.half_height.abs(),
            z_front,
            z_back,
            speed: ordered(self.speed),
            size: ordered(self.size),
            hue: ordered(self.hue),
            ..self
        }
    }
}

impl EngineConfig {
    pub fn with_ring_count(mut self, ring_count: usize) -> Self {
        self.ring_count = ring_count;
        self
    }

    pub fn with_ring_spacing(mut self, spacing: f32) -> Self {
        self.ring_spacing = spacing;
        self
    }

    pub fn with_key_speed(mut self, key_speed: f32) -> Self {
        self.key_speed = key_speed;
        self
    }

    pub fn with_flight_seconds(mut self, seconds: f32) -> Self {
        self.flight_seconds = seconds;
        self
    }

    pub fn with_drag_threshold(mut self, pixels: f32) -> Self {
        self.drag_threshold = pixels;
        self
    }

    pub fn with_distortion(mut self, enabled: bool, amount: f32) -> Self {
        self.distortion_enabled = enabled;
        self.distortion_amount = amount;
        self
    }

    pub fn with_starfield(mut self, starfield: StarfieldConfig) -> Self {
        self.starfield = starfield.normalized();
        self
    }

    pub fn with_embers(mut self, embers: EmberConfig) -> Self {
        self.embers = embers.normalized();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Makes fragment `index` navigate straight to `path` when clicked.
    pub fn with_direct_link(mut self, index: usize, path: &str) -> Self {
        self.direct_links.insert(index, path.to_owned());
        self
    }

    /// Z of the central artifact, two units past the last ring slot.
    pub fn artifact_z(&self) -> f32 {
        -(self.ring_count as f32 * self.ring_spacing) - 2.0
    }

    /// Deepest Z the follow camera may reach.
    pub fn camera_min_z(&self) -> f32 {
        let last_ring = self.ring_count.saturating_sub(1) as f32;
        -(last_ring * self.ring_spacing) - 2.0
    }
}
