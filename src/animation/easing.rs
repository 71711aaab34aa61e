//! Easing curves used by scripted tweens.

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Ease-out, `1 - (1 - t)^3`; decelerates into the target.
    Power2Out,
    /// Ease-in, `t^4`; accelerates away from the start.
    Power3In,
    /// Sinusoidal ease-in-out for looping motion.
    SineInOut,
}

impl Easing {
    /// Applies the curve to a progress value, clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power3In => t.powi(4),
            Self::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}
