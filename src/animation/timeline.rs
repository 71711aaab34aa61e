//! Registry of concurrently running tweens
//!
//! Every tween is keyed by `(target, property)`. Starting a tween on a key that
//! is already animating replaces the old entry and its completion event is never
//! reported. Completion is returned from [`Timeline::advance`] as plain values
//! rather than callbacks, so owners react to it in their own update step.
//!
//! ## Usage
//!
//! ```no_run
//! use shardvault::animation::{Easing, Timeline, Tween, TweenKey, TweenProperty, TweenTarget, TweenValue};
//!
//! let mut timeline = Timeline::new();
//! let key = TweenKey::new(TweenTarget::Fragment(0), TweenProperty::EmissiveIntensity);
//! timeline.start(Tween::new(key, TweenValue::Scalar(0.0), TweenValue::Scalar(1.0), 0.5)
//!     .with_easing(Easing::Power2Out));
//!
//! let step = timeline.advance(0.25);
//! for (key, value) in step.samples {
//!     // apply value to whatever `key` names
//! }
//! ```

use cgmath::Vector3;

use super::easing::Easing;

/// What a tween animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenTarget {
    Camera,
    Fragment(usize),
}

/// Which property of the target a tween animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    Position,
    Jitter,
    EmissiveIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenKey {
    pub target: TweenTarget,
    pub property: TweenProperty,
}

impl TweenKey {
    pub const fn new(target: TweenTarget, property: TweenProperty) -> Self {
        Self { target, property }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    Scalar(f32),
    Vec3(Vector3<f32>),
}

impl TweenValue {
    /// Interpolates toward `to`. Mismatched kinds snap to `to`.
    pub fn lerp(self, to: TweenValue, t: f32) -> TweenValue {
        match (self, to) {
            (TweenValue::Scalar(a), TweenValue::Scalar(b)) => TweenValue::Scalar(a + (b - a) * t),
            (TweenValue::Vec3(a), TweenValue::Vec3(b)) => TweenValue::Vec3(a + (b - a) * t),
            (_, to) => to,
        }
    }

    pub fn as_scalar(self) -> Option<f32> {
        match self {
            TweenValue::Scalar(v) => Some(v),
            TweenValue::Vec3(_) => None,
        }
    }

    pub fn as_vec3(self) -> Option<Vector3<f32>> {
        match self {
            TweenValue::Vec3(v) => Some(v),
            TweenValue::Scalar(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    /// Runs forward then backward forever; never completes.
    YoyoForever,
}

/// Reported when a `Repeat::Once` tween reaches its end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    FragmentLaunched(usize),
    FlightLanded(u64),
}

#[derive(Debug, Clone)]
pub struct Tween {
    key: TweenKey,
    from: TweenValue,
    to: TweenValue,
    duration: f32,
    delay: f32,
    easing: Easing,
    repeat: Repeat,
    on_complete: Option<TweenEvent>,
    elapsed: f32,
}

impl Tween {
    pub fn new(key: TweenKey, from: TweenValue, to: TweenValue, duration: f32) -> Self {
        Self {
            key,
            from,
            to,
            duration: duration.max(0.0),
            delay: 0.0,
            easing: Easing::Linear,
            repeat: Repeat::Once,
            on_complete: None,
            elapsed: 0.0,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn on_complete(mut self, event: TweenEvent) -> Self {
        self.on_complete = Some(event);
        self
    }

    pub fn key(&self) -> TweenKey {
        self.key
    }

    /// Current value, or `None` while still inside the delay.
    fn sample(&self) -> Option<TweenValue> {
        let active = self.elapsed - self.delay;
        if active < 0.0 {
            return None;
        }
        if self.duration <= f32::EPSILON {
            return Some(self.to);
        }

        let progress = active / self.duration;
        let t = match self.repeat {
            Repeat::Once => progress.min(1.0),
            Repeat::YoyoForever => {
                let cycle = progress.floor();
                let frac = progress - cycle;
                if (cycle as u64) % 2 == 0 {
                    frac
                } else {
                    1.0 - frac
                }
            }
        };

        Some(self.from.lerp(self.to, self.easing.apply(t)))
    }

    fn is_finished(&self) -> bool {
        self.repeat == Repeat::Once && self.elapsed >= self.delay + self.duration
    }
}

/// Output of one [`Timeline::advance`] call.
#[derive(Debug, Default)]
pub struct TimelineStep {
    pub samples: Vec<(TweenKey, TweenValue)>,
    pub completed: Vec<TweenEvent>,
}

#[derive(Debug, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `tween`, replacing any running tween with the same key.
    pub fn start(&mut self, tween: Tween) {
        self.cancel(tween.key);
        self.tweens.push(tween);
    }

    /// Drops the tween for `key`. Its completion event is never reported.
    pub fn cancel(&mut self, key: TweenKey) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|tween| tween.key != key);
        self.tweens.len() != before
    }

    pub fn is_active(&self, key: TweenKey) -> bool {
        self.tweens.iter().any(|tween| tween.key == key)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    /// Advances every tween by `dt` seconds.
    ///
    /// Finished tweens emit their end value exactly once before being removed.
    pub fn advance(&mut self, dt: f32) -> TimelineStep {
        let mut step = TimelineStep::default();

        for tween in self.tweens.iter_mut() {
            tween.elapsed += dt.max(0.0);
            if let Some(value) = tween.sample() {
                step.samples.push((tween.key, value));
            }
        }

        self.tweens.retain(|tween| {
            if tween.is_finished() {
                if let Some(event) = tween.on_complete {
                    step.completed.push(event);
                }
                false
            } else {
                true
            }
        });

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_key() -> TweenKey {
        TweenKey::new(TweenTarget::Fragment(2), TweenProperty::EmissiveIntensity)
    }

    fn scalar_for(step: &TimelineStep, key: TweenKey) -> Option<f32> {
        step.samples
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_scalar())
    }

    #[test]
    fn once_tween_lands_on_end_value_and_completes() {
        let mut timeline = Timeline::new();
        timeline.start(
            Tween::new(level_key(), TweenValue::Scalar(0.0), TweenValue::Scalar(2.0), 1.0)
                .on_complete(TweenEvent::FlightLanded(3)),
        );

        let half = timeline.advance(0.5);
        assert_eq!(scalar_for(&half, level_key()), Some(1.0));
        assert!(half.completed.is_empty());

        let end = timeline.advance(0.75);
        assert_eq!(scalar_for(&end, level_key()), Some(2.0));
        assert_eq!(end.completed, vec![TweenEvent::FlightLanded(3)]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn delay_holds_back_samples() {
        let mut timeline = Timeline::new();
        timeline.start(
            Tween::new(level_key(), TweenValue::Scalar(0.0), TweenValue::Scalar(1.0), 1.0)
                .with_delay(0.2),
        );
        let step = timeline.advance(0.1);
        assert!(step.samples.is_empty());
        let step = timeline.advance(0.2);
        assert!(scalar_for(&step, level_key()).is_some());
    }

    #[test]
    fn overwrite_suppresses_earlier_completion() {
        let mut timeline = Timeline::new();
        timeline.start(
            Tween::new(level_key(), TweenValue::Scalar(0.0), TweenValue::Scalar(1.0), 0.5)
                .on_complete(TweenEvent::FlightLanded(1)),
        );
        timeline.advance(0.25);
        timeline.start(
            Tween::new(level_key(), TweenValue::Scalar(0.5), TweenValue::Scalar(0.0), 0.5)
                .on_complete(TweenEvent::FlightLanded(2)),
        );
        assert_eq!(timeline.len(), 1);

        let mut completed = Vec::new();
        for _ in 0..10 {
            completed.extend(timeline.advance(0.1).completed);
        }
        assert_eq!(completed, vec![TweenEvent::FlightLanded(2)]);
    }

    #[test]
    fn yoyo_never_completes_and_swings_back() {
        let key = TweenKey::new(TweenTarget::Fragment(0), TweenProperty::Jitter);
        let mut timeline = Timeline::new();
        timeline.start(
            Tween::new(
                key,
                TweenValue::Vec3(Vector3::new(0.0, 0.0, 0.0)),
                TweenValue::Vec3(Vector3::new(1.0, 0.0, 0.0)),
                1.0,
            )
            .with_repeat(Repeat::YoyoForever),
        );

        let forward = timeline.advance(0.75);
        let back = timeline.advance(0.5);
        let x_forward = forward.samples[0].1.as_vec3().map(|v| v.x).unwrap_or_default();
        let x_back = back.samples[0].1.as_vec3().map(|v| v.x).unwrap_or_default();
        assert!((x_forward - 0.75).abs() < 1e-5);
        assert!((x_back - 0.75).abs() < 1e-5);

        for _ in 0..100 {
            assert!(timeline.advance(0.37).completed.is_empty());
        }
        assert!(timeline.is_active(key));
    }

    #[test]
    fn cancel_and_clear() {
        let mut timeline = Timeline::new();
        timeline.start(Tween::new(
            level_key(),
            TweenValue::Scalar(0.0),
            TweenValue::Scalar(1.0),
            1.0,
        ));
        assert!(timeline.cancel(level_key()));
        assert!(!timeline.cancel(level_key()));

        timeline.start(Tween::new(
            level_key(),
            TweenValue::Scalar(0.0),
            TweenValue::Scalar(1.0),
            1.0,
        ));
        timeline.clear();
        assert!(timeline.advance(1.0).samples.is_empty());
    }
}
