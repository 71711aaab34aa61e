//! Per-frame timing.
//!
//! [`FrameScheduler`] turns a monotonic clock into clamped frame deltas and
//! stops handing out ticks once it has been stopped.

use std::time::Instant;

use crate::simulation::FrameTime;

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    max_dt: f32,
    last: Option<Instant>,
    elapsed: f32,
    frames: u64,
    stopped: bool,
}

impl FrameScheduler {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt: max_dt.max(0.0),
            last: None,
            elapsed: 0.0,
            frames: 0,
            stopped: false,
        }
    }

    /// Reads the clock and returns the next tick. The first tick has `dt = 0`.
    pub fn next(&mut self) -> Option<FrameTime> {
        self.next_at(Instant::now())
    }

    pub fn next_at(&mut self, now: Instant) -> Option<FrameTime> {
        if self.stopped {
            return None;
        }
        let raw = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        self.advance(raw)
    }

    /// Advances by an externally measured delta, clamped to `[0, max_dt]`.
    pub fn advance(&mut self, raw_dt: f32) -> Option<FrameTime> {
        if self.stopped {
            return None;
        }
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.frames += 1;
        Some(FrameTime::new(dt, self.elapsed))
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
