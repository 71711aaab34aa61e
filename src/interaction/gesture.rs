//! Pointer gesture disambiguation: a press either stays a click or commits to
//! a drag once it travels past the threshold.

/// Where the current pointer gesture stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Button down, not yet far enough to be a drag.
    Pending { start: (f32, f32), last: (f32, f32) },
    Dragging { last: (f32, f32) },
}

/// What a pointer event resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Nothing to act on yet.
    None,
    /// Pixel delta since the previous drag sample.
    Drag { dx: f32, dy: f32 },
    /// Button released without dragging.
    Click { x: f32, y: f32 },
    /// Pointer moved with no button held.
    Hover { x: f32, y: f32 },
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    threshold: f32,
}

impl GestureTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: GestureState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.state = GestureState::Pending {
            start: (x, y),
            last: (x, y),
        };
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Gesture {
        match self.state {
            GestureState::Idle => Gesture::Hover { x, y },
            GestureState::Pending { start, last } => {
                let moved_x = (x - start.0).abs();
                let moved_y = (y - start.1).abs();
                if moved_x > self.threshold || moved_y > self.threshold {
                    self.state = GestureState::Dragging { last: (x, y) };
                    log::debug!("Drag committed after ({:.1}, {:.1}) px", moved_x, moved_y);
                    Gesture::Drag {
                        dx: x - last.0,
                        dy: y - last.1,
                    }
                } else {
                    self.state = GestureState::Pending {
                        start,
                        last: (x, y),
                    };
                    Gesture::None
                }
            }
            GestureState::Dragging { last } => {
                self.state = GestureState::Dragging { last: (x, y) };
                Gesture::Drag {
                    dx: x - last.0,
                    dy: y - last.1,
                }
            }
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Gesture {
        let previous = std::mem::replace(&mut self.state, GestureState::Idle);
        match previous {
            GestureState::Pending { .. } => Gesture::Click { x, y },
            GestureState::Idle | GestureState::Dragging { .. } => Gesture::None,
        }
    }

    /// Abandons the gesture without a click.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut tracker = GestureTracker::new(2.0);
        tracker.pointer_down(100.0, 100.0);
        assert_eq!(tracker.pointer_move(101.5, 98.0), Gesture::None);
        assert_eq!(tracker.pointer_move(102.0, 102.0), Gesture::None);
        assert_eq!(tracker.pointer_up(102.0, 102.0), Gesture::Click { x: 102.0, y: 102.0 });
        assert_eq!(tracker.state(), GestureState::Idle);
    }

    #[test]
    fn passing_threshold_commits_to_drag() {
        let mut tracker = GestureTracker::new(2.0);
        tracker.pointer_down(10.0, 10.0);
        assert_eq!(tracker.pointer_move(11.0, 10.0), Gesture::None);
        assert_eq!(tracker.pointer_move(13.0, 10.0), Gesture::Drag { dx: 2.0, dy: 0.0 });
        assert!(tracker.is_dragging());
        assert_eq!(tracker.pointer_move(13.0, 5.0), Gesture::Drag { dx: 0.0, dy: -5.0 });
        assert_eq!(tracker.pointer_up(13.0, 5.0), Gesture::None);
    }

    #[test]
    fn moves_without_button_hover() {
        let mut tracker = GestureTracker::new(2.0);
        assert_eq!(tracker.pointer_move(5.0, 6.0), Gesture::Hover { x: 5.0, y: 6.0 });
        assert_eq!(tracker.pointer_up(5.0, 6.0), Gesture::None);
    }

    #[test]
    fn cancel_drops_pending_click() {
        let mut tracker = GestureTracker::new(2.0);
        tracker.pointer_down(1.0, 1.0);
        tracker.cancel();
        assert_eq!(tracker.pointer_up(1.0, 1.0), Gesture::None);
    }
}
