//! Scripted animation: easing curves and the tween timeline.

pub mod easing;
pub mod timeline;

pub use easing::Easing;
pub use timeline::{
    Repeat, Timeline, TimelineStep, Tween, TweenEvent, TweenKey, TweenProperty, TweenTarget,
    TweenValue,
};
