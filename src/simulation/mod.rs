//! Self-animating scene components
//!
//! The procedural tunnel, both particle fields, the beacon ornament and the
//! light rig. Each implements [`Animated`]; the ones that draw billboards also
//! implement [`SpriteEmitter`].

pub mod embers;
pub mod godhead;
pub mod lights;
pub mod starfield;
pub mod traits;
pub mod tunnel;

pub use embers::EmberField;
pub use godhead::Godhead;
pub use lights::LightRig;
pub use starfield::Starfield;
pub use traits::{Animated, FrameTime, SpriteEmitter};
pub use tunnel::{Ring, Tunnel};
