//! Animated scene lights: the magenta fill light sways, the rim light flickers.

use crate::gfx::scene::Scene;

use super::traits::{Animated, FrameTime};

const FILL_BASE: (f32, f32) = (-5.0, 2.0);
const RIM_BASE_INTENSITY: f32 = 1.5;

#[derive(Debug, Default)]
pub struct LightRig;

impl LightRig {
    /// Applies the fixed light ranges.
    pub fn install(scene: &mut Scene) -> Self {
        let lighting = &mut scene.lighting;
        lighting.key.range = 30.0;
        lighting.fill.range = 30.0;
        lighting.rim.range = 40.0;
        Self
    }
}

impl Animated for LightRig {
    fn name(&self) -> &str {
        "lights"
    }

    fn animate(&mut self, time: FrameTime, scene: &mut Scene) {
        let t = time.elapsed;
        let lighting = &mut scene.lighting;
        lighting.fill.position.x = FILL_BASE.0 + (t * 0.5).sin() * 1.5;
        lighting.fill.position.y = FILL_BASE.1 + (t * 0.3).cos() * 0.5;
        lighting.rim.intensity = RIM_BASE_INTENSITY + (t * 2.0).sin() * 0.3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_sways_and_rim_flickers() {
        let mut scene = Scene::new();
        let mut rig = LightRig::install(&mut scene);
        rig.animate(FrameTime::new(0.0, 0.0), &mut scene);
        assert_eq!(scene.lighting.fill.position.x, -5.0);
        assert_eq!(scene.lighting.fill.position.y, 2.5);
        assert_eq!(scene.lighting.rim.intensity, 1.5);
        assert_eq!(scene.lighting.rim.range, 40.0);

        rig.animate(FrameTime::new(0.1, std::f32::consts::PI), &mut scene);
        assert!((scene.lighting.fill.position.x - (-3.5)).abs() < 1e-5);
    }
}
