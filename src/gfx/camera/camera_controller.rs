use cgmath::Vector3;

use crate::animation::{
    Easing, Timeline, Tween, TweenEvent, TweenKey, TweenProperty, TweenTarget, TweenValue,
};

use super::tunnel_camera::TunnelCamera;

/// Key the controller listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    /// Deeper into the tunnel (toward -Z).
    Forward,
    Backward,
}

/// Camera offset from a fragment at the end of a flight.
pub const FLIGHT_STANDOFF: Vector3<f32> = Vector3::new(0.0, 0.0, 1.3);

const FLIGHT_KEY: TweenKey = TweenKey::new(TweenTarget::Camera, TweenProperty::Position);

#[derive(Debug, Clone)]
struct Flight {
    ticket: u64,
    look_target: Vector3<f32>,
    path: String,
}

/// Drives the camera: continuous key-held follow along Z, plus one-shot
/// scripted flights toward a fragment.
///
/// While a flight is active the follow integration is suspended; when it lands
/// the follow target is re-seeded from wherever the camera ended up.
pub struct CameraController {
    pub key_speed: f32,
    pub ease: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub flight_seconds: f32,
    target_z: f32,
    forward_held: bool,
    backward_held: bool,
    flight: Option<Flight>,
    next_ticket: u64,
}

impl CameraController {
    pub fn new(key_speed: f32, ease: f32, min_z: f32, max_z: f32, start_z: f32) -> Self {
        Self {
            key_speed,
            ease,
            min_z,
            max_z,
            flight_seconds: 0.9,
            target_z: start_z.clamp(min_z, max_z),
            forward_held: false,
            backward_held: false,
            flight: None,
            next_ticket: 0,
        }
    }

    pub fn with_flight_seconds(mut self, seconds: f32) -> Self {
        self.flight_seconds = seconds;
        self
    }

    pub fn target_z(&self) -> f32 {
        self.target_z
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn set_key(&mut self, key: MoveKey, pressed: bool) {
        match key {
            MoveKey::Forward => self.forward_held = pressed,
            MoveKey::Backward => self.backward_held = pressed,
        }
    }

    pub fn release_keys(&mut self) {
        self.forward_held = false;
        self.backward_held = false;
    }

    /// Integrates held keys into the target and eases the camera toward it.
    pub fn follow(&mut self, camera: &mut TunnelCamera, dt: f32) {
        if self.flight.is_some() {
            return;
        }

        let mut direction = 0.0;
        if self.forward_held {
            direction -= 1.0;
        }
        if self.backward_held {
            direction += 1.0;
        }

        self.target_z =
            (self.target_z + direction * self.key_speed * dt).clamp(self.min_z, self.max_z);
        camera.position.z += (self.target_z - camera.position.z) * self.ease;
    }

    /// Starts a flight to just in front of `target`, superseding any flight in
    /// progress. Returns the ticket reported when this flight lands.
    pub fn fly_to(
        &mut self,
        camera: &TunnelCamera,
        timeline: &mut Timeline,
        target: Vector3<f32>,
        path: &str,
    ) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        timeline.start(
            Tween::new(
                FLIGHT_KEY,
                TweenValue::Vec3(camera.position),
                TweenValue::Vec3(target + FLIGHT_STANDOFF),
                self.flight_seconds,
            )
            .with_easing(Easing::Power3In)
            .on_complete(TweenEvent::FlightLanded(ticket)),
        );

        if let Some(previous) = self.flight.replace(Flight {
            ticket,
            look_target: target,
            path: path.to_owned(),
        }) {
            log::debug!("flight to {} superseded", previous.path);
        }

        ticket
    }

    /// Applies a flight position sample and re-aims at the flight target.
    pub fn apply_flight_sample(&self, camera: &mut TunnelCamera, position: Vector3<f32>) {
        if let Some(flight) = &self.flight {
            camera.position = position;
            camera.look_at(flight.look_target);
        }
    }

    /// Ends the flight identified by `ticket`, restoring follow mode.
    ///
    /// Returns the destination path, or `None` for stale tickets.
    pub fn finish_flight(&mut self, camera: &TunnelCamera, ticket: u64) -> Option<String> {
        match &self.flight {
            Some(flight) if flight.ticket == ticket => {
                let flight = self.flight.take()?;
                self.target_z = camera.position.z.clamp(self.min_z, self.max_z);
                Some(flight.path)
            }
            _ => None,
        }
    }

    /// Drops any flight without reporting it and resumes following from where
    /// the camera stopped. Returns true when a flight was in progress.
    pub fn abort_flight(&mut self, camera: &TunnelCamera, timeline: &mut Timeline) -> bool {
        if self.flight.take().is_none() {
            return false;
        }
        timeline.cancel(FLIGHT_KEY);
        self.target_z = camera.position.z.clamp(self.min_z, self.max_z);
        true
    }

    pub fn is_flight_key(key: TweenKey) -> bool {
        key == FLIGHT_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn rig() -> (CameraController, TunnelCamera, Timeline) {
        let controller = CameraController::new(30.0, 0.1, -90.0, 6.0, 6.0);
        let camera = TunnelCamera::new(Vector3::new(0.0, 0.0, 6.0), 1.0);
        (controller, camera, Timeline::new())
    }

    #[test]
    fn target_stays_clamped_under_any_input() {
        let (mut controller, mut camera, _) = rig();
        let dts = [0.0, 0.016, 0.1, 0.05, 0.033, 0.1];

        controller.set_key(MoveKey::Forward, true);
        for _ in 0..500 {
            for dt in dts {
                controller.follow(&mut camera, dt);
                assert!(controller.target_z() >= -90.0 && controller.target_z() <= 6.0);
            }
        }
        assert_eq!(controller.target_z(), -90.0);

        controller.set_key(MoveKey::Forward, false);
        controller.set_key(MoveKey::Backward, true);
        for _ in 0..500 {
            controller.follow(&mut camera, 0.1);
            assert!(controller.target_z() <= 6.0);
        }
        assert_eq!(controller.target_z(), 6.0);
    }

    #[test]
    fn camera_eases_toward_target() {
        let (mut controller, mut camera, _) = rig();
        controller.set_key(MoveKey::Forward, true);
        controller.follow(&mut camera, 0.1);
        // target moved to 3.0, camera covers 10% of the gap
        assert!((controller.target_z() - 3.0).abs() < 1e-5);
        assert!((camera.position.z - 5.7).abs() < 1e-5);
    }

    #[test]
    fn follow_is_suspended_during_flight() {
        let (mut controller, mut camera, mut timeline) = rig();
        controller.fly_to(&camera, &mut timeline, Vector3::new(1.0, 0.0, -20.0), "/security");
        controller.set_key(MoveKey::Forward, true);
        controller.follow(&mut camera, 0.1);
        assert_eq!(camera.position.z, 6.0);
    }

    #[test]
    fn flight_lands_at_standoff_and_reports_path() {
        let (mut controller, mut camera, mut timeline) = rig();
        let target = Vector3::new(1.0, 0.5, -20.0);
        let ticket = controller.fly_to(&camera, &mut timeline, target, "/finance");

        let mut landed = None;
        for _ in 0..20 {
            let step = timeline.advance(0.1);
            for (key, value) in step.samples {
                if let (true, Some(position)) = (CameraController::is_flight_key(key), value.as_vec3()) {
                    controller.apply_flight_sample(&mut camera, position);
                }
            }
            for event in step.completed {
                if let TweenEvent::FlightLanded(t) = event {
                    landed = controller.finish_flight(&camera, t);
                }
            }
        }

        assert_eq!(landed.as_deref(), Some("/finance"));
        assert_eq!(ticket, 0);
        assert!((camera.position - (target + FLIGHT_STANDOFF)).magnitude() < 1e-4);
        assert!(!controller.is_flying());
        assert!((controller.target_z() - (-18.7)).abs() < 1e-4);
    }

    #[test]
    fn second_flight_supersedes_first() {
        let (mut controller, camera, mut timeline) = rig();
        let first = controller.fly_to(&camera, &mut timeline, Vector3::new(0.0, 0.0, -10.0), "/legal");
        timeline.advance(0.3);
        let second = controller.fly_to(&camera, &mut timeline, Vector3::new(0.0, 0.0, -30.0), "/archives");

        let mut paths = Vec::new();
        for _ in 0..30 {
            for event in timeline.advance(0.1).completed {
                if let TweenEvent::FlightLanded(t) = event {
                    paths.extend(controller.finish_flight(&camera, t));
                }
            }
        }
        assert_ne!(first, second);
        assert_eq!(paths, vec!["/archives".to_owned()]);
        assert!(controller.finish_flight(&camera, first).is_none());
    }

    #[test]
    fn abort_resumes_follow_from_current_position() {
        let (mut controller, mut camera, mut timeline) = rig();
        assert!(!controller.abort_flight(&camera, &mut timeline));

        controller.fly_to(&camera, &mut timeline, Vector3::new(0.0, 0.0, -20.0), "/legal");
        camera.position.z = -4.0;
        assert!(controller.abort_flight(&camera, &mut timeline));
        assert!(!controller.is_flying());
        assert_eq!(controller.target_z(), -4.0);
        assert!(timeline.advance(2.0).completed.is_empty());

        controller.follow(&mut camera, 0.016);
        assert_eq!(camera.position.z, -4.0);
    }
}
