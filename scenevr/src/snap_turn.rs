use std::time::Duration;

use cgmath::Deg;

use crate::config::SnapTurnConfig;
use crate::rig::RigTransform;

/// Thumbstick deflection beyond which an axis sample triggers a turn.
const AXIS_THRESHOLD: f32 = 0.8;

/// Applies discrete yaw increments on edge-triggered input, debounced by a
/// cooldown window.
///
/// Key input is edge-triggered (press transitions only); axis input is
/// level-triggered at the host's event cadence, so the cooldown is what
/// prevents runaway repetition. Only yaw is written; pitch and roll are
/// untouched.
pub struct SnapTurnController {
    config: SnapTurnConfig,
    cooldown_until: Duration,
}

impl SnapTurnController {
    pub fn new(config: SnapTurnConfig) -> SnapTurnController {
        SnapTurnController {
            config,
            cooldown_until: Duration::ZERO,
        }
    }

    /// Turn key transitioned into pressed; auto-repeat is the caller's
    /// problem. `direction` is -1 or +1.
    pub fn on_key_edge(&mut self, rig: &mut RigTransform, direction: i8, now: Duration) {
        self.trigger(rig, direction, now);
    }

    /// Thumbstick sample. Deflections inside the threshold band produce no
    /// trigger.
    pub fn on_axis(&mut self, rig: &mut RigTransform, x: f32, now: Duration) {
        if x > AXIS_THRESHOLD {
            self.trigger(rig, 1, now);
        } else if x < -AXIS_THRESHOLD {
            self.trigger(rig, -1, now);
        }
    }

    fn trigger(&mut self, rig: &mut RigTransform, direction: i8, now: Duration) {
        if direction == 0 || now < self.cooldown_until {
            return;
        }
        let step = self.config.snap_angle * f32::from(direction.signum());
        rig.yaw = Deg((rig.yaw.0 + step).rem_euclid(360.0));
        self.cooldown_until = now + self.config.cooldown();
    }
}

/// Comfort vignette shown only while the immersive session is active.
/// Derived view over session state, no owned input handling.
#[derive(Debug, Default)]
pub struct TurnVignette {
    visible: bool,
}

impl TurnVignette {
    pub fn on_session_change(&mut self, session_active: bool) {
        self.visible = session_active;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
