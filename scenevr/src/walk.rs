use std::time::Duration;

use cgmath::{vec3, InnerSpace, Vector3};

use crate::config::WalkConfig;
use crate::rig::RigTransform;

/// Cap on a single integration step. A stalled frame (backgrounded host,
/// debugger pause) must not turn into a teleport-sized jump.
const MAX_STEP: Duration = Duration::from_millis(100);

/// Integrates the rig position along the viewer's facing direction every
/// frame while armed.
///
/// Displacement uses only the ground-plane projection of the facing
/// direction; the vertical component is discarded before normalization and
/// the rig's y coordinate is never written here.
pub struct WalkController {
    config: WalkConfig,
    armed: bool,
}

impl WalkController {
    pub fn new(config: WalkConfig) -> WalkController {
        WalkController {
            config,
            armed: false,
        }
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    pub fn toggle_armed(&mut self) {
        self.armed = !self.armed;
    }

    /// Pointer-click handler: an edge toggle, not hold-to-walk. Only
    /// effective when click toggling is configured.
    pub fn on_click(&mut self) {
        if self.config.toggle_on_click {
            self.toggle_armed();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether motion will integrate this frame. Re-evaluated every tick;
    /// the session gate can change mid-flight.
    pub fn is_running(&self, session_active: bool) -> bool {
        self.config.enabled && self.armed && (!self.config.vr_only_gate || session_active)
    }

    pub fn tick(
        &mut self,
        rig: &mut RigTransform,
        facing: Vector3<f32>,
        delta: Duration,
        session_active: bool,
    ) {
        if !self.is_running(session_active) {
            return;
        }

        let dt = delta.min(MAX_STEP).as_secs_f32();
        let forward = ground_forward(facing);
        rig.position.x += forward.x * self.config.speed * dt;
        rig.position.z += forward.z * self.config.speed * dt;
    }
}

/// Project the facing direction onto the ground plane and renormalize.
/// A degenerate projection (viewer facing straight up or down) falls back
/// to the default forward axis.
fn ground_forward(facing: Vector3<f32>) -> Vector3<f32> {
    let flat = vec3(facing.x, 0.0, facing.z);
    if flat.magnitude2() <= f32::EPSILON {
        vec3(0.0, 0.0, -1.0)
    } else {
        flat.normalize()
    }
}
