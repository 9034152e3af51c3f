use std::time::Duration;

use cgmath::Vector3;
use tracing::debug;

use crate::rig::RigTransform;

/// One in-flight eased move, tagged with the generation that issued it.
#[derive(Clone, Copy, Debug)]
struct TeleportAnim {
    from: Vector3<f32>,
    to: Vector3<f32>,
    start: Duration,
    duration: Duration,
    generation: u64,
}

/// Animates the rig position toward a requested target over wall-clock
/// time with quadratic ease-in-out.
///
/// Progress is computed from the frame clock's total time, not from frame
/// deltas, so an irregular frame cadence stretches the animation's steps
/// but never its overall duration. A new request supersedes any animation
/// in flight: the controller's generation counter advances and a stale
/// animation is discarded before it can write.
pub struct TeleportController {
    anim: Option<TeleportAnim>,
    generation: u64,
}

impl TeleportController {
    pub fn new() -> TeleportController {
        TeleportController {
            anim: None,
            generation: 0,
        }
    }

    /// Begin a move toward `target`. Non-finite target components are
    /// untrusted boundary data: the request is dropped without touching
    /// any state. A zero duration assigns the position immediately.
    pub fn request_teleport(
        &mut self,
        rig: &mut RigTransform,
        target: Vector3<f32>,
        duration: Duration,
        now: Duration,
    ) {
        if !target.x.is_finite() || !target.y.is_finite() || !target.z.is_finite() {
            debug!(?target, "ignoring teleport request with non-finite target");
            return;
        }

        // Invalidate whatever was in flight before anything else happens.
        self.generation += 1;

        if duration.is_zero() {
            self.anim = None;
            rig.position = target;
            return;
        }

        self.anim = Some(TeleportAnim {
            from: rig.position,
            to: target,
            start: now,
            duration,
            generation: self.generation,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    /// Advance the active animation. Returns whether the rig position was
    /// written this frame; a settled or superseded animation writes nothing
    /// and retires.
    pub fn tick(&mut self, rig: &mut RigTransform, now: Duration) -> bool {
        let Some(anim) = self.anim else {
            return false;
        };

        if anim.generation != self.generation {
            // Superseded after scheduling; the stale write must never land.
            self.anim = None;
            return false;
        }

        let k = ((now.as_secs_f32() - anim.start.as_secs_f32()) / anim.duration.as_secs_f32())
            .clamp(0.0, 1.0);
        let eased = ease_in_out_quad(k);
        rig.position = anim.from + (anim.to - anim.from) * eased;

        if k >= 1.0 {
            self.anim = None;
        }
        true
    }
}

impl Default for TeleportController {
    fn default() -> Self {
        TeleportController::new()
    }
}

fn ease_in_out_quad(k: f32) -> f32 {
    if k < 0.5 {
        2.0 * k * k
    } else {
        1.0 - (-2.0 * k + 2.0).powi(2) / 2.0
    }
}
