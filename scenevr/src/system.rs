use std::time::Duration;

use cgmath::Vector3;
use engine::input::{InputContext, InputEvent};
use engine::time::Time;

use crate::config::SceneOptions;
use crate::rig::RigTransform;
use crate::snap_turn::SnapTurnController;
use crate::teleport::TeleportController;
use crate::walk::WalkController;

/// One frame's worth of locomotion.
///
/// Owns the rig and its three controllers and enforces the write-ordering
/// rule: teleport, while in flight, is the sole writer of position for the
/// frame and walk integration is skipped. Snap turn touches only yaw and
/// is order-independent of the other two.
pub struct RigSystems {
    rig: RigTransform,
    teleport: TeleportController,
    walk: WalkController,
    snap_turn: SnapTurnController,
}

impl RigSystems {
    pub fn new(options: &SceneOptions) -> RigSystems {
        RigSystems {
            rig: RigTransform::new(),
            teleport: TeleportController::new(),
            walk: WalkController::new(options.walk.clone()),
            snap_turn: SnapTurnController::new(options.snap_turn.clone()),
        }
    }

    pub fn rig(&self) -> &RigTransform {
        &self.rig
    }

    pub fn walk(&self) -> &WalkController {
        &self.walk
    }

    pub fn is_teleporting(&self) -> bool {
        self.teleport.is_animating()
    }

    pub fn request_teleport(&mut self, target: Vector3<f32>, duration: Duration, now: Duration) {
        self.teleport
            .request_teleport(&mut self.rig, target, duration, now);
    }

    /// Drain this frame's events in host dispatch order, then integrate.
    pub fn update(
        &mut self,
        time: &Time,
        input: &InputContext,
        events: &[InputEvent],
        session_active: bool,
    ) {
        for event in events {
            match *event {
                InputEvent::Click => self.walk.on_click(),
                InputEvent::KeyTurn { direction } => {
                    self.snap_turn.on_key_edge(&mut self.rig, direction, time.total);
                }
                InputEvent::TurnAxis { x } => {
                    self.snap_turn.on_axis(&mut self.rig, x, time.total);
                }
                InputEvent::Teleport { target, duration } => {
                    self.teleport
                        .request_teleport(&mut self.rig, target, duration, time.total);
                }
            }
        }

        let wrote_position = self.teleport.tick(&mut self.rig, time.total);
        if !wrote_position {
            let facing = self.rig.facing(&input.head);
            self.walk.tick(&mut self.rig, facing, time.elapsed, session_active);
        }
    }
}
