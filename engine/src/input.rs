use std::time::Duration;

use cgmath::{Quaternion, Vector3};

/// Head-tracking state sampled once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Head {
    pub rotation: Quaternion<f32>,
}

impl Default for Head {
    fn default() -> Self {
        Head {
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Continuous input state for one frame. Discrete events travel separately
/// as [`InputEvent`] values so edge semantics survive frame batching.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputContext {
    pub head: Head,
}

/// A discrete input occurrence, dispatched in host order within a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Primary pointer click (controller trigger or screen tap).
    Click,
    /// Turn key transitioned into pressed. The host filters auto-repeat;
    /// `direction` is -1 for left, +1 for right.
    KeyTurn { direction: i8 },
    /// Thumbstick x-axis sample. Level-triggered; delivered at the host's
    /// event cadence.
    TurnAxis { x: f32 },
    /// Pointer selected a navigation target. Target data is untrusted
    /// boundary input and may contain non-finite components.
    Teleport {
        target: Vector3<f32>,
        duration: Duration,
    },
}
