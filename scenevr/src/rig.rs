use cgmath::{vec3, Deg, Quaternion, Rotation, Rotation3, Vector3};
use engine::input::Head;

/// The viewer's movable anchor in world space.
///
/// Exactly one rig exists per scene session. Position is written by the
/// teleport and walk controllers, yaw by the snap-turn controller; pitch
/// and roll are carried for downstream rendering but never touched here.
#[derive(Clone, Copy, Debug)]
pub struct RigTransform {
    pub position: Vector3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub roll: Deg<f32>,
}

impl RigTransform {
    pub fn new() -> RigTransform {
        RigTransform::at(vec3(0.0, 0.0, 0.0))
    }

    pub fn at(position: Vector3<f32>) -> RigTransform {
        RigTransform {
            position,
            yaw: Deg(0.0),
            pitch: Deg(0.0),
            roll: Deg(0.0),
        }
    }

    /// World-space view direction: rig yaw composed with the tracked head
    /// rotation, applied to the forward axis.
    pub fn facing(&self, head: &Head) -> Vector3<f32> {
        let yaw_rotation = Quaternion::from_angle_y(self.yaw);
        (yaw_rotation * head.rotation).rotate_vector(vec3(0.0, 0.0, -1.0))
    }
}

impl Default for RigTransform {
    fn default() -> Self {
        RigTransform::new()
    }
}
