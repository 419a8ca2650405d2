use cgmath::{Quaternion, Rad, Rotation3, Vector3, VectorSpace};

use super::pose::Pose;
use crate::camera::CameraPose;
use crate::config::PlacementConfig;

/// Placement preview that hovers just above the surface under the screen centre
/// while nothing is placed.
#[derive(Debug, Clone)]
pub struct PlacementReticle {
    config: PlacementConfig,
    pose: Option<Pose>,
}

impl PlacementReticle {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config, pose: None }
    }

    /// Current displayed pose, `None` while hidden
    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn hide(&mut self) {
        self.pose = None;
    }

    /// Ease toward `surface` (the latest centre-screen placement pose) and turn to
    /// face the camera. With no surface this tick the reticle holds its last pose.
    pub fn update(&mut self, surface: Option<&Pose>, camera: &CameraPose, dt: f32) -> Option<&Pose> {
        let Some(surface) = surface else {
            return self.pose.as_ref();
        };
        let goal = surface.position + Vector3::new(0.0, self.config.reticle_height, 0.0);

        let (position, previous_rotation) = match self.pose {
            Some(current) => {
                let amount = (dt * self.config.reticle_follow_speed).clamp(0.0, 1.0);
                let amount = if amount.is_finite() { amount } else { 1.0 };
                (current.position.lerp(goal, amount), current.rotation)
            }
            None => (goal, Quaternion::new(1.0, 0.0, 0.0, 0.0)),
        };

        let to_camera = camera.position - position;
        let rotation = if to_camera.x.abs() > 1e-6 || to_camera.z.abs() > 1e-6 {
            Quaternion::from_angle_y(Rad(to_camera.x.atan2(to_camera.z)))
        } else {
            previous_rotation
        };

        self.pose = Some(Pose {
            position,
            rotation,
            scale: 1.0,
        });
        self.pose.as_ref()
    }
}
