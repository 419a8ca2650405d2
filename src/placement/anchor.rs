use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};

use super::pose::Pose;
use crate::camera::convert_matrix4_to_array;
use crate::config::ScaleRange;

/// The single placed object of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub pose: Pose,
    pub is_placed: bool,
}

/// Owner of the session's one [`Anchor`].
///
/// Every operation targets the same anchor; placing again moves it. Scale always
/// stays inside the configured range and rotation stays finite.
#[derive(Debug, Clone)]
pub struct AnchorManager {
    anchor: Anchor,
    scale_range: ScaleRange,
}

impl AnchorManager {
    pub fn new(scale_range: ScaleRange) -> Self {
        Self {
            anchor: Anchor {
                pose: Self::default_pose(scale_range),
                is_placed: false,
            },
            scale_range,
        }
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn pose(&self) -> &Pose {
        &self.anchor.pose
    }

    pub fn is_placed(&self) -> bool {
        self.anchor.is_placed
    }

    pub fn scale(&self) -> f32 {
        self.anchor.pose.scale
    }

    pub fn scale_range(&self) -> ScaleRange {
        self.scale_range
    }

    /// Place the anchor, or move it if already placed. Position and rotation come
    /// from `pose`; the current scale is kept. Non-finite poses are rejected and
    /// return false.
    pub fn place_or_move(&mut self, pose: Pose) -> bool {
        if !pose.is_finite() {
            log::warn!("rejecting non-finite placement pose {pose:?}");
            return false;
        }
        let p = pose.position;
        if self.anchor.is_placed {
            log::info!("anchor moved to ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        } else {
            log::info!("anchor placed at ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        }
        self.anchor.pose.position = pose.position;
        self.anchor.pose.rotation = pose.rotation.normalize();
        self.anchor.is_placed = true;
        true
    }

    /// Set the absolute scale, clamped into range. NaN is ignored.
    pub fn apply_scale(&mut self, scale: f32) {
        if scale.is_nan() {
            log::warn!("ignoring NaN scale");
            return;
        }
        self.anchor.pose.scale = self.scale_range.clamp(scale);
    }

    /// Turn the anchor about world up by `delta_degrees`
    pub fn apply_rotation_delta(&mut self, delta_degrees: f32) {
        if !delta_degrees.is_finite() {
            log::warn!("ignoring non-finite rotation delta {delta_degrees}");
            return;
        }
        let turned =
            (Quaternion::from_angle_y(Deg(delta_degrees)) * self.anchor.pose.rotation).normalize();
        let candidate = Pose {
            rotation: turned,
            ..self.anchor.pose
        };
        if candidate.is_finite() {
            self.anchor.pose = candidate;
        }
    }

    /// Un-place the anchor and restore the default pose
    pub fn reset(&mut self) {
        if self.anchor.is_placed {
            log::info!("anchor reset");
        }
        self.anchor = Anchor {
            pose: Self::default_pose(self.scale_range),
            is_placed: false,
        };
    }

    /// Renderer-facing form of the anchor
    pub fn uniform(&self) -> AnchorUniform {
        AnchorUniform {
            model: convert_matrix4_to_array(self.anchor.pose.transform_matrix()),
            placed: [
                if self.anchor.is_placed { 1.0 } else { 0.0 },
                self.anchor.pose.scale,
                0.0,
                0.0,
            ],
        }
    }

    fn default_pose(scale_range: ScaleRange) -> Pose {
        let mut pose = Pose::default();
        pose.scale = scale_range.clamp(pose.scale);
        pose
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct AnchorUniform {
    /// Model matrix of the placed object.
    pub model: [[f32; 4]; 4],

    /// x: 1.0 when placed, y: uniform scale; zw pad to 16 bytes.
    pub placed: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{One, Rotation, Vector3};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn placed_manager() -> AnchorManager {
        let mut manager = AnchorManager::new(ScaleRange::new(0.5, 2.0));
        manager.place_or_move(Pose::at(Vector3::new(1.0, 0.0, 2.0)));
        manager
    }

    #[test]
    fn test_starts_unplaced_with_default_pose() {
        let manager = AnchorManager::new(ScaleRange::default());
        assert!(!manager.is_placed());
        assert_eq!(*manager.pose(), Pose::default());
    }

    #[test]
    fn test_replacement_moves_same_anchor_and_keeps_scale() {
        let mut manager = placed_manager();
        manager.apply_scale(1.7);
        assert!(manager.place_or_move(Pose::at(Vector3::new(-3.0, 0.0, 0.5))));
        assert!(manager.is_placed());
        assert_eq!(manager.pose().position, Vector3::new(-3.0, 0.0, 0.5));
        assert_eq!(manager.scale(), 1.7);
    }

    #[test]
    fn test_non_finite_placement_rejected() {
        let mut manager = placed_manager();
        assert!(!manager.place_or_move(Pose::at(Vector3::new(f32::INFINITY, 0.0, 0.0))));
        assert_eq!(manager.pose().position, Vector3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_apply_scale_matches_clamped_product() {
        let range = ScaleRange::new(0.5, 2.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let initial: f32 = rng.random_range(0.5..2.0);
            let ratio: f32 = match rng.random_range(0..4) {
                0 => f32::MIN_POSITIVE,
                1 => 1.0,
                2 => 1e30,
                _ => rng.random_range(0.01..10.0),
            };
            let mut manager = AnchorManager::new(range);
            manager.apply_scale(initial);
            manager.apply_scale(manager.scale() * ratio);
            assert_eq!(manager.scale(), (initial * ratio).clamp(0.5, 2.0));
            assert!(range.contains(manager.scale()));
        }
    }

    #[test]
    fn test_nan_inputs_do_not_propagate() {
        let mut manager = placed_manager();
        manager.apply_scale(f32::NAN);
        manager.apply_rotation_delta(f32::NAN);
        manager.apply_rotation_delta(f32::INFINITY);
        assert_eq!(manager.scale(), 1.0);
        assert!(manager.pose().is_finite());
    }

    #[test]
    fn test_rotation_delta_turns_about_up() {
        let mut manager = placed_manager();
        for _ in 0..9 {
            manager.apply_rotation_delta(10.0);
        }
        let facing = manager.pose().rotation.rotate_vector(Vector3::unit_x());
        assert!((facing - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_reset_restores_default() {
        let mut manager = placed_manager();
        manager.apply_scale(1.5);
        manager.apply_rotation_delta(45.0);
        manager.reset();
        assert!(!manager.is_placed());
        assert_eq!(manager.pose().scale, 1.0);
        assert_eq!(manager.pose().rotation, Quaternion::one());
        assert_eq!(manager.uniform().placed[0], 0.0);
    }

    #[test]
    fn test_default_scale_respects_range() {
        let manager = AnchorManager::new(ScaleRange::new(1.5, 3.0));
        assert_eq!(manager.scale(), 1.5);
    }
}
