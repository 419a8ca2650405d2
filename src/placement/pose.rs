use cgmath::{InnerSpace, Matrix4, One, Quaternion, Vector3, Zero};

/// Position, orientation and uniform scale of a placed object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

impl Default for Pose {
    /// Origin, upright, unit scale
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: 1.0,
        }
    }
}

impl Pose {
    /// Upright pose at `position` with unit scale
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn is_finite(&self) -> bool {
        let p = self.position;
        let q = self.rotation;
        p.x.is_finite()
            && p.y.is_finite()
            && p.z.is_finite()
            && q.s.is_finite()
            && q.v.x.is_finite()
            && q.v.y.is_finite()
            && q.v.z.is_finite()
            && q.magnitude2() > 0.0
            && self.scale.is_finite()
    }

    /// Model matrix: translate * rotate * scale
    pub fn transform_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_scale(self.scale)
    }
}
