use super::camera_utils::Camera;
use cgmath::*;

/// Camera position, orientation and projection supplied by the platform each tick.
///
/// `rotation` maps camera space to world space; the camera looks down its local
/// -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for CameraPose {
    fn eye(&self) -> Vector3<f32> {
        self.position
    }

    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vector3::zero(), Quaternion::one())
    }
}

impl CameraPose {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        Self {
            position,
            rotation,
            fovy: Rad::from(Deg(60.0_f32)),
            aspect: 1.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Camera at `eye` looking toward `target`.
    ///
    /// When the view direction is parallel to `up`, world +Z (or +X) is used as
    /// the up hint instead.
    pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Self {
        let forward = (target - eye).normalize();
        let mut right = forward.cross(up);
        if right.magnitude2() < 1e-12 {
            let hint = if forward.cross(Vector3::unit_z()).magnitude2() > 1e-12 {
                Vector3::unit_z()
            } else {
                Vector3::unit_x()
            };
            right = forward.cross(hint);
        }
        let right = right.normalize();
        let true_up = right.cross(forward).normalize();
        let basis = Matrix3::from_cols(right, true_up, -forward);
        Self::new(eye, Quaternion::from(basis).normalize())
    }

    pub fn with_fovy(mut self, fovy: impl Into<Rad<f32>>) -> Self {
        self.fovy = fovy.into();
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_clip(mut self, znear: f32, zfar: f32) -> Self {
        self.znear = znear;
        self.zfar = zfar;
        self
    }

    /// Unit view direction in world space
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(-Vector3::unit_z())
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation.conjugate()) * Matrix4::from_translation(-self.position)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.position.z.is_finite()
            && self.rotation.s.is_finite()
            && self.rotation.v.x.is_finite()
            && self.rotation.v.y.is_finite()
            && self.rotation.v.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_look_at_forward() {
        let camera = CameraPose::look_at(
            Vector3::new(0.0, 5.0, 5.0),
            Vector3::zero(),
            Vector3::unit_y(),
        );
        let expected = Vector3::new(0.0, -1.0, -1.0).normalize();
        assert!(close(camera.forward(), expected));
    }

    #[test]
    fn test_view_matrix_matches_look_at_rh() {
        let eye = Vector3::new(4.5, 3.2, 4.5);
        let camera = CameraPose::look_at(eye, Vector3::zero(), Vector3::unit_y());
        let reference = Matrix4::look_at_rh(
            Point3::from_vec(eye),
            Point3::origin(),
            Vector3::unit_y(),
        );
        let view = camera.view_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert!((view[col][row] - reference[col][row]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_look_straight_down_stays_finite() {
        let camera = CameraPose::look_at(
            Vector3::new(0.0, 3.0, 0.0),
            Vector3::zero(),
            Vector3::unit_y(),
        );
        assert!(camera.is_finite());
        assert!(close(camera.forward(), -Vector3::unit_y()));
    }
}
