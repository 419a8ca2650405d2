use cgmath::{Matrix4, SquareMatrix, Vector3};

/// Remaps OpenGL clip depth (-1..1) to the 0..1 range wgpu and Metal expect.
///
/// `Matrix4::new` takes columns, so the 0.5 translation sits in the last one.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera: Sized {
    /// World-space eye position
    fn eye(&self) -> Vector3<f32>;

    /// Projection times view, OpenGL clip conventions
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;

    fn build_wgpu_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.build_view_projection_matrix()
    }

    fn uniform(&self) -> CameraUniform {
        let eye = self.eye();
        CameraUniform {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view_proj: convert_matrix4_to_array(self.build_wgpu_view_projection_matrix()),
        }
    }
}

/// Camera block handed to the host renderer each frame
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// Eye position; w is 1 to keep the 16 byte alignment.
    pub view_position: [f32; 4],

    /// View projection with 0..1 depth.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0, 0.0, 0.0, 1.0],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

/// Column-major array layout for GPU upload
pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
