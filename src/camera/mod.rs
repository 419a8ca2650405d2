pub mod camera_pose;
pub mod camera_utils;

// Re-export main types
pub use camera_pose::CameraPose;
pub use camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
