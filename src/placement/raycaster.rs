//! # Placement Raycasting
//!
//! Resolves a tap into a world pose:
//!
//! 1. **Screen to Ray**: unproject the normalized screen point through the camera
//! 2. **Plane hits**: take the nearest externally supplied surface hit in front of the camera
//! 3. **Ground plane**: otherwise intersect the mathematical plane y = 0
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Vector3, Zero};
//! use evar::camera::CameraPose;
//! use evar::placement::PlacementRaycaster;
//!
//! let camera = CameraPose::look_at(Vector3::new(0.0, 5.0, 5.0), Vector3::zero(), Vector3::unit_y());
//! let raycaster = PlacementRaycaster::default();
//! let pose = raycaster.cast(0.5, 0.5, &camera, &[]).unwrap();
//! assert_eq!(pose.position.y, 0.0);
//! ```

use cgmath::{InnerSpace, Quaternion, SquareMatrix, Vector3, Vector4};

use super::pose::Pose;
use super::ray::Ray;
use crate::camera::{Camera, CameraPose};
use crate::config::PlacementConfig;
use crate::error::{ArError, ArResult};

/// Below this |direction.y| the ray counts as parallel to the ground plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// Platform identifier of the detected polygon a hit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolygonId(pub u64);

/// Candidate surface intersection reported by the platform's plane detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub polygon_id: PolygonId,
}

impl PlaneHit {
    pub fn new(point: Vector3<f32>, normal: Vector3<f32>, polygon_id: PolygonId) -> Self {
        Self {
            point,
            normal,
            polygon_id,
        }
    }
}

/// Stateless screen-point to world-pose resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementRaycaster {
    config: PlacementConfig,
}

impl PlacementRaycaster {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Convert normalized screen coordinates (0..1, y down) to a world-space ray
    /// starting at the camera
    pub fn screen_to_ray(
        &self,
        screen_x: f32,
        screen_y: f32,
        camera: &CameraPose,
    ) -> ArResult<Ray> {
        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = 2.0 * screen_x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y; // Flip Y axis

        let inv_view_proj = camera
            .build_view_projection_matrix()
            .invert()
            .ok_or(ArError::NoIntersection)?;

        // Transform near and far points from NDC to world space
        let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        if world_near.w.abs() < f32::EPSILON || world_far.w.abs() < f32::EPSILON {
            return Err(ArError::NoIntersection);
        }

        // Convert from homogeneous coordinates
        let near_3d = world_near.truncate() / world_near.w;
        let far_3d = world_far.truncate() / world_far.w;

        let ray = Ray::new(camera.position, far_3d - near_3d);
        if ray.is_finite() {
            Ok(ray)
        } else {
            Err(ArError::NoIntersection)
        }
    }

    /// Resolve a screen point to a placement pose.
    ///
    /// Pure function of its inputs. Returns `NoIntersection` when neither a plane
    /// hit nor the ground plane yields a finite point in front of the camera.
    pub fn cast(
        &self,
        screen_x: f32,
        screen_y: f32,
        camera: &CameraPose,
        plane_hits: &[PlaneHit],
    ) -> ArResult<Pose> {
        let ray = self.screen_to_ray(screen_x, screen_y, camera)?;

        if let Some(hit) = self.nearest_hit(&ray, plane_hits) {
            let pose = Pose::at(hit.point);
            return Ok(if self.config.align_to_plane_normal {
                pose.with_rotation(align_up_to(hit.normal))
            } else {
                pose
            });
        }
        if !plane_hits.is_empty() {
            log::debug!(
                "none of {} plane hits lie in front of the camera, using ground plane",
                plane_hits.len()
            );
        }
        self.intersect_ground(&ray)
    }

    /// Closest usable hit along the ray; the first listed wins ties
    fn nearest_hit<'a>(&self, ray: &Ray, plane_hits: &'a [PlaneHit]) -> Option<&'a PlaneHit> {
        let mut closest: Option<(f32, &'a PlaneHit)> = None;

        for hit in plane_hits {
            let p = hit.point;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                continue;
            }
            let distance = ray.distance_along(p);
            if !distance.is_finite() || distance < 0.0 {
                continue;
            }
            if closest.map_or(true, |(best, _)| distance < best) {
                closest = Some((distance, hit));
            }
        }

        closest.map(|(_, hit)| hit)
    }

    fn intersect_ground(&self, ray: &Ray) -> ArResult<Pose> {
        if ray.direction.y.abs() < PARALLEL_EPSILON {
            return Err(ArError::NoIntersection);
        }
        let t = -ray.origin.y / ray.direction.y;
        if !t.is_finite() || t < 0.0 {
            return Err(ArError::NoIntersection);
        }
        let point = ray.point_at(t);
        if !(point.x.is_finite() && point.z.is_finite()) {
            return Err(ArError::NoIntersection);
        }
        Ok(Pose::at(Vector3::new(point.x, 0.0, point.z)))
    }
}

/// Rotation taking local +Y onto `normal`; identity for unusable normals
fn align_up_to(normal: Vector3<f32>) -> Quaternion<f32> {
    let length = normal.magnitude();
    if !length.is_finite() || length < 1e-6 {
        return Quaternion::new(1.0, 0.0, 0.0, 0.0);
    }
    Quaternion::from_arc(Vector3::unit_y(), normal / length, Some(Vector3::unit_x())).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rotation, Zero};

    fn overhead_camera() -> CameraPose {
        CameraPose::look_at(
            Vector3::new(0.0, 5.0, 5.0),
            Vector3::zero(),
            Vector3::unit_y(),
        )
    }

    fn hit(x: f32, y: f32, z: f32, id: u64) -> PlaneHit {
        PlaneHit::new(Vector3::new(x, y, z), Vector3::unit_y(), PolygonId(id))
    }

    #[test]
    fn test_center_tap_hits_origin() {
        let pose = PlacementRaycaster::default()
            .cast(0.5, 0.5, &overhead_camera(), &[])
            .unwrap();
        assert_eq!(pose.position.y, 0.0);
        assert!(pose.position.x.abs() < 1e-4);
        assert!(pose.position.z.abs() < 1e-4);
        assert_eq!(pose.scale, 1.0);
    }

    #[test]
    fn test_cast_is_pure() {
        let raycaster = PlacementRaycaster::default();
        let camera = overhead_camera();
        let hits = [hit(0.3, 0.1, -0.2, 1)];
        let a = raycaster.cast(0.4, 0.7, &camera, &hits);
        let b = raycaster.cast(0.4, 0.7, &camera, &hits);
        assert_eq!(a, b);
        assert_eq!(
            raycaster.cast(0.2, 0.9, &camera, &[]),
            raycaster.cast(0.2, 0.9, &camera, &[])
        );
    }

    #[test]
    fn test_nearest_hit_wins_and_ties_keep_first() {
        let raycaster = PlacementRaycaster::default();
        let camera = overhead_camera();
        let hits = [hit(0.0, 0.0, 0.0, 1), hit(0.0, 1.0, 1.0, 2), hit(0.0, 1.0, 1.0, 3)];
        let pose = raycaster.cast(0.5, 0.5, &camera, &hits).unwrap();
        assert_eq!(pose.position, Vector3::new(0.0, 1.0, 1.0));
        assert_eq!(pose.rotation, Quaternion::new(1.0, 0.0, 0.0, 0.0));

        let ray = raycaster.screen_to_ray(0.5, 0.5, &camera).unwrap();
        let nearest = raycaster.nearest_hit(&ray, &hits).unwrap();
        assert_eq!(nearest.polygon_id, PolygonId(2));
    }

    #[test]
    fn test_hits_behind_camera_fall_back_to_ground() {
        let raycaster = PlacementRaycaster::default();
        let behind = [hit(0.0, 10.0, 10.0, 9)];
        let pose = raycaster.cast(0.5, 0.5, &overhead_camera(), &behind).unwrap();
        assert_eq!(pose.position.y, 0.0);
    }

    #[test]
    fn test_parallel_and_sky_rays_miss() {
        let raycaster = PlacementRaycaster::default();
        let level_ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(
            raycaster.intersect_ground(&level_ray),
            Err(ArError::NoIntersection)
        );

        let level = CameraPose::look_at(
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, -1.0),
            Vector3::unit_y(),
        );
        // Upper half of the screen points at the sky.
        assert_eq!(
            raycaster.cast(0.5, 0.1, &level, &[]),
            Err(ArError::NoIntersection)
        );
        let below = raycaster.cast(0.5, 0.9, &level, &[]).unwrap();
        assert_eq!(below.position.y, 0.0);
        assert!(below.position.z < 0.0);
    }

    #[test]
    fn test_degenerate_camera_misses() {
        let mut camera = overhead_camera();
        camera.position.x = f32::NAN;
        assert_eq!(
            PlacementRaycaster::default().cast(0.5, 0.5, &camera, &[]),
            Err(ArError::NoIntersection)
        );
    }

    #[test]
    fn test_align_to_plane_normal() {
        let raycaster =
            PlacementRaycaster::new(PlacementConfig::default().with_align_to_plane_normal(true));
        let wall = PlaneHit::new(Vector3::new(0.0, 0.5, 0.5), Vector3::unit_z(), PolygonId(4));
        let pose = raycaster.cast(0.5, 0.5, &overhead_camera(), &[wall]).unwrap();
        let up = pose.rotation.rotate_vector(Vector3::unit_y());
        assert!((up - Vector3::unit_z()).magnitude() < 1e-5);
    }
}
