use cgmath::{InnerSpace, Vector3};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Signed distance of `point`'s projection onto the ray; negative means
    /// the point lies behind the origin
    pub fn distance_along(&self, point: Vector3<f32>) -> f32 {
        (point - self.origin).dot(self.direction)
    }

    pub fn is_finite(&self) -> bool {
        self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.origin.z.is_finite()
            && self.direction.x.is_finite()
            && self.direction.y.is_finite()
            && self.direction.z.is_finite()
    }
}
