use cgmath::{Euler, Matrix4, Quaternion, Rad};

use crate::config::ParallaxConfig;

/// State of the platform's motion-sensor permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Device orientation callback payload, degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    /// Front/back tilt
    pub beta: Option<f32>,
    /// Left/right tilt
    pub gamma: Option<f32>,
}

impl OrientationSample {
    pub fn new(beta: f32, gamma: f32) -> Self {
        Self {
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }
}

/// Scene-root tilt in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParallaxOffset {
    pub tilt_x: f32,
    pub tilt_y: f32,
}

impl ParallaxOffset {
    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from(Euler {
            x: Rad(self.tilt_x),
            y: Rad(self.tilt_y),
            z: Rad(0.0),
        })
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation())
    }
}

/// Subtle scene-root rotation that follows device tilt once permission is granted
pub struct OrientationParallax {
    config: ParallaxConfig,
    permission: Permission,
    offset: ParallaxOffset,
}

impl OrientationParallax {
    pub fn new(config: ParallaxConfig) -> Self {
        Self {
            config,
            permission: Permission::Unknown,
            offset: ParallaxOffset::default(),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Record the outcome of the permission handshake. Losing permission returns
    /// the scene root to identity.
    pub fn set_permission(&mut self, permission: Permission) {
        if permission != Permission::Granted {
            self.offset = ParallaxOffset::default();
        }
        self.permission = permission;
    }

    pub fn offset(&self) -> ParallaxOffset {
        self.offset
    }

    /// Map tilt angles (degrees) to a new offset. Returns `None`, leaving the
    /// offset untouched, until permission has been granted.
    pub fn update(&mut self, beta: f32, gamma: f32) -> Option<ParallaxOffset> {
        if self.permission != Permission::Granted {
            return None;
        }
        let tilt = |degrees: f32| {
            if degrees.is_finite() {
                (degrees * self.config.factor).to_radians()
            } else {
                0.0
            }
        };
        self.offset = ParallaxOffset {
            tilt_x: tilt(beta),
            tilt_y: tilt(gamma),
        };
        Some(self.offset)
    }

    /// Missing angles count as 0°
    pub fn update_sample(&mut self, sample: &OrientationSample) -> Option<ParallaxOffset> {
        self.update(sample.beta.unwrap_or(0.0), sample.gamma.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::One;

    #[test]
    fn test_no_updates_without_permission() {
        let mut parallax = OrientationParallax::new(ParallaxConfig::default());
        assert_eq!(parallax.update(45.0, 10.0), None);
        parallax.set_permission(Permission::Denied);
        assert_eq!(parallax.update(45.0, 10.0), None);
        assert_eq!(parallax.offset(), ParallaxOffset::default());
        assert_eq!(parallax.offset().rotation(), Quaternion::one());
    }

    #[test]
    fn test_tilt_mapping() {
        let mut parallax = OrientationParallax::new(ParallaxConfig::default());
        parallax.set_permission(Permission::Granted);
        let offset = parallax.update(50.0, -25.0).unwrap();
        assert!((offset.tilt_x - 1.0_f32.to_radians()).abs() < 1e-7);
        assert!((offset.tilt_y + 0.5_f32.to_radians()).abs() < 1e-7);
    }

    #[test]
    fn test_missing_and_non_finite_angles_are_zero() {
        let mut parallax = OrientationParallax::new(ParallaxConfig::default());
        parallax.set_permission(Permission::Granted);
        let offset = parallax
            .update_sample(&OrientationSample {
                beta: None,
                gamma: Some(f32::NAN),
            })
            .unwrap();
        assert_eq!(offset, ParallaxOffset::default());
    }

    #[test]
    fn test_revoking_permission_resets_offset() {
        let mut parallax = OrientationParallax::new(ParallaxConfig::default());
        parallax.set_permission(Permission::Granted);
        parallax.update(30.0, 30.0);
        parallax.set_permission(Permission::Denied);
        assert_eq!(parallax.offset(), ParallaxOffset::default());
    }
}
