//! # Configuration
//!
//! Tunables for the placement core. Every section has a `Default` matching the
//! behaviour of the shipped web viewer, plus chained `with_*` setters:
//!
//! ```rust
//! use evar::config::{ArConfig, GestureConfig, ScaleRange};
//!
//! let config = ArConfig::default()
//!     .with_scale_range(ScaleRange::native())
//!     .with_gesture(GestureConfig::default().with_rotate_speed(0.5));
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{ArError, ArResult};

/// Gesture recognition thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// A press held at least this long is not a tap
    pub tap_max_duration_ms: u64,
    /// A press that moved at least this far (in pixels) is not a tap
    pub tap_max_movement_px: f32,
    /// Multiplier applied to every twist delta
    pub rotate_speed: f32,
    /// Two-finger distances below this (in pixels) cannot serve as a scale baseline
    pub degenerate_distance_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_duration_ms: 300,
            tap_max_movement_px: 10.0,
            rotate_speed: 0.2,
            degenerate_distance_px: 0.01,
        }
    }
}

impl GestureConfig {
    pub fn with_tap_max_duration_ms(mut self, ms: u64) -> Self {
        self.tap_max_duration_ms = ms;
        self
    }

    pub fn with_tap_max_movement_px(mut self, px: f32) -> Self {
        self.tap_max_movement_px = px;
        self
    }

    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }
}

/// Allowed range for the anchor's uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl ScaleRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Wider range used by the native AR build
    pub fn native() -> Self {
        Self { min: 0.3, max: 3.0 }
    }

    /// Clamp `scale` into the range. Non-finite input collapses to the nearest bound
    /// (NaN to `min`).
    pub fn clamp(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min;
        }
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f32) -> bool {
        scale >= self.min && scale <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Orient placed objects along the hit plane's normal instead of upright
    pub align_to_plane_normal: bool,
    /// Height above the surface at which the reticle hovers
    pub reticle_height: f32,
    /// Reticle smoothing rate, in units of "fraction of the gap closed per second"
    pub reticle_follow_speed: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            align_to_plane_normal: false,
            reticle_height: 0.01,
            reticle_follow_speed: 10.0,
        }
    }
}

impl PlacementConfig {
    pub fn with_align_to_plane_normal(mut self, align: bool) -> Self {
        self.align_to_plane_normal = align;
        self
    }
}

/// Mapping from ambient readings to light intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    /// Intensity at brightness 0 and brightness 1
    pub brightness_range: (f32, f32),
    /// Lux value that maps to intensity 1.0
    pub lux_divisor: f32,
    /// Clamp applied to lux-derived intensity
    pub lux_range: (f32, f32),
    pub day_intensity: f32,
    pub night_intensity: f32,
    /// Local hour at which night starts (inclusive)
    pub night_start_hour: u32,
    /// Local hour at which night ends (exclusive)
    pub night_end_hour: u32,
    /// Share of the estimate given to the ambient light
    pub ambient_factor: f32,
    /// Share of the estimate given to the directional light
    pub directional_factor: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            brightness_range: (0.2, 1.2),
            lux_divisor: 500.0,
            lux_range: (0.3, 1.5),
            day_intensity: 1.0,
            night_intensity: 0.6,
            night_start_hour: 18,
            night_end_hour: 6,
            ambient_factor: 0.3,
            directional_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxConfig {
    /// Fraction of the device tilt (in degrees) applied to the scene root
    pub factor: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self { factor: 0.02 }
    }
}

/// Complete configuration for an [`ArSession`](crate::session::ArSession)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArConfig {
    pub gesture: GestureConfig,
    pub scale: ScaleRange,
    pub placement: PlacementConfig,
    pub light: LightConfig,
    pub parallax: ParallaxConfig,
}

impl ArConfig {
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    pub fn with_scale_range(mut self, scale: ScaleRange) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_light(mut self, light: LightConfig) -> Self {
        self.light = light;
        self
    }

    pub fn with_parallax(mut self, parallax: ParallaxConfig) -> Self {
        self.parallax = parallax;
        self
    }

    /// Reject configurations the core cannot honour
    pub fn validate(&self) -> ArResult<()> {
        let g = &self.gesture;
        finite("gesture.tap_max_movement_px", g.tap_max_movement_px)?;
        finite("gesture.rotate_speed", g.rotate_speed)?;
        finite("gesture.degenerate_distance_px", g.degenerate_distance_px)?;
        if g.tap_max_duration_ms == 0 || g.tap_max_movement_px <= 0.0 {
            return Err(invalid("tap thresholds must be positive"));
        }
        if g.degenerate_distance_px < 0.0 {
            return Err(invalid("gesture.degenerate_distance_px must not be negative"));
        }

        let s = &self.scale;
        finite("scale.min", s.min)?;
        finite("scale.max", s.max)?;
        if s.min <= 0.0 {
            return Err(invalid("scale.min must be greater than zero"));
        }
        if s.min > s.max {
            return Err(invalid(format!(
                "scale range is inverted ({} > {})",
                s.min, s.max
            )));
        }

        let p = &self.placement;
        finite("placement.reticle_height", p.reticle_height)?;
        finite("placement.reticle_follow_speed", p.reticle_follow_speed)?;
        if p.reticle_follow_speed < 0.0 {
            return Err(invalid("placement.reticle_follow_speed must not be negative"));
        }

        let l = &self.light;
        for (name, value) in [
            ("light.brightness_range.0", l.brightness_range.0),
            ("light.brightness_range.1", l.brightness_range.1),
            ("light.lux_divisor", l.lux_divisor),
            ("light.lux_range.0", l.lux_range.0),
            ("light.lux_range.1", l.lux_range.1),
            ("light.day_intensity", l.day_intensity),
            ("light.night_intensity", l.night_intensity),
            ("light.ambient_factor", l.ambient_factor),
            ("light.directional_factor", l.directional_factor),
        ] {
            finite(name, value)?;
        }
        if l.lux_divisor <= 0.0 {
            return Err(invalid("light.lux_divisor must be greater than zero"));
        }
        if l.brightness_range.0 > l.brightness_range.1 {
            return Err(invalid("light.brightness_range is inverted"));
        }
        if l.lux_range.0 > l.lux_range.1 {
            return Err(invalid("light.lux_range is inverted"));
        }
        if l.night_start_hour >= 24 || l.night_end_hour >= 24 {
            return Err(invalid("light night hours must be below 24"));
        }

        finite("parallax.factor", self.parallax.factor)?;
        Ok(())
    }
}

fn finite(name: &str, value: f32) -> ArResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite")))
    }
}

fn invalid(message: impl Into<String>) -> ArError {
    ArError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ArConfig::default().validate().is_ok());
        assert!(ArConfig::default()
            .with_scale_range(ScaleRange::native())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_inverted_light_ranges_rejected() {
        let brightness = LightConfig {
            brightness_range: (1.2, 0.2),
            ..LightConfig::default()
        };
        assert!(matches!(
            ArConfig::default().with_light(brightness).validate(),
            Err(ArError::InvalidConfig(msg)) if msg.contains("brightness_range")
        ));

        let lux = LightConfig {
            lux_range: (1.5, 0.3),
            ..LightConfig::default()
        };
        assert!(matches!(
            ArConfig::default().with_light(lux).validate(),
            Err(ArError::InvalidConfig(msg)) if msg.contains("lux_range")
        ));
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let config = ArConfig::default().with_scale_range(ScaleRange::new(2.0, 0.5));
        assert!(matches!(config.validate(), Err(ArError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let config = ArConfig::default()
            .with_gesture(GestureConfig::default().with_rotate_speed(f32::NAN));
        assert!(config.validate().is_err());

        let mut light = LightConfig::default();
        light.lux_divisor = 0.0;
        assert!(ArConfig::default().with_light(light).validate().is_err());
    }

    #[test]
    fn test_scale_range_clamp() {
        let range = ScaleRange::default();
        assert_eq!(range.clamp(5.0), 2.0);
        assert_eq!(range.clamp(0.0), 0.5);
        assert_eq!(range.clamp(f32::NAN), 0.5);
        assert_eq!(range.clamp(f32::INFINITY), 2.0);
        assert_eq!(range.clamp(1.3), 1.3);
    }
}
