//! # Light Estimation
//!
//! Maps ambient-light samples to a renderable light estimate. Each update is a
//! direct function of the newest sample: no temporal filtering.
//!
//! | Input | Intensity |
//! |---|---|
//! | brightness 0..1 | `lerp(0.2, 1.2, clamp01(b))` |
//! | illuminance (lux) | `clamp(lux / 500, 0.3, 1.5)` |
//! | no sensor | 0.6 between 18:00 and 06:00, otherwise 1.0 |

use chrono::Timelike;
use cgmath::{InnerSpace, Vector3};

use crate::config::LightConfig;

/// Intensity assumed before any estimate exists
pub const DEFAULT_INTENSITY: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmbientReading {
    /// Normalized average brightness, 0..1
    Brightness(f32),
    /// Raw illuminance in lux
    Illuminance(f32),
}

/// One ambient-light sensor callback
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmbientSample {
    pub reading: Option<AmbientReading>,
    /// Linear rgb, 0..1
    pub color: Option<[f32; 3]>,
    pub color_temperature_k: Option<f32>,
    /// Direction the main light travels in
    pub direction: Option<Vector3<f32>>,
}

impl AmbientSample {
    pub fn brightness(value: f32) -> Self {
        Self {
            reading: Some(AmbientReading::Brightness(value)),
            ..Self::default()
        }
    }

    pub fn illuminance(lux: f32) -> Self {
        Self {
            reading: Some(AmbientReading::Illuminance(lux)),
            ..Self::default()
        }
    }
}

/// Target values for the scene light; `None` fields leave the renderer's
/// previous value in place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEstimate {
    pub intensity: f32,
    pub color: Option<[f32; 3]>,
    pub direction: Option<Vector3<f32>>,
}

/// Source of the local wall-clock hour for the no-sensor heuristic
pub trait Clock {
    fn local_hour(&self) -> u32;
}

/// Host local time via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Clock pinned to one hour
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn local_hour(&self) -> u32 {
        self.0
    }
}

pub struct LightEstimationAdapter {
    config: LightConfig,
    last_intensity: f32,
}

impl LightEstimationAdapter {
    pub fn new(config: LightConfig) -> Self {
        Self {
            config,
            last_intensity: DEFAULT_INTENSITY,
        }
    }

    /// Estimate for a fresh sensor sample. A sample without a usable reading
    /// keeps the previous intensity.
    pub fn update(&mut self, sample: &AmbientSample) -> LightEstimate {
        let intensity = match sample.reading {
            Some(AmbientReading::Brightness(b)) if b.is_finite() => {
                let (low, high) = self.config.brightness_range;
                low + (high - low) * b.clamp(0.0, 1.0)
            }
            Some(AmbientReading::Illuminance(lux)) if lux.is_finite() => {
                let (low, high) = self.config.lux_range;
                (lux / self.config.lux_divisor).clamp(low, high)
            }
            Some(reading) => {
                log::warn!("ignoring non-finite ambient reading {reading:?}");
                self.last_intensity
            }
            None => self.last_intensity,
        };
        self.last_intensity = intensity;

        let color = match (sample.color, sample.color_temperature_k) {
            (Some(rgb), _) if rgb.iter().all(|c| c.is_finite()) => Some(rgb),
            (_, Some(kelvin)) if kelvin.is_finite() && kelvin > 0.0 => {
                Some(color_temperature_to_rgb(kelvin))
            }
            _ => None,
        };

        let direction = sample.direction.filter(|d| {
            let usable = d.x.is_finite() && d.y.is_finite() && d.z.is_finite() && d.magnitude2() > 0.0;
            if !usable {
                log::warn!("ignoring unusable light direction {d:?}");
            }
            usable
        });

        LightEstimate {
            intensity,
            color,
            direction,
        }
    }

    /// Time-of-day estimate used when no ambient sensor is available
    pub fn heuristic(&mut self, hour: u32) -> LightEstimate {
        let start = self.config.night_start_hour;
        let end = self.config.night_end_hour;
        let night = if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        };
        let intensity = if night {
            self.config.night_intensity
        } else {
            self.config.day_intensity
        };
        self.last_intensity = intensity;
        LightEstimate {
            intensity,
            color: None,
            direction: None,
        }
    }
}

/// Approximate black-body colour for a temperature in kelvin (1000 K..40000 K)
pub fn color_temperature_to_rgb(kelvin: f32) -> [f32; 3] {
    let temp = kelvin.clamp(1000.0, 40000.0) / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698_73 * (temp - 60.0).powf(-0.133_204_76)
    };
    let green = if temp <= 66.0 {
        99.470_8 * temp.ln() - 161.119_57
    } else {
        288.122_17 * (temp - 60.0).powf(-0.075_514_85)
    };
    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.517_73 * (temp - 10.0).ln() - 305.044_8
    };

    [red, green, blue].map(|c| c.clamp(0.0, 255.0) / 255.0)
}

/// Renderer-side light state: the values the scene light currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub intensity: f32,
    pub color: [f32; 3],
    pub direction: Vector3<f32>,
    ambient_factor: f32,
    directional_factor: f32,
}

impl LightRig {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
            color: [1.0, 1.0, 1.0],
            // Key light at (5, 8, 2) shining toward the origin
            direction: Vector3::new(-5.0, -8.0, -2.0).normalize(),
            ambient_factor: config.ambient_factor,
            directional_factor: config.directional_factor,
        }
    }

    /// Replace intensity; overwrite colour/direction only when the estimate has them
    pub fn apply(&mut self, estimate: &LightEstimate) {
        self.intensity = estimate.intensity;
        if let Some(color) = estimate.color {
            self.color = color;
        }
        if let Some(direction) = estimate.direction {
            self.direction = direction.normalize();
        }
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_factor * self.intensity
    }

    pub fn directional_intensity(&self) -> f32 {
        self.directional_factor * self.intensity
    }

    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            direction: [self.direction.x, self.direction.y, self.direction.z, 0.0],
            color: [self.color[0], self.color[1], self.color[2], 1.0],
            intensity: [
                self.directional_intensity(),
                self.ambient_intensity(),
                self.intensity,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct LightUniform {
    /// Light travel direction; w unused.
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// x: directional, y: ambient, z: raw estimate, w: padding.
    pub intensity: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> LightEstimationAdapter {
        LightEstimationAdapter::new(LightConfig::default())
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_brightness_mapping() {
        let mut light = adapter();
        assert!(approx_eq(light.update(&AmbientSample::brightness(0.0)).intensity, 0.2));
        assert!(approx_eq(light.update(&AmbientSample::brightness(0.5)).intensity, 0.7));
        assert!(approx_eq(light.update(&AmbientSample::brightness(3.0)).intensity, 1.2));
        assert!(approx_eq(light.update(&AmbientSample::brightness(-1.0)).intensity, 0.2));
    }

    #[test]
    fn test_illuminance_mapping() {
        let mut light = adapter();
        assert_eq!(light.update(&AmbientSample::illuminance(250.0)).intensity, 0.5);
        assert_eq!(light.update(&AmbientSample::illuminance(10.0)).intensity, 0.3);
        assert_eq!(light.update(&AmbientSample::illuminance(10_000.0)).intensity, 1.5);
    }

    #[test]
    fn test_time_of_day_heuristic() {
        let mut light = adapter();
        for hour in [18, 20, 23, 0, 3, 5] {
            assert_eq!(light.heuristic(hour).intensity, 0.6, "hour {hour}");
        }
        for hour in [6, 9, 12, 17] {
            assert_eq!(light.heuristic(hour).intensity, 1.0, "hour {hour}");
        }
    }

    #[test]
    fn test_missing_or_bad_reading_keeps_previous_intensity() {
        let mut light = adapter();
        light.update(&AmbientSample::illuminance(250.0));
        assert_eq!(light.update(&AmbientSample::default()).intensity, 0.5);
        assert_eq!(light.update(&AmbientSample::illuminance(f32::NAN)).intensity, 0.5);
    }

    #[test]
    fn test_color_and_direction_pass_through() {
        let mut light = adapter();
        let sample = AmbientSample {
            reading: Some(AmbientReading::Brightness(1.0)),
            color: Some([1.0, 0.5, 0.25]),
            color_temperature_k: Some(2000.0),
            direction: Some(Vector3::new(0.0, -2.0, 0.0)),
        };
        let estimate = light.update(&sample);
        assert_eq!(estimate.color, Some([1.0, 0.5, 0.25]));
        assert_eq!(estimate.direction, Some(Vector3::new(0.0, -2.0, 0.0)));

        let bare = light.update(&AmbientSample::brightness(1.0));
        assert_eq!(bare.color, None);
        assert_eq!(bare.direction, None);
    }

    #[test]
    fn test_color_temperature_fallback() {
        let mut light = adapter();
        let sample = AmbientSample {
            color_temperature_k: Some(6600.0),
            ..AmbientSample::brightness(0.5)
        };
        let color = light.update(&sample).color.unwrap();
        assert!(color.iter().all(|c| *c > 0.9));

        let warm = color_temperature_to_rgb(2000.0);
        assert_eq!(warm[0], 1.0);
        assert!(warm[2] < warm[1]);
    }

    #[test]
    fn test_rig_keeps_prior_color_and_direction() {
        let config = LightConfig::default();
        let mut rig = LightRig::new(&config);
        rig.apply(&LightEstimate {
            intensity: 1.0,
            color: Some([1.0, 0.8, 0.6]),
            direction: Some(Vector3::new(0.0, -1.0, 0.0)),
        });
        rig.apply(&LightEstimate {
            intensity: 0.5,
            color: None,
            direction: None,
        });
        assert_eq!(rig.color, [1.0, 0.8, 0.6]);
        assert_eq!(rig.direction, Vector3::new(0.0, -1.0, 0.0));
        assert!(approx_eq(rig.ambient_intensity(), 0.15));
        assert!(approx_eq(rig.directional_intensity(), 0.4));
        assert!(approx_eq(rig.uniform().intensity[2], 0.5));
    }
}
