//! # Error Types
//!
//! Every failure in the placement core is local to one tick or one capability.
//! [`ArSession`](crate::session::ArSession) recovers all runtime variants itself;
//! they surface to callers only through capability flags and stale outputs.

use std::fmt;
use thiserror::Error;

/// Platform capability a sensor error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Camera,
    AmbientLight,
    Orientation,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Camera => "camera",
            SensorKind::AmbientLight => "ambient light sensor",
            SensorKind::Orientation => "device orientation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArError {
    /// Permission denied or the platform API is absent.
    #[error("{sensor} unavailable: {reason}")]
    SensorUnavailable { sensor: SensorKind, reason: String },

    /// The ray missed every plane hit and the ground plane.
    #[error("ray does not intersect any placement surface")]
    NoIntersection,

    /// Two-finger baseline too small to derive a scale ratio.
    #[error("two-finger baseline distance is degenerate")]
    DegenerateGesture,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ArError {
    /// Shorthand for a [`ArError::SensorUnavailable`] value
    pub fn unavailable(sensor: SensorKind, reason: impl Into<String>) -> Self {
        ArError::SensorUnavailable {
            sensor,
            reason: reason.into(),
        }
    }
}

pub type ArResult<T> = Result<T, ArError>;
