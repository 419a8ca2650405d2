//! # Sensors
//!
//! Ambient outputs driven by asynchronous platform callbacks.
//!
//! Callbacks never touch the scene directly: each one owns the writer side of a
//! [`slot`] and the frame tick reads the newest value. Sources are held through
//! [`Subscription`]s, which stop them on drop.
//!
//! - [`LightEstimationAdapter`] - ambient readings to light intensity/colour/direction
//! - [`OrientationParallax`] - device tilt to a small scene-root rotation

pub mod light;
pub mod parallax;
pub mod slot;
pub mod subscription;

// Re-export main types
pub use light::{
    color_temperature_to_rgb, AmbientReading, AmbientSample, Clock, FixedClock, LightEstimate,
    LightEstimationAdapter, LightRig, LightUniform, LocalClock, DEFAULT_INTENSITY,
};
pub use parallax::{OrientationParallax, OrientationSample, ParallaxOffset, Permission};
pub use slot::{sensor_slot, SlotReader, SlotWriter};
pub use subscription::{CameraAccess, ChannelSource, SensorFeed, SensorSource, Subscription};
