//! # Evar Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use evar::prelude::*;
//!
//! let mut session = evar::default(Viewport::new(800.0, 600.0))?;
//! session.activate(SensorSet::default(), &LocalClock);
//! assert!(!session.ar_mode());
//! # Ok::<(), ArError>(())
//! ```

// Session and configuration
pub use crate::config::{
    ArConfig, GestureConfig, LightConfig, ParallaxConfig, PlacementConfig, ScaleRange,
};
pub use crate::default;
pub use crate::error::{ArError, ArResult, SensorKind};
pub use crate::session::{
    ArSession, Capabilities, Capability, FrameInput, FrameOutput, NoPlanes, PlaneSource, SensorSet,
};

// Camera, input and placement
pub use crate::camera::{Camera, CameraPose, CameraUniform};
pub use crate::input::{GestureEvent, PointerPhase, PointerSample, PointerStream, Viewport};
pub use crate::placement::{Pose, PlaneHit, PolygonId};

// Sensors
pub use crate::sensors::{
    AmbientReading, AmbientSample, CameraAccess, ChannelSource, Clock, FixedClock, LightEstimate,
    LocalClock, OrientationSample, ParallaxOffset, SensorFeed, SensorSource,
};
