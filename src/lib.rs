//! Evar AR placement core
//!
//! Tap-to-place raycasting, pinch/twist manipulation, light estimation and
//! tilt parallax for a single placed object, driven by explicit per-frame ticks.
//! Rendering, model loading and the platform AR runtime stay outside the crate;
//! they talk to it through [`session::PlaneSource`], the sensor traits and the
//! plain-data [`session::FrameOutput`].

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod placement;
pub mod prelude;
pub mod sensors;
pub mod session;

// Re-export main types for convenience
pub use session::ArSession;

/// Creates a session with the default configuration and no plane detection
pub fn default(viewport: input::Viewport) -> error::ArResult<ArSession> {
    ArSession::new(config::ArConfig::default(), viewport, Box::new(session::NoPlanes))
}
