//! # Placement
//!
//! Everything between a recognised tap and the pose of the placed object:
//!
//! - [`PlacementRaycaster`] - screen point to world pose via plane hits or the ground plane
//! - [`AnchorManager`] - the single re-placeable anchor and its scale/rotation invariants
//! - [`PlacementReticle`] - hover preview shown until something is placed

pub mod anchor;
pub mod pose;
pub mod ray;
pub mod raycaster;
pub mod reticle;

// Re-export main types
pub use anchor::{Anchor, AnchorManager, AnchorUniform};
pub use pose::Pose;
pub use ray::Ray;
pub use raycaster::{PlacementRaycaster, PlaneHit, PolygonId};
pub use reticle::PlacementReticle;
