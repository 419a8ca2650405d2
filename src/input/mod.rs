//! # Input
//!
//! Pointer normalization ([`pointer`]) and multi-touch gesture recognition
//! ([`gesture`]).

pub mod gesture;
pub mod pointer;

// Re-export main types
pub use gesture::{signed_angle_difference, GestureEvent, GestureRecognizer, GestureState};
pub use pointer::{PointerPhase, PointerSample, PointerStream, Viewport, MOUSE_POINTER_ID};
