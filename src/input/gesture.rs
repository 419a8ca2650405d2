//! # Gesture Recognition
//!
//! Turns pointer samples into tap, pinch-scale and twist-rotate events.
//!
//! The recognizer keeps its own table of down contacts and is driven one sample
//! at a time, so it never needs a live event system:
//!
//! ```text
//! Idle ──1st Down──▶ TapCandidate ──Up (quick, still)──▶ Tap, Idle
//!   │                     │
//!   └──── 2 contacts ─────┴──▶ TwoFinger ──< 2 contacts──▶ Idle
//! ```
//!
//! While two fingers are down every move emits an absolute `Scale` target and,
//! when the fingers twisted, an incremental `Rotate` delta.

use cgmath::{Vector2, InnerSpace};

use super::pointer::{PointerPhase, PointerSample, Viewport};
use crate::config::{GestureConfig, ScaleRange};
use crate::error::{ArError, ArResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Quick, stationary single-finger press; carries the release point
    Tap { x: f32, y: f32 },
    /// Absolute scale target for the anchor, already clamped
    Scale { scale: f32 },
    /// Incremental yaw in degrees, already multiplied by the rotate speed
    Rotate { delta_degrees: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    TapCandidate {
        start_x: f32,
        start_y: f32,
        start_time_ms: u64,
    },
    TwoFinger {
        /// Contacts being tracked, in arrival order
        pair: (u64, u64),
        /// Pixels
        baseline_distance: f32,
        /// Degrees
        baseline_angle: f32,
        initial_scale: f32,
        /// Sum of emitted rotate deltas, degrees
        accumulated_rotation: f32,
        last_angle: f32,
    },
}

pub struct GestureRecognizer {
    config: GestureConfig,
    scale_range: ScaleRange,
    viewport: Viewport,
    contacts: Vec<(u64, Vector2<f32>)>,
    state: GestureState,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig, scale_range: ScaleRange, viewport: Viewport) -> Self {
        Self {
            config,
            scale_range,
            viewport,
            contacts: Vec::new(),
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Forget every contact and return to `Idle`
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.state = GestureState::Idle;
    }

    /// Advance the state machine by one sample.
    ///
    /// `current_scale` is the anchor's scale right now; it becomes the pinch
    /// baseline whenever a two-finger gesture starts.
    pub fn handle(&mut self, sample: &PointerSample, current_scale: f32) -> Vec<GestureEvent> {
        let position = Vector2::new(sample.x, sample.y);
        match sample.phase {
            PointerPhase::Down => {
                if self.contact_index(sample.id).is_some() {
                    return Vec::new();
                }
                self.contacts.push((sample.id, position));
                match self.contacts.len() {
                    1 => {
                        if self.state == GestureState::Idle {
                            self.state = GestureState::TapCandidate {
                                start_x: sample.x,
                                start_y: sample.y,
                                start_time_ms: sample.timestamp_ms,
                            };
                        }
                    }
                    2 => self.begin_two_finger(current_scale),
                    _ => {}
                }
                Vec::new()
            }
            PointerPhase::Move => {
                let Some(index) = self.contact_index(sample.id) else {
                    return Vec::new();
                };
                self.contacts[index].1 = position;
                match self.state {
                    GestureState::TwoFinger { pair, .. }
                        if pair.0 == sample.id || pair.1 == sample.id =>
                    {
                        self.track_two_finger(current_scale)
                    }
                    _ => Vec::new(),
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let Some(index) = self.contact_index(sample.id) else {
                    return Vec::new();
                };
                self.contacts.remove(index);
                self.release(sample, current_scale)
            }
        }
    }

    fn release(&mut self, sample: &PointerSample, current_scale: f32) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        match self.state {
            GestureState::TapCandidate {
                start_x,
                start_y,
                start_time_ms,
            } => {
                if sample.phase == PointerPhase::Up {
                    let elapsed = sample.timestamp_ms.saturating_sub(start_time_ms);
                    let (dx, dy) = self.viewport.to_pixels(sample.x - start_x, sample.y - start_y);
                    let moved = Vector2::new(dx, dy).magnitude();
                    if elapsed < self.config.tap_max_duration_ms
                        && moved < self.config.tap_max_movement_px
                    {
                        log::debug!("tap at ({:.3}, {:.3})", sample.x, sample.y);
                        events.push(GestureEvent::Tap {
                            x: sample.x,
                            y: sample.y,
                        });
                    } else {
                        log::trace!("press aborted as drag ({elapsed} ms, {moved:.1} px)");
                    }
                }
                self.state = GestureState::Idle;
            }
            GestureState::TwoFinger { pair, .. } => {
                if self.contacts.len() < 2 {
                    self.state = GestureState::Idle;
                } else if pair.0 == sample.id || pair.1 == sample.id {
                    // One of three or more fingers lifted; continue with the next pair.
                    self.begin_two_finger(current_scale);
                }
            }
            GestureState::Idle => {}
        }
        events
    }

    fn begin_two_finger(&mut self, current_scale: f32) {
        let (a, b) = (self.contacts[0], self.contacts[1]);
        let (distance, angle) = self.measure(a.1, b.1);
        if distance < self.config.degenerate_distance_px {
            log::debug!("two-finger baseline is degenerate ({distance} px)");
        } else {
            log::debug!("two-finger baseline {distance:.1} px at {angle:.1}°");
        }
        self.state = GestureState::TwoFinger {
            pair: (a.0, b.0),
            baseline_distance: distance,
            baseline_angle: angle,
            initial_scale: self.scale_range.clamp(current_scale),
            accumulated_rotation: 0.0,
            last_angle: angle,
        };
    }

    fn track_two_finger(&mut self, current_scale: f32) -> Vec<GestureEvent> {
        let GestureState::TwoFinger { pair, .. } = self.state else {
            return Vec::new();
        };
        let (Some(a), Some(b)) = (self.contact_index(pair.0), self.contact_index(pair.1)) else {
            return Vec::new();
        };
        let (distance, angle) = self.measure(self.contacts[a].1, self.contacts[b].1);

        let mut events = Vec::with_capacity(2);
        match self.scale_target(distance) {
            Ok(scale) => {
                log::trace!("pinch scale {scale:.3}");
                events.push(GestureEvent::Scale { scale });
            }
            Err(err) => {
                log::trace!("skipping scale update: {err}");
                // Re-baseline as soon as the fingers are far enough apart. The
                // angle of coincident fingers is undefined, so no twist either.
                if distance.is_finite() && distance >= self.config.degenerate_distance_px {
                    if let GestureState::TwoFinger {
                        baseline_distance,
                        baseline_angle,
                        initial_scale,
                        last_angle,
                        ..
                    } = &mut self.state
                    {
                        *baseline_distance = distance;
                        *baseline_angle = angle;
                        *initial_scale = self.scale_range.clamp(current_scale);
                        *last_angle = angle;
                    }
                }
                return events;
            }
        }

        if !(distance >= self.config.degenerate_distance_px) {
            log::trace!("skipping twist: fingers coincide");
            return events;
        }

        if let GestureState::TwoFinger {
            accumulated_rotation,
            last_angle,
            ..
        } = &mut self.state
        {
            let delta = signed_angle_difference(*last_angle, angle);
            if delta.is_finite() {
                *last_angle = angle;
                let delta_degrees = delta * self.config.rotate_speed;
                if delta_degrees != 0.0 {
                    *accumulated_rotation += delta_degrees;
                    log::trace!("twist {delta_degrees:.3}°");
                    events.push(GestureEvent::Rotate { delta_degrees });
                }
            }
        }

        events
    }

    /// Clamped scale for the current finger distance, or `DegenerateGesture` when
    /// the baseline cannot be divided by.
    fn scale_target(&self, distance: f32) -> ArResult<f32> {
        let GestureState::TwoFinger {
            baseline_distance,
            initial_scale,
            ..
        } = self.state
        else {
            return Err(ArError::DegenerateGesture);
        };
        let epsilon = self.config.degenerate_distance_px;
        if !distance.is_finite()
            || !baseline_distance.is_finite()
            || baseline_distance < epsilon
        {
            return Err(ArError::DegenerateGesture);
        }
        let factor = distance / baseline_distance.max(epsilon.max(f32::EPSILON));
        Ok(self.scale_range.clamp(initial_scale * factor))
    }

    /// Pixel distance and angle (degrees) between two normalized points
    fn measure(&self, a: Vector2<f32>, b: Vector2<f32>) -> (f32, f32) {
        let (dx, dy) = self.viewport.to_pixels(b.x - a.x, b.y - a.y);
        let delta = Vector2::new(dx, dy);
        (delta.magnitude(), dy.atan2(dx).to_degrees())
    }

    fn contact_index(&self, id: u64) -> Option<usize> {
        self.contacts.iter().position(|(contact, _)| *contact == id)
    }
}

/// Shortest signed turn from `from` to `to`, in degrees, within (-180, 180]
pub fn signed_angle_difference(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
