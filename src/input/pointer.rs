use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
};

/// Contact id reserved for the primary mouse button
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

impl PointerPhase {
    /// Whether this sample ends its contact
    pub fn is_release(&self) -> bool {
        matches!(self, PointerPhase::Up | PointerPhase::Cancel)
    }
}

impl From<TouchPhase> for PointerPhase {
    fn from(phase: TouchPhase) -> Self {
        match phase {
            TouchPhase::Started => PointerPhase::Down,
            TouchPhase::Moved => PointerPhase::Move,
            TouchPhase::Ended => PointerPhase::Up,
            TouchPhase::Cancelled => PointerPhase::Cancel,
        }
    }
}

/// One contact update in normalized screen coordinates (0..1, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
    pub timestamp_ms: u64,
}

impl PointerSample {
    pub fn new(id: u64, x: f32, y: f32, phase: PointerPhase, timestamp_ms: u64) -> Self {
        Self {
            id,
            x,
            y,
            phase,
            timestamp_ms,
        }
    }
}

/// Size of the surface receiving input, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn normalize(&self, position: PhysicalPosition<f64>) -> (f32, f32) {
        (
            position.x as f32 / self.width,
            position.y as f32 / self.height,
        )
    }

    /// Pixel offset between two normalized points
    pub fn to_pixels(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx * self.width, dy * self.height)
    }
}

/// Pass-through adapter from platform pointer events to [`PointerSample`]s.
///
/// Samples are queued in arrival order until [`drain`](Self::drain) hands them to
/// the tick. A contact stays in the active set from `Down` until the drain that
/// delivers its `Up`/`Cancel`.
pub struct PointerStream {
    viewport: Viewport,
    active: Vec<PointerSample>,
    pending: Vec<PointerSample>,
    cursor: PhysicalPosition<f64>,
    mouse_down: bool,
}

impl PointerStream {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            active: Vec::new(),
            pending: Vec::new(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            mouse_down: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Record a sample. Moves and releases for unknown contacts are dropped, as is
    /// a second `Down` for an id that is already active.
    pub fn push(&mut self, sample: PointerSample) {
        let known = self
            .active
            .iter()
            .position(|s| s.id == sample.id && !s.phase.is_release());
        match (sample.phase, known) {
            (PointerPhase::Down, None) => self.active.push(sample),
            (PointerPhase::Down, Some(_)) => {
                log::warn!("duplicate pointer down for contact {}", sample.id);
                return;
            }
            (_, Some(index)) => self.active[index] = sample,
            (_, None) => {
                log::trace!("ignoring {:?} for unknown contact {}", sample.phase, sample.id);
                return;
            }
        }
        self.pending.push(sample);
    }

    /// Take the samples received since the last tick, in arrival order
    pub fn drain(&mut self) -> Vec<PointerSample> {
        self.active.retain(|s| !s.phase.is_release());
        std::mem::take(&mut self.pending)
    }

    /// Contacts currently down, in arrival order
    pub fn active(&self) -> &[PointerSample] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|s| !s.phase.is_release()).count()
    }

    /// Feed a winit window event. Returns true when the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent, timestamp_ms: u64) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.viewport = Viewport::new(size.width as f32, size.height as f32);
                true
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = self.viewport.normalize(touch.location);
                self.push(PointerSample::new(
                    touch.id,
                    x,
                    y,
                    touch.phase.into(),
                    timestamp_ms,
                ));
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                if self.mouse_down {
                    let (x, y) = self.viewport.normalize(*position);
                    self.push(PointerSample::new(
                        MOUSE_POINTER_ID,
                        x,
                        y,
                        PointerPhase::Move,
                        timestamp_ms,
                    ));
                }
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = *state == ElementState::Pressed;
                if pressed == self.mouse_down {
                    return false;
                }
                self.mouse_down = pressed;
                let phase = if pressed {
                    PointerPhase::Down
                } else {
                    PointerPhase::Up
                };
                let (x, y) = self.viewport.normalize(self.cursor);
                self.push(PointerSample::new(MOUSE_POINTER_ID, x, y, phase, timestamp_ms));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u64, x: f32, phase: PointerPhase, t: u64) -> PointerSample {
        PointerSample::new(id, x, 0.5, phase, t)
    }

    #[test]
    fn test_contact_lifecycle() {
        let mut stream = PointerStream::new(Viewport::new(800.0, 600.0));
        stream.push(sample(1, 0.1, PointerPhase::Down, 0));
        stream.push(sample(2, 0.2, PointerPhase::Down, 1));
        assert_eq!(stream.active_count(), 2);

        let events = stream.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[1].id, 2);

        stream.push(sample(1, 0.15, PointerPhase::Move, 2));
        stream.push(sample(1, 0.15, PointerPhase::Up, 3));
        assert_eq!(stream.active_count(), 1);
        assert_eq!(stream.drain().len(), 2);

        let ids: Vec<u64> = stream.active().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_unknown_and_duplicate_contacts_ignored() {
        let mut stream = PointerStream::new(Viewport::new(100.0, 100.0));
        stream.push(sample(7, 0.5, PointerPhase::Move, 0));
        stream.push(sample(7, 0.5, PointerPhase::Up, 0));
        assert!(stream.drain().is_empty());

        stream.push(sample(3, 0.5, PointerPhase::Down, 0));
        stream.push(sample(3, 0.6, PointerPhase::Down, 1));
        let events = stream.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].x, 0.5);
    }

    #[test]
    fn test_cancel_removes_contact() {
        let mut stream = PointerStream::new(Viewport::new(100.0, 100.0));
        stream.push(sample(4, 0.5, PointerPhase::Down, 0));
        stream.push(sample(4, 0.5, PointerPhase::Cancel, 5));
        stream.drain();
        assert!(stream.active().is_empty());
    }

    #[test]
    fn test_quick_retap_within_one_tick() {
        let mut stream = PointerStream::new(Viewport::new(100.0, 100.0));
        stream.push(sample(1, 0.5, PointerPhase::Down, 0));
        stream.push(sample(1, 0.5, PointerPhase::Up, 10));
        stream.push(sample(1, 0.5, PointerPhase::Down, 20));
        assert_eq!(stream.drain().len(), 3);
        assert_eq!(stream.active().len(), 1);
        assert_eq!(stream.active()[0].phase, PointerPhase::Down);
    }

    #[test]
    fn test_touch_phase_mapping() {
        assert_eq!(PointerPhase::from(TouchPhase::Started), PointerPhase::Down);
        assert_eq!(PointerPhase::from(TouchPhase::Moved), PointerPhase::Move);
        assert_eq!(PointerPhase::from(TouchPhase::Ended), PointerPhase::Up);
        assert_eq!(PointerPhase::from(TouchPhase::Cancelled), PointerPhase::Cancel);
    }

    #[test]
    fn test_viewport_normalization() {
        let viewport = Viewport::new(800.0, 400.0);
        let (x, y) = viewport.normalize(PhysicalPosition::new(400.0, 100.0));
        assert_eq!((x, y), (0.5, 0.25));
        assert_eq!(viewport.to_pixels(0.1, 0.1), (80.0, 40.0));
    }
}
