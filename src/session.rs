//! # AR Session
//!
//! Wires the placement core together and drives it with one synchronous
//! [`ArSession::tick`] per rendered frame:
//!
//! 1. drain pointer samples and run them through the gesture recognizer
//! 2. resolve taps into poses and move the anchor; apply scale and twist
//! 3. update the placement reticle while nothing is placed
//! 4. consume the newest ambient-light and orientation samples
//!
//! Sensor callbacks run outside the tick and only write to their slots. Every
//! failure is recovered inside the tick or reported as a capability flag.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Vector3, Zero};
//! use evar::prelude::*;
//!
//! let mut session = ArSession::new(ArConfig::default(), Viewport::new(1080.0, 1920.0), Box::new(NoPlanes))?;
//! session.activate(SensorSet::default(), &FixedClock(12));
//!
//! session.pointers_mut().push(PointerSample::new(1, 0.5, 0.5, PointerPhase::Down, 0));
//! session.pointers_mut().push(PointerSample::new(1, 0.5, 0.5, PointerPhase::Up, 80));
//!
//! let camera = CameraPose::look_at(Vector3::new(0.0, 5.0, 5.0), Vector3::zero(), Vector3::unit_y());
//! let frame = session.tick(&FrameInput::new(camera, 1.0 / 60.0));
//! assert!(frame.anchor.is_some());
//! # Ok::<(), evar::error::ArError>(())
//! ```

use winit::event::WindowEvent;

use crate::camera::{Camera, CameraPose, CameraUniform};
use crate::config::ArConfig;
use crate::error::ArResult;
use crate::input::{GestureEvent, GestureRecognizer, PointerStream, Viewport};
use crate::placement::{
    AnchorManager, AnchorUniform, PlacementRaycaster, PlacementReticle, PlaneHit, Pose,
};
use crate::sensors::{
    AmbientSample, CameraAccess, Clock, LightEstimate, LightEstimationAdapter, LightRig,
    LightUniform, OrientationParallax, OrientationSample, ParallaxOffset, Permission, SensorSource,
    SlotReader, Subscription,
};

/// Platform plane detection, queried once per raycast
pub trait PlaneSource {
    fn raycast(&mut self, screen_x: f32, screen_y: f32, camera: &CameraPose) -> Vec<PlaneHit>;
}

/// No plane detection; every cast uses the ground plane
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlanes;

impl PlaneSource for NoPlanes {
    fn raycast(&mut self, _screen_x: f32, _screen_y: f32, _camera: &CameraPose) -> Vec<PlaneHit> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    Available,
    #[default]
    Unavailable,
}

/// What the platform granted, for UI purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub camera: Capability,
    pub ambient_light: Capability,
    pub orientation: Capability,
}

/// Platform capabilities offered to [`ArSession::activate`]; absent entries are
/// treated as unavailable
#[derive(Default)]
pub struct SensorSet {
    pub camera: Option<Box<dyn CameraAccess>>,
    pub ambient_light: Option<Box<dyn SensorSource<AmbientSample>>>,
    pub orientation: Option<Box<dyn SensorSource<OrientationSample>>>,
}

impl SensorSet {
    pub fn with_camera(mut self, camera: Box<dyn CameraAccess>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_ambient_light(mut self, source: Box<dyn SensorSource<AmbientSample>>) -> Self {
        self.ambient_light = Some(source);
        self
    }

    pub fn with_orientation(mut self, source: Box<dyn SensorSource<OrientationSample>>) -> Self {
        self.orientation = Some(source);
        self
    }
}

/// Per-frame input from the platform
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub camera: CameraPose,
    pub dt_seconds: f32,
}

impl FrameInput {
    pub fn new(camera: CameraPose, dt_seconds: f32) -> Self {
        Self { camera, dt_seconds }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub camera: CameraUniform,
    /// Pose of the placed object, `None` until placed
    pub anchor: Option<Pose>,
    pub anchor_uniform: AnchorUniform,
    /// Placement preview, shown only while nothing is placed
    pub reticle: Option<Pose>,
    /// Estimate computed this tick, if a new sample arrived
    pub light_estimate: Option<LightEstimate>,
    pub light: LightUniform,
    /// Scene-root rotation
    pub parallax: ParallaxOffset,
    /// Gestures recognised this tick, in order
    pub gestures: Vec<GestureEvent>,
}

struct ActiveSensor<T> {
    // Held for its Drop: releases the platform callback.
    _subscription: Subscription<T>,
    reader: SlotReader<T>,
}

impl<T> ActiveSensor<T> {
    fn acquire(source: Box<dyn SensorSource<T>>) -> ArResult<Self> {
        let (subscription, reader) = Subscription::acquire(source)?;
        Ok(Self {
            _subscription: subscription,
            reader,
        })
    }
}

pub struct ArSession {
    pointers: PointerStream,
    gestures: GestureRecognizer,
    raycaster: PlacementRaycaster,
    anchor: AnchorManager,
    reticle: PlacementReticle,
    light: LightEstimationAdapter,
    light_rig: LightRig,
    parallax: OrientationParallax,
    plane_source: Box<dyn PlaneSource>,
    capabilities: Capabilities,
    camera_requested: bool,
    ambient: Option<ActiveSensor<AmbientSample>>,
    orientation: Option<ActiveSensor<OrientationSample>>,
    active: bool,
}

impl ArSession {
    pub fn new(
        config: ArConfig,
        viewport: Viewport,
        plane_source: Box<dyn PlaneSource>,
    ) -> ArResult<Self> {
        config.validate()?;
        Ok(Self {
            pointers: PointerStream::new(viewport),
            gestures: GestureRecognizer::new(config.gesture, config.scale, viewport),
            raycaster: PlacementRaycaster::new(config.placement),
            anchor: AnchorManager::new(config.scale),
            reticle: PlacementReticle::new(config.placement),
            light: LightEstimationAdapter::new(config.light),
            light_rig: LightRig::new(&config.light),
            parallax: OrientationParallax::new(config.parallax),
            plane_source,
            capabilities: Capabilities::default(),
            camera_requested: false,
            ambient: None,
            orientation: None,
            active: false,
        })
    }

    /// Bring the AR view up: request the camera (once per session), subscribe to
    /// the offered sensors and seed the light. Unavailable capabilities fall back
    /// to their defaults and never prevent placement or gestures.
    pub fn activate(&mut self, sensors: SensorSet, clock: &dyn Clock) {
        if self.active {
            self.deactivate();
        }
        let SensorSet {
            camera,
            ambient_light,
            orientation,
        } = sensors;

        if !self.camera_requested {
            self.camera_requested = true;
            self.capabilities.camera = match camera {
                Some(mut access) => match access.request() {
                    Ok(()) => Capability::Available,
                    Err(err) => {
                        log::info!("{err}; continuing without AR camera");
                        Capability::Unavailable
                    }
                },
                None => {
                    log::info!("no camera offered; continuing without AR camera");
                    Capability::Unavailable
                }
            };
        }

        self.ambient = match ambient_light.map(ActiveSensor::acquire) {
            Some(Ok(sensor)) => Some(sensor),
            Some(Err(err)) => {
                log::info!("{err}; using time-of-day lighting");
                None
            }
            None => {
                log::info!("no ambient light sensor; using time-of-day lighting");
                None
            }
        };
        self.capabilities.ambient_light = if self.ambient.is_some() {
            Capability::Available
        } else {
            let estimate = self.light.heuristic(clock.local_hour());
            self.light_rig.apply(&estimate);
            Capability::Unavailable
        };

        self.orientation = match orientation.map(ActiveSensor::acquire) {
            Some(Ok(sensor)) => Some(sensor),
            Some(Err(err)) => {
                log::info!("{err}; parallax disabled");
                None
            }
            None => None,
        };
        if self.orientation.is_some() {
            self.parallax.set_permission(Permission::Granted);
            self.capabilities.orientation = Capability::Available;
        } else {
            self.parallax.set_permission(Permission::Denied);
            self.capabilities.orientation = Capability::Unavailable;
        }

        self.active = true;
        log::info!("AR session active: {:?}", self.capabilities);
    }

    /// Tear the AR view down, releasing every sensor subscription
    pub fn deactivate(&mut self) {
        self.ambient = None;
        self.orientation = None;
        self.parallax.set_permission(Permission::Unknown);
        if self.active {
            log::info!("AR session deactivated");
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Camera feed available; otherwise the view renders over a plain background
    pub fn ar_mode(&self) -> bool {
        self.capabilities.camera == Capability::Available
    }

    pub fn pointers_mut(&mut self) -> &mut PointerStream {
        &mut self.pointers
    }

    /// Feed a winit window event into the pointer stream
    pub fn handle_window_event(&mut self, event: &WindowEvent, timestamp_ms: u64) -> bool {
        self.pointers.handle_window_event(event, timestamp_ms)
    }

    pub fn anchor(&self) -> &AnchorManager {
        &self.anchor
    }

    pub fn light_rig(&self) -> &LightRig {
        &self.light_rig
    }

    /// Remove the placed object; the next tap places it afresh
    pub fn reset_anchor(&mut self) {
        self.anchor.reset();
    }

    pub fn tick(&mut self, input: &FrameInput) -> FrameOutput {
        let camera = &input.camera;
        self.gestures.set_viewport(self.pointers.viewport());

        let mut recognised = Vec::new();
        for sample in self.pointers.drain() {
            for event in self.gestures.handle(&sample, self.anchor.scale()) {
                self.apply_gesture(&event, camera);
                recognised.push(event);
            }
        }

        if self.anchor.is_placed() {
            self.reticle.hide();
        } else {
            let surface = self.cast(0.5, 0.5, camera).ok();
            self.reticle.update(surface.as_ref(), camera, input.dt_seconds);
        }

        let light_estimate = self
            .ambient
            .as_mut()
            .and_then(|sensor| sensor.reader.take_latest())
            .map(|sample| self.light.update(&sample));
        if let Some(estimate) = &light_estimate {
            self.light_rig.apply(estimate);
        }

        if let Some(sample) = self
            .orientation
            .as_mut()
            .and_then(|sensor| sensor.reader.take_latest())
        {
            self.parallax.update_sample(&sample);
        }

        FrameOutput {
            camera: camera.uniform(),
            anchor: self.anchor.is_placed().then(|| *self.anchor.pose()),
            anchor_uniform: self.anchor.uniform(),
            reticle: self.reticle.pose().copied(),
            light_estimate,
            light: self.light_rig.uniform(),
            parallax: self.parallax.offset(),
            gestures: recognised,
        }
    }

    fn apply_gesture(&mut self, event: &GestureEvent, camera: &CameraPose) {
        match *event {
            GestureEvent::Tap { x, y } => match self.cast(x, y, camera) {
                Ok(pose) => {
                    if self.anchor.place_or_move(pose) {
                        self.reticle.hide();
                    }
                }
                Err(err) => log::debug!("tap at ({x:.3}, {y:.3}) not placed: {err}"),
            },
            GestureEvent::Scale { scale } => self.anchor.apply_scale(scale),
            GestureEvent::Rotate { delta_degrees } => {
                self.anchor.apply_rotation_delta(delta_degrees)
            }
        }
    }

    fn cast(&mut self, x: f32, y: f32, camera: &CameraPose) -> ArResult<Pose> {
        let hits = self.plane_source.raycast(x, y, camera);
        self.raycaster.cast(x, y, camera, &hits)
    }
}
