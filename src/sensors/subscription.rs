//! Scoped sensor subscriptions.
//!
//! A [`Subscription`] starts its source when acquired and stops it when dropped,
//! so tearing down a session always releases every platform callback.

use std::sync::{Arc, Mutex};

use super::slot::{sensor_slot, SlotReader, SlotWriter};
use crate::error::{ArError, ArResult, SensorKind};

/// A platform sensor that pushes samples into a slot while started.
///
/// `start` performs any permission handshake and fails with
/// [`ArError::SensorUnavailable`] when the sensor cannot be used.
pub trait SensorSource<T> {
    fn kind(&self) -> SensorKind;

    fn start(&mut self, writer: SlotWriter<T>) -> ArResult<()>;

    /// Release platform callbacks. Must be safe to call after a failed `start`.
    fn stop(&mut self);
}

/// Camera stream / AR session permission, requested once per session
pub trait CameraAccess {
    fn request(&mut self) -> ArResult<()>;
}

/// Live subscription to one sensor; dropping it stops the source
pub struct Subscription<T> {
    source: Box<dyn SensorSource<T>>,
}

impl<T> Subscription<T> {
    /// Start `source` and return the subscription together with the tick-side reader
    pub fn acquire(mut source: Box<dyn SensorSource<T>>) -> ArResult<(Self, SlotReader<T>)> {
        let (writer, reader) = sensor_slot();
        match source.start(writer) {
            Ok(()) => {
                log::debug!("{} subscription started", source.kind());
                Ok((Self { source }, reader))
            }
            Err(err) => {
                source.stop();
                Err(err)
            }
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.source.kind()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.source.stop();
        log::debug!("{} subscription stopped", self.source.kind());
    }
}

/// Handle that platform callback code uses to feed a [`ChannelSource`]
pub struct SensorFeed<T> {
    writer: Arc<Mutex<Option<SlotWriter<T>>>>,
}

impl<T> Clone for SensorFeed<T> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<T> SensorFeed<T> {
    /// Deliver a sample. Returns false while the source is not started.
    pub fn publish(&self, value: T) -> bool {
        match self.writer.lock() {
            Ok(guard) => guard.as_ref().map_or(false, |w| w.publish(value)),
            Err(_) => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer
            .lock()
            .map(|guard| guard.as_ref().map_or(false, |w| w.is_connected()))
            .unwrap_or(false)
    }
}

/// Generic sensor source backed by callback code holding a [`SensorFeed`].
///
/// A source built with [`ChannelSource::denied`] models a platform that refused
/// permission or lacks the API.
pub struct ChannelSource<T> {
    kind: SensorKind,
    writer: Arc<Mutex<Option<SlotWriter<T>>>>,
    denial: Option<String>,
}

impl<T> ChannelSource<T> {
    pub fn new(kind: SensorKind) -> (Self, SensorFeed<T>) {
        let writer = Arc::new(Mutex::new(None));
        let feed = SensorFeed {
            writer: Arc::clone(&writer),
        };
        (
            Self {
                kind,
                writer,
                denial: None,
            },
            feed,
        )
    }

    pub fn denied(kind: SensorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            writer: Arc::new(Mutex::new(None)),
            denial: Some(reason.into()),
        }
    }
}

impl<T> SensorSource<T> for ChannelSource<T> {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn start(&mut self, writer: SlotWriter<T>) -> ArResult<()> {
        if let Some(reason) = &self.denial {
            return Err(ArError::unavailable(self.kind, reason.clone()));
        }
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| ArError::unavailable(self.kind, "sensor feed poisoned"))?;
        *guard = Some(writer);
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut guard) = self.writer.lock() {
            guard.take();
        }
    }
}
