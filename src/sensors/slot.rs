//! Latest-value slots between asynchronous sensor callbacks and the frame tick.
//!
//! Each slot has exactly one writer (the sensor callback) and one reader (the
//! tick). It holds at most one value: publishing replaces whatever the tick has
//! not consumed yet, so a stalled tick never accumulates samples.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Shared<T> {
    value: Option<T>,
    writer_alive: bool,
    reader_alive: bool,
}

fn lock<T>(shared: &Mutex<Shared<T>>) -> MutexGuard<'_, Shared<T>> {
    // The guarded data is a plain value; a panicking peer cannot leave it torn.
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected writer/reader pair
pub fn sensor_slot<T>() -> (SlotWriter<T>, SlotReader<T>) {
    let shared = Arc::new(Mutex::new(Shared {
        value: None,
        writer_alive: true,
        reader_alive: true,
    }));
    (
        SlotWriter {
            shared: Arc::clone(&shared),
        },
        SlotReader {
            shared,
            closed: false,
        },
    )
}

/// Sensor-callback side of a slot
pub struct SlotWriter<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> SlotWriter<T> {
    /// Replace the slot's value. Returns false once the reader is gone.
    pub fn publish(&self, value: T) -> bool {
        let superseded = {
            let mut shared = lock(&self.shared);
            if !shared.reader_alive {
                return false;
            }
            shared.value.replace(value)
        };
        // Dropped outside the lock.
        drop(superseded);
        true
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.shared).reader_alive
    }
}

impl<T> Drop for SlotWriter<T> {
    fn drop(&mut self) {
        lock(&self.shared).writer_alive = false;
    }
}

/// Tick side of a slot
pub struct SlotReader<T> {
    shared: Arc<Mutex<Shared<T>>>,
    closed: bool,
}

impl<T> SlotReader<T> {
    /// Newest value published since the previous call, if any
    pub fn take_latest(&mut self) -> Option<T> {
        let mut shared = lock(&self.shared);
        if !shared.writer_alive {
            self.closed = true;
        }
        shared.value.take()
    }

    /// True once the writer has been dropped and its last value taken
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> Drop for SlotReader<T> {
    fn drop(&mut self) {
        let stale = {
            let mut shared = lock(&self.shared);
            shared.reader_alive = false;
            shared.value.take()
        };
        drop(stale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_last_value_wins() {
        let (writer, mut reader) = sensor_slot();
        assert_eq!(reader.take_latest(), None);
        writer.publish(1);
        writer.publish(2);
        writer.publish(3);
        assert_eq!(reader.take_latest(), Some(3));
        assert_eq!(reader.take_latest(), None);
    }

    #[test]
    fn test_superseded_values_released_on_publish() {
        let drops = Arc::new(AtomicUsize::new(0));
        let (writer, mut reader) = sensor_slot();
        for _ in 0..1000 {
            writer.publish(Counted(Arc::clone(&drops)));
        }
        // Only the newest sample is still held while no tick runs.
        assert_eq!(drops.load(Ordering::SeqCst), 999);

        let latest = reader.take_latest();
        assert!(latest.is_some());
        drop(latest);
        assert_eq!(drops.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_writer_drop_closes_reader() {
        let (writer, mut reader) = sensor_slot();
        writer.publish("last");
        drop(writer);
        assert_eq!(reader.take_latest(), Some("last"));
        assert!(reader.is_closed());
        assert_eq!(reader.take_latest(), None);
    }

    #[test]
    fn test_reader_drop_disconnects_writer() {
        let (writer, reader) = sensor_slot::<u8>();
        drop(reader);
        assert!(!writer.is_connected());
        assert!(!writer.publish(1));
    }

    #[test]
    fn test_writer_on_another_thread() {
        let (writer, mut reader) = sensor_slot();
        std::thread::spawn(move || {
            for lux in 0..10 {
                writer.publish(lux as f32 * 50.0);
            }
        })
        .join()
        .unwrap();
        assert_eq!(reader.take_latest(), Some(450.0));
    }
}
