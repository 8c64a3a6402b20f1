use parking_lot::Mutex;

use crate::event::TraceEvent;

/// Mutually-exclusive ordered holding area between the transport's
/// receiver and the flusher.
///
/// Exactly two operations exist: [`append`] pushes one event under the
/// lock, [`drain`] takes every buffered event in one swap. The lock is
/// never held during serialization or I/O, only for the push or the
/// handoff itself.
///
/// [`append`]: EventBuffer::append
/// [`drain`]: EventBuffer::drain
#[derive(Default)]
pub struct EventBuffer {
    events: Mutex<Vec<TraceEvent>>,
}

impl EventBuffer {
    pub fn append(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }

    /// Take ownership of every buffered event, leaving the buffer empty.
    pub fn drain(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trace_format::Phase;

    fn event(name: &str, ts: u64) -> TraceEvent {
        TraceEvent::new(Phase::Instant, 0, 0, name, ts, 0)
    }

    #[test]
    fn test_drain_preserves_append_order() {
        let buffer = EventBuffer::default();
        for ts in 0..10 {
            buffer.append(event("e", ts));
        }

        let drained = buffer.drain();
        let timestamps: Vec<u64> = drained.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_drain_leaves_buffer_empty() {
        let buffer = EventBuffer::default();
        buffer.append(event("a", 1));
        assert_eq!(buffer.len(), 1);

        assert_eq!(buffer.drain().len(), 1);
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let buffer = Arc::new(EventBuffer::default());
        let threads = 8;
        let per_thread = 500;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        buffer.append(event("c", (t * per_thread + i) as u64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = buffer.drain();
        assert_eq!(drained.len(), threads * per_thread);

        // no event duplicated or lost
        let mut timestamps: Vec<u64> = drained.iter().map(|e| e.timestamp).collect();
        timestamps.sort_unstable();
        timestamps.dedup();
        assert_eq!(timestamps.len(), threads * per_thread);
    }
}
