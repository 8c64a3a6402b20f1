use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::event::TraceEvent;

/// Create the producer and consumer ends of the transport channel.
///
/// The channel is bounded with a drop-newest overflow policy: a submit
/// against a full channel discards the event and increments the shared
/// dropped counter instead of blocking the producer.
pub fn channel(capacity: usize) -> (Producer, Consumer) {
    let (tx, rx) = bounded(capacity);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        Producer {
            tx,
            dropped: dropped.clone(),
        },
        Consumer { rx, dropped },
    )
}

/// Producer end of the transport channel. Cheap to clone; one per
/// emitting thread is fine, the channel serializes concurrent sends.
#[derive(Clone)]
pub struct Producer {
    tx: Sender<TraceEvent>,
    dropped: Arc<AtomicU64>,
}

impl Producer {
    /// Hand one event to the consumer side. Never blocks and never fails:
    /// overflow and a stopped collector both count the event as dropped.
    pub fn submit(&self, event: TraceEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(name = %event.name, "transport channel full, dropping event");
            }
            Err(TrySendError::Disconnected(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(name = %event.name, "collector stopped, dropping event");
            }
        }
    }

    /// Number of events dropped on the producer side so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer end of the transport channel. Single-owner; lives on the
/// receiver thread.
pub struct Consumer {
    rx: Receiver<TraceEvent>,
    dropped: Arc<AtomicU64>,
}

impl Consumer {
    /// Block for up to `timeout` waiting for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<TraceEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&self) -> Option<TraceEvent> {
        self.rx.try_recv().ok()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn dropped_counter(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_format::Phase;

    fn event(ts: u64) -> TraceEvent {
        TraceEvent::new(Phase::Counter, 0, 0, "mem", ts, 0)
    }

    #[test]
    fn test_submit_and_receive_in_order() {
        let (producer, consumer) = channel(16);
        for ts in 0..5 {
            producer.submit(event(ts));
        }

        for ts in 0..5 {
            let received = consumer.try_recv().unwrap();
            assert_eq!(received.timestamp, ts);
        }
        assert!(consumer.try_recv().is_none());
        assert_eq!(producer.dropped(), 0);
    }

    #[test]
    fn test_overflow_drops_newest_without_blocking() {
        let (producer, consumer) = channel(4);
        for ts in 0..10 {
            producer.submit(event(ts));
        }

        // the first 4 got through, the rest were dropped
        assert_eq!(producer.dropped(), 6);
        assert_eq!(consumer.dropped(), 6);
        let kept: Vec<u64> = std::iter::from_fn(|| consumer.try_recv())
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(kept, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_submit_after_consumer_dropped_counts() {
        let (producer, consumer) = channel(4);
        drop(consumer);

        producer.submit(event(1));
        assert_eq!(producer.dropped(), 1);
    }
}
