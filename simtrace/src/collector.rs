use parking_lot::{Condvar, Mutex};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

use crate::buffer::EventBuffer;
use crate::config::{Config, NameTables};
use crate::serialize;
use crate::tracer::Tracer;
use crate::transport::{self, Consumer};
use crate::writer::TraceWriter;
use crate::{Result, TraceError};

/// How long the receiver blocks in recv between stop-flag checks.
const RECV_POLL: Duration = Duration::from_millis(10);

/// Background half of the pipeline: a receiver thread that moves events
/// from the transport into the buffer, and a flusher thread that
/// periodically drains the buffer into the trace file.
///
/// Both threads run until [`stop`], which performs one final drain and
/// closes the output file's JSON array. Dropping an unstopped collector
/// shuts down best-effort.
///
/// [`stop`]: Collector::stop
pub struct Collector {
    receiver: Option<JoinHandle<()>>,
    flusher: Option<JoinHandle<Result<()>>>,
    receiver_stop: Arc<AtomicBool>,
    flusher_stop: Arc<StopSignal>,
    dropped: Arc<AtomicU64>,
}

impl Collector {
    /// Open the output file and start the pipeline, returning the producer
    /// handle alongside the collector.
    ///
    /// Fails if the output file cannot be created; tracing is expected to
    /// be available before the simulation starts real work.
    pub fn start(config: Config) -> Result<(Tracer, Collector)> {
        let file = File::create(&config.output)?;
        let writer = TraceWriter::new(BufWriter::new(file))?;
        debug!(output = %config.output.display(), "trace output file opened");

        let (producer, consumer) = transport::channel(config.channel_capacity);
        let dropped = consumer.dropped_counter();
        let buffer = Arc::new(EventBuffer::default());

        let receiver_stop = Arc::new(AtomicBool::new(false));
        let flusher_stop = Arc::new(StopSignal::default());

        let receiver = spawn_receiver(
            consumer,
            buffer.clone(),
            receiver_stop.clone(),
            config.channel_capacity,
        )?;
        let flusher = spawn_flusher(
            writer,
            buffer,
            config.tables.clone(),
            config.flush_interval(),
            flusher_stop.clone(),
        )?;

        let collector = Collector {
            receiver: Some(receiver),
            flusher: Some(flusher),
            receiver_stop,
            flusher_stop,
            dropped,
        };
        Ok((Tracer::new(producer), collector))
    }

    /// Number of events dropped at the transport so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Shut the pipeline down: stop accepting new events, flush everything
    /// still buffered, and close the trace file with its terminating
    /// bracket. Returns the last write error if any flush cycle failed.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        // receiver first so the channel remainder lands in the buffer
        // before the flusher's final drain
        self.receiver_stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.receiver.take() {
            let _ = handle.join();
        }

        self.flusher_stop.signal();
        match self.flusher.take() {
            Some(handle) => handle.join().map_err(|_| TraceError::FlusherPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        if self.flusher.is_some() {
            if let Err(err) = self.shutdown() {
                warn!(error = %err, "collector shutdown failed");
            }
        }
    }
}

/// Shutdown signal the flusher parks on between cycles, so a stop request
/// interrupts the wait instead of riding out the full flush interval.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn signal(&self) {
        *self.stopped.lock() = true;
        self.condvar.notify_all();
    }

    /// Park for up to `timeout` or until signaled; returns whether the
    /// signal has been raised.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            self.condvar.wait_for(&mut stopped, timeout);
        }
        *stopped
    }
}

fn spawn_receiver(
    consumer: Consumer,
    buffer: Arc<EventBuffer>,
    stop: Arc<AtomicBool>,
    capacity: usize,
) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("simtrace-recv".to_string())
        .spawn(move || {
            // flag checked every iteration: a continuously-sending
            // producer must not postpone shutdown
            loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                match consumer.recv_timeout(RECV_POLL) {
                    Ok(event) => buffer.append(event),
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                }
            }
            // events sent before the stop was observed still count, but
            // drain at most one channel's worth so a producer racing the
            // shutdown cannot keep this loop alive
            for _ in 0..capacity {
                match consumer.try_recv() {
                    Some(event) => buffer.append(event),
                    None => break,
                }
            }
            debug!(dropped = consumer.dropped(), "receiver thread exiting");
        })?;
    Ok(handle)
}

fn spawn_flusher<W: Write + Send + 'static>(
    mut writer: TraceWriter<W>,
    buffer: Arc<EventBuffer>,
    tables: NameTables,
    interval: Duration,
    stop: Arc<StopSignal>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = std::thread::Builder::new()
        .name("simtrace-flush".to_string())
        .spawn(move || -> Result<()> {
            // write failures must not kill the flusher while producers
            // keep emitting; remember the last one for stop() to surface
            let mut last_error: Option<TraceError> = None;
            loop {
                let stopping = stop.wait_timeout(interval);

                let events = buffer.drain();
                if !events.is_empty() {
                    debug!(count = events.len(), "flushing drained events");
                }
                for event in &events {
                    match serialize::to_record(event, &tables) {
                        Ok(record) => {
                            if let Err(err) = writer.append(&record) {
                                warn!(error = %err, name = %event.name, "failed to append trace record");
                                last_error = Some(err);
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, name = %event.name, "rejecting malformed event")
                        }
                    }
                }
                if let Err(err) = writer.flush() {
                    warn!(error = %err, "failed to flush trace file");
                    last_error = Some(err.into());
                }

                if stopping {
                    debug!(
                        records = writer.records_written(),
                        "flusher thread exiting"
                    );
                    let finished = writer.finish();
                    return match last_error {
                        Some(err) => Err(err),
                        None => Ok(finished?),
                    };
                }
            }
        })?;
    Ok(handle)
}
