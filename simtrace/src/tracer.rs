use trace_format::{InstantScope, Phase};
use tracing::trace;

use crate::event::TraceEvent;
use crate::transport::Producer;

/// Producer-facing handle for emitting trace events.
///
/// Cloneable and cheap to share across simulation threads. Every call
/// builds one event and hands it to the transport; none of them block on
/// file I/O or surface errors, so tracing can never break the simulation.
/// `pid`/`tid`/`cat` are name-table indices; invalid ones are caught at
/// serialization, not here. `cat` 0 means uncategorized.
#[derive(Clone)]
pub struct Tracer {
    producer: Producer,
}

impl Tracer {
    pub(crate) fn new(producer: Producer) -> Self {
        Tracer { producer }
    }

    /// Mark the beginning of a duration slice on a thread lane.
    pub fn duration_begin(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::DurationBegin, pid, tid, name, ts, cat));
    }

    /// Mark the end of a duration slice opened by [`duration_begin`].
    ///
    /// [`duration_begin`]: Tracer::duration_begin
    pub fn duration_end(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::DurationEnd, pid, tid, name, ts, cat));
    }

    /// Emit a complete slice carrying its own duration.
    pub fn complete(&self, pid: u32, tid: u32, name: &str, ts: u64, dur: u64, cat: u32) {
        let mut event = TraceEvent::new(Phase::Complete, pid, tid, name, ts, cat);
        event.duration = dur;
        self.emit(event);
    }

    /// Emit an instant event. `scope` is one of `g`/`p`/`t`; any other
    /// character emits the event without a scope annotation.
    pub fn instant(&self, pid: u32, tid: u32, name: &str, ts: u64, scope: char, cat: u32) {
        let mut event = TraceEvent::new(Phase::Instant, pid, tid, name, ts, cat);
        event.scope = InstantScope::from_char(scope);
        self.emit(event);
    }

    /// Emit a counter sample.
    pub fn counter(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::Counter, pid, tid, name, ts, cat));
    }

    /// Open a nestable async operation.
    pub fn async_nest_start(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::AsyncNestBegin, pid, tid, name, ts, cat));
    }

    /// Close a nestable async operation.
    pub fn async_nest_end(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::AsyncNestEnd, pid, tid, name, ts, cat));
    }

    /// Emit an instant within a nestable async sequence.
    pub fn async_nest_instant(&self, pid: u32, tid: u32, name: &str, ts: u64, cat: u32) {
        self.emit(TraceEvent::new(Phase::AsyncNestInstant, pid, tid, name, ts, cat));
    }

    // TODO: flow events need an event-id field in TraceEvent and
    // TraceRecord before these can emit anything.

    /// Placeholder for flow-begin events; currently emits nothing.
    pub fn flow_begin(&self, _pid: u32, _tid: u32, _name: &str, _ts: u64, _cat: u32) {}

    /// Placeholder for flow-step events; currently emits nothing.
    pub fn flow_step(&self, _pid: u32, _tid: u32, _name: &str, _ts: u64, _cat: u32) {}

    /// Placeholder for flow-end events; currently emits nothing.
    pub fn flow_end(&self, _pid: u32, _tid: u32, _name: &str, _ts: u64, _cat: u32) {}

    /// Number of events this pipeline has dropped at the transport.
    pub fn dropped(&self) -> u64 {
        self.producer.dropped()
    }

    fn emit(&self, event: TraceEvent) {
        trace!(
            phase = %event.phase.as_char(),
            pid = event.process_id,
            tid = event.thread_id,
            name = %event.name,
            ts = event.timestamp,
            cat = event.category,
            "emit trace event"
        );
        self.producer.submit(event);
    }
}
