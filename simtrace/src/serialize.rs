use trace_format::{Phase, TraceRecord};

use crate::config::NameTables;
use crate::event::TraceEvent;
use crate::Result;

/// Convert one buffered event into its file record, resolving index fields
/// through the name tables.
///
/// Any out-of-bounds process, thread or category index makes the event
/// malformed and yields the corresponding structured error; the caller
/// decides whether to report or skip. Phase-conditional fields follow the
/// format rules: `dur` only for complete events, `s` only for instant
/// events with a valid scope, `cat` suppressed for category 0.
pub fn to_record(event: &TraceEvent, tables: &NameTables) -> Result<TraceRecord> {
    let pid = tables.process_name(event.process_id)?;
    let tid = tables.thread_name(event.thread_id)?;
    let cat = tables.category_name(event.category)?;

    Ok(TraceRecord {
        name: event.name.clone(),
        ph: event.phase,
        ts: event.timestamp,
        pid: pid.to_string(),
        tid: tid.to_string(),
        dur: (event.phase == Phase::Complete).then_some(event.duration),
        s: match event.phase {
            Phase::Instant => event.scope,
            _ => None,
        },
        cat: cat.map(str::to_string),
    })
}
