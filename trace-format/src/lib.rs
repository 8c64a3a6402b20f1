//! # Trace Format
//!
//! Rust types for the subset of the Chrome Trace Event Format emitted by a
//! streaming trace writer. The Chrome Trace Event Format is the JSON-based
//! trace representation processed by the Chrome Trace Viewer
//! (chrome://tracing) and by Perfetto's legacy JSON importer.
//!
//! ## Format Overview
//!
//! A trace file is a JSON array of event objects. Each object carries a
//! single-character `ph` field selecting the event kind, a microsecond
//! timestamp `ts`, and `pid`/`tid` lane identifiers. Optional fields are
//! omitted entirely rather than serialized as null; the viewer treats a
//! present-but-null field as malformed.
//!
//! ## Event Types
//!
//! - **Duration Events** (B/E): mark the beginning and end of operations
//! - **Complete Events** (X): begin/end folded into one event with `dur`
//! - **Instant Events** (i): points in time with no duration, with an
//!   optional scope controlling their rendered height
//! - **Counter Events** (C): values tracked over time
//! - **Async Events** (b/n/e): nestable operations spanning threads
//!
//! ## Timestamps
//!
//! All timestamps and durations are in microseconds.

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Event phase selecting the kind of event and how the viewer renders it.
///
/// The phase determines which additional fields are meaningful: `dur` only
/// applies to [`Phase::Complete`], the `s` scope only to [`Phase::Instant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Begin phase of a duration event. Paired with a later `E` event.
    #[serde(rename = "B")]
    DurationBegin,
    /// End phase of a duration event.
    #[serde(rename = "E")]
    DurationEnd,
    /// Complete event carrying its own duration.
    #[serde(rename = "X")]
    Complete,
    /// Instant event, displayed as a vertical line.
    #[serde(rename = "i")]
    Instant,
    /// Counter sample, displayed as a line graph.
    #[serde(rename = "C")]
    Counter,
    /// Begin phase of a nestable async event.
    #[serde(rename = "b")]
    AsyncNestBegin,
    /// End phase of a nestable async event.
    #[serde(rename = "e")]
    AsyncNestEnd,
    /// Instant event within a nestable async sequence.
    #[serde(rename = "n")]
    AsyncNestInstant,
}

impl Phase {
    /// The single-character tag used on the wire.
    pub fn as_char(self) -> char {
        match self {
            Phase::DurationBegin => 'B',
            Phase::DurationEnd => 'E',
            Phase::Complete => 'X',
            Phase::Instant => 'i',
            Phase::Counter => 'C',
            Phase::AsyncNestBegin => 'b',
            Phase::AsyncNestEnd => 'e',
            Phase::AsyncNestInstant => 'n',
        }
    }
}

/// Scope of an instant event, determining its visual height in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstantScope {
    /// Event spans the entire timeline height.
    #[serde(rename = "g")]
    Global,
    /// Event spans all threads in a process.
    #[serde(rename = "p")]
    Process,
    /// Event is confined to a single thread lane.
    #[serde(rename = "t")]
    Thread,
}

impl InstantScope {
    /// Map a raw scope character to a scope. Characters outside `{g,p,t}`
    /// carry no scope annotation and map to `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'g' => Some(InstantScope::Global),
            'p' => Some(InstantScope::Process),
            't' => Some(InstantScope::Thread),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            InstantScope::Global => 'g',
            InstantScope::Process => 'p',
            InstantScope::Thread => 't',
        }
    }
}

/// A single trace event record as written to the output file.
///
/// `pid` and `tid` are display strings rather than numeric identifiers: the
/// emitting side resolves its compact integer indices through name tables
/// before serialization, so the viewer shows human-readable lane names.
///
/// Optional fields are skipped when absent:
/// - `dur` is present only for [`Phase::Complete`] events
/// - `s` is present only for [`Phase::Instant`] events with a valid scope
/// - `cat` is present only for categorized events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct TraceRecord {
    /// Display name of the event in the trace viewer.
    pub name: String,
    /// Event phase.
    pub ph: Phase,
    /// Timestamp in microseconds.
    pub ts: u64,
    /// Display name of the process lane.
    pub pid: String,
    /// Display name of the thread lane.
    pub tid: String,
    /// Duration in microseconds, for complete events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dur: Option<u64>,
    /// Instant scope, for instant events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<InstantScope>,
    /// Category for filtering in the trace viewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn base_record(ph: Phase) -> TraceRecord {
        TraceRecord::builder()
            .name("fetch".to_string())
            .ph(ph)
            .ts(100)
            .pid("Thread0".to_string())
            .tid("fetch".to_string())
            .build()
    }

    #[test]
    fn test_complete_record_carries_dur() {
        let mut record = base_record(Phase::Complete);
        record.dur = Some(50);

        let json: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ph"], "X");
        assert_eq!(json["dur"], 50);
    }

    #[test]
    fn test_optional_fields_omitted_not_null() {
        let record = base_record(Phase::DurationBegin);

        let json: Value = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("dur"));
        assert!(!object.contains_key("s"));
        assert!(!object.contains_key("cat"));
        assert_eq!(json["ph"], "B");
        assert_eq!(json["ts"], 100);
    }

    #[test]
    fn test_instant_scope_serialized_as_single_char() {
        let mut record = base_record(Phase::Instant);
        record.s = Some(InstantScope::Global);

        let json: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["s"], "g");
    }

    #[test]
    fn test_record_round_trip() {
        let mut record = base_record(Phase::Complete);
        record.dur = Some(42);
        record.cat = Some("squash".to_string());

        let serialized = serde_json::to_string(&record).unwrap();
        let parsed: TraceRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_scope_char_mapping() {
        assert_eq!(InstantScope::from_char('g'), Some(InstantScope::Global));
        assert_eq!(InstantScope::from_char('p'), Some(InstantScope::Process));
        assert_eq!(InstantScope::from_char('t'), Some(InstantScope::Thread));
        assert_eq!(InstantScope::from_char('x'), None);
        assert_eq!(InstantScope::Process.as_char(), 'p');
    }

    #[test]
    fn test_phase_chars() {
        assert_eq!(Phase::DurationBegin.as_char(), 'B');
        assert_eq!(Phase::AsyncNestInstant.as_char(), 'n');
        let json = serde_json::to_string(&Phase::Counter).unwrap();
        assert_eq!(json, "\"C\"");
    }
}
