use trace_format::{InstantScope, Phase};

/// Maximum stored length of an event name in bytes. Longer names are
/// truncated at construction.
pub const MAX_NAME_LEN: usize = 63;

/// One trace occurrence as it moves through the pipeline.
///
/// Events are immutable once constructed: the emitting thread builds one,
/// ownership moves through the transport into the buffer, and the flusher
/// consumes it after serialization. `process_id`, `thread_id` and
/// `category` are indices into the configured [`NameTables`]; they are not
/// validated here but at serialization time.
///
/// [`NameTables`]: crate::config::NameTables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub name: String,
    pub phase: Phase,
    /// Microsecond timestamp, producer-supplied.
    pub timestamp: u64,
    /// Microsecond duration, meaningful only for [`Phase::Complete`].
    pub duration: u64,
    /// Instant scope, meaningful only for [`Phase::Instant`].
    pub scope: Option<InstantScope>,
    pub process_id: u32,
    pub thread_id: u32,
    /// Category table index; 0 means uncategorized.
    pub category: u32,
}

impl TraceEvent {
    pub fn new(
        phase: Phase,
        process_id: u32,
        thread_id: u32,
        name: &str,
        timestamp: u64,
        category: u32,
    ) -> Self {
        TraceEvent {
            name: truncate_name(name),
            phase,
            timestamp,
            duration: 0,
            scope: None,
            process_id,
            thread_id,
            category,
        }
    }
}

fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_kept_whole() {
        let event = TraceEvent::new(Phase::Counter, 0, 1, "ipc", 10, 0);
        assert_eq!(event.name, "ipc");
        assert_eq!(event.phase, Phase::Counter);
        assert_eq!(event.thread_id, 1);
    }

    #[test]
    fn test_long_name_truncated_to_max() {
        let name = "x".repeat(200);
        let event = TraceEvent::new(Phase::DurationBegin, 0, 0, &name, 0, 0);
        assert_eq!(event.name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 2-byte characters, 63 bytes lands mid-char
        let name = "é".repeat(64);
        let event = TraceEvent::new(Phase::DurationBegin, 0, 0, &name, 0, 0);
        assert_eq!(event.name.len(), 62);
        assert_eq!(event.name.chars().count(), 31);
    }

    #[test]
    fn test_name_at_exact_limit_untouched() {
        let name = "y".repeat(MAX_NAME_LEN);
        let event = TraceEvent::new(Phase::Instant, 0, 0, &name, 0, 0);
        assert_eq!(event.name, name);
    }
}
