use std::io::{self, Write};

use trace_format::TraceRecord;

use crate::Result;

/// Incremental writer for a JSON-array trace file.
///
/// Writes the opening `[` up front and one record per line as events are
/// appended; [`finish`] closes the array so the completed file is strict
/// JSON. Commas are written before each record after the first, so a file
/// truncated mid-run is still a viewer-tolerable dangling array rather
/// than ending in a stray comma.
///
/// [`finish`]: TraceWriter::finish
pub struct TraceWriter<W: Write> {
    out: W,
    records_written: u64,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        out.write_all(b"[")?;
        Ok(TraceWriter {
            out,
            records_written: 0,
        })
    }

    pub fn append(&mut self, record: &TraceRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        if self.records_written > 0 {
            self.out.write_all(b",")?;
        }
        self.out.write_all(b"\n")?;
        self.out.write_all(line.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Close the JSON array and flush.
    pub fn finish(mut self) -> io::Result<()> {
        self.out.write_all(b"\n]\n")?;
        self.out.flush()
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}
