//! Non-blocking trace event pipeline for performance simulators.
//!
//! Simulation code emits timestamped events through a cheap, cloneable
//! [`Tracer`] handle; a background collector buffers them and periodically
//! appends them to a Chrome Trace Event Format file. Producers never block
//! on file I/O.
//!
//! ```no_run
//! use simtrace::{Collector, Config};
//!
//! let (tracer, collector) = Collector::start(Config::default())?;
//! tracer.duration_begin(0, 0, "fetch", 100, 0);
//! tracer.duration_end(0, 0, "fetch", 150, 0);
//! collector.stop()?;
//! # Ok::<(), simtrace::TraceError>(())
//! ```

use thiserror::Error;

pub mod buffer;
pub mod collector;
pub mod config;
pub mod event;
pub mod serialize;
pub mod tracer;
pub mod transport;
pub mod writer;

pub use collector::Collector;
pub use config::{Config, NameTables};
pub use event::TraceEvent;
pub use tracer::Tracer;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("process index {index} out of bounds for name table of {len}")]
    ProcessIndex { index: u32, len: usize },
    #[error("thread index {index} out of bounds for name table of {len}")]
    ThreadIndex { index: u32, len: usize },
    #[error("category index {index} out of bounds for name table of {len}")]
    CategoryIndex { index: u32, len: usize },
    #[error("flusher thread panicked")]
    FlusherPanicked,
}

pub type Result<T> = std::result::Result<T, TraceError>;
