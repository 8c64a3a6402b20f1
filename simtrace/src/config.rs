use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, TraceError};

/// Pipeline configuration, loadable from a toml file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output trace file path, opened in truncate mode at startup.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Flusher wake interval in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Transport channel capacity. When the channel is full, new events are
    /// dropped and counted rather than blocking the producer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub tables: NameTables,
}

fn default_output() -> PathBuf {
    PathBuf::from("event.json")
}

fn default_flush_interval_ms() -> u64 {
    100
}

fn default_channel_capacity() -> usize {
    8192
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: default_output(),
            flush_interval_ms: default_flush_interval_ms(),
            channel_capacity: default_channel_capacity(),
            tables: NameTables::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

/// Display-name tables for process, thread and category indices.
///
/// The wire event carries compact integer indices; the flusher resolves
/// them through these tables so the output file carries human-readable
/// lane names. Category index 0 is reserved for "uncategorized" and never
/// rendered, so `categories[0]` is conventionally empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameTables {
    #[serde(default = "default_processes")]
    pub processes: Vec<String>,
    #[serde(default = "default_threads")]
    pub threads: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_processes() -> Vec<String> {
    vec!["Thread0".into(), "Thread1".into(), "Thread2".into()]
}

fn default_threads() -> Vec<String> {
    vec![
        "fetch".into(),
        "decode".into(),
        "rename".into(),
        "iew".into(),
        "commit".into(),
    ]
}

fn default_categories() -> Vec<String> {
    vec!["".into(), "squash".into()]
}

impl Default for NameTables {
    fn default() -> Self {
        NameTables {
            processes: default_processes(),
            threads: default_threads(),
            categories: default_categories(),
        }
    }
}

impl NameTables {
    pub fn process_name(&self, index: u32) -> Result<&str> {
        self.processes
            .get(index as usize)
            .map(String::as_str)
            .ok_or(TraceError::ProcessIndex {
                index,
                len: self.processes.len(),
            })
    }

    pub fn thread_name(&self, index: u32) -> Result<&str> {
        self.threads
            .get(index as usize)
            .map(String::as_str)
            .ok_or(TraceError::ThreadIndex {
                index,
                len: self.threads.len(),
            })
    }

    /// Resolve a category index. Index 0 means uncategorized and resolves
    /// to `None`; any other index must be in bounds.
    pub fn category_name(&self, index: u32) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.categories
            .get(index as usize)
            .map(|name| Some(name.as_str()))
            .ok_or(TraceError::CategoryIndex {
                index,
                len: self.categories.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.output, PathBuf::from("event.json"));
        assert_eq!(config.flush_interval_ms, 100);
        assert_eq!(config.channel_capacity, 8192);
        assert_eq!(config.tables.threads.len(), 5);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: Config = toml::from_str(
            r#"
output = "run1.json"
flush_interval_ms = 10

[tables]
processes = ["core0"]
"#,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("run1.json"));
        assert_eq!(config.flush_interval_ms, 10);
        assert_eq!(config.tables.processes, vec!["core0".to_string()]);
        // unset table fields still default
        assert_eq!(config.tables.threads[0], "fetch");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "channel_capacity = 16\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_lookups_bounds_checked_uniformly() {
        let tables = NameTables::default();
        assert_eq!(tables.process_name(0).unwrap(), "Thread0");
        assert_eq!(tables.thread_name(4).unwrap(), "commit");
        assert!(matches!(
            tables.process_name(3),
            Err(TraceError::ProcessIndex { index: 3, len: 3 })
        ));
        assert!(matches!(
            tables.thread_name(9),
            Err(TraceError::ThreadIndex { index: 9, .. })
        ));
        assert!(matches!(
            tables.category_name(7),
            Err(TraceError::CategoryIndex { index: 7, .. })
        ));
    }

    #[test]
    fn test_category_zero_is_uncategorized() {
        let tables = NameTables::default();
        assert_eq!(tables.category_name(0).unwrap(), None);
        assert_eq!(tables.category_name(1).unwrap(), Some("squash"));
    }
}
