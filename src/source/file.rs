//! File-based telemetry source.
//!
//! Replays a recorded feed file shaped like the provider's history response
//! (`{"feeds": [...]}`). The file is re-read on every request, so appending
//! entries to it while a session runs behaves like a live channel.

use std::path::{Path, PathBuf};

use airwatch_types::{Feed, SensorSnapshot};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use super::TelemetrySource;

/// A telemetry source that reads a recorded feed file.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    path: PathBuf,
}

impl ReplaySource {
    /// Create a new replay source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file, entries ordered oldest first.
    async fn read_feed(&self) -> Result<Vec<SensorSnapshot>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Read error: {}", self.path.display()))?;
        let feed: Feed = serde_json::from_str(&content)
            .with_context(|| format!("Parse error: {}", self.path.display()))?;

        let mut entries = feed.feeds;
        entries.sort_by_key(|s| s.entry_id);
        Ok(entries)
    }
}

#[async_trait]
impl TelemetrySource for ReplaySource {
    async fn latest(&self) -> Result<SensorSnapshot> {
        self.read_feed()
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Feed file {} contains no entries", self.path.display()))
    }

    async fn history(&self, results: usize) -> Result<Vec<SensorSnapshot>> {
        let mut entries = self.read_feed().await?;
        if entries.len() > results {
            entries.drain(..entries.len() - results);
        }
        Ok(entries)
    }

    fn description(&self) -> String {
        format!("replay: {}", self.path.display())
    }
}
