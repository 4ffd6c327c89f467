//! Telemetry source abstraction.
//!
//! A session pulls readings from a [`TelemetrySource`]: the live ThingSpeak
//! channel in production, or a recorded feed file for offline runs.

mod file;
mod thingspeak;

pub use file::ReplaySource;

use std::fmt::Debug;

use airwatch_types::SensorSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Trait for pulling sensor readings from a telemetry provider.
///
/// # Example
///
/// ```no_run
/// use airwatch::{ReplaySource, TelemetrySource};
///
/// # async fn demo() -> anyhow::Result<()> {
/// let source = ReplaySource::new("feeds.json");
/// let latest = source.latest().await?;
/// println!("Entry {} from {}", latest.entry_id, source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TelemetrySource: Send + Sync + Debug {
    /// Fetch the most recent reading.
    async fn latest(&self) -> Result<SensorSnapshot>;

    /// Fetch up to `results` most recent readings, oldest first.
    async fn history(&self, results: usize) -> Result<Vec<SensorSnapshot>>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> String;
}
