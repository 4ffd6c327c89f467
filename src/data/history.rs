//! Historical window of snapshots and its summary statistics.

use airwatch_types::{Parameter, SensorSnapshot, SAMPLES_PER_DAY};
use serde::Serialize;

/// Default length of the historical window in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Number of samples the provider is asked for to cover `days` days.
///
/// The sensor reports every 10 minutes, so one day is 144 samples.
pub fn samples_for_days(days: u32) -> usize {
    days as usize * SAMPLES_PER_DAY
}

/// Time-ascending snapshots covering the last `days` days.
///
/// A window is never patched in place: every refresh replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalWindow {
    days: u32,
    snapshots: Vec<SensorSnapshot>,
}

/// Lowest, highest and mean value of one parameter over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub parameter: Parameter,
    /// Mean of the present values, 0 when none are present.
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Number of snapshots that carried a usable value.
    pub samples: usize,
}

impl HistoricalWindow {
    /// Build a window from provider results.
    ///
    /// Entries are ordered by `entry_id` and trimmed to the newest
    /// `samples_for_days(days)` entries.
    pub fn new(days: u32, mut snapshots: Vec<SensorSnapshot>) -> Self {
        snapshots.sort_by_key(|s| s.entry_id);
        let bound = samples_for_days(days);
        if snapshots.len() > bound {
            snapshots.drain(..snapshots.len() - bound);
        }
        Self { days, snapshots }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn snapshots(&self) -> &[SensorSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Oldest and newest timestamps in the window.
    pub fn span(&self) -> Option<(&str, &str)> {
        let first = self.snapshots.first()?;
        let last = self.snapshots.last()?;
        Some((first.created_at.as_str(), last.created_at.as_str()))
    }

    /// Values of one parameter, skipping snapshots where it is absent.
    pub fn series(&self, parameter: Parameter) -> impl Iterator<Item = f64> + '_ {
        self.snapshots.iter().filter_map(move |s| s.get(parameter))
    }

    /// Summary for one parameter.
    pub fn summary(&self, parameter: Parameter) -> ParameterSummary {
        let mut summary = ParameterSummary {
            parameter,
            average: 0.0,
            min: None,
            max: None,
            samples: 0,
        };

        let mut sum = 0.0;
        for value in self.series(parameter) {
            sum += value;
            summary.samples += 1;
            summary.min = Some(summary.min.map_or(value, |m| m.min(value)));
            summary.max = Some(summary.max.map_or(value, |m| m.max(value)));
        }

        if summary.samples > 0 {
            summary.average = sum / summary.samples as f64;
        }
        summary
    }

    /// Summaries for all six parameters, in display order.
    pub fn averages(&self) -> Vec<ParameterSummary> {
        Parameter::ALL.iter().map(|p| self.summary(*p)).collect()
    }
}
