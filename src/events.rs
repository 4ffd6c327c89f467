//! Events emitted by a polling session.

use std::fmt;
use std::sync::Arc;

use airwatch_types::SensorSnapshot;
use serde::Serialize;

use crate::alert::AlertState;
use crate::data::HistoricalWindow;

/// The two independently fetched feeds of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// The latest reading, refreshed every few seconds.
    Current,
    /// The historical window, refreshed on request.
    Historical,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Current => f.write_str("current"),
            FeedKind::Historical => f.write_str("historical"),
        }
    }
}

/// A state change of a session.
///
/// Snapshots and windows are shared, so cloning an event is cheap.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new current reading replaced the previous one.
    SnapshotUpdated(Arc<SensorSnapshot>),
    /// Alerts were evaluated for the current reading.
    AlertEvaluated {
        snapshot: Arc<SensorSnapshot>,
        alerts: AlertState,
    },
    /// A new historical window replaced the previous one.
    HistoryUpdated(Arc<HistoricalWindow>),
    /// A feed's error changed. `None` means the error cleared.
    ErrorChanged {
        feed: FeedKind,
        error: Option<String>,
    },
    /// The session stopped; no further events follow.
    Stopped,
}
