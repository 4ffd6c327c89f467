//! Console view state fed by session events.

use std::fmt::Write as _;
use std::sync::Arc;

use airwatch_types::{Parameter, SensorSnapshot};

use crate::alert::AlertState;
use crate::data::{
    derive_metrics, parameter_statuses, AirQualityStatus, DerivedMetrics, HistoricalWindow,
};
use crate::events::{FeedKind, SessionEvent};

/// What the console shows, rebuilt from session events.
#[derive(Debug, Clone, Default)]
pub struct App {
    pub running: bool,
    source: String,
    pub snapshot: Option<Arc<SensorSnapshot>>,
    pub derived: DerivedMetrics,
    pub alerts: AlertState,
    pub status: Option<AirQualityStatus>,
    pub history: Option<Arc<HistoricalWindow>>,
    pub current_error: Option<String>,
    pub history_error: Option<String>,
}

/// What changed after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    None,
    Reading,
    /// The overall status moved to a different level.
    Status,
    History,
    Error,
    Stopped,
}

impl App {
    /// Create an app for the given source description.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            running: true,
            source: source.into(),
            ..Default::default()
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        &self.source
    }

    /// Apply a session event.
    pub fn apply(&mut self, event: &SessionEvent) -> Change {
        match event {
            SessionEvent::SnapshotUpdated(snapshot) => {
                self.derived = derive_metrics(snapshot);
                self.snapshot = Some(Arc::clone(snapshot));
                Change::None
            }
            SessionEvent::AlertEvaluated { snapshot, alerts } => {
                self.alerts = *alerts;
                let status = AirQualityStatus::assess(snapshot, alerts);
                let previous = self.status.replace(status);
                if previous.is_some_and(|p| p != status) {
                    Change::Status
                } else {
                    Change::Reading
                }
            }
            SessionEvent::HistoryUpdated(window) => {
                self.history = Some(Arc::clone(window));
                Change::History
            }
            SessionEvent::ErrorChanged { feed, error } => {
                match feed {
                    FeedKind::Current => self.current_error = error.clone(),
                    FeedKind::Historical => self.history_error = error.clone(),
                }
                Change::Error
            }
            SessionEvent::Stopped => {
                self.running = false;
                Change::Stopped
            }
        }
    }

    /// One-line summary of the current reading.
    pub fn status_line(&self) -> String {
        let Some(snapshot) = &self.snapshot else {
            return "Waiting for first reading...".to_string();
        };

        let mut line = format!(
            "#{} {} | AQI {} {}",
            snapshot.entry_id,
            snapshot.created_at,
            self.derived.index.value,
            self.derived.index.category
        );

        for (parameter, value, health) in parameter_statuses(snapshot) {
            let _ = write!(
                line,
                " | {} {}{} {}",
                parameter.label(),
                format_value(parameter, value),
                parameter.unit(),
                health.symbol()
            );
        }

        if let Some(message) = self.alerts.message() {
            let _ = write!(line, " | {}", message);
        }
        line
    }

    /// Status heading with its recommendations.
    pub fn recommendations(&self) -> String {
        let Some(status) = self.status else {
            return String::new();
        };

        let mut text = format!("Air Quality Status: {}\n{}\n", status, status.summary());
        for tip in status.recommendations() {
            let _ = writeln!(text, "  - {}: {}", tip.title, tip.description);
        }
        text
    }

    /// Table of per-parameter averages over the historical window.
    pub fn history_summary(&self) -> String {
        let Some(window) = &self.history else {
            return "No historical data".to_string();
        };

        let mut text = format!("Last {} days, {} samples", window.days(), window.len());
        if let Some((from, to)) = window.span() {
            let _ = write!(text, " ({} .. {})", from, to);
        }
        text.push('\n');

        for summary in window.averages() {
            let p = summary.parameter;
            let range = match (summary.min, summary.max) {
                (Some(min), Some(max)) => {
                    format!("{} .. {}", format_value(p, min), format_value(p, max))
                }
                _ => "-".to_string(),
            };
            let _ = writeln!(
                text,
                "  {:<12} avg {:>8}{:<4} range {}",
                p.label(),
                format_value(p, summary.average),
                p.unit(),
                range
            );
        }
        text
    }
}

fn format_value(parameter: Parameter, value: f64) -> String {
    match parameter {
        Parameter::Co2 | Parameter::Butane => format!("{:.0}", value),
        _ => format!("{:.1}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::evaluate;

    fn reading(co2: f64) -> Arc<SensorSnapshot> {
        Arc::new(
            SensorSnapshot::builder()
                .entry_id(7)
                .created_at("2025-04-01T12:00:00Z")
                .reading(Parameter::Temperature, 22.5)
                .reading(Parameter::Co2, co2)
                .build(),
        )
    }

    fn feed(app: &mut App, snapshot: Arc<SensorSnapshot>) -> Change {
        app.apply(&SessionEvent::SnapshotUpdated(Arc::clone(&snapshot)));
        let alerts = evaluate(&snapshot);
        app.apply(&SessionEvent::AlertEvaluated { snapshot, alerts })
    }

    #[test]
    fn test_waiting_line() {
        let app = App::new("replay: feeds.json");
        assert_eq!(app.status_line(), "Waiting for first reading...");
        assert_eq!(app.source_description(), "replay: feeds.json");
        assert!(app.running);
    }

    #[test]
    fn test_status_line() {
        let mut app = App::new("test");
        feed(&mut app, reading(500.0));

        let line = app.status_line();
        assert!(line.starts_with("#7 2025-04-01T12:00:00Z | AQI"));
        assert!(line.contains("Temperature 22.5°C OK"));
        assert!(line.contains("CO₂ 500ppm WARN"));
        assert!(line.contains("ALERT: CO₂ levels above 400ppm!"));
    }

    #[test]
    fn test_status_change_detected() {
        let mut app = App::new("test");
        assert_eq!(feed(&mut app, reading(200.0)), Change::Reading);
        assert_eq!(feed(&mut app, reading(210.0)), Change::Reading);
        assert_eq!(feed(&mut app, reading(450.0)), Change::Status);
        assert_eq!(app.status, Some(AirQualityStatus::Critical));
        assert!(app.recommendations().contains("Evacuate Immediately"));
    }

    #[test]
    fn test_errors_and_stop() {
        let mut app = App::new("test");
        app.apply(&SessionEvent::ErrorChanged {
            feed: FeedKind::Historical,
            error: Some("boom".to_string()),
        });
        assert_eq!(app.history_error.as_deref(), Some("boom"));
        assert!(app.current_error.is_none());

        assert_eq!(app.apply(&SessionEvent::Stopped), Change::Stopped);
        assert!(!app.running);
    }

    #[test]
    fn test_history_summary() {
        let mut app = App::new("test");
        assert_eq!(app.history_summary(), "No historical data");

        let window = HistoricalWindow::new(7, vec![(*reading(400.0)).clone()]);
        app.apply(&SessionEvent::HistoryUpdated(Arc::new(window)));
        let text = app.history_summary();
        assert!(text.starts_with("Last 7 days, 1 samples"));
        assert!(text.contains("400 .. 400"));
    }
}
