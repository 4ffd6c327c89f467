//! JSON report of the current reading and the historical window.

use std::io::Write;
use std::path::Path;

use airwatch_types::SensorSnapshot;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};

use super::history::HistoricalWindow;
use super::index::derive_metrics;
use super::status::{parameter_statuses, AirQualityStatus};
use crate::alert::evaluate;

/// An exportable report.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    generated_at: DateTime<Local>,
    current: Option<&'a SensorSnapshot>,
    history: Option<&'a HistoricalWindow>,
}

impl<'a> Report<'a> {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            current: None,
            history: None,
        }
    }

    pub fn with_current(mut self, snapshot: &'a SensorSnapshot) -> Self {
        self.current = Some(snapshot);
        self
    }

    pub fn with_history(mut self, window: &'a HistoricalWindow) -> Self {
        self.history = Some(window);
        self
    }

    /// Build the JSON document.
    pub fn to_json(&self) -> Value {
        let mut export = Map::new();
        export.insert("generated_at".to_string(), json!(self.generated_at.to_rfc3339()));

        if let Some(snapshot) = self.current {
            export.insert("current".to_string(), current_section(snapshot));
        }

        if let Some(window) = self.history {
            export.insert("history".to_string(), history_section(window));
        }

        Value::Object(export)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

fn current_section(snapshot: &SensorSnapshot) -> Value {
    let derived = derive_metrics(snapshot);
    let alerts = evaluate(snapshot);
    let status = AirQualityStatus::assess(snapshot, &alerts);

    let readings: Vec<Value> = parameter_statuses(snapshot)
        .into_iter()
        .map(|(parameter, value, health)| {
            json!({
                "parameter": parameter,
                "label": parameter.label(),
                "value": value,
                "unit": parameter.unit(),
                "status": health,
            })
        })
        .collect();

    json!({
        "entry_id": snapshot.entry_id,
        "created_at": snapshot.created_at,
        "readings": readings,
        "index": derived.index,
        "contributions": derived.contributions,
        "alerts": alerts,
        "status": status,
        "status_label": status.label(),
    })
}

fn history_section(window: &HistoricalWindow) -> Value {
    let (from, to) = window.span().unwrap_or_default();
    json!({
        "time_range_days": window.days(),
        "samples": window.len(),
        "from": from,
        "to": to,
        "parameters": window.averages(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwatch_types::Parameter;
    use tempfile::TempDir;

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot::builder()
            .entry_id(42)
            .created_at("2025-04-01T12:00:00Z")
            .reading(Parameter::Temperature, 22.0)
            .reading(Parameter::Humidity, 45.0)
            .reading(Parameter::Co2, 500.0)
            .build()
    }

    #[test]
    fn test_current_section() {
        let snapshot = snapshot();
        let value = Report::new(Local::now()).with_current(&snapshot).to_json();

        let current = &value["current"];
        assert_eq!(current["entry_id"], 42);
        assert_eq!(current["readings"].as_array().unwrap().len(), 3);
        assert_eq!(current["contributions"]["co2"]["score"], 8);
        // round(0.4 * 8) = 3
        assert_eq!(current["index"]["value"], 3);
        assert_eq!(current["index"]["color"], "#00e400");
        assert_eq!(current["alerts"]["co2_alert"], true);
        assert_eq!(current["alerts"]["any_alert"], true);
        assert_eq!(current["status"], "critical");
        assert!(value.get("history").is_none());
    }

    #[test]
    fn test_history_section() {
        let window = HistoricalWindow::new(7, vec![snapshot()]);
        let value = Report::new(Local::now()).with_history(&window).to_json();

        let history = &value["history"];
        assert_eq!(history["time_range_days"], 7);
        assert_eq!(history["samples"], 1);
        assert_eq!(history["parameters"].as_array().unwrap().len(), 6);
        assert_eq!(history["parameters"][2]["parameter"], "co2");
        assert_eq!(history["parameters"][2]["average"], 500.0);
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let snapshot = snapshot();

        Report::new(Local::now()).with_current(&snapshot).write_to(&path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["current"]["created_at"], "2025-04-01T12:00:00Z");
    }
}
