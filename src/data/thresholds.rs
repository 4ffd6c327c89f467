//! Per-parameter warning/critical bounds and the separate alert cutoffs.
//!
//! Two tiers exist on purpose and must not be merged:
//!
//! - the **threshold table** drives color-coded status (Normal / Warning /
//!   Critical) for every parameter;
//! - the **alert cutoffs** drive [`AlertState`](crate::alert::AlertState)
//!   and therefore sound, notification and SMS side effects. The CO₂ cutoff
//!   (400 ppm) sits between the CO₂ warning (250) and critical (1000) bounds.

use airwatch_types::Parameter;
use serde::Serialize;

/// CO₂ level above which an alert is raised (ppm).
pub const CO2_ALERT_PPM: f64 = 400.0;

/// Propane level above which an alert is raised (ppm).
pub const PROPANE_ALERT_PPM: f64 = 200.0;

/// Butane level above which an alert is raised (ppm).
pub const BUTANE_ALERT_PPM: f64 = 200.0;

/// Health status for a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Normal,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Normal => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Warning and critical bounds for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    /// Values strictly above this are a warning.
    pub warning: f64,
    /// Values strictly above this are critical.
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Classify a value against these bounds.
    pub fn status(&self, value: f64) -> HealthStatus {
        if value > self.critical {
            HealthStatus::Critical
        } else if value > self.warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Normal
        }
    }
}

/// The threshold table for all six parameters.
///
/// Fixed for the lifetime of the process; use [`Thresholds::STANDARD`] or
/// `Thresholds::default()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thresholds {
    pub temperature: Threshold,
    pub humidity: Threshold,
    pub co2: Threshold,
    pub lpg: Threshold,
    pub propane: Threshold,
    pub butane: Threshold,
}

impl Thresholds {
    pub const STANDARD: Thresholds = Thresholds {
        temperature: Threshold::new(30.0, 35.0),
        humidity: Threshold::new(70.0, 85.0),
        co2: Threshold::new(250.0, 1000.0),
        lpg: Threshold::new(1000.0, 2000.0),
        propane: Threshold::new(200.0, 1000.0),
        butane: Threshold::new(200.0, 1000.0),
    };

    /// Bounds for a parameter.
    pub fn get(&self, parameter: Parameter) -> Threshold {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Co2 => self.co2,
            Parameter::Lpg => self.lpg,
            Parameter::Propane => self.propane,
            Parameter::Butane => self.butane,
        }
    }

    /// Classify a reading for a parameter.
    pub fn status(&self, parameter: Parameter, value: f64) -> HealthStatus {
        self.get(parameter).status(value)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}
