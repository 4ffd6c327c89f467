//! Overall air-quality status and the matching recommendations.

use std::fmt;

use airwatch_types::{Parameter, SensorSnapshot};
use serde::Serialize;

use super::thresholds::{HealthStatus, Thresholds};
use crate::alert::AlertState;

/// Overall status shown alongside the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityStatus {
    Good,
    Warning,
    Critical,
}

/// A single recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const GENERAL_TIPS: [Tip; 4] = [
    Tip {
        id: "plants",
        title: "Introduce Indoor Plants",
        description: "Spider plant, snake plant, or peace lily naturally filter air and absorb pollutants.",
    },
    Tip {
        id: "cleaning",
        title: "Regular Cleaning",
        description: "Dust and vacuum frequently to remove particulate matter and allergens that can affect air quality.",
    },
    Tip {
        id: "ventilation",
        title: "Improve Ventilation",
        description: "Open windows and doors to allow fresh air circulation and reduce indoor pollutant buildup.",
    },
    Tip {
        id: "filters",
        title: "Use Air Purifiers",
        description: "HEPA air purifiers can remove up to 99.97% of airborne particles as small as 0.3 microns.",
    },
];

const WARNING_TIPS: [Tip; 3] = [
    Tip {
        id: "windows",
        title: "Keep Windows Open",
        description: "When gas levels are elevated, ensure proper ventilation to reduce concentration.",
    },
    Tip {
        id: "appliances",
        title: "Check Gas Appliances",
        description: "Inspect gas appliances for leaks or malfunctions that could be releasing gases.",
    },
    Tip {
        id: "activities",
        title: "Limit Indoor Cooking",
        description: "Reduce cooking activities that produce gases and ensure hood vents are working properly.",
    },
];

const CRITICAL_TIPS: [Tip; 3] = [
    Tip {
        id: "evacuate",
        title: "Evacuate Immediately",
        description: "If gas levels are critically high, leave the area immediately and call emergency services from a safe location.",
    },
    Tip {
        id: "shutoff",
        title: "Shut Off Gas Supply",
        description: "If safe to do so, turn off the main gas supply to prevent further leakage.",
    },
    Tip {
        id: "medical",
        title: "Seek Medical Advice",
        description: "Consult a healthcare professional if you experience symptoms like headache, dizziness, or nausea.",
    },
];

// Temperature and humidity never raise the overall status.
const WARNING_PARAMETERS: [Parameter; 4] =
    [Parameter::Co2, Parameter::Lpg, Parameter::Propane, Parameter::Butane];

impl AirQualityStatus {
    /// Classify a snapshot given its alert state.
    ///
    /// Any alert makes the status Critical. Otherwise a CO₂ or gas reading
    /// above its warning bound makes it Warning.
    pub fn assess(snapshot: &SensorSnapshot, alerts: &AlertState) -> Self {
        if alerts.any_alert() {
            return AirQualityStatus::Critical;
        }

        let thresholds = Thresholds::STANDARD;
        let elevated = WARNING_PARAMETERS.iter().any(|p| {
            snapshot
                .get(*p)
                .is_some_and(|v| thresholds.status(*p, v) >= HealthStatus::Warning)
        });

        if elevated {
            AirQualityStatus::Warning
        } else {
            AirQualityStatus::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirQualityStatus::Good => "Good",
            AirQualityStatus::Warning => "Warning - Needs Attention",
            AirQualityStatus::Critical => "Critical - Take Action Now",
        }
    }

    /// One-line summary introducing the recommendations.
    pub fn summary(&self) -> &'static str {
        match self {
            AirQualityStatus::Good => "Your air quality is good! Here are some tips to maintain it.",
            AirQualityStatus::Warning => {
                "Your air quality needs attention. Consider these recommendations to improve it."
            }
            AirQualityStatus::Critical => {
                "Your air quality is critical. Take immediate action with these recommendations."
            }
        }
    }

    /// Recommendations for this status, most urgent first.
    pub fn recommendations(&self) -> Vec<Tip> {
        match self {
            AirQualityStatus::Good => GENERAL_TIPS.to_vec(),
            AirQualityStatus::Warning => WARNING_TIPS.iter().chain(&GENERAL_TIPS).copied().collect(),
            AirQualityStatus::Critical => CRITICAL_TIPS
                .iter()
                .chain(&WARNING_TIPS)
                .chain(&GENERAL_TIPS[..2])
                .copied()
                .collect(),
        }
    }
}

impl fmt::Display for AirQualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-parameter status of a snapshot; absent readings are skipped.
pub fn parameter_statuses(snapshot: &SensorSnapshot) -> Vec<(Parameter, f64, HealthStatus)> {
    let thresholds = Thresholds::STANDARD;
    snapshot
        .readings()
        .map(|(p, v)| (p, v, thresholds.status(p, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::evaluate;

    fn assess(readings: &[(Parameter, f64)]) -> AirQualityStatus {
        let snapshot = readings
            .iter()
            .fold(SensorSnapshot::builder(), |b, (p, v)| b.reading(*p, *v))
            .build();
        AirQualityStatus::assess(&snapshot, &evaluate(&snapshot))
    }

    #[test]
    fn test_good_when_quiet() {
        assert_eq!(assess(&[]), AirQualityStatus::Good);
        assert_eq!(assess(&[(Parameter::Co2, 250.0)]), AirQualityStatus::Good);
    }

    #[test]
    fn test_warning_tier() {
        assert_eq!(assess(&[(Parameter::Co2, 300.0)]), AirQualityStatus::Warning);
        assert_eq!(assess(&[(Parameter::Lpg, 1200.0)]), AirQualityStatus::Warning);
    }

    #[test]
    fn test_temperature_does_not_raise_status() {
        assert_eq!(
            assess(&[(Parameter::Temperature, 40.0), (Parameter::Humidity, 90.0)]),
            AirQualityStatus::Good
        );
    }

    #[test]
    fn test_alert_is_critical() {
        assert_eq!(assess(&[(Parameter::Co2, 450.0)]), AirQualityStatus::Critical);
        assert_eq!(assess(&[(Parameter::Propane, 201.0)]), AirQualityStatus::Critical);
    }

    #[test]
    fn test_recommendations_by_status() {
        let ids = |s: AirQualityStatus| s.recommendations().iter().map(|t| t.id).collect::<Vec<_>>();

        assert_eq!(ids(AirQualityStatus::Good), ["plants", "cleaning", "ventilation", "filters"]);
        assert_eq!(ids(AirQualityStatus::Warning).len(), 7);
        assert_eq!(ids(AirQualityStatus::Warning)[0], "windows");
        assert_eq!(
            ids(AirQualityStatus::Critical),
            [
                "evacuate",
                "shutoff",
                "medical",
                "windows",
                "appliances",
                "activities",
                "plants",
                "cleaning"
            ]
        );
    }

    #[test]
    fn test_parameter_statuses_skip_absent() {
        let snapshot = SensorSnapshot::builder()
            .reading(Parameter::Temperature, 36.0)
            .reading(Parameter::Co2, 300.0)
            .build();
        let statuses = parameter_statuses(&snapshot);
        assert_eq!(
            statuses,
            vec![
                (Parameter::Temperature, 36.0, HealthStatus::Critical),
                (Parameter::Co2, 300.0, HealthStatus::Warning),
            ]
        );
    }
}
