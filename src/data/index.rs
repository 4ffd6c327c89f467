//! Composite air-quality index derivation.
//!
//! Each snapshot is scored per parameter (temperature, humidity, CO₂ and the
//! mean of the three combustible gases). The composite index is the weighted
//! sum of those scores: 10% temperature, 10% humidity, 40% CO₂, 40% gases,
//! rounded and capped at [`MAX_INDEX`].
//!
//! Everything here is pure: no I/O, no clocks, no shared state.

use std::fmt;

use airwatch_types::{Parameter, SensorSnapshot};
use serde::Serialize;

/// Upper bound of the composite index.
pub const MAX_INDEX: u32 = 500;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Six-level category scale of the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Category for an index value.
    pub fn from_index(value: u32) -> Self {
        match value {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            AqiCategory::Good => Rgb::new(0x00, 0xe4, 0x00),
            AqiCategory::Moderate => Rgb::new(0xff, 0xff, 0x00),
            AqiCategory::UnhealthyForSensitiveGroups => Rgb::new(0xff, 0x7e, 0x00),
            AqiCategory::Unhealthy => Rgb::new(0xff, 0x00, 0x00),
            AqiCategory::VeryUnhealthy => Rgb::new(0x8f, 0x3f, 0x97),
            AqiCategory::Hazardous => Rgb::new(0x7e, 0x00, 0x23),
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parameter's value and its score toward the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Contribution {
    pub value: f64,
    pub score: u32,
}

impl Contribution {
    /// Gauge color for this score (green up to 10, purple above 200).
    pub fn gauge_color(&self) -> Rgb {
        match self.score {
            0..=10 => Rgb::new(0x22, 0xc5, 0x5e),
            11..=50 => Rgb::new(0xea, 0xb3, 0x08),
            51..=100 => Rgb::new(0xf9, 0x73, 0x16),
            101..=200 => Rgb::new(0xef, 0x44, 0x44),
            _ => Rgb::new(0xa8, 0x55, 0xf7),
        }
    }
}

/// Scores of the four index inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Contributions {
    pub temperature: Contribution,
    pub humidity: Contribution,
    pub co2: Contribution,
    /// Mean of LPG, propane and butane.
    pub gases: Contribution,
}

/// The composite index with its category and display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompositeIndex {
    pub value: u32,
    pub category: AqiCategory,
    pub color: Rgb,
}

impl CompositeIndex {
    /// Build an index from a raw weighted value, capping it at [`MAX_INDEX`].
    pub fn new(value: u32) -> Self {
        let value = value.min(MAX_INDEX);
        let category = AqiCategory::from_index(value);
        Self {
            value,
            category,
            color: category.color(),
        }
    }
}

impl Default for CompositeIndex {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Result of deriving metrics from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedMetrics {
    pub contributions: Contributions,
    pub index: CompositeIndex,
}

/// Derive contributions and the composite index from a snapshot.
///
/// Missing fields read as zero. A snapshot with no usable reading at all
/// scores index 0 with zeroed contributions.
pub fn derive_metrics(snapshot: &SensorSnapshot) -> DerivedMetrics {
    if !snapshot.has_readings() {
        return DerivedMetrics::default();
    }

    let temperature = snapshot.value_or_zero(Parameter::Temperature);
    let humidity = snapshot.value_or_zero(Parameter::Humidity);
    let co2 = snapshot.value_or_zero(Parameter::Co2);
    let gases = gas_average(snapshot);

    let contributions = Contributions {
        temperature: Contribution {
            value: temperature,
            score: temperature_score(temperature),
        },
        humidity: Contribution {
            value: humidity,
            score: humidity_score(humidity),
        },
        co2: Contribution {
            value: co2,
            score: co2_score(co2),
        },
        gases: Contribution {
            value: gases,
            score: gas_score(gases),
        },
    };

    DerivedMetrics {
        contributions,
        index: CompositeIndex::new(weighted_index(&contributions)),
    }
}

/// Weighted sum of the scores, rounded half up.
///
/// Computed in tenths so the 10/10/40/40 weighting is exact.
pub fn weighted_index(c: &Contributions) -> u32 {
    let tenths = c.temperature.score as u64
        + c.humidity.score as u64
        + 4 * (c.co2.score as u64 + c.gases.score as u64);
    ((tenths + 5) / 10).min(u32::MAX as u64) as u32
}

/// Mean of the LPG, propane and butane readings (missing read as zero).
pub fn gas_average(snapshot: &SensorSnapshot) -> f64 {
    let sum: f64 = Parameter::GASES
        .iter()
        .map(|p| snapshot.value_or_zero(*p))
        .sum();
    sum / Parameter::GASES.len() as f64
}

/// Temperature score: 20-25 °C is ideal.
pub fn temperature_score(celsius: f64) -> u32 {
    if celsius < 15.0 {
        30
    } else if celsius < 20.0 {
        20
    } else if celsius <= 25.0 {
        0
    } else if celsius <= 30.0 {
        30
    } else {
        50
    }
}

/// Humidity score: 30-60 % is ideal.
pub fn humidity_score(percent: f64) -> u32 {
    if percent < 20.0 {
        40
    } else if percent < 30.0 {
        20
    } else if percent <= 60.0 {
        0
    } else if percent <= 70.0 {
        20
    } else {
        40
    }
}

/// CO₂ score, linear within each band.
pub fn co2_score(ppm: f64) -> u32 {
    if ppm < 400.0 {
        0
    } else if ppm < 1000.0 {
        round_half_up((ppm - 400.0) / 600.0 * 50.0)
    } else if ppm < 2000.0 {
        50 + round_half_up((ppm - 1000.0) / 1000.0 * 50.0)
    } else if ppm < 5000.0 {
        100 + round_half_up((ppm - 2000.0) / 3000.0 * 100.0)
    } else {
        200_u32.saturating_add(round_half_up((ppm - 5000.0) / 5000.0 * 100.0))
    }
}

/// Gas-average score, linear within each band.
pub fn gas_score(ppm: f64) -> u32 {
    if ppm < 100.0 {
        0
    } else if ppm < 500.0 {
        round_half_up(ppm / 500.0 * 50.0)
    } else if ppm < 1000.0 {
        50 + round_half_up((ppm - 500.0) / 500.0 * 50.0)
    } else if ppm < 2000.0 {
        100 + round_half_up((ppm - 1000.0) / 1000.0 * 100.0)
    } else {
        200_u32.saturating_add(round_half_up((ppm - 2000.0) / 3000.0 * 100.0))
    }
}

// Half-way cases round toward +inf; inputs here are never negative.
fn round_half_up(x: f64) -> u32 {
    (x + 0.5).floor() as u32
}
