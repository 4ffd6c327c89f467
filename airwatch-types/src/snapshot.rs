//! SensorSnapshot - one timestamped set of readings from a channel.

use alloc::string::{String, ToString};

use crate::Parameter;

/// A single feed entry as published by the telemetry provider.
///
/// Readings are kept exactly as the provider sent them (text). Use
/// [`SensorSnapshot::get`] to obtain a parsed value; anything absent, empty
/// or not a finite number reads as `None`.
///
/// # Example
///
/// ```rust
/// use airwatch_types::{Parameter, SensorSnapshot};
///
/// let snapshot = SensorSnapshot::builder()
///     .entry_id(7)
///     .raw(Parameter::Humidity, "48.20")
///     .raw(Parameter::Co2, "n/a")
///     .build();
///
/// assert_eq!(snapshot.get(Parameter::Humidity), Some(48.2));
/// assert_eq!(snapshot.get(Parameter::Co2), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSnapshot {
    /// ISO-8601 creation time assigned by the provider.
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: String,

    /// Monotonic entry number within the channel.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_id: u64,

    /// Temperature (°C).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field1: Option<String>,

    /// Humidity (%).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field2: Option<String>,

    /// CO₂ (ppm).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field3: Option<String>,

    /// LPG (ppm).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field4: Option<String>,

    /// Propane (ppm).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field5: Option<String>,

    /// Butane (ppm).
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "text_field::deserialize", skip_serializing_if = "Option::is_none")
    )]
    pub field6: Option<String>,
}

impl SensorSnapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SensorSnapshotBuilder {
        SensorSnapshotBuilder::new()
    }

    /// The raw text published for a parameter, if any.
    pub fn raw(&self, parameter: Parameter) -> Option<&str> {
        self.slot(parameter).as_deref()
    }

    /// Parsed reading for a parameter.
    ///
    /// Returns `None` when the field is absent, blank, or not a finite number.
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.raw(parameter)
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Parsed reading, with missing values treated as zero.
    pub fn value_or_zero(&self, parameter: Parameter) -> f64 {
        self.get(parameter).unwrap_or(0.0)
    }

    /// Check if at least one parameter carries a usable reading.
    pub fn has_readings(&self) -> bool {
        Parameter::ALL.iter().any(|p| self.get(*p).is_some())
    }

    /// Iterate over the usable readings in wire field order.
    pub fn readings(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    /// Replace the raw text for a parameter.
    pub fn set_raw(&mut self, parameter: Parameter, value: Option<String>) {
        *self.slot_mut(parameter) = value;
    }

    fn slot(&self, parameter: Parameter) -> &Option<String> {
        match parameter.index() {
            0 => &self.field1,
            1 => &self.field2,
            2 => &self.field3,
            3 => &self.field4,
            4 => &self.field5,
            _ => &self.field6,
        }
    }

    fn slot_mut(&mut self, parameter: Parameter) -> &mut Option<String> {
        match parameter.index() {
            0 => &mut self.field1,
            1 => &mut self.field2,
            2 => &mut self.field3,
            3 => &mut self.field4,
            4 => &mut self.field5,
            _ => &mut self.field6,
        }
    }
}

/// Builder for constructing `SensorSnapshot` instances.
#[derive(Debug, Default)]
pub struct SensorSnapshotBuilder {
    snapshot: SensorSnapshot,
}

impl SensorSnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider creation time (ISO-8601).
    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.snapshot.created_at = created_at.into();
        self
    }

    /// Set the entry number.
    pub fn entry_id(mut self, entry_id: u64) -> Self {
        self.snapshot.entry_id = entry_id;
        self
    }

    /// Set a numeric reading.
    pub fn reading(mut self, parameter: Parameter, value: f64) -> Self {
        self.snapshot.set_raw(parameter, Some(value.to_string()));
        self
    }

    /// Set the raw text for a reading, exactly as a provider would send it.
    pub fn raw(mut self, parameter: Parameter, text: impl Into<String>) -> Self {
        self.snapshot.set_raw(parameter, Some(text.into()));
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> SensorSnapshot {
        self.snapshot
    }
}

/// Providers publish readings as strings, but some gateways emit bare
/// numbers. Anything else (booleans, objects) is dropped to `None`.
#[cfg(feature = "serde")]
mod text_field {
    use alloc::string::{String, ToString};

    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Text(String),
        Number(f64),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawField> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|field| match field {
            RawField::Text(text) => Some(text),
            RawField::Number(n) => Some(n.to_string()),
            RawField::Other(_) => None,
        }))
    }
}
