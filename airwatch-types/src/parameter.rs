//! The measured quantities carried by a channel.

use core::fmt;

/// One of the six quantities reported by the sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Parameter {
    /// Ambient temperature in °C.
    Temperature,
    /// Relative humidity in %.
    Humidity,
    /// Carbon dioxide in ppm (MQ135).
    Co2,
    /// Liquefied petroleum gas in ppm (MQ6).
    Lpg,
    /// Propane in ppm (MQ6).
    Propane,
    /// Butane in ppm (MQ6).
    Butane,
}

impl Parameter {
    /// All parameters in wire field order.
    pub const ALL: [Parameter; 6] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Co2,
        Parameter::Lpg,
        Parameter::Propane,
        Parameter::Butane,
    ];

    /// The three combustible gases averaged into the gas score.
    pub const GASES: [Parameter; 3] = [Parameter::Lpg, Parameter::Propane, Parameter::Butane];

    /// The provider field key this parameter is published under.
    pub fn field_key(&self) -> &'static str {
        match self {
            Parameter::Temperature => "field1",
            Parameter::Humidity => "field2",
            Parameter::Co2 => "field3",
            Parameter::Lpg => "field4",
            Parameter::Propane => "field5",
            Parameter::Butane => "field6",
        }
    }

    /// Look up a parameter by its provider field key.
    pub fn from_field_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.field_key() == key)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Temperature => "Temperature",
            Parameter::Humidity => "Humidity",
            Parameter::Co2 => "CO₂",
            Parameter::Lpg => "LPG",
            Parameter::Propane => "Propane",
            Parameter::Butane => "Butane",
        }
    }

    /// Display unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Temperature => "°C",
            Parameter::Humidity => "%",
            Parameter::Co2 | Parameter::Lpg | Parameter::Propane | Parameter::Butane => "ppm",
        }
    }

    /// Index into wire field order (0 for `field1`).
    pub(crate) fn index(&self) -> usize {
        match self {
            Parameter::Temperature => 0,
            Parameter::Humidity => 1,
            Parameter::Co2 => 2,
            Parameter::Lpg => 3,
            Parameter::Propane => 4,
            Parameter::Butane => 5,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_follow_wire_order() {
        for (i, p) in Parameter::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(p.field_key(), alloc::format!("field{}", i + 1));
        }
    }

    #[test]
    fn from_field_key_round_trips() {
        assert_eq!(Parameter::from_field_key("field3"), Some(Parameter::Co2));
        assert_eq!(Parameter::from_field_key("field7"), None);
    }

    #[test]
    fn units() {
        assert_eq!(Parameter::Temperature.unit(), "°C");
        assert_eq!(Parameter::Humidity.unit(), "%");
        assert_eq!(Parameter::Propane.unit(), "ppm");
    }
}
