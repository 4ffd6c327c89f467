//! Alert evaluation against the fixed alert cutoffs.

use airwatch_types::{Parameter, SensorSnapshot};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::data::thresholds::{BUTANE_ALERT_PPM, CO2_ALERT_PPM, PROPANE_ALERT_PPM};

/// Which alert cutoffs a snapshot breaches.
///
/// Recomputed in full for every snapshot. `any_alert` is derived from the
/// three channel flags and therefore always consistent with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlertState {
    pub co2_alert: bool,
    pub propane_alert: bool,
    pub butane_alert: bool,
}

impl AlertState {
    pub fn any_alert(&self) -> bool {
        self.co2_alert || self.propane_alert || self.butane_alert
    }

    /// Human-readable alert text listing only the breached channels.
    ///
    /// Returns `None` when nothing is breached.
    pub fn message(&self) -> Option<String> {
        if !self.any_alert() {
            return None;
        }

        let mut message = String::from("ALERT: ");
        if self.co2_alert {
            message.push_str("CO₂ levels above 400ppm! ");
        }
        if self.propane_alert {
            message.push_str("Propane levels above 200ppm! ");
        }
        if self.butane_alert {
            message.push_str("Butane levels above 200ppm! ");
        }
        message.push_str("Please check air quality immediately.");
        Some(message)
    }
}

impl Serialize for AlertState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AlertState", 4)?;
        state.serialize_field("co2_alert", &self.co2_alert)?;
        state.serialize_field("propane_alert", &self.propane_alert)?;
        state.serialize_field("butane_alert", &self.butane_alert)?;
        state.serialize_field("any_alert", &self.any_alert())?;
        state.end()
    }
}

/// Evaluate a snapshot against the alert cutoffs.
///
/// Absent or malformed readings never alert.
pub fn evaluate(snapshot: &SensorSnapshot) -> AlertState {
    AlertState {
        co2_alert: snapshot.value_or_zero(Parameter::Co2) > CO2_ALERT_PPM,
        propane_alert: snapshot.value_or_zero(Parameter::Propane) > PROPANE_ALERT_PPM,
        butane_alert: snapshot.value_or_zero(Parameter::Butane) > BUTANE_ALERT_PPM,
    }
}
