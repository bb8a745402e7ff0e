use crate::catalog::RoomConfig;
use crate::event::{ActuatorCommand, SensorReading, SwitchState};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Latest merged view of a room: reading, resulting command, and schedule
/// flag, shaped exactly as the status query and the state file expose it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomState {
    pub name: String,
    pub temp: f64,
    pub humidity: f64,
    pub lux: f64,
    pub co2: f64,

    /// "Yes" / "No" on the wire
    #[serde(with = "yes_no")]
    pub occupancy: bool,

    /// "Class Active" / "No Class" on the wire
    #[serde(with = "class_flag")]
    pub scheduled: bool,

    pub lights: SwitchState,
    pub heating: SwitchState,

    /// Local wall-clock "HH:MM:SS" of the last processed reading
    pub last_update: String,
}

impl RoomState {
    /// Build the complete replacement entry for one processed sensor cycle.
    pub fn merged(
        config: &RoomConfig,
        reading: &SensorReading,
        command: &ActuatorCommand,
        scheduled: bool,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            temp: reading.temperature,
            humidity: reading.humidity,
            lux: reading.light_lux,
            co2: reading.co2,
            occupancy: reading.occupancy,
            scheduled,
            lights: command.lights,
            heating: command.heating,
            last_update: now.format("%H:%M:%S").to_string(),
        }
    }
}

mod yes_no {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "Yes" => Ok(true),
            "No" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected \"Yes\" or \"No\", got \"{}\"",
                other
            ))),
        }
    }
}

mod class_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Class Active" } else { "No Class" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "Class Active" => Ok(true),
            "No Class" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected \"Class Active\" or \"No Class\", got \"{}\"",
                other
            ))),
        }
    }
}
