use serde::{Deserialize, Serialize};
use std::fmt;

mod validation;

pub use validation::{validate, ValidationError};

/// Binary actuator state as carried on the wire ("ON"/"OFF").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchState::On => write!(f, "ON"),
            SwitchState::Off => write!(f, "OFF"),
        }
    }
}

/// Room operating status derived from occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "energy_save")]
    EnergySave,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Active => write!(f, "active"),
            RunStatus::EnergySave => write!(f, "energy_save"),
        }
    }
}

/// One inbound sensor sample for a room.
///
/// The wire payload carries `light` (lux) and `occupancy` as a 0/1 flag.
/// Missing numeric fields fall back to the fleet's nominal values; a missing
/// room id makes the payload unroutable and is rejected by `validate`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub room_id: String,

    /// Producer time, Unix epoch seconds
    #[serde(default)]
    pub timestamp: f64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default)]
    pub humidity: f64,

    #[serde(rename = "light", default)]
    pub light_lux: f64,

    #[serde(default = "default_co2")]
    pub co2: f64,

    #[serde(default, with = "occupancy_flag")]
    pub occupancy: bool,
}

fn default_temperature() -> f64 {
    20.0
}

fn default_co2() -> f64 {
    400.0
}

impl SensorReading {
    /// Validates a decoded reading before it enters the processing path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}

/// Command published to a room's actuator channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub room_id: String,
    pub timestamp: f64,
    pub lights: SwitchState,
    pub heating: SwitchState,
    pub status: RunStatus,
}

/// Actuator state echoed back on the actuator channel, e.g. for
/// externally-issued overrides. The room id comes from the subject.
#[derive(Clone, Debug, Deserialize)]
pub struct ActuatorState {
    #[serde(default)]
    pub timestamp: f64,
    pub lights: SwitchState,
    pub heating: SwitchState,
    pub status: RunStatus,
}

/// Occupancy is an integer flag on the wire, a bool in the model.
mod occupancy_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}
