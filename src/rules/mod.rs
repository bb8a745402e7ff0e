use crate::catalog::Thresholds;
use crate::event::{ActuatorCommand, RunStatus, SensorReading, SwitchState};

/// Decide the actuator command for a sensor reading.
///
/// Occupancy has absolute priority: an empty room forces lights and heating
/// off regardless of light level, temperature, or an active class booking.
/// While occupied, lights and heating are evaluated independently against
/// the room's thresholds. Pure function, no side effects; the command
/// carries the triggering reading's timestamp.
pub fn decide(reading: &SensorReading, thresholds: &Thresholds) -> ActuatorCommand {
    let occupied = reading.occupancy;

    let lights = if occupied && reading.light_lux < thresholds.light_threshold {
        SwitchState::On
    } else {
        SwitchState::Off
    };

    let heating = if occupied && reading.temperature < thresholds.target_temp {
        SwitchState::On
    } else {
        SwitchState::Off
    };

    ActuatorCommand {
        room_id: reading.room_id.clone(),
        timestamp: reading.timestamp,
        lights,
        heating,
        status: if occupied {
            RunStatus::Active
        } else {
            RunStatus::EnergySave
        },
    }
}
