use super::SensorReading;
use std::fmt;

/// Validation errors for inbound sensor payloads
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingRoomId,
    InvalidTimestamp(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingRoomId => write!(f, "room_id is required"),
            ValidationError::InvalidTimestamp(ts) => {
                write!(f, "timestamp must not be negative, got {}", ts)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a decoded sensor reading.
///
/// Decoding already defaults absent numeric fields, so the only hard
/// requirements are a non-empty room id and a non-negative producer
/// timestamp.
pub fn validate(reading: &SensorReading) -> Result<(), ValidationError> {
    if reading.room_id.is_empty() {
        return Err(ValidationError::MissingRoomId);
    }

    if reading.timestamp < 0.0 {
        return Err(ValidationError::InvalidTimestamp(reading.timestamp));
    }

    Ok(())
}
