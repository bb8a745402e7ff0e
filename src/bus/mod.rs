// Bus client, subject scheme, and the actuator command publisher

mod client;
mod publisher;

pub use client::{BusClient, BusConfig};
pub use publisher::CommandPublisher;

/// Wildcard subscription covering every room's sensor channel
pub const SENSOR_SUBJECTS: &str = "campus.*.sensors";

/// Wildcard subscription covering every room's actuator channel
pub const ACTUATOR_SUBJECTS: &str = "campus.*.actuators";

/// Which per-room channel a subject belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Sensors,
    Actuators,
}

/// Extract the room id and channel from a `campus.{room}.{channel}` subject.
pub fn room_from_subject(subject: &str) -> Option<(&str, Channel)> {
    let mut parts = subject.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("campus"), Some(room), Some("sensors"), None) if !room.is_empty() => {
            Some((room, Channel::Sensors))
        }
        (Some("campus"), Some(room), Some("actuators"), None) if !room.is_empty() => {
            Some((room, Channel::Actuators))
        }
        _ => None,
    }
}

/// Normalize a catalog topic string to subject form.
///
/// Catalog entries written for slash-separated brokers still name the same
/// channels; `campus/room_101/actuators` publishes to
/// `campus.room_101.actuators`.
pub fn normalize_topic(topic: &str) -> String {
    topic.trim_matches('/').replace('/', ".")
}
