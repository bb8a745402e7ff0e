use crate::event::ActuatorCommand;
use anyhow::{Context, Result};
use tracing::debug;

/// Publishes actuator commands to a room's actuator subject
#[derive(Clone)]
pub struct CommandPublisher {
    client: async_nats::Client,
}

impl CommandPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Publish a command as JSON to the given subject.
    pub async fn publish(&self, subject: &str, command: &ActuatorCommand) -> Result<()> {
        let payload =
            serde_json::to_vec(command).context("Failed to serialize actuator command")?;

        debug!(
            room_id = %command.room_id,
            subject = %subject,
            lights = %command.lights,
            heating = %command.heating,
            "Publishing actuator command"
        );

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .with_context(|| format!("Failed to publish command to '{}'", subject))?;

        Ok(())
    }
}
