use crate::bus::{self, Channel, CommandPublisher};
use crate::catalog::CatalogClient;
use crate::event::{ActuatorState, SensorReading};
use crate::notify::NotificationEngine;
use crate::rules;
use crate::schedule;
use crate::snapshot::StateFile;
use crate::state::{RoomState, StateStore};
use crate::telemetry::{TelemetryForwarder, TelemetryPoint};
use anyhow::{Context, Result};
use chrono::Local;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message-driven orchestrator: consumes sensor and actuator events and
/// drives the decision, state, alerting, and forwarding paths.
///
/// One consumption task; each event is handled to completion before the
/// next, so per-room ordering follows publication order. Only the catalog
/// lookup can await inside a cycle; all external pushes leave through the
/// bounded outbound queue. Every failure is isolated to its event: the loop
/// drops, logs, and keeps consuming.
pub struct IngestLoop {
    bus: async_nats::Client,
    publisher: CommandPublisher,
    catalog: Arc<CatalogClient>,
    store: Arc<StateStore>,
    notifier: Arc<NotificationEngine>,
    telemetry: Arc<TelemetryForwarder>,
    state_file: Option<StateFile>,
}

impl IngestLoop {
    pub fn new(
        bus: async_nats::Client,
        publisher: CommandPublisher,
        catalog: Arc<CatalogClient>,
        store: Arc<StateStore>,
        notifier: Arc<NotificationEngine>,
        telemetry: Arc<TelemetryForwarder>,
        state_file: Option<StateFile>,
    ) -> Self {
        Self {
            bus,
            publisher,
            catalog,
            store,
            notifier,
            telemetry,
            state_file,
        }
    }

    /// Subscribe to both per-room channels and consume until the bus closes.
    pub async fn run(self) -> Result<()> {
        let mut sensors = self
            .bus
            .subscribe(bus::SENSOR_SUBJECTS.to_string())
            .await
            .context("Failed to subscribe to sensor subjects")?;
        let mut actuators = self
            .bus
            .subscribe(bus::ACTUATOR_SUBJECTS.to_string())
            .await
            .context("Failed to subscribe to actuator subjects")?;

        info!(
            sensors = bus::SENSOR_SUBJECTS,
            actuators = bus::ACTUATOR_SUBJECTS,
            "Ingest loop subscribed"
        );

        loop {
            tokio::select! {
                maybe = sensors.next() => match maybe {
                    Some(msg) => self.handle_sensor(msg).await,
                    None => {
                        warn!("Sensor subscription closed");
                        break;
                    }
                },
                maybe = actuators.next() => match maybe {
                    Some(msg) => self.handle_actuator(msg).await,
                    None => {
                        warn!("Actuator subscription closed");
                        break;
                    }
                },
            }
        }

        Ok(())
    }

    /// Full decision cycle for one sensor reading.
    async fn handle_sensor(&self, msg: async_nats::Message) {
        let reading: SensorReading = match serde_json::from_slice(&msg.payload) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(subject = %msg.subject, error = %e, "Dropping undecodable sensor payload");
                return;
            }
        };
        if let Err(e) = reading.validate() {
            warn!(subject = %msg.subject, error = %e, "Dropping invalid sensor payload");
            return;
        }

        // No config, no decision: drop silently and let the next reading retry
        let config = match self.catalog.room(&reading.room_id).await {
            Ok(config) => config,
            Err(e) => {
                debug!(room_id = %reading.room_id, error = %e, "Room config unavailable, dropping event");
                return;
            }
        };

        let command = rules::decide(&reading, &config.thresholds);

        let subject = bus::normalize_topic(&config.actuator_topic);
        if let Err(e) = self.publisher.publish(&subject, &command).await {
            warn!(room_id = %reading.room_id, error = %e, "Failed to publish actuator command");
        }

        let now = Local::now();
        let scheduled = schedule::is_active(&config.schedule, now.naive_local());
        self.store.upsert(
            &reading.room_id,
            RoomState::merged(&config, &reading, &command, scheduled, now),
        );

        if let Some(state_file) = &self.state_file {
            if let Err(e) = state_file.write(&self.store.snapshot()) {
                warn!(error = %e, "Failed to persist state snapshot");
            }
        }

        self.notifier
            .observe_co2(&reading.room_id, &config.name, reading.co2, &config.thresholds);

        if let Some(write_key) = config.write_key.as_deref().filter(|key| !key.is_empty()) {
            self.telemetry.offer(
                &reading.room_id,
                write_key,
                &TelemetryPoint::from_cycle(&reading, &command),
            );
        }
    }

    /// Actuator echo: change detection only. Externally-issued overrides
    /// never reach the status snapshot; the sensor path carries the
    /// authoritative command.
    async fn handle_actuator(&self, msg: async_nats::Message) {
        let Some((room_id, Channel::Actuators)) = bus::room_from_subject(msg.subject.as_str())
        else {
            warn!(subject = %msg.subject, "Ignoring message on unrecognized actuator subject");
            return;
        };

        let state: ActuatorState = match serde_json::from_slice(&msg.payload) {
            Ok(state) => state,
            Err(e) => {
                warn!(subject = %msg.subject, error = %e, "Dropping undecodable actuator payload");
                return;
            }
        };

        let config = match self.catalog.room(room_id).await {
            Ok(config) => config,
            Err(e) => {
                debug!(room_id = %room_id, error = %e, "Room config unavailable, dropping actuator event");
                return;
            }
        };

        self.notifier
            .observe_actuator(room_id, &config.name, state.lights, state.status);
    }
}
