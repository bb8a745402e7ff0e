use crate::event::{ActuatorCommand, SensorReading, SwitchState};
use crate::outbound::{OutboundJob, OutboundQueue};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// The seven numeric fields accepted by the external time-series channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryPoint {
    pub temp: f64,
    pub humidity: f64,
    pub lux: f64,
    pub co2: f64,
    pub occupancy: u8,
    pub light_state: u8,
    pub heat_state: u8,
}

impl TelemetryPoint {
    /// One processed cycle: the reading's metrics plus the resulting
    /// actuator states as 0/1 flags.
    pub fn from_cycle(reading: &SensorReading, command: &ActuatorCommand) -> Self {
        Self {
            temp: reading.temperature,
            humidity: reading.humidity,
            lux: reading.light_lux,
            co2: reading.co2,
            occupancy: u8::from(reading.occupancy),
            light_state: u8::from(command.lights == SwitchState::On),
            heat_state: u8::from(command.heating == SwitchState::On),
        }
    }
}

/// Rate-limited fire-and-forget push of room metrics to the external
/// time-series endpoint.
///
/// The endpoint accepts one update per channel every 15 seconds; a 16 second
/// per-room spacing keeps the engine clear of that limit. The throttle
/// window is consumed when the push is dispatched, not when it succeeds, so
/// a failing endpoint still sees at most one call per room per window.
pub struct TelemetryForwarder {
    queue: OutboundQueue,
    endpoint: String,
    min_interval: Duration,
    last_push: DashMap<String, Instant>,
}

impl TelemetryForwarder {
    pub fn new(queue: OutboundQueue, endpoint: String, min_interval: Duration) -> Self {
        Self {
            queue,
            endpoint,
            min_interval,
            last_push: DashMap::new(),
        }
    }

    /// Offer a point for forwarding. Inside the per-room throttle window
    /// this is a silent no-op that leaves the window untouched; otherwise
    /// the push is queued and the window restarts now. Returns whether the
    /// push was dispatched.
    pub fn offer(&self, room_id: &str, write_key: &str, point: &TelemetryPoint) -> bool {
        let now = Instant::now();

        match self.last_push.entry(room_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.min_interval {
                    return false;
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        // Field mapping: F1=Temp, F2=Hum, F3=Lux, F4=CO2, F5=Occ,
        // F6=LightState, F7=HeatState
        let url = format!(
            "{}?api_key={}&field1={}&field2={}&field3={}&field4={}&field5={}&field6={}&field7={}",
            self.endpoint,
            write_key,
            point.temp,
            point.humidity,
            point.lux,
            point.co2,
            point.occupancy,
            point.light_state,
            point.heat_state
        );

        self.queue.submit(OutboundJob::Get {
            url,
            label: "telemetry",
        });

        debug!(room_id = %room_id, "Telemetry update dispatched");
        true
    }
}
