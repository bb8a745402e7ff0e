use anyhow::{bail, Context, Result};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CatalogConfig;

/// Room configuration as served by the catalog directory service.
///
/// Older catalog deployments named the topic and write-key fields after the
/// broker and telemetry vendor; those names are accepted as aliases.
#[derive(Clone, Debug, Deserialize)]
pub struct RoomConfig {
    pub room_id: String,
    pub name: String,

    #[serde(alias = "mqtt_sensor_topic")]
    pub sensor_topic: String,

    #[serde(alias = "mqtt_actuator_topic")]
    pub actuator_topic: String,

    /// Write key for the external telemetry channel; rooms without one are
    /// never forwarded.
    #[serde(default, alias = "thingspeak_write_key")]
    pub write_key: Option<String>,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

/// Per-room decision and alerting thresholds.
#[derive(Clone, Debug, Deserialize)]
pub struct Thresholds {
    /// CO2 ppm above which a WARNING alert fires
    #[serde(default = "default_co2_warning")]
    pub co2_warning: f64,

    /// CO2 ppm above which a CRITICAL alert fires
    #[serde(default = "default_co2_critical")]
    pub co2_critical: f64,

    /// Lights turn on below this lux level while occupied
    #[serde(default = "default_light_threshold")]
    pub light_threshold: f64,

    /// Heating turns on below this temperature while occupied
    #[serde(default = "default_target_temp")]
    pub target_temp: f64,
}

fn default_co2_warning() -> f64 {
    1000.0
}

fn default_co2_critical() -> f64 {
    1500.0
}

fn default_light_threshold() -> f64 {
    300.0
}

fn default_target_temp() -> f64 {
    20.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            co2_warning: default_co2_warning(),
            co2_critical: default_co2_critical(),
            light_threshold: default_light_threshold(),
            target_temp: default_target_temp(),
        }
    }
}

/// One class booking window, matched by weekday name and "HH:MM" bounds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    /// Full English weekday name, e.g. "Monday"
    pub day: String,
    /// "HH:MM", 24h format, inclusive
    pub start_time: String,
    /// "HH:MM", 24h format, inclusive
    pub end_time: String,
}

struct CachedRoom {
    fetched_at: Instant,
    room: Arc<RoomConfig>,
}

/// Catalog lookup client with a TTL cache.
///
/// A slow or unreachable catalog must not stall ingestion: every request
/// carries an explicit timeout, and fresh cache hits skip the network
/// entirely. Fetch failures surface as errors so the caller can drop the
/// event; stale cache entries are not used as a fallback.
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    cache: DashMap<String, CachedRoom>,
    ttl: Duration,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(config.timeout_seconds),
            cache: DashMap::new(),
            ttl: Duration::from_secs(config.cache_ttl_seconds),
        }
    }

    /// Resolve a room id to its configuration.
    pub async fn room(&self, room_id: &str) -> Result<Arc<RoomConfig>> {
        if let Some(hit) = self.cache.get(room_id) {
            if hit.fetched_at.elapsed() < self.ttl {
                return Ok(hit.room.clone());
            }
        }

        let url = format!("{}/rooms/{}", self.base_url, room_id);
        debug!(room_id = %room_id, url = %url, "Fetching room config from catalog");

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to reach catalog at '{}'", url))?;

        if !response.status().is_success() {
            bail!(
                "Catalog returned {} for room '{}'",
                response.status(),
                room_id
            );
        }

        let room: RoomConfig = response
            .json()
            .await
            .context("Failed to parse room config JSON")?;

        let room = Arc::new(room);
        self.cache.insert(
            room_id.to_string(),
            CachedRoom {
                fetched_at: Instant::now(),
                room: room.clone(),
            },
        );

        Ok(room)
    }
}
