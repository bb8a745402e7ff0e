use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Bus configuration
#[derive(Clone, Debug, Deserialize)]
pub struct BusConfig {
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

/// Connection handle to the campus message bus.
///
/// Plain core pub/sub: the engine is best-effort and keeps no delivery
/// guarantees, so no stream provisioning happens here.
pub struct BusClient {
    client: async_nats::Client,
}

impl BusClient {
    /// Connect to the bus
    pub async fn connect(config: &BusConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(&config.url)
            .await
            .context("Failed to connect to NATS")?;

        Ok(Self { client })
    }

    /// Get a cloned handle to the underlying client
    pub fn client(&self) -> async_nats::Client {
        self.client.clone()
    }
}
