use serde::Deserialize;

// Re-export the bus config so one `[bus]` section covers the connection
pub use crate::bus::BusConfig;

/// Complete engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AulaConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub outbound: OutboundConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub state_file: StateFileConfig,
}

/// Catalog directory service
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Per-request timeout so a slow catalog cannot stall ingestion
    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_catalog_ttl")]
    pub cache_ttl_seconds: u64,
}

fn default_catalog_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_catalog_timeout() -> u64 {
    5
}

fn default_catalog_ttl() -> u64 {
    60
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            timeout_seconds: default_catalog_timeout(),
            cache_ttl_seconds: default_catalog_ttl(),
        }
    }
}

/// External time-series channel
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_endpoint")]
    pub endpoint: String,
    /// Minimum spacing between pushes for one room
    #[serde(default = "default_telemetry_interval")]
    pub min_interval_seconds: u64,
}

fn default_telemetry_endpoint() -> String {
    "https://api.thingspeak.com/update".to_string()
}

fn default_telemetry_interval() -> u64 {
    16
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_telemetry_endpoint(),
            min_interval_seconds: default_telemetry_interval(),
        }
    }
}

/// Operator alert channel (Telegram-compatible)
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Empty token switches alerting to log-only mode
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_alert_api_base")]
    pub api_base: String,
    /// Minimum spacing between CO2 alerts for one room
    #[serde(default = "default_debounce_seconds")]
    pub debounce_seconds: u64,
    /// Poll the chat for operator commands (/status)
    #[serde(default = "default_poll_commands")]
    pub poll_commands: bool,
}

fn default_alert_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_debounce_seconds() -> u64 {
    300
}

fn default_poll_commands() -> bool {
    true
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_alert_api_base(),
            debounce_seconds: default_debounce_seconds(),
            poll_commands: default_poll_commands(),
        }
    }
}

/// Outbound delivery queue bounds
#[derive(Debug, Clone, Deserialize)]
pub struct OutboundConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_in_flight() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Status API
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8001".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Best-effort state file mirror
#[derive(Debug, Clone, Deserialize)]
pub struct StateFileConfig {
    #[serde(default = "default_state_file_enabled")]
    pub enabled: bool,
    #[serde(default = "default_state_file_path")]
    pub path: String,
}

fn default_state_file_enabled() -> bool {
    true
}

fn default_state_file_path() -> String {
    "system_state.json".to_string()
}

impl Default for StateFileConfig {
    fn default() -> Self {
        Self {
            enabled: default_state_file_enabled(),
            path: default_state_file_path(),
        }
    }
}

impl Default for AulaConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            catalog: CatalogConfig::default(),
            telemetry: TelemetryConfig::default(),
            alerts: AlertConfig::default(),
            outbound: OutboundConfig::default(),
            http: HttpConfig::default(),
            state_file: StateFileConfig::default(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<AulaConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: AulaConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AulaConfig::default();
        assert_eq!(config.catalog.base_url, "http://localhost:8000");
        assert_eq!(config.catalog.timeout_seconds, 5);
        assert_eq!(config.telemetry.min_interval_seconds, 16);
        assert_eq!(config.alerts.debounce_seconds, 300);
        assert!(config.alerts.bot_token.is_empty());
        assert_eq!(config.outbound.max_in_flight, 8);
        assert_eq!(config.http.bind, "0.0.0.0:8001");
        assert!(config.state_file.enabled);
        assert_eq!(config.state_file.path, "system_state.json");
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [bus]
            url = "nats://broker.campus:4222"

            [catalog]
            base_url = "http://catalog.campus:8000"
            timeout_seconds = 2
            cache_ttl_seconds = 30

            [telemetry]
            endpoint = "http://telemetry.campus/update"
            min_interval_seconds = 20

            [alerts]
            bot_token = "TOKEN"
            chat_id = "42"
            debounce_seconds = 120
            poll_commands = false

            [outbound]
            max_in_flight = 4
            queue_capacity = 64

            [http]
            bind = "127.0.0.1:9001"

            [state_file]
            enabled = false
            path = "/tmp/state.json"
        "#;

        let config: AulaConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bus.url, "nats://broker.campus:4222");
        assert_eq!(config.catalog.timeout_seconds, 2);
        assert_eq!(config.telemetry.min_interval_seconds, 20);
        assert_eq!(config.alerts.bot_token, "TOKEN");
        assert_eq!(config.alerts.debounce_seconds, 120);
        assert!(!config.alerts.poll_commands);
        assert_eq!(config.outbound.queue_capacity, 64);
        assert_eq!(config.http.bind, "127.0.0.1:9001");
        assert!(!config.state_file.enabled);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [alerts]
            bot_token = "TOKEN"
        "#;

        let config: AulaConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.alerts.bot_token, "TOKEN");
        assert_eq!(config.alerts.debounce_seconds, 300); // Default
        assert_eq!(config.telemetry.min_interval_seconds, 16); // Default
    }
}
