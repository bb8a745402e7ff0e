use anyhow::{Context, Result};
use aula::api::{create_status_router, StatusAppState};
use aula::bus::{BusClient, CommandPublisher};
use aula::catalog::CatalogClient;
use aula::config::{self, AulaConfig};
use aula::ingest::IngestLoop;
use aula::notify::{run_command_poller, AlertChannel, LogChannel, NotificationEngine, TelegramChannel};
use aula::outbound::OutboundQueue;
use aula::snapshot::StateFile;
use aula::state::StateStore;
use aula::telemetry::TelemetryForwarder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aula=info".into()),
        )
        .init();

    info!("Aula starting...");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "aula.toml".to_string());
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            info!(path = %config_path, error = %e, "Config file not loaded, using defaults");
            AulaConfig::default()
        }
    };

    let bus = BusClient::connect(&config.bus).await?;
    let queue = OutboundQueue::start(config.outbound.max_in_flight, config.outbound.queue_capacity);

    let store = Arc::new(StateStore::new());
    let catalog = Arc::new(CatalogClient::new(&config.catalog));
    let telemetry = Arc::new(TelemetryForwarder::new(
        queue.clone(),
        config.telemetry.endpoint.clone(),
        Duration::from_secs(config.telemetry.min_interval_seconds),
    ));

    let channel: Arc<dyn AlertChannel> = if config.alerts.bot_token.is_empty() {
        info!("No alert bot token configured, alerts will be logged only");
        Arc::new(LogChannel)
    } else {
        Arc::new(TelegramChannel::new(queue.clone(), &config.alerts))
    };
    let notifier = Arc::new(NotificationEngine::new(
        channel.clone(),
        Duration::from_secs(config.alerts.debounce_seconds),
    ));

    if config.alerts.poll_commands && !config.alerts.bot_token.is_empty() {
        tokio::spawn(run_command_poller(
            config.alerts.clone(),
            store.clone(),
            channel.clone(),
        ));
    }

    let state_file = config
        .state_file
        .enabled
        .then(|| StateFile::new(config.state_file.path.clone()));

    let ingest = IngestLoop::new(
        bus.client(),
        CommandPublisher::new(bus.client()),
        catalog,
        store.clone(),
        notifier,
        telemetry,
        state_file,
    );
    tokio::spawn(async move {
        if let Err(e) = ingest.run().await {
            warn!(error = %e, "Ingest loop exited");
        }
    });

    let router = create_status_router(Arc::new(StatusAppState { store }));
    let listener = tokio::net::TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("Failed to bind status API to {}", config.http.bind))?;
    info!(addr = %config.http.bind, "Status API listening");

    tokio::select! {
        result = async { axum::serve(listener, router).await } => {
            result.context("Status API server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, abandoning in-flight deliveries");
        }
    }

    Ok(())
}
