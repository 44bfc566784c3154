//! tracking-monitor server entry point.
//!
//! Starts the scheduler and the Axum HTTP server with REST and WebSocket
//! endpoints.

use std::sync::Arc;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use tracking_monitor::api;
use tracking_monitor::app_state::AppState;
use tracking_monitor::clients::{MessageBroker, SimulatedBroker, SimulatedEmailProvider};
use tracking_monitor::clock::{Clock, SystemClock};
use tracking_monitor::config::{LogFormat, MonitorConfig};
use tracking_monitor::domain::EventBus;
use tracking_monitor::generator::MockGenerator;
use tracking_monitor::scheduler::{Schedule, Scheduler};
use tracking_monitor::service::MonitorService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = MonitorConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting tracking-monitor");

    // Build service layer
    let monitor_service = Arc::new(build_service(&config));
    monitor_service
        .set_log_stream_active(config.log_stream_enabled)
        .await;

    // Start periodic tasks
    let scheduler = Scheduler::new(Arc::clone(&monitor_service), Schedule::from(&config)).spawn();

    // Build router
    let app = api::build_app(AppState::new(monitor_service), &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

/// Wires the generator, clock, clients and event bus from `config`.
fn build_service(config: &MonitorConfig) -> MonitorService {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut generator = match config.generator_seed {
        Some(seed) => {
            tracing::info!(seed, "mock generator seeded");
            MockGenerator::seeded(seed)
        }
        None => MockGenerator::from_entropy(),
    }
    .with_sender(config.email_from_address.clone());

    let broker = SimulatedBroker::new(config.broker_url.clone(), Arc::clone(&clock));
    if config.broker_enabled {
        if let Err(err) = broker.connect() {
            tracing::warn!(%err, "broker connection failed");
        }
    } else {
        tracing::info!(url = broker.url(), "broker disabled, publishes will be refused");
    }

    let provider_rng = ChaCha8Rng::seed_from_u64(generator.rng_mut().r#gen());
    let email_provider = SimulatedEmailProvider::new(
        config.email_provider_api_key.clone(),
        config.email_from_address.clone(),
        provider_rng,
        Arc::clone(&clock),
    );

    MonitorService::with_clients(
        generator,
        clock,
        EventBus::new(config.event_bus_capacity),
        config.monitor_settings(),
        Arc::new(broker),
        Arc::new(email_provider),
    )
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
