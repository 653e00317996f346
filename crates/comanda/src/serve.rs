// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `comanda serve` command implementation.
//!
//! Wires the Telegram channel, the OpenRouter provider, the routing and
//! rate clients into an [`OrderAgent`] and runs the agent loop until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use comanda_agent::{AgentLoop, AgentSettings, OrderAgent, SessionStore, prompt, shutdown};
use comanda_config::ComandaConfig;
use comanda_core::{ChannelAdapter, ComandaError, HealthStatus, PluginAdapter, RateSource};
use comanda_geo::{DeliveryFeeCalculator, GeoDistanceEstimator};
use comanda_openrouter::OpenRouterProvider;
use comanda_rates::BcvRateClient;
use comanda_telegram::TelegramChannel;
use tracing::{info, warn};

/// Runs the `comanda serve` command.
pub async fn run_serve(config: ComandaConfig) -> Result<(), ComandaError> {
    init_tracing(&config.agent.log_level);

    info!(agent_name = config.agent.name.as_str(), "starting comanda serve");

    // The rate is read once; the prompt carries it for the whole run.
    let rates: Arc<dyn RateSource> = Arc::new(BcvRateClient::from_config(&config.rates)?);
    let startup_rate = rates.current_rate().await;
    if startup_rate.is_none() {
        warn!("BCV rate unavailable at startup, prompt will say so");
    }

    let base_prompt =
        prompt::load_base_prompt(&config.agent, &config.order.completion_marker).await;
    let system_prompt = prompt::compose(&base_prompt, startup_rate);
    let settings = AgentSettings::from_config(&config, system_prompt)?;

    let provider = Arc::new(OpenRouterProvider::new(&config.openrouter)?);
    info!(model = settings.model.as_str(), "provider initialized");

    let distance = Arc::new(GeoDistanceEstimator::from_config(&config.routing)?);
    let fees = DeliveryFeeCalculator::from_config(distance, &config.delivery);
    info!(policy = ?fees.policy(), rate_per_km = config.delivery.rate_per_km, "delivery pricing ready");

    let mut telegram = TelegramChannel::new(&config.telegram)?;
    match telegram.health_check().await? {
        HealthStatus::Healthy => info!("telegram bot reachable"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = reason.as_str(), "telegram health check failed");
        }
    }
    telegram.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let agent = Arc::new(OrderAgent::new(
        settings,
        Arc::clone(&channel),
        provider,
        fees,
        rates,
        Arc::new(SessionStore::new()),
    ));

    let cancel = shutdown::install_signal_handler();
    let drain_timeout = Duration::from_secs(config.agent.drain_timeout_secs);
    AgentLoop::new(channel, Arc::clone(&agent), drain_timeout)
        .run(cancel)
        .await?;

    log_memory_stats();
    info!(sessions = agent.sessions().len(), "comanda stopped");
    Ok(())
}

#[cfg(not(target_env = "msvc"))]
fn log_memory_stats() {
    use tikv_jemalloc_ctl::{epoch, stats};

    if epoch::advance().is_err() {
        return;
    }
    if let (Ok(allocated), Ok(resident)) = (stats::allocated::read(), stats::resident::read()) {
        info!(
            allocated_mb = allocated / (1024 * 1024),
            resident_mb = resident / (1024 * 1024),
            "final memory usage"
        );
    }
}

#[cfg(target_env = "msvc")]
fn log_memory_stats() {}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise our crates log at `log_level` and
/// everything else at `warn`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("comanda={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
