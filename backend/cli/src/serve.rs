use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use claimdesk_channels::{ChannelAdapter, TelegramAdapter, TelegramSettings};
use claimdesk_memory::ContextStore;
use claimdesk_routing::Router;

use crate::wiring::{build_adapters, router_settings, store_limits};

pub async fn run(config_path: &Path) -> Result<()> {
    let config = claimdesk_config::load_config(config_path).await?;

    claimdesk_logging::init_logger(config.logging.dir.as_deref(), &config.logging.level)?;
    let report = claimdesk_config::validate_and_log(&config);
    if !report.is_valid() {
        for issue in &report.errors {
            eprintln!("  {issue}");
        }
        bail!("{} has {} config error(s)", config_path.display(), report.errors.len());
    }

    info!(
        config = %config_path.display(),
        model = %config.completion.model,
        fetch = config.fetch.enabled,
        "Starting ClaimDesk"
    );

    let store = Arc::new(ContextStore::new(store_limits(&config)));
    let sweeper = store.spawn_sweeper(config.session.sweep_interval());

    let adapters = build_adapters(&config)?;
    let router = Arc::new(Router::new(store, adapters, router_settings(&config)));

    let token = config
        .telegram
        .bot_token
        .clone()
        .context("telegram.botToken is not set")?;
    let telegram = TelegramAdapter::new(
        token,
        TelegramSettings {
            media_dir: config.telegram.media_dir.clone(),
            ack_messages: config.telegram.ack_messages,
        },
    );

    info!(channel = telegram.name(), "Channel adapter ready");
    let outcome = telegram.start(router).await;
    sweeper.abort();
    outcome
}
