use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vinted_scout::notify::{GoogleSheetsSink, RowSink, TelegramNotifier};
use vinted_scout::scrapers::{Normalizer, SearchCatalog, VintedClient};
use vinted_scout::store::{DedupStore, RecentCache};
use vinted_scout::{status, Config, Scanner, Tracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    if let Err(err) = config.validate() {
        error!("{:#}", err);
        return Err(err);
    }

    info!("👕 Vinted Scout");
    info!("==============");

    let catalog = SearchCatalog::with_defaults(&config.marketplace_url)?;
    let source = Arc::new(VintedClient::new(config.fetch_timeout())?);
    let notifier = Arc::new(TelegramNotifier::new(
        config.telegram_api_url.clone(),
        config.bot_token.clone(),
        config.chat_id.clone(),
        config.notify_timeout(),
    )?);
    let tracker = Tracker::new(DedupStore::load(&config.seen_file), RecentCache::new());

    let mut scanner = Scanner::new(
        catalog,
        source,
        Normalizer::new(config.marketplace_url.as_str()),
        notifier,
        tracker.clone(),
        config.poll_interval(),
    );
    if let Some(sink) = connect_sheets(&config).await {
        scanner = scanner.with_sink(sink);
    }

    // Scanner runs on its own task for the life of the process
    tokio::spawn(async move { scanner.run().await });

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Status server listening on http://{addr}");
    axum::serve(listener, status::router(tracker))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;

    info!("Shutting down");
    Ok(())
}

/// Spreadsheet sink when configured; setup failures disable it
async fn connect_sheets(config: &Config) -> Option<Arc<dyn RowSink>> {
    let Some(sheets) = config.sheets() else {
        info!("Google Sheets not configured (GOOGLE_ACCESS_TOKEN or SHEET_ID missing).");
        return None;
    };
    match GoogleSheetsSink::connect(
        config.sheets_api_url.clone(),
        sheets.access_token,
        sheets.spreadsheet_id,
        config.notify_timeout(),
    )
    .await
    {
        Ok(sink) => Some(Arc::new(sink) as Arc<dyn RowSink>),
        Err(err) => {
            warn!("Google Sheets setup failed: {:#}", err);
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}
