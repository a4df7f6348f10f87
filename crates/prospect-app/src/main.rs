//! Prospect crawl binary.
//!
//! Thin wiring shell: loads configuration and segment files, opens the
//! database, builds the API client and pipeline, and runs the resumable
//! driver. Ctrl-C requests a drain; the process exits non-zero only on a
//! fatal error, never on a clean interruption.

use anyhow::Context;
use prospect_api::{ApiClient, ClientOptions, CredentialManager, HttpTransport, Transport};
use prospect_core::config::AppConfig;
use prospect_crawler::{CrawlDriver, PipelineOptions, SearchPipeline};
use prospect_db::{CheckpointStore, Database, ExclusionStore};
use prospect_export::CsvSink;
use prospect_segments::{CombinationSpace, SegmentLoader};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,prospect=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Prospect v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let segments_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "segments".to_string());

    anyhow::ensure!(
        !config.api.username.is_empty(),
        "api.username is not set (config file or PROSPECT_API_USERNAME)"
    );
    let password = std::env::var("PROSPECT_API_PASSWORD")
        .context("PROSPECT_API_PASSWORD is not set")?;

    // Segments and combination space
    let groups = SegmentLoader::new(&segments_path)
        .and_then(|loader| loader.load())
        .with_context(|| format!("failed to load segments from {segments_path}"))?;
    let space = CombinationSpace::build(&groups);
    anyhow::ensure!(
        !space.is_empty(),
        "no valid search combinations in {segments_path}"
    );
    info!(
        groups = space.valid_group_count(),
        combinations = space.len(),
        "combination space ready"
    );

    // Durable state
    let db = Database::new(&config.storage.database_path)
        .await
        .with_context(|| {
            format!(
                "failed to open database at {}",
                config.storage.database_path.display()
            )
        })?;
    db.run_migrations().await.context("failed to run migrations")?;

    // Remote API client
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )
        .context("failed to build http transport")?,
    );
    let credentials = Arc::new(CredentialManager::new(
        Arc::clone(&transport),
        db.pool().clone(),
        &config.api.username,
        password,
        config.api.token_valid_minutes,
    ));
    let renewal_task = credentials.spawn_renewal_task(Duration::from_secs(
        config.api.renew_interval_minutes * 60,
    ));

    let client = ApiClient::new(
        transport,
        Arc::clone(&credentials),
        ClientOptions {
            call_delay: Duration::from_millis(config.api.call_delay_ms),
            max_retries: config.api.max_retries,
            rate_limit_fallback: Duration::from_secs(config.api.rate_limit_fallback_secs),
            low_quota_warning: config.api.low_quota_warning,
        },
    );

    // Pipeline and driver
    let cancel = CancellationToken::new();
    let exclusions = ExclusionStore::load(db.pool().clone()).await;
    let sink = CsvSink::create(&config.export.output_dir)
        .with_context(|| format!("failed to open csv sink in {}", config.export.output_dir.display()))?;
    let pipeline = SearchPipeline::new(
        Arc::new(client),
        exclusions,
        sink,
        PipelineOptions::from(&config.crawl),
        cancel.clone(),
    );
    let mut driver = CrawlDriver::new(
        pipeline,
        CheckpointStore::new(db.pool().clone()),
        space.into_vec(),
        cancel.clone(),
    )
    .await
    .context("failed to load crawl checkpoint")?;
    let autosave_task =
        driver.spawn_autosave_task(Duration::from_secs(config.crawl.autosave_interval_secs));

    // Ctrl-C requests a drain: finish the current page, checkpoint, exit
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, draining");
            signal_cancel.cancel();
        }
    });

    let summary = driver.run().await.context("crawl failed")?;

    renewal_task.abort();
    autosave_task.abort();
    db.close().await;

    info!(
        companies = summary.company_count,
        contacts = summary.contact_count,
        completed = summary.completed,
        "done"
    );
    Ok(())
}
