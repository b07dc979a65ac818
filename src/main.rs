use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::time::interval;
use trending::config::symbols::resolve_symbols;
use trending::config::AppConfig;
use trending::error::Error;
use trending::interfaces::{MetricsSink, StdoutSink};
use trending::observability;
use trending::persistence::SnapshotStore;
use trending::price_infra::{Aggregator, FeedConnector};
use trending::scheduler::{run_periodic, DisplayTask, ExportTask};
use trending::utils::task_supervisor::TaskSupervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("TRENDING_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    observability::tracing::init(&config.logging)?;
    observability::metrics::register_metrics();

    let symbols = resolve_symbols(&config.feed).context("resolving symbol universe")?;
    tracing::info!("Tracking {} symbols", symbols.len());

    let mut aggregator = Aggregator::new(config.window.clone())?
        .with_universe(symbols.iter().cloned());

    let sink: Option<Arc<dyn MetricsSink>> = if config.persistence.enabled {
        Some(Arc::new(SnapshotStore::new(
            &config.persistence.directory,
            config.persistence.max_snapshots,
        )))
    } else {
        None
    };

    if let (Some(sink), true) = (&sink, config.persistence.restore_on_startup) {
        match sink.load_latest().await {
            Ok(points) => {
                aggregator.restore(&points);
            }
            Err(Error::NoSnapshotFound) => tracing::info!("No persisted state to restore"),
            Err(e) => tracing::warn!("Restore failed, starting empty: {}", e),
        }
    }

    let provider = aggregator.provider();
    let mut supervisor = TaskSupervisor::new();
    let shutdown = supervisor.token();

    let feed = FeedConnector::new(config.feed.clone(), symbols)?;
    let ticks = feed.subscribe(&mut supervisor);

    let aggregator_token = shutdown.clone();
    supervisor.spawn("aggregator", async move {
        aggregator.run(ticks, aggregator_token).await;
    });

    if config.display.enabled {
        let task = DisplayTask::new(
            provider.clone(),
            Box::new(StdoutSink::new(true)),
            config.display.rank_by,
            config.display.top_n,
            config.display.interval(),
        );
        supervisor.spawn("display", run_periodic(task, shutdown.clone()));
    }

    if let Some(sink) = sink {
        let task = ExportTask::new(provider.clone(), sink, config.persistence.interval());
        supervisor.spawn("export", run_periodic(task, shutdown.clone()));
    }

    let mut health = interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
                tracing::info!("Shutdown requested");
                break;
            }
            _ = health.tick() => {
                if let Err(e) = supervisor.check_health() {
                    tracing::error!("{}", e);
                }
            }
        }
    }

    supervisor
        .shutdown(Duration::from_secs(trending::SHUTDOWN_GRACE_SECS))
        .await;
    tracing::debug!("Final metrics:\n{}", observability::metrics::gather_text());
    Ok(())
}
