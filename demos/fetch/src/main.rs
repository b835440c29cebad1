use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fanout_core::{ObserverRef, TaskRunner};
use fanout_exec::{DEFAULT_BASE_URL, FetchRef, HttpFetcher, fetch_batch};
use fanout_model::{RunReport, RunnerConfig};
use fanout_observe::{LoggerConfig, TracingObserver, init_logger};

const DEFAULT_TASKS: u64 = 100;
const POOL_SIZE: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    init_logger(&LoggerConfig::from_env()?)?;

    // 2) Inputs
    let tasks = env_u64("FANOUT_TASKS", DEFAULT_TASKS)?;
    let base_url = std::env::var("FANOUT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let fetcher: FetchRef = Arc::new(HttpFetcher::new(base_url.clone()));
    let observer: ObserverRef = Arc::new(TracingObserver::new());
    info!("fetching {} resources from {}", tasks, base_url);

    // 3) Ctrl+C
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling batch");
            trigger.cancel();
        }
    });

    // 4) Same batch, pool of ten then unbounded
    for config in [RunnerConfig::bounded(POOL_SIZE)?, RunnerConfig::unbounded()] {
        if shutdown.is_cancelled() {
            break;
        }
        let runner = TaskRunner::new(&config)?
            .with_observer(observer.clone())
            .with_cancel_token(shutdown.child_token());
        let mode = runner.mode();

        let report = runner
            .run(fetch_batch(1..=tasks, fetcher.clone()))
            .await;
        summarize(&report);
        info!("{} finished in {:?}", mode, report.wall_clock);
    }

    Ok(())
}

fn env_u64(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn summarize(report: &RunReport) {
    println!(
        "{}: {} completed, {} failed, {} cancelled in {:?}",
        report.mode,
        report.tasks_completed,
        report.tasks_failed,
        report.tasks_cancelled,
        report.wall_clock
    );
    for failure in &report.failures {
        println!("  {} {}", failure.id, failure.reason);
    }
}
