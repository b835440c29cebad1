use std::{num::NonZeroUsize, sync::Arc, thread};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fanout_core::{BoundedRunner, UnboundedRunner};
use fanout_exec::{FixedDelay, simulated_batch};
use fanout_model::RunReport;
use fanout_observe::{LoggerConfig, TracingObserver, init_logger};
use fanout_prometheus::PrometheusObserver;

const DEFAULT_TASKS: u64 = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    init_logger(&LoggerConfig::from_env()?)?;
    info!("logger initialized");

    // 2) Batch size and pool width
    let tasks = env_tasks()?;
    let width = thread::available_parallelism().map_or(4, NonZeroUsize::get) * 2;
    let limit = NonZeroUsize::new(width).context("pool width must be positive")?;
    info!("running {} simulated I/O tasks, pool of {} workers", tasks, limit);

    // 3) Observers shared by both runs
    let metrics = Arc::new(PrometheusObserver::new()?);
    let logs = Arc::new(TracingObserver::new());

    // 4) Ctrl+C cancels whichever batch is running
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling batch");
            trigger.cancel();
        }
    });

    // 5) Bounded pool
    let pool = BoundedRunner::new(limit)?
        .with_observer(logs.clone())
        .with_observer(metrics.clone())
        .with_cancel_token(shutdown.child_token());
    let bounded = pool
        .run(simulated_batch(tasks, Arc::new(FixedDelay::default())))
        .await;
    print_report(&bounded)?;

    if shutdown.is_cancelled() {
        return Ok(());
    }

    // 6) One context per task
    let unbounded = UnboundedRunner::new()?
        .with_observer(logs)
        .with_observer(metrics.clone())
        .with_cancel_token(shutdown.child_token())
        .run(simulated_batch(tasks, Arc::new(FixedDelay::default())))
        .await;
    print_report(&unbounded)?;

    info!(
        "bounded took {:?}, unbounded took {:?}",
        bounded.wall_clock, unbounded.wall_clock
    );
    println!("{}", metrics.encode_text()?);
    Ok(())
}

fn env_tasks() -> anyhow::Result<u64> {
    match std::env::var("FANOUT_TASKS") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("FANOUT_TASKS must be a number, got {raw:?}")),
        Err(_) => Ok(DEFAULT_TASKS),
    }
}

fn print_report(report: &RunReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
