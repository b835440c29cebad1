use fanout_core::{BatchInfo, Observer};
use fanout_model::{RunReport, TaskId, TaskRecord};
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

const TASK_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const BATCH_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Runner metrics kept in a private [`Registry`].
///
/// Cloning is cheap; clones share the same collectors.
#[derive(Clone)]
pub struct PrometheusObserver {
    registry: Registry,
    batches: IntCounterVec,
    started: IntCounterVec,
    finished: IntCounterVec,
    in_flight: IntGaugeVec,
    task_duration: HistogramVec,
    batch_duration: HistogramVec,
}

impl PrometheusObserver {
    pub fn new() -> prometheus::Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Register the collectors into an existing registry.
    pub fn with_registry(registry: Registry) -> prometheus::Result<Self> {
        let batches = IntCounterVec::new(
            Opts::new("fanout_batches_total", "Batches handed to a runner"),
            &["mode"],
        )?;
        let started = IntCounterVec::new(
            Opts::new("fanout_tasks_started_total", "Tasks that began executing"),
            &["mode"],
        )?;
        let finished = IntCounterVec::new(
            Opts::new("fanout_tasks_finished_total", "Tasks by terminal outcome"),
            &["mode", "outcome"],
        )?;
        let in_flight = IntGaugeVec::new(
            Opts::new("fanout_tasks_in_flight", "Tasks currently executing"),
            &["mode"],
        )?;
        let task_duration = HistogramVec::new(
            HistogramOpts::new("fanout_task_duration_seconds", "Execution time of started tasks")
                .buckets(TASK_BUCKETS.to_vec()),
            &["mode"],
        )?;
        let batch_duration = HistogramVec::new(
            HistogramOpts::new("fanout_batch_duration_seconds", "Wall-clock time of whole batches")
                .buckets(BATCH_BUCKETS.to_vec()),
            &["mode"],
        )?;

        registry.register(Box::new(batches.clone()))?;
        registry.register(Box::new(started.clone()))?;
        registry.register(Box::new(finished.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;
        registry.register(Box::new(task_duration.clone()))?;
        registry.register(Box::new(batch_duration.clone()))?;

        Ok(Self {
            registry,
            batches,
            started,
            finished,
            in_flight,
            task_duration,
            batch_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Current metrics in the Prometheus text exposition format.
    pub fn encode_text(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.gather())
    }
}

impl Observer for PrometheusObserver {
    fn on_batch_start(&self, batch: &BatchInfo) {
        self.batches.with_label_values(&[batch.mode.label()]).inc();
    }

    fn on_task_start(&self, batch: &BatchInfo, _id: TaskId) {
        let mode = batch.mode.label();
        self.started.with_label_values(&[mode]).inc();
        self.in_flight.with_label_values(&[mode]).inc();
    }

    fn on_task_finish(&self, batch: &BatchInfo, record: &TaskRecord) {
        let mode = batch.mode.label();
        self.finished
            .with_label_values(&[mode, record.outcome.label()])
            .inc();

        if record.started {
            self.in_flight.with_label_values(&[mode]).dec();
            self.task_duration
                .with_label_values(&[mode])
                .observe(record.elapsed.as_secs_f64());
        }
    }

    fn on_batch_finish(&self, report: &RunReport) {
        self.batch_duration
            .with_label_values(&[report.mode.label()])
            .observe(report.wall_clock.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{num::NonZeroUsize, time::Duration};

    use fanout_core::ReportAggregator;
    use fanout_model::{ExecutionOutcome, RunnerMode};

    fn bounded() -> BatchInfo {
        BatchInfo::new(
            RunnerMode::Bounded {
                limit: NonZeroUsize::new(2).unwrap(),
            },
            3,
        )
    }

    #[test]
    fn counts_outcomes_per_mode() {
        let obs = PrometheusObserver::new().unwrap();
        let batch = bounded();

        obs.on_batch_start(&batch);
        obs.on_task_start(&batch, TaskId::new(0));
        obs.on_task_start(&batch, TaskId::new(1));
        assert_eq!(obs.in_flight.with_label_values(&["bounded"]).get(), 2);

        obs.on_task_finish(
            &batch,
            &TaskRecord::new(TaskId::new(0), ExecutionOutcome::Completed, Duration::from_millis(10)),
        );
        obs.on_task_finish(
            &batch,
            &TaskRecord::new(TaskId::new(1), ExecutionOutcome::timed_out(50), Duration::from_millis(50)),
        );
        obs.on_task_finish(&batch, &TaskRecord::skipped(TaskId::new(2)));

        assert_eq!(obs.batches.with_label_values(&["bounded"]).get(), 1);
        assert_eq!(obs.started.with_label_values(&["bounded"]).get(), 2);
        assert_eq!(obs.in_flight.with_label_values(&["bounded"]).get(), 0);
        assert_eq!(obs.finished.with_label_values(&["bounded", "completed"]).get(), 1);
        assert_eq!(obs.finished.with_label_values(&["bounded", "timeout"]).get(), 1);
        assert_eq!(obs.finished.with_label_values(&["bounded", "cancelled"]).get(), 1);
        assert_eq!(
            obs.task_duration.with_label_values(&["bounded"]).get_sample_count(),
            2
        );
    }

    #[test]
    fn batch_duration_and_exposition() {
        let obs = PrometheusObserver::new().unwrap();
        let batch = BatchInfo::new(RunnerMode::Unbounded, 0);
        obs.on_batch_start(&batch);
        obs.on_batch_finish(&ReportAggregator::new(&batch).finish(Duration::from_millis(120)));

        let text = obs.encode_text().unwrap();
        assert!(text.contains("fanout_batches_total{mode=\"unbounded\"} 1"), "{text}");
        assert!(text.contains("fanout_batch_duration_seconds_count{mode=\"unbounded\"} 1"));
        assert!(!obs.gather().is_empty());
    }

    #[test]
    fn shared_registry_rejects_duplicates() {
        let registry = Registry::new();
        assert!(PrometheusObserver::with_registry(registry.clone()).is_ok());
        assert!(PrometheusObserver::with_registry(registry).is_err());
    }
}
