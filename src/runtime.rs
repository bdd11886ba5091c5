/*!
 * Run Orchestration
 * One bracketed run: resolve, create barrier, launch, join, tear down
 */

use crate::barrier::StartBarrier;
use crate::config::DemoConfig;
use crate::core::{DemoError, DemoResult};
use crate::launcher::{join_all, Launcher};
use crate::scheduler::{resolve_thread_specs, OsPriorityBounds, PriorityBounds, SchedPolicy};
use crate::worker::{BusyWorkload, WorkerOutcome, Workload};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span};
use uuid::Uuid;

/// Everything observed during a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub busy: Duration,
    /// Outcomes in index order
    pub outcomes: Vec<WorkerOutcome>,
    pub started_at: Instant,
    pub finished_at: Instant,
}

impl RunReport {
    pub fn thread_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Gap between the earliest and latest observed release
    pub fn release_spread(&self) -> Duration {
        let observed = self.outcomes.iter().map(|o| o.observed_release);
        match (observed.clone().min(), observed.max()) {
            (Some(first), Some(last)) => last - first,
            _ => Duration::ZERO,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at - self.started_at
    }

    /// Serializable view of the run
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.to_string(),
            thread_count: self.thread_count(),
            busy_secs: self.busy.as_secs_f64(),
            elapsed_secs: self.elapsed().as_secs_f64(),
            release_spread_us: self.release_spread().as_micros() as u64,
            workers: self
                .outcomes
                .iter()
                .map(|o| WorkerSummary {
                    index: o.spec.index,
                    policy: o.spec.policy,
                    priority: o.spec.priority,
                    pinned_cpu: o.pinned_cpu,
                    release_delay_us: o
                        .observed_release
                        .saturating_duration_since(o.released_at)
                        .as_micros() as u64,
                    run_secs: o
                        .finished_at
                        .saturating_duration_since(o.observed_release)
                        .as_secs_f64(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub run_id: String,
    pub thread_count: usize,
    pub busy_secs: f64,
    pub elapsed_secs: f64,
    pub release_spread_us: u64,
    pub workers: Vec<WorkerSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerSummary {
    pub index: usize,
    pub policy: SchedPolicy,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_cpu: Option<usize>,
    /// Time between the barrier release and this worker noticing it
    pub release_delay_us: u64,
    pub run_secs: f64,
}

/// Run the busy workload with OS priority bounds
pub fn run(config: &DemoConfig) -> DemoResult<RunReport> {
    run_with(
        config,
        Arc::new(BusyWorkload::new(config.busy)),
        &OsPriorityBounds,
    )
}

/// Run with an injected workload and priority bounds
pub fn run_with(
    config: &DemoConfig,
    workload: Arc<dyn Workload>,
    bounds: &dyn PriorityBounds,
) -> DemoResult<RunReport> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id, threads = config.thread_count);
    let _enter = span.enter();

    let specs = resolve_thread_specs(
        config.thread_count,
        &config.policies,
        &config.priorities,
        bounds,
    )?;

    let started_at = Instant::now();
    let barrier = Arc::new(StartBarrier::new(specs.len())?);
    let launcher = Launcher::new(Arc::clone(&barrier), workload, config.affinity);

    let workers = launcher.launch(&specs)?;
    let outcomes = join_all(workers)?;
    let finished_at = Instant::now();

    // Every worker has terminated; the barrier must have no other holders now
    drop(launcher);
    let barrier = Arc::try_unwrap(barrier).map_err(|_| DemoError::Resource {
        operation: "barrier destroy",
        detail: "barrier still referenced after all workers joined".to_string(),
    })?;
    drop(barrier);

    let report = RunReport {
        run_id,
        busy: config.busy,
        outcomes,
        started_at,
        finished_at,
    };

    info!(
        threads = report.thread_count(),
        elapsed_ms = report.elapsed().as_millis() as u64,
        release_spread_us = report.release_spread().as_micros() as u64,
        "Run complete"
    );

    Ok(report)
}
