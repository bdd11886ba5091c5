/*!
 * Worker Module
 * The body every launched thread runs: pin, rendezvous, work, finish
 */

mod state;
mod workload;

pub use state::{WorkerProbe, WorkerState};
pub use workload::{spin_for, BusyWorkload, WorkerContext, Workload};

use crate::barrier::StartBarrier;
use crate::core::limits::WORKER_NAME_PREFIX;
use crate::core::DemoResult;
use crate::launcher::{affinity, native};
use crate::scheduler::ThreadSpec;
use std::time::Instant;
use tracing::{debug, error, info_span};

/// What a worker reports back through join
#[derive(Debug, Clone, Copy)]
pub struct WorkerOutcome {
    pub spec: ThreadSpec,
    /// CPU the worker was pinned to, if pinning was requested
    pub pinned_cpu: Option<usize>,
    /// Arrivals the barrier had counted when this worker was released
    pub arrivals_at_release: usize,
    /// Barrier capacity when this worker was released
    pub capacity_at_release: usize,
    /// Release instant recorded by the barrier
    pub released_at: Instant,
    /// When this worker observed its own release
    pub observed_release: Instant,
    pub finished_at: Instant,
}

/// Name given to the worker thread at `index`
pub fn worker_thread_name(index: usize) -> String {
    format!("{}-{}", WORKER_NAME_PREFIX, index)
}

/// Thread body shared by all workers
///
/// A worker that cannot apply its CPU pin still arrives at the barrier, so
/// the others are released, but it skips the workload and reports the error.
pub(crate) fn run_worker(
    spec: ThreadSpec,
    barrier: &StartBarrier,
    workload: &dyn Workload,
    probe: &WorkerProbe,
    pin_cpu: Option<usize>,
) -> DemoResult<WorkerOutcome> {
    let name = worker_thread_name(spec.index);
    native::name_current_thread(&name);
    let _span = info_span!("worker", name = %name, index = spec.index).entered();

    let pinned = match pin_cpu {
        None => Ok(None),
        Some(cpu) => affinity::pin_current_thread(cpu).map(|()| Some(cpu)),
    };

    probe.advance(WorkerState::WaitingAtBarrier);
    debug!(index = spec.index, "Waiting at start barrier");
    let rendezvous = barrier.wait();
    let observed_release = Instant::now();

    let pinned_cpu = match pinned {
        Ok(cpu) => cpu,
        Err(e) => {
            error!(index = spec.index, cpu = ?pin_cpu, error = %e, "Could not pin worker, skipping workload");
            probe.advance(WorkerState::Terminated);
            return Err(e);
        }
    };

    probe.advance(WorkerState::Running);
    debug!(
        index = spec.index,
        policy = spec.policy.as_str(),
        priority = spec.priority,
        workload = workload.name(),
        "Released"
    );
    workload.run(&WorkerContext { spec: &spec });

    probe.advance(WorkerState::Terminated);
    debug!(index = spec.index, "Workload finished");

    Ok(WorkerOutcome {
        spec,
        pinned_cpu,
        arrivals_at_release: rendezvous.arrivals,
        capacity_at_release: rendezvous.capacity,
        released_at: rendezvous.released_at,
        observed_release,
        finished_at: Instant::now(),
    })
}
