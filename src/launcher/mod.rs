/*!
 * Thread Launcher
 *
 * Creates one native thread per `ThreadSpec`, in index order, each under its
 * own explicit scheduling attributes, and joins them again.
 *
 * # Partial launches
 *
 * If creating thread `k` fails, the `n - k` slots that will never arrive are
 * withdrawn from the start barrier so the `k` threads already waiting are
 * released, then those threads are joined before the error is returned.
 */

pub mod affinity;
pub mod attr;
pub mod native;

pub use affinity::{AffinityConfig, PinScope};
pub use attr::{InheritMode, NativeAttr, SchedulingAttributes};
pub use native::NativeThread;

use crate::barrier::StartBarrier;
use crate::core::{DemoError, DemoResult};
use crate::scheduler::ThreadSpec;
use crate::worker::{run_worker, worker_thread_name, WorkerOutcome, WorkerProbe, Workload};
use nix::errno::Errno;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A created worker thread and its bookkeeping
#[derive(Debug)]
pub struct LaunchedWorker {
    pub spec: ThreadSpec,
    pub probe: Arc<WorkerProbe>,
    thread: NativeThread<DemoResult<WorkerOutcome>>,
}

impl LaunchedWorker {
    /// pthread identifier assigned at creation
    pub fn native_handle(&self) -> u64 {
        self.thread.id()
    }
}

/// Creates worker threads that share one start barrier and one workload
pub struct Launcher {
    barrier: Arc<StartBarrier>,
    workload: Arc<dyn Workload>,
    affinity: AffinityConfig,
}

impl Launcher {
    pub fn new(
        barrier: Arc<StartBarrier>,
        workload: Arc<dyn Workload>,
        affinity: AffinityConfig,
    ) -> Self {
        Self {
            barrier,
            workload,
            affinity,
        }
    }

    /// Create a thread for every spec, in index order
    ///
    /// The barrier capacity must equal `specs.len()`. Threads are not waited
    /// on between creations; each blocks at the barrier on its own.
    pub fn launch(&self, specs: &[ThreadSpec]) -> DemoResult<Vec<LaunchedWorker>> {
        if self.barrier.capacity() != specs.len() {
            return Err(DemoError::Resource {
                operation: "launch",
                detail: format!(
                    "barrier capacity {} does not match {} thread specs",
                    self.barrier.capacity(),
                    specs.len()
                ),
            });
        }

        let mut launched = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.launch_one(spec) {
                Ok(worker) => launched.push(worker),
                Err(e) => {
                    let missing = specs.len() - launched.len();
                    error!(
                        index = spec.index,
                        created = launched.len(),
                        error = %e,
                        "Thread creation failed, aborting remaining launches"
                    );
                    self.barrier.withdraw(missing);
                    if let Err(join_err) = join_all(launched) {
                        warn!(error = %join_err, "Joining partially launched workers failed");
                    }
                    return Err(e);
                }
            }
        }

        info!(threads = launched.len(), "All worker threads created");
        Ok(launched)
    }

    fn launch_one(&self, spec: &ThreadSpec) -> DemoResult<LaunchedWorker> {
        let attrs = SchedulingAttributes::for_spec(spec, &self.affinity);
        let native_attr = NativeAttr::build(&attrs)?;

        let probe = Arc::new(WorkerProbe::new());
        let thread = {
            let spec = *spec;
            let barrier = Arc::clone(&self.barrier);
            let workload = Arc::clone(&self.workload);
            let probe = Arc::clone(&probe);
            native::spawn(&native_attr, move || {
                run_worker(spec, &barrier, workload.as_ref(), &probe, attrs.cpu)
            })
        }
        .map_err(|errno| creation_error(spec, errno))?;

        // Attribute object is released only now, after creation returned
        drop(native_attr);

        debug!(
            index = spec.index,
            name = %worker_thread_name(spec.index),
            thread = thread.id(),
            policy = spec.policy.as_str(),
            priority = spec.priority,
            cpu = ?attrs.cpu,
            "Created worker thread"
        );

        Ok(LaunchedWorker {
            spec: *spec,
            probe,
            thread,
        })
    }
}

fn creation_error(spec: &ThreadSpec, errno: Errno) -> DemoError {
    match errno {
        Errno::EPERM => DemoError::SchedulingPermissionDenied {
            index: spec.index,
            policy: spec.policy.as_str(),
            priority: spec.priority,
        },
        other => DemoError::os("pthread_create", other),
    }
}

/// Wait for every worker, in any order, and collect their outcomes
///
/// All workers are joined even if some fail; the first failure is returned
/// afterwards. A worker that reported an error (such as a failed CPU pin)
/// counts as a failure.
pub fn join_all(workers: Vec<LaunchedWorker>) -> DemoResult<Vec<WorkerOutcome>> {
    let mut outcomes = Vec::with_capacity(workers.len());
    let mut first_error = None;

    for worker in workers {
        let index = worker.spec.index;
        let result = match worker.thread.join() {
            Ok(Ok(Ok(outcome))) => {
                debug!(index, "Joined worker");
                Ok(outcome)
            }
            Ok(Ok(Err(e))) => {
                error!(index, error = %e, "Worker failed");
                Err(e)
            }
            Ok(Err(_panic)) => {
                error!(index, "Worker panicked");
                Err(DemoError::WorkerPanicked { index })
            }
            Err(errno) => {
                error!(index, error = %errno, "pthread_join failed");
                Err(DemoError::os("pthread_join", errno))
            }
        };

        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}
