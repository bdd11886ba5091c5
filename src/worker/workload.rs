/*!
 * Workloads
 * What a worker does once the start barrier releases it
 */

use crate::core::limits::WORKLOAD_REPORT_ROUNDS;
use crate::scheduler::ThreadSpec;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::info;

/// Context handed to a workload
#[derive(Debug, Clone, Copy)]
pub struct WorkerContext<'a> {
    pub spec: &'a ThreadSpec,
}

/// A task a worker runs to completion after release
///
/// Implementations must not block on other workers; the barrier is the only
/// shared rendezvous in a run.
pub trait Workload: Send + Sync {
    fn run(&self, ctx: &WorkerContext<'_>);

    /// Name for logs
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> Workload for F
where
    F: Fn(&WorkerContext<'_>) + Send + Sync,
{
    fn run(&self, ctx: &WorkerContext<'_>) {
        self(ctx)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}

/// CPU-bound spin for a fixed wall-clock duration
///
/// Prints `Thread <index> is running` at the start of each round; the busy
/// duration is split evenly across the rounds.
#[derive(Debug, Clone, Copy)]
pub struct BusyWorkload {
    busy: Duration,
    rounds: u32,
}

impl BusyWorkload {
    pub fn new(busy: Duration) -> Self {
        Self {
            busy,
            rounds: WORKLOAD_REPORT_ROUNDS,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    pub fn busy(&self) -> Duration {
        self.busy
    }
}

impl Workload for BusyWorkload {
    fn run(&self, ctx: &WorkerContext<'_>) {
        let per_round = self.busy / self.rounds;
        for round in 1..=self.rounds {
            info!(index = ctx.spec.index, round, rounds = self.rounds, "Workload round");
            // Ignore a closed stdout; the spin still has to happen
            let _ = writeln!(
                std::io::stdout().lock(),
                "Thread {} is running",
                ctx.spec.index
            );
            spin_for(per_round);
        }
    }

    fn name(&self) -> &'static str {
        "busy"
    }
}

/// Burn CPU without yielding until `duration` has elapsed
#[inline(never)]
pub fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spec() -> ThreadSpec {
        ThreadSpec {
            index: 2,
            policy: SchedPolicy::Normal,
            priority: 0,
        }
    }

    #[test]
    fn test_busy_workload_spins_for_duration() {
        let workload = BusyWorkload::new(Duration::from_millis(30));
        let spec = spec();

        let start = Instant::now();
        workload.run(&WorkerContext { spec: &spec });
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_zero_rounds_clamped() {
        let workload = BusyWorkload::new(Duration::from_millis(1)).with_rounds(0);
        let spec = spec();
        workload.run(&WorkerContext { spec: &spec });
    }

    #[test]
    fn test_closure_workload() {
        let calls = AtomicUsize::new(0);
        let workload = |ctx: &WorkerContext<'_>| {
            calls.fetch_add(ctx.spec.index, Ordering::Relaxed);
        };
        let spec = spec();
        workload.run(&WorkerContext { spec: &spec });
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(Workload::name(&workload), "closure");
    }
}
