/*!
 * Scheduling Demo Library
 *
 * Runs a fixed set of worker threads under explicit OS scheduling policies
 * and priorities, releases them together through a start barrier, and joins
 * them once their workload completes.
 *
 * Linux only: relies on pthread scheduling attributes and sched_setaffinity.
 */

pub mod barrier;
pub mod config;
pub mod core;
pub mod launcher;
pub mod monitoring;
pub mod runtime;
pub mod scheduler;
pub mod worker;

// Re-exports
pub use crate::core::{DemoError, DemoResult};
pub use barrier::StartBarrier;
pub use config::{Cli, DemoConfig};
pub use launcher::{join_all, AffinityConfig, LaunchedWorker, Launcher, PinScope};
pub use monitoring::init_tracing;
pub use runtime::{run, run_with, RunReport, RunSummary};
pub use scheduler::{resolve_thread_specs, OsPriorityBounds, PriorityBounds, SchedPolicy, ThreadSpec};
pub use worker::{BusyWorkload, WorkerContext, WorkerOutcome, WorkerState, Workload};
