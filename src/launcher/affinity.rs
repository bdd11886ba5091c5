/*!
 * CPU Affinity
 * Optional pinning of workers to a single core
 */

use crate::core::{DemoError, DemoResult};
use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;
use serde::Serialize;

/// Which workers a pinning request applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinScope {
    #[default]
    All,
    /// Only the worker with index 0
    First,
}

/// Affinity requested for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AffinityConfig {
    cpu: Option<usize>,
    scope: PinScope,
}

impl AffinityConfig {
    /// No pinning; workers float across all CPUs
    pub const fn floating() -> Self {
        Self {
            cpu: None,
            scope: PinScope::All,
        }
    }

    pub const fn pinned(cpu: usize, scope: PinScope) -> Self {
        Self {
            cpu: Some(cpu),
            scope,
        }
    }

    pub fn cpu(&self) -> Option<usize> {
        self.cpu
    }

    pub fn scope(&self) -> PinScope {
        self.scope
    }

    /// CPU the worker at `index` should be pinned to
    pub fn cpu_for(&self, index: usize) -> Option<usize> {
        match (self.cpu, self.scope) {
            (Some(cpu), PinScope::All) => Some(cpu),
            (Some(cpu), PinScope::First) if index == 0 => Some(cpu),
            _ => None,
        }
    }
}

/// Restrict the calling thread to `cpu`
pub fn pin_current_thread(cpu: usize) -> DemoResult<()> {
    let mut set = CpuSet::new();
    set.set(cpu).map_err(|e| DemoError::os("CpuSet::set", e))?;
    // Pid 0 addresses the calling thread
    sched_setaffinity(Pid::from_raw(0), &set).map_err(|e| DemoError::os("sched_setaffinity", e))
}

/// CPUs the calling thread may currently run on
pub fn current_thread_cpus() -> DemoResult<Vec<usize>> {
    let set = sched_getaffinity(Pid::from_raw(0))
        .map_err(|e| DemoError::os("sched_getaffinity", e))?;
    Ok((0..CpuSet::count())
        .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
        .collect())
}
