/*!
 * Worker State
 * Lifecycle of a worker thread, observable from outside the thread
 */

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Worker lifecycle: `Created -> WaitingAtBarrier -> Running -> Terminated`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Created = 0,
    WaitingAtBarrier = 1,
    Running = 2,
    Terminated = 3,
}

impl WorkerState {
    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::WaitingAtBarrier,
            2 => Self::Running,
            _ => Self::Terminated,
        }
    }
}

/// Lock-free view of one worker's state
///
/// Written only by the worker; read by the orchestrator and tests.
#[derive(Debug)]
pub struct WorkerProbe {
    state: AtomicU8,
}

impl WorkerProbe {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(WorkerState::Created as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Advance to `next`; states only move forward
    #[inline]
    pub(crate) fn advance(&self, next: WorkerState) {
        self.state.fetch_max(next as u8, Ordering::AcqRel);
    }
}

impl Default for WorkerProbe {
    fn default() -> Self {
        Self::new()
    }
}
