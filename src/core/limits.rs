/*!
 * Run Limits and Constants
 *
 * Centralized location for the fixed values a run depends on.
 */

use std::time::Duration;

// =============================================================================
// WORKLOAD
// =============================================================================

/// Number of "Thread N is running" reports a busy workload emits
/// The configured busy duration is split evenly across these rounds
pub const WORKLOAD_REPORT_ROUNDS: u32 = 3;

/// Upper bound on a single busy duration (one hour)
/// Anything larger is almost certainly a typo in `-t`
pub const MAX_BUSY_DURATION: Duration = Duration::from_secs(60 * 60);

// =============================================================================
// THREADS
// =============================================================================

/// Upper bound on workers per run
/// Each worker is a real OS thread; this keeps a mistyped `-n` from exhausting the process
pub const MAX_THREADS: usize = 4096;

/// Prefix of worker thread names, as set on the OS thread and shown in logs
/// Kept short so `<prefix>-<index>` fits the 15 byte Linux thread name limit
pub const WORKER_NAME_PREFIX: &str = "sched-w";

// =============================================================================
// POLICY NAMES
// =============================================================================

/// Token selecting the real-time FIFO class
pub const POLICY_TOKEN_FIFO: &str = "FIFO";

/// Tokens selecting the normal time-sharing class
pub const POLICY_TOKENS_NORMAL: [&str; 2] = ["NORMAL", "OTHER"];

/// The only legal priority in the normal class
pub const NORMAL_PRIORITY: i32 = 0;
