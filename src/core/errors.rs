/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use nix::errno::Errno;
use thiserror::Error;

/// Result alias used across the crate
pub type DemoResult<T> = Result<T, DemoError>;

/// Every failure a run can produce, from argument validation to thread join
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum DemoError {
    #[error("Invalid value for {flag}: '{value}' ({reason})")]
    #[diagnostic(
        code(config::arg_parse),
        help("Run with -h to see the expected argument formats.")
    )]
    ArgParse {
        flag: &'static str,
        value: String,
        reason: String,
    },

    #[error("Number of {list} ({found}) does not match the number of threads ({expected})")]
    #[diagnostic(
        code(config::arity_mismatch),
        help("Provide exactly one comma-separated entry per thread.")
    )]
    ArityMismatch {
        list: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Policy \"{0}\" is not one of the supported policies")]
    #[diagnostic(
        code(config::unknown_policy),
        help("Supported policies are FIFO, NORMAL and OTHER (case-sensitive).")
    )]
    UnknownPolicy(String),

    #[error(
        "Priority {value} for thread {index} is out of range for {policy}: valid range is [{min}, {max}]"
    )]
    #[diagnostic(
        code(config::priority_out_of_range),
        help("Choose a priority inside the range reported by the OS for this policy.")
    )]
    PriorityOutOfRange {
        index: usize,
        policy: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("Permission denied creating thread {index} with policy {policy} and priority {priority}")]
    #[diagnostic(
        code(launch::permission_denied),
        help("Real-time scheduling needs elevated privilege: run as root, grant CAP_SYS_NICE, or raise RLIMIT_RTPRIO.")
    )]
    SchedulingPermissionDenied {
        index: usize,
        policy: &'static str,
        priority: i32,
    },

    #[error("{operation} failed: {detail}")]
    #[diagnostic(
        code(launch::resource),
        help("The OS rejected a thread, attribute or barrier operation. Check system limits.")
    )]
    Resource {
        operation: &'static str,
        detail: String,
    },

    #[error("Worker thread {index} panicked")]
    #[diagnostic(
        code(runtime::worker_panicked),
        help("The workload body panicked; see the log output for the panic message.")
    )]
    WorkerPanicked { index: usize },
}

impl DemoError {
    /// Build a resource error from an OS errno
    pub fn os(operation: &'static str, errno: Errno) -> Self {
        DemoError::Resource {
            operation,
            detail: errno.desc().to_string(),
        }
    }

    /// Errors raised before any thread exists
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DemoError::ArgParse { .. }
                | DemoError::ArityMismatch { .. }
                | DemoError::UnknownPolicy(_)
                | DemoError::PriorityOutOfRange { .. }
        )
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}
