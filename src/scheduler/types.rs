/*!
 * Scheduler Types
 * Domain types for per-thread scheduling configuration
 */

use crate::core::limits::{POLICY_TOKENS_NORMAL, POLICY_TOKEN_FIFO};
use crate::core::{DemoError, DemoResult};
use nix::libc;
use serde::{Serialize, Serializer};

/// OS scheduling class a worker runs under
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedPolicy {
    /// Real-time fixed-priority FIFO (`SCHED_FIFO`)
    RealtimeFifo,
    /// Time-sharing class (`SCHED_OTHER`), no real-time priority
    Normal,
}

impl SchedPolicy {
    /// Parse a policy token from the command line
    ///
    /// Matching is case-sensitive: `FIFO`, `NORMAL` or `OTHER`.
    pub fn from_token(token: &str) -> DemoResult<Self> {
        if token == POLICY_TOKEN_FIFO {
            Ok(Self::RealtimeFifo)
        } else if POLICY_TOKENS_NORMAL.contains(&token) {
            Ok(Self::Normal)
        } else {
            Err(DemoError::UnknownPolicy(token.to_string()))
        }
    }

    /// Convert to string representation
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RealtimeFifo => "FIFO",
            Self::Normal => "NORMAL",
        }
    }

    /// Native policy constant passed to the pthread attribute calls
    #[inline]
    pub const fn native(&self) -> libc::c_int {
        match self {
            Self::RealtimeFifo => libc::SCHED_FIFO,
            Self::Normal => libc::SCHED_OTHER,
        }
    }

    /// Whether priorities are meaningful in this class
    #[inline]
    pub const fn is_realtime(&self) -> bool {
        matches!(self, Self::RealtimeFifo)
    }
}

impl std::fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Inclusive priority bounds for one scheduling class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityRange {
    pub min: i32,
    pub max: i32,
}

impl PriorityRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub const fn contains(&self, priority: i32) -> bool {
        priority >= self.min && priority <= self.max
    }
}

/// Resolved scheduling configuration for one worker
///
/// Immutable once produced by the resolver. The native thread handle is
/// tracked separately by the launcher so that resolving is side-effect free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ThreadSpec {
    /// 0-based worker index, also the creation order
    pub index: usize,
    pub policy: SchedPolicy,
    /// Effective priority; always 0 for `Normal`
    pub priority: i32,
}
