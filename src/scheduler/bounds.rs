/*!
 * Priority Bounds
 * Legal priority ranges per scheduling class, as reported by the OS
 */

use super::types::{PriorityRange, SchedPolicy};
use crate::core::{DemoError, DemoResult};
use nix::errno::Errno;
use nix::libc;

/// Source of legal priority ranges
///
/// The resolver only depends on this trait so it can be exercised with fixed
/// ranges in tests and on hosts where the real ranges differ.
pub trait PriorityBounds: Send + Sync {
    fn range(&self, policy: SchedPolicy) -> DemoResult<PriorityRange>;
}

/// Queries `sched_get_priority_min` / `sched_get_priority_max`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsPriorityBounds;

impl PriorityBounds for OsPriorityBounds {
    fn range(&self, policy: SchedPolicy) -> DemoResult<PriorityRange> {
        let native = policy.native();

        // SAFETY: both calls only read the policy constant.
        let min = unsafe { libc::sched_get_priority_min(native) };
        if min == -1 {
            return Err(DemoError::os("sched_get_priority_min", Errno::last()));
        }
        let max = unsafe { libc::sched_get_priority_max(native) };
        if max == -1 {
            return Err(DemoError::os("sched_get_priority_max", Errno::last()));
        }

        Ok(PriorityRange::new(min, max))
    }
}

/// Fixed ranges, independent of the host
#[derive(Debug, Clone, Copy)]
pub struct FixedPriorityBounds {
    pub realtime: PriorityRange,
    pub normal: PriorityRange,
}

impl FixedPriorityBounds {
    /// The ranges Linux reports for SCHED_FIFO and SCHED_OTHER
    pub const fn linux() -> Self {
        Self {
            realtime: PriorityRange::new(1, 99),
            normal: PriorityRange::new(0, 0),
        }
    }
}

impl PriorityBounds for FixedPriorityBounds {
    fn range(&self, policy: SchedPolicy) -> DemoResult<PriorityRange> {
        Ok(match policy {
            SchedPolicy::RealtimeFifo => self.realtime,
            SchedPolicy::Normal => self.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_bounds_are_sane() {
        let bounds = OsPriorityBounds;
        let fifo = bounds.range(SchedPolicy::RealtimeFifo).unwrap();
        assert!(fifo.min <= fifo.max);
        assert!(fifo.min > 0);

        let normal = bounds.range(SchedPolicy::Normal).unwrap();
        assert!(normal.contains(0));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_os_bounds_match_linux_constants() {
        let bounds = OsPriorityBounds;
        let expected = FixedPriorityBounds::linux();
        assert_eq!(
            bounds.range(SchedPolicy::RealtimeFifo).unwrap(),
            expected.realtime
        );
        assert_eq!(bounds.range(SchedPolicy::Normal).unwrap(), expected.normal);
    }
}
