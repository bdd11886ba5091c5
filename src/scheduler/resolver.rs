/*!
 * Policy/Priority Resolver
 * Converts the parsed policy and priority lists into one `ThreadSpec` per thread
 */

use super::bounds::PriorityBounds;
use super::types::{SchedPolicy, ThreadSpec};
use crate::config::parse_c_int;
use crate::core::limits::NORMAL_PRIORITY;
use crate::core::{DemoError, DemoResult};
use tracing::debug;

/// Resolve `thread_count` thread specs from textual policy and priority tokens
///
/// Checks run in this order, and the first failure wins:
/// 1. every policy token names a supported class
/// 2. both lists hold exactly `thread_count` tokens
/// 3. each priority lies in the OS range for its class
///
/// Normal-class threads always get priority 0, whatever the token says.
/// Nothing is created here; the result only describes threads.
pub fn resolve_thread_specs<S: AsRef<str>>(
    thread_count: usize,
    policies: &[S],
    priorities: &[S],
    bounds: &dyn PriorityBounds,
) -> DemoResult<Vec<ThreadSpec>> {
    let classes = policies
        .iter()
        .map(|token| SchedPolicy::from_token(token.as_ref()))
        .collect::<DemoResult<Vec<_>>>()?;

    check_arity("policies", thread_count, classes.len())?;
    check_arity("priorities", thread_count, priorities.len())?;

    classes
        .into_iter()
        .zip(priorities)
        .enumerate()
        .map(|(index, (policy, token))| {
            let requested = parse_c_int(token.as_ref());
            let priority = effective_priority(index, policy, requested, bounds)?;
            debug!(
                index,
                policy = policy.as_str(),
                requested,
                priority,
                "Resolved thread spec"
            );
            Ok(ThreadSpec {
                index,
                policy,
                priority,
            })
        })
        .collect()
}

fn check_arity(list: &'static str, expected: usize, found: usize) -> DemoResult<()> {
    if found != expected {
        return Err(DemoError::ArityMismatch {
            list,
            expected,
            found,
        });
    }
    Ok(())
}

fn effective_priority(
    index: usize,
    policy: SchedPolicy,
    requested: i32,
    bounds: &dyn PriorityBounds,
) -> DemoResult<i32> {
    let priority = if policy.is_realtime() {
        requested
    } else {
        NORMAL_PRIORITY
    };

    let range = bounds.range(policy)?;
    if !range.contains(priority) {
        return Err(DemoError::PriorityOutOfRange {
            index,
            policy: policy.as_str(),
            value: priority,
            min: range.min,
            max: range.max,
        });
    }

    Ok(priority)
}
