/*!
 * Resolver Tests
 * Property tests for policy/priority resolution
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sched_demo::config::split_list;
use sched_demo::scheduler::FixedPriorityBounds;
use sched_demo::{resolve_thread_specs, DemoError, SchedPolicy};

fn policy_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("FIFO"), Just("NORMAL"), Just("OTHER")]
}

fn thread_lists() -> impl Strategy<Value = Vec<(&'static str, i32)>> {
    prop::collection::vec((policy_token(), -200i32..200), 1..16)
}

proptest! {
    #[test]
    fn prop_valid_input_yields_one_spec_per_thread(
        threads in prop::collection::vec((policy_token(), 1i32..=99), 1..16)
    ) {
        let policies: Vec<String> = threads.iter().map(|(p, _)| p.to_string()).collect();
        let priorities: Vec<String> = threads.iter().map(|(_, n)| n.to_string()).collect();

        let specs = resolve_thread_specs(
            threads.len(),
            &policies,
            &priorities,
            &FixedPriorityBounds::linux(),
        ).unwrap();

        prop_assert_eq!(specs.len(), threads.len());
        for (spec, (token, priority)) in specs.iter().zip(&threads) {
            if *token == "FIFO" {
                prop_assert_eq!(spec.policy, SchedPolicy::RealtimeFifo);
                prop_assert_eq!(spec.priority, *priority);
            } else {
                prop_assert_eq!(spec.policy, SchedPolicy::Normal);
                prop_assert_eq!(spec.priority, 0);
            }
        }
    }

    #[test]
    fn prop_fifo_priorities_checked_against_range(threads in thread_lists()) {
        let policies: Vec<String> = threads.iter().map(|(p, _)| p.to_string()).collect();
        let priorities: Vec<String> = threads.iter().map(|(_, n)| n.to_string()).collect();

        let result = resolve_thread_specs(
            threads.len(),
            &policies,
            &priorities,
            &FixedPriorityBounds::linux(),
        );

        let first_bad = threads
            .iter()
            .position(|(p, n)| *p == "FIFO" && !(1..=99).contains(n));

        match first_bad {
            Some(index) => prop_assert_eq!(
                result,
                Err(DemoError::PriorityOutOfRange {
                    index,
                    policy: "FIFO",
                    value: threads[index].1,
                    min: 1,
                    max: 99,
                })
            ),
            None => prop_assert_eq!(result.unwrap().len(), threads.len()),
        }
    }

    #[test]
    fn prop_arity_mismatch_always_fails(count in 1usize..16, tokens in 1usize..16) {
        prop_assume!(count != tokens);
        let policies = vec!["NORMAL".to_string(); tokens];
        let priorities = vec!["0".to_string(); count];

        let result = resolve_thread_specs(count, &policies, &priorities, &FixedPriorityBounds::linux());
        prop_assert_eq!(
            result,
            Err(DemoError::ArityMismatch { list: "policies", expected: count, found: tokens })
        );
    }

    #[test]
    fn prop_resolution_is_idempotent(threads in thread_lists()) {
        let policies: Vec<String> = threads.iter().map(|(p, _)| p.to_string()).collect();
        let priorities: Vec<String> = threads.iter().map(|(_, n)| n.to_string()).collect();
        let bounds = FixedPriorityBounds::linux();

        let first = resolve_thread_specs(threads.len(), &policies, &priorities, &bounds);
        let second = resolve_thread_specs(threads.len(), &policies, &priorities, &bounds);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_spec_examples() {
    let bounds = FixedPriorityBounds::linux();

    let mismatch = resolve_thread_specs(
        4,
        &split_list("NORMAL,FIFO,NORMAL"),
        &split_list("0,10,0,30"),
        &bounds,
    );
    assert_eq!(
        mismatch,
        Err(DemoError::ArityMismatch {
            list: "policies",
            expected: 4,
            found: 3
        })
    );

    let unknown = resolve_thread_specs(2, &split_list("NORMAL,BOGUS"), &split_list("0,0"), &bounds);
    assert_eq!(unknown, Err(DemoError::UnknownPolicy("BOGUS".to_string())));

    let out_of_range = resolve_thread_specs(1, &split_list("FIFO"), &split_list("150"), &bounds);
    assert_eq!(
        out_of_range,
        Err(DemoError::PriorityOutOfRange {
            index: 0,
            policy: "FIFO",
            value: 150,
            min: 1,
            max: 99
        })
    );
}

#[test]
fn test_os_bounds_accept_spec_example() {
    let specs = resolve_thread_specs(
        4,
        &split_list("NORMAL,FIFO,NORMAL,FIFO"),
        &split_list("0,10,0,30"),
        &sched_demo::OsPriorityBounds,
    )
    .unwrap();
    let priorities: Vec<i32> = specs.iter().map(|s| s.priority).collect();
    assert_eq!(priorities, vec![0, 10, 0, 30]);
}

#[test]
fn test_whitespace_stays_part_of_tokens() {
    let bounds = FixedPriorityBounds::linux();

    let padded_policy = resolve_thread_specs(2, &split_list("NORMAL, FIFO"), &split_list("0,10"), &bounds);
    assert_eq!(padded_policy, Err(DemoError::UnknownPolicy(" FIFO".to_string())));

    // Leading whitespace is still accepted by atoi-style priority parsing
    let padded_priority =
        resolve_thread_specs(2, &split_list("NORMAL,FIFO"), &split_list("0, 10"), &bounds).unwrap();
    assert_eq!(padded_priority[1].priority, 10);
}
