/*!
 * Configuration
 * Turns raw command line input into a validated `DemoConfig`
 *
 * Validation here covers numbers, ranges and the pinning CPU. Policy names,
 * priorities and list lengths are checked by the resolver.
 */

pub mod cli;
pub mod tokens;

pub use cli::{Cli, PinScopeArg};
pub use tokens::{parse_c_int, split_list};

use crate::core::limits::{MAX_BUSY_DURATION, MAX_THREADS};
use crate::core::{DemoError, DemoResult};
use crate::launcher::affinity::current_thread_cpus;
use crate::launcher::{AffinityConfig, PinScope};
use std::time::Duration;

/// Validated configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub thread_count: usize,
    pub busy: Duration,
    pub policies: Vec<String>,
    pub priorities: Vec<String>,
    pub affinity: AffinityConfig,
    pub json_report: bool,
}

impl DemoConfig {
    /// Validate parsed command line values
    pub fn from_cli(cli: &Cli) -> DemoResult<Self> {
        let affinity = match cli.pin_cpu {
            None => AffinityConfig::floating(),
            Some(cpu) => AffinityConfig::pinned(
                check_pin_cpu(cpu)?,
                match cli.pin_scope {
                    PinScopeArg::All => PinScope::All,
                    PinScopeArg::First => PinScope::First,
                },
            ),
        };

        Ok(Self {
            thread_count: parse_thread_count(&cli.num_threads)?,
            busy: parse_busy_duration(&cli.time_wait)?,
            policies: split_list(&cli.policies),
            priorities: split_list(&cli.priorities),
            affinity,
            json_report: cli.json,
        })
    }
}

/// The CPU must be in the affinity mask the process already runs under
fn check_pin_cpu(cpu: usize) -> DemoResult<usize> {
    let allowed = current_thread_cpus()?;
    if allowed.contains(&cpu) {
        return Ok(cpu);
    }
    Err(DemoError::ArgParse {
        flag: "--pin-cpu",
        value: cpu.to_string(),
        reason: format!("CPU is not available to this process (allowed: {:?})", allowed),
    })
}

fn parse_thread_count(raw: &str) -> DemoResult<usize> {
    let err = |reason: &str| DemoError::ArgParse {
        flag: "-n",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| err("expected an integer"))?;

    if count <= 0 {
        return Err(err("thread count must be positive"));
    }
    if count as u64 > MAX_THREADS as u64 {
        return Err(err(&format!("thread count must not exceed {}", MAX_THREADS)));
    }

    Ok(count as usize)
}

fn parse_busy_duration(raw: &str) -> DemoResult<Duration> {
    let err = |reason: &str| DemoError::ArgParse {
        flag: "-t",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| err("expected a number of seconds"))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(err("busy duration must be a positive number of seconds"));
    }
    if seconds > MAX_BUSY_DURATION.as_secs_f64() {
        return Err(err(&format!(
            "busy duration must not exceed {} seconds",
            MAX_BUSY_DURATION.as_secs()
        )));
    }

    Ok(Duration::from_secs_f64(seconds))
}
