/*!
 * Scheduling Demo - Main Entry Point
 *
 * Parses the command line, runs the workers and maps failures to exit codes:
 * 0 on success or -h, 1 on any configuration, launch or join failure.
 */

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use miette::Report;
use std::process::ExitCode;
use tracing::{error, info};

use sched_demo::{init_tracing, run, Cli, DemoConfig, DemoError};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help goes to stdout, usage errors to stderr
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_tracing();
    // Keep diagnostics on one line each so messages stay greppable
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().wrap_lines(false).build())
    }));

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            report_failure(err);
            ExitCode::from(code as u8)
        }
    }
}

fn execute(cli: &Cli) -> Result<(), DemoError> {
    let config = DemoConfig::from_cli(cli)?;
    info!(
        threads = config.thread_count,
        busy_secs = config.busy.as_secs_f64(),
        policies = %config.policies.join(","),
        priorities = %config.priorities.join(","),
        pin_cpu = ?config.affinity.cpu(),
        "Starting run"
    );

    let report = run(&config)?;

    if config.json_report {
        match serde_json::to_string_pretty(&report.summary()) {
            Ok(json) => println!("{}", json),
            Err(e) => error!(error = %e, "Could not serialize run report"),
        }
    }

    Ok(())
}

fn report_failure(err: DemoError) {
    let is_arg_error = matches!(err, DemoError::ArgParse { .. });
    if err.is_configuration() {
        error!(error = %err, "Configuration rejected");
    } else {
        error!(error = %err, "Run failed");
    }

    eprintln!("{:?}", Report::new(err));
    if is_arg_error {
        eprintln!("{}", Cli::command().render_usage());
    }
}
