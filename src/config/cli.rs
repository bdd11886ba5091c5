/*!
 * Command Line Surface
 * clap definition of the demo's flags
 */

use clap::{Parser, ValueEnum};

/// Run N threads under explicit scheduling policies and release them together
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sched_demo",
    about = "Run threads under explicit scheduling policies and start them simultaneously",
    after_help = "Example:\n\tsched_demo -n 4 -t 0.5 -s NORMAL,FIFO,NORMAL,FIFO -p -1,10,-1,30"
)]
pub struct Cli {
    /// Number of threads to run simultaneously
    #[arg(short = 'n', value_name = "NUM_THREADS", allow_hyphen_values = true)]
    pub num_threads: String,

    /// Duration of the "busy" period in seconds
    #[arg(short = 't', value_name = "TIME_WAIT", allow_hyphen_values = true)]
    pub time_wait: String,

    /// Scheduling policy for each thread (FIFO, NORMAL or OTHER)
    #[arg(short = 's', value_name = "POLICIES")]
    pub policies: String,

    /// Real-time priority for each thread (ignored for NORMAL threads)
    #[arg(short = 'p', value_name = "PRIORITIES", allow_hyphen_values = true)]
    pub priorities: String,

    /// Pin workers to this CPU; workers float freely when omitted
    #[arg(long = "pin-cpu", value_name = "CPU")]
    pub pin_cpu: Option<usize>,

    /// Which workers the --pin-cpu setting applies to
    #[arg(long = "pin-scope", value_enum, default_value_t = PinScopeArg::All)]
    pub pin_scope: PinScopeArg,

    /// Print a JSON run report to stdout after all threads are joined
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinScopeArg {
    /// Every worker is pinned
    All,
    /// Only the first worker (index 0) is pinned
    First,
}
