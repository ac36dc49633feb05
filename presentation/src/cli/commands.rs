//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use taskforce_domain::OutputFormat;

/// Output format for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Only the final answer
    Answer,
    /// Answer plus plan, transcript and diagnostics
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Answer => OutputFormat::Answer,
            OutputFormatArg::Full => OutputFormat::Full,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for taskforce
#[derive(Parser, Debug)]
#[command(name = "taskforce")]
#[command(author, version, about = "Ledger-driven multi-agent task coordinator")]
#[command(long_about = r#"
Taskforce hands a task to a small team of agents led by an orchestrator.

The orchestrator keeps two ledgers:
1. Task ledger: facts, educated guesses and a plan
2. Progress ledger: re-evaluated every turn to pick the next agent

After repeated stalls the orchestrator replans from what it has learned.

Configuration files are loaded from (in priority order):
1. --config <path>               Explicit config file
2. ./taskforce.toml              Project-level config
3. ~/.config/taskforce/config.toml   Global config

Example:
  taskforce "How many lines does /etc/hosts have?"
  taskforce --error-type timeout --query-num 2 --trial-num 1 "Plot sin(x) to sin.png"
  taskforce --hil --max-turns 10 "Clean up ./build"
"#)]
pub struct Cli {
    /// The task to solve
    pub task: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Add a human proxy agent that asks you on the terminal
    #[arg(long)]
    pub hil: bool,

    /// Add the web navigator agent
    #[arg(long)]
    pub web_surfer: bool,

    /// Add the video inspector agent
    #[arg(long)]
    pub video_surfer: bool,

    /// Model name (overrides [model].name)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum number of agent dispatches
    #[arg(long, value_name = "N")]
    pub max_turns: Option<u32>,

    /// Consecutive stalls before replanning
    #[arg(long, value_name = "N")]
    pub max_stalls: Option<u32>,

    /// Input type recorded with every execution attempt
    #[arg(long, value_name = "TYPE")]
    pub input_type: Option<String>,

    /// Fault class to inject into code execution
    #[arg(long, value_name = "CLASS")]
    pub error_type: Option<String>,

    /// Execution attempt that receives the injected fault (default 1)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub query_num: Option<i64>,

    /// Trial identifier recorded with every execution attempt
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub trial_num: Option<i64>,

    /// Write the run transcript as JSONL
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Also write tracing output to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
