//! CLI entrypoint for taskforce
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use taskforce_application::{
    Coordinator, HumanInputPort, NoRunObserver, RosterBuilder, RunObserver,
};
use taskforce_domain::{OutputFormat, RunStatus};
use taskforce_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, LocalCommandRunner, OpenAiGateway,
    OpenAiSettings,
};
use taskforce_presentation::{Cli, ConsoleFormatter, ConsoleRunObserver, StdinHumanInput};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;
    info!("Starting taskforce with model {}", config.model.name);

    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(task) = cli.task.clone() else {
        bail!("A task is required. Run with --help for usage.");
    };

    // === Dependency Injection ===
    let model_info = config.model.to_model_info();
    let gateway = Arc::new(OpenAiGateway::new(
        model_info,
        OpenAiSettings {
            base_url: config.model.base_url.clone(),
            api_key: config.model.resolve_api_key(),
            timeout: Duration::from_secs(config.model.timeout_seconds),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
        },
    )?);

    let runner = match &config.executor.work_dir {
        Some(dir) => LocalCommandRunner::new(dir),
        None => LocalCommandRunner::in_temp_dir(),
    }
    .with_timeout(Duration::from_secs(config.executor.timeout_seconds))
    .with_shell(config.executor.shell.clone())
    .with_python(config.executor.python.clone())
    .with_max_output_bytes(config.executor.max_output_bytes);
    info!("Code executor working directory: {}", runner.work_dir().display());

    let mut builder = RosterBuilder::new(gateway.clone(), Arc::new(runner))
        .hil_mode(config.roster.hil_mode)
        .include_web_surfer(config.roster.web_surfer)
        .include_video_surfer(config.roster.video_surfer)
        .with_constraints(config.constraints.to_constraints()?);
    if config.roster.hil_mode {
        let input: Arc<dyn HumanInputPort> = Arc::new(StdinHumanInput::new());
        builder = builder.with_human_input(input);
    }
    let roster = builder.build()?;

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let mut coordinator = Coordinator::new(roster, gateway)
        .with_params(config.orchestrator.to_params())
        .with_cancellation(cancellation);
    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::try_create(path)
    {
        info!("Conversation log: {}", logger.path().display());
        coordinator = coordinator.with_conversation_logger(Arc::new(logger));
    }

    // Execute with or without progress reporting
    let observer: Box<dyn RunObserver> = if cli.quiet || !config.output.show_progress {
        Box::new(NoRunObserver)
    } else {
        Box::new(ConsoleRunObserver::new().with_verbose(cli.verbose > 0))
    };
    let output = coordinator
        .execute_with_observer(&task, observer.as_ref())
        .await?;

    // Output results
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    print!("{}", ConsoleFormatter::format(&output, format));
    if format == OutputFormat::Json {
        println!();
    }

    Ok(exit_code(output.status))
}

/// Command-line flags win over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(max_turns) = cli.max_turns {
        config.orchestrator.max_turns = max_turns;
    }
    if let Some(max_stalls) = cli.max_stalls {
        config.orchestrator.max_stalls = max_stalls;
    }
    if cli.hil {
        config.roster.hil_mode = true;
    }
    if cli.web_surfer {
        config.roster.web_surfer = true;
    }
    if cli.video_surfer {
        config.roster.video_surfer = true;
    }
    if let Some(input_type) = &cli.input_type {
        config.constraints.input_type = Some(input_type.clone());
    }
    if let Some(error_type) = &cli.error_type {
        config.constraints.error_type = Some(error_type.clone());
    }
    if cli.query_num.is_some() {
        config.constraints.query_num = cli.query_num;
    }
    if cli.trial_num.is_some() {
        config.constraints.trial_num = cli.trial_num;
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.clone());
    }
    if let Some(path) = &cli.log_file {
        config.logging.log_file = Some(path.clone());
    }
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` is honored when no `-v` flag is given. With a log file, a
/// second non-ANSI layer writes there through a background worker; the
/// returned guard flushes it on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow!("Failed to open log file {}: {}", path.display(), e))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, cancelling run");
                token.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });
}

fn exit_code(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Complete => ExitCode::SUCCESS,
        RunStatus::Incomplete => ExitCode::from(2),
        RunStatus::Cancelled => ExitCode::from(130),
    }
}
