//! Command-line predicate waiter for end-to-end test scripts.
//!
//! Runs a shell command repeatedly until it succeeds (or, with `--not`, until
//! it fails) or a timeout passes, and prints suite fixtures from the shared
//! appwait configuration.
//!
//! # Usage
//!
//! ```bash
//! # Wait up to 30s (the configured default) for a port to open
//! appwait wait -- nc -z localhost 4723
//!
//! # Wait up to 10s, polling every 500ms
//! appwait wait -o 10000 -i 500 -- adb shell pidof com.swaglabsmobileapp
//!
//! # Wait for a process to go away
//! appwait wait --not -- pgrep -x Simulator
//!
//! # JSON outcome for CI
//! appwait -f json wait -o 5000 -- test -f /tmp/ready
//!
//! # Show effective configuration, page URLs and login fixtures
//! appwait config
//! appwait config --path ./e2e.json
//! appwait config --save
//! appwait pages --base http://localhost:3000
//! appwait users
//! ```
//!
//! Exit codes: `0` when the condition was met, `1` when the wait timed out or
//! was interrupted, `2` for invalid timings or configuration, `3` when output
//! could not be serialized.

use std::path::{Path, PathBuf};
use std::process::{ExitCode, Stdio};
use std::time::Instant;

use appwait_core::config::E2eConfig;
use appwait_core::fixtures::{LoginUser, Page};
use appwait_core::wait::{wait_until, WaitConfig, WaitOutcome, WaitRequest};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Poll a condition until it holds or a timeout passes.
#[derive(Parser)]
#[command(name = "appwait")]
#[command(about = "Poll a condition until it holds or a timeout passes")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.appwait/config.json
    #[arg(short, long, env = "APPWAIT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Suppress the text status line and other non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run a command until it exits successfully
    Wait {
        /// Wait for the command to fail instead
        #[arg(long)]
        not: bool,
        /// Timeout in milliseconds (defaults to the configured wait timeout)
        #[arg(short = 'o', long, env = "APPWAIT_TIMEOUT")]
        timeout: Option<u64>,
        /// Poll interval in milliseconds (defaults to the configured interval)
        #[arg(short, long, env = "APPWAIT_INTERVAL")]
        interval: Option<u64>,
        /// The command to poll, with its arguments
        #[arg(
            value_name = "COMMAND",
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        argv: Vec<String>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Config file to read (overrides -c/--config)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },

    /// List page names and URLs
    Pages {
        /// Base URL (defaults to the configured base URL)
        #[arg(short, long)]
        base: Option<String>,
    },

    /// List login fixtures
    Users,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !matches!(e, CliError::TimedOut) {
                eprintln!("Error: {}", e);
            }
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    TimedOut,
    InvalidArgs(String),
    Config(String),
    Output(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::TimedOut => ExitCode::from(1),
            CliError::InvalidArgs(_) | CliError::Config(_) => ExitCode::from(2),
            CliError::Output(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::TimedOut => write!(f, "Timed out"),
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

/// The explicitly requested config file, if any.
fn config_path(cli: &Cli) -> Option<&Path> {
    match cli.command {
        Command::Config {
            path: Some(ref path),
            ..
        } => Some(path.as_path()),
        _ => cli.config.as_deref(),
    }
}

fn load_config(cli: &Cli) -> Result<E2eConfig, CliError> {
    match config_path(cli) {
        Some(path) => E2eConfig::load_from(path)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e))),
        None => Ok(E2eConfig::load()),
    }
}

fn save_config(config: &E2eConfig, cli: &Cli) -> Result<PathBuf, CliError> {
    let result = match config_path(cli) {
        Some(path) => config.save_to(path).map(|()| path.to_path_buf()),
        None => config.save(),
    };
    result.map_err(|e| CliError::Config(format!("cannot save: {}", e)))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Wait { not, timeout, interval, ref argv } => {
            let wait = WaitConfig::from_millis(
                timeout.unwrap_or(config.wait.timeout_ms()),
                interval.unwrap_or(config.wait.poll_interval_ms()),
            )
            .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
            wait_for_command(argv, !not, wait, &cli).await
        }
        Command::Config { save, .. } => {
            if save {
                let path = save_config(&config, &cli)?;
                if !cli.quiet {
                    eprintln!("Saved configuration to {}", path.display());
                }
            }
            let value = serde_json::to_value(&config).map_err(|e| CliError::Output(e.to_string()))?;
            print_json(&value)
        }
        Command::Pages { ref base } => {
            let base = base.as_deref().unwrap_or(config.base_url.as_str());
            if cli.format == OutputFormat::Json {
                let pages: Vec<_> = Page::ALL
                    .iter()
                    .map(|page| {
                        serde_json::json!({
                            "name": page.name(),
                            "path": page.path(),
                            "url": page.url(base),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({ "pages": pages }))
            } else {
                for page in Page::ALL {
                    println!("{:<24}{}", page.name(), page.url(base));
                }
                Ok(())
            }
        }
        Command::Users => {
            if cli.format == OutputFormat::Json {
                let users: Vec<_> = LoginUser::ALL
                    .iter()
                    .map(|user| {
                        let creds = user.credentials();
                        serde_json::json!({
                            "name": user.name(),
                            "username": creds.username,
                            "password": creds.password,
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({ "users": users }))
            } else {
                for user in LoginUser::ALL {
                    let creds = user.credentials();
                    println!("{:<18}{:<26}{}", user.name(), creds.username, creds.password);
                }
                Ok(())
            }
        }
    }
}

/// Runs `argv` once and reports whether it exited successfully.
///
/// Output is discarded, and the child is killed if the evaluation is dropped
/// because it overran its time budget.
async fn command_succeeds(argv: &[String]) -> std::io::Result<bool> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
    })?;
    let status = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await?;
    Ok(status.success())
}

async fn wait_for_command(
    argv: &[String],
    desired: bool,
    wait: WaitConfig,
    cli: &Cli,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, cancelling wait");
            trigger.cancel();
        }
    });

    let start = Instant::now();
    let outcome = wait_until(
        WaitRequest::new(move || command_succeeds(argv))
            .desired(desired)
            .config(wait)
            .cancel_on(cancel),
    )
    .await;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if cli.format == OutputFormat::Json {
        print_json(&serde_json::json!({
            "outcome": match outcome {
                WaitOutcome::Satisfied => "satisfied",
                WaitOutcome::TimedOut => "timed_out",
            },
            "satisfied": outcome.is_satisfied(),
            "elapsed_ms": elapsed_ms,
            "timeout_ms": wait.timeout_ms(),
            "poll_interval_ms": wait.poll_interval_ms(),
        }))?;
    } else if !cli.quiet {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        eprintln!("[{}] {} after {}ms: {}", now, outcome, elapsed_ms, argv.join(" "));
    }

    match outcome {
        WaitOutcome::Satisfied => Ok(()),
        WaitOutcome::TimedOut => Err(CliError::TimedOut),
    }
}
