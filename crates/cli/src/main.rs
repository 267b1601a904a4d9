// # -----------------------------
// # crates/cli/src/main.rs
// # -----------------------------
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use handoff_core::dispatch::parse_args;
use handoff_core::error::EXIT_USAGE;
use handoff_core::platform;
use handoff_core::{
    Dispatcher, Handoff, HandoffConfig, HandoffError, InstanceLocator, PayloadStaging,
    ProcessLauncher,
};

const PROGRAM: &str = "uri-handoff";

static LONG_VERSION: Lazy<String> =
    Lazy::new(|| handoff_build_info::formatted_banner(PROGRAM, env!("CARGO_PKG_VERSION")));

#[derive(Parser, Debug)]
#[command(name = PROGRAM, version, long_version = LONG_VERSION.as_str())]
#[command(about = "Deliver a URI to the running application instance, or start one")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace); overrides HANDOFF_LOG
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Configuration file (defaults to HANDOFF_CONFIG, then handoff.toml beside the binary)
    #[arg(long, env = "HANDOFF_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// The URI to hand off (exactly one)
    #[arg(value_name = "URI", num_args = 0..)]
    uris: Vec<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help / --version go to stdout and are not failures
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = init_logging(cli.log_level.as_deref()) {
        eprintln!("{}: {:#}", PROGRAM, err);
    }

    match run(&cli) {
        Ok(outcome) => {
            debug!(?outcome, "hand-off complete");
            ExitCode::SUCCESS
        }
        Err(err @ HandoffError::Usage { .. }) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code())
        }
        Err(err) => {
            eprintln!("{}: {}", PROGRAM, err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<Handoff, HandoffError> {
    // Arity and syntax come first: a bad invocation must not depend on config.
    let uri = parse_args(PROGRAM, &cli.uris)?;
    let config = HandoffConfig::load(cli.config.as_deref())?;
    debug!(?config, "effective configuration");

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let launch = config
        .launch
        .to_launch_config(handoff_build_info::prerelease_channel(), exe_dir);

    let desktop = platform::native_desktop(config.notify.timeout());
    let dispatcher = Dispatcher::new(
        config.instance.window_class.clone(),
        InstanceLocator::new(desktop.clone()),
        PayloadStaging::new(config.staging.dir.clone()),
        desktop,
        ProcessLauncher::new(launch),
    )
    .with_program_name(PROGRAM)
    .with_orphan_ttl(config.staging.orphan_ttl());

    dispatcher.dispatch(&uri)
}

fn init_logging(log_level: Option<&str>) -> Result<()> {
    // CLI arg overrides HANDOFF_LOG; default stays quiet so stderr only
    // carries the failure message.
    let filter = if let Some(level) = log_level {
        match level.to_lowercase().as_str() {
            "off" => EnvFilter::new("off"),
            "error" => EnvFilter::new("error"),
            "warn" | "warning" => EnvFilter::new("warn"),
            "info" => EnvFilter::new("info"),
            "debug" => EnvFilter::new("debug"),
            "trace" => EnvFilter::new("trace"),
            _ => {
                eprintln!("Warning: Invalid log level '{}', using 'warn'", level);
                EnvFilter::new("warn")
            }
        }
    } else {
        EnvFilter::try_from_env("HANDOFF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {}", err))
}
