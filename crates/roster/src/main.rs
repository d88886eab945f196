//! Roster - Entry point
//!
//! Loads configuration, initialises logging and serves the user API until
//! SIGINT or SIGTERM.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use roster_config::{ConfigLoader, RosterConfig};
use roster_server::{App, Server};
use tracing::info;

/// File read when `--config` is not given, if it exists.
const DEFAULT_CONFIG_FILE: &str = "roster.toml";

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config requires a path")?;
                    config = Some(PathBuf::from(path));
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("roster {}", roster::VERSION);
                    std::process::exit(0);
                }
                other => anyhow::bail!("unknown argument: {other} (use --help for usage)"),
            }
        }

        Ok(Self { config })
    }
}

fn print_help() {
    println!(
        r"Roster - In-memory user management service

USAGE:
    roster [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

Without --config, ./roster.toml is read if it exists.

ENVIRONMENT VARIABLES:
    ROSTER__SERVER__HTTP_ADDR               Listen address (default: 0.0.0.0:8080)
    ROSTER__SERVER__SHUTDOWN_TIMEOUT_SECS   Graceful shutdown timeout (default: 30)
    ROSTER__SERVER__REQUEST_TIMEOUT_MS      Request body timeout (default: 30000)
    ROSTER__SERVER__MAX_BODY_BYTES          Request body size limit (default: 1048576)
    ROSTER__LOGGING__LEVEL                  Log level (default: info)
    ROSTER__LOGGING__FORMAT                 json or pretty (default: json)
    RUST_LOG                                Overrides the configured log level

A .env file in the working directory is loaded first.
"
    );
}

fn load_config(args: &Args) -> anyhow::Result<RosterConfig> {
    let loader = ConfigLoader::new().with_dotenv()?;
    let loader = match &args.config {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => loader.with_optional_file(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    loader
        .with_env_prefix("ROSTER")
        .load()
        .context("invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse()?;
    let config = load_config(&args)?;

    roster_telemetry::init_logging(&config.logging.to_log_config())
        .context("failed to initialise logging")?;

    info!(
        version = roster::VERSION,
        addr = %config.server.http_addr,
        tokens = config.auth.tokens.len(),
        "Starting roster"
    );

    let app = Arc::new(App::from_config(&config));
    Server::new(app, &config.server).run().await?;

    info!("Roster stopped");
    Ok(())
}
