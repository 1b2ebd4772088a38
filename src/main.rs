//! trigger-gate
//!
//! Decides whether a Git-hosting event may trigger CI pipelines.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trigger_gate::{
    acl::AclEngine,
    config::{AppConfig, LogFormat, LoggingConfig, load_config},
    event::Event,
    provider::create_provider,
    server::{DecisionResponse, run_server},
};

/// Access control gateway for CI triggers
#[derive(Parser, Debug)]
#[command(name = "trigger-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TRIGGER_GATE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "TRIGGER_GATE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP decision API
    Serve(ServeArgs),

    /// Decide a single event and print the verdict as JSON
    ///
    /// Exit status: 0 allowed, 1 denied, 2 error.
    Check {
        /// Event JSON file, `-` or absent for stdin
        event: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct ServeArgs {
    /// Bind host (default from config)
    #[arg(long, env = "TRIGGER_GATE_HOST")]
    host: Option<String>,

    /// Bind port (default from config)
    #[arg(long, env = "TRIGGER_GATE_PORT")]
    port: Option<u16>,
}

const EXIT_DENIED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let config = load_config(args.config.as_deref());

    // Logging comes up before config errors are reported so they are visible
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(&logging, args.log_level.as_deref());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match args.command {
        Command::Serve(serve) => serve_command(config, serve).await,
        Command::Check { event } => check_command(config, event).await,
    };

    result.unwrap_or_else(|e| {
        error!(error = %e, "trigger-gate failed");
        ExitCode::from(EXIT_ERROR)
    })
}

/// `RUST_LOG` wins, then `--log-level`, then the config file
fn init_logging(logging: &LoggingConfig, cli_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(cli_level.unwrap_or(logging.level.as_str()))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_engine(config: &AppConfig) -> anyhow::Result<Arc<AclEngine>> {
    let provider = create_provider(&config.provider)
        .inspect_err(|e| error!(error = %e, "Failed to create provider client"))?;

    info!(
        provider = %config.provider.kind,
        api_url = %config.provider.api_url(),
        "Provider configured"
    );

    Ok(Arc::new(AclEngine::new(provider, config.acl.clone())))
}

/// Cancel `token` on Ctrl+C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            token.cancel();
        }
    });
}

async fn serve_command(mut config: AppConfig, args: ServeArgs) -> anyhow::Result<ExitCode> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting trigger-gate");

    let engine = build_engine(&config)?;
    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    run_server(&config.server, engine, shutdown).await?;
    Ok(ExitCode::SUCCESS)
}

async fn check_command(config: AppConfig, path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let raw = match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read(&path).await?,
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };
    let event: Event = serde_json::from_slice(&raw)?;

    let engine = build_engine(&config)?;
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let timeout = std::time::Duration::from_secs(config.server.decision_timeout_secs);
    let decision = tokio::select! {
        decision = engine.decide(&cancel, &event) => decision?,
        _ = tokio::time::sleep(timeout) => {
            cancel.cancel();
            warn!(timeout_secs = timeout.as_secs(), "Decision timed out");
            anyhow::bail!("decision timed out after {} seconds", timeout.as_secs());
        }
    };

    let allowed = decision.is_allowed();
    println!("{}", serde_json::to_string(&DecisionResponse::from(decision))?);

    Ok(if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DENIED)
    })
}
