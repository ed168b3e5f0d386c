#![forbid(unsafe_code)]

//! `probe-console` server binary.
//!
//! Bootstraps configuration and the event store, launches or attaches to
//! an instrumented client process, mirrors its activity to stdout, and
//! exits once the last attached client is gone.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use probe_console::config::GlobalConfig;
use probe_console::feed::StdoutFeed;
use probe_console::orchestrator::registry::SessionRegistry;
use probe_console::orchestrator::server::ProbeServer;
use probe_console::persistence::{db, event_log::EventLog};
use probe_console::process::{ProcessHost, SystemProcessHost};
use probe_console::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "probe-console", about = "Session console for instrumented client processes", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Override the event store path from the configuration file.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Attach to an already-running client instead of launching one.
    #[arg(long, conflicts_with = "client")]
    attach: Option<u32>,

    /// Client command to launch, given after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    client: Vec<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("probe-console server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(db_path) = &args.db {
        config.db_path = db_path.clone();
    }
    info!("configuration loaded");

    // ── Open the event store ────────────────────────────
    let pool = db::connect(&config.db_path).await?;
    let store = Arc::new(EventLog::new(Arc::new(pool)));
    info!(db = %config.db_path.display(), "event store ready");

    // ── Build the server ────────────────────────────────
    let host = Arc::new(SystemProcessHost::new(config.exit_poll()));
    let dyn_host: Arc<dyn ProcessHost> = host.clone();
    let registry = Arc::new(SessionRegistry::new(Arc::clone(&dyn_host)));
    let server = ProbeServer::new(registry, store, Arc::new(StdoutFeed), dyn_host);

    server.server_event("server starting").await?;

    // ── Serve until the last session drains ─────────────
    match serve(&args, &config, &host, &server).await {
        Ok(()) => {
            server.server_event("server stopped").await?;
            info!("probe-console shut down");
            Ok(())
        }
        Err(err) => {
            error!(%err, "server run failed");
            // Best effort: the fault may be the store itself going away.
            if let Err(log_err) = server
                .server_event(&format!("server stopped, error: {err}"))
                .await
            {
                error!(%log_err, "failed to record server stop");
            }
            Err(err)
        }
    }
}

async fn serve(
    args: &Cli,
    config: &GlobalConfig,
    host: &SystemProcessHost,
    server: &ProbeServer,
) -> Result<()> {
    let pid = match args.attach {
        Some(pid) => pid,
        None => {
            let Some((program, rest)) = args.client.split_first() else {
                return Err(AppError::Config(
                    "no client to serve: pass a command after `--` or use --attach".into(),
                ));
            };
            host.launch(program, rest, config.plugin_dir()).await?.pid
        }
    };

    server.attach(pid).await?;
    info!(pid, "initial client attached");

    server.wait_until_drained().await;
    info!("last session disconnected; draining complete");

    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Diagnostics go to stderr; stdout is reserved for the live feed.
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
