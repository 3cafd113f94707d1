// # ddnsd - Websupport DDNS updater
//
// The ddnsd binary is a thin integration layer. It is responsible for:
// 1. Parsing the command line and reading the JSON configuration file
// 2. Initializing logging (stdout, optionally a file)
// 3. Wiring the IP lookup, the Websupport provider and notification channels
// 4. Running the engine once, or on an interval until SIGTERM/SIGINT
//
// All DNS logic lives in ddns-core.
//
// ## Usage
//
// ```bash
// ddnsd                          # one reconciliation, then exit
// ddnsd --repeat                 # reconcile every engine.interval_secs
// ddnsd --config /etc/ddns.json  # or DDNS_CONFIG=/etc/ddns.json
// ```
//
// `DDNS_LOG_LEVEL` overrides `logging.level` from the configuration file.

use anyhow::Context;
use clap::Parser;
use ddns_core::config::LoggingConfig;
use ddns_core::{DdnsConfig, DdnsEngine, Error, RunMode, RunSummary, Runner};
use ddns_provider_websupport::WebsupportProvider;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Level, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration, usage or startup error
/// - 2: Runtime error (unexpected)
/// - 3: Neither IP lookup service returned an address
/// - 4: The Websupport API rejected the credentials
/// - 5: The configured domain is not accessible with the account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// Both IP lookup services failed
    IpLookupFailed = 3,
    /// Provider login failed
    AuthenticationFailed = 4,
    /// Managed domain not accessible
    DomainAccessFailed = 5,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Error> for DdnsExitCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::IpLookup(_) => DdnsExitCode::IpLookupFailed,
            Error::Authentication(_) => DdnsExitCode::AuthenticationFailed,
            Error::DomainAccess(_) => DdnsExitCode::DomainAccessFailed,
            Error::Config(_) | Error::Json(_) => DdnsExitCode::ConfigError,
            _ => DdnsExitCode::RuntimeError,
        }
    }
}

/// Keep subdomains of a Websupport zone pointed at this host's public IPv4
#[derive(Debug, Parser)]
#[command(name = "ddnsd", version, about)]
struct Cli {
    /// Keep running and reconcile on a fixed interval until terminated
    #[arg(long)]
    repeat: bool,

    /// Path to the JSON configuration file
    #[arg(short, long, env = "DDNS_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Seconds between runs in repeat mode (overrides engine.interval_secs)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,
}

impl Cli {
    /// Load the configuration file and apply command line overrides
    fn load_config(&self) -> ddns_core::Result<DdnsConfig> {
        let mut config = DdnsConfig::from_file(&self.config)?;
        if let Some(interval) = self.interval {
            config.engine.interval_secs = interval;
        }
        config.validate()?;
        Ok(config)
    }

    fn run_mode(&self, config: &DdnsConfig) -> RunMode {
        if self.repeat {
            RunMode::Repeat {
                interval: Duration::from_secs(config.engine.interval_secs),
            }
        } else {
            RunMode::Once
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version end up here too
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error ({}): {}", cli.config.display(), e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd for {}", config.websupport.registered_domain);
    info!(
        "Configuration loaded: {} subdomain(s), tag {}",
        config.websupport.subdomains.len(),
        config.ownership_tag()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let mode = cli.run_mode(&config);
    let result = rt.block_on(async {
        match run_daemon(config, mode).await {
            Ok(summary) => {
                info!(
                    "Finished: {} cycle(s), {} failed, {} change(s)",
                    summary.cycles, summary.failed_cycles, summary.changes
                );
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("{}", e);
                DdnsExitCode::from(&e)
            }
        }
    });

    result.into()
}

/// Set up the global subscriber: stdout, plus an append-only file if configured
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level_name = env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| config.level.clone());
    let level: Level = level_name
        .parse()
        .with_context(|| format!("invalid log level '{}'", level_name))?;
    let filter = LevelFilter::from_level(level);

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .with(file_layer)
        .try_init()
        .context("failed to set tracing subscriber")?;

    Ok(())
}

/// Wire the components and run until done
async fn run_daemon(config: DdnsConfig, mode: RunMode) -> ddns_core::Result<RunSummary> {
    let resolver = ddns_ip_http::resolver_from_config(&config.ip_lookup)?;
    let provider = WebsupportProvider::from_config(&config.websupport)?;
    let notifier = ddns_notify::dispatcher_from_config(&config.notifiers)?;
    let engine = DdnsEngine::new(Box::new(provider), notifier, &config)?;
    let runner = Runner::new(resolver, engine, mode);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // Signal handlers are only installed in repeat mode, a single run keeps
    // the default behaviour of SIGINT
    let _shutdown_tx = match mode {
        RunMode::Once => Some(shutdown_tx),
        RunMode::Repeat { .. } => {
            let mut signals = ShutdownSignals::new()?;
            tokio::spawn(async move {
                let name = signals.recv().await;
                info!("Received shutdown signal: {}", name);
                let _ = shutdown_tx.send(());
            });
            None
        }
    };

    runner.run_with_shutdown(shutdown_rx).await
}

/// SIGTERM and SIGINT listeners
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn new() -> ddns_core::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the first signal and return its name
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// CTRL-C listener
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn new() -> ddns_core::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "CTRL-C",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending().await
            }
        }
    }
}
