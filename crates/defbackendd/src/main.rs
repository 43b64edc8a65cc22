// # defbackendd - Default Backend Daemon
//
// A THIN integration layer around defbackend-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging
// 3. Registering the default backend into a dispatch table
// 4. Replaying operation requests from stdin against that table
//
// No backend behavior lives here; all of it is in defbackend-core.
//
// ## Configuration
//
// - `DEFBACKEND_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DEFBACKEND_DEFAULT_REFERRALS`: Comma-separated ldap:// or ldaps:// URLs
// - `DEFBACKEND_REPEATABLE_PREFIXES`: Comma-separated RDN prefixes (default: dc=)
// - `DEFBACKEND_INJECT_SETUP_FAILURE`: Registration step to refuse, e.g.
//   `attach_backend` or `install_handler:bind`
//
// Logs go to stderr; stdout carries one JSON response per request.
//
// ## Example
//
// ```bash
// echo '{"kind":"bind","target_dn":"cn=X,dc=bogus,dc=com","credentials":"pw"}' \
//     | DEFBACKEND_LOG_LEVEL=debug defbackendd
// ```

mod fault;
mod replay;

use anyhow::Result;
use defbackend_core::delivery::MemoryResultSender;
use defbackend_core::dn::Rfc4514Exploder;
use defbackend_core::stats::AtomicBindCounters;
use defbackend_core::{DefaultBackend, DefaultBackendConfig, DispatchTable, RegistrationStep, Services};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or setup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or default backend setup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    log_level: String,
    default_referrals: Vec<String>,
    repeatable_prefixes: Option<Vec<String>>,
    inject_setup_failure: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: env::var("DEFBACKEND_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            default_referrals: env::var("DEFBACKEND_DEFAULT_REFERRALS")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            repeatable_prefixes: env::var("DEFBACKEND_REPEATABLE_PREFIXES")
                .ok()
                .map(|s| split_list(&s)),
            inject_setup_failure: env::var("DEFBACKEND_INJECT_SETUP_FAILURE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }

    /// Validate the daemon-level settings
    ///
    /// Referral and prefix contents are validated by the backend itself and
    /// fail registration at the create_backend step.
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DEFBACKEND_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if let Some(step) = &self.inject_setup_failure {
            step.trim().parse::<RegistrationStep>().map_err(|e| {
                anyhow::anyhow!(
                    "DEFBACKEND_INJECT_SETUP_FAILURE '{}' is not a registration step: {}",
                    step,
                    e
                )
            })?;
        }

        Ok(())
    }

    fn backend_config(&self) -> DefaultBackendConfig {
        let config = DefaultBackendConfig::new().with_default_referrals(self.default_referrals.clone());
        match &self.repeatable_prefixes {
            Some(prefixes) => config.with_repeatable_prefixes(prefixes.clone()),
            None => config,
        }
    }

    fn injected_step(&self) -> Option<RegistrationStep> {
        self.inject_setup_failure
            .as_deref()
            .and_then(|step| step.trim().parse().ok())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting defbackendd");

    // Register the default backend; a half-installed fallback must not serve
    let results = Arc::new(MemoryResultSender::new());
    let counters = Arc::new(AtomicBindCounters::new());
    let services = Services::new(results.clone(), counters.clone(), Arc::new(Rfc4514Exploder));

    let mut sink = fault::BootstrapSink::new(config.injected_step());
    let backend = match sink
        .create_backend()
        .and_then(|()| DefaultBackend::initialize(&config.backend_config(), services, &mut sink))
    {
        Ok(backend) => backend,
        Err(e) => {
            error!("Default backend setup failed, exiting: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };
    let table = sink.into_table();

    info!(
        "Backend '{}' ready (private: {}, remote data: {})",
        backend.descriptor().name,
        backend.descriptor().is_private,
        backend.descriptor().remote_data
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_replay(&table, &results).await {
            Ok(processed) => {
                info!(
                    "Processed {} request(s), {} anonymous bind(s)",
                    processed,
                    counters.anonymous_binds()
                );
                DaemonExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                DaemonExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Replay stdin requests until EOF or a shutdown signal
///
/// Returns the number of requests processed.
async fn run_replay(table: &DispatchTable, results: &MemoryResultSender) -> Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut line_no = 0;
    let mut processed = 0;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            signal = &mut shutdown => {
                info!("Received shutdown signal: {}", signal?);
                break;
            }
        };

        let Some(line) = line else {
            info!("End of input");
            break;
        };
        line_no += 1;

        if let Some(text) = replay::process_line(table, results, line_no, &line)? {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            processed += 1;
        }
    }

    Ok(processed)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
