// # dyndnsd - DynDNS Bridge Daemon
//
// Thin integration layer: reads configuration, initializes logging and the
// runtime, registers providers, builds the selected one and serves the
// DynDNS protocol until SIGTERM/SIGINT. No protocol or DNS logic lives here.
//
// ## Commands
//
// - `dyndnsd [server] [--port N]`: serve the DynDNS protocol (default)
// - `dyndnsd update <hostname> [--type A|AAAA]`: upsert one record with the
//   current public IP and exit
// - `dyndnsd version`: print the version
// - `dyndnsd --list-providers`: list compiled-in providers
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Server
// - `PORT`: Listen port (default 8053)
// - `BIND_ADDRESS`: Listen address (default 0.0.0.0)
// - `REQUEST_TIMEOUT_SECS`: Deadline for provider calls per request (default 30)
// - `SHUTDOWN_TIMEOUT_SECS`: Deadline for closing the provider (default 30)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ### Authentication
// - `AUTH_USERNAME`: Basic-auth user (required)
// - `AUTH_PASSWORD_HASH`: bcrypt hash of the basic-auth password (required)
//
// ### DNS Provider
// - `DNS_PROVIDER`: netcup_ccp or aws_route53 (default netcup_ccp)
// - `DNS_TTL`: TTL of upserted records (default 60)
// - `NETCUP_CUSTOMER_NUMBER`, `NETCUP_API_KEY`, `NETCUP_API_PASSWORD`:
//   netcup credentials (fallback: ~/.homeddns/netcup_credentials)
// - `NETCUP_ENDPOINT`: CCP endpoint override
// - `AWS_REGION` and the usual AWS credential chain for Route53
//
// ### One-shot update
// - `PUBLIC_IP_URL`: plain-text IP lookup service (default api.ipify.org,
//   api6.ipify.org for AAAA)
//
// ## Example
//
// ```bash
// export AUTH_USERNAME=router
// export AUTH_PASSWORD_HASH='$2b$10$...'
// export DNS_PROVIDER=netcup_ccp
// export NETCUP_CUSTOMER_NUMBER=12345
// export NETCUP_API_KEY=...
// export NETCUP_API_PASSWORD=...
//
// dyndnsd
// ```

mod cli;
mod config;
mod update;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use dyndns_core::{DnsProvider, ProviderRegistry, RecordType};
use dyndns_ip_http::PublicIpLookup;
use dyndns_server::{AppState, BasicAuth};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DyndnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_providers {
        return list_providers().into();
    }

    let command = cli.command.unwrap_or(Command::Server { port: None });
    if command == Command::Version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return DyndnsExitCode::CleanShutdown.into();
    }

    // Load configuration from environment
    let mut config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    if let Command::Server { port: Some(port) } = command {
        config.port = port;
    }

    // Validate configuration
    let validation = match command {
        Command::Server { .. } => config.validate().and_then(|_| config.validate_auth()),
        _ => config.validate(),
    };
    if let Err(e) = validation {
        eprintln!("Configuration validation error: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");
    tracing::debug!(?config, "Configuration loaded");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match command {
            Command::Server { .. } => serve_command(&config).await,
            Command::Update {
                hostname,
                record_type,
            } => update_command(&config, &hostname, record_type.into()).await,
            Command::Version => DyndnsExitCode::CleanShutdown,
        }
    });

    result.into()
}

/// Print the compiled-in providers
fn list_providers() -> DyndnsExitCode {
    match build_registry() {
        Ok(registry) => {
            println!("Available providers:");
            for name in registry.list_providers() {
                println!("- {name}");
            }
            DyndnsExitCode::CleanShutdown
        }
        Err(e) => {
            eprintln!("Failed to register providers: {:#}", e);
            DyndnsExitCode::ConfigError
        }
    }
}

/// Register the compiled-in providers
fn build_registry() -> Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "netcup")]
    dyndns_provider_netcup::register(&registry)?;

    #[cfg(feature = "route53")]
    dyndns_provider_route53::register(&registry)?;

    info!(providers = ?registry.list_providers(), "Registered DNS providers");
    Ok(registry)
}

/// Build the provider selected by `DNS_PROVIDER`
async fn create_provider(config: &Config) -> Result<Box<dyn DnsProvider>> {
    let registry = build_registry()?;

    let provider_config = config.provider_config()?;
    let provider = registry.create_provider(&provider_config).await?;
    info!(provider = provider.name(), "DNS provider ready");
    Ok(provider)
}

/// Build the selected provider and the shared server state
async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let provider = create_provider(config).await?;
    let auth = BasicAuth::new(&config.auth_username, &config.auth_password_hash)?;

    Ok(Arc::new(
        AppState::new(Arc::from(provider))
            .with_ttl(config.ttl)
            .with_request_timeout(config.request_timeout())
            .with_auth(auth),
    ))
}

/// Serve until a shutdown signal arrives
async fn serve_command(config: &Config) -> DyndnsExitCode {
    let state = match build_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DyndnsExitCode::ConfigError;
        }
    };

    if let Err(e) = run_daemon(config, state).await {
        error!("Daemon error: {:#}", e);
        DyndnsExitCode::RuntimeError
    } else {
        DyndnsExitCode::CleanShutdown
    }
}

/// Run the daemon
async fn run_daemon(config: &Config, state: Arc<AppState>) -> Result<()> {
    dyndns_server::run_http_server(
        state,
        &config.bind_address,
        config.port,
        config.shutdown_timeout(),
        wait_for_shutdown_signal(),
    )
    .await?;

    info!("dyndnsd stopped");
    Ok(())
}

/// Update one record with the current public IP, then close the provider
async fn update_command(config: &Config, hostname: &str, record_type: RecordType) -> DyndnsExitCode {
    let lookup = match &config.public_ip_url {
        Some(url) => PublicIpLookup::new(url.clone(), record_type),
        None => PublicIpLookup::for_record_type(record_type),
    };
    let lookup = match lookup {
        Ok(lookup) => lookup,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DyndnsExitCode::ConfigError;
        }
    };

    let provider = match create_provider(config).await {
        Ok(provider) => provider,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DyndnsExitCode::ConfigError;
        }
    };

    let result = update::update_once(provider.as_ref(), &lookup, hostname, config.ttl).await;

    if let Err(e) = provider.close().await {
        warn!(error = %e, "Failed to close DNS provider");
    }

    match result {
        Ok(_) => DyndnsExitCode::CleanShutdown,
        Err(e) => {
            error!("Update failed: {:#}", e);
            DyndnsExitCode::RuntimeError
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// If the handlers cannot be installed, falls back to CTRL-C.
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to setup signal handlers: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to wait for CTRL-C: {}", e);
                }
                return;
            }
        };

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", signal);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => error!("Failed to wait for CTRL-C: {}", e),
    }
}
