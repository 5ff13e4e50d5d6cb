//! EV Charge Platform: CLI server
//!
//! Runs the booking and discovery API as a standalone process, a systemd
//! unit or a container entrypoint.
//!
//! ```sh
//! # Run with default config (~/.config/evcharge/config.toml)
//! evcharge-service
//!
//! # Custom config path
//! evcharge-service --config /etc/evcharge/config.toml
//!
//! # Override the listen port
//! evcharge-service --api-port 9090
//!
//! # Validate config without starting
//! evcharge-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use evcharge::config::{AppConfig, CONFIG_ENV};
use evcharge::server::{init_tracing, ServerHandle, ServerOptions};

/// EV charging station discovery and booking API.
#[derive(Parser, Debug)]
#[command(
    name = "evcharge-service",
    version,
    about = "EV charging station discovery and booking API",
    long_about = "REST API for finding EV charging stations, quoting and booking \
                  charging slots, reviews and last-known locations.\n\n\
                  Default config: ~/.config/evcharge/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(evcharge::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) if cli.check => {
            eprintln!("Configuration is invalid: {}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ───────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // ── Config validation mode ────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("Configuration is invalid: {}", e);
            return ExitCode::FAILURE;
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        println!("   Database    : {}", config.database.url);
        match &config.database.catalog_path {
            Some(path) => println!("   Catalog     : {}", path.display()),
            None => println!("   Catalog     : (none)"),
        }
        println!(
            "   Places key  : {}",
            if config.places.api_key.is_empty() { "unset" } else { "set" }
        );
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ──────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    ExitCode::SUCCESS
}
