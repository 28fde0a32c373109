//! Versioned API server.
//!
//! ```text
//! accept-version serve [--config FILE] [--bind ADDR]
//!     Run the demo API behind the version dispatcher.
//!
//! accept-version check --config FILE
//!     Strictly validate a configuration file.
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use accept_version::config::loader::{check_config, load_config, ConfigError};
use accept_version::config::AppConfig;
use accept_version::http::handlers::demo_versions;
use accept_version::observability::{logging, metrics};
use accept_version::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "accept-version")]
#[command(about = "Header-negotiated API versioning server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo versioned API
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the bind address from the config
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Validate a configuration file and report every problem
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => AppConfig::default(),
            };
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { config } => Ok(check(config)),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&config.observability.log_level);
    tracing::info!("accept-version v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        strict = config.strict,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config, demo_versions()?);

    // Held for the server's lifetime; Ctrl+C is the only trigger here.
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn check(path: PathBuf) -> ExitCode {
    match check_config(&path) {
        Ok(_) => {
            println!("{}: ok", path.display());
            ExitCode::SUCCESS
        }
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                eprintln!("{}: {}", path.display(), error);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
