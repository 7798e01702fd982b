//! portaria - door access controller
//!
//! Runs the access controller against the authorization server, with the
//! door simulated on the console.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portaria_controller::AccessController;
use portaria_core::{Side, Sha256Digest, TagId};
use portaria_network::{AuthorizationClient, Authorizer, MockAuthorizer};
use portaria_protocol::{AuthorizationRequest, AuthorizationStatus};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;
mod console;

use config::PortariaConfig;

/// portaria - door access controller
#[derive(Parser, Debug)]
#[command(name = "portaria")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file [default: ./portaria.toml if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the controller with a console-driven door
    Simulate {
        /// Answer every request with this status code instead of
        /// contacting the server
        #[arg(long, allow_negative_numbers = true)]
        offline_status: Option<i64>,
    },

    /// Ask the server whether a tag may unlock the door
    Check {
        /// Tag UID as uppercase hex
        tag: TagId,

        /// Side of the door the tag is presented on (entering, leaving)
        #[arg(long, default_value = "entering")]
        side: Side,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PortariaConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Simulate { offline_status } => match offline_status {
            Some(code) => {
                let status = AuthorizationStatus::from_code(code);
                warn!(%status, "Offline mode, the server will not be contacted");
                let (authorizer, handle) = MockAuthorizer::new();
                handle.set_fallback(status);
                simulate(&config, authorizer).await
            }
            None => {
                let client = AuthorizationClient::new(config.server.client_config());
                simulate(&config, client).await
            }
        },
        Commands::Check { tag, side } => check(&config, tag, side).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn simulate<B: Authorizer>(config: &PortariaConfig, authorizer: B) -> Result<()> {
    let (devices, handles) = console::devices();
    let mut controller = AccessController::new(
        config.controller.clone(),
        authorizer,
        devices,
        Box::new(Sha256Digest),
    )?;

    info!(server = %config.server.address, "Type `help` for console commands");

    tokio::select! {
        () = controller.run() => Ok(()),
        result = console::drive(handles) => result.context("Console input failed"),
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
            Ok(())
        }
    }
}

async fn check(config: &PortariaConfig, tag_id: TagId, side: Side) -> Result<()> {
    let site_id = config.controller.site()?;
    let request = AuthorizationRequest::Unlock {
        tag_id,
        site_id,
        side,
    };

    let mut client = AuthorizationClient::new(config.server.client_config());
    let status = client
        .exchange(&request)
        .await
        .with_context(|| format!("No answer from {}", config.server.address))?;

    println!("{status}");
    Ok(())
}
