// crates/nft-sub-cli/src/main.rs
// ============================================================================
// Module: NFT-Sub CLI Entry Point
// Description: Command dispatcher for the merchant metadata service.
// Purpose: Load configuration, assemble the store, and run the HTTP server.
// Dependencies: clap, nft-sub-core, nft-sub-server, thiserror, tokio
// ============================================================================

//! ## Overview
//! The NFT-Sub CLI wires configuration into the server: it loads the TOML
//! config, selects the store backend once at startup, attaches the
//! stderr-backed audit sink, and serves the API until shutdown. All output
//! goes through explicit writer helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use nft_sub_core::SharedStoreEventSink;
use nft_sub_core::SystemClock;
use nft_sub_server::ConfigError;
use nft_sub_server::ServeError;
use nft_sub_server::ServerState;
use nft_sub_server::SharedApiAuditSink;
use nft_sub_server::StoreFallbackAudit;
use nft_sub_server::WriterAuditSink;
use nft_sub_server::build_store;
use nft_sub_server::load_config;
use nft_sub_server::serve;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "nft-sub", version, about = "NFT-Sub merchant metadata service")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI execution errors.
///
/// # Invariants
/// - Variants are stable for exit-path handling.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration loading or validation failed.
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// Server startup or runtime failure.
    #[error("{0}")]
    Serve(#[from] ServeError),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            config,
        } => run_serve(&config).await,
    }
}

/// Loads configuration and serves the API until shutdown.
async fn run_serve(config_path: &std::path::Path) -> Result<ExitCode, CliError> {
    let config = load_config(config_path)?;
    let bind_addr = config.bind_socket_addr()?;
    let audit: SharedApiAuditSink = Arc::new(WriterAuditSink::stderr());
    let events: SharedStoreEventSink = Arc::new(StoreFallbackAudit::new(Arc::clone(&audit)));
    let store = build_store(&config.store, SystemClock::shared(), events);
    let state = Arc::new(ServerState::new(store, audit, config.subscription_url_base()));
    serve(bind_addr, state).await?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
