//! Server command - run the matchmaking server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to hexlink-net crate)
//! - Level 4: configuration loading

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexlink_net::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port number to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// JSON file with server settings; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Build configuration from file and flags
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!("Starting HEXLINK server on {}", config.addr());

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    // The registry lives on one thread, so a current-thread runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_server(config))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_server_defaults() {
        let args = ServerArgs {
            host: None,
            port: None,
            config: None,
        };

        let config = configure_server(&args).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = ServerArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(7000),
            config: None,
        };

        let config = configure_server(&args).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:7000");
    }

    #[test]
    fn test_missing_config_file() {
        let args = ServerArgs {
            host: None,
            port: None,
            config: Some(PathBuf::from("/nonexistent/hexlink.json")),
        };

        assert!(configure_server(&args).is_err());
    }
}
