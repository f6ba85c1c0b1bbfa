//! Document Control server
//!
//! Read-only document browser over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use server::config::Config;
use server::files::{self, PathResolver, RootDirectory};
use server::{logging, router};

/// Document Control - read-only document browser over HTTP.
#[derive(Parser, Debug)]
#[command(name = "doccontrol")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Document root directory
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the full folder tree as JSON
    Tree,

    /// Print one folder level as JSON
    Ls {
        /// Folder relative to the root (defaults to the root)
        #[arg(default_value = "")]
        path: String,
    },

    /// Print file metadata as JSON
    Info {
        /// File relative to the root
        path: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::load(config_path)?,
        None => Config::load_default()?,
    };
    let env_overrides = config.apply_env_overrides();
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let _log_guard = logging::init(&config.logging, cli.verbose)?;
    for env_override in &env_overrides {
        env_override.log();
    }

    if let Some(config_path) = &cli.config {
        tracing::debug!("Using config file: {:?}", config_path);
    }

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Serve { .. } => run_server(&config).await,
        Commands::Tree => {
            let resolver = open_root(&config)?;
            let tree = files::folder_tree(&resolver);
            println!("{}", protocol::to_json_pretty(&tree)?);
            Ok(())
        }
        Commands::Ls { path } => {
            let resolver = open_root(&config)?;
            let listing = files::folder_listing(&resolver, &path)
                .with_context(|| format!("Failed to list folder {:?}", path))?;
            println!("{}", protocol::to_json_pretty(&listing)?);
            Ok(())
        }
        Commands::Info { path } => {
            let resolver = open_root(&config)?;
            let metadata = files::file_metadata(&resolver, &path)
                .with_context(|| format!("Failed to read file {:?}", path))?;
            println!("{}", protocol::to_json_pretty(&metadata)?);
            Ok(())
        }
    }
}

/// Apply command-line overrides on top of file and environment settings.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(root) = &cli.root {
        config.server.root = root.clone();
    }

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }
}

/// Open the configured document root.
fn open_root(config: &Config) -> anyhow::Result<PathResolver> {
    let root = RootDirectory::new(&config.server.root).with_context(|| {
        format!(
            "Failed to open document root: {}",
            config.server.root.display()
        )
    })?;
    Ok(PathResolver::new(root))
}

/// Bind the listener and serve until a shutdown signal arrives.
async fn run_server(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Document Control server starting...");

    let resolver = Arc::new(open_root(config)?);
    let addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    router::serve(listener, resolver, wait_for_shutdown_signal()).await
}

/// Wait for SIGTERM or SIGINT.
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", e);
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = wait_for_ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
