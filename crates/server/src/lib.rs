//! # Document Control Server Library
//!
//! Read-only access to a directory tree of documents over HTTP.
//!
//! ## Overview
//!
//! The server exposes a single document root. Clients can:
//!
//! - fetch the full recursive folder tree
//! - list the immediate contents of one folder
//! - read file metadata, with inline content for text files
//! - download raw file bytes with a guessed content type
//!
//! Every client-supplied path goes through [`PathResolver`], which
//! canonicalizes it and refuses anything that leaves the root.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 HTTP router                   │
//! ├───────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────────────┐  │
//! │  │ TreeScanner  │   │   serve_raw_bytes    │  │
//! │  └──────┬───────┘   └──────────┬───────────┘  │
//! │         └──────────┬───────────┘              │
//! │             ┌──────┴───────┐                  │
//! │             │ PathResolver │                  │
//! │             └──────────────┘                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use server::{router, PathResolver, RootDirectory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = RootDirectory::new("Documents")?;
//!     let resolver = Arc::new(PathResolver::new(root));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     router::serve(listener, resolver, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`files`]: Path resolution, scanning and raw delivery
//! - [`logging`]: Tracing subscriber setup
//! - [`router`]: HTTP routes

pub mod config;
pub mod files;
pub mod logging;
pub mod router;

// Re-export protocol for convenience
pub use protocol;

pub use config::{Config, ConfigError, EnvOverride};

pub use files::{
    file_metadata, folder_listing, folder_tree, serve_raw_bytes, AccessError, PathResolver,
    RawFile, ResolvedPath, RootDirectory, TreeScanner,
};

pub use router::{build_router, RouterError, RouterResult};
