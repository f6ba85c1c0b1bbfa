//! Document access: path resolution, scanning and raw delivery.
//!
//! This module provides the read-only operations the HTTP API exposes:
//! - Full recursive tree of the document root
//! - Single-level folder listing
//! - File metadata with inline text preview
//! - Raw file bytes
//!
//! # Security
//!
//! Every client path is resolved by [`PathResolver`] before use. Resolution
//! canonicalizes the path and rejects anything that does not stay inside the
//! document root, including targets reached through `..` or symlinks.

pub mod classify;
pub mod error;
pub mod raw;
pub mod resolver;
pub mod scanner;

pub use classify::{classify, extension_of, guess_mime};
pub use error::AccessError;
pub use raw::{serve_raw_bytes, RawFile};
pub use resolver::{PathResolver, ResolvedPath, RootDirectory};
pub use scanner::{FileInfo, TreeScanner};

use protocol::{FileMetadata, FolderListing, FolderTree};
use tracing::warn;

/// Full tree from the root. Never fails; unreadable parts are left out.
pub fn folder_tree(resolver: &PathResolver) -> FolderTree {
    let items = match resolver.resolve("") {
        Ok(root) => TreeScanner::new(resolver).scan_tree(&root),
        Err(e) => {
            warn!(error = %e, "Document root could not be resolved");
            Vec::new()
        }
    };

    FolderTree {
        root: resolver.root().display_name(),
        items,
    }
}

/// One level of the folder at `relative`.
pub fn folder_listing(resolver: &PathResolver, relative: &str) -> Result<FolderListing, AccessError> {
    let folder = resolver.resolve(relative)?;
    let items = TreeScanner::new(resolver).list_folder(&folder)?;

    Ok(FolderListing {
        path: relative.to_string(),
        items,
    })
}

/// Metadata and preview of the file at `relative`.
pub fn file_metadata(resolver: &PathResolver, relative: &str) -> Result<FileMetadata, AccessError> {
    let file = resolver.resolve(relative)?;
    let info = TreeScanner::new(resolver).read_file_info(&file)?;
    Ok(info.to_protocol())
}
