//! # Document Control Protocol
//!
//! Wire types for the Document Control HTTP API, shared by the server and by
//! anything that talks to it.
//!
//! ## Overview
//!
//! - **Tree and listing types**: [`TreeNode`], [`FolderTree`], [`FolderListing`]
//! - **File preview metadata**: [`FileMetadata`] and its [`FileClass`]
//! - **Errors**: [`ErrorResponse`] bodies tagged with an [`ErrorKind`]
//! - **Download URLs**: [`document_url`] for the raw-bytes route
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{document_url, FolderListing, TreeNode};
//!
//! let listing = FolderListing {
//!     path: String::new(),
//!     items: vec![TreeNode::listed_folder("a".into(), "a".into(), 0)],
//! };
//! let json = protocol::to_json_pretty(&listing).unwrap();
//! assert!(json.contains("\"is_folder\": true"));
//!
//! assert_eq!(document_url("my file.pdf"), "/documents/my%20file.pdf");
//! ```
//!
//! ## Modules
//!
//! - [`messages`]: Response bodies
//! - [`url`]: Download URL encoding
//! - [`error`]: Error types

pub mod error;
pub mod messages;
pub mod url;

pub use error::{ProtocolError, Result};
pub use messages::{
    from_json, to_json_pretty, ErrorKind, ErrorResponse, FileClass, FileMetadata, FolderListing,
    FolderTree, Health, NodeDetail, TreeNode, DEFAULT_MIME_TYPE, UNREADABLE_CONTENT,
};
pub use url::{document_url, parse_document_url, DOCUMENTS_PREFIX};
