//! Wire types for the Document Control HTTP API.
//!
//! Every response body the server produces is one of the types in this
//! module, serialized as JSON. Field names and nesting are the stable API
//! contract; renaming one breaks existing clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type reported when the extension is unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Content substituted when a text file cannot be read at all.
pub const UNREADABLE_CONTENT: &str = "[Unable to read file content]";

/// One entry (file or folder) in a listing or a recursive tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Entry name (not full path).
    pub name: String,
    /// Path relative to the document root, `/`-separated.
    pub path: String,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// Folder- or file-specific attributes.
    #[serde(flatten)]
    pub detail: NodeDetail,
}

/// Attributes that depend on the entry type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeDetail {
    /// A folder.
    Folder {
        /// Nested entries; only present in the recursive tree.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Vec<TreeNode>>,
        /// Recursive file count in the tree, immediate entry count in a listing.
        count: u64,
    },
    /// A regular file.
    File {
        /// Size in bytes.
        size: u64,
        /// Lowercase extension with the leading dot, empty if none.
        extension: String,
        /// Last modified time in seconds since the epoch; listings only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modified: Option<f64>,
    },
}

impl TreeNode {
    /// Folder node as it appears in the recursive tree.
    pub fn tree_folder(name: String, path: String, children: Vec<TreeNode>, count: u64) -> Self {
        Self {
            name,
            path,
            is_folder: true,
            detail: NodeDetail::Folder {
                children: Some(children),
                count,
            },
        }
    }

    /// Folder node as it appears in a single-level listing.
    pub fn listed_folder(name: String, path: String, count: u64) -> Self {
        Self {
            name,
            path,
            is_folder: true,
            detail: NodeDetail::Folder {
                children: None,
                count,
            },
        }
    }

    /// File node. `modified` is only set for single-level listings.
    pub fn file(
        name: String,
        path: String,
        size: u64,
        extension: String,
        modified: Option<f64>,
    ) -> Self {
        Self {
            name,
            path,
            is_folder: false,
            detail: NodeDetail::File {
                size,
                extension,
                modified,
            },
        }
    }

    /// Folder count, if this is a folder.
    pub fn count(&self) -> Option<u64> {
        match &self.detail {
            NodeDetail::Folder { count, .. } => Some(*count),
            NodeDetail::File { .. } => None,
        }
    }

    /// Children, if this is a folder from the recursive tree.
    pub fn children(&self) -> Option<&[TreeNode]> {
        match &self.detail {
            NodeDetail::Folder {
                children: Some(children),
                ..
            } => Some(children),
            _ => None,
        }
    }

    /// File size, if this is a file.
    pub fn size(&self) -> Option<u64> {
        match &self.detail {
            NodeDetail::File { size, .. } => Some(*size),
            NodeDetail::Folder { .. } => None,
        }
    }
}

/// Response of `GET /api/folders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderTree {
    /// Display name of the document root.
    pub root: String,
    /// Top-level entries.
    pub items: Vec<TreeNode>,
}

/// Response of `GET /api/folder/<path>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    /// The requested relative path, echoed back.
    pub path: String,
    /// Entries one level deep.
    pub items: Vec<TreeNode>,
}

/// Preview classification of a file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    /// Decoded and shipped inline.
    Text,
    /// Previewed through a download URL.
    Image,
    /// Previewed through a download URL.
    Pdf,
    /// No preview.
    Other,
}

/// Response of `GET /api/file/<path>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File name.
    pub name: String,
    /// Path relative to the document root, as requested.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modified time in seconds since the epoch.
    pub modified: f64,
    /// Lowercase extension with the leading dot, empty if none.
    pub extension: String,
    /// Guessed MIME type.
    pub mime_type: String,
    /// Decoded text, only for text files.
    pub content: Option<String>,
    pub is_text: bool,
    pub is_image: bool,
    pub is_pdf: bool,
    /// Download URL for image previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Download URL for PDF previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl FileMetadata {
    /// Recover the classification from the boolean flags.
    pub fn class(&self) -> FileClass {
        if self.is_text {
            FileClass::Text
        } else if self.is_image {
            FileClass::Image
        } else if self.is_pdf {
            FileClass::Pdf
        } else {
            FileClass::Other
        }
    }
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The path resolves outside the document root.
    Containment,
    /// The path does not exist or has the wrong type.
    NotFound,
    /// Reading failed.
    Io,
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Error category.
    pub kind: ErrorKind,
}

/// Response of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Serialize any API value as pretty-printed JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parse any API value from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
