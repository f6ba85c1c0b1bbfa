//! Directory scanning: recursive tree, single-level listing, file preview.
//!
//! All three modes start from a [`ResolvedPath`]. Entries reached while
//! enumerating are checked against the root again when they are symlinks,
//! so a link pointing outside the root is never reported.
//!
//! Failures on the requested target itself are returned as errors. Failures
//! on entries found underneath it are logged and the entry (or its contents)
//! is left out.

use std::cmp::Ordering;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use protocol::{document_url, FileClass, FileMetadata, TreeNode};
use tracing::{debug, warn};

use super::classify::{classify, extension_of, guess_mime, read_text};
use super::error::AccessError;
use super::resolver::{join_relative, PathResolver, ResolvedPath};

/// A readable directory entry.
#[derive(Debug)]
struct ScannedEntry {
    name: String,
    /// Real location: the entry itself, or its canonical target for symlinks.
    path: PathBuf,
    metadata: Metadata,
}

impl ScannedEntry {
    fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }
}

/// Listing order: folders before files, then case-insensitive by name.
///
/// Names that differ only in case fall back to a plain comparison so the
/// order is total.
pub fn listing_order(a_is_dir: bool, a_name: &str, b_is_dir: bool, b_name: &str) -> Ordering {
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
        .then_with(|| a_name.cmp(b_name))
}

/// Seconds since the epoch, negative for times before it.
pub fn epoch_secs(time: SystemTime) -> f64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Modification time as the filesystem reports it.
fn modified_secs(metadata: &Metadata) -> f64 {
    epoch_secs(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH))
}

/// File details returned by [`TreeScanner::read_file_info`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// File name as the client addressed it.
    pub name: String,
    /// Relative path as requested.
    pub relative: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modified time.
    pub modified: SystemTime,
    /// Lowercase extension with the leading dot, or empty.
    pub extension: String,
    /// Guessed MIME type.
    pub mime_type: String,
    /// Preview classification.
    pub class: FileClass,
    /// Decoded content, text files only.
    pub content: Option<String>,
    /// Relative path to fetch raw bytes from, images and PDFs only.
    pub reference: Option<String>,
}

impl FileInfo {
    /// Convert to the wire representation, turning the reference into a
    /// download URL.
    pub fn to_protocol(&self) -> FileMetadata {
        let modified = epoch_secs(self.modified);
        let url = self.reference.as_deref().map(document_url);

        FileMetadata {
            name: self.name.clone(),
            path: self.relative.clone(),
            size: self.size,
            modified,
            extension: self.extension.clone(),
            mime_type: self.mime_type.clone(),
            content: self.content.clone(),
            is_text: self.class == FileClass::Text,
            is_image: self.class == FileClass::Image,
            is_pdf: self.class == FileClass::Pdf,
            image_url: url.clone().filter(|_| self.class == FileClass::Image),
            pdf_url: url.filter(|_| self.class == FileClass::Pdf),
        }
    }
}

/// Scans directories under the document root.
pub struct TreeScanner<'a> {
    resolver: &'a PathResolver,
}

impl<'a> TreeScanner<'a> {
    /// Create a scanner bound to a resolver.
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }

    /// Recursively scan a directory.
    ///
    /// Returns the top-level entries. Every folder carries the number of
    /// files beneath it at any depth. A folder whose contents cannot be read
    /// is kept with no children and a count of zero.
    pub fn scan_tree(&self, dir: &ResolvedPath) -> Vec<TreeNode> {
        let mut ancestors = Vec::new();
        let (nodes, count) = self.scan_dir(dir.as_path(), dir.relative(), &mut ancestors);
        debug!(path = %dir.relative(), files = count, "Scanned tree");
        nodes
    }

    fn scan_dir(
        &self,
        dir: &Path,
        relative: &str,
        ancestors: &mut Vec<PathBuf>,
    ) -> (Vec<TreeNode>, u64) {
        let entries = match self.read_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                return (Vec::new(), 0);
            }
        };

        ancestors.push(dir.to_path_buf());
        let mut nodes = Vec::with_capacity(entries.len());
        let mut total = 0;

        for entry in entries {
            let path = join_relative(relative, &entry.name);
            if entry.is_dir() {
                let (children, count) = if ancestors.contains(&entry.path) {
                    debug!(path = %path, "Not descending into directory cycle");
                    (Vec::new(), 0)
                } else {
                    self.scan_dir(&entry.path, &path, ancestors)
                };
                total += count;
                nodes.push(TreeNode::tree_folder(entry.name, path, children, count));
            } else {
                total += 1;
                let extension = extension_of(&entry.name);
                nodes.push(TreeNode::file(
                    entry.name,
                    path,
                    entry.metadata.len(),
                    extension,
                    None,
                ));
            }
        }

        ancestors.pop();
        (nodes, total)
    }

    /// List a single directory level.
    ///
    /// Folders report how many entries they directly contain. Entries that
    /// cannot be read are left out.
    pub fn list_folder(&self, folder: &ResolvedPath) -> Result<Vec<TreeNode>, AccessError> {
        let metadata = fs::metadata(folder.as_path())
            .map_err(|_| AccessError::NotFound(folder.relative().to_string()))?;
        if !metadata.is_dir() {
            return Err(AccessError::NotFound(folder.relative().to_string()));
        }

        let entries = match self.read_entries(folder.as_path()) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %folder.relative(), error = %e, "Folder contents unreadable");
                return Ok(Vec::new());
            }
        };

        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = join_relative(folder.relative(), &entry.name);
            if entry.is_dir() {
                match fs::read_dir(&entry.path) {
                    Ok(children) => {
                        let count = children.count() as u64;
                        nodes.push(TreeNode::listed_folder(entry.name, path, count));
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "Skipping unreadable folder");
                    }
                }
            } else {
                let extension = extension_of(&entry.name);
                let modified = modified_secs(&entry.metadata);
                nodes.push(TreeNode::file(
                    entry.name,
                    path,
                    entry.metadata.len(),
                    extension,
                    Some(modified),
                ));
            }
        }

        Ok(nodes)
    }

    /// Metadata and preview for a single file.
    ///
    /// Text files are decoded inline; images and PDFs get a reference for
    /// the raw-bytes route and no bytes are read here.
    pub fn read_file_info(&self, file: &ResolvedPath) -> Result<FileInfo, AccessError> {
        let metadata = fs::metadata(file.as_path())
            .map_err(|_| AccessError::NotFound(file.relative().to_string()))?;
        if !metadata.is_file() {
            return Err(AccessError::NotFound(file.relative().to_string()));
        }

        let name = file.name();
        let extension = extension_of(&name);
        let class = classify(&extension);

        let (content, reference) = match class {
            FileClass::Text => (Some(read_text(file.as_path())), None),
            FileClass::Image | FileClass::Pdf => (None, Some(file.relative().to_string())),
            FileClass::Other => (None, None),
        };

        Ok(FileInfo {
            mime_type: guess_mime(&name),
            name,
            relative: file.relative().to_string(),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            extension,
            class,
            content,
            reference,
        })
    }

    /// Read and sort the readable folders and regular files in `dir`.
    ///
    /// Symlinks are followed only when their target stays inside the root.
    /// Entries that are neither folders nor regular files are skipped.
    fn read_entries(&self, dir: &Path) -> io::Result<Vec<ScannedEntry>> {
        let mut entries = Vec::new();

        for entry_result in fs::read_dir(dir)? {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();

            let is_symlink = entry
                .file_type()
                .map(|t| t.is_symlink())
                .unwrap_or(false);
            let path = if is_symlink {
                match self.resolver.canonical_within(&entry.path()) {
                    Some(target) => target,
                    None => {
                        debug!(name = %name, "Skipping symlink outside document root");
                        continue;
                    }
                }
            } else {
                entry.path()
            };

            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    debug!(name = %name, error = %e, "Skipping entry without metadata");
                    continue;
                }
            };
            if !metadata.is_dir() && !metadata.is_file() {
                continue;
            }

            entries.push(ScannedEntry {
                name,
                path,
                metadata,
            });
        }

        entries.sort_by(|a, b| listing_order(a.is_dir(), &a.name, b.is_dir(), &b.name));
        Ok(entries)
    }
}
