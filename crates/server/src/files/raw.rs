//! Raw document delivery.
//!
//! The path is resolved here, immediately before reading, even when the
//! caller resolved the same string earlier.

use std::fs;

use bytes::Bytes;
use tracing::debug;

use super::classify::guess_mime;
use super::error::AccessError;
use super::resolver::PathResolver;

/// File contents ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct RawFile {
    /// The whole file.
    pub bytes: Bytes,
    /// Guessed MIME type.
    pub mime_type: String,
}

/// Read a document's bytes.
pub fn serve_raw_bytes(resolver: &PathResolver, relative: &str) -> Result<RawFile, AccessError> {
    let resolved = resolver.resolve(relative)?;

    let metadata = fs::metadata(resolved.as_path())
        .map_err(|_| AccessError::NotFound(relative.to_string()))?;
    if !metadata.is_file() {
        return Err(AccessError::NotFound(relative.to_string()));
    }

    let bytes = fs::read(resolved.as_path())?;
    debug!(path = %relative, size = bytes.len(), "Serving raw document");

    Ok(RawFile {
        bytes: Bytes::from(bytes),
        mime_type: guess_mime(&resolved.name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::resolver::RootDirectory;
    use tempfile::TempDir;

    fn resolver_for(dir: &TempDir) -> PathResolver {
        PathResolver::new(RootDirectory::new(dir.path()).unwrap())
    }

    #[test]
    fn test_serve_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("pics")).unwrap();
        fs::write(temp_dir.path().join("pics/logo.png"), [1u8, 2, 3]).unwrap();
        let resolver = resolver_for(&temp_dir);

        let raw = serve_raw_bytes(&resolver, "pics/logo.png").unwrap();
        assert_eq!(&raw.bytes[..], &[1, 2, 3]);
        assert_eq!(raw.mime_type, "image/png");
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blob"), b"xyz").unwrap();
        let resolver = resolver_for(&temp_dir);

        let raw = serve_raw_bytes(&resolver, "blob").unwrap();
        assert_eq!(raw.mime_type, protocol::DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_missing_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);

        let result = serve_raw_bytes(&resolver, "missing.pdf");
        assert!(matches!(result, Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_directory_not_found() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("folder")).unwrap();
        let resolver = resolver_for(&temp_dir);

        let result = serve_raw_bytes(&resolver, "folder");
        assert!(matches!(result, Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_traversal_denied_even_when_target_exists() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(parent.path().join("outside.txt"), "secret").unwrap();
        let resolver = PathResolver::new(RootDirectory::new(&root).unwrap());

        let result = serve_raw_bytes(&resolver, "../outside.txt");
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.pdf");
        fs::write(&path, b"%PDF").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop a privileged user.
        if fs::read(&path).is_ok() {
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }

        let resolver = resolver_for(&temp_dir);
        let result = serve_raw_bytes(&resolver, "locked.pdf");
        assert!(matches!(result, Err(AccessError::Io(_))));
        assert_eq!(result.unwrap_err().kind(), protocol::ErrorKind::Io);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
