//! Path resolution against the document root.
//!
//! Every client-supplied path goes through [`PathResolver::resolve`] before
//! anything touches the filesystem. Containment is decided on canonical
//! paths, component by component, so `..` segments and symlinks cannot be
//! used to step outside the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::error::AccessError;

/// The single directory this server exposes, canonicalized once.
#[derive(Debug, Clone)]
pub struct RootDirectory {
    canonical: PathBuf,
}

impl RootDirectory {
    /// Canonicalize `path` and check that it is a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AccessError> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AccessError::NotFound(path.display().to_string())
            } else {
                AccessError::Io(e)
            }
        })?;

        if !canonical.is_dir() {
            return Err(AccessError::NotFound(path.display().to_string()));
        }

        Ok(Self { canonical })
    }

    /// Canonical absolute path of the root.
    pub fn path(&self) -> &Path {
        &self.canonical
    }

    /// Name shown to clients for the root folder.
    pub fn display_name(&self) -> String {
        self.canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "/".to_string())
    }
}

/// A path proven to lie inside the document root.
///
/// Only [`PathResolver::resolve`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Canonical absolute path.
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// The relative path this was resolved from, as the client sent it.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Entry name as the client addressed it.
    ///
    /// Taken from the relative path rather than the canonical one so a
    /// symlink keeps its own name and extension.
    pub fn name(&self) -> String {
        Path::new(&self.relative)
            .file_name()
            .or_else(|| self.absolute.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Join a child name onto a client relative path with `/`.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Resolves client paths against a fixed [`RootDirectory`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: RootDirectory,
}

impl PathResolver {
    /// Create a resolver for the given root.
    pub fn new(root: RootDirectory) -> Self {
        Self { root }
    }

    /// The root this resolver guards.
    pub fn root(&self) -> &RootDirectory {
        &self.root
    }

    /// Resolve `relative` to a path inside the root.
    ///
    /// The target does not have to exist; callers report missing targets
    /// themselves.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath, AccessError> {
        let joined = self.root.path().join(relative);
        let canonical = canonicalize_lenient(&joined)?;

        if !canonical.starts_with(self.root.path()) {
            warn!(path = %relative, resolved = %canonical.display(), "Rejected path outside document root");
            return Err(AccessError::Containment(relative.to_string()));
        }

        debug!(path = %relative, resolved = %canonical.display(), "Resolved path");
        Ok(ResolvedPath {
            absolute: canonical,
            relative: relative.to_string(),
        })
    }

    /// Canonical target of an entry found while scanning, if it stays inside
    /// the root. Broken symlinks and unreadable paths yield `None`.
    pub(crate) fn canonical_within(&self, path: &Path) -> Option<PathBuf> {
        fs::canonicalize(path)
            .ok()
            .filter(|canonical| canonical.starts_with(self.root.path()))
    }
}

/// Canonicalize a path that may not exist.
///
/// The deepest existing ancestor is canonicalized by the filesystem and the
/// remaining components are applied lexically. When that tail contained `.`
/// or `..`, the result is canonicalized again so a `..` cannot land on a
/// symlink that was never resolved.
fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Ok(canonical);
    }

    let components: Vec<Component<'_>> = path.components().collect();
    let mut last_err = None;

    for split in (1..components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let base = match fs::canonicalize(&prefix) {
            Ok(base) => base,
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        };

        let mut resolved = base;
        let mut lexical = false;
        for component in &components[split..] {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::CurDir => lexical = true,
                Component::ParentDir => {
                    resolved.pop();
                    lexical = true;
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }

        return if lexical {
            canonicalize_lenient(&resolved)
        } else {
            Ok(resolved)
        };
    }

    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no existing ancestor")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_structure(dir: &Path) {
        fs::create_dir_all(dir.join("docs/nested")).unwrap();
        fs::write(dir.join("readme.md"), "# Hello").unwrap();
        fs::write(dir.join("docs/nested/deep.txt"), "deep").unwrap();
    }

    fn resolver_for(dir: &TempDir) -> PathResolver {
        PathResolver::new(RootDirectory::new(dir.path()).unwrap())
    }

    #[test]
    fn test_empty_path_is_root() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);

        let resolved = resolver.resolve("").unwrap();
        assert_eq!(resolved.as_path(), resolver.root().path());
        assert_eq!(resolved.relative(), "");
    }

    #[test]
    fn test_resolve_nested_file() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());
        let resolver = resolver_for(&temp_dir);

        let resolved = resolver.resolve("docs/nested/deep.txt").unwrap();
        assert!(resolved.as_path().starts_with(resolver.root().path()));
        assert!(resolved.as_path().ends_with("docs/nested/deep.txt"));
        assert_eq!(resolved.name(), "deep.txt");
    }

    #[test]
    fn test_dot_segments_inside_root_allowed() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());
        let resolver = resolver_for(&temp_dir);

        let resolved = resolver.resolve("docs/./nested/../../readme.md").unwrap();
        assert_eq!(
            resolved.as_path(),
            resolver.root().path().join("readme.md")
        );
    }

    #[test]
    fn test_traversal_rejected() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());
        let resolver = resolver_for(&temp_dir);

        let result = resolver.resolve("../../etc/passwd");
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[test]
    fn test_traversal_to_missing_target_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);

        let result = resolver.resolve("../definitely-not-here/secret.txt");
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[test]
    fn test_traversal_through_missing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);

        let result = resolver.resolve("missing/../../outside.txt");
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[test]
    fn test_sibling_with_common_prefix_rejected() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("docs");
        let sibling = parent.path().join("docs-private");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&sibling).unwrap();
        fs::write(sibling.join("secret.txt"), "secret").unwrap();

        let resolver = PathResolver::new(RootDirectory::new(&root).unwrap());
        let result = resolver.resolve("../docs-private/secret.txt");
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[test]
    fn test_absolute_path_outside_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let other_dir = TempDir::new().unwrap();
        fs::write(other_dir.path().join("other.txt"), "Other").unwrap();
        let resolver = resolver_for(&temp_dir);

        let absolute = other_dir.path().join("other.txt");
        let result = resolver.resolve(&absolute.to_string_lossy());
        assert!(matches!(result, Err(AccessError::Containment(_))));
    }

    #[test]
    fn test_missing_path_inside_root_resolves() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_for(&temp_dir);

        let resolved = resolver.resolve("not/there.txt").unwrap();
        assert_eq!(
            resolved.as_path(),
            resolver.root().path().join("not/there.txt")
        );
    }

    #[test]
    fn test_root_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let result = RootDirectory::new(temp_dir.path().join("nope"));
        assert!(matches!(result, Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("file.txt"), "x").unwrap();
        let result = RootDirectory::new(temp_dir.path().join("file.txt"));
        assert!(matches!(result, Err(AccessError::NotFound(_))));
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("", "a"), "a");
        assert_eq!(join_relative("docs", "a"), "docs/a");
        assert_eq!(join_relative("docs/", "a"), "docs/a");
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn test_symlink_escape_rejected() {
            let temp_dir = TempDir::new().unwrap();
            let other_dir = TempDir::new().unwrap();
            fs::write(other_dir.path().join("secret.txt"), "Secret").unwrap();
            symlink(other_dir.path(), temp_dir.path().join("escape")).unwrap();
            let resolver = resolver_for(&temp_dir);

            let result = resolver.resolve("escape/secret.txt");
            assert!(matches!(result, Err(AccessError::Containment(_))));

            // Missing target behind the escaping link is still outside.
            let result = resolver.resolve("escape/missing.txt");
            assert!(matches!(result, Err(AccessError::Containment(_))));
        }

        #[test]
        fn test_dot_dot_onto_escaping_symlink_rejected() {
            let temp_dir = TempDir::new().unwrap();
            let other_dir = TempDir::new().unwrap();
            fs::write(other_dir.path().join("secret.txt"), "Secret").unwrap();
            symlink(other_dir.path(), temp_dir.path().join("escape")).unwrap();
            let resolver = resolver_for(&temp_dir);

            let result = resolver.resolve("missing/../escape/secret.txt");
            assert!(matches!(result, Err(AccessError::Containment(_))));
        }

        #[test]
        fn test_symlink_within_root_allowed() {
            let temp_dir = TempDir::new().unwrap();
            create_test_structure(temp_dir.path());
            symlink(
                temp_dir.path().join("docs/nested"),
                temp_dir.path().join("shortcut"),
            )
            .unwrap();
            let resolver = resolver_for(&temp_dir);

            let resolved = resolver.resolve("shortcut/deep.txt").unwrap();
            assert_eq!(
                resolved.as_path(),
                resolver.root().path().join("docs/nested/deep.txt")
            );
            assert!(resolver
                .canonical_within(&temp_dir.path().join("shortcut"))
                .is_some());
        }

        #[test]
        fn test_broken_symlink_not_contained() {
            let temp_dir = TempDir::new().unwrap();
            symlink(temp_dir.path().join("gone"), temp_dir.path().join("dangling")).unwrap();
            let resolver = resolver_for(&temp_dir);

            assert!(resolver
                .canonical_within(&temp_dir.path().join("dangling"))
                .is_none());
        }
    }
}
