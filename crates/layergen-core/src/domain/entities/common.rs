use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::domain::DomainError;

/// A path that stays inside whatever root it is joined onto.
///
/// Absolute paths, drive prefixes and `..` components are rejected at
/// construction. `.` components are dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Fallible constructor.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        let unsafe_path = || DomainError::UnsafeManifestPath {
            path: raw.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "path" });
        }
        // Leading separators are absolute on every platform we write to.
        if raw.starts_with('/') || raw.starts_with('\\') {
            return Err(unsafe_path());
        }

        let mut normalized = PathBuf::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(unsafe_path());
                }
            }
        }
        if raw.split(['/', '\\']).any(|part| part == "..") {
            return Err(unsafe_path());
        }
        if normalized.as_os_str().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "path" });
        }

        Ok(Self(normalized))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    /// Resolve against a root directory.
    pub fn under(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.0)
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        let path = RelativePath::try_new("src/domain/order.py").unwrap();
        assert_eq!(path.as_path(), Path::new("src/domain/order.py"));
    }

    #[test]
    fn drops_current_dir_components() {
        let path = RelativePath::try_new("./src/./lib.rs").unwrap();
        assert_eq!(path.as_path(), Path::new("src/lib.rs"));
    }

    #[test]
    fn rejects_absolute_paths() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::UnsafeManifestPath { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("\\windows\\system32"),
            Err(DomainError::UnsafeManifestPath { .. })
        ));
    }

    #[test]
    fn rejects_parent_components() {
        assert!(matches!(
            RelativePath::try_new("../outside.py"),
            Err(DomainError::UnsafeManifestPath { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("src/../../outside.py"),
            Err(DomainError::UnsafeManifestPath { .. })
        ));
    }

    #[test]
    fn rejects_empty_paths() {
        assert!(RelativePath::try_new("").is_err());
        assert!(RelativePath::try_new("   ").is_err());
        assert!(RelativePath::try_new(".").is_err());
    }

    #[test]
    fn under_joins_onto_root() {
        let path = RelativePath::try_new("a/b.txt").unwrap();
        assert_eq!(path.under("/tmp/project"), PathBuf::from("/tmp/project/a/b.txt"));
    }
}
