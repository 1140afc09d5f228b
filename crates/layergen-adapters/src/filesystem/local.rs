//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use layergen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{LayergenError, LayergenResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> LayergenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> LayergenResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> LayergenResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path) -> LayergenResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                LayergenError::from(ApplicationError::FilesystemError {
                    path,
                    reason: format!("Failed to walk directory: {e}"),
                })
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> LayergenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_overwrites() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = dir.path().join("a/b/c.txt");

        fs.create_dir_all(file.parent().unwrap()).unwrap();
        fs.write_file(&file, "first").unwrap();
        fs.write_file(&file, "second").unwrap();

        assert_eq!(fs.read_to_string(&file).unwrap(), "second");
        assert!(fs.exists(&file));
    }

    #[test]
    fn list_files_is_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        for rel in ["b.py", "a/z.py", "a/y.py"] {
            let path = dir.path().join(rel);
            fs.create_dir_all(path.parent().unwrap()).unwrap();
            fs.write_file(&path, "").unwrap();
        }

        let files: Vec<_> = fs
            .list_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("a/y.py"),
                PathBuf::from("a/z.py"),
                PathBuf::from("b.py")
            ]
        );
    }

    #[test]
    fn list_files_of_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = LocalFilesystem::new()
            .list_files(&dir.path().join("nope"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn read_missing_file_is_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read_to_string(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(
            err,
            LayergenError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
