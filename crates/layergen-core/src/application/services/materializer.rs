//! Writes a model's file manifest to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::ports::Filesystem,
    domain::{DomainValidator as validator, FileManifest},
    error::LayergenResult,
};

pub struct Materializer {
    filesystem: Arc<dyn Filesystem>,
}

impl Materializer {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Parse `response_text` and write every file under `output_root`.
    pub fn materialize(&self, response_text: &str, output_root: &Path) -> LayergenResult<Vec<PathBuf>> {
        let manifest = FileManifest::parse(response_text)?;
        self.write_manifest(&manifest, output_root)
    }

    /// Write files in manifest order, overwriting existing content.
    ///
    /// A failure midway leaves earlier files in place.
    #[instrument(skip_all, fields(files = manifest.len(), root = %output_root.display()))]
    pub fn write_manifest(&self, manifest: &FileManifest, output_root: &Path) -> LayergenResult<Vec<PathBuf>> {
        validator::validate_manifest(manifest)?;

        let mut written = Vec::with_capacity(manifest.len());
        for entry in manifest.entries() {
            let target = entry.path.under(output_root);
            if let Some(parent) = target.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&target, &entry.content)?;
            debug!(path = %entry.path, bytes = entry.content.len(), "Wrote file");
            written.push(target);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::services::test_support::FakeFs;
    use crate::domain::DomainError;
    use crate::error::LayergenError;

    const RESPONSE: &str = r#"Here it is:
```json
{"files":[
  {"path":"src/domain/order.py","content":"class Order:\n    pass\n"},
  {"path":"src/domain/__init__.py"}
]}
```"#;

    #[test]
    fn writes_files_under_root_in_order() {
        let fs = FakeFs::default();
        let materializer = Materializer::new(Arc::new(fs.clone()));

        let written = materializer.materialize(RESPONSE, Path::new("/proj")).unwrap();

        assert_eq!(
            written,
            vec![
                PathBuf::from("/proj/src/domain/order.py"),
                PathBuf::from("/proj/src/domain/__init__.py"),
            ]
        );
        assert_eq!(
            fs.read("/proj/src/domain/order.py").as_deref(),
            Some("class Order:\n    pass\n")
        );
        assert_eq!(fs.read("/proj/src/domain/__init__.py").as_deref(), Some(""));
    }

    #[test]
    fn materializing_twice_is_idempotent() {
        let fs = FakeFs::default();
        let materializer = Materializer::new(Arc::new(fs.clone()));

        let first = materializer.materialize(RESPONSE, Path::new("/proj")).unwrap();
        let snapshot = fs.snapshot();
        let second = materializer.materialize(RESPONSE, Path::new("/proj")).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs.snapshot(), snapshot);
    }

    #[test]
    fn existing_files_are_overwritten() {
        let fs = FakeFs::default().with_file("/proj/src/domain/order.py", "old");
        let materializer = Materializer::new(Arc::new(fs.clone()));

        materializer.materialize(RESPONSE, Path::new("/proj")).unwrap();
        assert_eq!(
            fs.read("/proj/src/domain/order.py").as_deref(),
            Some("class Order:\n    pass\n")
        );
    }

    #[test]
    fn parse_failure_writes_nothing() {
        let fs = FakeFs::default();
        let materializer = Materializer::new(Arc::new(fs.clone()));

        let err = materializer.materialize("no json here", Path::new("/proj")).unwrap_err();
        assert!(matches!(
            err,
            LayergenError::Domain(DomainError::ManifestParse { .. })
        ));
        assert_eq!(*fs.writes.lock().unwrap(), 0);
    }

    #[test]
    fn unsafe_path_late_in_manifest_writes_nothing() {
        let fs = FakeFs::default();
        let materializer = Materializer::new(Arc::new(fs.clone()));

        let response = r#"{"files":[{"path":"a.py","content":"x"},{"path":"../../etc/cron","content":"y"}]}"#;
        let err = materializer.materialize(response, Path::new("/proj")).unwrap_err();

        assert!(matches!(
            err,
            LayergenError::Domain(DomainError::UnsafeManifestPath { .. })
        ));
        assert_eq!(*fs.writes.lock().unwrap(), 0);
    }

    #[test]
    fn partial_failure_keeps_earlier_files() {
        let fs = FakeFs {
            fail_on: Some(PathBuf::from("/proj/src/domain/__init__.py")),
            ..FakeFs::default()
        };
        let materializer = Materializer::new(Arc::new(fs.clone()));

        let err = materializer.materialize(RESPONSE, Path::new("/proj")).unwrap_err();

        assert!(matches!(
            err,
            LayergenError::Application(ApplicationError::FilesystemError { .. })
        ));
        assert!(fs.read("/proj/src/domain/order.py").is_some());
    }
}
