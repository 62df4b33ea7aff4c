//! Temporary files handed to the cluster tools.

use crate::error::Result;
use crate::value::{self, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// ScopedFile is a temporary file removed when dropped, on every exit path
/// of the operation that created it.
#[derive(Debug)]
pub struct ScopedFile {
    file: NamedTempFile,
}

impl ScopedFile {
    /// Writes `contents` to a fresh temporary file named after `prefix`.
    pub fn with_contents(prefix: &str, suffix: &str, contents: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", prefix))
            .suffix(suffix)
            .tempfile()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(ScopedFile { file })
    }

    /// Serializes a manifest as YAML into a temporary file.
    pub fn manifest(name: &str, doc: &Value) -> Result<Self> {
        let yaml = value::to_yaml(doc)?;
        ScopedFile::with_contents(name, ".yaml", &yaml)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the path as a command-line argument.
    pub fn arg(&self) -> String {
        self.path().display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_manifest_is_removed_on_drop() {
        let doc = from_json(r#"{"kind":"Route","metadata":{"name":"r1"}}"#).unwrap();
        let path = {
            let file = ScopedFile::manifest("r1", &doc).unwrap();
            let written = std::fs::read_to_string(file.path()).unwrap();
            assert_eq!(value::from_yaml(&written).unwrap(), doc);
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_file_name_carries_prefix() {
        let file = ScopedFile::with_contents("router", ".pem", "cert").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("router-"));
        assert!(name.ends_with(".pem"));
    }
}
