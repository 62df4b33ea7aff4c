//! Editor owns one document and applies string-addressed edits to it.

use super::ops;
use crate::error::Result;
use crate::fieldpath::Path;
use crate::value::{self, Value};
use std::fs;
use std::path::Path as FsPath;

/// Editor wraps a possibly absent document.
///
/// String keys are parsed on every call, so a malformed key is reported as
/// [`Error::InvalidPath`](crate::Error::InvalidPath) before the document is
/// touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    root: Option<Value>,
}

impl Editor {
    /// Creates an editor over an existing document.
    pub fn new(root: Value) -> Self {
        Editor { root: Some(root) }
    }

    /// Creates an editor with no document yet.
    pub fn empty() -> Self {
        Editor { root: None }
    }

    /// Loads a YAML or JSON manifest from disk.
    pub fn load(file: impl AsRef<FsPath>) -> Result<Self> {
        let contents = fs::read_to_string(file.as_ref())?;
        if contents.trim().is_empty() {
            return Ok(Editor::empty());
        }
        Ok(Editor::new(value::from_yaml(&contents)?))
    }

    /// Writes the document to disk as YAML. An absent document writes an
    /// empty file.
    pub fn write(&self, file: impl AsRef<FsPath>) -> Result<()> {
        fs::write(file.as_ref(), self.to_yaml()?)?;
        Ok(())
    }

    /// Renders the document as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        match &self.root {
            Some(root) => Ok(value::to_yaml(root)?),
            None => Ok(String::new()),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_some()
    }

    /// Returns the node at `key`, or `None` when it cannot be reached.
    pub fn get(&self, key: &str) -> Result<Option<&Value>> {
        let path = Path::parse(key)?;
        Ok(self.get_path(&path))
    }

    pub fn get_path(&self, path: &Path) -> Option<&Value> {
        self.root.as_ref().and_then(|root| ops::get(root, path))
    }

    /// Writes `value` at `key`. Returns whether the document changed.
    pub fn put(&mut self, key: &str, value: Value) -> Result<bool> {
        let path = Path::parse(key)?;
        Ok(self.put_path(&path, value))
    }

    pub fn put_path(&mut self, path: &Path, value: Value) -> bool {
        match self.root.as_mut() {
            Some(root) => ops::put(root, path, value),
            None => false,
        }
    }

    /// Removes the node at `key`. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let path = Path::parse(key)?;
        Ok(self.delete_path(&path))
    }

    pub fn delete_path(&mut self, path: &Path) -> bool {
        match self.root.as_mut() {
            Some(root) => ops::delete(root, path),
            None => false,
        }
    }

    /// Starts a brand new document `{key: value}` when none exists yet.
    pub fn create(&mut self, key: &str, value: Value) -> bool {
        ops::create_if_absent(&mut self.root, key, value)
    }
}
