//! Comparison result types.

use crate::fieldpath::Path;
use crate::value::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Keys skipped at every level of every comparison. The server owns them.
pub const ALWAYS_SKIPPED: [&str; 2] = ["metadata", "status"];

/// SkipKeys is the set of key names excluded from a comparison, on top of
/// [`ALWAYS_SKIPPED`]. It applies at every nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipKeys {
    keys: BTreeSet<String>,
}

impl SkipKeys {
    /// Creates a skip set holding only the always-skipped keys.
    pub fn new() -> Self {
        SkipKeys::default()
    }

    /// Returns true if `key` must be ignored.
    pub fn contains(&self, key: &str) -> bool {
        ALWAYS_SKIPPED.contains(&key) || self.keys.contains(key)
    }

    /// Adds a key to the set.
    pub fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Returns the caller-supplied keys.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipKeys {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        SkipKeys {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reason describes why a location failed the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The expected document has no value where the actual one does.
    Missing,
    /// Both sides have a value but of incompatible kinds.
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Nested mappings whose key sets differ.
    KeysDiffer {
        only_expected: Vec<String>,
        only_actual: Vec<String>,
    },
    /// Both sides have a value and they are not equal.
    ValueDiffers { expected: Value, actual: Value },
}

/// Mismatch is the first location at which the actual document is not
/// accounted for by the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: Path,
    pub reason: Reason,
}

impl Mismatch {
    pub fn new(path: Path, reason: Reason) -> Self {
        Mismatch { path, reason }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Missing => write!(f, "missing from expected definition"),
            Reason::KindMismatch { expected, actual } => {
                write!(f, "expected a {}, server has a {}", expected, actual)
            }
            Reason::KeysDiffer {
                only_expected,
                only_actual,
            } => {
                write!(f, "keys differ")?;
                if !only_expected.is_empty() {
                    write!(f, "; only expected: {}", only_expected.join(", "))?;
                }
                if !only_actual.is_empty() {
                    write!(f, "; only on server: {}", only_actual.join(", "))?;
                }
                Ok(())
            }
            Reason::ValueDiffers { expected, actual } => {
                write!(f, "expected {:?}, server has {:?}", expected, actual)
            }
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_keys_always_skip_server_fields() {
        let skip = SkipKeys::new();
        assert!(skip.contains("metadata"));
        assert!(skip.contains("status"));
        assert!(!skip.contains("spec"));
    }

    #[test]
    fn test_skip_keys_from_iter() {
        let skip: SkipKeys = ["clusterIP", "type"].into_iter().collect();
        assert!(skip.contains("clusterIP"));
        assert!(skip.contains("metadata"));
        assert_eq!(skip.iter().count(), 2);
    }

    #[test]
    fn test_mismatch_display() {
        let m = Mismatch::new(
            Path::parse("spec.host").unwrap(),
            Reason::ValueDiffers {
                expected: Value::from("a.com"),
                actual: Value::from("b.com"),
            },
        );
        let display = m.to_string();
        assert!(display.starts_with(".spec.host:"));
        assert!(display.contains("b.com"));
    }
}
