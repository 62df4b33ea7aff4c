//! Path steps and path parsing.

use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// InvalidPathError is returned when a path string does not match the path
/// grammar. It is raised before any document is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path {path:?}: {reason} at offset {offset}")]
pub struct InvalidPathError {
    pub path: String,
    pub offset: usize,
    pub reason: String,
}

impl InvalidPathError {
    fn new(path: &str, offset: usize, reason: impl Into<String>) -> Self {
        InvalidPathError {
            path: path.to_string(),
            offset,
            reason: reason.into(),
        }
    }
}

/// Step represents one level of navigation into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Key of a mapping node.
    MapKey(String),
    /// Position in a sequence node. Negative values count from the end,
    /// which only `delete` honours.
    ArrayIndex(i64),
}

impl Step {
    /// Creates a map key step.
    pub fn key(name: impl Into<String>) -> Self {
        Step::MapKey(name.into())
    }

    /// Creates an array index step.
    pub fn index(i: i64) -> Self {
        Step::ArrayIndex(i)
    }

    /// Returns the key if this is a map key step.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::MapKey(name) => Some(name),
            Step::ArrayIndex(_) => None,
        }
    }

    /// Resolves this step against a node.
    ///
    /// Missing keys, wrong node kinds and indices outside `[0, len)` all
    /// resolve to `None`.
    pub fn resolve<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        match (self, node) {
            (Step::MapKey(name), Value::Map(m)) => m.get(name),
            (Step::ArrayIndex(i), Value::List(l)) => checked_index(*i, l.len()).map(|i| &l[i]),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Step::resolve`].
    pub fn resolve_mut<'a>(&self, node: &'a mut Value) -> Option<&'a mut Value> {
        match (self, node) {
            (Step::MapKey(name), Value::Map(m)) => m.get_mut(name),
            (Step::ArrayIndex(i), Value::List(l)) => {
                checked_index(*i, l.len()).map(move |i| &mut l[i])
            }
            _ => None,
        }
    }
}

/// Converts an index step into a position when it lies in `[0, len)`.
pub(crate) fn checked_index(i: i64, len: usize) -> Option<usize> {
    usize::try_from(i).ok().filter(|&i| i < len)
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::MapKey(name) => write!(f, ".{}", name),
            Step::ArrayIndex(i) => write!(f, "[{}]", i),
        }
    }
}

/// Path is a parsed, validated sequence of steps.
///
/// Paths are written as map keys joined by `.` with bracketed indices, e.g.
/// `spec.ports[0].protocol`. When the string contains a `#`, `#` becomes the
/// separator and `.` is an ordinary key character, so keys such as
/// `metadata#annotations#openshift.io/host.generated` stay addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Creates a new empty path, addressing the document root.
    pub fn new() -> Self {
        Path { steps: Vec::new() }
    }

    /// Creates a path from already-built steps.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Path { steps }
    }

    /// Parses and validates a path string.
    pub fn parse(input: &str) -> Result<Path, InvalidPathError> {
        if input.is_empty() {
            return Err(InvalidPathError::new(input, 0, "empty path"));
        }

        let separator = if input.contains('#') { '#' } else { '.' };
        let is_key_char = |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') || (separator == '#' && c == '.')
        };

        let mut steps = Vec::new();
        let mut chars = input.char_indices().peekable();
        // Set right after a separator: the next thing must be a segment.
        let mut expect_segment = true;

        while let Some(&(offset, c)) = chars.peek() {
            if c == separator {
                if expect_segment {
                    return Err(InvalidPathError::new(input, offset, "unexpected separator"));
                }
                chars.next();
                expect_segment = true;
                continue;
            }

            if c == '[' {
                chars.next();
                let mut digits = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    digits.push(c);
                }
                if !closed {
                    return Err(InvalidPathError::new(input, offset, "unterminated index"));
                }
                let index = digits.parse::<i64>().map_err(|_| {
                    InvalidPathError::new(input, offset, format!("invalid index {:?}", digits))
                })?;
                steps.push(Step::ArrayIndex(index));
                expect_segment = false;
                continue;
            }

            if is_key_char(c) {
                // Two keys need a separator between them; an index does not.
                if !expect_segment && matches!(steps.last(), Some(Step::MapKey(_))) {
                    return Err(InvalidPathError::new(input, offset, "missing separator"));
                }
                let mut key = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_key_char(c) {
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
                steps.push(Step::MapKey(key));
                expect_segment = false;
                continue;
            }

            return Err(InvalidPathError::new(
                input,
                offset,
                format!("unexpected character {:?}", c),
            ));
        }

        if expect_segment {
            return Err(InvalidPathError::new(input, input.len(), "dangling separator"));
        }

        Ok(Path { steps })
    }

    /// Returns the number of steps in the path.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the path addresses the root.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns an iterator over the steps.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Returns the last step.
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Splits the path into its parent steps and final step.
    pub fn split_last(&self) -> Option<(&Step, &[Step])> {
        self.steps.split_last()
    }

    /// Creates a new path with the given step appended.
    pub fn with(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Path { steps }
    }

    /// Returns a slice of the steps.
    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }
}

impl std::str::FromStr for Path {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = InvalidPathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Path::parse(s)
    }
}

impl FromIterator<Step> for Path {
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        Path {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(path: &str) -> Vec<Step> {
        Path::parse(path).unwrap().as_slice().to_vec()
    }

    #[test]
    fn test_parse_dotted() {
        assert_eq!(
            steps("spec.tls.termination"),
            vec![Step::key("spec"), Step::key("tls"), Step::key("termination")]
        );
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(
            steps("spec.ports[0].protocol"),
            vec![Step::key("spec"), Step::key("ports"), Step::index(0), Step::key("protocol")]
        );
        assert_eq!(steps("[1][-2]"), vec![Step::index(1), Step::index(-2)]);
        assert_eq!(steps("env[3]"), vec![Step::key("env"), Step::index(3)]);
    }

    #[test]
    fn test_parse_hash_separator_keeps_dots_in_keys() {
        assert_eq!(
            steps("spec#template#spec#containers[0]#env"),
            vec![
                Step::key("spec"),
                Step::key("template"),
                Step::key("spec"),
                Step::key("containers"),
                Step::index(0),
                Step::key("env"),
            ]
        );
        assert_eq!(
            steps("metadata#annotations#openshift.io/host.generated"),
            vec![
                Step::key("metadata"),
                Step::key("annotations"),
                Step::key("openshift.io/host.generated"),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", ".", "spec.", ".spec", "spec..host", "spec[", "spec[]", "spec[x]", "spec host", "a$b"] {
            assert!(Path::parse(bad).is_err(), "expected {:?} to be rejected", bad);
        }
    }

    #[test]
    fn test_invalid_path_error_reports_offset() {
        let err = Path::parse("spec..host").unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.to_string().contains("spec..host"));
    }

    #[test]
    fn test_step_resolve() {
        let doc = crate::value::from_json(r#"{"a":[10,20]}"#).unwrap();
        let list = Step::key("a").resolve(&doc).unwrap();
        assert_eq!(Step::index(1).resolve(list), Some(&Value::Int(20)));
        assert_eq!(Step::index(2).resolve(list), None);
        assert_eq!(Step::index(-1).resolve(list), None);
        assert_eq!(Step::key("a").resolve(list), None);
    }

    #[test]
    fn test_path_display() {
        let path = Path::parse("spec.ports[0].protocol").unwrap();
        assert_eq!(path.to_string(), ".spec.ports[0].protocol");
    }
}
