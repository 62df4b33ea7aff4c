//! Ordered edits applied to a document in one pass.

use super::ops;
use crate::fieldpath::Path;
use crate::value::Value;

/// Edit is one path-addressed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Put(Path, Value),
    Delete(Path),
}

impl Edit {
    pub fn put(path: Path, value: impl Into<Value>) -> Self {
        Edit::Put(path, value.into())
    }

    pub fn delete(path: Path) -> Self {
        Edit::Delete(path)
    }

    pub fn path(&self) -> &Path {
        match self {
            Edit::Put(path, _) | Edit::Delete(path) => path,
        }
    }

    /// Applies the edit, returning whether the document changed.
    pub fn apply(&self, root: &mut Value) -> bool {
        match self {
            Edit::Put(path, value) => ops::put(root, path, value.clone()),
            Edit::Delete(path) => ops::delete(root, path),
        }
    }
}

/// Applies every edit in order. Returns true if any of them changed the
/// document.
pub fn apply_all(root: &mut Value, edits: &[Edit]) -> bool {
    edits
        .iter()
        .fold(false, |changed, edit| edit.apply(root) || changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_apply_all_reports_any_change() {
        let mut doc = from_json(r#"{"spec":{"host":"a.com","tls":{"termination":"edge"}}}"#).unwrap();
        let edits = vec![
            Edit::put(p("spec.host"), "a.com"),
            Edit::delete(p("spec.tls")),
            Edit::put(p("spec.to.name"), "svc"),
        ];
        assert!(apply_all(&mut doc, &edits));
        assert_eq!(
            doc,
            from_json(r#"{"spec":{"host":"a.com","to":{"name":"svc"}}}"#).unwrap()
        );
        assert!(!apply_all(&mut doc, &edits));
    }

    #[test]
    fn test_every_edit_runs_after_a_change() {
        let mut doc = from_json(r#"{"a":1,"b":1}"#).unwrap();
        let edits = vec![Edit::put(p("a"), Value::Int(2)), Edit::put(p("b"), Value::Int(2))];
        assert!(apply_all(&mut doc, &edits));
        assert_eq!(doc, from_json(r#"{"a":2,"b":2}"#).unwrap());
    }
}
