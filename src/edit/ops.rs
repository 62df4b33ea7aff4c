//! Path-addressed get/put/delete over a document tree.

use crate::fieldpath::{checked_index, Path, Step};
use crate::value::{Map, Value};

/// Returns the node reached by following `path` from `root`.
///
/// Stops at the first step that cannot resolve (wrong node kind, missing
/// key, index outside the sequence) and returns `None`.
pub fn get<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, step| step.resolve(node))
}

/// Mutable counterpart of [`get`]. Never creates nodes.
pub fn get_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = root;
    for step in path {
        node = step.resolve_mut(node)?;
    }
    Some(node)
}

/// Writes `value` at `path`, returning whether the document changed.
///
/// Missing intermediate map keys are created as empty maps. Sequences are
/// never extended: when a step cannot be satisfied the document is left
/// untouched and `false` is returned. Writing a value equal to the current
/// one is a no-op.
pub fn put(root: &mut Value, path: &Path, value: Value) -> bool {
    if get(root, path) == Some(&value) {
        return false;
    }

    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return true;
    };

    // Check the whole walk first so a failure deep in the path cannot leave
    // half-created intermediate maps behind.
    if !can_put(root, parents, last) {
        return false;
    }

    let mut node = root;
    for step in parents {
        node = match descend_creating(node, step) {
            Some(next) => next,
            None => return false,
        };
    }

    match (last, node) {
        (Step::MapKey(key), Value::Map(m)) => {
            m.set(key.as_str(), value);
            true
        }
        (Step::ArrayIndex(i), Value::List(l)) => match checked_index(*i, l.len()) {
            Some(pos) => {
                l[pos] = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Removes the node at `path`, returning whether anything was removed.
///
/// A final negative index counts from the end of the sequence. Later
/// elements shift down after an index removal.
pub fn delete(root: &mut Value, path: &Path) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };

    let mut node = root;
    for step in parents {
        node = match step.resolve_mut(node) {
            Some(next) => next,
            None => return false,
        };
    }

    match (last, node) {
        (Step::MapKey(key), Value::Map(m)) => m.delete(key).is_some(),
        (Step::ArrayIndex(i), Value::List(l)) => {
            let len = l.len();
            let index = if *i < 0 { len as i64 + *i } else { *i };
            match checked_index(index, len) {
                Some(pos) => {
                    l.remove(pos);
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Initialises an absent root as `{key: value}`.
///
/// Returns `false` and leaves the root alone when one already exists.
pub fn create_if_absent(root: &mut Option<Value>, key: &str, value: Value) -> bool {
    if root.is_some() {
        return false;
    }
    let mut map = Map::new();
    map.set(key, value);
    *root = Some(Value::Map(map));
    true
}

fn descend_creating<'a>(node: &'a mut Value, step: &Step) -> Option<&'a mut Value> {
    match (step, node) {
        (Step::MapKey(key), Value::Map(m)) => Some(m.entry_or_empty_map(key)),
        (Step::ArrayIndex(_), node) => step.resolve_mut(node),
        _ => None,
    }
}

/// Dry run of the walk performed by [`put`].
fn can_put(root: &Value, parents: &[Step], last: &Step) -> bool {
    // `None` stands for a map that the write would create, which is empty.
    let mut node = Some(root);
    for step in parents {
        node = match (node, step) {
            (Some(Value::Map(m)), Step::MapKey(key)) => m.get(key),
            (Some(n), Step::ArrayIndex(_)) => match step.resolve(n) {
                Some(next) => Some(next),
                None => return false,
            },
            (None, Step::MapKey(_)) => None,
            _ => return false,
        };
    }

    match (node, last) {
        (None, Step::MapKey(_)) => true,
        (Some(n), Step::MapKey(_)) => n.is_map(),
        (Some(Value::List(l)), Step::ArrayIndex(i)) => checked_index(*i, l.len()).is_some(),
        _ => false,
    }
}
