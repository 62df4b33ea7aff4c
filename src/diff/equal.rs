//! Actual-driven structural comparison of resource definitions.

use super::comparison::{Mismatch, Reason, SkipKeys};
use crate::fieldpath::{Path, Step};
use crate::value::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Returns true when everything the server considers significant in
/// `actual` is accounted for by `expected`.
pub fn equal(expected: &Value, actual: &Value, skip: &SkipKeys) -> bool {
    compare(expected, actual, skip).is_none()
}

/// Walks `actual` and reports the first location `expected` does not
/// account for, or `None` when the definitions are equal.
///
/// Rules, applied to every non-skipped key `k` of each actual mapping:
///
/// - a sequence requires a sequence in `expected`. Elements are zipped by
///   position and extra elements on either side are ignored. Pairs of
///   mappings are compared recursively; any other pair requires the two
///   whole sequences to be equal.
/// - a mapping requires a mapping in `expected` with the same key set (minus
///   skipped keys), compared recursively.
/// - a scalar requires an equal scalar in `expected`.
///
/// Keys only present in `expected` never cause a mismatch.
pub fn compare(expected: &Value, actual: &Value, skip: &SkipKeys) -> Option<Mismatch> {
    let mismatch = match (expected, actual) {
        (Value::Map(e), Value::Map(a)) => compare_maps(e, a, skip, &Path::new()),
        (_, Value::Map(_)) => Some(Mismatch::new(
            Path::new(),
            Reason::KindMismatch {
                expected: expected.kind_name(),
                actual: "map",
            },
        )),
        _ if expected == actual => None,
        _ => Some(Mismatch::new(
            Path::new(),
            Reason::ValueDiffers {
                expected: expected.clone(),
                actual: actual.clone(),
            },
        )),
    };

    if let Some(m) = &mismatch {
        debug!(mismatch = %m, "definitions differ");
    }
    mismatch
}

fn compare_maps(expected: &Map, actual: &Map, skip: &SkipKeys, at: &Path) -> Option<Mismatch> {
    for (key, value) in actual.iter() {
        if skip.contains(key) {
            continue;
        }

        let here = at.with(Step::key(key.as_str()));
        let user = expected.get(key);

        let found = match value {
            Value::List(items) => compare_lists(user, value, items, skip, &here),
            Value::Map(nested) => match user {
                None => Some(Mismatch::new(here, Reason::Missing)),
                Some(Value::Map(user_nested)) => compare_key_sets(user_nested, nested, skip, &here)
                    .or_else(|| compare_maps(user_nested, nested, skip, &here)),
                Some(other) => Some(Mismatch::new(
                    here,
                    Reason::KindMismatch {
                        expected: other.kind_name(),
                        actual: "map",
                    },
                )),
            },
            _ => match user {
                None => Some(Mismatch::new(here, Reason::Missing)),
                Some(user) if user != value => Some(Mismatch::new(
                    here,
                    Reason::ValueDiffers {
                        expected: user.clone(),
                        actual: value.clone(),
                    },
                )),
                Some(_) => None,
            },
        };

        if found.is_some() {
            return found;
        }
    }
    None
}

fn compare_lists(
    user: Option<&Value>,
    whole: &Value,
    items: &[Value],
    skip: &SkipKeys,
    here: &Path,
) -> Option<Mismatch> {
    let user_items = match user {
        Some(Value::List(user_items)) => user_items,
        Some(other) => {
            return Some(Mismatch::new(
                here.clone(),
                Reason::KindMismatch {
                    expected: other.kind_name(),
                    actual: "list",
                },
            ))
        }
        None => return Some(Mismatch::new(here.clone(), Reason::Missing)),
    };

    for (i, (user_item, item)) in user_items.iter().zip(items).enumerate() {
        match (user_item, item) {
            (Value::Map(u), Value::Map(a)) => {
                let at = here.with(Step::index(i as i64));
                if let Some(m) = compare_maps(u, a, skip, &at) {
                    return Some(m);
                }
            }
            // A non-map pair compares the sequences as a whole.
            _ => {
                if user != Some(whole) {
                    return Some(Mismatch::new(
                        here.clone(),
                        Reason::ValueDiffers {
                            expected: user.cloned().unwrap_or_default(),
                            actual: whole.clone(),
                        },
                    ));
                }
            }
        }
    }
    None
}

fn compare_key_sets(expected: &Map, actual: &Map, skip: &SkipKeys, here: &Path) -> Option<Mismatch> {
    let significant = |m: &Map| -> BTreeSet<String> {
        m.keys().filter(|k| !skip.contains(k)).cloned().collect()
    };
    let user_keys = significant(expected);
    let api_keys = significant(actual);
    if user_keys == api_keys {
        return None;
    }
    Some(Mismatch::new(
        here.clone(),
        Reason::KeysDiffer {
            only_expected: user_keys.difference(&api_keys).cloned().collect(),
            only_actual: api_keys.difference(&user_keys).cloned().collect(),
        },
    ))
}
