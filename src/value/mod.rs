//! Value module - In-memory representation of YAML/JSON manifests.

mod value;

pub use value::*;
