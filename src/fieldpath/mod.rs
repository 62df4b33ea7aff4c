//! Field path module - Parses and represents locations inside a document.
//!
//! A path is validated once, when parsed, and then resolved step by step
//! against a [`Value`](crate::value::Value).

mod path;

pub use path::*;
