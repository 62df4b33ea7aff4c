//! Diff module - Decides whether a desired definition already matches the
//! definition the server returned.
//!
//! The comparison is driven by the server's document: every significant key
//! the server reports must be accounted for by the desired definition, while
//! keys only the desired definition carries are tolerated. `metadata` and
//! `status` are always skipped.

mod comparison;
mod equal;

#[cfg(test)]
mod equal_test;

pub use comparison::*;
pub use equal::*;
