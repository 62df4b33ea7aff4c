//! Edit module - Reads and writes values inside a document by path.
//!
//! The free functions in [`ops`] work on a borrowed tree; [`Editor`] owns a
//! possibly absent document and accepts string keys; [`Edit`] batches
//! changes that are applied together.

mod editor;
pub mod ops;
mod patch;

pub use editor::*;
pub use ops::{create_if_absent, delete, get, get_mut, put};
pub use patch::*;
