//! Reconcile module - Brings live cluster objects to a declared state.
//!
//! [`Driver`] is the shared state machine: fetch, then create when absent,
//! compare and update when present, or delete. Each resource kind plugs in
//! through the [`Reconcile`] trait.

mod driver;
mod parts;
mod project;
mod registry;
mod route;
mod router;
mod secrets;
mod state;

pub use driver::*;
pub use project::*;
pub use registry::*;
pub use route::*;
pub use router::*;
pub use secrets::*;
pub use state::*;
