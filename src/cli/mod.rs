//! CLI module - Drives the cluster command-line tools.
//!
//! Process execution sits behind [`CommandRunner`]; [`OpenShiftCli`] turns
//! invocations into [`CommandResult`]s and hands documents over through
//! [`ScopedFile`]s that are removed as soon as the call returns.

mod oc;
mod options;
mod runner;
mod scoped;

pub use oc::*;
pub use options::*;
pub use runner::*;
pub use scoped::*;
