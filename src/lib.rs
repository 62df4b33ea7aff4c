//! # oc-reconcile
//!
//! Reconciles declared OpenShift resources against a live cluster, using the
//! `oc` and `oadm` command-line tools as the only channel to it.
//!
//! Manifests are edited through path expressions such as
//! `spec.tls.termination` or `spec#ports[0]#protocol`, and drift is decided
//! by an actual-driven structural comparison that tolerates fields the
//! server adds on its own.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON manifests
//! - [`fieldpath`] - Parsed path expressions made of map keys and indices
//! - [`edit`] - Get, put, delete and create-if-absent by path
//! - [`diff`] - Structural equality with skipped keys
//! - [`resource`] - Typed façades for routes, service accounts, projects, the router and the registry
//! - [`cli`] - Invocation of the cluster tools and scoped manifest files
//! - [`reconcile`] - The create / update / no-op state machine

pub mod cli;
pub mod config;
pub mod diff;
pub mod edit;
pub mod error;
pub mod fieldpath;
pub mod reconcile;
pub mod resource;
pub mod value;

pub use config::Config;
pub use diff::{compare, equal, Mismatch, SkipKeys};
pub use edit::{Edit, Editor};
pub use error::{Error, Result};
pub use fieldpath::{InvalidPathError, Path, Step};
pub use reconcile::{Desired, Driver, Outcome, Reconcile, State};
pub use value::Value;
