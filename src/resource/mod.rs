//! Resource module - Typed façades over cluster manifests.
//!
//! A [`Resource`] owns one document and knows the named field paths of its
//! kind. The kind-specific wrappers ([`Route`], [`ServiceAccount`],
//! [`Project`], [`Service`], [`DeploymentConfig`]) add accessors on top of it.

mod parts;
mod project;
mod registry;
mod route;
mod router;
mod service_account;

pub use parts::*;
pub use project::*;
pub use registry::*;
pub use route::*;
pub use router::*;
pub use service_account::*;

use crate::edit;
use crate::error::{Error, Result};
use crate::fieldpath::Path;
use crate::value::{Map, Value};
use once_cell::sync::Lazy;
use std::fmt;

/// ResourceKind lists the kinds this crate reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Route,
    ServiceAccount,
    DeploymentConfig,
    Service,
    Project,
}

impl ResourceKind {
    /// Returns the short name the command-line tool accepts.
    pub fn cli_name(self) -> &'static str {
        match self {
            ResourceKind::Route => "route",
            ResourceKind::ServiceAccount => "sa",
            ResourceKind::DeploymentConfig => "dc",
            ResourceKind::Service => "svc",
            ResourceKind::Project => "project",
        }
    }

    /// Returns the manifest `kind`.
    pub fn kind_name(self) -> &'static str {
        match self {
            ResourceKind::Route => "Route",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::DeploymentConfig => "DeploymentConfig",
            ResourceKind::Service => "Service",
            ResourceKind::Project => "Project",
        }
    }

    /// Returns the named field paths of this kind.
    pub fn fields(self) -> &'static FieldTable {
        match self {
            ResourceKind::Route => &ROUTE_FIELDS,
            ResourceKind::ServiceAccount => &SERVICE_ACCOUNT_FIELDS,
            ResourceKind::DeploymentConfig => &DEPLOYMENT_CONFIG_FIELDS,
            ResourceKind::Service => &SERVICE_FIELDS,
            ResourceKind::Project => &PROJECT_FIELDS,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

/// FieldTable maps field names to their location in a manifest.
#[derive(Debug)]
pub struct FieldTable {
    entries: Vec<(&'static str, Path)>,
}

impl FieldTable {
    fn new(entries: &[(&'static str, &'static str)]) -> Self {
        FieldTable {
            entries: entries
                .iter()
                .map(|(name, path)| {
                    let path = Path::parse(path).expect("static field paths are valid");
                    (*name, path)
                })
                .collect(),
        }
    }

    /// Returns the path of a named field.
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }
}

static ROUTE_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(&[
        ("host", "spec.host"),
        ("service", "spec.to.name"),
        ("to", "spec.to"),
        ("tls", "spec.tls"),
        ("termination", "spec.tls.termination"),
        ("certificate", "spec.tls.certificate"),
        ("key", "spec.tls.key"),
        ("caCertificate", "spec.tls.caCertificate"),
        ("destinationCACertificate", "spec.tls.destinationCACertificate"),
    ])
});

static SERVICE_ACCOUNT_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(&[
        ("secrets", "secrets"),
        ("imagePullSecrets", "imagePullSecrets"),
    ])
});

static DEPLOYMENT_CONFIG_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(&[
        ("replicas", "spec.replicas"),
        ("containers", "spec.template.spec.containers"),
        ("env", "spec.template.spec.containers[0].env"),
        ("ports", "spec.template.spec.containers[0].ports"),
        ("volumes", "spec.template.spec.volumes"),
        ("volumeMounts", "spec.template.spec.containers[0].volumeMounts"),
    ])
});

static SERVICE_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(&[
        ("ports", "spec.ports"),
        ("clusterIP", "spec.clusterIP"),
        ("portalIP", "spec.portalIP"),
        ("selector", "spec.selector"),
    ])
});

static PROJECT_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(&[("annotations", "metadata#annotations")])
});

static NAME: Lazy<Path> = Lazy::new(|| Path::parse("metadata.name").expect("valid path"));
static NAMESPACE: Lazy<Path> = Lazy::new(|| Path::parse("metadata.namespace").expect("valid path"));

/// Resource is one manifest of a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    kind: ResourceKind,
    doc: Value,
}

impl Resource {
    pub fn new(kind: ResourceKind, doc: Value) -> Self {
        Resource { kind, doc }
    }

    /// Builds the minimal manifest every kind shares: `apiVersion`, `kind`
    /// and `metadata.name`/`metadata.namespace`.
    pub fn skeleton(kind: ResourceKind, name: &str, namespace: &str) -> Self {
        let mut metadata = Map::new();
        metadata.set("name", Value::from(name));
        metadata.set("namespace", Value::from(namespace));

        let mut doc = Map::new();
        doc.set("apiVersion", Value::from("v1"));
        doc.set("kind", Value::from(kind.kind_name()));
        doc.set("metadata", Value::Map(metadata));
        Resource::new(kind, Value::Map(doc))
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn document(&self) -> &Value {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.doc
    }

    pub fn into_document(self) -> Value {
        self.doc
    }

    pub fn name(&self) -> Option<&str> {
        self.get(&NAME).and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.get(&NAMESPACE).and_then(Value::as_str)
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        self.set(&NAME, name)
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        edit::get(&self.doc, path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        edit::get_mut(&mut self.doc, path)
    }

    pub fn set(&mut self, path: &Path, value: impl Into<Value>) -> bool {
        edit::put(&mut self.doc, path, value.into())
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        edit::delete(&mut self.doc, path)
    }

    /// Returns the path of a named field of this kind.
    pub fn field_path(&self, field: &str) -> Result<&'static Path> {
        self.kind
            .fields()
            .path(field)
            .ok_or_else(|| Error::missing_field(self.kind.kind_name(), field))
    }

    /// Reads a named field.
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.kind
            .fields()
            .path(field)
            .and_then(|path| self.get(path))
    }

    /// Reads a named string field.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.field(field).and_then(Value::as_str)
    }

    /// Writes a named field. Fails for names the kind does not define.
    pub fn set_field(&mut self, field: &str, value: impl Into<Value>) -> Result<bool> {
        let path = self.field_path(field)?;
        Ok(self.set(path, value))
    }

    /// Removes a named field.
    pub fn remove_field(&mut self, field: &str) -> Result<bool> {
        let path = self.field_path(field)?;
        Ok(self.remove(path))
    }
}
