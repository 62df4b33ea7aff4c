//! Routes and the TLS material they carry.

use super::{Resource, ResourceKind};
use crate::edit::Edit;
use crate::error::{Error, Result};
use crate::value::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Termination is how a route terminates TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Edge,
    Passthrough,
    Reencrypt,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Edge => "edge",
            Termination::Passthrough => "passthrough",
            Termination::Reencrypt => "reencrypt",
        }
    }
}

impl FromStr for Termination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "edge" => Ok(Termination::Edge),
            "passthrough" => Ok(Termination::Passthrough),
            "reencrypt" => Ok(Termination::Reencrypt),
            other => Err(Error::config(format!("unknown TLS termination {:?}", other))),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CertSource says where PEM material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertSource {
    File(PathBuf),
    Inline(String),
}

impl CertSource {
    pub fn load(&self) -> Result<String> {
        match self {
            CertSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e))),
            CertSource::Inline(content) => Ok(content.clone()),
        }
    }
}

/// Loads one piece of TLS material, failing with a message naming it.
fn require(source: Option<&CertSource>, what: &str) -> Result<String> {
    let data = match source {
        Some(source) => source.load()?,
        None => String::new(),
    };
    if data.is_empty() {
        return Err(Error::config(format!("verify that you pass a value for {}", what)));
    }
    Ok(data)
}

/// RouteTls is resolved TLS configuration for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTls {
    pub termination: Termination,
    pub certificate: String,
    pub key: String,
    pub ca_certificate: String,
    /// Only set for [`Termination::Reencrypt`].
    pub destination_ca_certificate: Option<String>,
}

impl RouteTls {
    /// Reads every piece of material the termination needs.
    pub fn load(
        termination: Termination,
        certificate: Option<&CertSource>,
        key: Option<&CertSource>,
        ca_certificate: Option<&CertSource>,
        destination_ca_certificate: Option<&CertSource>,
    ) -> Result<Self> {
        let destination_ca_certificate = match termination {
            Termination::Reencrypt => Some(require(destination_ca_certificate, "destcacert")?),
            _ => None,
        };
        Ok(RouteTls {
            termination,
            certificate: require(certificate, "cert")?,
            key: require(key, "key")?,
            ca_certificate: require(ca_certificate, "cacert")?,
            destination_ca_certificate,
        })
    }

    fn to_value(&self) -> Value {
        let mut tls = Map::new();
        tls.set("termination", Value::from(self.termination.as_str()));
        tls.set("certificate", Value::from(self.certificate.as_str()));
        tls.set("key", Value::from(self.key.as_str()));
        tls.set("caCertificate", Value::from(self.ca_certificate.as_str()));
        if let Some(dest) = &self.destination_ca_certificate {
            tls.set("destinationCACertificate", Value::from(dest.as_str()));
        }
        Value::Map(tls)
    }
}

/// RouteConfig is the desired state of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub name: String,
    pub namespace: String,
    pub host: Option<String>,
    pub service_name: Option<String>,
    pub tls: Option<RouteTls>,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        RouteConfig {
            name: name.into(),
            namespace: namespace.into(),
            host: None,
            service_name: None,
            tls: None,
        }
    }

    fn target(&self) -> Value {
        let mut to = Map::new();
        to.set("kind", Value::from("Service"));
        if let Some(service) = &self.service_name {
            to.set("name", Value::from(service.as_str()));
        }
        Value::Map(to)
    }

    /// Builds the full manifest to create.
    pub fn to_route(&self) -> Route {
        let mut route = Route::from(Resource::skeleton(ResourceKind::Route, &self.name, &self.namespace));
        for edit in self.edits() {
            edit.apply(&mut route.resource.doc);
        }
        route
    }

    /// Returns the edits that bring a live route to this state.
    pub fn edits(&self) -> Vec<Edit> {
        let fields = ResourceKind::Route.fields();
        let path = |name: &str| {
            fields
                .path(name)
                .cloned()
                .expect("route field table defines every route field")
        };

        let mut edits = Vec::new();
        if let Some(host) = &self.host {
            edits.push(Edit::put(path("host"), host.as_str()));
        }
        edits.push(Edit::put(path("to"), self.target()));
        match &self.tls {
            Some(tls) => edits.push(Edit::put(path("tls"), tls.to_value())),
            None => edits.push(Edit::delete(path("tls"))),
        }
        edits
    }
}

/// Route wraps a route manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    resource: Resource,
}

impl From<Resource> for Route {
    fn from(resource: Resource) -> Self {
        Route { resource }
    }
}

impl Route {
    pub fn new(doc: Value) -> Self {
        Route::from(Resource::new(ResourceKind::Route, doc))
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn document(&self) -> &Value {
        self.resource.document()
    }

    pub fn host(&self) -> Option<&str> {
        self.resource.field_str("host")
    }

    pub fn service_name(&self) -> Option<&str> {
        self.resource.field_str("service")
    }

    pub fn termination(&self) -> Option<&str> {
        self.resource.field_str("termination")
    }

    pub fn certificate(&self) -> Option<&str> {
        self.resource.field_str("certificate")
    }

    pub fn key(&self) -> Option<&str> {
        self.resource.field_str("key")
    }

    pub fn ca_certificate(&self) -> Option<&str> {
        self.resource.field_str("caCertificate")
    }

    pub fn destination_ca_certificate(&self) -> Option<&str> {
        self.resource.field_str("destinationCACertificate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;

    fn inline(s: &str) -> CertSource {
        CertSource::Inline(s.to_string())
    }

    #[test]
    fn test_plain_route_document() {
        let mut config = RouteConfig::new("r1", "web");
        config.host = Some("a.com".to_string());
        config.service_name = Some("svc".to_string());

        let route = config.to_route();
        assert_eq!(
            route.document(),
            &from_json(
                r#"{"apiVersion":"v1","kind":"Route",
                    "metadata":{"name":"r1","namespace":"web"},
                    "spec":{"host":"a.com","to":{"kind":"Service","name":"svc"}}}"#
            )
            .unwrap()
        );
        assert_eq!(route.host(), Some("a.com"));
        assert_eq!(route.service_name(), Some("svc"));
        assert_eq!(route.termination(), None);
    }

    #[test]
    fn test_edge_tls_omits_destination_ca() {
        let tls = RouteTls::load(
            Termination::Edge,
            Some(&inline("CERT")),
            Some(&inline("KEY")),
            Some(&inline("CA")),
            Some(&inline("DEST")),
        )
        .unwrap();
        let mut config = RouteConfig::new("r1", "web");
        config.tls = Some(tls);

        let route = config.to_route();
        assert_eq!(route.termination(), Some("edge"));
        assert_eq!(route.certificate(), Some("CERT"));
        assert_eq!(route.key(), Some("KEY"));
        assert_eq!(route.ca_certificate(), Some("CA"));
        assert_eq!(route.destination_ca_certificate(), None);
    }

    #[test]
    fn test_reencrypt_requires_destination_ca() {
        let err = RouteTls::load(
            Termination::Reencrypt,
            Some(&inline("CERT")),
            Some(&inline("KEY")),
            Some(&inline("CA")),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: verify that you pass a value for destcacert"
        );
    }

    #[test]
    fn test_cert_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "FILECERT").unwrap();

        let tls = RouteTls::load(
            Termination::Reencrypt,
            Some(&CertSource::File(cert)),
            Some(&inline("KEY")),
            Some(&inline("CA")),
            Some(&inline("DEST")),
        )
        .unwrap();
        assert_eq!(tls.certificate, "FILECERT");
        assert_eq!(tls.destination_ca_certificate.as_deref(), Some("DEST"));

        let missing = CertSource::File(dir.path().join("absent.pem"));
        assert!(matches!(missing.load(), Err(Error::Config(_))));
    }

    #[test]
    fn test_edits_drop_tls() {
        let live = from_json(
            r#"{"spec":{"host":"a.com","to":{"kind":"Service","name":"svc"},
                "tls":{"termination":"edge"}}}"#,
        )
        .unwrap();
        let mut doc = live.clone();
        let mut config = RouteConfig::new("r1", "web");
        config.service_name = Some("svc".to_string());

        assert!(crate::edit::apply_all(&mut doc, &config.edits()));
        assert_eq!(Route::new(doc.clone()).termination(), None);
        assert_eq!(Route::new(doc).host(), Some("a.com"));
    }

    #[test]
    fn test_termination_parse() {
        assert_eq!("reencrypt".parse::<Termination>().unwrap(), Termination::Reencrypt);
        assert!("tls".parse::<Termination>().is_err());
    }
}
