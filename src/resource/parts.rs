//! Deployment configs and services, the parts `oadm router` and
//! `oadm registry` create together, and the dry-run output describing them.

use super::{Resource, ResourceKind};
use crate::edit::{self, Edit};
use crate::error::{Error, Result};
use crate::value::{self, Value};

const DEFAULT_PROTOCOL: &str = "TCP";

/// Service wraps a service manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    resource: Resource,
}

impl Service {
    pub fn new(doc: Value) -> Self {
        Service {
            resource: Resource::new(ResourceKind::Service, doc),
        }
    }

    pub fn document(&self) -> &Value {
        self.resource.document()
    }

    pub fn ports(&self) -> &[Value] {
        list_field(&self.resource, "ports")
    }

    pub fn name(&self) -> Option<&str> {
        self.resource.name()
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        self.resource.set_name(name)
    }

    pub fn cluster_ip(&self) -> Option<&str> {
        self.resource.field_str("clusterIP")
    }

    pub fn portal_ip(&self) -> Option<&str> {
        self.resource.field_str("portalIP")
    }

    /// Copies the addresses the server assigned to `live`, so a replaced
    /// service keeps them.
    pub fn keep_addresses(&mut self, live: &Service) -> bool {
        let mut changed = false;
        for field in ["clusterIP", "portalIP"] {
            if let Some(ip) = live.resource.field_str(field) {
                changed |= self.resource.set_field(field, ip).unwrap_or(false);
            }
        }
        changed
    }

    /// Sets `protocol: TCP` on every port.
    pub fn force_tcp_ports(&mut self) {
        let Ok(path) = self.resource.field_path("ports") else {
            return;
        };
        if let Some(ports) = self.resource.get_mut(path).and_then(Value::as_list_mut) {
            for port in ports.iter_mut().filter_map(Value::as_map_mut) {
                port.set("protocol", Value::from(DEFAULT_PROTOCOL));
            }
        }
    }
}

/// DeploymentConfig wraps a deployment config manifest. Container accessors
/// address the first container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    resource: Resource,
}

impl DeploymentConfig {
    pub fn new(doc: Value) -> Self {
        DeploymentConfig {
            resource: Resource::new(ResourceKind::DeploymentConfig, doc),
        }
    }

    pub fn document(&self) -> &Value {
        self.resource.document()
    }

    pub fn name(&self) -> Option<&str> {
        self.resource.name()
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        self.resource.set_name(name)
    }

    pub fn env(&self) -> &[Value] {
        list_field(&self.resource, "env")
    }

    pub fn env_value(&self, name: &str) -> Option<&Value> {
        find_named(self.env(), name).and_then(|var| var.as_map()?.get("value"))
    }

    /// Overwrites the value of an existing variable.
    pub fn set_env_value(&mut self, name: &str, value: Value) -> bool {
        let Ok(path) = self.resource.field_path("env") else {
            return false;
        };
        let Some(env) = self.resource.get_mut(path).and_then(Value::as_list_mut) else {
            return false;
        };
        match env
            .iter_mut()
            .filter_map(Value::as_map_mut)
            .find(|var| var.get("name").and_then(Value::as_str) == Some(name))
        {
            Some(var) if var.get("value") != Some(&value) => {
                var.set("value", value);
                true
            }
            _ => false,
        }
    }

    /// Sets a variable, appending it when the container does not define it.
    pub fn upsert_env(&mut self, name: &str, value: Value) -> bool {
        if find_named(self.env(), name).is_some() {
            return self.set_env_value(name, value);
        }
        upsert_named(&mut self.resource, "env", named(name, "value", value))
    }

    pub fn volumes(&self) -> &[Value] {
        list_field(&self.resource, "volumes")
    }

    pub fn volume_mounts(&self) -> &[Value] {
        list_field(&self.resource, "volumeMounts")
    }

    /// Adds a pod volume or replaces the one with the same name.
    pub fn upsert_volume(&mut self, volume: Value) -> bool {
        upsert_named(&mut self.resource, "volumes", volume)
    }

    /// Adds a container volume mount or replaces the one with the same name.
    pub fn upsert_volume_mount(&mut self, mount: Value) -> bool {
        upsert_named(&mut self.resource, "volumeMounts", mount)
    }

    /// Applies path edits to the whole manifest.
    pub fn apply(&mut self, edits: &[Edit]) -> bool {
        edit::apply_all(self.resource.document_mut(), edits)
    }

    /// Gives container ports without a protocol the default one.
    pub fn default_port_protocols(&mut self) {
        let Ok(path) = self.resource.field_path("ports") else {
            return;
        };
        if let Some(ports) = self.resource.get_mut(path).and_then(Value::as_list_mut) {
            for port in ports.iter_mut().filter_map(Value::as_map_mut) {
                if !port.has("protocol") {
                    port.set("protocol", Value::from(DEFAULT_PROTOCOL));
                }
            }
        }
    }
}

fn list_field<'a>(resource: &'a Resource, field: &str) -> &'a [Value] {
    resource
        .field(field)
        .and_then(Value::as_list)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn name_of(item: &Value) -> Option<&str> {
    item.as_map()?.get("name")?.as_str()
}

fn find_named<'a>(items: &'a [Value], name: &str) -> Option<&'a Value> {
    items.iter().find(|item| name_of(item) == Some(name))
}

fn named(name: &str, key: &str, value: Value) -> Value {
    let mut item = value::Map::new();
    item.set("name", Value::from(name));
    item.set(key, value);
    Value::Map(item)
}

/// Replaces the entry of a list field whose `name` matches the item's, or
/// appends the item. A missing list is created.
fn upsert_named(resource: &mut Resource, field: &str, item: Value) -> bool {
    let Ok(path) = resource.field_path(field) else {
        return false;
    };
    let name = name_of(&item).map(str::to_string);
    if let Some(list) = resource.get_mut(path).and_then(Value::as_list_mut) {
        match list.iter_mut().find(|e| name_of(e) == name.as_deref()) {
            Some(existing) if *existing == item => false,
            Some(existing) => {
                *existing = item;
                true
            }
            None => {
                list.push(item);
                true
            }
        }
    } else {
        resource.set(path, Value::List(vec![item]))
    }
}

/// DryRun holds the parts a tool would create, taken from its
/// `--dry-run -o json` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    pub deployment_config: DeploymentConfig,
    pub service: Service,
}

impl DryRun {
    /// Parses output that starts with one informational line before the
    /// JSON list, as `oadm router` prints the generated stats password first.
    pub fn parse(raw: &str, cmd: &str) -> Result<Self> {
        let json = raw.split_once('\n').map(|(_, rest)| rest).unwrap_or_default();
        let doc = value::from_json(json).map_err(|e| Error::malformed_output(cmd, e.to_string()))?;
        Self::from_document(&doc, cmd)
    }

    /// Picks the deployment config and the service out of a list document.
    pub fn from_document(doc: &Value, cmd: &str) -> Result<Self> {
        let items = doc
            .as_map()
            .and_then(|m| m.get("items"))
            .and_then(Value::as_list)
            .ok_or_else(|| Error::malformed_output(cmd, "dry run output has no items"))?;

        let of_kind = |kind: ResourceKind| {
            items
                .iter()
                .find(|item| {
                    item.as_map()
                        .and_then(|m| m.get("kind"))
                        .and_then(Value::as_str)
                        == Some(kind.kind_name())
                })
                .cloned()
        };
        match (of_kind(ResourceKind::DeploymentConfig), of_kind(ResourceKind::Service)) {
            (Some(dc), Some(svc)) => Ok(DryRun {
                deployment_config: DeploymentConfig::new(dc),
                service: Service::new(svc),
            }),
            _ => Err(Error::malformed_output(
                cmd,
                format!(
                    "expected a deployment config and a service among {} items",
                    items.len()
                ),
            )),
        }
    }

    /// Gives every port its default protocol, as the server does on create.
    pub fn default_protocols(&mut self) {
        self.service.force_tcp_ports();
        self.deployment_config.default_port_protocols();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::Path;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;

    const DC: &str = r#"{"kind":"DeploymentConfig","metadata":{"name":"docker-registry"},
        "spec":{"template":{"spec":{"containers":[{"name":"registry",
          "env":[{"name":"REGISTRY_HTTP_ADDR","value":":5000"}],
          "ports":[{"containerPort":5000}]}]}}}}"#;

    fn dc() -> DeploymentConfig {
        DeploymentConfig::new(from_json(DC).unwrap())
    }

    #[test]
    fn test_upsert_env() {
        let mut dc = dc();
        assert!(!dc.upsert_env("REGISTRY_HTTP_ADDR", Value::from(":5000")));
        assert!(dc.upsert_env("REGISTRY_HTTP_ADDR", Value::from(":5001")));
        assert!(dc.upsert_env("STORAGE", Value::from("s3")));
        assert_eq!(dc.env().len(), 2);
        assert_eq!(dc.env_value("REGISTRY_HTTP_ADDR"), Some(&Value::from(":5001")));
        assert_eq!(dc.env_value("STORAGE"), Some(&Value::from("s3")));
    }

    #[test]
    fn test_upsert_volumes_creates_lists() {
        let mut dc = dc();
        let volume = from_json(r#"{"name":"storage","emptyDir":{}}"#).unwrap();
        let mount = from_json(r#"{"name":"storage","mountPath":"/registry"}"#).unwrap();

        assert!(dc.upsert_volume(volume.clone()));
        assert!(!dc.upsert_volume(volume));
        assert!(dc.upsert_volume_mount(mount));
        assert_eq!(dc.volumes().len(), 1);

        let moved = from_json(r#"{"name":"storage","mountPath":"/data"}"#).unwrap();
        assert!(dc.upsert_volume_mount(moved.clone()));
        assert_eq!(dc.volume_mounts(), &[moved]);
    }

    #[test]
    fn test_apply_edits() {
        let mut dc = dc();
        let replicas = Path::parse("spec#replicas").unwrap();
        assert!(dc.apply(&[Edit::put(replicas.clone(), Value::Int(2))]));
        assert!(!dc.apply(&[Edit::put(replicas, Value::Int(2))]));
    }

    #[test]
    fn test_keep_addresses() {
        let live = Service::new(
            from_json(r#"{"spec":{"clusterIP":"172.30.0.5","portalIP":"172.30.0.5"}}"#).unwrap(),
        );
        let mut svc = Service::new(from_json(r#"{"spec":{"ports":[]}}"#).unwrap());
        assert!(svc.keep_addresses(&live));
        assert_eq!(svc.cluster_ip(), Some("172.30.0.5"));
        assert_eq!(svc.portal_ip(), Some("172.30.0.5"));
        assert!(!svc.keep_addresses(&live));
    }

    #[test]
    fn test_dry_run_picks_parts_by_kind() {
        let doc = from_json(
            r#"{"kind":"List","items":[
                {"kind":"Service","spec":{"ports":[{"port":5000}]}},
                {"kind":"DeploymentConfig","spec":{}}]}"#,
        )
        .unwrap();
        let mut dry = DryRun::from_document(&doc, "oadm registry").unwrap();
        dry.default_protocols();
        assert_eq!(
            dry.service.ports(),
            &[from_json(r#"{"port":5000,"protocol":"TCP"}"#).unwrap()]
        );

        let err = DryRun::from_document(&from_json(r#"{"items":[{"kind":"Service"}]}"#).unwrap(), "oadm")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }));
    }
}
