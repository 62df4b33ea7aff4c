//! The integrated image registry. `oadm registry --dry-run` describes its
//! deployment config and service; both are customized and then created
//! from manifests.

use super::{DryRun, Service};
use crate::cli::OptionSet;
use crate::diff::SkipKeys;
use crate::edit::Edit;
use crate::value::{Map, Value};
use serde::Deserialize;

/// Service keys the server fills in on its own.
pub const REGISTRY_SERVICE_SKIP: [&str; 5] =
    ["clusterIP", "portalIP", "sessionAffinity", "type", "protocol"];

/// Deployment config keys that differ between a dry run and a live object.
pub const REGISTRY_DEPLOYMENT_CONFIG_SKIP: [&str; 12] = [
    "dnsPolicy",
    "terminationGracePeriodSeconds",
    "restartPolicy",
    "timeoutSeconds",
    "livenessProbe",
    "readinessProbe",
    "terminationMessagePath",
    "rollingParams",
    "securityContext",
    "imagePullPolicy",
    "protocol",
    "type",
];

/// VolumeSource is where a registry volume comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VolumeSource {
    Secret { secret_name: String, path: String },
    EmptyDir { path: String },
    Pvc { claim_name: String },
    HostPath { path: String },
}

/// RegistryVolume is one volume added to the registry pod, e.g.
/// `{name: certs, type: secret, secret_name: registry-certs, path: /certs}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryVolume {
    pub name: String,
    #[serde(flatten)]
    pub source: VolumeSource,
}

impl RegistryVolume {
    /// Returns the pod volume.
    pub fn volume(&self) -> Value {
        let mut volume = Map::new();
        volume.set("name", Value::from(self.name.as_str()));
        let (key, source) = match &self.source {
            VolumeSource::Secret { secret_name, .. } => {
                ("secret", single("secretName", secret_name))
            }
            VolumeSource::EmptyDir { .. } => ("emptyDir", Map::new()),
            VolumeSource::Pvc { claim_name } => ("persistentVolumeClaim", single("claimName", claim_name)),
            VolumeSource::HostPath { path } => ("hostPath", single("path", path)),
        };
        volume.set(key, Value::Map(source));
        Value::Map(volume)
    }

    /// Returns the container mount. Claims and host paths are not mounted
    /// by the registry container.
    pub fn mount(&self) -> Option<Value> {
        let path = match &self.source {
            VolumeSource::Secret { path, .. } | VolumeSource::EmptyDir { path } => path,
            VolumeSource::Pvc { .. } | VolumeSource::HostPath { .. } => return None,
        };
        let mut mount = single("mountPath", path);
        mount.set("name", Value::from(self.name.as_str()));
        Some(Value::Map(mount))
    }
}

fn single(key: &str, value: &str) -> Map {
    let mut map = Map::new();
    map.set(key, Value::from(value));
    map
}

/// RegistryConfig is the desired state of the registry: the option set
/// passed to `oadm registry` plus the changes made to what it generates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    pub name: String,
    pub namespace: String,
    pub options: OptionSet,
    /// Environment variables set on the registry container.
    pub env_vars: Vec<(String, String)>,
    pub volumes: Vec<RegistryVolume>,
    /// Path edits applied to the deployment config last.
    pub edits: Vec<Edit>,
}

impl RegistryConfig {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        RegistryConfig {
            name: name.into(),
            namespace: namespace.into(),
            options: OptionSet::new(),
            env_vars: Vec::new(),
            volumes: Vec::new(),
            edits: Vec::new(),
        }
    }

    /// Sets a flag passed to the tool.
    pub fn option(&mut self, name: &str, value: Option<impl ToString>) -> &mut Self {
        self.options.set(name, value, true);
        self
    }

    /// Renders the `oadm registry` dry-run arguments.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "registry".to_string(),
            "-n".to_string(),
            self.namespace.clone(),
        ];
        args.extend(self.options.to_args());
        args.extend(["--dry-run=true", "-o", "json"].map(String::from));
        args
    }

    /// Turns the generated parts into the ones to create: both are named
    /// after the registry, the deployment config gets the configured
    /// environment, volumes and edits, and the service keeps the addresses
    /// of `live_service`.
    pub fn customize(&self, dry: &mut DryRun, live_service: Option<&Service>) {
        let dc = &mut dry.deployment_config;
        dc.set_name(&self.name);
        for (name, value) in &self.env_vars {
            dc.upsert_env(name, Value::from(value.as_str()));
        }
        for volume in &self.volumes {
            dc.upsert_volume(volume.volume());
            if let Some(mount) = volume.mount() {
                dc.upsert_volume_mount(mount);
            }
        }
        dc.apply(&self.edits);

        dry.service.set_name(&self.name);
        if let Some(live) = live_service {
            dry.service.keep_addresses(live);
        }
    }
}

pub fn registry_service_skip_keys() -> SkipKeys {
    REGISTRY_SERVICE_SKIP.into_iter().collect()
}

pub fn registry_deployment_config_skip_keys() -> SkipKeys {
    REGISTRY_DEPLOYMENT_CONFIG_SKIP.into_iter().collect()
}
