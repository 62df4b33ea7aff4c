//! Live state of resources made of a deployment config and a service.

use super::driver::absorb_not_found;
use crate::cli::{CommandRunner, OpenShiftCli};
use crate::error::{Error, Result};
use crate::resource::{DeploymentConfig, ResourceKind, Service};
use crate::value::Value;
use tracing::debug;

/// Parts holds whichever of the two parts exist.
#[derive(Debug, Clone, Default)]
pub(crate) struct Parts {
    pub deployment_config: Option<DeploymentConfig>,
    pub service: Option<Service>,
}

impl Parts {
    pub const KINDS: [ResourceKind; 2] = [ResourceKind::DeploymentConfig, ResourceKind::Service];

    /// Fetches both parts. A part that is not found is left out; the
    /// returned results list the found documents.
    pub fn fetch<R: CommandRunner>(oc: &OpenShiftCli<R>, name: &str) -> Result<(Parts, Value)> {
        let mut parts = Parts::default();
        let mut found = Vec::new();

        for kind in Self::KINDS {
            let result = oc.get(kind.cli_name(), Some(name))?;
            if result.is_not_found() {
                debug!(part = %kind, name, "part absent");
                continue;
            }
            let result = result.check()?;
            let Some(doc) = result.first().cloned() else {
                return Err(Error::malformed_output(&result.cmd, "no object returned"));
            };
            match kind {
                ResourceKind::DeploymentConfig => {
                    parts.deployment_config = Some(DeploymentConfig::new(doc.clone()))
                }
                _ => parts.service = Some(Service::new(doc.clone())),
            }
            found.push(doc);
        }
        Ok((parts, Value::List(found)))
    }

    pub fn exists(&self) -> bool {
        self.deployment_config.is_some() || self.service.is_some()
    }

    /// Returns both parts when both exist.
    pub fn both(&self) -> Option<(&DeploymentConfig, &Service)> {
        Some((self.deployment_config.as_ref()?, self.service.as_ref()?))
    }
}

/// Deletes `kinds` named `name`. Parts already gone count as deleted.
pub(crate) fn delete_parts<R: CommandRunner>(
    oc: &OpenShiftCli<R>,
    name: &str,
    kinds: &[ResourceKind],
) -> Result<Vec<Value>> {
    kinds
        .iter()
        .map(|kind| {
            let result = oc.delete(kind.cli_name(), name)?;
            Ok(absorb_not_found(result)?.to_value())
        })
        .collect()
}
