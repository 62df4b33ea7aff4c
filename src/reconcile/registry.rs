//! Registry reconciliation. The parts come from an `oadm registry` dry run,
//! customized and created from manifests. On update the deployment config
//! is recreated and the service replaced in place, so it keeps its address.

use super::driver::Reconcile;
use super::parts::{delete_parts, Parts};
use crate::cli::{CommandRunner, OpenShiftCli, OutputFormat};
use crate::diff;
use crate::error::Result;
use crate::resource::{
    registry_deployment_config_skip_keys, registry_service_skip_keys, DeploymentConfig, DryRun,
    RegistryConfig, ResourceKind, Service,
};
use crate::value::Value;
use tracing::debug;

/// RegistryReconciler drives the registry's deployment config and service.
pub struct RegistryReconciler<R> {
    oc: OpenShiftCli<R>,
    config: RegistryConfig,
    live: Parts,
    /// Customized dry run for the current live state.
    prepared: Option<DryRun>,
}

impl<R: CommandRunner> RegistryReconciler<R> {
    pub fn new(runner: R, config: RegistryConfig) -> Self {
        RegistryReconciler {
            oc: OpenShiftCli::new(config.namespace.clone(), runner),
            config,
            live: Parts::default(),
            prepared: None,
        }
    }

    pub fn deployment_config(&self) -> Option<&DeploymentConfig> {
        self.live.deployment_config.as_ref()
    }

    pub fn service(&self) -> Option<&Service> {
        self.live.service.as_ref()
    }

    /// Returns the parts to write, running the dry run once per fetch.
    fn prepare(&mut self) -> Result<DryRun> {
        if let Some(dry) = &self.prepared {
            return Ok(dry.clone());
        }
        let result = self
            .oc
            .openshift_cmd(&self.config.args(), true, Some(OutputFormat::Json))?
            .check()?;
        let mut dry = DryRun::from_document(&result.results, &result.cmd)?;
        self.config.customize(&mut dry, self.live.service.as_ref());
        debug!(cmd = %result.cmd, "registry parts prepared");
        self.prepared = Some(dry.clone());
        Ok(dry)
    }
}

impl<R: CommandRunner> Reconcile for RegistryReconciler<R> {
    fn describe(&self) -> String {
        format!("registry/{}", self.config.name)
    }

    fn fetch(&mut self) -> Result<Value> {
        let (live, results) = Parts::fetch(&self.oc, &self.config.name)?;
        self.live = live;
        self.prepared = None;
        Ok(results)
    }

    fn exists(&self) -> bool {
        self.live.exists()
    }

    fn create(&mut self) -> Result<Value> {
        let dry = self.prepare()?;
        let name = &self.config.name;
        let dc = self
            .oc
            .create_from_content(name, dry.deployment_config.document())?
            .check()?;
        let svc = self.oc.create_from_content(name, dry.service.document())?.check()?;
        Ok(Value::List(vec![dc.to_value(), svc.to_value()]))
    }

    fn needs_update(&mut self) -> Result<bool> {
        if self.live.both().is_none() {
            return Ok(true);
        }
        let dry = self.prepare()?;
        let Some((live_dc, live_svc)) = self.live.both() else {
            return Ok(true);
        };

        if diff::compare(dry.service.document(), live_svc.document(), &registry_service_skip_keys())
            .is_some()
        {
            return Ok(true);
        }
        Ok(diff::compare(
            dry.deployment_config.document(),
            live_dc.document(),
            &registry_deployment_config_skip_keys(),
        )
        .is_some())
    }

    fn update(&mut self) -> Result<Option<Value>> {
        let dry = self.prepare()?;
        let name = &self.config.name;
        let mut results = delete_parts(&self.oc, name, &[ResourceKind::DeploymentConfig])?;
        let dc = self
            .oc
            .create_from_content(name, dry.deployment_config.document())?
            .check()?;
        results.push(dc.to_value());
        let svc = self.oc.replace_document(name, dry.service.document(), false)?.check()?;
        results.push(svc.to_value());
        Ok(Some(Value::List(results)))
    }

    fn delete(&mut self) -> Result<Value> {
        Ok(Value::List(delete_parts(&self.oc, &self.config.name, &Parts::KINDS)?))
    }
}
