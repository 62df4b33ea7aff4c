//! Router reconciliation. The router has no in-place update: a drifted
//! router is deleted and created again.

use super::driver::Reconcile;
use super::parts::{delete_parts, Parts};
use crate::cli::{CommandResult, CommandRunner, OpenShiftCli, OutputFormat};
use crate::diff;
use crate::error::{Error, Result};
use crate::resource::{
    deployment_config_skip_keys, service_skip_keys, DeploymentConfig, DryRun, RouterConfig, Service,
};
use crate::value::Value;
use std::time::Duration;
use tracing::info;

/// RouterReconciler drives the router's deployment config and service.
pub struct RouterReconciler<R> {
    oc: OpenShiftCli<R>,
    config: RouterConfig,
    settle_delay: Duration,
    live: Parts,
}

impl<R: CommandRunner> RouterReconciler<R> {
    pub fn new(runner: R, config: RouterConfig) -> Self {
        RouterReconciler {
            oc: OpenShiftCli::new(config.namespace.clone(), runner),
            config,
            settle_delay: Duration::from_secs(15),
            live: Parts::default(),
        }
    }

    /// Sets the wait between deleting and recreating the router.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn deployment_config(&self) -> Option<&DeploymentConfig> {
        self.live.deployment_config.as_ref()
    }

    pub fn service(&self) -> Option<&Service> {
        self.live.service.as_ref()
    }

    fn run_router(&self, dry_run: bool) -> Result<CommandResult> {
        let pem = self.config.default_cert()?;
        let args = self.config.args(pem.as_ref(), dry_run);
        let output = dry_run.then_some(OutputFormat::Raw);
        self.oc.openshift_cmd(&args, true, output)?.check()
    }
}

impl<R: CommandRunner> Reconcile for RouterReconciler<R> {
    fn describe(&self) -> String {
        format!("router/{}", self.config.name)
    }

    fn fetch(&mut self) -> Result<Value> {
        let (live, results) = Parts::fetch(&self.oc, &self.config.name)?;
        self.live = live;
        Ok(results)
    }

    fn exists(&self) -> bool {
        self.live.exists()
    }

    fn create(&mut self) -> Result<Value> {
        Ok(self.run_router(false)?.to_value())
    }

    fn needs_update(&mut self) -> Result<bool> {
        let Some((live_dc, live_svc)) = self.live.both() else {
            return Ok(true);
        };

        let result = self.run_router(true)?;
        let raw = result
            .results
            .as_str()
            .ok_or_else(|| Error::malformed_output(&result.cmd, "dry run printed nothing"))?;
        let mut dry = DryRun::parse(raw, &result.cmd)?;
        self.config.normalize(&mut dry, live_dc);

        if diff::compare(dry.service.document(), live_svc.document(), &service_skip_keys()).is_some() {
            return Ok(true);
        }
        Ok(diff::compare(
            dry.deployment_config.document(),
            live_dc.document(),
            &deployment_config_skip_keys(),
        )
        .is_some())
    }

    fn update(&mut self) -> Result<Option<Value>> {
        let mut results = delete_parts(&self.oc, &self.config.name, &Parts::KINDS)?;
        info!(delay = ?self.settle_delay, "waiting for the router deletion to settle");
        std::thread::sleep(self.settle_delay);
        results.push(self.create()?);
        Ok(Some(Value::List(results)))
    }

    fn delete(&mut self) -> Result<Value> {
        Ok(Value::List(delete_parts(&self.oc, &self.config.name, &Parts::KINDS)?))
    }
}
