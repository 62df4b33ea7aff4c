//! Project reconciliation. Projects are created through `oadm new-project`
//! and updated by rewriting their annotations.

use super::driver::{absorb_not_found, Reconcile};
use crate::cli::{CommandRunner, OpenShiftCli};
use crate::error::{Error, Result};
use crate::resource::{Project, ProjectConfig, ResourceKind};
use crate::value::{Map, Value};

const KIND: ResourceKind = ResourceKind::Project;

/// ProjectReconciler drives one project towards a [`ProjectConfig`].
pub struct ProjectReconciler<R> {
    oc: OpenShiftCli<R>,
    config: ProjectConfig,
    live: Option<Project>,
}

impl<R: CommandRunner> ProjectReconciler<R> {
    pub fn new(runner: R, config: ProjectConfig) -> Self {
        ProjectReconciler {
            oc: OpenShiftCli::new(config.name.clone(), runner),
            config,
            live: None,
        }
    }

    pub fn live(&self) -> Option<&Project> {
        self.live.as_ref()
    }
}

impl<R: CommandRunner> Reconcile for ProjectReconciler<R> {
    fn describe(&self) -> String {
        format!("{}/{}", KIND, self.config.name)
    }

    fn fetch(&mut self) -> Result<Value> {
        let result = self.oc.get(KIND.cli_name(), Some(&self.config.name))?;
        if result.is_not_found() {
            self.live = None;
            return Ok(Value::List(vec![Value::Map(Map::new())]));
        }
        let result = result.check()?;
        let doc = result
            .first()
            .cloned()
            .ok_or_else(|| Error::malformed_output(&result.cmd, "no project returned"))?;
        self.live = Some(Project::new(doc));
        Ok(result.results)
    }

    fn exists(&self) -> bool {
        self.live.is_some()
    }

    fn create(&mut self) -> Result<Value> {
        let result = self.oc.openshift_cmd(&self.config.args(), true, None)?.check()?;
        Ok(result.to_value())
    }

    fn needs_update(&mut self) -> Result<bool> {
        Ok(self
            .live
            .as_ref()
            .map_or(true, |live| !live.matches(&self.config)))
    }

    fn update(&mut self) -> Result<Option<Value>> {
        let edits = self.config.edits();
        self.oc
            .replace_content(KIND.cli_name(), &self.config.name, &edits, false)?
            .map(|result| Ok(result.check()?.to_value()))
            .transpose()
    }

    fn delete(&mut self) -> Result<Value> {
        let result = self.oc.delete(KIND.cli_name(), &self.config.name)?;
        Ok(absorb_not_found(result)?.to_value())
    }
}
