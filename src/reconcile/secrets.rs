//! Secrets linked to a service account.
//!
//! The reconciled object is the set of links, not the service account: it
//! exists when any configured secret is linked and drifts while some are
//! missing. The service account itself must already exist.

use super::driver::Reconcile;
use crate::cli::{CommandRunner, OpenShiftCli};
use crate::error::{Error, Result};
use crate::resource::{ResourceKind, SecretList, ServiceAccount};
use crate::value::Value;
use tracing::debug;

const KIND: ResourceKind = ResourceKind::ServiceAccount;

/// SecretsReconciler keeps a list of secrets linked to a service account.
pub struct SecretsReconciler<R> {
    oc: OpenShiftCli<R>,
    name: String,
    secrets: Vec<String>,
    list: SecretList,
    live: Option<ServiceAccount>,
}

impl<R: CommandRunner> SecretsReconciler<R> {
    pub fn new(
        runner: R,
        namespace: impl Into<String>,
        name: impl Into<String>,
        secrets: Vec<String>,
        list: SecretList,
    ) -> Self {
        SecretsReconciler {
            oc: OpenShiftCli::new(namespace, runner),
            name: name.into(),
            secrets,
            list,
            live: None,
        }
    }

    /// The service account loaded by the last fetch.
    pub fn live(&self) -> Option<&ServiceAccount> {
        self.live.as_ref()
    }

    fn linked(&self) -> impl Iterator<Item = &String> {
        self.secrets.iter().filter(move |s| {
            self.live
                .as_ref()
                .is_some_and(|sa| sa.find_secret(self.list, s).is_some())
        })
    }

    /// Edits the fetched service account and replaces it when anything
    /// changed. Returns `None` when every edit was already in place.
    fn rewrite(&mut self, edit: impl Fn(&mut ServiceAccount, &str) -> bool) -> Result<Option<Value>> {
        let mut sa = self
            .live
            .clone()
            .ok_or_else(|| Error::missing_field(KIND.kind_name(), "secrets"))?;
        let mut changed = false;
        for secret in &self.secrets {
            changed |= edit(&mut sa, secret);
        }
        if !changed {
            debug!(service_account = %self.name, "secret links already in place");
            return Ok(None);
        }
        let result = self
            .oc
            .replace_document(&self.name, sa.document(), false)?
            .check()?;
        Ok(Some(result.to_value()))
    }
}

impl<R: CommandRunner> Reconcile for SecretsReconciler<R> {
    fn describe(&self) -> String {
        format!("{}/{} secrets", KIND, self.name)
    }

    fn fetch(&mut self) -> Result<Value> {
        let result = self.oc.get(KIND.cli_name(), Some(&self.name))?.check()?;
        let doc = result
            .first()
            .cloned()
            .ok_or_else(|| Error::malformed_output(&result.cmd, "no service account returned"))?;
        self.live = Some(ServiceAccount::new(doc));
        Ok(result.results)
    }

    fn exists(&self) -> bool {
        if self.secrets.is_empty() {
            return self.live.is_some();
        }
        self.linked().next().is_some()
    }

    fn create(&mut self) -> Result<Value> {
        Ok(self.update()?.unwrap_or_else(Value::empty_map))
    }

    fn needs_update(&mut self) -> Result<bool> {
        Ok(self.linked().count() < self.secrets.len())
    }

    fn update(&mut self) -> Result<Option<Value>> {
        let list = self.list;
        self.rewrite(|sa, secret| sa.add_secret(list, secret))
    }

    fn delete(&mut self) -> Result<Value> {
        let list = self.list;
        Ok(self
            .rewrite(|sa, secret| sa.delete_secret(list, secret))?
            .unwrap_or_else(Value::empty_map))
    }
}
