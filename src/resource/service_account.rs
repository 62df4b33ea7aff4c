//! Service accounts and the secrets linked to them.

use super::{Resource, ResourceKind};
use crate::fieldpath::Step;
use crate::value::{Map, Value};

/// SecretList selects one of the two secret lists of a service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretList {
    /// `secrets`: mountable secrets.
    Mountable,
    /// `imagePullSecrets`.
    ImagePull,
}

impl SecretList {
    fn field(self) -> &'static str {
        match self {
            SecretList::Mountable => "secrets",
            SecretList::ImagePull => "imagePullSecrets",
        }
    }
}

/// ServiceAccount wraps a service account manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    resource: Resource,
}

impl From<Resource> for ServiceAccount {
    fn from(resource: Resource) -> Self {
        ServiceAccount { resource }
    }
}

impl ServiceAccount {
    pub fn new(doc: Value) -> Self {
        ServiceAccount::from(Resource::new(ResourceKind::ServiceAccount, doc))
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn document(&self) -> &Value {
        self.resource.document()
    }

    pub fn into_document(self) -> Value {
        self.resource.into_document()
    }

    fn entries(&self, list: SecretList) -> &[Value] {
        self.resource
            .field(list.field())
            .and_then(Value::as_list)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the names in a secret list, in order.
    pub fn secret_names(&self, list: SecretList) -> Vec<&str> {
        self.entries(list)
            .iter()
            .filter_map(|e| e.as_map().and_then(|m| m.get("name")).and_then(Value::as_str))
            .collect()
    }

    pub fn secrets(&self) -> Vec<&str> {
        self.secret_names(SecretList::Mountable)
    }

    pub fn image_pull_secrets(&self) -> Vec<&str> {
        self.secret_names(SecretList::ImagePull)
    }

    /// Returns the position of the named secret.
    pub fn find_secret(&self, list: SecretList, name: &str) -> Option<usize> {
        self.entries(list).iter().position(|e| {
            e.as_map()
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                == Some(name)
        })
    }

    /// Appends `{name: <name>}` unless the secret is already linked.
    pub fn add_secret(&mut self, list: SecretList, name: &str) -> bool {
        if self.find_secret(list, name).is_some() {
            return false;
        }
        let mut entry = Map::new();
        entry.set("name", Value::from(name));

        let Ok(path) = self.resource.field_path(list.field()) else {
            return false;
        };
        match self.resource.get_mut(path).and_then(Value::as_list_mut) {
            Some(entries) => {
                entries.push(Value::Map(entry));
                true
            }
            None => self.resource.set(path, Value::List(vec![Value::Map(entry)])),
        }
    }

    /// Unlinks the named secret. Returns false when it was not linked.
    pub fn delete_secret(&mut self, list: SecretList, name: &str) -> bool {
        let Some(idx) = self.find_secret(list, name) else {
            return false;
        };
        let Ok(path) = self.resource.field_path(list.field()) else {
            return false;
        };
        self.resource.remove(&path.with(Step::index(idx as i64)))
    }
}
