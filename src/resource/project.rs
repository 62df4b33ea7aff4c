//! Projects created with `oadm new-project`. Their descriptive settings
//! live in `openshift.io/` annotations.

use super::{Resource, ResourceKind};
use crate::cli::OptionSet;
use crate::edit::Edit;
use crate::fieldpath::{Path, Step};
use crate::value::{Map, Value};

/// Prefix of the annotations `oadm new-project` writes.
pub const ANNOTATION_PREFIX: &str = "openshift.io/";

/// Options that end up as annotations, with their annotation key.
const ANNOTATED_OPTIONS: [(&str, &str); 3] = [
    ("display_name", "display-name"),
    ("description", "description"),
    ("node_selector", "node-selector"),
];

/// Returns the path of `openshift.io/<key>` under `metadata#annotations`.
pub fn annotation_path(key: &str) -> Path {
    let annotations = ResourceKind::Project
        .fields()
        .path("annotations")
        .cloned()
        .unwrap_or_default();
    annotations.with(Step::key(format!("{}{}", ANNOTATION_PREFIX, key)))
}

/// ProjectConfig is the desired state of a project, kept as the option set
/// passed to `oadm new-project`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub options: OptionSet,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectConfig {
            name: name.into(),
            options: OptionSet::new(),
        }
    }

    /// Sets a flag: `display_name`, `description`, `node_selector`, `admin`
    /// or `admin_role`.
    pub fn option(&mut self, name: &str, value: Option<impl ToString>) -> &mut Self {
        self.options.set(name, value, true);
        self
    }

    /// Renders the `oadm new-project` arguments.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["new-project".to_string(), self.name.clone()];
        args.extend(self.options.to_args());
        args
    }

    /// Configured annotations as `(key, value)` pairs, keys without prefix.
    /// Options left unset are not managed.
    pub fn annotations(&self) -> Vec<(&'static str, &str)> {
        ANNOTATED_OPTIONS
            .iter()
            .filter_map(|(option, key)| self.options.value(option).map(|v| (*key, v)))
            .collect()
    }

    /// Edits that write every configured annotation.
    pub fn edits(&self) -> Vec<Edit> {
        self.annotations()
            .into_iter()
            .map(|(key, value)| Edit::put(annotation_path(key), value))
            .collect()
    }
}

/// Project wraps a project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    resource: Resource,
}

impl Project {
    pub fn new(doc: Value) -> Self {
        Project {
            resource: Resource::new(ResourceKind::Project, doc),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn document(&self) -> &Value {
        self.resource.document()
    }

    pub fn annotations(&self) -> Option<&Map> {
        self.resource.field("annotations").and_then(Value::as_map)
    }

    /// Reads `openshift.io/<key>`.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.resource.get(&annotation_path(key)).and_then(Value::as_str)
    }

    pub fn set_annotation(&mut self, key: &str, value: &str) -> bool {
        self.resource.set(&annotation_path(key), value)
    }

    pub fn remove_annotation(&mut self, key: &str) -> bool {
        self.resource.remove(&annotation_path(key))
    }

    /// Returns whether every configured annotation has its desired value.
    pub fn matches(&self, config: &ProjectConfig) -> bool {
        config
            .annotations()
            .into_iter()
            .all(|(key, value)| self.annotation(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;

    const PROJECT: &str = r#"{"kind":"Project","metadata":{"name":"web",
        "annotations":{"openshift.io/display-name":"Web","openshift.io/sa.scc.uid-range":"1000/10"}}}"#;

    fn config() -> ProjectConfig {
        let mut config = ProjectConfig::new("web");
        config
            .option("display_name", Some("Web"))
            .option("description", Some("Public site"))
            .option("node_selector", None::<String>)
            .option("admin", Some("alice"));
        config
    }

    #[test]
    fn test_args() {
        assert_eq!(
            config().args(),
            vec![
                "new-project",
                "web",
                "--display-name=Web",
                "--description=Public site",
                "--admin=alice"
            ]
        );
    }

    #[test]
    fn test_annotation_paths_keep_dots() {
        assert_eq!(
            annotation_path("display-name"),
            Path::parse("metadata#annotations#openshift.io/display-name").unwrap()
        );
        let project = Project::new(from_json(PROJECT).unwrap());
        assert_eq!(project.annotation("display-name"), Some("Web"));
        assert_eq!(project.annotation("description"), None);
        assert_eq!(project.annotations().map(Map::len), Some(2));
    }

    #[test]
    fn test_matches_only_configured_annotations() {
        let mut project = Project::new(from_json(PROJECT).unwrap());
        assert!(!project.matches(&config()));

        assert!(project.set_annotation("description", "Public site"));
        assert!(project.matches(&config()));

        assert!(project.remove_annotation("display-name"));
        assert!(!project.remove_annotation("display-name"));
        assert!(!project.matches(&config()));
    }

    #[test]
    fn test_edits_create_annotations() {
        let mut doc = from_json(r#"{"kind":"Project","metadata":{"name":"web"}}"#).unwrap();
        assert!(edit::apply_all(&mut doc, &config().edits()));
        let project = Project::new(doc);
        assert!(project.matches(&config()));
        assert_eq!(project.annotation("node-selector"), None);
    }
}
