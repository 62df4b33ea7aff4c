//! Wrapper around `oc`/`oadm` producing structured results.

use super::runner::CommandRunner;
use super::scoped::ScopedFile;
use crate::edit::{self, Edit};
use crate::error::{Error, Result};
use crate::value::{self, Map, Value};
use serde::Serialize;
use tracing::debug;

/// OutputFormat selects how stdout of a successful call is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Parse stdout as JSON.
    Json,
    /// Keep stdout as a string; the caller parses it.
    Raw,
}

/// CommandResult is the outcome of one tool invocation.
///
/// `stdout` and `stderr` are only kept for failed calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub returncode: i32,
    pub results: Value,
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.returncode == 0
    }

    /// Returns true for a failed call whose error says the object is absent.
    pub fn is_not_found(&self) -> bool {
        !self.is_success()
            && self
                .stderr
                .as_deref()
                .is_some_and(|e| e.contains("not found") || e.contains("NotFound"))
    }

    /// Returns the first element of a normalised `results` list.
    pub fn first(&self) -> Option<&Value> {
        self.results.as_list().and_then(|l| l.first())
    }

    /// Renders the result as a document for reporting.
    pub fn to_value(&self) -> Value {
        let mut m = Map::new();
        m.set("returncode", Value::Int(i64::from(self.returncode)));
        m.set("results", self.results.clone());
        m.set("cmd", Value::from(self.cmd.as_str()));
        if let Some(stdout) = &self.stdout {
            m.set("stdout", Value::from(stdout.as_str()));
        }
        if let Some(stderr) = &self.stderr {
            m.set("stderr", Value::from(stderr.as_str()));
        }
        Value::Map(m)
    }

    /// Turns a failed call into [`Error::ExternalTool`].
    pub fn check(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::external_tool(
            self.cmd,
            self.returncode,
            self.stdout.unwrap_or_default(),
            self.stderr.unwrap_or_default(),
        ))
    }
}

/// OpenShiftCli issues namespaced commands through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct OpenShiftCli<R> {
    namespace: String,
    runner: R,
}

impl<R: CommandRunner> OpenShiftCli<R> {
    pub fn new(namespace: impl Into<String>, runner: R) -> Self {
        OpenShiftCli {
            namespace: namespace.into(),
            runner,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fetches `kind/name`, or every object of `kind` when `name` is `None`.
    ///
    /// On success `results` is always a list: list responses contribute their
    /// `items`, single objects become a one-element list. Failures are
    /// returned as-is so callers can tell "not found" from real errors.
    pub fn get(&self, kind: &str, name: Option<&str>) -> Result<CommandResult> {
        let mut args = vec![
            "get".to_string(),
            kind.to_string(),
            "-o".to_string(),
            "json".to_string(),
            "-n".to_string(),
            self.namespace.clone(),
        ];
        if let Some(name) = name {
            args.push(name.to_string());
        }

        let mut result = self.openshift_cmd(&args, false, Some(OutputFormat::Json))?;
        if result.is_success() {
            result.results = normalize_results(std::mem::take(&mut result.results));
        }
        Ok(result)
    }

    /// Creates objects from a manifest file.
    pub fn create(&self, file: &ScopedFile) -> Result<CommandResult> {
        let args = vec![
            "create".to_string(),
            "-f".to_string(),
            file.arg(),
            "-n".to_string(),
            self.namespace.clone(),
        ];
        self.openshift_cmd(&args, false, None)
    }

    /// Serializes `doc` to a scoped manifest and creates it.
    pub fn create_from_content(&self, name: &str, doc: &Value) -> Result<CommandResult> {
        let file = ScopedFile::manifest(name, doc)?;
        self.create(&file)
    }

    /// Replaces objects with the contents of a manifest file.
    pub fn replace(&self, file: &ScopedFile, force: bool) -> Result<CommandResult> {
        let mut args = vec![
            "-n".to_string(),
            self.namespace.clone(),
            "replace".to_string(),
            "-f".to_string(),
            file.arg(),
        ];
        if force {
            args.push("--force".to_string());
        }
        self.openshift_cmd(&args, false, None)
    }

    /// Applies `edits` to the live `kind/name` and replaces it when at least
    /// one edit changed it. Returns `None` when nothing had to change.
    pub fn replace_content(
        &self,
        kind: &str,
        name: &str,
        edits: &[Edit],
        force: bool,
    ) -> Result<Option<CommandResult>> {
        let current = self.get(kind, Some(name))?.check()?;
        let mut doc = current
            .first()
            .cloned()
            .ok_or_else(|| Error::malformed_output(&current.cmd, "no object returned"))?;

        if !edit::apply_all(&mut doc, edits) {
            debug!(kind, name, "live object already carries every change");
            return Ok(None);
        }

        let file = ScopedFile::manifest(name, &doc)?;
        self.replace(&file, force).map(Some)
    }

    /// Replaces `kind/name` with a whole document.
    pub fn replace_document(&self, name: &str, doc: &Value, force: bool) -> Result<CommandResult> {
        let file = ScopedFile::manifest(name, doc)?;
        self.replace(&file, force)
    }

    pub fn delete(&self, kind: &str, name: &str) -> Result<CommandResult> {
        let args = vec![
            "delete".to_string(),
            kind.to_string(),
            name.to_string(),
            "-n".to_string(),
            self.namespace.clone(),
        ];
        self.openshift_cmd(&args, false, None)
    }

    /// Runs one command. With `output` set, stdout of a successful call is
    /// captured into `results`, parsed as JSON or kept raw.
    pub fn openshift_cmd(
        &self,
        args: &[String],
        admin: bool,
        output: Option<OutputFormat>,
    ) -> Result<CommandResult> {
        let cmd = self.runner.describe(admin, args);
        debug!(%cmd, "running");
        let raw = self.runner.run(admin, args)?;

        if raw.code != 0 {
            debug!(%cmd, code = raw.code, stderr = %raw.stderr.trim(), "command failed");
            return Ok(CommandResult {
                returncode: raw.code,
                results: Value::empty_map(),
                cmd,
                stdout: Some(raw.stdout),
                stderr: Some(raw.stderr),
            });
        }

        let results = match output {
            Some(OutputFormat::Json) => value::from_json(&raw.stdout)
                .map_err(|e| Error::malformed_output(&cmd, e.to_string()))?,
            Some(OutputFormat::Raw) => Value::String(raw.stdout),
            None => Value::String(String::new()),
        };

        Ok(CommandResult {
            returncode: 0,
            results,
            cmd,
            stdout: None,
            stderr: None,
        })
    }
}

fn normalize_results(results: Value) -> Value {
    match results {
        Value::Map(mut m) if m.has("items") => match m.delete("items") {
            Some(Value::List(items)) => Value::List(items),
            Some(other) => Value::List(vec![other]),
            None => Value::List(Vec::new()),
        },
        Value::List(items) => Value::List(items),
        other => Value::List(vec![other]),
    }
}
