//! Crate-wide error type.

use crate::fieldpath::InvalidPathError;
use crate::value::{Map, Value};
use thiserror::Error;

/// Result type for reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error represents a fatal failure of an editing or reconcile step.
///
/// Absent keys and absent resources are not errors: they surface as
/// `None`/`false` or as the `Absent` state.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error("`{cmd}` exited with {returncode}: {stderr}")]
    ExternalTool {
        cmd: String,
        returncode: i32,
        stdout: String,
        stderr: String,
    },

    #[error("malformed output from `{cmd}`: {message}")]
    MalformedOutput { cmd: String, message: String },

    #[error("{0} was not found after it was written")]
    Vanished(String),

    #[error("{resource}: missing required field {field}")]
    MissingField { resource: String, field: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an external tool error from captured process output.
    pub fn external_tool(
        cmd: impl Into<String>,
        returncode: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Error::ExternalTool {
            cmd: cmd.into(),
            returncode,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a malformed output error.
    pub fn malformed_output(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedOutput {
            cmd: cmd.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        Error::MissingField {
            resource: resource.into(),
            field: field.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Returns the machine-readable report of a failed tool invocation:
    /// `returncode`, `cmd`, `stdout`, `stderr` and `msg`. Other errors have
    /// no captured output and return `None`.
    pub fn failure_report(&self) -> Option<Value> {
        let Error::ExternalTool {
            cmd,
            returncode,
            stdout,
            stderr,
        } = self
        else {
            return None;
        };
        let mut report = Map::new();
        report.set("failed", Value::Bool(true));
        report.set("returncode", Value::Int(i64::from(*returncode)));
        report.set("cmd", Value::from(cmd.as_str()));
        report.set("stdout", Value::from(stdout.as_str()));
        report.set("stderr", Value::from(stderr.as_str()));
        report.set("msg", Value::from(self.to_string()));
        Some(Value::Map(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_display() {
        let err = Error::external_tool("oc get route r1", 1, "", "forbidden");
        assert_eq!(err.to_string(), "`oc get route r1` exited with 1: forbidden");
    }

    #[test]
    fn test_failure_report() {
        let err = Error::external_tool("oc get route r1", 2, "partial", "forbidden");
        let report = serde_json::to_value(err.failure_report().unwrap()).unwrap();
        assert_eq!(report["failed"], true);
        assert_eq!(report["returncode"], 2);
        assert_eq!(report["cmd"], "oc get route r1");
        assert_eq!(report["stdout"], "partial");
        assert_eq!(report["stderr"], "forbidden");

        assert!(Error::config("bad").failure_report().is_none());
    }

    #[test]
    fn test_invalid_path_converts() {
        let err: Error = crate::fieldpath::Path::parse("a..b").unwrap_err().into();
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}
