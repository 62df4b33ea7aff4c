//! Reconcile states and the outcome reported to callers.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// State is what the driver knows about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum State {
    /// Not fetched yet, or present but not compared.
    #[default]
    Unknown,
    Absent,
    PresentMatching,
    PresentDrifted,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Unknown => "unknown",
            State::Absent => "absent",
            State::PresentMatching => "present (matching)",
            State::PresentDrifted => "present (drifted)",
        };
        f.write_str(s)
    }
}

/// Desired is what the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Desired {
    #[default]
    Present,
    Absent,
    /// Only report the live state.
    List,
}

impl FromStr for Desired {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(Desired::Present),
            "absent" => Ok(Desired::Absent),
            "list" => Ok(Desired::List),
            other => Err(Error::config(format!(
                "unknown state {:?}, expected present, absent or list",
                other
            ))),
        }
    }
}

/// Outcome is the report of one reconcile. Failures are reported as
/// errors instead, so `returncode` is always 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub returncode: i32,
    pub changed: bool,
    pub state: State,
    pub results: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Outcome {
    pub fn unchanged(state: State, results: Value) -> Self {
        Outcome {
            returncode: 0,
            changed: false,
            state,
            results,
            msg: None,
        }
    }

    pub fn changed(state: State, results: Value) -> Self {
        Outcome {
            returncode: 0,
            changed: true,
            state,
            results,
            msg: None,
        }
    }

    /// Reports a mutation skipped in check mode.
    pub fn would(state: State, action: &str) -> Self {
        Outcome {
            returncode: 0,
            changed: false,
            state,
            results: Value::empty_map(),
            msg: Some(format!("Would have performed {}.", action)),
        }
    }
}
