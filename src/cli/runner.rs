//! Process execution seam for the cluster command-line tools.

use crate::config::Config;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// RawOutput is what a finished tool invocation left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RawOutput {
    /// A successful invocation printing `stdout`.
    pub fn success(stdout: impl Into<String>) -> Self {
        RawOutput {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation printing `stderr`.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        RawOutput {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// CommandRunner runs one tool invocation to completion.
///
/// `admin` selects the administrative tool (`oadm`) instead of `oc`.
pub trait CommandRunner {
    fn run(&self, admin: bool, args: &[String]) -> io::Result<RawOutput>;

    /// Renders the command line for logs and error reports.
    fn describe(&self, admin: bool, args: &[String]) -> String {
        let tool = if admin { "oadm" } else { "oc" };
        std::iter::once(tool.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, admin: bool, args: &[String]) -> io::Result<RawOutput> {
        (**self).run(admin, args)
    }

    fn describe(&self, admin: bool, args: &[String]) -> String {
        (**self).describe(admin, args)
    }
}

/// ProcessRunner spawns the real binaries and waits for them.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    oc_binary: PathBuf,
    oadm_binary: PathBuf,
    kubeconfig: PathBuf,
}

impl ProcessRunner {
    pub fn new(config: &Config) -> Self {
        ProcessRunner {
            oc_binary: config.oc_binary.clone(),
            oadm_binary: config.oadm_binary.clone(),
            kubeconfig: config.kubeconfig.clone(),
        }
    }

    fn binary(&self, admin: bool) -> &PathBuf {
        if admin {
            &self.oadm_binary
        } else {
            &self.oc_binary
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, admin: bool, args: &[String]) -> io::Result<RawOutput> {
        let output = Command::new(self.binary(admin))
            .args(args)
            .env("KUBECONFIG", &self.kubeconfig)
            .stdin(Stdio::null())
            .output()?;

        Ok(RawOutput {
            // Killed by a signal: report like a shell would.
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn describe(&self, admin: bool, args: &[String]) -> String {
        std::iter::once(self.binary(admin).display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Invocation recorded by [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub admin: bool,
    pub args: Vec<String>,
    /// Contents of the file passed with `-f`, read at call time since
    /// scoped manifests are gone once the call returns.
    pub manifest: Option<String>,
}

/// ScriptedRunner replays canned outputs in order and records every call.
///
/// Useful to drive reconciles without a cluster.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: RefCell<VecDeque<RawOutput>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new(replies: impl IntoIterator<Item = RawOutput>) -> Self {
        ScriptedRunner {
            replies: RefCell::new(replies.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Queues another reply.
    pub fn push(&self, reply: RawOutput) {
        self.replies.borrow_mut().push_back(reply);
    }

    /// Returns the invocations seen so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Returns the number of replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, admin: bool, args: &[String]) -> io::Result<RawOutput> {
        let manifest = args
            .iter()
            .position(|a| a == "-f")
            .and_then(|i| args.get(i + 1))
            .and_then(|file| std::fs::read_to_string(file).ok());
        self.calls.borrow_mut().push(Invocation {
            admin,
            args: args.to_vec(),
            manifest,
        });
        self.replies.borrow_mut().pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted reply for `{}`", self.describe(admin, args)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_describe() {
        let runner = ScriptedRunner::default();
        assert_eq!(runner.describe(false, &args(&["get", "route"])), "oc get route");
        assert_eq!(runner.describe(true, &args(&["router"])), "oadm router");
    }

    #[test]
    fn test_scripted_runner_replays_in_order() {
        let runner = ScriptedRunner::new([RawOutput::success("one"), RawOutput::failure(1, "two")]);
        assert_eq!(runner.run(false, &args(&["a"])).unwrap().stdout, "one");
        assert_eq!(runner.run(true, &args(&["b"])).unwrap().stderr, "two");
        assert!(runner.run(false, &args(&["c"])).is_err());

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].admin);
        assert_eq!(calls[0].args, args(&["a"]));
    }

    #[test]
    fn test_process_runner_reports_exit_code() {
        let config = Config {
            oc_binary: PathBuf::from("false"),
            ..Config::default()
        };
        let runner = ProcessRunner::new(&config);
        // `false` may live anywhere on PATH; only check when it ran.
        if let Ok(out) = runner.run(false, &[]) {
            assert_ne!(out.code, 0);
        }
    }
}
