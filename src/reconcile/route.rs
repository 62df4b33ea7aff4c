//! Route reconciliation: create from a full manifest, update in place.

use super::driver::{absorb_not_found, Reconcile};
use crate::cli::{CommandRunner, OpenShiftCli};
use crate::diff::{self, SkipKeys};
use crate::error::{Error, Result};
use crate::resource::{ResourceKind, Route, RouteConfig};
use crate::value::{Map, Value};

const KIND: ResourceKind = ResourceKind::Route;

/// RouteReconciler drives one route towards a [`RouteConfig`].
pub struct RouteReconciler<R> {
    oc: OpenShiftCli<R>,
    config: RouteConfig,
    live: Option<Route>,
}

impl<R: CommandRunner> RouteReconciler<R> {
    pub fn new(runner: R, config: RouteConfig) -> Self {
        RouteReconciler {
            oc: OpenShiftCli::new(config.namespace.clone(), runner),
            config,
            live: None,
        }
    }

    /// The route loaded by the last fetch.
    pub fn live(&self) -> Option<&Route> {
        self.live.as_ref()
    }
}

impl<R: CommandRunner> Reconcile for RouteReconciler<R> {
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
            .ok_or_else(|| Error::malformed_output(&result.cmd, "no route returned"))?;
        self.live = Some(Route::new(doc));
        Ok(result.results)
    }

    fn exists(&self) -> bool {
        self.live.is_some()
    }

    fn create(&mut self) -> Result<Value> {
        let route = self.config.to_route();
        let result = self
            .oc
            .create_from_content(&self.config.name, route.document())?
            .check()?;
        Ok(result.to_value())
    }

    fn needs_update(&mut self) -> Result<bool> {
        let Some(live) = &self.live else {
            return Ok(true);
        };
        let desired = self.config.to_route();
        Ok(!diff::equal(desired.document(), live.document(), &SkipKeys::new()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{RawOutput, ScriptedRunner};
    use crate::edit;
    use crate::fieldpath::Path;
    use crate::reconcile::{Desired, Driver, State};
    use crate::value::{from_json, from_yaml};
    use pretty_assertions::assert_eq;

    const LIVE: &str = r#"{"apiVersion":"v1","kind":"Route",
        "metadata":{"name":"r1","namespace":"web","resourceVersion":"42"},
        "spec":{"host":"a.com","to":{"kind":"Service","name":"svc"}},
        "status":{"ingress":[]}}"#;

    fn config(host: &str) -> RouteConfig {
        let mut config = RouteConfig::new("r1", "web");
        config.host = Some(host.to_string());
        config.service_name = Some("svc".to_string());
        config
    }

    fn not_found() -> RawOutput {
        RawOutput::failure(1, r#"Error from server: routes "r1" not found"#)
    }

    #[test]
    fn test_create_then_matching() {
        let runner = ScriptedRunner::new([
            not_found(),
            RawOutput::success(r#"route "r1" created"#),
            RawOutput::success(LIVE),
        ]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));
        let outcome = Driver::new().run(&mut route, Desired::Present).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.state, State::PresentMatching);
        assert_eq!(outcome.results, Value::List(vec![from_json(LIVE).unwrap()]));

        let calls = runner.calls();
        assert_eq!(calls[1].args[0], "create");
        let sent = from_yaml(calls[1].manifest.as_deref().unwrap()).unwrap();
        assert_eq!(sent, config("a.com").to_route().document().clone());
        assert_eq!(runner.remaining(), 0);
    }

    #[test]
    fn test_matching_route_is_left_alone() {
        let runner = ScriptedRunner::new([RawOutput::success(LIVE)]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));
        let outcome = Driver::new().ensure_present(&mut route).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.state, State::PresentMatching);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_drifted_route_is_replaced() {
        let runner = ScriptedRunner::new([
            RawOutput::success(LIVE),
            RawOutput::success(LIVE),
            RawOutput::success(r#"route "r1" replaced"#),
            RawOutput::success(LIVE.replace("a.com", "b.com")),
        ]);
        let mut route = RouteReconciler::new(&runner, config("b.com"));
        let outcome = Driver::new().ensure_present(&mut route).unwrap();
        assert!(outcome.changed);
        assert_eq!(route.live().and_then(Route::host), Some("b.com"));

        let calls = runner.calls();
        assert_eq!(calls[2].args[2], "replace");
        let sent = from_yaml(calls[2].manifest.as_deref().unwrap()).unwrap();
        let host = Path::parse("spec.host").unwrap();
        assert_eq!(edit::get(&sent, &host), Some(&Value::from("b.com")));
        let version = Path::parse("metadata.resourceVersion").unwrap();
        assert_eq!(edit::get(&sent, &version), Some(&Value::from("42")));
    }

    #[test]
    fn test_drift_without_applicable_edit_is_not_a_change() {
        // The server added a key the desired route never sets, so the
        // comparison sees drift that no route edit can remove.
        let live = LIVE.replace(r#""to":{"#, r#""wildcardPolicy":"None","to":{"#);
        let runner = ScriptedRunner::new([RawOutput::success(live.clone()), RawOutput::success(live)]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));
        let outcome = Driver::new().ensure_present(&mut route).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.state, State::PresentDrifted);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| call.args[0] == "get"));
    }

    #[test]
    fn test_fetch_failure_is_fatal() {
        let runner = ScriptedRunner::new([RawOutput::failure(1, "Unauthorized")]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));
        let err = Driver::new().ensure_present(&mut route).unwrap_err();
        assert!(matches!(err, Error::ExternalTool { returncode: 1, .. }));
    }

    #[test]
    fn test_absent_and_list() {
        let runner = ScriptedRunner::new([not_found(), not_found()]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));

        let outcome = Driver::new().ensure_absent(&mut route).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.state, State::Absent);
        assert_eq!(outcome.results, from_json("[{}]").unwrap());

        let outcome = Driver::new().list(&mut route).unwrap();
        assert_eq!(outcome.results, from_json("[{}]").unwrap());
    }

    #[test]
    fn test_delete() {
        let runner = ScriptedRunner::new([
            RawOutput::success(LIVE),
            RawOutput::success(r#"route "r1" deleted"#),
        ]);
        let mut route = RouteReconciler::new(&runner, config("a.com"));
        let outcome = Driver::new().ensure_absent(&mut route).unwrap();
        assert!(outcome.changed);
        assert_eq!(runner.calls()[1].args, vec!["delete", "route", "r1", "-n", "web"]);
    }
}
