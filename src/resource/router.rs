//! The router: a deployment config and a service created together by
//! `oadm router`.

use super::{DeploymentConfig, DryRun};
use crate::cli::{OptionSet, ScopedFile};
use crate::diff::SkipKeys;
use crate::error::{Error, Result};
use std::path::Path as FsPath;

/// Service keys the server fills in on its own.
pub const SERVICE_SKIP: [&str; 4] = ["portalIP", "clusterIP", "sessionAffinity", "type"];

/// Deployment config keys that differ between a dry run and a live object.
pub const DEPLOYMENT_CONFIG_SKIP: [&str; 8] = [
    "dnsPolicy",
    "terminationGracePeriodSeconds",
    "restartPolicy",
    "timeoutSeconds",
    "livenessProbe",
    "readinessProbe",
    "terminationMessagePath",
    "rollingParams",
];

/// Environment variable holding the generated stats password.
pub const STATS_PASSWORD: &str = "STATS_PASSWORD";

/// RouterConfig is the desired state of a router, kept as the option set
/// passed to `oadm router`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub name: String,
    pub namespace: String,
    pub options: OptionSet,
}

impl RouterConfig {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        RouterConfig {
            name: name.into(),
            namespace: namespace.into(),
            options: OptionSet::new(),
        }
    }

    /// Sets a flag passed to the tool.
    pub fn option(&mut self, name: &str, value: Option<impl ToString>) -> &mut Self {
        self.options.set(name, value, true);
        self
    }

    /// Sets a PEM source file. Files are combined into `--default-cert`
    /// rather than passed on their own.
    pub fn cert_files(
        &mut self,
        cert: Option<&FsPath>,
        key: Option<&FsPath>,
        cacert: Option<&FsPath>,
    ) -> &mut Self {
        let show = |p: Option<&FsPath>| p.map(|p| p.display().to_string());
        self.options.set("cert_file", show(cert), false);
        self.options.set("key_file", show(key), false);
        self.options.set("cacert_file", show(cacert), false);
        self
    }

    pub fn stats_password(&self) -> Option<&str> {
        self.options.value("stats_password").filter(|p| !p.is_empty())
    }

    /// Writes certificate, key and the optional CA into one scoped PEM file.
    /// Returns `None` when no certificate was configured.
    pub fn default_cert(&self) -> Result<Option<ScopedFile>> {
        let (cert, key) = match (self.options.value("cert_file"), self.options.value("key_file")) {
            (None, None) => return Ok(None),
            (Some(cert), Some(key)) => (cert, key),
            _ => return Err(Error::config("cert_file and key_file must be given together")),
        };

        let read = |path: &str| {
            std::fs::read_to_string(path).map_err(|e| Error::config(format!("cannot read {}: {}", path, e)))
        };
        let mut pem = read(cert)?;
        pem.push_str(&read(key)?);
        if let Some(cacert) = self.options.value("cacert_file") {
            if FsPath::new(cacert).exists() {
                pem.push_str(&read(cacert)?);
            }
        }
        ScopedFile::with_contents(&self.name, ".pem", &pem).map(Some)
    }

    /// Renders the `oadm router` arguments.
    pub fn args(&self, default_cert: Option<&ScopedFile>, dry_run: bool) -> Vec<String> {
        let mut args = vec![
            "router".to_string(),
            self.name.clone(),
            "-n".to_string(),
            self.namespace.clone(),
        ];
        args.extend(self.options.to_args());
        if let Some(pem) = default_cert {
            args.push(format!("--default-cert={}", pem.arg()));
        }
        if dry_run {
            args.extend(["--dry-run=true", "-o", "json"].map(String::from));
        }
        args
    }

    /// Makes a dry run comparable with the live parts: ports get their
    /// default protocol and, unless a password was requested, the live
    /// generated stats password is carried over.
    pub fn normalize(&self, dry: &mut DryRun, live: &DeploymentConfig) {
        dry.default_protocols();
        if self.stats_password().is_some() {
            return;
        }
        if let Some(password) = live.env_value(STATS_PASSWORD) {
            dry.deployment_config
                .set_env_value(STATS_PASSWORD, password.clone());
        }
    }
}

pub fn service_skip_keys() -> SkipKeys {
    SERVICE_SKIP.into_iter().collect()
}

pub fn deployment_config_skip_keys() -> SkipKeys {
    DEPLOYMENT_CONFIG_SKIP.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff;
    use crate::value::{self, Value};
    use pretty_assertions::assert_eq;

    const DRY_RUN: &str = r#"password: Xy12
{"kind":"List","items":[
  {"kind":"DeploymentConfig","metadata":{"name":"router"},
   "spec":{"replicas":1,"template":{"spec":{"containers":[{
     "name":"router","image":"openshift/origin-haproxy-router",
     "env":[{"name":"ROUTER_SERVICE_NAME","value":"router"},{"name":"STATS_PASSWORD","value":"Xy12"}],
     "ports":[{"containerPort":80},{"containerPort":443,"protocol":"TCP"}]}]}}}},
  {"kind":"Service","metadata":{"name":"router"},
   "spec":{"ports":[{"name":"80-tcp","port":80}],"selector":{"router":"router"}}}
]}"#;

    const LIVE_DC: &str = r#"{"kind":"DeploymentConfig","metadata":{"name":"router"},
   "spec":{"replicas":1,"template":{"spec":{"dnsPolicy":"ClusterFirst","containers":[{
     "name":"router","image":"openshift/origin-haproxy-router",
     "terminationMessagePath":"/dev/termination-log",
     "env":[{"name":"ROUTER_SERVICE_NAME","value":"router"},{"name":"STATS_PASSWORD","value":"live"}],
     "ports":[{"containerPort":80,"protocol":"TCP"},{"containerPort":443,"protocol":"TCP"}]}]}}}}"#;

    const LIVE_SVC: &str = r#"{"kind":"Service","metadata":{"name":"router"},
   "spec":{"ports":[{"name":"80-tcp","port":80,"protocol":"TCP"}],"selector":{"router":"router"},
           "clusterIP":"172.30.0.1","portalIP":"172.30.0.1","sessionAffinity":"None","type":"ClusterIP"}}"#;

    #[test]
    fn test_args() {
        let mut config = RouterConfig::new("router", "default");
        config
            .option("replicas", Some(2))
            .option("service_account", Some("router"))
            .option("stats_password", None::<String>);
        config.cert_files(Some(FsPath::new("/etc/cert.pem")), None, None);

        assert_eq!(
            config.args(None, true),
            vec![
                "router",
                "router",
                "-n",
                "default",
                "--replicas=2",
                "--service-account=router",
                "--dry-run=true",
                "-o",
                "json"
            ]
        );
        assert_eq!(config.stats_password(), None);
    }

    #[test]
    fn test_default_cert_combines_pem() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        std::fs::write(&cert, "CERT\n").unwrap();
        std::fs::write(&key, "KEY\n").unwrap();

        let mut config = RouterConfig::new("router", "default");
        config.cert_files(Some(&cert), Some(&key), Some(&dir.path().join("missing-ca.pem")));
        let pem = config.default_cert().unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(pem.path()).unwrap(), "CERT\nKEY\n");
        assert!(config
            .args(Some(&pem), false)
            .contains(&format!("--default-cert={}", pem.arg())));
    }

    #[test]
    fn test_default_cert_needs_key() {
        let mut config = RouterConfig::new("router", "default");
        assert!(config.default_cert().unwrap().is_none());
        config.cert_files(Some(FsPath::new("/etc/cert.pem")), None, None);
        assert!(matches!(config.default_cert(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_dry_run() {
        let dry = DryRun::parse(DRY_RUN, "oadm router").unwrap();
        assert_eq!(dry.service.ports().len(), 1);
        assert_eq!(dry.deployment_config.env_value(STATS_PASSWORD), Some(&Value::from("Xy12")));
    }

    #[test]
    fn test_parse_dry_run_rejects_short_lists() {
        let err = DryRun::parse("pw\n{\"items\":[{}]}", "oadm router").unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }));
        let err = DryRun::parse("pw\nnot json", "oadm router").unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }));
    }

    #[test]
    fn test_normalized_dry_run_matches_live() {
        let live_dc = DeploymentConfig::new(value::from_json(LIVE_DC).unwrap());
        let live_svc = value::from_json(LIVE_SVC).unwrap();

        let mut dry = DryRun::parse(DRY_RUN, "oadm router").unwrap();
        assert!(!diff::equal(dry.service.document(), &live_svc, &service_skip_keys()));

        RouterConfig::new("router", "default").normalize(&mut dry, &live_dc);
        assert!(diff::equal(dry.service.document(), &live_svc, &service_skip_keys()));
        assert!(diff::equal(
            dry.deployment_config.document(),
            live_dc.document(),
            &deployment_config_skip_keys()
        ));
    }

    #[test]
    fn test_requested_password_is_compared() {
        let live_dc = DeploymentConfig::new(value::from_json(LIVE_DC).unwrap());
        let mut dry = DryRun::parse(DRY_RUN, "oadm router").unwrap();
        let mut config = RouterConfig::new("router", "default");
        config.option("stats_password", Some("requested"));
        config.normalize(&mut dry, &live_dc);
        assert!(!diff::equal(
            dry.deployment_config.document(),
            live_dc.document(),
            &deployment_config_skip_keys()
        ));
    }
}
