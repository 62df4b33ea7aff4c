//! oc-reconcile - Reconciles OpenShift resources through the `oc` CLI
//!
//! Every reconcile prints a JSON outcome on stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use oc_reconcile::cli::ProcessRunner;
use oc_reconcile::config::Config;
use oc_reconcile::diff::{self, SkipKeys};
use oc_reconcile::edit::Editor;
use oc_reconcile::fieldpath::Path;
use oc_reconcile::reconcile::{
    Desired, Driver, Outcome, ProjectReconciler, RegistryReconciler, RouteReconciler,
    RouterReconciler, SecretsReconciler,
};
use oc_reconcile::resource::{
    CertSource, ProjectConfig, RegistryConfig, RegistryVolume, RouteConfig, RouteTls, RouterConfig,
    SecretList, Termination,
};
use oc_reconcile::{value, Edit, Error};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "oc-reconcile", version, about = "Reconcile OpenShift resources through the oc CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "OC_RECONCILE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    #[arg(long, global = true)]
    oc_binary: Option<PathBuf>,

    #[arg(long, global = true)]
    oadm_binary: Option<PathBuf>,

    /// Seconds to wait between deleting and recreating a router
    #[arg(long, global = true)]
    settle_delay: Option<u64>,

    /// Report what would change without changing anything
    #[arg(long, global = true)]
    check: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile a route
    Route(RouteArgs),
    /// Link secrets to a service account
    Secrets(SecretsArgs),
    /// Reconcile the router deployment config and service
    Router(RouterArgs),
    /// Reconcile the registry deployment config and service
    Registry(RegistryArgs),
    /// Reconcile a project created with oadm new-project
    Project(ProjectArgs),
    /// Read or edit a manifest file by path
    #[command(subcommand)]
    Edit(EditCommand),
    /// Compare an expected manifest with an actual one
    Compare {
        #[arg(long)]
        expected: PathBuf,
        #[arg(long)]
        actual: PathBuf,
        /// Additional keys to ignore at every level
        #[arg(long)]
        skip: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct RouteArgs {
    #[arg(long)]
    name: String,
    /// Defaults to the configured namespace
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long, default_value = "present")]
    state: Desired,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    service_name: Option<String>,
    #[arg(long)]
    tls_termination: Option<Termination>,
    #[arg(long, conflicts_with = "cert_content")]
    cert_path: Option<PathBuf>,
    #[arg(long)]
    cert_content: Option<String>,
    #[arg(long, conflicts_with = "key_content")]
    key_path: Option<PathBuf>,
    #[arg(long)]
    key_content: Option<String>,
    #[arg(long, conflicts_with = "cacert_content")]
    cacert_path: Option<PathBuf>,
    #[arg(long)]
    cacert_content: Option<String>,
    #[arg(long, conflicts_with = "dest_cacert_content")]
    dest_cacert_path: Option<PathBuf>,
    #[arg(long)]
    dest_cacert_content: Option<String>,
}

#[derive(Debug, Args)]
struct SecretsArgs {
    /// Service account name
    #[arg(long)]
    name: String,
    /// Defaults to the configured namespace
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long, default_value = "present")]
    state: Desired,
    #[arg(long = "secret")]
    secrets: Vec<String>,
    /// Manage imagePullSecrets instead of secrets
    #[arg(long)]
    image_pull: bool,
}

#[derive(Debug, Args)]
struct RouterArgs {
    #[arg(long, default_value = "router")]
    name: String,
    /// Defaults to the configured namespace
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long, default_value = "present")]
    state: Desired,
    #[arg(long)]
    cert_file: Option<PathBuf>,
    #[arg(long)]
    key_file: Option<PathBuf>,
    #[arg(long)]
    cacert_file: Option<PathBuf>,
    #[arg(long)]
    stats_password: Option<String>,
    #[arg(long)]
    stats_port: Option<u16>,
    #[arg(long)]
    images: Option<String>,
    #[arg(long, default_value_t = 1)]
    replicas: u32,
    #[arg(long, default_value = "router")]
    service_account: String,
    #[arg(long, default_values = ["80:80", "443:443"])]
    ports: Vec<String>,
    #[arg(long)]
    selector: Option<String>,
    #[arg(long)]
    labels: Option<String>,
}

#[derive(Debug, Args)]
struct RegistryArgs {
    #[arg(long, default_value = "docker-registry")]
    name: String,
    /// Defaults to the configured namespace
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long, default_value = "present")]
    state: Desired,
    #[arg(long)]
    credentials: Option<String>,
    #[arg(long)]
    images: Option<String>,
    #[arg(long)]
    latest_images: bool,
    #[arg(long)]
    labels: Option<String>,
    #[arg(long, default_value = "5000")]
    ports: String,
    #[arg(long, default_value_t = 1)]
    replicas: u32,
    #[arg(long)]
    selector: Option<String>,
    #[arg(long, default_value = "registry")]
    service_account: String,
    #[arg(long)]
    mount_host: Option<String>,
    #[arg(long)]
    volume: Option<String>,
    #[arg(long)]
    template: Option<String>,
    /// Container environment variable, KEY=VALUE
    #[arg(long = "env")]
    env_vars: Vec<String>,
    /// YAML list of volumes, e.g. [{name: certs, type: secret, secret_name: c, path: /certs}]
    #[arg(long)]
    volume_mounts: Option<String>,
    /// Deployment config edit, PATH=YAML
    #[arg(long = "edit")]
    edits: Vec<String>,
    /// Rewrite the registry even when it matches
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct ProjectArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "present")]
    state: Desired,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    admin: Option<String>,
    #[arg(long)]
    admin_role: Option<String>,
    /// Comma separated labels, e.g. region=infra
    #[arg(long)]
    node_selector: Option<String>,
}

#[derive(Debug, Subcommand)]
enum EditCommand {
    /// Print the value at a path
    Get {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        key: String,
    },
    /// Set the value at a path; the value is parsed as YAML
    Put {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Remove the value at a path
    Delete {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        key: String,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        match fs::File::create(&cli.output) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error: Failed to create output file {:?}: {}", cli.output, e);
                return ExitCode::FAILURE;
            }
        }
    };

    let failure = match run(cli) {
        Ok(report) => match write_report(&mut output, &report) {
            Ok(()) => return ExitCode::SUCCESS,
            Err(e) => e,
        },
        Err(e) => {
            let report = e.downcast_ref::<Error>().and_then(Error::failure_report);
            if let Some(report) = report {
                if let Err(write_err) = write_report(&mut output, &report) {
                    eprintln!("Error: {}", write_err);
                }
            }
            e
        }
    };
    eprintln!("Error: {}", failure);
    ExitCode::FAILURE
}

fn write_report(output: &mut dyn Write, report: &impl Serialize) -> CliResult<()> {
    writeln!(output, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> CliResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if let Some(kubeconfig) = &cli.kubeconfig {
        config.kubeconfig = kubeconfig.clone();
    }
    if let Some(oc) = &cli.oc_binary {
        config.oc_binary = oc.clone();
    }
    if let Some(oadm) = &cli.oadm_binary {
        config.oadm_binary = oadm.clone();
    }
    if let Some(delay) = cli.settle_delay {
        config.settle_delay = delay;
    }
    config.verbose |= cli.verbose;
    Ok(config)
}

fn run(cli: Cli) -> CliResult<serde_json::Value> {
    let config = load_config(&cli)?;
    init_logging(config.verbose);

    let driver = Driver::new().check_mode(cli.check);
    let report = match cli.command {
        Command::Route(args) => serde_json::to_value(route(&config, driver, args)?)?,
        Command::Secrets(args) => serde_json::to_value(secrets(&config, driver, args)?)?,
        Command::Router(args) => serde_json::to_value(router(&config, driver, args)?)?,
        Command::Registry(args) => serde_json::to_value(registry(&config, driver, args)?)?,
        Command::Project(args) => serde_json::to_value(project(&config, driver, args)?)?,
        Command::Edit(command) => edit(command, cli.check)?,
        Command::Compare {
            expected,
            actual,
            skip,
        } => compare(&expected, &actual, skip)?,
    };

    Ok(report)
}

fn namespace(config: &Config, namespace: Option<String>) -> String {
    namespace.unwrap_or_else(|| config.namespace.clone())
}

fn cert_source(path: Option<PathBuf>, content: Option<String>) -> Option<CertSource> {
    path.map(CertSource::File).or(content.map(CertSource::Inline))
}

fn route(config: &Config, mut driver: Driver, args: RouteArgs) -> CliResult<Outcome> {
    let mut route = RouteConfig::new(args.name, namespace(config, args.namespace));
    route.host = args.host;
    route.service_name = args.service_name;
    if let Some(termination) = args.tls_termination {
        route.tls = Some(RouteTls::load(
            termination,
            cert_source(args.cert_path, args.cert_content).as_ref(),
            cert_source(args.key_path, args.key_content).as_ref(),
            cert_source(args.cacert_path, args.cacert_content).as_ref(),
            cert_source(args.dest_cacert_path, args.dest_cacert_content).as_ref(),
        )?);
    }

    let mut reconciler = RouteReconciler::new(ProcessRunner::new(config), route);
    Ok(driver.run(&mut reconciler, args.state)?)
}

fn secrets(config: &Config, mut driver: Driver, args: SecretsArgs) -> CliResult<Outcome> {
    let list = if args.image_pull {
        SecretList::ImagePull
    } else {
        SecretList::Mountable
    };
    let mut reconciler = SecretsReconciler::new(
        ProcessRunner::new(config),
        namespace(config, args.namespace),
        args.name,
        args.secrets,
        list,
    );
    Ok(driver.run(&mut reconciler, args.state)?)
}

fn router(config: &Config, mut driver: Driver, args: RouterArgs) -> CliResult<Outcome> {
    let mut router = RouterConfig::new(args.name, namespace(config, args.namespace));
    router
        .option("images", args.images)
        .option("replicas", Some(args.replicas))
        .option("service_account", Some(args.service_account))
        .option("ports", Some(args.ports.join(",")))
        .option("selector", args.selector)
        .option("labels", args.labels)
        .option("stats_password", args.stats_password)
        .option("stats_port", args.stats_port)
        .cert_files(
            args.cert_file.as_deref(),
            args.key_file.as_deref(),
            args.cacert_file.as_deref(),
        );

    let mut reconciler =
        RouterReconciler::new(ProcessRunner::new(config), router).settle_delay(config.settle_delay());
    Ok(driver.run(&mut reconciler, args.state)?)
}

fn registry(config: &Config, driver: Driver, args: RegistryArgs) -> CliResult<Outcome> {
    let mut registry = RegistryConfig::new(args.name, namespace(config, args.namespace));
    registry
        .option("credentials", args.credentials)
        .option("images", args.images)
        .option("latest_images", args.latest_images.then_some(true))
        .option("labels", args.labels)
        .option("ports", Some(args.ports))
        .option("replicas", Some(args.replicas))
        .option("selector", args.selector)
        .option("service_account", Some(args.service_account))
        .option("mount_host", args.mount_host)
        .option("volume", args.volume)
        .option("template", args.template);

    for var in &args.env_vars {
        let (name, value) = var
            .split_once('=')
            .ok_or_else(|| format!("environment variable {:?} is not KEY=VALUE", var))?;
        registry.env_vars.push((name.to_string(), value.to_string()));
    }
    if let Some(volumes) = &args.volume_mounts {
        registry.volumes = serde_yaml::from_str::<Vec<RegistryVolume>>(volumes)?;
    }
    for edit in &args.edits {
        let (path, value) = edit
            .split_once('=')
            .ok_or_else(|| format!("edit {:?} is not PATH=YAML", edit))?;
        registry
            .edits
            .push(Edit::put(Path::parse(path)?, value::from_yaml(value)?));
    }

    let mut driver = driver.force(args.force);
    let mut reconciler = RegistryReconciler::new(ProcessRunner::new(config), registry);
    Ok(driver.run(&mut reconciler, args.state)?)
}

fn project(config: &Config, mut driver: Driver, args: ProjectArgs) -> CliResult<Outcome> {
    let mut project = ProjectConfig::new(args.name);
    project
        .option("display_name", args.display_name)
        .option("description", args.description)
        .option("admin", args.admin)
        .option("admin_role", args.admin_role)
        .option("node_selector", args.node_selector);

    let mut reconciler = ProjectReconciler::new(ProcessRunner::new(config), project);
    Ok(driver.run(&mut reconciler, args.state)?)
}

fn edit(command: EditCommand, check: bool) -> CliResult<serde_json::Value> {
    match command {
        EditCommand::Get { file, key } => {
            let editor = Editor::load(&file)?;
            let found = editor.get(&key)?;
            Ok(json!({ "found": found.is_some(), "value": found }))
        }
        EditCommand::Put { file, key, value } => {
            let mut editor = Editor::load(&file)?;
            let changed = editor.put(&key, value::from_yaml(&value)?)?;
            if changed && !check {
                editor.write(&file)?;
            }
            Ok(json!({ "changed": changed }))
        }
        EditCommand::Delete { file, key } => {
            let mut editor = Editor::load(&file)?;
            let changed = editor.delete(&key)?;
            if changed && !check {
                editor.write(&file)?;
            }
            Ok(json!({ "changed": changed }))
        }
    }
}

fn compare(expected: &PathBuf, actual: &PathBuf, skip: Vec<String>) -> CliResult<serde_json::Value> {
    let read = |file: &PathBuf| -> CliResult<value::Value> {
        let content = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
        Ok(value::from_yaml(&content)?)
    };
    let expected = read(expected)?;
    let actual = read(actual)?;

    let skip: SkipKeys = skip.into_iter().collect();
    let mismatch = diff::compare(&expected, &actual, &skip);
    Ok(json!({
        "equal": mismatch.is_none(),
        "mismatch": mismatch.map(|m| m.to_string()),
    }))
}
