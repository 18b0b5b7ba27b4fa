//! kubespec CLI - Query and lint manifests against Kubernetes API schemas

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "kubespec")]
#[command(author = "kubespec Contributors")]
#[command(version)]
#[command(about = "Query and lint manifests against Kubernetes and OpenShift API schemas", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: <config dir>/kubespec/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding <package>-<version>.zip bundles
    #[arg(long, global = true, env = "KUBESPEC_BUNDLES", value_name = "DIR")]
    pub bundles: Option<PathBuf>,

    /// Kubernetes schema version ("latest" for the default)
    #[arg(long, global = true, value_name = "VERSION")]
    pub kubernetes_version: Option<String>,

    /// OpenShift schema version, enables OpenShift ("latest" for the default)
    #[arg(long, global = true, value_name = "VERSION")]
    pub openshift_version: Option<String>,

    /// Include OpenShift schemas
    #[arg(long, global = true)]
    pub openshift: bool,

    /// Exclude Kubernetes schemas
    #[arg(long, global = true)]
    pub no_kubernetes: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the API versions of the active schemas
    Versions,

    /// List the resource kinds that can be created
    Kinds {
        /// Only kinds of this API version
        #[arg(long)]
        api_version: Option<String>,
    },

    /// Show the properties available under a field path
    Model {
        /// API version (e.g., "v1", "batch/v1")
        api_version: String,

        /// Resource kind (e.g., "Pod")
        kind: String,

        /// Field path, as separate segments or dotted (spec.containers)
        path: Vec<String>,
    },

    /// Show the schema of a single field
    Property {
        /// API version (e.g., "v1", "batch/v1")
        api_version: String,

        /// Resource kind (e.g., "Pod")
        kind: String,

        /// Field path, as separate segments or dotted (spec.containers)
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Check manifest files against the schemas
    Lint {
        /// YAML files, each may hold several documents
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },

    /// List the bundles found in the bundle directory
    Bundles,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over `-v`
fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match global.verbose {
        0 => "warn",
        1 => "warn,kubespec_core=debug,kubespec_repo=debug",
        _ => "warn,kubespec_core=trace,kubespec_repo=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match global.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let global = &cli.global;

    match cli.command {
        Commands::Versions => commands::versions::run(global),
        Commands::Kinds { api_version } => commands::kinds::run(global, api_version.as_deref()),
        Commands::Model {
            api_version,
            kind,
            path,
        } => commands::model::run(global, &api_version, &kind, &path),
        Commands::Property {
            api_version,
            kind,
            path,
        } => commands::property::run(global, &api_version, &kind, &path),
        Commands::Lint { files, strict } => commands::lint::run(global, &files, strict),
        Commands::Bundles => commands::bundles::run(global),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(global),
            ConfigCommands::Init { force } => commands::config::init(global, force),
        },
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    // Help and version go to stdout and succeed; anything else is a usage error
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_tracing(&cli.global);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
