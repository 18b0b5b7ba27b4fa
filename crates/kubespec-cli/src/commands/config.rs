//! Config command - show and create the configuration file

use console::style;
use kubespec_repo::{KnownPackage, SchemaConfig};
use serde::Serialize;
use std::path::PathBuf;

use crate::GlobalArgs;
use crate::display::print_json;
use crate::error::{CliError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivePackage {
    package: &'static str,
    version: String,
    known: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOutput<'a> {
    path: PathBuf,
    exists: bool,
    bundle_dir: PathBuf,
    active: Vec<ActivePackage>,
    config: &'a SchemaConfig,
}

fn config_path(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Ok(SchemaConfig::default_path()?),
    }
}

pub fn show(global: &GlobalArgs) -> Result<()> {
    let path = config_path(global)?;
    let config = super::load_config(global)?;

    let active = config
        .active_packages()
        .into_iter()
        .map(|(package, version)| ActivePackage {
            package: package.name(),
            known: package.is_known_version(&version),
            version,
        })
        .collect();

    let output = ConfigOutput {
        exists: path.exists(),
        path,
        bundle_dir: config.bundle_dir()?,
        active,
        config: &config,
    };

    if global.json {
        return print_json(&output);
    }

    let origin = if output.exists { "" } else { " (not found, using defaults)" };
    println!("{} {}{}", style("Config:").bold(), output.path.display(), origin);
    println!("{} {}", style("Bundles:").bold(), output.bundle_dir.display());
    println!();

    for package in KnownPackage::ALL {
        let settings = config.package(package);
        let version = settings.effective_version(package);
        let state = if settings.enabled {
            style("enabled").green()
        } else {
            style("disabled").dim()
        };
        let marker = if package.is_known_version(version) {
            String::new()
        } else {
            format!(" {}", style("(unknown version)").yellow())
        };
        println!("  {:<12} {:<6} {}{}", package.name(), version, state, marker);
    }
    Ok(())
}

pub fn init(global: &GlobalArgs, force: bool) -> Result<()> {
    let path = config_path(global)?;
    if path.exists() && !force {
        return Err(CliError::Usage {
            message: format!("{} already exists", path.display()),
            help: Some("Use --force to overwrite it".to_string()),
        });
    }

    let mut config = SchemaConfig::default();
    super::apply_overrides(&mut config, global);
    config.save_to(&path)?;

    println!("{} Wrote {}", style("✓").green(), path.display());
    Ok(())
}
