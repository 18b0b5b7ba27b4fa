//! Bundles command - list the bundles found in the bundle directory

use console::style;
use kubespec_repo::{BundleSource, DirectorySource, resource_names};
use serde::Serialize;
use std::collections::HashSet;

use crate::GlobalArgs;
use crate::display::print_json;
use crate::error::Result;

#[derive(Serialize)]
struct BundleEntry {
    name: String,
    active: bool,
}

pub fn run(global: &GlobalArgs) -> Result<()> {
    let config = super::load_config(global)?;
    let dir = config.bundle_dir()?;
    let source = DirectorySource::new(&dir);

    let active: HashSet<String> = config
        .active_packages()
        .into_iter()
        .flat_map(|(package, version)| resource_names(package.name(), &version))
        .collect();

    let entries: Vec<BundleEntry> = source
        .list()?
        .into_iter()
        .map(|name| BundleEntry {
            active: active.contains(&name),
            name,
        })
        .collect();

    if global.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No bundles in {}", dir.display());
        return Ok(());
    }

    println!("{}", style(dir.display()).cyan().bold());
    for entry in &entries {
        if entry.active {
            println!("  {} {}", style("●").green(), entry.name);
        } else {
            println!("  {} {}", style("○").dim(), entry.name);
        }
    }
    Ok(())
}
