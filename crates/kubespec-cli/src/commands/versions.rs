//! Versions command - list the API versions of the active schemas

use console::style;

use crate::GlobalArgs;
use crate::display::print_json;
use crate::error::Result;

pub fn run(global: &GlobalArgs) -> Result<()> {
    let query = super::open_query(global)?;
    let versions = query.suggest_api_versions()?;

    if global.json {
        return print_json(&versions);
    }

    if versions.is_empty() {
        let dir = query.config().bundle_dir()?;
        eprintln!(
            "{} No schemas loaded from {}",
            style("⚠").yellow(),
            dir.display()
        );
        return Ok(());
    }

    for version in versions {
        println!("{}", version);
    }
    Ok(())
}
