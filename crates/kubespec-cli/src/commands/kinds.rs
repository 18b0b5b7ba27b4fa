//! Kinds command - list the resource kinds that can be created

use console::style;

use crate::GlobalArgs;
use crate::display::print_json;
use crate::error::Result;

pub fn run(global: &GlobalArgs, api_version: Option<&str>) -> Result<()> {
    let query = super::open_query(global)?;
    let kinds = query.suggest_kinds(api_version)?;

    if global.json {
        return print_json(&kinds);
    }

    if kinds.is_empty() {
        match api_version {
            Some(version) => println!("No creatable kinds for apiVersion {}", version),
            None => println!("No creatable kinds found"),
        }
        return Ok(());
    }

    println!(
        "{:<40} {}",
        style("KIND").bold(),
        style("API VERSION").bold()
    );
    for key in &kinds {
        println!("{:<40} {}", key.kind, key.api_version);
    }
    Ok(())
}
