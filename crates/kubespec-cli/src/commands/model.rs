//! Model command - show the properties available under a field path

use console::style;
use kubespec_core::ResourceKey;

use crate::GlobalArgs;
use crate::display::{print_json, summary_line};
use crate::error::Result;

pub fn run(global: &GlobalArgs, api_version: &str, kind: &str, path: &[String]) -> Result<()> {
    let query = super::open_query(global)?;
    let key = ResourceKey::new(api_version, kind);
    let path = super::parse_path(path);

    let Some(model) = query.find_model(&key, &path)? else {
        return Err(if query.find_model::<&str>(&key, &[])?.is_none() {
            super::unknown_resource(&query, &key)?
        } else {
            super::unresolved_path(&query, &key, &path)?
        });
    };

    if global.json {
        return print_json(&model);
    }

    println!("{}", style(&model.id).cyan().bold());
    if let Some(description) = &model.description {
        println!("  {}", description);
    }
    println!();

    if model.properties.is_empty() {
        println!("No properties");
        return Ok(());
    }

    let width = model
        .properties
        .keys()
        .map(|name| name.len())
        .max()
        .unwrap_or(0)
        .max(4);

    println!(
        "{:<width$}  {:<28} {:<8} DESCRIPTION",
        "NAME",
        "TYPE",
        "REQUIRED",
        width = width
    );
    for (name, property) in &model.properties {
        let required = if model.is_required(name) { "yes" } else { "" };
        println!(
            "{:<width$}  {:<28} {:<8} {}",
            name,
            property.type_label(),
            required,
            summary_line(property.description.as_deref(), 60),
            width = width
        );
    }
    Ok(())
}
