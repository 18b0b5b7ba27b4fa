//! Property command - show the schema of a single field

use console::style;
use kubespec_core::ResourceKey;
use serde::Serialize;

use crate::GlobalArgs;
use crate::display::print_json;
use crate::error::{CliError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertyOutput<'a> {
    name: &'a str,
    path: &'a [String],
    #[serde(rename = "type")]
    type_label: String,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

pub fn run(global: &GlobalArgs, api_version: &str, kind: &str, path: &[String]) -> Result<()> {
    let query = super::open_query(global)?;
    let key = ResourceKey::new(api_version, kind);
    let path = super::parse_path(path);

    let Some((name, parents)) = path.split_last() else {
        return Err(CliError::usage("A field path is required"));
    };

    let Some(property) = query.find_property(&key, &path)? else {
        return Err(if query.find_model::<&str>(&key, &[])?.is_none() {
            super::unknown_resource(&query, &key)?
        } else {
            super::unresolved_path(&query, &key, &path)?
        });
    };

    let required = query
        .find_model(&key, parents)?
        .is_some_and(|parent| parent.is_required(name));

    let output = PropertyOutput {
        name,
        path: &path,
        type_label: property.type_label(),
        required,
        description: property.description.as_deref(),
        model: property.target_model(),
    };

    if global.json {
        return print_json(&output);
    }

    println!("{}", style(path.join(".")).cyan().bold());
    println!("  {:<10} {}", "type:", output.type_label);
    println!("  {:<10} {}", "required:", if required { "yes" } else { "no" });
    if let Some(model) = output.model {
        println!("  {:<10} {}", "model:", model);
    }
    if let Some(description) = output.description {
        println!();
        println!("  {}", description);
    }
    Ok(())
}
