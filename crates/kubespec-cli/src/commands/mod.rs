//! CLI command implementations

pub mod bundles;
pub mod config;
pub mod kinds;
pub mod lint;
pub mod model;
pub mod property;
pub mod versions;

use kubespec_core::{ResourceKey, closest_match};
use kubespec_repo::{SchemaConfig, SchemaQuery};

use crate::GlobalArgs;
use crate::error::{CliError, Result};

/// Load the configuration file and apply command-line overrides
pub fn load_config(global: &GlobalArgs) -> Result<SchemaConfig> {
    let mut config = match &global.config {
        Some(path) if !path.exists() => {
            return Err(CliError::config_with_help(
                format!("{} does not exist", path.display()),
                format!("Create it with `kubespec config init --config {}`", path.display()),
            ));
        }
        Some(path) => SchemaConfig::load_from(path)?,
        None => SchemaConfig::load()?,
    };
    apply_overrides(&mut config, global);
    Ok(config)
}

fn apply_overrides(config: &mut SchemaConfig, global: &GlobalArgs) {
    if let Some(dir) = &global.bundles {
        config.bundle_dir = Some(dir.clone());
    }
    if let Some(version) = &global.kubernetes_version {
        config.kubernetes.select_version(version);
    }
    if let Some(version) = &global.openshift_version {
        config.openshift.select_version(version);
        config.openshift.enabled = true;
    }
    if global.openshift {
        config.openshift.enabled = true;
    }
    if global.no_kubernetes {
        config.kubernetes.enabled = false;
    }
}

/// Open a query over the active schemas
pub fn open_query(global: &GlobalArgs) -> Result<SchemaQuery> {
    let config = load_config(global)?;
    if config.active_packages().is_empty() {
        tracing::warn!("no API package is enabled");
    }
    Ok(SchemaQuery::from_config(config)?)
}

/// Split path arguments into segments, accepting dotted paths
pub fn parse_path(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split('.'))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Error for a resource that has no schema
pub fn unknown_resource(query: &SchemaQuery, key: &ResourceKey) -> Result<CliError> {
    let kinds = query.suggest_kinds(None)?;

    let help = if let Some(other) = kinds.iter().find(|k| k.kind == key.kind) {
        format!("{} is served as apiVersion `{}`", key.kind, other.api_version)
    } else {
        let names: Vec<&str> = kinds.iter().map(|k| k.kind.as_str()).collect();
        match closest_match(&key.kind, &names) {
            Some(kind) => format!("Did you mean `{}`?", kind),
            None => "Run `kubespec kinds` to list the known resources".to_string(),
        }
    };

    Ok(CliError::not_found(
        format!("No schema for {} {}", key.api_version, key.kind),
        Some(help),
    ))
}

/// Error for a field path that does not resolve, naming the first bad segment
pub fn unresolved_path(query: &SchemaQuery, key: &ResourceKey, path: &[String]) -> Result<CliError> {
    for (depth, segment) in path.iter().enumerate() {
        let parents = &path[..depth];
        let properties = query.find_properties(key, parents)?;

        if let Some(property) = properties.get(segment) {
            if query.find_model(key, &path[..=depth])?.is_some() {
                continue;
            }
            return Ok(CliError::not_found(
                format!("`{}` has no nested properties", path[..=depth].join(".")),
                Some(format!("Its type is {}", property.type_label())),
            ));
        }

        let names: Vec<&str> = properties.keys().map(String::as_str).collect();
        let help = closest_match(segment, &names).map(|name| format!("Did you mean `{}`?", name));
        return Ok(CliError::not_found(
            format!("Unknown property `{}` at {}", segment, describe(key, parents)),
            help,
        ));
    }

    Ok(CliError::not_found(
        format!("Cannot resolve {}", describe(key, path)),
        None,
    ))
}

fn describe(key: &ResourceKey, path: &[String]) -> String {
    if path.is_empty() {
        format!("{} {}", key.api_version, key.kind)
    } else {
        format!("{} {} {}", key.api_version, key.kind, path.join("."))
    }
}
