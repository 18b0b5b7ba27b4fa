//! Lint command - check manifest files against the schemas

use console::style;
use kubespec_core::{LintReport, Manifest};
use kubespec_repo::SchemaQuery;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::GlobalArgs;
use crate::display::{print_json, print_report, print_summary};
use crate::error::{CliError, Result};

/// Lint result of one YAML document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResult {
    file: PathBuf,
    /// Position of the document within its file, from 0
    document: usize,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Outcome {
    Report(LintReport),
    ParseError(String),
}

pub fn run(global: &GlobalArgs, files: &[PathBuf], strict: bool) -> Result<()> {
    let query = super::open_query(global)?;

    let mut results = Vec::new();
    for file in files {
        let content = std::fs::read_to_string(file).map_err(|e| CliError::io_at(file, e))?;
        results.extend(lint_file(&query, file, &content)?);
    }

    let (errors, warnings) = count(&results);

    if global.json {
        print_json(&results)?;
    } else {
        print_results(&results);
        println!();
        print_summary(errors, warnings);
    }

    if errors > 0 || (strict && warnings > 0) {
        return Err(CliError::lint_failed(errors, warnings));
    }
    Ok(())
}

/// Lint every document of a YAML stream
fn lint_file(query: &SchemaQuery, file: &Path, content: &str) -> Result<Vec<DocumentResult>> {
    let mut results = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let outcome = match Manifest::deserialize(document) {
            Ok(manifest) if manifest.value.is_null() => continue,
            Ok(manifest) => Outcome::Report(query.lint_manifest(&manifest)?),
            Err(e) => {
                let outcome = Outcome::ParseError(e.to_string());
                results.push(DocumentResult {
                    file: file.to_path_buf(),
                    document: index,
                    outcome,
                });
                // The stream cannot be resumed after a syntax error
                break;
            }
        };

        results.push(DocumentResult {
            file: file.to_path_buf(),
            document: index,
            outcome,
        });
    }

    Ok(results)
}

fn count(results: &[DocumentResult]) -> (usize, usize) {
    results.iter().fold((0, 0), |(errors, warnings), result| match &result.outcome {
        Outcome::Report(report) => (
            errors + report.error_count(),
            warnings + report.warning_count(),
        ),
        Outcome::ParseError(_) => (errors + 1, warnings),
    })
}

fn print_results(results: &[DocumentResult]) {
    let mut current: Option<&Path> = None;

    for result in results {
        if current != Some(result.file.as_path()) {
            println!();
            println!("{}", style(result.file.display()).cyan().bold());
            current = Some(result.file.as_path());
        }

        let label = format!("document {}", result.document + 1);
        match &result.outcome {
            Outcome::Report(report) => print_report(&label, report),
            Outcome::ParseError(message) => {
                println!("  {} {}: invalid YAML: {}", style("✗").red(), label, message);
            }
        }
    }
}
