//! Display formatting for CLI output

use console::style;
use kubespec_core::{LintFinding, LintReport, Severity};
use serde::Serialize;

use crate::error::Result;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First line of a description, cut to `max` characters
pub fn summary_line(description: Option<&str>, max: usize) -> String {
    let line = description.and_then(|d| d.lines().next()).unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Print findings of one document
pub fn print_report(label: &str, report: &LintReport) {
    let Some(resource) = &report.resource else {
        println!(
            "  {} {} is not a Kubernetes resource, skipped",
            style("-").dim(),
            label
        );
        return;
    };

    if !report.schema_found {
        println!(
            "  {} {} ({} {}): no schema, skipped",
            style("⚠").yellow(),
            label,
            resource.api_version,
            resource.kind
        );
        return;
    }

    if report.findings.is_empty() {
        println!(
            "  {} {} ({} {})",
            style("✓").green(),
            label,
            resource.api_version,
            resource.kind
        );
        return;
    }

    println!(
        "  {} {} ({} {})",
        style("→").blue(),
        label,
        resource.api_version,
        resource.kind
    );
    for finding in &report.findings {
        print_finding(finding);
    }
}

fn print_finding(finding: &LintFinding) {
    let icon = match finding.severity {
        Severity::Error => style("✗").red(),
        Severity::Warning => style("⚠").yellow(),
    };

    println!(
        "    {} {} at {}",
        icon,
        finding.message,
        style(finding.location()).dim()
    );

    if let Some(suggestion) = &finding.suggestion {
        println!("      {} {}", style("hint:").blue(), suggestion);
    }
}

/// Print the lint summary line
pub fn print_summary(errors: usize, warnings: usize) {
    if errors > 0 {
        println!(
            "{} Linting failed: {} error(s), {} warning(s)",
            style("✗").red().bold(),
            errors,
            warnings
        );
    } else if warnings > 0 {
        println!(
            "{} Linting passed with {} warning(s)",
            style("⚠").yellow().bold(),
            warnings
        );
    } else {
        println!("{} Linting passed!", style("✓").green().bold());
    }
}
