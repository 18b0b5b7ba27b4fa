//! Schema checks for Kubernetes manifest documents
//!
//! Walks every key of a manifest and checks it against the model the
//! resolver finds for its path:
//! - values of `array`/`object` properties must be sequences/mappings
//! - mappings must contain the required properties of their model
//! - keys must be declared by their parent model
//! - keys must not repeat within a mapping
//!
//! Keys whose path cannot be resolved are not checked for their schema.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::document::Manifest;
use crate::model::{FieldType, ResourceKey};
use crate::resolver::SchemaResolver;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem found in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub severity: Severity,
    /// Keys leading to the offending value
    pub path: Vec<String>,
    /// Position within a sequence, for findings on sequence items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl LintFinding {
    /// Dotted path, e.g. `spec.containers[1]`
    pub fn location(&self) -> String {
        let mut location = self.path.join(".");
        if let Some(index) = self.index {
            location.push_str(&format!("[{}]", index));
        }
        location
    }
}

/// Result of checking one manifest document
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// Resource declared by the document, if any
    pub resource: Option<ResourceKey>,
    /// Whether a schema exists for the resource
    pub schema_found: bool,
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// Check whether a document looks like a Kubernetes resource
pub fn is_kubernetes_document(document: &Value) -> bool {
    document
        .as_object()
        .is_some_and(|m| m.contains_key("apiVersion") || m.contains_key("kind"))
}

/// Check a manifest document against the schema
pub fn lint_document(resolver: &SchemaResolver<'_>, document: &Value) -> LintReport {
    lint(resolver, document, Vec::new())
}

/// Check a parsed manifest, including its repeated keys
pub fn lint_manifest(resolver: &SchemaResolver<'_>, manifest: &Manifest) -> LintReport {
    lint(resolver, &manifest.value, manifest.duplicate_keys.clone())
}

fn lint(resolver: &SchemaResolver<'_>, document: &Value, duplicates: Vec<Vec<String>>) -> LintReport {
    let Some(root) = document.as_object().filter(|_| is_kubernetes_document(document)) else {
        return LintReport::default();
    };
    let Some(key) = ResourceKey::from_document(document) else {
        return LintReport::default();
    };

    let schema_found = resolver.find_model::<&str>(&key, &[]).is_some();
    let mut findings = Vec::new();
    let mut walker = Walker {
        resolver,
        key: &key,
        path: Vec::new(),
        duplicates,
        findings: &mut findings,
    };
    if schema_found {
        walker.visit_mapping(root);
    }
    walker.report_remaining_duplicates();

    LintReport {
        resource: Some(key),
        schema_found,
        findings,
    }
}

struct Walker<'r, 'a> {
    resolver: &'r SchemaResolver<'a>,
    key: &'r ResourceKey,
    path: Vec<String>,
    /// Repeated key paths not reported yet
    duplicates: Vec<Vec<String>>,
    findings: &'r mut Vec<LintFinding>,
}

impl Walker<'_, '_> {
    fn visit_mapping(&mut self, mapping: &Map<String, Value>) {
        for (name, value) in mapping {
            self.path.push(name.clone());
            self.check_duplicate(name);
            self.check_declared(name);
            self.check_type(name, value);
            self.check_required(value);

            match value {
                Value::Object(child) => self.visit_mapping(child),
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(child) = item {
                            self.visit_mapping(child);
                        }
                    }
                }
                _ => {}
            }
            self.path.pop();
        }
    }

    fn parents(&self) -> &[String] {
        &self.path[..self.path.len() - 1]
    }

    fn check_duplicate(&mut self, name: &str) {
        let Some(position) = self.duplicates.iter().position(|path| *path == self.path) else {
            return;
        };
        self.duplicates.remove(position);
        self.report(
            Severity::Error,
            None,
            format!("Duplicated property `{}`", name),
            None,
        );
    }

    /// Report repeated keys the walk did not reach
    fn report_remaining_duplicates(&mut self) {
        for path in std::mem::take(&mut self.duplicates) {
            let name = path.last().cloned().unwrap_or_default();
            self.findings.push(LintFinding {
                severity: Severity::Error,
                path,
                index: None,
                message: format!("Duplicated property `{}`", name),
                suggestion: None,
            });
        }
    }

    fn check_declared(&mut self, name: &str) {
        let Some(parent) = self.resolver.find_model(self.key, self.parents()) else {
            return;
        };
        if parent.property(name).is_some() {
            return;
        }

        let candidates: Vec<&str> = parent.properties.keys().map(String::as_str).collect();
        let suggestion = closest_match(name, &candidates).map(|m| format!("Did you mean `{}`?", m));
        self.report(
            Severity::Warning,
            None,
            format!("Unknown property `{}` on {}", name, parent.id),
            suggestion,
        );
    }

    fn check_type(&mut self, name: &str, value: &Value) {
        if value.is_null() {
            return;
        }
        let Some(property) = self.resolver.find_property(self.key, &self.path) else {
            return;
        };
        let message = match property.field_type {
            Some(FieldType::Array) if !value.is_array() => {
                format!("The content of {} should be an array.", name)
            }
            Some(FieldType::Object) if !value.is_object() => {
                format!("The content of {} should be an object.", name)
            }
            _ => return,
        };
        self.report(Severity::Error, None, message, None);
    }

    fn check_required(&mut self, value: &Value) {
        let Some(model) = self.resolver.find_model(self.key, &self.path) else {
            return;
        };

        let missing_in = |mapping: &Map<String, Value>, index: Option<usize>| {
            let missing = model.missing_required(mapping.keys().map(String::as_str));
            if !missing.is_empty() {
                let message = format!(
                    "Missing required properties on {}: {}",
                    model.id,
                    missing.join(", ")
                );
                Some((index, message))
            } else {
                None
            }
        };

        let reports: Vec<_> = match value {
            Value::Object(mapping) => missing_in(mapping, None).into_iter().collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| item.as_object().and_then(|m| missing_in(m, Some(i))))
                .collect(),
            _ => Vec::new(),
        };

        for (index, message) in reports {
            self.report(Severity::Warning, index, message, None);
        }
    }

    fn report(
        &mut self,
        severity: Severity,
        index: Option<usize>,
        message: String,
        suggestion: Option<String>,
    ) {
        self.findings.push(LintFinding {
            severity,
            path: self.path.clone(),
            index,
            message,
            suggestion,
        });
    }
}

/// Find the closest candidate within the suggestion distance
pub fn closest_match<'c>(input: &str, candidates: &[&'c str]) -> Option<&'c str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, strsim::levenshtein(input, candidate)))
        .filter(|&(_, distance)| distance > 0 && distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::pod_specs;
    use serde_json::json;

    fn lint(document: Value) -> LintReport {
        let specs = pod_specs();
        let resolver = SchemaResolver::new(&specs);
        lint_document(&resolver, &document)
    }

    #[test]
    fn test_valid_document() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "web", "labels": { "app": "web" } },
            "spec": {
                "containers": [
                    { "name": "nginx", "image": "nginx:1.25", "ports": [ { "containerPort": 80 } ] }
                ]
            }
        }));
        assert_eq!(report.resource, Some(ResourceKey::new("v1", "Pod")));
        assert!(report.schema_found);
        assert!(report.findings.is_empty(), "{:?}", report.findings);
    }

    #[test]
    fn test_type_mismatch() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": "web",
            "spec": { "containers": { "name": "nginx" } }
        }));
        let errors: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect();
        // metadata is a $ref without a declared type, so only containers is checked
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec!["spec", "containers"]);
        assert_eq!(errors[0].message, "The content of containers should be an array.");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_object_type_mismatch() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "spec": { "containers": [], "nodeSelector": ["a"] }
        }));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(
            report.findings[0].message,
            "The content of nodeSelector should be an object."
        );
    }

    #[test]
    fn test_missing_required_properties() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "spec": {
                "containers": [
                    { "name": "ok", "image": "nginx" },
                    { "name": "broken" }
                ]
            }
        }));
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.index, Some(1));
        assert_eq!(finding.location(), "spec.containers[1]");
        assert_eq!(
            finding.message,
            "Missing required properties on v1.Container: image"
        );
    }

    #[test]
    fn test_missing_required_on_mapping() {
        let report = lint(json!({ "apiVersion": "v1", "kind": "Pod", "spec": {} }));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.findings[0].message,
            "Missing required properties on v1.PodSpec: containers"
        );
    }

    #[test]
    fn test_unknown_property_with_suggestion() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "nmae": "web" }
        }));
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.message, "Unknown property `nmae` on v1.ObjectMeta");
        assert_eq!(finding.suggestion.as_deref(), Some("Did you mean `name`?"));
    }

    #[test]
    fn test_unresolved_keys_are_not_checked() {
        let report = lint(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "labels": { "anything": "goes" } },
            "status": { "phase": "Running" }
        }));
        assert!(report.findings.is_empty(), "{:?}", report.findings);
    }

    #[test]
    fn test_unknown_resource() {
        let report = lint(json!({ "apiVersion": "v1", "kind": "Gadget", "spec": 1 }));
        assert_eq!(report.resource, Some(ResourceKey::new("v1", "Gadget")));
        assert!(!report.schema_found);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_non_kubernetes_documents() {
        assert!(lint(json!({ "name": "values" })).resource.is_none());
        assert!(lint(json!(["a", "b"])).resource.is_none());
        assert!(lint(json!({ "kind": "Pod" })).resource.is_none());
        assert!(is_kubernetes_document(&json!({ "kind": "Pod" })));
    }

    #[test]
    fn test_findings_follow_document_order() {
        let report = lint(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "spec": { "containers": [], "zetta": 1 },
            "metadata": { "nmae": "web" }
        }));
        let locations: Vec<_> = report.findings.iter().map(LintFinding::location).collect();
        assert_eq!(locations, vec!["spec.zetta", "metadata.nmae"]);
    }

    #[test]
    fn test_duplicate_keys() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": "a", "name": "b" },
                "spec": { "containers": [ { "name": "web", "image": "x", "image": "y" } ] }
            }"#,
        )
        .unwrap();
        let specs = pod_specs();
        let report = lint_manifest(&SchemaResolver::new(&specs), &manifest);

        assert_eq!(report.error_count(), 2);
        assert_eq!(report.findings[0].message, "Duplicated property `name`");
        assert_eq!(report.findings[0].location(), "metadata.name");
        assert_eq!(report.findings[1].message, "Duplicated property `image`");
        assert_eq!(report.findings[1].location(), "spec.containers.image");
    }

    #[test]
    fn test_duplicate_keys_without_schema() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"apiVersion": "v1", "kind": "Gadget", "kind": "Gizmo"}"#)
                .unwrap();
        let specs = pod_specs();
        let report = lint_manifest(&SchemaResolver::new(&specs), &manifest);

        assert!(!report.schema_found);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].location(), "kind");
        assert_eq!(report.findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_closest_match() {
        assert_eq!(closest_match("sepc", &["spec", "status"]), Some("spec"));
        assert_eq!(closest_match("completelydifferent", &["spec"]), None);
        assert_eq!(closest_match("spec", &["spec"]), None);
    }
}
