//! kubespec Core - Schema types and resolution for Kubernetes API bundles
//!
//! This crate provides the engine behind kubespec's schema queries:
//! - `Spec`, `Model`, `Property`: Swagger 1.2 schema types decoded from bundle JSON
//! - `ResourceKey`: identifies a resource kind by `apiVersion` and `kind`
//! - `SchemaResolver`: follows field paths through `$ref` links between models
//! - `compare_api_versions`: ordering for API version strings
//! - `Manifest`: a manifest document that remembers its repeated keys
//! - `lint_document`/`lint_manifest`: check manifests against the resolved schema

pub mod document;
pub mod error;
pub mod lint;
pub mod model;
pub mod resolver;
pub mod version;

pub use document::Manifest;
pub use error::{CoreError, Result};
pub use lint::{
    LintFinding, LintReport, Severity, closest_match, is_kubernetes_document, lint_document,
    lint_manifest,
};
pub use model::{
    Api, ArrayItems, FieldType, Model, Operation, Property, ResourceKey, Spec, kind_from_model_id,
};
pub use resolver::SchemaResolver;
pub use version::{ApiVersion, compare_api_versions, max_api_version};
