//! Schema queries against the active configuration
//!
//! `SchemaQuery` pairs a shared `SpecRepository` with a `SchemaConfig`.
//! Every call fetches the active specs (cheap once loaded) and answers
//! through a `SchemaResolver`, handing back owned values.

use indexmap::IndexMap;
use kubespec_core::{LintReport, Manifest, Model, Property, ResourceKey, SchemaResolver, Spec};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SchemaConfig;
use crate::error::Result;
use crate::repository::SpecRepository;
use crate::source::DirectorySource;

#[derive(Debug, Clone)]
pub struct SchemaQuery {
    repository: Arc<SpecRepository>,
    config: SchemaConfig,
}

impl SchemaQuery {
    pub fn new(repository: Arc<SpecRepository>, config: SchemaConfig) -> Self {
        Self { repository, config }
    }

    /// Query the bundles in the configured bundle directory
    pub fn from_config(config: SchemaConfig) -> Result<Self> {
        let source = DirectorySource::new(config.bundle_dir()?);
        Ok(Self::new(Arc::new(SpecRepository::new(source)), config))
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<SpecRepository> {
        &self.repository
    }

    /// Same repository, different configuration
    pub fn with_config(&self, config: SchemaConfig) -> Self {
        Self::new(Arc::clone(&self.repository), config)
    }

    pub fn active_specs(&self) -> Result<Vec<Arc<Spec>>> {
        self.repository.active_specs(&self.config)
    }

    pub fn find_model<S: AsRef<str>>(&self, key: &ResourceKey, path: &[S]) -> Result<Option<Model>> {
        self.resolve(|resolver| resolver.find_model(key, path).cloned())
    }

    pub fn find_properties<S: AsRef<str>>(
        &self,
        key: &ResourceKey,
        path: &[S],
    ) -> Result<IndexMap<String, Property>> {
        self.resolve(|resolver| resolver.find_properties(key, path))
    }

    pub fn find_property<S: AsRef<str>>(&self, key: &ResourceKey, path: &[S]) -> Result<Option<Property>> {
        self.resolve(|resolver| resolver.find_property(key, path).cloned())
    }

    pub fn suggest_api_versions(&self) -> Result<BTreeSet<String>> {
        self.resolve(|resolver| resolver.suggest_api_versions())
    }

    pub fn suggest_kinds(&self, api_version: Option<&str>) -> Result<BTreeSet<ResourceKey>> {
        self.resolve(|resolver| resolver.suggest_kinds(api_version))
    }

    /// Check a manifest document against the active schema
    pub fn lint_document(&self, document: &Value) -> Result<LintReport> {
        self.resolve(|resolver| kubespec_core::lint_document(resolver, document))
    }

    /// Check a parsed manifest against the active schema, including its
    /// repeated keys
    pub fn lint_manifest(&self, manifest: &Manifest) -> Result<LintReport> {
        self.resolve(|resolver| kubespec_core::lint_manifest(resolver, manifest))
    }

    fn resolve<T>(&self, query: impl FnOnce(&SchemaResolver<'_>) -> T) -> Result<T> {
        let specs = self.active_specs()?;
        Ok(query(&SchemaResolver::new(&specs)))
    }
}
