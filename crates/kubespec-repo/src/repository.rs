//! Loading and caching of schema specs
//!
//! Parsing a bundle is expensive, so each `(package, version)` is parsed at
//! most once per repository. Concurrent first requests for the same bundle
//! wait for a single load instead of racing. Entries are never evicted on
//! their own: switching versions adds a new entry and keeps the old one
//! resident until `clear_cache` is called.

use kubespec_core::Spec;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::archive::{LoadLimits, read_json_members};
use crate::config::SchemaConfig;
use crate::error::{RepoError, Result};
use crate::source::BundleSource;

/// Cache key for a loaded bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleKey {
    pub package: String,
    pub version: String,
}

impl BundleKey {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

type SpecCell = Arc<OnceCell<Vec<Arc<Spec>>>>;

/// Loads specs from a bundle source and caches them per bundle
#[derive(Debug)]
pub struct SpecRepository {
    source: Box<dyn BundleSource>,
    limits: LoadLimits,
    cache: RwLock<HashMap<BundleKey, SpecCell>>,
}

impl SpecRepository {
    pub fn new(source: impl BundleSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            limits: LoadLimits::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the limits applied when reading bundles
    pub fn with_limits(mut self, limits: LoadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn source(&self) -> &dyn BundleSource {
        self.source.as_ref()
    }

    pub fn limits(&self) -> &LoadLimits {
        &self.limits
    }

    /// Specs of one package version
    ///
    /// A bundle that does not exist yields no specs. A bundle containing a
    /// malformed schema file fails as a whole and is not cached, so a later
    /// call tries again.
    pub fn load_bundle(&self, package: &str, version: &str) -> Result<Vec<Arc<Spec>>> {
        let key = BundleKey::new(package, version);
        let cell = self.cell_for(&key)?;

        if let Some(specs) = cell.get() {
            tracing::debug!(package, version, "schema cache hit");
            return Ok(specs.clone());
        }

        let specs = cell.get_or_try_init(|| self.read_bundle(package, version))?;
        Ok(specs.clone())
    }

    /// Specs of every enabled package, in package order
    pub fn active_specs(&self, config: &SchemaConfig) -> Result<Vec<Arc<Spec>>> {
        let mut specs = Vec::new();
        for (package, version) in config.active_packages() {
            if !package.is_known_version(&version) {
                tracing::warn!(
                    package = package.name(),
                    version = %version,
                    "no published schema for this version"
                );
            }
            specs.extend(self.load_bundle(package.name(), &version)?);
        }
        Ok(specs)
    }

    /// Check if a bundle has been loaded
    pub fn is_cached(&self, package: &str, version: &str) -> bool {
        let key = BundleKey::new(package, version);
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).map(|cell| cell.get().is_some()))
            .unwrap_or(false)
    }

    /// Number of loaded bundles
    pub fn cached_bundles(&self) -> usize {
        self.cache
            .read()
            .map(|cache| cache.values().filter(|cell| cell.get().is_some()).count())
            .unwrap_or(0)
    }

    /// Drop every loaded bundle
    ///
    /// Specs already handed out stay valid; they are shared, not owned by
    /// the cache.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    /// Get the load-once cell for a key, creating it if needed
    fn cell_for(&self, key: &BundleKey) -> Result<SpecCell> {
        {
            let cache = self.cache.read().map_err(|_| poisoned())?;
            if let Some(cell) = cache.get(key) {
                return Ok(Arc::clone(cell));
            }
        }

        let mut cache = self.cache.write().map_err(|_| poisoned())?;
        Ok(Arc::clone(cache.entry(key.clone()).or_default()))
    }

    fn read_bundle(&self, package: &str, version: &str) -> Result<Vec<Arc<Spec>>> {
        let Some(bundle) = self.source.fetch(package, version, &self.limits)? else {
            tracing::debug!(package, version, "no schema bundle found");
            return Ok(Vec::new());
        };

        let members = read_json_members(&bundle.resource, &bundle.data, &self.limits)?;
        let member_count = members.len();
        let mut specs = Vec::with_capacity(member_count);

        for member in members {
            let parsed = Spec::from_json_slice(&member.content).map_err(|source| {
                RepoError::MalformedSpec {
                    resource: bundle.resource.clone(),
                    member: member.name.clone(),
                    source,
                }
            })?;

            match parsed {
                Some(spec) => specs.push(Arc::new(spec)),
                None => tracing::debug!(member = %member.name, "skipping empty schema file"),
            }
        }

        tracing::info!(
            resource = %bundle.resource,
            members = member_count,
            specs = specs.len(),
            "loaded schema bundle"
        );
        Ok(specs)
    }
}

fn poisoned() -> RepoError {
    RepoError::CacheError {
        message: "cache lock poisoned".to_string(),
    }
}
