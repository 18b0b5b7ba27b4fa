//! Locating schema bundles
//!
//! Bundles are named `<package>-<version>.zip`. A source is asked for a
//! package and version and returns the raw archive, or nothing when it has
//! no such bundle. Sources only locate data; reading and caching happen in
//! the repository.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::archive::{BundleFormat, LoadLimits, check_bundle_size};
use crate::error::Result;

/// Raw bundle archive as found by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Resource name the bundle was found under (e.g., "kubernetes-1.9.zip")
    pub resource: String,
    pub data: Vec<u8>,
}

/// Trait for bundle locations
///
/// This trait allows for different implementations:
/// - `DirectorySource`: bundles stored as files in a directory
/// - `MemorySource`: in-memory bundles for embedding and testing
pub trait BundleSource: Send + Sync + fmt::Debug {
    /// Fetch the bundle for a package version, `Ok(None)` when absent
    ///
    /// Sources that can tell the size of a bundle before reading it should
    /// reject one larger than `limits.max_bundle_bytes`.
    fn fetch(&self, package: &str, version: &str, limits: &LoadLimits) -> Result<Option<Bundle>>;

    /// Resource names of every bundle this source holds
    fn list(&self) -> Result<Vec<String>>;
}

/// Candidate resource names for a package version, in probing order
pub fn resource_names(package: &str, version: &str) -> Vec<String> {
    BundleFormat::ALL
        .iter()
        .map(|format| format!("{}-{}.{}", package, version, format.extension()))
        .collect()
}

fn is_bundle_name(name: &str) -> bool {
    BundleFormat::ALL
        .iter()
        .any(|format| name.ends_with(&format!(".{}", format.extension())))
}

/// Bundles stored as files in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BundleSource for DirectorySource {
    fn fetch(&self, package: &str, version: &str, limits: &LoadLimits) -> Result<Option<Bundle>> {
        for resource in resource_names(package, version) {
            let path = self.root.join(&resource);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "found bundle");
                check_bundle_size(&resource, std::fs::metadata(&path)?.len(), limits)?;
                let data = std::fs::read(&path)?;
                return Ok(Some(Bundle { resource, data }));
            }
        }
        Ok(None)
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_file() && is_bundle_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory bundles keyed by resource name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bundles: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle under a resource name such as `kubernetes-1.9.zip`
    pub fn insert(&mut self, resource: impl Into<String>, data: Vec<u8>) {
        self.bundles.insert(resource.into(), data);
    }

    pub fn with_bundle(mut self, resource: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(resource, data);
        self
    }
}

impl BundleSource for MemorySource {
    fn fetch(&self, package: &str, version: &str, _limits: &LoadLimits) -> Result<Option<Bundle>> {
        Ok(resource_names(package, version).into_iter().find_map(|resource| {
            self.bundles.get(&resource).map(|data| Bundle {
                data: data.clone(),
                resource,
            })
        }))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.bundles.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use tempfile::TempDir;

    #[test]
    fn test_resource_names() {
        assert_eq!(
            resource_names("kubernetes", "1.9"),
            vec!["kubernetes-1.9.zip", "kubernetes-1.9.tar.gz"]
        );
    }

    #[test]
    fn test_directory_source() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("kubernetes-1.9.zip"), b"zip").unwrap();
        std::fs::write(temp.path().join("openshift-3.6.tar.gz"), b"tgz").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"skip").unwrap();

        let source = DirectorySource::new(temp.path());

        let bundle = source.fetch("kubernetes", "1.9", &LoadLimits::default()).unwrap().unwrap();
        assert_eq!(bundle.resource, "kubernetes-1.9.zip");
        assert_eq!(bundle.data, b"zip");

        let bundle = source.fetch("openshift", "3.6", &LoadLimits::default()).unwrap().unwrap();
        assert_eq!(bundle.resource, "openshift-3.6.tar.gz");

        assert!(source.fetch("kubernetes", "1.2", &LoadLimits::default()).unwrap().is_none());
        assert_eq!(
            source.list().unwrap(),
            vec!["kubernetes-1.9.zip", "openshift-3.6.tar.gz"]
        );
    }

    #[test]
    fn test_directory_source_prefers_zip() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("kubernetes-1.9.zip"), b"zip").unwrap();
        std::fs::write(temp.path().join("kubernetes-1.9.tar.gz"), b"tgz").unwrap();

        let bundle = DirectorySource::new(temp.path())
            .fetch("kubernetes", "1.9", &LoadLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(bundle.data, b"zip");
    }

    #[test]
    fn test_missing_directory() {
        let source = DirectorySource::new("/nonexistent/kubespec/bundles");
        assert!(source.fetch("kubernetes", "1.9", &LoadLimits::default()).unwrap().is_none());
        assert!(source.list().unwrap().is_empty());
    }

    #[test]
    fn test_directory_source_checks_size_before_reading() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("kubernetes-1.9.zip"), vec![0u8; 64]).unwrap();

        let limits = LoadLimits {
            max_bundle_bytes: 16,
            ..LoadLimits::default()
        };
        let source = DirectorySource::new(temp.path());
        assert!(matches!(
            source.fetch("kubernetes", "1.9", &limits),
            Err(RepoError::LimitExceeded { .. })
        ));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_bundle("openshift-1.5.zip", vec![1, 2, 3]);
        let bundle = source.fetch("openshift", "1.5", &LoadLimits::default()).unwrap().unwrap();
        assert_eq!(bundle.resource, "openshift-1.5.zip");
        assert_eq!(bundle.data, vec![1, 2, 3]);
        assert!(source.fetch("openshift", "1.4", &LoadLimits::default()).unwrap().is_none());
    }
}
