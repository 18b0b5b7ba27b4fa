//! Schema package configuration
//!
//! Stores which API packages are active in `~/.config/kubespec/config.yaml`:
//!
//! ```yaml
//! kubernetes:
//!   enabled: true
//!   version: "1.8"
//! openshift:
//!   enabled: false
//! bundleDir: /usr/share/kubespec/bundles
//! ```
//!
//! A package without a version uses the latest bundled version.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// Version keyword that selects a package's default version
pub const LATEST_VERSION: &str = "latest";

/// API packages with bundled schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownPackage {
    Kubernetes,
    Openshift,
}

impl KnownPackage {
    /// All packages, in the order their specs are combined
    pub const ALL: [KnownPackage; 2] = [KnownPackage::Kubernetes, KnownPackage::Openshift];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Openshift => "openshift",
        }
    }

    /// Version used when none is configured
    pub fn default_version(&self) -> &'static str {
        match self {
            Self::Kubernetes => "1.9",
            Self::Openshift => "3.6",
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        matches!(self, Self::Kubernetes)
    }

    /// Versions with published bundles, newest first
    pub fn known_versions(&self) -> &'static [&'static str] {
        match self {
            Self::Kubernetes => &["1.9", "1.8", "1.7", "1.6", "1.5", "1.4", "1.3", "1.2"],
            Self::Openshift => &["3.6", "1.5", "1.4", "1.3", "1.2"],
        }
    }

    pub fn is_known_version(&self, version: &str) -> bool {
        self.known_versions().contains(&version)
    }

    /// Package configuration used when the config file has none
    pub fn default_package(&self) -> ApiPackage {
        ApiPackage::new(self.enabled_by_default(), None)
    }
}

impl fmt::Display for KnownPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings for one API package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPackage {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Selected version, `None` for the latest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl ApiPackage {
    pub fn new(enabled: bool, version: Option<String>) -> Self {
        Self { enabled, version }
    }

    /// Set the version from user input, where `latest` clears it
    pub fn select_version(&mut self, version: &str) {
        self.version = if version.eq_ignore_ascii_case(LATEST_VERSION) {
            None
        } else {
            Some(version.to_string())
        };
    }

    /// The configured version, or the package default
    pub fn effective_version<'a>(&'a self, package: KnownPackage) -> &'a str {
        self.version
            .as_deref()
            .unwrap_or_else(|| package.default_version())
    }
}

/// Schema configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    #[serde(default = "default_kubernetes")]
    pub kubernetes: ApiPackage,

    #[serde(default = "default_openshift")]
    pub openshift: ApiPackage,

    /// Directory holding `<package>-<version>.zip` bundles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dir: Option<PathBuf>,
}

fn default_kubernetes() -> ApiPackage {
    KnownPackage::Kubernetes.default_package()
}

fn default_openshift() -> ApiPackage {
    KnownPackage::Openshift.default_package()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            kubernetes: default_kubernetes(),
            openshift: default_openshift(),
            bundle_dir: None,
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.normalize();
        Ok(config)
    }

    /// Clear versions written as `latest`
    fn normalize(&mut self) {
        for package in KnownPackage::ALL {
            let settings = self.package_mut(package);
            if let Some(version) = settings.version.take() {
                settings.select_version(&version);
            }
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("kubespec").join("config.yaml"))
    }

    /// Default bundle directory, used when `bundleDir` is not set
    pub fn default_bundle_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine data directory".to_string(),
        })?;
        Ok(data_dir.join("kubespec").join("bundles"))
    }

    /// The configured bundle directory, or the default one
    pub fn bundle_dir(&self) -> Result<PathBuf> {
        match &self.bundle_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_bundle_dir(),
        }
    }

    pub fn package(&self, package: KnownPackage) -> &ApiPackage {
        match package {
            KnownPackage::Kubernetes => &self.kubernetes,
            KnownPackage::Openshift => &self.openshift,
        }
    }

    pub fn package_mut(&mut self, package: KnownPackage) -> &mut ApiPackage {
        match package {
            KnownPackage::Kubernetes => &mut self.kubernetes,
            KnownPackage::Openshift => &mut self.openshift,
        }
    }

    /// Enabled packages with their effective versions, in load order
    pub fn active_packages(&self) -> Vec<(KnownPackage, String)> {
        KnownPackage::ALL
            .into_iter()
            .filter(|p| self.package(*p).enabled)
            .map(|p| (p, self.package(p).effective_version(p).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SchemaConfig::default();
        assert!(config.kubernetes.enabled);
        assert!(!config.openshift.enabled);
        assert_eq!(
            config.active_packages(),
            vec![(KnownPackage::Kubernetes, "1.9".to_string())]
        );
    }

    #[test]
    fn test_effective_version() {
        let mut package = ApiPackage::new(true, None);
        assert_eq!(package.effective_version(KnownPackage::Openshift), "3.6");

        package.select_version("1.5");
        assert_eq!(package.effective_version(KnownPackage::Openshift), "1.5");

        package.select_version("latest");
        assert_eq!(package.version, None);
    }

    #[test]
    fn test_active_packages_order() {
        let mut config = SchemaConfig::default();
        config.openshift.enabled = true;
        config.kubernetes.version = Some("1.7".to_string());
        assert_eq!(
            config.active_packages(),
            vec![
                (KnownPackage::Kubernetes, "1.7".to_string()),
                (KnownPackage::Openshift, "3.6".to_string()),
            ]
        );

        config.kubernetes.enabled = false;
        config.openshift.enabled = false;
        assert!(config.active_packages().is_empty());
    }

    #[test]
    fn test_known_versions() {
        assert!(KnownPackage::Kubernetes.is_known_version("1.2"));
        assert!(!KnownPackage::Kubernetes.is_known_version("3.6"));
        assert_eq!(
            KnownPackage::Openshift.known_versions()[0],
            KnownPackage::Openshift.default_version()
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SchemaConfig = serde_yaml::from_str("openshift:\n  version: \"1.5\"\n").unwrap();
        assert_eq!(config.kubernetes, KnownPackage::Kubernetes.default_package());
        // An explicitly listed package is enabled unless it says otherwise
        assert!(config.openshift.enabled);
        assert_eq!(config.openshift.version.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_latest_in_file_selects_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "kubernetes:\n  version: latest\nopenshift:\n  version: \"1.5\"\n",
        )
        .unwrap();

        let config = SchemaConfig::load_from(&path).unwrap();
        assert_eq!(config.kubernetes.version, None);
        assert_eq!(
            config.active_packages(),
            vec![
                (KnownPackage::Kubernetes, "1.9".to_string()),
                (KnownPackage::Openshift, "1.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_package_mut() {
        let mut config = SchemaConfig::default();
        config.package_mut(KnownPackage::Openshift).enabled = true;
        assert!(config.package(KnownPackage::Openshift).enabled);
        assert!(config.package(KnownPackage::Kubernetes).version.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let mut config = SchemaConfig::default();
        config.openshift = ApiPackage::new(true, Some("1.4".to_string()));
        config.bundle_dir = Some(temp.path().join("bundles"));
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("bundleDir"));

        let loaded = SchemaConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
