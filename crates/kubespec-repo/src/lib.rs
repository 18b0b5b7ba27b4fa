//! kubespec Repo - Schema bundle loading and configuration
//!
//! This crate turns bundle archives into queryable specs:
//! - `SchemaConfig`: which API packages and versions are active
//! - `BundleSource`: where `<package>-<version>.zip` bundles are found
//! - `SpecRepository`: parses each bundle once and caches the result
//! - `SchemaQuery`: answers resolver queries for the active configuration

pub mod archive;
pub mod config;
pub mod error;
pub mod query;
pub mod repository;
pub mod source;

pub use archive::{BundleFormat, BundleMember, LoadLimits, read_json_members};
pub use config::{ApiPackage, KnownPackage, LATEST_VERSION, SchemaConfig};
pub use error::{RepoError, Result};
pub use query::SchemaQuery;
pub use repository::{BundleKey, SpecRepository};
pub use source::{Bundle, BundleSource, DirectorySource, MemorySource, resource_names};
