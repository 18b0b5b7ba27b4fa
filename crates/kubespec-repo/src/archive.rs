//! Reading schema bundles
//!
//! A bundle is a `.zip` archive (or, alternatively, a `.tar.gz` archive)
//! holding one JSON schema file per API version. The format is detected
//! from the leading magic bytes, not from the file name.

use flate2::read::GzDecoder;
use std::io::{Cursor, Read};

use crate::error::{RepoError, Result};

/// Upper bounds applied while reading a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    /// Maximum size of the archive itself
    pub max_bundle_bytes: u64,
    /// Maximum uncompressed size of a single member
    pub max_member_bytes: u64,
    /// Maximum number of JSON members
    pub max_members: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_bundle_bytes: 64 * 1024 * 1024,
            max_member_bytes: 32 * 1024 * 1024,
            max_members: 4096,
        }
    }
}

/// Archive formats accepted for bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    Zip,
    TarGz,
}

impl BundleFormat {
    /// File extensions to probe, in order of preference
    pub const ALL: [BundleFormat; 2] = [BundleFormat::Zip, BundleFormat::TarGz];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }

    /// Detect the format from the first bytes of the archive
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
            Some(Self::Zip)
        } else if data.starts_with(&[0x1f, 0x8b]) {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// A JSON file read from a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMember {
    /// Path within the archive
    pub name: String,
    pub content: Vec<u8>,
}

/// Read every JSON member of a bundle
///
/// Members are returned in archive order. Only files whose name ends in
/// `json` are read.
pub fn read_json_members(resource: &str, data: &[u8], limits: &LoadLimits) -> Result<Vec<BundleMember>> {
    check_bundle_size(resource, data.len() as u64, limits)?;

    match BundleFormat::detect(data) {
        Some(BundleFormat::Zip) => read_zip(resource, data, limits),
        Some(BundleFormat::TarGz) => read_tar_gz(resource, data, limits),
        None => Err(archive_error(resource, "not a zip or tar.gz archive")),
    }
}

/// Reject an archive larger than the bundle limit
pub fn check_bundle_size(resource: &str, size: u64, limits: &LoadLimits) -> Result<()> {
    if size > limits.max_bundle_bytes {
        return Err(RepoError::LimitExceeded {
            resource: resource.to_string(),
            message: format!(
                "archive is {} bytes, limit is {}",
                size, limits.max_bundle_bytes
            ),
        });
    }
    Ok(())
}

fn read_zip(resource: &str, data: &[u8], limits: &LoadLimits) -> Result<Vec<BundleMember>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|e| archive_error(resource, e))?;
    let mut members = Vec::new();

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| archive_error(resource, e))?;
        if file.is_dir() || !file.name().ends_with("json") {
            continue;
        }

        let name = file.name().to_string();
        check_member_count(resource, members.len(), limits)?;
        let content = read_limited(resource, &name, &mut file, limits.max_member_bytes)?;
        members.push(BundleMember { name, content });
    }

    Ok(members)
}

fn read_tar_gz(resource: &str, data: &[u8], limits: &LoadLimits) -> Result<Vec<BundleMember>> {
    let mut archive = tar::Archive::new(GzDecoder::new(data));
    let mut members = Vec::new();

    for entry in archive.entries().map_err(|e| archive_error(resource, e))? {
        let mut entry = entry.map_err(|e| archive_error(resource, e))?;
        if entry.header().entry_type().is_dir() {
            continue;
        }

        let name = entry
            .path()
            .map_err(|e| archive_error(resource, e))?
            .to_string_lossy()
            .to_string();
        if !name.ends_with("json") {
            continue;
        }

        check_member_count(resource, members.len(), limits)?;
        let content = read_limited(resource, &name, &mut entry, limits.max_member_bytes)?;
        members.push(BundleMember { name, content });
    }

    Ok(members)
}

fn check_member_count(resource: &str, count: usize, limits: &LoadLimits) -> Result<()> {
    if count >= limits.max_members {
        return Err(RepoError::LimitExceeded {
            resource: resource.to_string(),
            message: format!("more than {} JSON members", limits.max_members),
        });
    }
    Ok(())
}

/// Read a member, failing once it grows past `max_bytes`
fn read_limited<R: Read>(resource: &str, name: &str, reader: &mut R, max_bytes: u64) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut content)
        .map_err(|e| archive_error(resource, format!("{}: {}", name, e)))?;

    if content.len() as u64 > max_bytes {
        return Err(RepoError::LimitExceeded {
            resource: resource.to_string(),
            message: format!("member {} is larger than {} bytes", name, max_bytes),
        });
    }
    Ok(content)
}

fn archive_error(resource: &str, message: impl ToString) -> RepoError {
    RepoError::Archive {
        resource: resource.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build a zip archive in memory
    pub(crate) fn zip_bundle(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Build a tar.gz archive in memory
    pub(crate) fn tar_gz_bundle(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            BundleFormat::detect(&zip_bundle(&[("a.json", "{}")])),
            Some(BundleFormat::Zip)
        );
        assert_eq!(
            BundleFormat::detect(&tar_gz_bundle(&[("a.json", "{}")])),
            Some(BundleFormat::TarGz)
        );
        assert_eq!(BundleFormat::detect(b"{}"), None);
    }

    #[test]
    fn test_read_zip_members() {
        let data = zip_bundle(&[
            ("v1.json", r#"{"apiVersion": "v1"}"#),
            ("README.md", "not a schema"),
            ("apis/batch/v1.json", r#"{"apiVersion": "batch/v1"}"#),
        ]);
        let members = read_json_members("kubernetes-1.9.zip", &data, &LoadLimits::default()).unwrap();
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["v1.json", "apis/batch/v1.json"]);
        assert_eq!(members[0].content, br#"{"apiVersion": "v1"}"#.to_vec());
    }

    #[test]
    fn test_read_tar_gz_members() {
        let data = tar_gz_bundle(&[("v1.json", "{}"), ("notes.txt", "skip")]);
        let members = read_json_members("openshift-3.6.tar.gz", &data, &LoadLimits::default()).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "v1.json");
    }

    #[test]
    fn test_not_an_archive() {
        let err = read_json_members("broken.zip", b"garbage", &LoadLimits::default()).unwrap_err();
        assert!(matches!(err, RepoError::Archive { .. }));
    }

    #[test]
    fn test_truncated_zip() {
        let data = zip_bundle(&[("v1.json", "{}")]);
        let err = read_json_members("broken.zip", &data[..10], &LoadLimits::default()).unwrap_err();
        assert!(matches!(err, RepoError::Archive { .. }));
    }

    #[test]
    fn test_limits() {
        let data = zip_bundle(&[("a.json", "{}"), ("b.json", "{\"apiVersion\": \"v1\"}")]);

        let small_bundle = LoadLimits {
            max_bundle_bytes: 16,
            ..LoadLimits::default()
        };
        assert!(matches!(
            read_json_members("k.zip", &data, &small_bundle),
            Err(RepoError::LimitExceeded { .. })
        ));

        let small_member = LoadLimits {
            max_member_bytes: 4,
            ..LoadLimits::default()
        };
        assert!(matches!(
            read_json_members("k.zip", &data, &small_member),
            Err(RepoError::LimitExceeded { .. })
        ));

        let few_members = LoadLimits {
            max_members: 1,
            ..LoadLimits::default()
        };
        assert!(matches!(
            read_json_members("k.zip", &data, &few_members),
            Err(RepoError::LimitExceeded { .. })
        ));
    }
}
