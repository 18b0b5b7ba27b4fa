//! Ordering for Kubernetes API version strings
//!
//! API versions follow the conventional `[group/]v<major>[<qualifier>]` shape,
//! e.g. `v1`, `v1beta1`, `batch/v1`, `extensions/v1beta1`. Two versions that
//! both follow this shape are ordered by:
//!
//! 1. group, with the core (group-less) API first
//! 2. major version, numerically (`v2 < v10`)
//! 3. qualifier, with a stable release after every alpha/beta of the same major
//!
//! If either side does not follow the shape, the pair is compared as plain
//! strings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static VERSION_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<group>.+)/)?v(?P<major>\d+)(?P<qualifier>[A-Za-z]+\d+)?$")
        .expect("version pattern is valid")
});

/// A parsed API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion<'a> {
    /// API group (e.g., "batch"), absent for the core API
    pub group: Option<&'a str>,
    /// Major version digits, as written
    pub major: &'a str,
    /// Pre-release qualifier (e.g., "beta1")
    pub qualifier: Option<&'a str>,
}

impl<'a> ApiVersion<'a> {
    /// Parse a version string, returning `None` when it does not follow the
    /// conventional shape
    pub fn parse(input: &'a str) -> Option<Self> {
        let captures = VERSION_FORMAT.captures(input)?;
        Some(Self {
            group: captures.name("group").map(|m| m.as_str()),
            major: captures.name("major")?.as_str(),
            qualifier: captures.name("qualifier").map(|m| m.as_str()),
        })
    }
}

impl Ord for ApiVersion<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // None sorts before Some, which is exactly the group rule
        self.group
            .cmp(&other.group)
            .then_with(|| compare_digits(self.major, other.major))
            .then_with(|| match (self.qualifier, other.qualifier) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for ApiVersion<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two API version strings
///
/// Falls back to lexicographic comparison when either string cannot be
/// parsed. Structurally equal versions written differently (`v01` and `v1`)
/// are ordered by their text so that only identical strings compare equal.
pub fn compare_api_versions(a: &str, b: &str) -> Ordering {
    match (ApiVersion::parse(a), ApiVersion::parse(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Return whichever of two versions is greater
pub fn max_api_version<'a>(a: &'a str, b: &'a str) -> &'a str {
    if compare_api_versions(a, b) == Ordering::Greater {
        a
    } else {
        b
    }
}

/// Compare two runs of ASCII digits numerically, without overflow
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
