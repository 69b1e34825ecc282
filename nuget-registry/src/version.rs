//! NuGet package versions.
//!
//! NuGet versions are SemVer 2.0 versions with two relaxations: the numeric
//! part may have one to four components (`1`, `1.2`, `1.2.3`, `1.2.3.4`), and
//! pre-release labels compare case-insensitively. Pre-release and build
//! metadata syntax is delegated to the `semver` crate.
//!
//! Build metadata is kept for display but never takes part in equality,
//! ordering or hashing, and is dropped from the normalized string.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Longest version token accepted before parsing is even attempted.
pub const MAX_VERSION_LENGTH: usize = 64;

/// Why a version token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("version is empty")]
    Empty,

    #[error("version is too long ({0} characters, max {MAX_VERSION_LENGTH})")]
    TooLong(usize),

    #[error("version must have between 1 and 4 numeric components, found {0}")]
    ComponentCount(usize),

    #[error("invalid numeric component '{0}'")]
    InvalidNumber(String),

    #[error("invalid pre-release label: {0}")]
    Prerelease(String),

    #[error("invalid build metadata: {0}")]
    Metadata(String),
}

/// A parsed NuGet version.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Fourth component of legacy versions such as `1.0.0.1`
    pub revision: u64,
    pub pre: Prerelease,
    pub build: BuildMetadata,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        PackageVersion {
            major,
            minor,
            patch,
            revision: 0,
            pre: Prerelease::EMPTY,
            build: BuildMetadata::EMPTY,
        }
    }

    /// Parse a version token.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        if input.is_empty() {
            return Err(VersionParseError::Empty);
        }
        if input.len() > MAX_VERSION_LENGTH {
            return Err(VersionParseError::TooLong(input.len()));
        }

        let (rest, build) = match input.split_once('+') {
            Some((_, "")) => return Err(VersionParseError::Metadata("empty".to_string())),
            Some((rest, meta)) => (
                rest,
                BuildMetadata::new(meta)
                    .map_err(|e| VersionParseError::Metadata(e.to_string()))?,
            ),
            None => (input, BuildMetadata::EMPTY),
        };

        let (numbers, pre) = match rest.split_once('-') {
            Some((_, "")) => return Err(VersionParseError::Prerelease("empty".to_string())),
            Some((numbers, label)) => (
                numbers,
                Prerelease::new(label).map_err(|e| VersionParseError::Prerelease(e.to_string()))?,
            ),
            None => (rest, Prerelease::EMPTY),
        };

        let components = numbers
            .split('.')
            .map(parse_component)
            .collect::<Result<Vec<u64>, _>>()?;
        if components.is_empty() || components.len() > 4 {
            return Err(VersionParseError::ComponentCount(components.len()));
        }

        let part = |i: usize| components.get(i).copied().unwrap_or(0);
        Ok(PackageVersion {
            major: part(0),
            minor: part(1),
            patch: part(2),
            revision: part(3),
            pre,
            build,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Canonical form: `major.minor.patch[.revision][-pre]`, no build metadata.
    pub fn to_normalized_string(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            out.push_str(&format!(".{}", self.revision));
        }
        if self.is_prerelease() {
            out.push('-');
            out.push_str(self.pre.as_str());
        }
        out
    }

    fn numeric(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }

    fn folded_pre(&self) -> Prerelease {
        if self.pre.as_str().bytes().any(|b| b.is_ascii_uppercase()) {
            // Lowercasing never invalidates a label that already parsed.
            Prerelease::new(&self.pre.as_str().to_ascii_lowercase()).unwrap_or_else(|_| self.pre.clone())
        } else {
            self.pre.clone()
        }
    }
}

fn parse_component(component: &str) -> Result<u64, VersionParseError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidNumber(component.to_string()));
    }
    component
        .parse()
        .map_err(|_| VersionParseError::InvalidNumber(component.to_string()))
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric()
            .cmp(&other.numeric())
            // Prerelease's ordering already puts a release above any pre-release.
            .then_with(|| self.folded_pre().cmp(&other.folded_pre()))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric().hash(state);
        self.pre.as_str().to_ascii_lowercase().hash(state);
    }
}

impl FromStr for PackageVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageVersion::parse(s)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())?;
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PackageVersion::parse(&raw).map_err(serde::de::Error::custom)
    }
}
