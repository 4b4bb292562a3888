//! Version numbering for dataset chains and derived models

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Dataset version strings are `v<major>.<minor>`
static DATASET_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)\.(\d+)$").unwrap());

/// Model versions derived from a dataset version: `v<major>.<minor>_model`
static MODEL_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)\.(\d+)_model$").unwrap());

/// Parsed `v<major>.<minor>` dataset version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetVersion {
    pub major: u32,
    pub minor: u32,
}

impl DatasetVersion {
    /// Parse a version string. Malformed versions are a hard error: version
    /// chains must never advance from a guessed base.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let captures = DATASET_VERSION_PATTERN.captures(s).ok_or_else(|| {
            DomainError::validation(format!(
                "Malformed dataset version '{}': expected v<major>.<minor>",
                s
            ))
        })?;

        let major = captures[1]
            .parse()
            .map_err(|_| DomainError::validation(format!("Version major out of range in '{}'", s)))?;
        let minor = captures[2]
            .parse()
            .map_err(|_| DomainError::validation(format!("Version minor out of range in '{}'", s)))?;

        Ok(Self { major, minor })
    }

    /// First version of a new dataset chain
    pub fn initial() -> Self {
        Self { major: 1, minor: 0 }
    }

    /// Next version in the chain: minor + 1, major unchanged
    pub fn next_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

impl TryFrom<String> for DatasetVersion {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatasetVersion> for String {
    fn from(version: DatasetVersion) -> Self {
        version.to_string()
    }
}

/// Compute the version for the next model trained against a dataset.
///
/// The first model takes `<dataset_version>_model`. Later models increment the
/// minor component of the latest model version when it matches
/// `vX.Y_model`. Any other shape falls back to appending `_v<N>`, N parsed
/// from the segment after the last `.` (default 1). The fallback is a
/// documented irregularity kept for continuity with pre-existing rows, not a
/// pattern to extend.
pub fn next_model_version(dataset_version: &str, latest_model_version: Option<&str>) -> String {
    let Some(latest) = latest_model_version else {
        return format!("{}_model", dataset_version);
    };

    if let Some(captures) = MODEL_VERSION_PATTERN.captures(latest) {
        // Bounded by the pattern, cannot fail
        let major: u32 = captures[1].parse().unwrap_or(1);
        let minor: u32 = captures[2].parse().unwrap_or(0);
        return format!("v{}.{}_model", major, minor + 1);
    }

    let suffix = latest
        .rsplit('.')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("{}_v{}", latest, suffix)
}
