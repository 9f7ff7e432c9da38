//! Format revisions and the version/mode policy.
//!
//! Every entry rule carries the revision that introduced it. Whether a
//! present-but-too-new entry is an error, and whether an absent-but-too-new
//! entry is still required, is decided here and nowhere else.

use crate::ValidationError;
use std::fmt;
use std::str::FromStr;

// ── Version ──────────────────────────────────────────────────────────────────

/// A revision of the file format, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
    V1_5,
    V1_6,
    V1_7,
    V2_0,
}

impl Version {
    /// The earliest revision. A few legacy entries are only required here.
    pub const EARLIEST: Version = Version::V1_0;

    pub fn as_str(self) -> &'static str {
        match self {
            Version::V1_0 => "1.0",
            Version::V1_1 => "1.1",
            Version::V1_2 => "1.2",
            Version::V1_3 => "1.3",
            Version::V1_4 => "1.4",
            Version::V1_5 => "1.5",
            Version::V1_6 => "1.6",
            Version::V1_7 => "1.7",
            Version::V2_0 => "2.0",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = String;

    /// Accepts the header form (`"1.4"`), tolerating surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(Version::V1_0),
            "1.1" => Ok(Version::V1_1),
            "1.2" => Ok(Version::V1_2),
            "1.3" => Ok(Version::V1_3),
            "1.4" => Ok(Version::V1_4),
            "1.5" => Ok(Version::V1_5),
            "1.6" => Ok(Version::V1_6),
            "1.7" => Ok(Version::V1_7),
            "2.0" | "2" => Ok(Version::V2_0),
            other => Err(other.to_string()),
        }
    }
}

// ── Mode ─────────────────────────────────────────────────────────────────────

/// Global conformance policy.
///
/// `Relaxed` tolerates the version and kind-tag irregularities common in
/// real-world producers; it never relaxes type or shape checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    Strict,
    #[default]
    Relaxed,
}

// ── Policy ───────────────────────────────────────────────────────────────────

/// Whether a rule applies to the document at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// The rule's revision is covered by the document; enforce it fully.
    Enforce,
    /// The rule is newer than the document; requiredness is not enforced.
    Ignore,
}

/// Version and mode of one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
    pub version: Version,
    pub mode: ValidationMode,
}

impl VersionPolicy {
    pub fn new(version: Version, mode: ValidationMode) -> Self {
        Self { version, mode }
    }

    pub fn is_relaxed(&self) -> bool {
        self.mode == ValidationMode::Relaxed
    }

    /// Decide whether a rule introduced in `since` applies.
    pub fn applicability(&self, since: Version) -> Applicability {
        if since <= self.version {
            Applicability::Enforce
        } else {
            Applicability::Ignore
        }
    }

    /// Check a present entry introduced in `since`.
    ///
    /// Strict mode rejects entries newer than the document; Relaxed mode
    /// accepts them and the entry is validated like any optional one.
    pub fn check_present(
        &self,
        container: &'static str,
        key: &str,
        since: Version,
    ) -> Result<(), ValidationError> {
        match (self.applicability(since), self.mode) {
            (Applicability::Ignore, ValidationMode::Strict) => {
                Err(ValidationError::VersionViolation {
                    container,
                    key: key.to_string(),
                    since,
                    document: self.version,
                })
            }
            _ => Ok(()),
        }
    }
}
