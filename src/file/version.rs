//! Engine format-version tags.

use std::{fmt, str::FromStr};

/// The engine version tag a container file was written by, e.g. `2019.4.31f1`.
///
/// The tag parameterizes reflected schema extraction: script field layouts differ between
/// engine releases, so the reflection collaborator receives the declaring file's version
/// alongside the script identity.
///
/// Ordering compares the numeric components only; the release suffix (`f1`, `p3`, ...) is
/// carried for display but does not participate in comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    /// Year-based major version (e.g. 2019)
    pub major: u32,
    /// Minor version within the release year
    pub minor: u32,
    /// Patch version
    pub patch: u32,
    /// Release suffix, e.g. `f1` for final or `p2` for patch releases
    pub suffix: String,
}

impl EngineVersion {
    /// Creates a version from its numeric components with an empty suffix.
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        EngineVersion {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    /// The numeric components as a tuple, for ordering and range checks.
    #[must_use]
    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_tuple().cmp(&other.as_tuple())
    }
}

impl FromStr for EngineVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');

        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| malformed_error!("invalid engine version '{}'", s))?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| malformed_error!("invalid engine version '{}'", s))?;

        // The third component carries the release suffix: "31f1" -> patch 31, suffix "f1"
        let (patch, suffix) = match parts.next() {
            Some(rest) => {
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                let patch = digits
                    .parse()
                    .map_err(|_| malformed_error!("invalid engine version '{}'", s))?;
                (patch, rest[digits.len()..].to_string())
            }
            None => (0, String::new()),
        };

        Ok(EngineVersion {
            major,
            minor,
            patch,
            suffix,
        })
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}",
            self.major, self.minor, self.patch, self.suffix
        )
    }
}
