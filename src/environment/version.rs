use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    InvalidFormat(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidFormat(text) => write!(f, "Invalid version format: '{text}'"),
        }
    }
}

impl std::error::Error for VersionError {}

/// A `major.minor[.patch]` version with optional pre-release name and build.
///
/// Ordering and equality only look at major, minor and patch (a missing
/// patch counts as 0). Pre-release and build are carried for display.
#[derive(Debug, Clone)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: Option<u32>,
    pre_release: Option<String>,
    build: Option<String>,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
            pre_release: None,
            build: None,
        }
    }

    pub fn with_patch(mut self, patch: u32) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn with_pre_release(mut self, name: impl Into<String>) -> Self {
        self.pre_release = Some(name.into());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Parses `MAJOR[.MINOR[.PATCH[.BUILD]]][-PRERELEASE[.BUILD]]`.
    ///
    /// A build in the pre-release part replaces one in the numeric part. Only
    /// the text between the first and second hyphen counts as pre-release.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(text.to_string());
        let number = |segment: &str| -> Result<u32, VersionError> {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            segment.parse().map_err(|_| invalid())
        };

        // Anything after a second hyphen is ignored.
        let mut parts = text.split('-');
        let numeric = parts.next().unwrap_or_default();
        let pre_release = parts.next();

        let segments: Vec<&str> = numeric.split('.').collect();
        let mut version = Version::new(number(segments[0])?, 0);
        if let Some(minor) = segments.get(1) {
            version.minor = number(minor)?;
        }
        if let Some(patch) = segments.get(2) {
            version.patch = Some(number(patch)?);
        }
        if let Some(build) = segments.get(3) {
            version.build = Some(build.to_string());
        }

        if let Some(pre_release) = pre_release {
            let mut names = pre_release.split('.');
            version.pre_release = names.next().map(str::to_string);
            if let Some(build) = names.next() {
                version.build = Some(build.to_string());
            }
        }

        Ok(version)
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> Option<u32> {
        self.patch
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// `major.minor[.patch]`
    pub fn description(&self) -> String {
        match self.patch {
            Some(patch) => format!("{}.{}.{}", self.major, self.minor, patch),
            None => format!("{}.{}", self.major, self.minor),
        }
    }

    /// `major.minor[.patch][-pre_release][.build]`
    pub fn name(&self) -> String {
        let mut name = self.description();
        if let Some(pre_release) = &self.pre_release {
            name.push('-');
            name.push_str(pre_release);
        }
        if let Some(build) = &self.build {
            name.push('.');
            name.push_str(build);
        }
        name
    }

    pub fn after(&self, other: &Version) -> bool {
        self > other
    }

    pub fn after_or_equals(&self, other: &Version) -> bool {
        self >= other
    }

    pub fn before(&self, other: &Version) -> bool {
        self < other
    }

    pub fn before_or_equals(&self, other: &Version) -> bool {
        self <= other
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
