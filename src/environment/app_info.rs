use super::version::{Version, VersionError};

/// Metadata about the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: Version,
    pub package_name: String,
    pub is_release_build: bool,
}

impl AppInfo {
    /// Info for this crate, taken from the Cargo manifest at compile time.
    pub fn current() -> Result<Self, VersionError> {
        Ok(Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: Version::parse(env!("CARGO_PKG_VERSION"))?,
            package_name: env!("CARGO_PKG_NAME").to_string(),
            is_release_build: !cfg!(debug_assertions),
        })
    }

    /// `name/major.minor[.patch]`
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.version.description())
    }

    /// True when this build is at least `minimum`.
    pub fn supports(&self, minimum: &Version) -> bool {
        self.version.after_or_equals(minimum)
    }
}
