//! # Environment
//!
//! Facts about the running build: its version and application metadata.

pub mod app_info;
pub mod version;

pub use app_info::AppInfo;
pub use version::{Version, VersionError};
