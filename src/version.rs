// Build metadata: name/version from Cargo.toml, the rest from the build environment.

use serde::Serialize;

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable service name reported on /info.
pub const DISPLAY_NAME: &str = "Service Index";

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<&'static str>,
}

impl BuildInfo {
    /// `BUILD_BRANCH`, `BUILD_DATE` and `BUILD_REPO` are read at compile time when set.
    pub fn current() -> Self {
        Self {
            name: DISPLAY_NAME,
            version: VERSION,
            branch: option_env!("BUILD_BRANCH"),
            build_date: option_env!("BUILD_DATE"),
            repo: option_env!("BUILD_REPO"),
        }
    }
}
