//! Build metadata embedded by the build script.

/// Short git commit hash at build time, or `unknown`.
pub const GIT_HASH: &str = env!("SEEDBOX_GIT_HASH");

/// `debug` or `release`.
pub const BUILD_PROFILE: &str = env!("SEEDBOX_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// e.g. `"0.1.0 (abc1234, release)"`
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}
