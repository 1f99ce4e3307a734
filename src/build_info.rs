/// Build information captured at compile time
pub struct BuildInfo;

impl BuildInfo {
    /// Version line shown by `--version`
    pub const LONG_VERSION: &'static str = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("BUILD_TIMESTAMP"),
        ", ",
        env!("GIT_HASH_SHORT"),
        ", ",
        env!("TARGET_PLATFORM"),
        ")"
    );

    /// Version with timestamp, commit and platform, as logged at startup
    pub fn display_version() -> &'static str {
        Self::LONG_VERSION
    }
}
