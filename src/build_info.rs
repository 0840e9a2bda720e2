/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("TASK_TRACKER_BUILD_GIT_SHA")
}

/// Crate version, suffixed with the commit when known.
pub fn version() -> String {
    match git_sha() {
        Some(sha) => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}
