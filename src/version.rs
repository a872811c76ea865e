//! Build identity for the CLI and the outgoing `User-Agent` header.
//!
//! Git metadata comes from `build.rs`; builds outside a checkout report
//! `unknown` for branch and commit.

/// Crate version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Branch the crate was built from.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Commit the crate was built from.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

fn short_sha() -> &'static str {
    &GIT_SHA[..7.min(GIT_SHA.len())]
}

/// `aerogen version` output, e.g. `0.1.0+main.3f9c2d1` (`.dirty` appended
/// for uncommitted builds).
pub fn version_string() -> String {
    let dirty_suffix = if git_dirty() { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{GIT_BRANCH}.{}{dirty_suffix}", short_sha())
}

/// Value sent as `User-Agent` on every Gemini request, e.g.
/// `aerogen/0.1.0 (3f9c2d1)`.
pub fn user_agent() -> String {
    format!("aerogen/{PKG_VERSION} ({})", short_sha())
}
