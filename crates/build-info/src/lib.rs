//! Build metadata stamped by `build.rs`.
//!
//! The pre-release channel is the only value the hand-off protocol consumes:
//! it selects which target executable the launcher starts.

use once_cell::sync::Lazy;

#[derive(Debug)]
struct BuildMeta {
    build_id: String,
    git_label: String,
    channel: Option<String>,
}

impl BuildMeta {
    fn collect() -> Self {
        let build_id = option_env!("HANDOFF_BUILD_ID")
            .unwrap_or("unknown build")
            .to_string();
        let git_label = option_env!("HANDOFF_BUILD_GIT")
            .unwrap_or("unknown git")
            .to_string();
        let channel = option_env!("HANDOFF_BUILD_CHANNEL")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Self {
            build_id,
            git_label,
            channel,
        }
    }
}

static META: Lazy<BuildMeta> = Lazy::new(BuildMeta::collect);

/// Full build identifier (e.g. "2026-10-05 15:47:12 UTC | v1.2.3-8a4f1d2-dirty").
pub fn build_id() -> &'static str {
    META.build_id.as_str()
}

/// Git tag/commit detected at build time.
pub fn git_label() -> &'static str {
    META.git_label.as_str()
}

/// Pre-release channel tag ("beta", "rc", ...), `None` for release builds.
pub fn prerelease_channel() -> Option<&'static str> {
    META.channel.as_deref()
}

/// Banner for `--version` output of a specific binary.
pub fn formatted_banner(package: &str, version: &str) -> String {
    match prerelease_channel() {
        Some(channel) => format!("{} {} [{}] | {}", package, version, channel, build_id()),
        None => format!("{} {} | {}", package, version, build_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_contains_package_and_build_id() {
        let banner = formatted_banner("uri-handoff", "0.1.0");
        assert!(banner.starts_with("uri-handoff 0.1.0"));
        assert!(banner.ends_with(build_id()));
    }

    #[test]
    fn channel_is_never_blank() {
        if let Some(channel) = prerelease_channel() {
            assert!(!channel.trim().is_empty());
        }
    }
}
