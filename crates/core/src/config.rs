//! # Hand-off Configuration
//!
//! Configuration is loaded from multiple sources in order of precedence:
//! 1. Environment variables (`HANDOFF_*`)
//! 2. Configuration file (`--config`, `HANDOFF_CONFIG`, or `handoff.toml`
//!    next to the launcher executable)
//! 3. Built-in defaults
//!
//! ```toml
//! [instance]
//! window_class = "UriHandoffListener"
//!
//! [staging]
//! dir = "C:\\Users\\me\\AppData\\Local\\Temp\\uri-handoff"
//! orphan_ttl_secs = 86400
//!
//! [notify]
//! timeout_ms = 5000
//!
//! [launch]
//! target = "uri-target"
//! channel = "beta"
//! search_path = true
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::launch::LaunchConfig;

pub const DEFAULT_CONFIG_FILE: &str = "handoff.toml";
const DEFAULT_WINDOW_CLASS: &str = "UriHandoffListener";
const DEFAULT_STAGING_SUBDIR: &str = "uri-handoff";
const DEFAULT_ORPHAN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_TARGET: &str = "uri-target";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    pub instance: InstanceConfig,
    pub staging: StagingConfig,
    pub notify: NotifyConfig,
    pub launch: LaunchSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Window class the running instance registers for its listener.
    pub window_class: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            window_class: DEFAULT_WINDOW_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub dir: PathBuf,
    /// Age after which unconsumed payloads are swept; 0 disables sweeping.
    pub orphan_ttl_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: env::temp_dir().join(DEFAULT_STAGING_SUBDIR),
            orphan_ttl_secs: DEFAULT_ORPHAN_TTL_SECS,
        }
    }
}

impl StagingConfig {
    pub fn orphan_ttl(&self) -> Option<Duration> {
        (self.orphan_ttl_secs > 0).then(|| Duration::from_secs(self.orphan_ttl_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_NOTIFY_TIMEOUT_MS,
        }
    }
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSection {
    /// Executable base name, without channel suffix or extension.
    pub target: String,
    /// Overrides the build's pre-release channel when set.
    pub channel: Option<String>,
    /// Where the target executable lives; defaults to the launcher's directory.
    pub install_dir: Option<PathBuf>,
    pub search_path: bool,
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            channel: None,
            install_dir: None,
            search_path: true,
        }
    }
}

impl LaunchSection {
    /// Builds the launcher settings, filling gaps from build metadata and
    /// the launcher's own location.
    pub fn to_launch_config(
        &self,
        build_channel: Option<&str>,
        exe_dir: Option<PathBuf>,
    ) -> LaunchConfig {
        let channel = self
            .channel
            .clone()
            .or_else(|| build_channel.map(str::to_string));
        LaunchConfig::new(self.target.clone())
            .with_channel(channel)
            .with_install_dir(self.install_dir.clone().or(exe_dir))
            .with_search_path(self.search_path)
    }
}

impl HandoffConfig {
    /// Resolve the config file, read it if present, then apply env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::locate_file(explicit) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn locate_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env::var_os("HANDOFF_CONFIG").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }
        let beside_exe = env::current_exe()
            .ok()?
            .parent()?
            .join(DEFAULT_CONFIG_FILE);
        beside_exe.is_file().then_some(beside_exe)
    }

    /// Applies environment variable overrides using the `HANDOFF_*` namespace.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = env_value("HANDOFF_WINDOW_CLASS") {
            self.instance.window_class = value;
        }
        if let Some(value) = env_value("HANDOFF_STAGING_DIR") {
            self.staging.dir = PathBuf::from(value);
        }
        if let Some(value) = env_value("HANDOFF_ORPHAN_TTL_SECS") {
            self.staging.orphan_ttl_secs = parse_u64("HANDOFF_ORPHAN_TTL_SECS", value)?;
        }
        if let Some(value) = env_value("HANDOFF_NOTIFY_TIMEOUT_MS") {
            self.notify.timeout_ms = parse_u64("HANDOFF_NOTIFY_TIMEOUT_MS", value)?;
        }
        if let Some(value) = env_value("HANDOFF_TARGET") {
            self.launch.target = value;
        }
        if let Some(value) = env_value("HANDOFF_CHANNEL") {
            self.launch.channel = Some(value);
        }
        if let Some(value) = env_value("HANDOFF_INSTALL_DIR") {
            self.launch.install_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = env_value("HANDOFF_SEARCH_PATH") {
            self.launch.search_path = parse_bool("HANDOFF_SEARCH_PATH", value)?;
        }
        Ok(())
    }
}

fn env_value(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_u64(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|err: std::num::ParseIntError| ConfigError::InvalidEnv {
            var,
            reason: err.to_string(),
            value,
        })
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_OVERRIDES: &[&str] = &[
        "HANDOFF_WINDOW_CLASS",
        "HANDOFF_STAGING_DIR",
        "HANDOFF_ORPHAN_TTL_SECS",
        "HANDOFF_NOTIFY_TIMEOUT_MS",
        "HANDOFF_TARGET",
        "HANDOFF_CHANNEL",
        "HANDOFF_INSTALL_DIR",
        "HANDOFF_SEARCH_PATH",
    ];

    fn clear_env() {
        for var in ENV_OVERRIDES.iter().chain(["HANDOFF_CONFIG"].iter()) {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_are_sane() {
        let config = HandoffConfig::default();
        assert_eq!(config.instance.window_class, "UriHandoffListener");
        assert!(config.staging.dir.ends_with("uri-handoff"));
        assert_eq!(config.staging.orphan_ttl(), Some(Duration::from_secs(86_400)));
        assert_eq!(config.notify.timeout(), Duration::from_secs(5));
        assert_eq!(config.launch.target, "uri-target");
        assert!(config.launch.search_path);
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handoff.toml");
        fs::write(
            &path,
            r#"
[instance]
window_class = "MyAppListener"

[staging]
orphan_ttl_secs = 0

[launch]
target = "myapp"
channel = "rc"
"#,
        )
        .unwrap();

        let config = HandoffConfig::load_from_path(&path).unwrap();
        assert_eq!(config.instance.window_class, "MyAppListener");
        assert_eq!(config.staging.orphan_ttl(), None);
        assert_eq!(config.notify.timeout_ms, 5_000);
        assert_eq!(config.launch.target, "myapp");
        assert_eq!(config.launch.channel.as_deref(), Some("rc"));
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[instance\nwindow_class = ").unwrap();

        match HandoffConfig::load_from_path(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn env_overrides_win_over_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handoff.toml");
        fs::write(&path, "[launch]\ntarget = \"from-file\"\n").unwrap();

        env::set_var("HANDOFF_TARGET", "from-env");
        env::set_var("HANDOFF_NOTIFY_TIMEOUT_MS", "250");
        env::set_var("HANDOFF_SEARCH_PATH", "off");
        let config = HandoffConfig::load(Some(&path));
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.launch.target, "from-env");
        assert_eq!(config.notify.timeout(), Duration::from_millis(250));
        assert!(!config.launch.search_path);
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("HANDOFF_ORPHAN_TTL_SECS", "soon");
        let mut config = HandoffConfig::default();
        let result = config.apply_env_overrides();
        clear_env();

        match result {
            Err(ConfigError::InvalidEnv { var, value, .. }) => {
                assert_eq!(var, "HANDOFF_ORPHAN_TTL_SECS");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn launch_section_prefers_explicit_channel() {
        let section = LaunchSection {
            channel: Some("rc".into()),
            ..LaunchSection::default()
        };
        let exe_dir = PathBuf::from("/opt/app");
        let launch = section.to_launch_config(Some("beta"), Some(exe_dir.clone()));
        assert_eq!(launch.channel.as_deref(), Some("rc"));
        assert_eq!(launch.install_dir, Some(exe_dir));

        let launch = LaunchSection::default().to_launch_config(Some("beta"), None);
        assert_eq!(launch.channel.as_deref(), Some("beta"));
        assert_eq!(launch.install_dir, None);
    }
}
