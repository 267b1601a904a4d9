//! Fallback path: start a fresh instance with the URI on its command line.

use std::env::consts::EXE_SUFFIX;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::LaunchError;
use crate::uri::Uri;

/// How the target executable is named and where it is looked up.
///
/// The channel comes from build metadata and is handed in explicitly rather
/// than read from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub base_name: String,
    pub channel: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub search_path: bool,
}

impl LaunchConfig {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            channel: None,
            install_dir: None,
            search_path: true,
        }
    }

    pub fn with_channel(mut self, channel: Option<String>) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_install_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.install_dir = dir;
        self
    }

    pub fn with_search_path(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    /// `<base>[-<channel>]<exe suffix>`
    pub fn executable_name(&self) -> String {
        match self.channel.as_deref().map(str::trim) {
            Some(channel) if !channel.is_empty() => {
                format!("{}-{}{}", self.base_name, channel, EXE_SUFFIX)
            }
            _ => format!("{}{}", self.base_name, EXE_SUFFIX),
        }
    }

    pub fn resolve(&self) -> Result<PathBuf, LaunchError> {
        let name = self.executable_name();
        let mut searched = Vec::new();

        if let Some(dir) = &self.install_dir {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(dir.display().to_string());
        }

        if self.search_path {
            match which::which(&name) {
                Ok(path) => return Ok(path),
                Err(err) => debug!(name = %name, error = %err, "PATH lookup failed"),
            }
            searched.push("PATH".to_string());
        }

        Err(LaunchError::NotFound {
            name,
            searched: if searched.is_empty() {
                "nowhere".to_string()
            } else {
                searched.join(", ")
            },
        })
    }
}

pub trait Launcher {
    /// Start a new instance with `uri` as its only argument; does not wait.
    fn launch_new(&self, uri: &Uri) -> Result<(), LaunchError>;
}

impl<T: Launcher + ?Sized> Launcher for &T {
    fn launch_new(&self, uri: &Uri) -> Result<(), LaunchError> {
        (**self).launch_new(uri)
    }
}

#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    config: LaunchConfig,
}

impl ProcessLauncher {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }
}

impl Launcher for ProcessLauncher {
    fn launch_new(&self, uri: &Uri) -> Result<(), LaunchError> {
        let path = self.config.resolve()?;

        let mut cmd = Command::new(&path);
        cmd.arg(uri.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);

        // Dropping the Child neither waits for nor kills the process.
        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            path: path.clone(),
            source,
        })?;
        info!(pid = child.id(), exe = %path.display(), "launched new instance");
        Ok(())
    }
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows_sys::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS};

    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;

    cmd.process_group(0);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}
