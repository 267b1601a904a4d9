//! # Hand-off Error Types
//!
//! Every failure is terminal for the invocation. Each variant of
//! [`HandoffError`] maps to a process exit status through
//! [`HandoffError::exit_code`]:
//!
//! - **Usage** (exit 1): wrong number of command-line arguments
//! - **Everything else** (exit 2): URI syntax, staging I/O, notification,
//!   launch and configuration failures

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::uri::UriSyntaxError;

/// Exit status for a usage error.
pub const EXIT_USAGE: u8 = 1;
/// Exit status for any other failed hand-off.
pub const EXIT_FAILURE: u8 = 2;

/// Result type for hand-off operations.
pub type HandoffResult<T> = Result<T, HandoffError>;

/// Top-level error of one launcher invocation.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Wrong number of positional arguments.
    #[error("usage: {program} <uri> (expected exactly one URI, got {given} arguments)")]
    Usage {
        /// Program name shown in the message
        program: String,
        /// Number of arguments actually supplied
        given: usize,
    },

    /// The argument is not a syntactically valid URI.
    #[error(transparent)]
    UriSyntax(#[from] UriSyntaxError),

    /// Writing the staged payload failed; nothing was sent.
    #[error("failed to stage payload at {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The running instance did not accept the notification.
    #[error("hand-off to running instance failed: {0}")]
    Notify(#[from] NotifyError),

    /// Starting a new instance failed.
    #[error("failed to launch new instance: {0}")]
    Launch(#[from] LaunchError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HandoffError {
    /// Process exit status reported to the invoking environment.
    pub fn exit_code(&self) -> u8 {
        match self {
            HandoffError::Usage { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

/// Failure of the native notification channel.
///
/// The channel only returns an integer, so a rejection carries nothing more
/// than the receiver's reply code.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("receiver rejected the hand-off (reply code {code})")]
    Rejected { code: isize },

    #[error("receiver did not answer within {after:?}")]
    TimedOut { after: Duration },

    #[error("target window is gone (instance exited)")]
    TargetGone,

    #[error("native notification failed (os error {code})")]
    Os { code: u32 },

    #[error("no native notification channel on this platform")]
    Unsupported,
}

/// Failure to start a new instance of the target application.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("executable '{name}' not found (searched: {searched})")]
    NotFound { name: String, searched: String },

    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
