//! Single-instance URI hand-off.
//!
//! A short-lived launcher process receives one URI and either hands it to the
//! running instance of the target application (stage the payload in a file,
//! then signal the instance's listener window with the correlation id) or
//! starts a fresh instance with the URI on its command line.

pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod error;
pub mod launch;
pub mod locator;
pub mod notifier;
pub mod platform;
pub mod receiver;
pub mod staging;
pub mod uri;

pub use config::HandoffConfig;
pub use correlation::CorrelationId;
pub use dispatch::{Dispatcher, Handoff};
pub use error::{HandoffError, HandoffResult, LaunchError, NotifyError};
pub use launch::{LaunchConfig, Launcher, ProcessLauncher};
pub use locator::{InstanceHandle, InstanceLocator, WindowSystem, WindowVisitor};
pub use notifier::Notifier;
pub use receiver::PayloadReceiver;
pub use staging::PayloadStaging;
pub use uri::Uri;
