use std::time::Duration;

use tracing::debug;

use crate::correlation::CorrelationId;
use crate::error::NotifyError;
use crate::locator::{InstanceHandle, WindowSystem, WindowVisitor};
use crate::notifier::Notifier;

/// Desktop without a native listener-window mechanism.
///
/// Enumerates nothing, so every hand-off takes the launch path.
#[derive(Debug, Clone)]
pub struct HeadlessDesktop {
    timeout: Duration,
}

impl HeadlessDesktop {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl WindowSystem for HeadlessDesktop {
    fn for_each_window(&self, _visitor: &mut dyn WindowVisitor) {
        debug!("no native window enumeration on this platform");
    }

    fn class_name(&self, _window: InstanceHandle) -> Option<String> {
        None
    }

    fn root_owner(&self, window: InstanceHandle) -> InstanceHandle {
        window
    }
}

impl Notifier for HeadlessDesktop {
    fn notify(&self, target: InstanceHandle, id: CorrelationId) -> Result<(), NotifyError> {
        debug!(window = target.as_raw(), id = %id, timeout = ?self.timeout, "notify unsupported");
        Err(NotifyError::Unsupported)
    }
}
