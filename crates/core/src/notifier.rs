use std::time::Duration;

use crate::correlation::CorrelationId;
use crate::error::NotifyError;
use crate::locator::InstanceHandle;

/// First message id free for application use (`WM_USER`).
pub const HANDOFF_MESSAGE: u32 = 0x0400;

/// Sends the one-word "payload staged" signal to a running instance.
///
/// Blocks until the receiver answers or the implementation's timeout
/// elapses. Reply code 0 means accepted.
pub trait Notifier {
    fn notify(&self, target: InstanceHandle, id: CorrelationId) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, target: InstanceHandle, id: CorrelationId) -> Result<(), NotifyError> {
        (**self).notify(target, id)
    }
}

/// Maps a synchronous reply code to the protocol result.
pub fn interpret_reply(code: isize) -> Result<(), NotifyError> {
    if code == 0 {
        Ok(())
    } else {
        Err(NotifyError::Rejected { code })
    }
}

// Win32 error codes reported by a failed SendMessageTimeoutW.
const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;
const ERROR_TIMEOUT: u32 = 1460;

/// Maps the last-error code of a failed send to the protocol error.
///
/// `alive` is whether the target window still exists after the failure.
/// A hung receiver aborts with no error code set, which counts as a timeout.
pub fn classify_send_failure(code: u32, alive: bool, timeout: Duration) -> NotifyError {
    match code {
        0 | ERROR_TIMEOUT => NotifyError::TimedOut { after: timeout },
        ERROR_INVALID_WINDOW_HANDLE => NotifyError::TargetGone,
        _ if !alive => NotifyError::TargetGone,
        _ => NotifyError::Os { code },
    }
}
