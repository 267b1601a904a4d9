// Win32 backend: EnumWindows for discovery, SendMessageTimeoutW for the signal.

use std::ffi::c_void;
use std::ops::ControlFlow;
use std::time::Duration;

use tracing::{debug, trace};
use windows_sys::Win32::Foundation::{GetLastError, SetLastError, BOOL, FALSE, HWND, LPARAM, TRUE};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetAncestor, GetClassNameW, IsWindow, SendMessageTimeoutW, GA_ROOTOWNER,
    SMTO_ABORTIFHUNG, SMTO_NORMAL,
};

use crate::correlation::CorrelationId;
use crate::error::NotifyError;
use crate::locator::{InstanceHandle, WindowSystem, WindowVisitor};
use crate::notifier::{classify_send_failure, interpret_reply, Notifier, HANDOFF_MESSAGE};

// Class names are capped at 256 characters; leave headroom.
const CLASS_NAME_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
pub struct Win32Desktop {
    timeout: Duration,
}

impl Win32Desktop {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn timeout_ms(&self) -> u32 {
        u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

fn hwnd(handle: InstanceHandle) -> HWND {
    handle.as_raw() as *mut c_void
}

// lparam points at the caller's `&mut dyn WindowVisitor` for the duration of
// the EnumWindows call.
unsafe extern "system" fn visit_window(window: HWND, lparam: LPARAM) -> BOOL {
    let visitor = &mut *(lparam as *mut &mut dyn WindowVisitor);
    match visitor.visit(InstanceHandle::from_raw(window as isize)) {
        ControlFlow::Continue(()) => TRUE,
        ControlFlow::Break(()) => FALSE,
    }
}

impl WindowSystem for Win32Desktop {
    fn for_each_window(&self, visitor: &mut dyn WindowVisitor) {
        let mut visitor = visitor;
        let lparam = &mut visitor as *mut &mut dyn WindowVisitor as LPARAM;
        // FALSE here only means the visitor stopped early.
        unsafe {
            EnumWindows(Some(visit_window), lparam);
        }
    }

    fn class_name(&self, window: InstanceHandle) -> Option<String> {
        let mut buf = [0u16; CLASS_NAME_CAPACITY];
        let len = unsafe { GetClassNameW(hwnd(window), buf.as_mut_ptr(), buf.len() as i32) };
        if len <= 0 {
            trace!(window = window.as_raw(), "class name unavailable");
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn root_owner(&self, window: InstanceHandle) -> InstanceHandle {
        let root = unsafe { GetAncestor(hwnd(window), GA_ROOTOWNER) };
        if root.is_null() {
            window
        } else {
            InstanceHandle::from_raw(root as isize)
        }
    }
}

impl Notifier for Win32Desktop {
    fn notify(&self, target: InstanceHandle, id: CorrelationId) -> Result<(), NotifyError> {
        let window = hwnd(target);
        if unsafe { IsWindow(window) } == 0 {
            return Err(NotifyError::TargetGone);
        }

        let mut reply: usize = 0;
        let sent = unsafe {
            SetLastError(0);
            SendMessageTimeoutW(
                window,
                HANDOFF_MESSAGE,
                0,
                id.as_lparam(),
                SMTO_NORMAL | SMTO_ABORTIFHUNG,
                self.timeout_ms(),
                &mut reply,
            )
        };

        if sent == 0 {
            let code = unsafe { GetLastError() };
            debug!(window = target.as_raw(), id = %id, code, "SendMessageTimeoutW failed");
            let alive = unsafe { IsWindow(window) } != 0;
            return Err(classify_send_failure(code, alive, self.timeout));
        }

        trace!(window = target.as_raw(), id = %id, reply, "notification answered");
        interpret_reply(reply as isize)
    }
}
