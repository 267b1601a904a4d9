//! Native window enumeration and notification, one backend per OS.

use std::time::Duration;

#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub mod headless;

#[cfg(windows)]
pub type NativeDesktop = windows::Win32Desktop;

#[cfg(not(windows))]
pub type NativeDesktop = headless::HeadlessDesktop;

/// Desktop backend for the current platform; `timeout` bounds each notification.
pub fn native_desktop(timeout: Duration) -> NativeDesktop {
    NativeDesktop::new(timeout)
}
