// ── Host main-window lookup ───────────────────────────────────────────────────
//
// Plugins have no handle to the host's main window; find it by enumerating
// the process's top-level windows and cache the first visible one.  The
// lookup runs before any of our own windows exist, so the cache can never
// point at a wait box or chooser.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicIsize, Ordering};

use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::System::Threading::GetCurrentProcessId;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, IsWindowVisible,
};

static MAIN_WINDOW: AtomicIsize = AtomicIsize::new(0);

unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the address of the `found` slot in main_window(),
    // alive for the whole EnumWindows call.
    let found = unsafe { &mut *(lparam.0 as *mut isize) };

    let mut pid = 0u32;
    // SAFETY: hwnd is a valid window handle supplied by EnumWindows.
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };

    // SAFETY: same handle as above.
    if pid == unsafe { GetCurrentProcessId() } && unsafe { IsWindowVisible(hwnd) }.as_bool() {
        *found = hwnd.0 as isize;
        return BOOL(0); // stop enumerating
    }
    BOOL(1)
}

/// The host application's main window, or `None` if it cannot be found
/// (headless host, lookup ran before the window exists).
pub(crate) fn main_window() -> Option<HWND> {
    let cached = MAIN_WINDOW.load(Ordering::Acquire);
    if cached != 0 {
        return Some(HWND(cached as *mut c_void));
    }

    let mut found: isize = 0;
    // SAFETY: enum_proc only dereferences the pointer we pass here.
    // EnumWindows reports failure when the callback stops it early, so the
    // return value is not meaningful; `found` is.
    let _ = unsafe { EnumWindows(Some(enum_proc), LPARAM(&mut found as *mut isize as isize)) };

    if found == 0 {
        log::warn!("host main window not found; window-dependent features degrade");
        return None;
    }
    MAIN_WINDOW.store(found, Ordering::Release);
    Some(HWND(found as *mut c_void))
}
