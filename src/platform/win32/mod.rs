// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the one module in the codebase where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub(crate) mod chooser; // segment-selection dialog
pub(crate) mod hooks; // thread-scoped window hooks (mirroring, click suppression)
pub(crate) mod host_window; // host main-window lookup
pub(crate) mod pump; // thread message-queue drain
pub(crate) mod sound; // PlaySound wrapper for decoded clips
pub(crate) mod taskbar; // ITaskbarList3 progress overlay
pub(crate) mod update_timer; // timer-queue refresh timer
pub(crate) mod wait_dialog; // the wait-box window itself

mod messages; // hand-defined common-control constants & structs

use std::ffi::c_void;
use std::path::Path;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    LoadImageW, SendMessageW, HICON, ICON_SMALL, IMAGE_ICON, LR_DEFAULTSIZE, LR_LOADFROMFILE,
    WM_SETICON,
};

/// Null-terminated UTF-16 conversion for Win32 string parameters.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// This module's instance handle, used for window-class registration and
/// window creation.
pub(crate) fn module_instance() -> HINSTANCE {
    // SAFETY: GetModuleHandleW(None) returns this module's handle, valid
    // for the process lifetime.
    match unsafe { GetModuleHandleW(None) } {
        Ok(module) => HINSTANCE(module.0),
        Err(_) => HINSTANCE::default(),
    }
}

/// Load an `.ico` file and attach it to a window's title bar.  Returns the
/// icon handle; the caller owns it and releases it with `DestroyIcon` after
/// the window is gone.
pub(crate) fn set_window_icon(hwnd: HWND, path: &Path) -> Option<HICON> {
    let path = wide(&path.to_string_lossy());
    // SAFETY: path is null-terminated UTF-16; LR_LOADFROMFILE reads the
    // file and returns an owned icon handle.
    let handle = unsafe {
        LoadImageW(
            HINSTANCE::default(),
            PCWSTR(path.as_ptr()),
            IMAGE_ICON,
            0,
            0,
            LR_LOADFROMFILE | LR_DEFAULTSIZE,
        )
    };
    match handle {
        Ok(handle) => {
            let icon = HICON(handle.0);
            // SAFETY: hwnd is live; the icon handle stays owned by the caller.
            unsafe {
                let _ = SendMessageW(
                    hwnd,
                    WM_SETICON,
                    WPARAM(ICON_SMALL as usize),
                    LPARAM(icon.0 as isize),
                );
            }
            Some(icon)
        }
        Err(e) => {
            log::warn!("title-bar icon rejected: {e}");
            None
        }
    }
}

/// Convert a stored raw handle back into an `HWND` (`0` means none).
pub(crate) fn hwnd_from_raw(raw: isize) -> HWND {
    HWND(raw as *mut c_void)
}
