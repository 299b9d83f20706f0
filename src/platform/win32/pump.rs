// ── Thread message-queue drain ────────────────────────────────────────────────
//
// The host's long-running operations never yield to their own message
// loop.  Draining the queue here is what keeps both the host windows and
// the wait dialog painting while work is in flight.

#![allow(unsafe_code)]

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
};

/// Dispatch every message currently queued for the calling thread, then
/// return.  Never blocks.
pub(crate) fn process_events() {
    let mut msg = MSG::default();
    // SAFETY: &mut msg is a valid MSG pointer; HWND::default() (null)
    // retrieves messages for all windows on this thread; PM_REMOVE pops
    // each message so the loop terminates once the queue is empty.
    unsafe {
        while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
            // TranslateMessage's return (whether a WM_CHAR was generated)
            // and DispatchMessageW's LRESULT are intentionally unused.
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
}
