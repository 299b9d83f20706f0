// ── Thread-scoped window hooks ────────────────────────────────────────────────
//
// Two hooks installed while the wait dialog is on screen:
//
//   • WH_CALLWNDPROC — watches WM_SIZE on the host window and the dialog
//     and replays minimize/restore onto the opposite window.  The two run
//     their message loops independently on this thread and cannot be
//     related as parent/child, so the mirroring in `waitbox::bridge` is
//     what keeps them moving together.
//   • WH_MOUSE — swallows title-bar button-downs on the dialog so it
//     cannot be dragged away from the host window.
//
// Hook procedures are free functions; the two target windows are published
// through atomics (same UI thread, but the types must be Send-free).

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicIsize, Ordering};

use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowPos, SetWindowsHookExW, ShowWindow, ShowWindowAsync,
    UnhookWindowsHookEx, CWPSTRUCT, HC_ACTION, HHOOK, HWND_TOP, MOUSEHOOKSTRUCT,
    SWP_ASYNCWINDOWPOS, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW, SW_MINIMIZE, SW_SHOW,
    SW_SHOWNORMAL, WH_CALLWNDPROC, WH_MOUSE,
};

use crate::waitbox::bridge::{self, MirrorAction, StateChange, WindowSide};

static HOST_TARGET: AtomicIsize = AtomicIsize::new(0);
static DIALOG_TARGET: AtomicIsize = AtomicIsize::new(0);

// ── Hook procedures ───────────────────────────────────────────────────────────

unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        // SAFETY: for a WH_MOUSE hook, lParam points to a MOUSEHOOKSTRUCT
        // valid for the duration of this call.
        let info = unsafe { &*(lparam.0 as *const MOUSEHOOKSTRUCT) };
        let on_dialog = info.hwnd.0 as isize == DIALOG_TARGET.load(Ordering::Acquire);
        if on_dialog && bridge::swallow_title_bar_click(wparam.0 as u32, info.wHitTestCode) {
            // Non-zero swallows the event.
            return LRESULT(1);
        }
    }
    // SAFETY: passing the unmodified hook arguments along the chain.
    unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) }
}

unsafe extern "system" fn call_wnd_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        // SAFETY: for a WH_CALLWNDPROC hook, lParam points to a CWPSTRUCT
        // valid for the duration of this call.
        let msg = unsafe { &*(lparam.0 as *const CWPSTRUCT) };
        if msg.message == bridge::WM_SIZE {
            let host = HOST_TARGET.load(Ordering::Acquire);
            let dialog = DIALOG_TARGET.load(Ordering::Acquire);
            let observed = msg.hwnd.0 as isize;
            let side = if observed == dialog && dialog != 0 {
                Some(WindowSide::Dialog)
            } else if observed == host && host != 0 {
                Some(WindowSide::Host)
            } else {
                None
            };
            if let Some(side) = side {
                if let Some(change) = StateChange::from_size_wparam(msg.wParam.0) {
                    if let Some(action) = bridge::mirror(side, change) {
                        apply(action, host, dialog);
                    }
                }
            }
        }
    }
    // SAFETY: passing the unmodified hook arguments along the chain.
    unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) }
}

fn apply(action: MirrorAction, host: isize, dialog: isize) {
    let host = HWND(host as *mut c_void);
    let dialog = HWND(dialog as *mut c_void);
    // SAFETY: both handles were published by install() and stay valid while
    // the hooks are installed (teardown clears the targets before the
    // dialog is destroyed).  ShowWindow return values (previous visibility)
    // are intentionally unused.
    unsafe {
        match action {
            MirrorAction::MinimizeHost => {
                let _ = ShowWindow(host, SW_MINIMIZE);
            }
            MirrorAction::ShowHost => {
                let _ = ShowWindow(host, SW_SHOW);
            }
            MirrorAction::MinimizeDialog => {
                let _ = ShowWindow(dialog, SW_MINIMIZE);
            }
            MirrorAction::RaiseDialog => {
                let _ = ShowWindowAsync(dialog, SW_SHOWNORMAL);
                let _ = SetWindowPos(
                    dialog,
                    HWND_TOP,
                    0,
                    0,
                    0,
                    0,
                    SWP_ASYNCWINDOWPOS | SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
                );
            }
        }
    }
}

// ── Installation ──────────────────────────────────────────────────────────────

/// The pair of installed hooks. Unhooked (and targets cleared) on drop.
pub(crate) struct MirrorHooks {
    mouse: Option<HHOOK>,
    messages: Option<HHOOK>,
}

impl MirrorHooks {
    /// Install both hooks, scoped to the calling (UI) thread.
    ///
    /// Either hook may fail individually; the survivor still does its job.
    /// Returns `None` only when both fail.
    pub(crate) fn install(host: HWND, dialog: HWND) -> Option<Self> {
        HOST_TARGET.store(host.0 as isize, Ordering::Release);
        DIALOG_TARGET.store(dialog.0 as isize, Ordering::Release);

        // SAFETY: thread-scoped hooks with a null module handle are valid
        // for procedures inside this process; GetCurrentThreadId is the
        // UI thread both windows live on.
        let thread = unsafe { GetCurrentThreadId() };
        let mouse = unsafe {
            SetWindowsHookExW(WH_MOUSE, Some(mouse_proc), HINSTANCE::default(), thread)
        }
        .inspect_err(|e| log::warn!("mouse hook unavailable: {e}"))
        .ok();
        let messages = unsafe {
            SetWindowsHookExW(WH_CALLWNDPROC, Some(call_wnd_proc), HINSTANCE::default(), thread)
        }
        .inspect_err(|e| log::warn!("window-message hook unavailable: {e}"))
        .ok();

        if mouse.is_none() && messages.is_none() {
            HOST_TARGET.store(0, Ordering::Release);
            DIALOG_TARGET.store(0, Ordering::Release);
            return None;
        }
        Some(Self { mouse, messages })
    }
}

impl Drop for MirrorHooks {
    fn drop(&mut self) {
        // Clear the targets first so a hook firing between the two unhook
        // calls sees nothing to mirror.
        HOST_TARGET.store(0, Ordering::Release);
        DIALOG_TARGET.store(0, Ordering::Release);
        // SAFETY: each handle came from a successful SetWindowsHookExW and
        // is unhooked exactly once.
        unsafe {
            if let Some(hook) = self.messages.take() {
                let _ = UnhookWindowsHookEx(hook);
            }
            if let Some(hook) = self.mouse.take() {
                let _ = UnhookWindowsHookEx(hook);
            }
        }
    }
}
