// ── Taskbar progress overlay ──────────────────────────────────────────────────
//
// Thin wrapper over the shell's `ITaskbarList3`: start/end a progress
// overlay on a window's taskbar button and feed it values or the
// indeterminate state.  Pure mirror of the wait session — no state machine
// of its own.  Construction failure degrades to "no overlay".

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::Win32::Foundation::HWND;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
};
use windows::Win32::UI::Shell::{
    ITaskbarList3, TaskbarList, TBPF_INDETERMINATE, TBPF_NOPROGRESS, TBPF_NORMAL,
};

use crate::waitbox::INDETERMINATE;

/// One active overlay. Tracks which window currently wears it so `end`
/// can clear the right button.
pub(crate) struct TaskbarProgress {
    list: ITaskbarList3,
    owner: HWND,
    tracking: std::cell::Cell<isize>,
}

impl TaskbarProgress {
    /// Create the shell object and attach a normal-state overlay to
    /// `owner`'s taskbar button.
    pub(crate) fn start(owner: HWND) -> Option<Self> {
        // SAFETY: the host UI thread is (or becomes) an STA; a
        // RPC_E_CHANGED_MODE result just means COM was initialised earlier
        // with another model, which is fine for our in-proc object.
        unsafe {
            let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        }

        // SAFETY: TaskbarList is the documented CLSID for ITaskbarList3;
        // in-proc activation has no other preconditions.
        let list: ITaskbarList3 =
            match unsafe { CoCreateInstance(&TaskbarList, None, CLSCTX_INPROC_SERVER) } {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("taskbar progress unavailable: {e}");
                    return None;
                }
            };

        // SAFETY: freshly created COM object; HrInit must precede other calls.
        if let Err(e) = unsafe { list.HrInit() } {
            log::warn!("taskbar progress unavailable: {e}");
            return None;
        }

        let tracker = Self {
            list,
            owner,
            tracking: std::cell::Cell::new(owner.0 as isize),
        };
        tracker.apply(owner, TBPF_NORMAL);
        Some(tracker)
    }

    /// Move the overlay to another window's taskbar button (the wait dialog
    /// gets its own button once it is a top-level window).
    pub(crate) fn set_tracking_window(&self, hwnd: HWND) {
        let previous = self.current();
        if previous != hwnd {
            self.apply(previous, TBPF_NOPROGRESS);
            self.apply(hwnd, TBPF_NORMAL);
        }
        self.tracking.set(hwnd.0 as isize);
    }

    /// 0–100, or [`INDETERMINATE`] for the animated state.
    pub(crate) fn set_progress(&self, progress: i32) {
        let window = self.current();
        if progress == INDETERMINATE {
            self.apply(window, TBPF_INDETERMINATE);
        } else {
            let value = progress.clamp(0, 100) as u64;
            self.apply(window, TBPF_NORMAL);
            // SAFETY: window is one of the two handles we track; the shell
            // ignores values for windows without a taskbar button.
            if let Err(e) = unsafe { self.list.SetProgressValue(window, value, 100) } {
                log::debug!("taskbar progress value rejected: {e}");
            }
        }
    }

    /// Clear the overlay from both the tracked window and the owner.
    pub(crate) fn end(&self) {
        self.apply(self.current(), TBPF_NOPROGRESS);
        self.apply(self.owner, TBPF_NOPROGRESS);
    }

    fn current(&self) -> HWND {
        HWND(self.tracking.get() as *mut c_void)
    }

    fn apply(&self, window: HWND, state: windows::Win32::UI::Shell::TBPFLAG) {
        // SAFETY: the COM pointer is alive for &self; a stale or buttonless
        // window handle makes the shell return an error we swallow.
        if let Err(e) = unsafe { self.list.SetProgressState(window, state) } {
            log::debug!("taskbar progress state rejected: {e}");
        }
    }
}

impl crate::waitbox::session::TaskbarTracker for TaskbarProgress {
    fn set_progress(&mut self, progress: i32) {
        TaskbarProgress::set_progress(self, progress);
    }

    fn end(&mut self) {
        TaskbarProgress::end(self);
    }
}
