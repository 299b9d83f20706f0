// ── Refresh-rate timer ────────────────────────────────────────────────────────
//
// A timer-queue timer that arms the session's update-ready flag on a fixed
// interval.  The callback fires on an OS timer thread but only ever stores
// into one atomic — the flag is the sole cross-thread state in the wait box.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use windows::Win32::Foundation::{BOOLEAN, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Threading::{
    CreateTimerQueue, CreateTimerQueueTimer, DeleteTimerQueueEx, DeleteTimerQueueTimer,
    WT_EXECUTEDEFAULT,
};

unsafe extern "system" fn tick(context: *mut c_void, _timer_fired: BOOLEAN) {
    // SAFETY: context is the AtomicBool inside the Arc held by UpdateTimer;
    // Drop blocks on DeleteTimerQueue* before releasing that Arc, so the
    // pointer is valid for every callback invocation.
    unsafe { (*(context as *const AtomicBool)).store(true, Ordering::Release) };
}

/// RAII timer-queue timer. Dropping it cancels the timer and waits for any
/// in-flight callback before the flag can be freed.
pub(crate) struct UpdateTimer {
    queue: HANDLE,
    timer: HANDLE,
    /// Keeps the callback's target alive for the timer's whole lifetime.
    _flag: Arc<AtomicBool>,
}

impl UpdateTimer {
    /// Start a periodic timer arming `flag` every `period_ms` milliseconds.
    /// Returns `None` (logged) when the queue or timer cannot be created;
    /// the wait box then simply refreshes on every update call.
    pub(crate) fn start(flag: Arc<AtomicBool>, period_ms: u32) -> Option<Self> {
        // SAFETY: no preconditions; returns a fresh queue handle.
        let queue = match unsafe { CreateTimerQueue() } {
            Ok(queue) => queue,
            Err(e) => {
                log::warn!("timer queue unavailable: {e}");
                return None;
            }
        };

        let mut timer = HANDLE::default();
        let context = Arc::as_ptr(&flag) as *const c_void;
        // SAFETY: queue is the handle created above; `context` outlives the
        // timer because `flag` is stored in the returned struct and only
        // released after the delete calls in Drop have flushed callbacks.
        let created = unsafe {
            CreateTimerQueueTimer(
                &mut timer,
                queue,
                Some(tick),
                Some(context),
                period_ms,
                period_ms,
                WT_EXECUTEDEFAULT,
            )
        };
        if let Err(e) = created {
            log::warn!("refresh timer unavailable: {e}");
            // SAFETY: queue was created above and holds no timers.
            let _ = unsafe { DeleteTimerQueueEx(queue, INVALID_HANDLE_VALUE) };
            return None;
        }

        Some(Self { queue, timer, _flag: flag })
    }
}

impl Drop for UpdateTimer {
    fn drop(&mut self) {
        // SAFETY: both handles were created in start() and are deleted
        // exactly once.  INVALID_HANDLE_VALUE makes each call block until
        // running callbacks complete, so `_flag` (dropped after this body)
        // outlives every use of its address.
        unsafe {
            let _ = DeleteTimerQueueTimer(self.queue, self.timer, INVALID_HANDLE_VALUE);
            let _ = DeleteTimerQueueEx(self.queue, INVALID_HANDLE_VALUE);
        }
    }
}
