// ── Wait box ──────────────────────────────────────────────────────────────────
//
// A modal progress/wait dialog for long-running host operations: rate-limited
// progress updates, an indeterminate mode, cooperative cancellation, and a
// taskbar progress overlay.  The host window and the dialog each pump their
// own message loop on the one UI thread; `bridge` + the platform hook layer
// keep the two windows' minimize/restore state in sync.

#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) mod bridge;
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) mod session;

use std::sync::atomic::{AtomicBool, Ordering};

/// Progress sentinel selecting indeterminate ("completion unknown") mode.
pub const INDETERMINATE: i32 = -1;

// ── Options ───────────────────────────────────────────────────────────────────

/// Appearance of a wait box. `Default` gives the stock title and label.
#[derive(Debug, Clone)]
pub struct WaitBoxOptions<'a> {
    /// Title-bar text.
    pub title: &'a str,
    /// Label shown above the progress bar.
    pub label: &'a str,
    /// Optional `.ico` file for the title bar.
    pub icon: Option<&'a std::path::Path>,
}

impl Default for WaitBoxOptions<'_> {
    fn default() -> Self {
        Self {
            title: "Progress",
            label: "Please wait..",
            icon: None,
        }
    }
}

// ── Uniqueness guard ──────────────────────────────────────────────────────────
//
// At most one live session process-wide. The slot is claimed at show time
// and released when the owning session is hidden or dropped.

static ACTIVE: AtomicBool = AtomicBool::new(false);

#[cfg_attr(not(windows), allow(dead_code))]
fn claim_active() -> bool {
    !ACTIVE.swap(true, Ordering::AcqRel)
}

#[cfg_attr(not(windows), allow(dead_code))]
fn release_active() {
    ACTIVE.store(false, Ordering::Release);
}

// ── Public session object ─────────────────────────────────────────────────────

#[cfg(windows)]
mod api {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use super::session::WaitSession;
    use super::WaitBoxOptions;
    use crate::platform::win32::{hooks, host_window, taskbar, update_timer, wait_dialog};

    /// Interval between visual refreshes. Progress may be reported far more
    /// often; only one refresh lands per interval.
    const UPDATE_INTERVAL_MS: u32 = 100;

    type Session = WaitSession<
        wait_dialog::ProgressDialog,
        taskbar::TaskbarProgress,
        update_timer::UpdateTimer,
        hooks::MirrorHooks,
    >;

    /// A live wait indication, owned by the caller of [`WaitBox::show`].
    ///
    /// Dropping the box hides it; calling [`hide`](WaitBox::hide) first is
    /// equivalent and idempotent.
    pub struct WaitBox {
        inner: Option<Session>,
        owns_slot: bool,
    }

    impl WaitBox {
        /// Create and display a wait box.
        ///
        /// If another wait box is already showing this logs a warning and
        /// returns an inert session — every operation on it is a no-op and
        /// `update` reports not-canceled.  Resource failures (dialog, timer,
        /// taskbar, hooks) likewise degrade rather than abort: the session
        /// simply lacks the failed piece.
        pub fn show(options: &WaitBoxOptions<'_>) -> Self {
            if !super::claim_active() {
                log::warn!("wait box already showing; ignoring second show request");
                return Self { inner: None, owns_slot: false };
            }

            let host = host_window::main_window();
            let ready = Arc::new(AtomicBool::new(true));

            let dialog = wait_dialog::ProgressDialog::create(options, host);
            let taskbar = host.and_then(|owner| {
                let tracker = taskbar::TaskbarProgress::start(owner);
                if let (Some(t), Some(d)) = (tracker.as_ref(), dialog.as_ref()) {
                    // The overlay follows the dialog's own taskbar button.
                    t.set_tracking_window(d.hwnd());
                }
                tracker
            });
            let timer = update_timer::UpdateTimer::start(Arc::clone(&ready), UPDATE_INTERVAL_MS);

            // Hooks are installed only once the dialog actually appears;
            // mirroring a window that is not on screen would drag it there.
            let hook_target = dialog.as_ref().map(|d| d.hwnd());
            let hook_rig = Box::new(move || {
                let host = host?;
                let dialog = hook_target?;
                hooks::MirrorHooks::install(host, dialog)
            });

            Self {
                inner: Some(Session::new(ready, dialog, taskbar, timer, hook_rig)),
                owns_slot: true,
            }
        }

        /// Submit a progress value (1–100, or [`super::INDETERMINATE`]) and
        /// poll for cancellation. Returns `true` once the user has canceled.
        pub fn update(&mut self, progress: i32) -> bool {
            match self.inner.as_mut() {
                Some(session) => session.update(progress),
                None => false,
            }
        }

        /// `true` while the box is up and the user has not canceled.
        pub fn is_showing(&self) -> bool {
            self.inner.as_ref().is_some_and(|s| s.is_showing())
        }

        /// `true` when the next [`update`](Self::update) will refresh the
        /// display. Lets callers batch work between visual ticks.
        pub fn is_update_time(&self) -> bool {
            self.inner.as_ref().is_some_and(|s| s.is_update_time())
        }

        /// Replace the label text.
        pub fn set_label_text(&mut self, text: &str) {
            if let Some(session) = self.inner.as_mut() {
                session.set_label(text);
            }
        }

        /// Tear the box down. No-op when not showing.
        pub fn hide(&mut self) {
            if let Some(session) = self.inner.as_mut() {
                session.hide();
            }
        }
    }

    impl Drop for WaitBox {
        fn drop(&mut self) {
            self.hide();
            if self.owns_slot {
                super::release_active();
            }
        }
    }
}

#[cfg(windows)]
pub use api::WaitBox;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = WaitBoxOptions::default();
        assert_eq!(opts.title, "Progress");
        assert_eq!(opts.label, "Please wait..");
        assert!(opts.icon.is_none());
    }

    #[test]
    fn active_slot_admits_one_session_at_a_time() {
        assert!(claim_active());
        // A second show request while one session lives must be refused.
        assert!(!claim_active());
        release_active();
        assert!(claim_active());
        release_active();
    }
}
