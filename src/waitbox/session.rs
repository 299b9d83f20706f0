// ── Wait-session state machine ────────────────────────────────────────────────
//
// Platform-agnostic core of the wait box: rate limiting, progress clamping,
// indeterminate mode, cancellation latching, and ordered teardown.  The
// display layer is abstracted behind two small traits so every state
// transition is unit-testable; `platform::win32` provides the real
// implementations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::INDETERMINATE;

// ── Display-layer traits ──────────────────────────────────────────────────────

/// The wait dialog as the session sees it.
pub(crate) trait WaitDialog {
    /// Poll the dialog's native cancel state.
    fn was_canceled(&mut self) -> bool;

    /// Show the window once its minimum-duration delay has elapsed.
    /// Returns `true` on exactly the call that makes it visible — the
    /// session installs the window hooks at that moment.
    fn reveal_if_due(&mut self) -> bool;

    /// Draw a determinate value. The session only passes values in [1,100].
    fn set_value(&mut self, value: i32);

    /// Switch the bar to its animated "completion unknown" display.
    fn enter_indeterminate(&mut self);

    /// Keepalive tick while indeterminate. The counter increases every
    /// tick; toolkits that only redraw on value change need it, toolkits
    /// with self-animating bars may ignore it.
    fn pulse(&mut self, counter: i32);

    /// Replace the label text.
    fn set_label(&mut self, text: &str);

    /// Give the thread's message queue a tick so the dialog repaints.
    fn pump_events(&mut self);
}

/// The taskbar progress overlay as the session sees it: an opaque OS
/// service that only mirrors the session's state.
pub(crate) trait TaskbarTracker {
    /// 0–100, or [`INDETERMINATE`] for the animated state.
    fn set_progress(&mut self, progress: i32);

    /// Clear the overlay.
    fn end(&mut self);
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Determinate,
    /// One-way: a later determinate value does not leave this phase.
    Indeterminate,
    /// Latched once the user cancels; no further display interaction.
    Canceled,
}

/// One live wait indication.
///
/// `T` (rate-limit timer) and `H` (window hooks) are opaque RAII resources;
/// the session only controls *when* they are released.  Any resource may be
/// absent from the start — acquisition failures degrade the session instead
/// of aborting it, because the host's real work must proceed even without
/// visual feedback.
pub(crate) struct WaitSession<D, B, T, H> {
    /// Flipped by the timer thread every refresh interval; the only
    /// cross-thread state in the component.
    ready: Arc<AtomicBool>,
    phase: Phase,
    last_drawn: i32,
    showing: bool,
    // Teardown releases these strictly in field order: timer, hooks,
    // taskbar, dialog (reverse of acquisition).
    timer: Option<T>,
    hooks: Option<H>,
    taskbar: Option<B>,
    dialog: Option<D>,
    /// Deferred hook installation; runs once, when the dialog first
    /// becomes visible.
    hook_rig: Option<Box<dyn FnOnce() -> Option<H>>>,
}

impl<D: WaitDialog, B: TaskbarTracker, T, H> WaitSession<D, B, T, H> {
    pub(crate) fn new(
        ready: Arc<AtomicBool>,
        dialog: Option<D>,
        taskbar: Option<B>,
        timer: Option<T>,
        hook_rig: Box<dyn FnOnce() -> Option<H>>,
    ) -> Self {
        // First update always passes; the timer only re-arms the flag.
        ready.store(true, Ordering::Release);
        Self {
            ready,
            phase: Phase::Determinate,
            last_drawn: -1,
            showing: true,
            timer,
            hooks: None,
            taskbar,
            dialog,
            hook_rig: Some(hook_rig),
        }
    }

    /// `true` while the session is up and the user has not canceled.
    pub(crate) fn is_showing(&self) -> bool {
        self.showing && self.dialog.is_some() && self.phase != Phase::Canceled
    }

    /// `true` when the next `update` call will actually refresh the display.
    pub(crate) fn is_update_time(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Replace the dialog label text.
    pub(crate) fn set_label(&mut self, text: &str) {
        if self.showing {
            if let Some(dialog) = self.dialog.as_mut() {
                dialog.set_label(text);
            }
        }
    }

    /// Submit a progress value and poll for cancellation.
    ///
    /// Returns `true` once the user has canceled.  Visual refreshes are
    /// limited to one per timer interval regardless of call frequency, so
    /// callers may invoke this from a tight loop.
    pub(crate) fn update(&mut self, progress: i32) -> bool {
        if !self.showing {
            return false;
        }
        if self.phase == Phase::Canceled {
            return true;
        }
        if !self.ready.load(Ordering::Acquire) {
            return false;
        }
        let Some(dialog) = self.dialog.as_mut() else {
            // Degraded session: nothing to draw on, nothing to cancel with.
            return false;
        };

        if dialog.was_canceled() {
            self.phase = Phase::Canceled;
            if let Some(taskbar) = self.taskbar.as_mut() {
                taskbar.end();
            }
            return true;
        }

        self.ready.store(false, Ordering::Release);

        if dialog.reveal_if_due() {
            if let Some(rig) = self.hook_rig.take() {
                self.hooks = rig();
            }
        }

        if progress == INDETERMINATE || self.phase == Phase::Indeterminate {
            if self.phase != Phase::Indeterminate {
                self.phase = Phase::Indeterminate;
                if let Some(taskbar) = self.taskbar.as_mut() {
                    taskbar.set_progress(INDETERMINATE);
                }
                dialog.enter_indeterminate();
                self.last_drawn = 1;
            }
            dialog.pulse(self.last_drawn);
            self.last_drawn += 1;
        } else {
            // 0 is reserved as "not yet started" and must never reach the
            // display layer; everything else lands in [1,100].
            let value = progress.clamp(1, 100);
            if value != self.last_drawn {
                dialog.set_value(value);
                if let Some(taskbar) = self.taskbar.as_mut() {
                    taskbar.set_progress(value);
                }
                self.last_drawn = value;
            }
        }

        dialog.pump_events();
        false
    }

    /// Tear the session down: timer, then hooks, then taskbar, then dialog.
    /// Safe to call any number of times, including on a degraded session.
    pub(crate) fn hide(&mut self) {
        if !self.showing {
            return;
        }
        self.showing = false;
        self.hook_rig = None;
        drop(self.timer.take());
        drop(self.hooks.take());
        if let Some(mut taskbar) = self.taskbar.take() {
            taskbar.end();
        }
        drop(self.dialog.take());
    }
}

impl<D, B, T, H> Drop for WaitSession<D, B, T, H> {
    fn drop(&mut self) {
        // Same order as hide(); the Option fields are already empty when
        // hide() ran first.
        drop(self.timer.take());
        drop(self.hooks.take());
        drop(self.taskbar.take());
        drop(self.dialog.take());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct MockDialog {
        log: Log,
        canceled: Rc<RefCell<bool>>,
        reveal_on_tick: u32,
        ticks: u32,
    }

    impl WaitDialog for MockDialog {
        fn was_canceled(&mut self) -> bool {
            *self.canceled.borrow()
        }
        fn reveal_if_due(&mut self) -> bool {
            self.ticks += 1;
            self.ticks == self.reveal_on_tick
        }
        fn set_value(&mut self, value: i32) {
            self.log.borrow_mut().push(format!("value {value}"));
        }
        fn enter_indeterminate(&mut self) {
            self.log.borrow_mut().push("indeterminate".to_owned());
        }
        fn pulse(&mut self, counter: i32) {
            self.log.borrow_mut().push(format!("pulse {counter}"));
        }
        fn set_label(&mut self, text: &str) {
            self.log.borrow_mut().push(format!("label {text}"));
        }
        fn pump_events(&mut self) {}
    }

    impl Drop for MockDialog {
        fn drop(&mut self) {
            self.log.borrow_mut().push("drop dialog".to_owned());
        }
    }

    struct MockTaskbar {
        log: Log,
    }

    impl TaskbarTracker for MockTaskbar {
        fn set_progress(&mut self, progress: i32) {
            self.log.borrow_mut().push(format!("taskbar {progress}"));
        }
        fn end(&mut self) {
            self.log.borrow_mut().push("taskbar end".to_owned());
        }
    }

    impl Drop for MockTaskbar {
        fn drop(&mut self) {
            self.log.borrow_mut().push("drop taskbar".to_owned());
        }
    }

    struct MockTimer(Log);
    impl Drop for MockTimer {
        fn drop(&mut self) {
            self.0.borrow_mut().push("drop timer".to_owned());
        }
    }

    struct MockHooks(Log);
    impl Drop for MockHooks {
        fn drop(&mut self) {
            self.0.borrow_mut().push("drop hooks".to_owned());
        }
    }

    struct Rig {
        session: WaitSession<MockDialog, MockTaskbar, MockTimer, MockHooks>,
        ready: Arc<AtomicBool>,
        canceled: Rc<RefCell<bool>>,
        log: Log,
    }

    /// Build a full session whose dialog reveals on the first tick.
    fn rig() -> Rig {
        rig_revealing_on(1)
    }

    fn rig_revealing_on(tick: u32) -> Rig {
        let log: Log = Rc::default();
        let ready = Arc::new(AtomicBool::new(false));
        let canceled = Rc::new(RefCell::new(false));
        let dialog = MockDialog {
            log: Rc::clone(&log),
            canceled: Rc::clone(&canceled),
            reveal_on_tick: tick,
            ticks: 0,
        };
        let taskbar = MockTaskbar { log: Rc::clone(&log) };
        let timer = MockTimer(Rc::clone(&log));
        let hook_log = Rc::clone(&log);
        let session = WaitSession::new(
            Arc::clone(&ready),
            Some(dialog),
            Some(taskbar),
            Some(timer),
            Box::new(move || {
                hook_log.borrow_mut().push("install hooks".to_owned());
                Some(MockHooks(hook_log))
            }),
        );
        Rig { session, ready, canceled, log }
    }

    fn arm(r: &Rig) {
        r.ready.store(true, Ordering::Release);
    }

    fn drawn(r: &Rig) -> Vec<String> {
        r.log.borrow().clone()
    }

    #[test]
    fn first_update_is_always_ready() {
        let mut r = rig();
        // new() arms the flag itself; no timer tick needed.
        assert!(!r.session.update(10));
        assert!(drawn(&r).contains(&"value 10".to_owned()));
    }

    #[test]
    fn updates_between_ticks_do_not_touch_the_display() {
        let mut r = rig();
        assert!(!r.session.update(10)); // consumes the armed flag
        let before = drawn(&r);
        assert!(!r.session.update(20));
        assert!(!r.session.update(30));
        assert_eq!(drawn(&r), before);
        arm(&r);
        assert!(!r.session.update(30));
        assert!(drawn(&r).contains(&"value 30".to_owned()));
    }

    #[test]
    fn out_of_range_values_clamp_into_1_to_100() {
        let mut r = rig();
        r.session.update(150);
        arm(&r);
        r.session.update(0);
        arm(&r);
        r.session.update(-7);
        let events = drawn(&r);
        assert!(events.contains(&"value 100".to_owned()));
        assert!(events.contains(&"value 1".to_owned()));
        // -7 clamps to 1 == last drawn → suppressed, so exactly one "value 1"
        assert_eq!(events.iter().filter(|e| *e == "value 1").count(), 1);
    }

    #[test]
    fn unchanged_value_is_not_redrawn() {
        let mut r = rig();
        r.session.update(50);
        arm(&r);
        r.session.update(50);
        let events = drawn(&r);
        assert_eq!(events.iter().filter(|e| *e == "value 50").count(), 1);
    }

    #[test]
    fn taskbar_mirrors_drawn_values() {
        let mut r = rig();
        r.session.update(42);
        assert!(drawn(&r).contains(&"taskbar 42".to_owned()));
    }

    #[test]
    fn cancel_latches_and_short_circuits() {
        let mut r = rig();
        *r.canceled.borrow_mut() = true;
        assert!(r.session.update(10));
        assert!(drawn(&r).contains(&"taskbar end".to_owned()));

        // Even with the native state cleared, the latch holds and the
        // display is never touched again.
        *r.canceled.borrow_mut() = false;
        let before = drawn(&r);
        arm(&r);
        assert!(r.session.update(10));
        assert_eq!(drawn(&r), before);
        assert!(!r.session.is_showing());
    }

    #[test]
    fn sentinel_enters_indeterminate_with_incrementing_pulse() {
        let mut r = rig();
        r.session.update(INDETERMINATE);
        arm(&r);
        r.session.update(INDETERMINATE);
        let events = drawn(&r);
        assert!(events.contains(&"indeterminate".to_owned()));
        assert!(events.contains(&format!("taskbar {INDETERMINATE}")));
        assert!(events.contains(&"pulse 1".to_owned()));
        assert!(events.contains(&"pulse 2".to_owned()));
    }

    #[test]
    fn indeterminate_is_sticky() {
        let mut r = rig();
        r.session.update(INDETERMINATE);
        arm(&r);
        // A later determinate value keeps pulsing instead of drawing 75.
        r.session.update(75);
        let events = drawn(&r);
        assert!(events.contains(&"pulse 2".to_owned()));
        assert!(!events.contains(&"value 75".to_owned()));
        // ... and it only enters once.
        assert_eq!(events.iter().filter(|e| *e == "indeterminate").count(), 1);
    }

    #[test]
    fn hooks_install_once_at_first_reveal() {
        let mut r = rig_revealing_on(2);
        r.session.update(10);
        assert!(!drawn(&r).contains(&"install hooks".to_owned()));
        arm(&r);
        r.session.update(20);
        arm(&r);
        r.session.update(30);
        let events = drawn(&r);
        assert_eq!(events.iter().filter(|e| *e == "install hooks").count(), 1);
    }

    #[test]
    fn hide_releases_in_reverse_acquisition_order() {
        let mut r = rig();
        r.session.update(10); // installs hooks on first tick
        r.log.borrow_mut().clear();
        r.session.hide();
        assert_eq!(
            drawn(&r),
            vec![
                "drop timer".to_owned(),
                "drop hooks".to_owned(),
                "taskbar end".to_owned(),
                "drop taskbar".to_owned(),
                "drop dialog".to_owned(),
            ]
        );
    }

    #[test]
    fn hide_is_idempotent() {
        let mut r = rig();
        r.session.hide();
        let after_first = drawn(&r);
        r.session.hide();
        r.session.hide();
        assert_eq!(drawn(&r), after_first);
        assert!(!r.session.is_showing());
        // A torn-down session reports "not canceled" without touching anything.
        assert!(!r.session.update(50));
    }

    #[test]
    fn drop_without_hide_still_releases_everything() {
        let r = rig();
        let log = Rc::clone(&r.log);
        drop(r.session);
        let events = log.borrow().clone();
        assert!(events.contains(&"drop timer".to_owned()));
        assert!(events.contains(&"drop taskbar".to_owned()));
        assert!(events.contains(&"drop dialog".to_owned()));
    }

    #[test]
    fn degraded_session_without_dialog_is_inert() {
        let log: Log = Rc::default();
        let ready = Arc::new(AtomicBool::new(false));
        let mut session: WaitSession<MockDialog, MockTaskbar, MockTimer, MockHooks> =
            WaitSession::new(
                Arc::clone(&ready),
                None,
                Some(MockTaskbar { log: Rc::clone(&log) }),
                None,
                Box::new(|| None),
            );
        assert!(!session.update(50));
        assert!(!session.is_showing());
        session.set_label("ignored");
        assert!(log.borrow().is_empty());
        session.hide(); // must not panic; taskbar still ends
        assert!(log.borrow().contains(&"taskbar end".to_owned()));
    }

    #[test]
    fn label_changes_reach_the_dialog() {
        let mut r = rig();
        r.session.set_label("stage two");
        assert!(drawn(&r).contains(&"label stage two".to_owned()));
    }

    #[test]
    fn update_time_tracks_the_flag() {
        let r = rig();
        assert!(r.session.is_update_time());
        r.ready.store(false, Ordering::Release);
        assert!(!r.session.is_update_time());
    }
}
