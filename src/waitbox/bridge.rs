// ── Window-state mirroring rules ──────────────────────────────────────────────
//
// The host window and the wait dialog each run their own message loop on
// the same thread, and no native parent/child relationship can exist
// between the two UI trees.  The platform hook layer observes size-state
// messages on either window and replays placement/visibility onto the
// other; the mapping itself lives here so it can be tested without hooks.
//
// Message and hit-test constants are defined locally (stable Win32 ABI
// values) so this module builds on every target.

/// `WM_SIZE`.
pub(crate) const WM_SIZE: u32 = 0x0005;
/// `WM_NCLBUTTONDOWN`.
pub(crate) const WM_NCLBUTTONDOWN: u32 = 0x00A1;
/// `WM_NCRBUTTONDOWN`.
pub(crate) const WM_NCRBUTTONDOWN: u32 = 0x00A4;
/// `HTCAPTION` — the non-client hit test landed on the title bar.
pub(crate) const HTCAPTION: u32 = 2;

/// `WM_SIZE` wParam values.
const SIZE_RESTORED: usize = 0;
const SIZE_MINIMIZED: usize = 1;
const SIZE_MAXIMIZED: usize = 2;

// ── Events ────────────────────────────────────────────────────────────────────

/// Which of the two synchronized windows a size-state message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowSide {
    /// The host application's main window.
    Host,
    /// The wait dialog.
    Dialog,
}

/// A size-state transition observed on one of the two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateChange {
    Minimized,
    Restored,
    Maximized,
}

impl StateChange {
    /// Map a `WM_SIZE` wParam to a tracked transition. Returns `None` for
    /// size changes we do not mirror (`SIZE_MAXHIDE`, `SIZE_MAXSHOW`).
    pub(crate) fn from_size_wparam(wparam: usize) -> Option<Self> {
        match wparam {
            SIZE_MINIMIZED => Some(Self::Minimized),
            SIZE_RESTORED => Some(Self::Restored),
            SIZE_MAXIMIZED => Some(Self::Maximized),
            _ => None,
        }
    }
}

/// What the hook layer must replay onto the opposite window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MirrorAction {
    /// Minimize the host main window.
    MinimizeHost,
    /// Show the host main window normally.
    ShowHost,
    /// Minimize the wait dialog.
    MinimizeDialog,
    /// Show the wait dialog (asynchronously) and raise it to the top
    /// without moving or resizing it.
    RaiseDialog,
}

/// The mirroring rule: a state change on one window produces the action to
/// replay on the other, simulating a parent/child relationship the toolkit
/// cannot provide.
pub(crate) fn mirror(side: WindowSide, change: StateChange) -> Option<MirrorAction> {
    match (side, change) {
        (WindowSide::Dialog, StateChange::Minimized) => Some(MirrorAction::MinimizeHost),
        (WindowSide::Dialog, StateChange::Restored) => Some(MirrorAction::ShowHost),
        // Maximizing a fixed-size dialog cannot happen; nothing to replay.
        (WindowSide::Dialog, StateChange::Maximized) => None,
        (WindowSide::Host, StateChange::Minimized) => Some(MirrorAction::MinimizeDialog),
        (WindowSide::Host, StateChange::Restored)
        | (WindowSide::Host, StateChange::Maximized) => Some(MirrorAction::RaiseDialog),
    }
}

// ── Title-bar click suppression ───────────────────────────────────────────────

/// `true` when a mouse-hook event is a left or right button-down on the
/// dialog title bar.  Swallowing these makes the dialog undraggable and
/// disables the right-click move/size menu.
pub(crate) fn swallow_title_bar_click(message: u32, hit_test: u32) -> bool {
    (message == WM_NCLBUTTONDOWN || message == WM_NCRBUTTONDOWN) && hit_test == HTCAPTION
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_minimize_minimizes_host() {
        assert_eq!(
            mirror(WindowSide::Dialog, StateChange::Minimized),
            Some(MirrorAction::MinimizeHost)
        );
    }

    #[test]
    fn dialog_restore_shows_host() {
        assert_eq!(
            mirror(WindowSide::Dialog, StateChange::Restored),
            Some(MirrorAction::ShowHost)
        );
    }

    #[test]
    fn host_minimize_minimizes_dialog() {
        assert_eq!(
            mirror(WindowSide::Host, StateChange::Minimized),
            Some(MirrorAction::MinimizeDialog)
        );
    }

    #[test]
    fn host_restore_and_maximize_raise_dialog() {
        assert_eq!(
            mirror(WindowSide::Host, StateChange::Restored),
            Some(MirrorAction::RaiseDialog)
        );
        assert_eq!(
            mirror(WindowSide::Host, StateChange::Maximized),
            Some(MirrorAction::RaiseDialog)
        );
    }

    #[test]
    fn dialog_maximize_is_ignored() {
        assert_eq!(mirror(WindowSide::Dialog, StateChange::Maximized), None);
    }

    #[test]
    fn size_wparam_mapping() {
        assert_eq!(StateChange::from_size_wparam(0), Some(StateChange::Restored));
        assert_eq!(StateChange::from_size_wparam(1), Some(StateChange::Minimized));
        assert_eq!(StateChange::from_size_wparam(2), Some(StateChange::Maximized));
        // SIZE_MAXSHOW / SIZE_MAXHIDE are not mirrored
        assert_eq!(StateChange::from_size_wparam(3), None);
        assert_eq!(StateChange::from_size_wparam(4), None);
    }

    #[test]
    fn title_bar_clicks_are_swallowed() {
        assert!(swallow_title_bar_click(WM_NCLBUTTONDOWN, HTCAPTION));
        assert!(swallow_title_bar_click(WM_NCRBUTTONDOWN, HTCAPTION));
    }

    #[test]
    fn other_clicks_pass_through() {
        // Client-area click
        assert!(!swallow_title_bar_click(0x0201, HTCAPTION));
        // Title-bar hover without a button press
        assert!(!swallow_title_bar_click(WM_NCLBUTTONDOWN, 1 /* HTCLIENT */));
    }
}
