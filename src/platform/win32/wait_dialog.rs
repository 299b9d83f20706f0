// ── Wait-box window ───────────────────────────────────────────────────────────
//
// The dialog half of the wait session: a fixed-size popup with a label, a
// progress bar, and a cancel button.  Created hidden; it appears only once
// the minimum-duration delay has elapsed (short operations never flash a
// dialog) and is centered over the host main window at that moment.
//
// Closing the window counts as cancel — the session owns the teardown and
// the window must stay alive until it runs.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, DEFAULT_GUI_FONT};
use windows::Win32::UI::Controls::{
    InitCommonControlsEx, ICC_PROGRESS_CLASS, INITCOMMONCONTROLSEX,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyIcon, DestroyWindow,
    GetWindowLongPtrW, GetWindowRect, LoadCursorW, RegisterClassExW, SendMessageW,
    SetWindowLongPtrW, SetWindowPos, SetWindowTextW, ShowWindow, CS_HREDRAW, CS_VREDRAW,
    GWLP_USERDATA, GWL_STYLE, HICON, HMENU, HWND_TOP, IDC_ARROW, SWP_NOACTIVATE, SWP_NOSIZE,
    SW_SHOWNORMAL, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_NCDESTROY,
    WM_SETFONT, WNDCLASSEXW, WS_CAPTION, WS_CHILD, WS_MINIMIZEBOX, WS_POPUP, WS_SYSMENU,
    WS_VISIBLE,
};

use super::messages::{
    PBM_SETMARQUEE, PBM_SETPOS, PBM_SETRANGE32, PBS_MARQUEE, PBS_SMOOTH, PROGRESS_CLASS,
    SS_CENTER,
};
use super::{module_instance, pump, set_window_icon, wide};
use crate::waitbox::session::WaitDialog;
use crate::waitbox::WaitBoxOptions;

// ── Geometry & identity ───────────────────────────────────────────────────────

const CLASS_NAME: PCWSTR = w!("StrutWaitBox");

/// Client-area size in device pixels.
const DIALOG_WIDTH: i32 = 250;
const DIALOG_HEIGHT: i32 = 105;

const BUTTON_WIDTH: i32 = 90;
const BUTTON_HEIGHT: i32 = 25;
const BAR_WIDTH: i32 = 232;
const BAR_HEIGHT: i32 = 21;

/// This much must elapse before the dialog first appears.
const SHOW_DELAY: Duration = Duration::from_millis(2000);

const IDC_CANCEL: usize = 100;

// ── Class registration ────────────────────────────────────────────────────────

static REGISTER: Once = Once::new();
static CLASS_ATOM: AtomicU16 = AtomicU16::new(0);

fn ensure_class() -> bool {
    REGISTER.call_once(|| {
        // SAFETY: IDC_ARROW is a built-in cursor resource that always loads.
        let cursor = match unsafe { LoadCursorW(None, IDC_ARROW) } {
            Ok(cursor) => cursor,
            Err(_) => return,
        };
        let wndclass = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hCursor: cursor,
            // COLOR_BTNFACE + 1: the standard dialog background brush.
            hbrBackground: windows::Win32::Graphics::Gdi::HBRUSH(16usize as *mut c_void),
            lpszClassName: CLASS_NAME,
            hInstance: module_instance(),
            ..Default::default()
        };
        // SAFETY: wndclass is fully initialised; CLASS_NAME is a literal.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        CLASS_ATOM.store(atom, Ordering::Release);
    });
    CLASS_ATOM.load(Ordering::Acquire) != 0
}

// ── Window procedure ──────────────────────────────────────────────────────────

// The cancel flag is shared with the session through a leaked
// `Box<Arc<AtomicBool>>` stored in GWLP_USERDATA and reclaimed on
// WM_NCDESTROY.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_COMMAND => {
            if wparam.0 & 0xFFFF == IDC_CANCEL {
                set_canceled(hwnd);
                return LRESULT(0);
            }
            // SAFETY: arguments come straight from the dispatcher.
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }

        // Closing the dialog is a cancel request; the session destroys the
        // window during teardown.
        WM_CLOSE => {
            set_canceled(hwnd);
            LRESULT(0)
        }

        WM_NCDESTROY => {
            // SAFETY: reclaims the Box leaked in create(); USERDATA is
            // cleared first so no later message can see a dangling pointer.
            let raw = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
            if raw != 0 {
                drop(unsafe { Box::from_raw(raw as *mut Arc<AtomicBool>) });
            }
            // SAFETY: arguments come straight from the dispatcher.
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }

        // SAFETY: arguments come straight from the dispatcher.
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn set_canceled(hwnd: HWND) {
    // SAFETY: USERDATA either holds the pointer attached in create() or 0.
    let raw = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) };
    if raw != 0 {
        // SAFETY: the Box stays alive until WM_NCDESTROY, which cannot have
        // run yet for a window still receiving commands.
        let canceled = unsafe { &*(raw as *const Arc<AtomicBool>) };
        canceled.store(true, Ordering::Release);
    }
}

// ── The dialog ────────────────────────────────────────────────────────────────

/// The wait-box window plus its child controls.  Destroyed on drop; the
/// session guarantees drop order relative to timer, hooks, and taskbar.
pub(crate) struct ProgressDialog {
    hwnd: HWND,
    label: HWND,
    bar: HWND,
    canceled: Arc<AtomicBool>,
    host: Option<HWND>,
    created: Instant,
    visible: bool,
    marquee: bool,
    icon: Option<HICON>,
}

impl ProgressDialog {
    /// Build the (hidden) dialog. Returns `None` (logged) on any failure;
    /// the session then runs without visual feedback.
    pub(crate) fn create(options: &WaitBoxOptions<'_>, host: Option<HWND>) -> Option<Self> {
        if !ensure_class() {
            log::warn!("wait box window class unavailable");
            return None;
        }

        let controls = INITCOMMONCONTROLSEX {
            dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_PROGRESS_CLASS,
        };
        // SAFETY: the struct is fully initialised; repeated calls are fine.
        unsafe { InitCommonControlsEx(&controls) };

        let style = WS_POPUP | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX;
        let mut frame = RECT {
            left: 0,
            top: 0,
            right: DIALOG_WIDTH,
            bottom: DIALOG_HEIGHT,
        };
        // SAFETY: frame is a valid RECT; grows the client size to a full
        // window rectangle for this style.
        let _ = unsafe { AdjustWindowRect(&mut frame, style, false) };

        let title = wide(options.title);
        let canceled = Arc::new(AtomicBool::new(false));

        // SAFETY: class is registered; title outlives the call.  The dialog
        // is a top-level window so it gets its own taskbar button and its
        // own place in the z-order, which is the situation the hook-based
        // mirroring exists to manage.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                CLASS_NAME,
                PCWSTR(title.as_ptr()),
                style,
                0,
                0,
                frame.right - frame.left,
                frame.bottom - frame.top,
                HWND::default(),
                HMENU::default(),
                module_instance(),
                None,
            )
        };
        if hwnd == HWND::default() {
            // SAFETY: reads the error of the just-failed create.
            let code = unsafe { GetLastError().0 };
            log::warn!("wait box window creation failed (error {code:#010x})");
            return None;
        }

        // Attach the shared cancel flag once the window exists; creation
        // messages that arrive earlier see a null slot and no-op.
        let shared = Box::into_raw(Box::new(Arc::clone(&canceled)));
        // SAFETY: hwnd is live; the Box is reclaimed on WM_NCDESTROY.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, shared as isize) };

        let label = create_child(
            hwnd,
            w!("STATIC"),
            options.label,
            WINDOW_STYLE(SS_CENTER),
            10,
            12,
            DIALOG_WIDTH - 20,
            20,
            0,
        );
        let bar = create_child(
            hwnd,
            PCWSTR(wide(PROGRESS_CLASS).as_ptr()),
            "",
            WINDOW_STYLE(PBS_SMOOTH),
            (DIALOG_WIDTH - BAR_WIDTH) / 2,
            40,
            BAR_WIDTH,
            BAR_HEIGHT,
            0,
        );
        let button = create_child(
            hwnd,
            w!("BUTTON"),
            "Cancel",
            WINDOW_STYLE(0),
            (DIALOG_WIDTH - BUTTON_WIDTH) / 2,
            DIALOG_HEIGHT - BUTTON_HEIGHT - 6,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
            IDC_CANCEL,
        );

        for child in [label, bar, button] {
            apply_default_font(child);
        }
        if let Some(bar) = filter_null(bar) {
            // Range 0–100; 0 lets the control settle before the first draw.
            // SAFETY: bar is a live progress control owned by hwnd.
            unsafe {
                let _ = SendMessageW(bar, PBM_SETRANGE32, WPARAM(0), LPARAM(100));
                let _ = SendMessageW(bar, PBM_SETPOS, WPARAM(0), LPARAM(0));
            }
        }

        let icon = options.icon.and_then(|path| set_window_icon(hwnd, path));

        Some(Self {
            hwnd,
            label,
            bar,
            canceled,
            host,
            created: Instant::now(),
            visible: false,
            marquee: false,
            icon,
        })
    }

    /// The dialog's top-level window handle.
    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Center the dialog over the host main window (or leave it where the
    /// system put it when there is no host window).
    fn center_over_host(&self) {
        let Some(host) = self.host else { return };
        let mut own = RECT::default();
        let mut host_rect = RECT::default();
        // SAFETY: both handles are live windows.
        unsafe {
            if GetWindowRect(self.hwnd, &mut own).is_err()
                || GetWindowRect(host, &mut host_rect).is_err()
            {
                return;
            }
        }
        let width = own.right - own.left;
        let height = own.bottom - own.top;
        let x = host_rect.left + ((host_rect.right - host_rect.left) / 2 - width / 2);
        let y = host_rect.top + ((host_rect.bottom - host_rect.top) / 2 - height / 2);
        // SAFETY: moves our own window; size is preserved.
        unsafe {
            let _ = SetWindowPos(self.hwnd, HWND_TOP, x, y, 0, 0, SWP_NOSIZE | SWP_NOACTIVATE);
        }
    }
}

impl WaitDialog for ProgressDialog {
    fn was_canceled(&mut self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    fn reveal_if_due(&mut self) -> bool {
        if self.visible || self.created.elapsed() < SHOW_DELAY {
            return false;
        }
        self.center_over_host();
        // SAFETY: hwnd is our live window; previous visibility is unused.
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOWNORMAL);
        }
        self.visible = true;
        true
    }

    fn set_value(&mut self, value: i32) {
        if let Some(bar) = filter_null(self.bar) {
            // SAFETY: bar is a live progress control.
            unsafe {
                let _ = SendMessageW(bar, PBM_SETPOS, WPARAM(value as usize), LPARAM(0));
            }
        }
    }

    fn enter_indeterminate(&mut self) {
        if self.marquee {
            return;
        }
        self.marquee = true;
        if let Some(bar) = filter_null(self.bar) {
            // SAFETY: bar is a live progress control; adding PBS_MARQUEE
            // then starting the marquee is the documented sequence.
            unsafe {
                let style = GetWindowLongPtrW(bar, GWL_STYLE) | PBS_MARQUEE as isize;
                SetWindowLongPtrW(bar, GWL_STYLE, style);
                let _ = SendMessageW(bar, PBM_SETMARQUEE, WPARAM(1), LPARAM(0));
            }
        }
    }

    fn pulse(&mut self, _counter: i32) {
        // The marquee animates on its own; the counter only matters to
        // toolkits that redraw solely on value change.
    }

    fn set_label(&mut self, text: &str) {
        if let Some(label) = filter_null(self.label) {
            let text = wide(text);
            // SAFETY: label is a live static control; text outlives the call.
            unsafe {
                let _ = SetWindowTextW(label, PCWSTR(text.as_ptr()));
            }
        }
    }

    fn pump_events(&mut self) {
        pump::process_events();
    }
}

impl Drop for ProgressDialog {
    fn drop(&mut self) {
        // SAFETY: hwnd is ours and destroyed exactly once; WM_NCDESTROY
        // reclaims the shared cancel flag.  The icon is detached from the
        // window by destruction, so releasing it afterwards is sound.
        unsafe {
            let _ = DestroyWindow(self.hwnd);
            if let Some(icon) = self.icon.take() {
                let _ = DestroyIcon(icon);
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn create_child(
    parent: HWND,
    class: PCWSTR,
    text: &str,
    extra_style: WINDOW_STYLE,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    id: usize,
) -> HWND {
    let text = wide(text);
    // SAFETY: parent is live; class names are built-in control classes (or
    // the common-controls progress class registered above); text outlives
    // the call.  A null result degrades the feature that needed the child.
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            class,
            PCWSTR(text.as_ptr()),
            WS_CHILD | WS_VISIBLE | extra_style,
            x,
            y,
            width,
            height,
            parent,
            HMENU(id as *mut c_void),
            module_instance(),
            None,
        )
    }
}

fn apply_default_font(child: HWND) {
    let Some(child) = filter_null(child) else { return };
    // SAFETY: DEFAULT_GUI_FONT is a stock object that always exists; the
    // child window is live.
    unsafe {
        let font = GetStockObject(DEFAULT_GUI_FONT);
        let _ = SendMessageW(child, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
    }
}

fn filter_null(hwnd: HWND) -> Option<HWND> {
    if hwnd == HWND::default() {
        None
    } else {
        Some(hwnd)
    }
}
