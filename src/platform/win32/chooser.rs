// ── Segment-chooser dialog ────────────────────────────────────────────────────
//
// A modal window with a checkbox list view over the formatted segment rows
// (`segselect::table`) and CONTINUE / CANCEL buttons.  Modality is manual:
// the host main window is disabled for the duration and this dialog pumps
// its own message loop until a verdict lands.  Geometry is remembered for
// the plugin session, in memory only.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicI32, AtomicIsize, AtomicU16, Ordering};
use std::sync::{Mutex, Once};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, DEFAULT_GUI_FONT};
use windows::Win32::UI::Controls::{
    InitCommonControlsEx, ICC_LISTVIEW_CLASSES, INITCOMMONCONTROLSEX,
};
use windows::Win32::UI::Input::KeyboardAndMouse::EnableWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyIcon, DestroyWindow, DispatchMessageW,
    GetClientRect, GetMessageW, GetWindowLongPtrW, GetWindowRect, LoadCursorW, MoveWindow,
    RegisterClassExW, SendMessageW, SetForegroundWindow, SetWindowLongPtrW, ShowWindow,
    TranslateMessage, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HMENU, IDC_ARROW, MSG, SW_SHOW,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_NCDESTROY, WM_NOTIFY, WM_SETFONT,
    WM_SIZE, WNDCLASSEXW, WS_CHILD, WS_EX_CLIENTEDGE, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
};

use super::messages::{
    check_state, is_checked, LISTVIEW_CLASS, LVCF_TEXT, LVCF_WIDTH, LVCOLUMNW, LVIF_TEXT,
    LVIS_STATEIMAGEMASK, LVITEMW, LVM_GETITEMSTATE, LVM_INSERTCOLUMNW, LVM_INSERTITEMW,
    LVM_SETCOLUMNWIDTH, LVM_SETEXTENDEDLISTVIEWSTYLE, LVM_SETITEMSTATE, LVM_SETITEMTEXTW,
    LVSCW_AUTOSIZE_USEHEADER, LVS_EX_CHECKBOXES, LVS_EX_FULLROWSELECT, LVS_EX_GRIDLINES,
    LVS_NOSORTHEADER, LVS_REPORT, LVS_SHOWSELALWAYS, NMHDR, NMITEMACTIVATE, NM_DBLCLK,
};
use super::{host_window, hwnd_from_raw, module_instance, set_window_icon, wide};
use crate::segselect::table::Row;

// ── Identity & layout ─────────────────────────────────────────────────────────

const CLASS_NAME: PCWSTR = w!("StrutSegChooser");

const DEFAULT_WIDTH: i32 = 560;
const DEFAULT_HEIGHT: i32 = 360;

const BUTTON_WIDTH: i32 = 90;
const BUTTON_HEIGHT: i32 = 26;
const MARGIN: i32 = 8;

const IDC_LIST: usize = 100;
const IDC_CONTINUE: usize = 101;
const IDC_CANCEL: usize = 102;

const COLUMNS: [(&str, i32); 6] = [
    ("Name", 140),
    ("Type", 60),
    ("Flags", 60),
    ("Start", 90),
    ("End", 90),
    ("Size", 90),
];

/// Window rectangle remembered across invocations within one plugin session.
static GEOMETRY: Mutex<Option<RECT>> = Mutex::new(None);

// ── Per-dialog state ──────────────────────────────────────────────────────────

/// Verdict values for `ChooserState::verdict`.
const RUNNING: i32 = 0;
const ACCEPTED: i32 = 1;
const CANCELED: i32 = 2;

/// Shared between run() and the window procedure via GWLP_USERDATA.
/// Child handles are stored raw because they are published after creation.
struct ChooserState {
    list: AtomicIsize,
    continue_button: AtomicIsize,
    cancel_button: AtomicIsize,
    verdict: AtomicI32,
}

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

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_COMMAND => {
            if let Some(state) = state_of(hwnd) {
                match wparam.0 & 0xFFFF {
                    IDC_CONTINUE => {
                        state.verdict.store(ACCEPTED, Ordering::Release);
                        return LRESULT(0);
                    }
                    IDC_CANCEL => {
                        state.verdict.store(CANCELED, Ordering::Release);
                        return LRESULT(0);
                    }
                    _ => {}
                }
            }
            // SAFETY: arguments come straight from the dispatcher.
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }

        WM_CLOSE => {
            if let Some(state) = state_of(hwnd) {
                state.verdict.store(CANCELED, Ordering::Release);
            }
            LRESULT(0)
        }

        WM_SIZE => {
            layout_children(hwnd);
            LRESULT(0)
        }

        // Double-clicking a row toggles its check box.
        WM_NOTIFY => {
            if let Some(state) = state_of(hwnd) {
                // SAFETY: for WM_NOTIFY, lParam points to an NMHDR (an
                // NMITEMACTIVATE for list-view click notifications).
                let header = unsafe { &*(lparam.0 as *const NMHDR) };
                let list = hwnd_from_raw(state.list.load(Ordering::Acquire));
                if header.code == NM_DBLCLK && header.hwnd_from == list {
                    let activate = unsafe { &*(lparam.0 as *const NMITEMACTIVATE) };
                    if activate.i_item >= 0 {
                        toggle_check(list, activate.i_item);
                    }
                    return LRESULT(0);
                }
            }
            // SAFETY: arguments come straight from the dispatcher.
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }

        WM_NCDESTROY => {
            // SAFETY: reclaims the Box leaked in run(); USERDATA cleared
            // first so no later message can see a dangling pointer.
            let raw = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
            if raw != 0 {
                drop(unsafe { Box::from_raw(raw as *mut ChooserState) });
            }
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }

        // SAFETY: arguments come straight from the dispatcher.
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn state_of(hwnd: HWND) -> Option<&'static ChooserState> {
    // SAFETY: USERDATA either holds the pointer attached in run() or 0;
    // the Box lives until WM_NCDESTROY, after which USERDATA reads 0.
    let raw = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) };
    if raw == 0 {
        None
    } else {
        // SAFETY: see above.
        Some(unsafe { &*(raw as *const ChooserState) })
    }
}

// ── List-view helpers ─────────────────────────────────────────────────────────

fn item_check(list: HWND, item: i32) -> bool {
    // SAFETY: list is a live list view; LVM_GETITEMSTATE only reads.
    let state = unsafe {
        SendMessageW(
            list,
            LVM_GETITEMSTATE,
            WPARAM(item as usize),
            LPARAM(LVIS_STATEIMAGEMASK as isize),
        )
    };
    is_checked(state.0 as u32)
}

fn set_item_check(list: HWND, item: i32, checked: bool) {
    let mut lvitem = LVITEMW {
        state: check_state(checked),
        state_mask: LVIS_STATEIMAGEMASK,
        ..Default::default()
    };
    // SAFETY: lvitem outlives the call; the control copies what it needs.
    unsafe {
        let _ = SendMessageW(
            list,
            LVM_SETITEMSTATE,
            WPARAM(item as usize),
            LPARAM(&mut lvitem as *mut LVITEMW as isize),
        );
    }
}

fn toggle_check(list: HWND, item: i32) {
    set_item_check(list, item, !item_check(list, item));
}

fn insert_column(list: HWND, index: usize, title: &str, width: i32) {
    let mut text = wide(title);
    let mut column = LVCOLUMNW {
        mask: LVCF_TEXT | LVCF_WIDTH,
        cx: width,
        psz_text: text.as_mut_ptr(),
        ..Default::default()
    };
    // SAFETY: text and column outlive the call; the control copies both.
    unsafe {
        let _ = SendMessageW(
            list,
            LVM_INSERTCOLUMNW,
            WPARAM(index),
            LPARAM(&mut column as *mut LVCOLUMNW as isize),
        );
    }
}

fn set_cell(list: HWND, item: i32, sub_item: i32, text: &str) {
    let mut text = wide(text);
    let mut lvitem = LVITEMW {
        mask: LVIF_TEXT,
        i_item: item,
        i_sub_item: sub_item,
        psz_text: text.as_mut_ptr(),
        ..Default::default()
    };
    let message = if sub_item == 0 { LVM_INSERTITEMW } else { LVM_SETITEMTEXTW };
    // SAFETY: text and lvitem outlive the call; the control copies both.
    unsafe {
        let _ = SendMessageW(
            list,
            message,
            WPARAM(item as usize),
            LPARAM(&mut lvitem as *mut LVITEMW as isize),
        );
    }
}

fn layout_children(hwnd: HWND) {
    let Some(state) = state_of(hwnd) else { return };
    let list = state.list.load(Ordering::Acquire);
    let continue_button = state.continue_button.load(Ordering::Acquire);
    let cancel_button = state.cancel_button.load(Ordering::Acquire);
    // WM_SIZE arrives during creation, before the children exist.
    if list == 0 || continue_button == 0 || cancel_button == 0 {
        return;
    }

    let mut client = RECT::default();
    // SAFETY: hwnd is live; client receives the current client rectangle.
    if unsafe { GetClientRect(hwnd, &mut client) }.is_err() {
        return;
    }
    let width = client.right - client.left;
    let height = client.bottom - client.top;
    let list_height = height - BUTTON_HEIGHT - 3 * MARGIN;
    let buttons_y = height - MARGIN - BUTTON_HEIGHT;

    // SAFETY: child handles belong to hwnd; repaint = true.
    unsafe {
        let _ = MoveWindow(
            hwnd_from_raw(list),
            MARGIN,
            MARGIN,
            width - 2 * MARGIN,
            list_height,
            true,
        );
        let _ = MoveWindow(
            hwnd_from_raw(continue_button),
            width - 2 * (MARGIN + BUTTON_WIDTH),
            buttons_y,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
            true,
        );
        let _ = MoveWindow(
            hwnd_from_raw(cancel_button),
            width - MARGIN - BUTTON_WIDTH,
            buttons_y,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
            true,
        );
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run the chooser modally. Returns the checked row indices, or `None` on
/// cancel (or when the window cannot be created).
pub(crate) fn run(
    title: &str,
    icon: Option<&std::path::Path>,
    rows: &[Row],
    checked: &[bool],
) -> Option<Vec<usize>> {
    if !ensure_class() {
        log::warn!("segment chooser window class unavailable");
        return None;
    }

    let controls = INITCOMMONCONTROLSEX {
        dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
        dwICC: ICC_LISTVIEW_CLASSES,
    };
    // SAFETY: the struct is fully initialised; repeated calls are fine.
    unsafe { InitCommonControlsEx(&controls) };

    let host = host_window::main_window();
    let remembered = GEOMETRY.lock().ok().and_then(|g| *g);
    let (x, y, width, height) = match remembered {
        Some(r) => (r.left, r.top, r.right - r.left, r.bottom - r.top),
        None => (100, 100, DEFAULT_WIDTH, DEFAULT_HEIGHT),
    };

    let title_text = wide(title);
    // SAFETY: class registered above; title outlives the call.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title_text.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            x,
            y,
            width,
            height,
            HWND::default(),
            HMENU::default(),
            module_instance(),
            None,
        )
    };
    if hwnd == HWND::default() {
        // SAFETY: reads the just-failed create's error.
        let code = unsafe { GetLastError().0 };
        log::warn!("segment chooser window creation failed (error {code:#010x})");
        return None;
    }

    // Attach the dialog state once the window exists; creation messages
    // that arrive earlier see a null slot and no-op.
    let state = Box::into_raw(Box::new(ChooserState {
        list: AtomicIsize::new(0),
        continue_button: AtomicIsize::new(0),
        cancel_button: AtomicIsize::new(0),
        verdict: AtomicI32::new(RUNNING),
    }));
    // SAFETY: hwnd is live; the Box is reclaimed on WM_NCDESTROY.
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, state as isize) };

    // List view with checkbox rows.
    // SAFETY: hwnd is live; the list-view class comes from the common
    // controls library initialised above; the class-name Vec outlives the
    // statement it is created in.
    let list = unsafe {
        CreateWindowExW(
            WS_EX_CLIENTEDGE,
            PCWSTR(wide(LISTVIEW_CLASS).as_ptr()),
            PCWSTR::null(),
            WS_CHILD
                | WS_VISIBLE
                | WINDOW_STYLE(LVS_REPORT | LVS_SHOWSELALWAYS | LVS_NOSORTHEADER),
            0,
            0,
            0,
            0,
            hwnd,
            HMENU(IDC_LIST as *mut c_void),
            module_instance(),
            None,
        )
    };
    let continue_button = make_button(hwnd, "CONTINUE", IDC_CONTINUE);
    let cancel_button = make_button(hwnd, "CANCEL", IDC_CANCEL);
    if let Some(state) = state_of(hwnd) {
        state.list.store(list.0 as isize, Ordering::Release);
        state
            .continue_button
            .store(continue_button.0 as isize, Ordering::Release);
        state.cancel_button.store(cancel_button.0 as isize, Ordering::Release);
    }

    // SAFETY: list is live; extended styles are plain bit flags.
    unsafe {
        let _ = SendMessageW(
            list,
            LVM_SETEXTENDEDLISTVIEWSTYLE,
            WPARAM(0),
            LPARAM((LVS_EX_CHECKBOXES | LVS_EX_FULLROWSELECT | LVS_EX_GRIDLINES) as isize),
        );
    }

    for (index, (title, width)) in COLUMNS.iter().enumerate() {
        insert_column(list, index, title, *width);
    }
    for (item, row) in rows.iter().enumerate() {
        let item = item as i32;
        set_cell(list, item, 0, &row.name);
        set_cell(list, item, 1, row.kind);
        set_cell(list, item, 2, &row.perm);
        set_cell(list, item, 3, &row.start);
        set_cell(list, item, 4, &row.end);
        set_cell(list, item, 5, &row.size);
        set_item_check(list, item, checked.get(item as usize).copied().unwrap_or(false));
    }
    for index in 0..COLUMNS.len() {
        // SAFETY: sizes each column to its content plus header.
        unsafe {
            let _ = SendMessageW(
                list,
                LVM_SETCOLUMNWIDTH,
                WPARAM(index),
                LPARAM(LVSCW_AUTOSIZE_USEHEADER),
            );
        }
    }

    for hwnd_child in [list, continue_button, cancel_button] {
        apply_default_font(hwnd_child);
    }
    let icon = icon.and_then(|path| set_window_icon(hwnd, path));
    layout_children(hwnd);
    // SAFETY: hwnd is live; previous visibility is unused.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
    }

    // Manual modality: disable the host, pump until a verdict lands.
    if let Some(host) = host {
        // SAFETY: host is the cached main window; re-enabled below.
        unsafe {
            let _ = EnableWindow(host, false);
        }
    }

    let verdict = modal_loop(hwnd);

    let picked = if verdict == ACCEPTED {
        Some(
            (0..rows.len())
                .filter(|&item| item_check(list, item as i32))
                .collect(),
        )
    } else {
        None
    };

    // Remember geometry for the next invocation in this session.
    let mut rect = RECT::default();
    // SAFETY: hwnd is still live until DestroyWindow below.
    if unsafe { GetWindowRect(hwnd, &mut rect) }.is_ok() {
        if let Ok(mut slot) = GEOMETRY.lock() {
            *slot = Some(rect);
        }
    }

    if let Some(host) = host {
        // SAFETY: undo the disable before the dialog goes away so focus
        // has somewhere to land.
        unsafe {
            let _ = EnableWindow(host, true);
            let _ = SetForegroundWindow(host);
        }
    }
    // SAFETY: hwnd is ours, destroyed exactly once; WM_NCDESTROY reclaims
    // the state Box.  The icon is detached by destruction.
    unsafe {
        let _ = DestroyWindow(hwnd);
        if let Some(icon) = icon {
            let _ = DestroyIcon(icon);
        }
    }

    picked
}

fn modal_loop(hwnd: HWND) -> i32 {
    let mut msg = MSG::default();
    loop {
        if let Some(state) = state_of(hwnd) {
            let verdict = state.verdict.load(Ordering::Acquire);
            if verdict != RUNNING {
                return verdict;
            }
        } else {
            return CANCELED;
        }

        // SAFETY: &mut msg is valid; a null filter window receives messages
        // for every window on this thread.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        match ret.0 {
            // Queue torn down or WM_QUIT — treat as cancel.
            -1 | 0 => return CANCELED,
            _ => unsafe {
                // SAFETY: msg was filled by a successful GetMessageW.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }
}

fn make_button(parent: HWND, caption: &str, id: usize) -> HWND {
    let text = wide(caption);
    // SAFETY: parent is live; BUTTON is a built-in class; text outlives
    // the call.  A null result just leaves the dialog without that button.
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("BUTTON"),
            PCWSTR(text.as_ptr()),
            WS_CHILD | WS_VISIBLE,
            0,
            0,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
            parent,
            HMENU(id as *mut c_void),
            module_instance(),
            None,
        )
    }
}

fn apply_default_font(child: HWND) {
    if child == HWND::default() {
        return;
    }
    // SAFETY: DEFAULT_GUI_FONT is a stock object that always exists; the
    // child window is live.
    unsafe {
        let font = GetStockObject(DEFAULT_GUI_FONT);
        let _ = SendMessageW(child, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
    }
}
