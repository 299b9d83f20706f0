// ── Common-control constants & structs ────────────────────────────────────────
//
// Hand-defined progress-bar and list-view message values (`commctrl.h`)
// plus the structs their messages point at.  The values are stable Win32
// ABI; keeping them here avoids pulling typed wrappers for what are, on
// the wire, plain `SendMessageW` integers.

use windows::Win32::Foundation::{HWND, POINT};

// ── Progress bar (`msctls_progress32`) ────────────────────────────────────────

const WM_USER: u32 = 0x0400;

pub(crate) const PBM_SETPOS: u32 = WM_USER + 2;
pub(crate) const PBM_SETRANGE32: u32 = WM_USER + 6;
pub(crate) const PBM_SETMARQUEE: u32 = WM_USER + 10;

/// Progress-bar styles.
pub(crate) const PBS_SMOOTH: u32 = 0x0001;
pub(crate) const PBS_MARQUEE: u32 = 0x0008;

pub(crate) const PROGRESS_CLASS: &str = "msctls_progress32";

// ── Static control styles ─────────────────────────────────────────────────────

pub(crate) const SS_CENTER: u32 = 0x0001;

// ── List view (`SysListView32`) ───────────────────────────────────────────────

pub(crate) const LISTVIEW_CLASS: &str = "SysListView32";

const LVM_FIRST: u32 = 0x1000;

pub(crate) const LVM_SETEXTENDEDLISTVIEWSTYLE: u32 = LVM_FIRST + 54;
pub(crate) const LVM_INSERTCOLUMNW: u32 = LVM_FIRST + 97;
pub(crate) const LVM_INSERTITEMW: u32 = LVM_FIRST + 77;
pub(crate) const LVM_SETITEMTEXTW: u32 = LVM_FIRST + 116;
pub(crate) const LVM_SETITEMSTATE: u32 = LVM_FIRST + 43;
pub(crate) const LVM_GETITEMSTATE: u32 = LVM_FIRST + 44;
pub(crate) const LVM_SETCOLUMNWIDTH: u32 = LVM_FIRST + 30;

/// Window styles.
pub(crate) const LVS_REPORT: u32 = 0x0001;
pub(crate) const LVS_SHOWSELALWAYS: u32 = 0x0008;
pub(crate) const LVS_NOSORTHEADER: u32 = 0x8000;

/// Extended styles (set via `LVM_SETEXTENDEDLISTVIEWSTYLE`).
pub(crate) const LVS_EX_GRIDLINES: u32 = 0x0001;
pub(crate) const LVS_EX_CHECKBOXES: u32 = 0x0004;
pub(crate) const LVS_EX_FULLROWSELECT: u32 = 0x0020;

/// `LVITEMW.mask` / state bits.
pub(crate) const LVIF_TEXT: u32 = 0x0001;
pub(crate) const LVIS_STATEIMAGEMASK: u32 = 0xF000;

/// `LVCOLUMNW.mask` bits.
pub(crate) const LVCF_WIDTH: u32 = 0x0002;
pub(crate) const LVCF_TEXT: u32 = 0x0004;

pub(crate) const LVSCW_AUTOSIZE_USEHEADER: isize = -2;

/// `NMHDR.code` for a double click inside a control.
pub(crate) const NM_DBLCLK: u32 = -3i32 as u32;

/// The checkbox state images: 1 = unchecked, 2 = checked, shifted into
/// [`LVIS_STATEIMAGEMASK`].
pub(crate) fn check_state(checked: bool) -> u32 {
    (if checked { 2 } else { 1 }) << 12
}

/// `true` when a raw `LVM_GETITEMSTATE` result reports the checked image.
pub(crate) fn is_checked(state: u32) -> bool {
    (state & LVIS_STATEIMAGEMASK) >> 12 == 2
}

// ── Structs the list-view messages point at ───────────────────────────────────

// Fields are consumed by the control through FFI, not read in Rust.
#[allow(dead_code)]
#[repr(C)]
pub(crate) struct LVCOLUMNW {
    pub mask: u32,
    pub fmt: i32,
    pub cx: i32,
    pub psz_text: *mut u16,
    pub cch_text_max: i32,
    pub i_sub_item: i32,
    pub i_image: i32,
    pub i_order: i32,
    pub cx_min: i32,
    pub cx_default: i32,
    pub cx_ideal: i32,
}

impl Default for LVCOLUMNW {
    fn default() -> Self {
        Self {
            mask: 0,
            fmt: 0,
            cx: 0,
            psz_text: std::ptr::null_mut(),
            cch_text_max: 0,
            i_sub_item: 0,
            i_image: 0,
            i_order: 0,
            cx_min: 0,
            cx_default: 0,
            cx_ideal: 0,
        }
    }
}

// Fields are consumed by the control through FFI, not read in Rust.
#[allow(dead_code)]
#[repr(C)]
pub(crate) struct LVITEMW {
    pub mask: u32,
    pub i_item: i32,
    pub i_sub_item: i32,
    pub state: u32,
    pub state_mask: u32,
    pub psz_text: *mut u16,
    pub cch_text_max: i32,
    pub i_image: i32,
    pub l_param: isize,
    pub i_indent: i32,
    pub i_group_id: i32,
    pub c_columns: u32,
    pub pu_columns: *mut u32,
    pub pi_col_fmt: *mut i32,
    pub i_group: i32,
}

impl Default for LVITEMW {
    fn default() -> Self {
        Self {
            mask: 0,
            i_item: 0,
            i_sub_item: 0,
            state: 0,
            state_mask: 0,
            psz_text: std::ptr::null_mut(),
            cch_text_max: 0,
            i_image: 0,
            l_param: 0,
            i_indent: 0,
            i_group_id: 0,
            c_columns: 0,
            pu_columns: std::ptr::null_mut(),
            pi_col_fmt: std::ptr::null_mut(),
            i_group: 0,
        }
    }
}

// Fields are consumed by the control through FFI, not read in Rust.
#[allow(dead_code)]
#[repr(C)]
pub(crate) struct NMHDR {
    pub hwnd_from: HWND,
    pub id_from: usize,
    pub code: u32,
}

// Fields are consumed by the control through FFI, not read in Rust.
#[allow(dead_code)]
#[repr(C)]
pub(crate) struct NMITEMACTIVATE {
    pub hdr: NMHDR,
    pub i_item: i32,
    pub i_sub_item: i32,
    pub u_new_state: u32,
    pub u_old_state: u32,
    pub u_changed: u32,
    pub u_key_flags: u32,
    pub pt_action: POINT,
    pub l_param: isize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_state_images() {
        assert_eq!(check_state(false), 0x1000);
        assert_eq!(check_state(true), 0x2000);
        assert!(is_checked(check_state(true)));
        assert!(!is_checked(check_state(false)));
        // Focus/selection bits outside the image mask are ignored.
        assert!(is_checked(0x2000 | 0x0002));
    }
}
