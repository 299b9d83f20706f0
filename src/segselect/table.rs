// ── Chooser table model ───────────────────────────────────────────────────────
//
// Row formatting and default-check logic for the segment chooser, kept
// apart from the dialog so it can be tested directly.  Address columns are
// zero-padded uppercase hex sized to the widest value in the column.

use crate::util::hex_width;

use super::{SegmentInfo, SegmentKind, CODE_HINT, DATA_HINT, RDATA_HINT, XTRN_HINT};
use super::{PERM_EXEC, PERM_READ, PERM_WRITE};

/// Widest address column we will render, in hex digits.
const MAX_COLUMN_DIGITS: usize = 16;

/// Data segments that `DATA_HINT` deliberately leaves unchecked — present
/// in nearly every database but almost never wanted in a scan.
const DATA_FILTER: [&str; 4] = ["HEADER", ".rsrc", ".tls", ".reloc"];

// ── Layout ────────────────────────────────────────────────────────────────────

/// Per-column hex digit counts for one segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnWidths {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) size: usize,
}

/// Fit each address column to its widest value, plus one digit of slack,
/// capped at [`MAX_COLUMN_DIGITS`].
pub(crate) fn column_widths(segments: &[SegmentInfo]) -> ColumnWidths {
    let fit = |values: &mut dyn Iterator<Item = u64>| {
        let widest = values.map(hex_width).max().unwrap_or(1);
        (widest + 1).min(MAX_COLUMN_DIGITS)
    };
    ColumnWidths {
        start: fit(&mut segments.iter().map(|s| s.start)),
        end: fit(&mut segments.iter().map(|s| s.end)),
        size: fit(&mut segments.iter().map(SegmentInfo::size)),
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

/// One fully formatted chooser row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    pub(crate) name: String,
    pub(crate) kind: &'static str,
    pub(crate) perm: String,
    pub(crate) start: String,
    pub(crate) end: String,
    pub(crate) size: String,
}

/// Render the `[RWE]` permission column; absent bits show as dots.
pub(crate) fn perm_string(perm: u8) -> String {
    format!(
        "[{}{}{}]",
        if perm & PERM_READ != 0 { 'R' } else { '.' },
        if perm & PERM_WRITE != 0 { 'W' } else { '.' },
        if perm & PERM_EXEC != 0 { 'E' } else { '.' },
    )
}

/// Format every segment into display rows.
pub(crate) fn rows(segments: &[SegmentInfo]) -> Vec<Row> {
    let widths = column_widths(segments);
    segments
        .iter()
        .map(|seg| Row {
            name: if seg.name.is_empty() { "none".to_owned() } else { seg.name.clone() },
            kind: seg.kind.label(),
            perm: perm_string(seg.perm),
            start: format!("{:0w$X}", seg.start, w = widths.start),
            end: format!("{:0w$X}", seg.end, w = widths.end),
            size: format!("{:0w$X}", seg.size(), w = widths.size),
        })
        .collect()
}

// ── Default checks ────────────────────────────────────────────────────────────

/// Whether a segment starts checked for the given hint flags.
pub(crate) fn default_checked(seg: &SegmentInfo, hints: u32) -> bool {
    match seg.kind {
        SegmentKind::External => hints & XTRN_HINT != 0,
        SegmentKind::Code => hints & CODE_HINT != 0,
        SegmentKind::Data => {
            (hints & RDATA_HINT != 0 && seg.name == ".rdata")
                || (hints & DATA_HINT != 0 && !DATA_FILTER.contains(&seg.name.as_str()))
        }
        _ => false,
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Apply the confirm-time fallback: nothing checked with exactly one
/// segment in the list means that segment.
pub(crate) fn resolve_selection(checked: Vec<usize>, total: usize) -> Vec<usize> {
    if checked.is_empty() && total == 1 {
        vec![0]
    } else {
        checked
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(name: &str, kind: SegmentKind, perm: u8, start: u64, end: u64) -> SegmentInfo {
        SegmentInfo {
            name: name.to_owned(),
            kind,
            perm,
            start,
            end,
        }
    }

    fn sample() -> Vec<SegmentInfo> {
        vec![
            seg(".text", SegmentKind::Code, PERM_READ | PERM_EXEC, 0x401000, 0x425000),
            seg(".data", SegmentKind::Data, PERM_READ | PERM_WRITE, 0x425000, 0x427800),
            seg(".rdata", SegmentKind::Data, PERM_READ, 0x427800, 0x428000),
            seg(".idata", SegmentKind::External, PERM_READ, 0x428000, 0x428200),
            seg(".rsrc", SegmentKind::Data, PERM_READ, 0x428200, 0x429000),
        ]
    }

    #[test]
    fn widths_fit_widest_value_plus_slack() {
        let w = column_widths(&sample());
        // All addresses are 6 hex digits wide → 7 with slack.
        assert_eq!(w.start, 7);
        assert_eq!(w.end, 7);
        // Largest size is 0x24000 (5 digits) → 6 with slack.
        assert_eq!(w.size, 6);
    }

    #[test]
    fn widths_cap_at_sixteen_digits() {
        let segs = vec![seg("big", SegmentKind::Data, PERM_READ, 0, u64::MAX)];
        let w = column_widths(&segs);
        assert_eq!(w.end, 16);
        assert_eq!(w.size, 16);
    }

    #[test]
    fn rows_are_zero_padded_uppercase_hex() {
        let rows = rows(&sample());
        assert_eq!(rows[0].start, "0401000");
        assert_eq!(rows[0].end, "0425000");
        assert_eq!(rows[0].size, "024000");
        assert_eq!(rows[0].kind, "CODE");
    }

    #[test]
    fn empty_name_renders_as_none() {
        let rows = rows(&[seg("", SegmentKind::Normal, 0, 0, 0x10)]);
        assert_eq!(rows[0].name, "none");
    }

    #[test]
    fn perm_column() {
        assert_eq!(perm_string(PERM_READ | PERM_WRITE | PERM_EXEC), "[RWE]");
        assert_eq!(perm_string(PERM_READ), "[R..]");
        assert_eq!(perm_string(PERM_EXEC), "[..E]");
        assert_eq!(perm_string(0), "[...]");
    }

    #[test]
    fn code_hint_checks_code_only() {
        let segs = sample();
        let checked: Vec<bool> = segs.iter().map(|s| default_checked(s, CODE_HINT)).collect();
        assert_eq!(checked, vec![true, false, false, false, false]);
    }

    #[test]
    fn data_hint_skips_the_filter_list() {
        let segs = sample();
        let checked: Vec<bool> = segs.iter().map(|s| default_checked(s, DATA_HINT)).collect();
        // .data and .rdata are data; .rsrc is filtered out.
        assert_eq!(checked, vec![false, true, true, false, false]);
        for name in ["HEADER", ".rsrc", ".tls", ".reloc"] {
            let s = seg(name, SegmentKind::Data, PERM_READ, 0, 0x10);
            assert!(!default_checked(&s, DATA_HINT), "{name} must stay unchecked");
        }
    }

    #[test]
    fn rdata_hint_checks_rdata_specifically() {
        let segs = sample();
        let checked: Vec<bool> = segs.iter().map(|s| default_checked(s, RDATA_HINT)).collect();
        assert_eq!(checked, vec![false, false, true, false, false]);
    }

    #[test]
    fn xtrn_hint_checks_externals() {
        let segs = sample();
        let checked: Vec<bool> = segs.iter().map(|s| default_checked(s, XTRN_HINT)).collect();
        assert_eq!(checked, vec![false, false, false, true, false]);
    }

    #[test]
    fn hints_combine() {
        let segs = sample();
        let hints = CODE_HINT | RDATA_HINT | XTRN_HINT;
        let checked: Vec<bool> = segs.iter().map(|s| default_checked(s, hints)).collect();
        assert_eq!(checked, vec![true, false, true, true, false]);
    }

    #[test]
    fn single_segment_fallback() {
        assert_eq!(resolve_selection(vec![], 1), vec![0]);
        assert_eq!(resolve_selection(vec![], 3), Vec::<usize>::new());
        assert_eq!(resolve_selection(vec![2], 3), vec![2]);
        assert_eq!(resolve_selection(vec![1], 1), vec![1]);
    }

    #[test]
    fn segment_size_saturates() {
        let s = seg("bogus", SegmentKind::Data, 0, 0x20, 0x10);
        assert_eq!(s.size(), 0);
    }
}
