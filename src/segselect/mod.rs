// ── Segment chooser ───────────────────────────────────────────────────────────
//
// A multi-segment selection dialog over host-provided segment records:
// check the segments an operation should cover, with hint flags pre-checking
// the usual suspects.  The table model (`table`) is pure presentation logic;
// the dialog itself lives in `platform::win32::chooser`.

#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) mod table;

// ── Hint flags ────────────────────────────────────────────────────────────────

/// Pre-check code segments.
pub const CODE_HINT: u32 = 1 << 0;
/// Pre-check data segments (minus the common never-wanted ones).
pub const DATA_HINT: u32 = 1 << 1;
/// Pre-check `.rdata` specifically.
pub const RDATA_HINT: u32 = 1 << 2;
/// Pre-check external/import segments.
pub const XTRN_HINT: u32 = 1 << 3;

// ── Permission bits ───────────────────────────────────────────────────────────

/// Segment is executable.
pub const PERM_EXEC: u8 = 1 << 0;
/// Segment is writable.
pub const PERM_WRITE: u8 = 1 << 1;
/// Segment is readable.
pub const PERM_READ: u8 = 1 << 2;

// ── Records ───────────────────────────────────────────────────────────────────

/// Classification of a segment in the host database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Normal,
    /// External symbols / import thunks.
    External,
    Code,
    Data,
    JavaImport,
    Group,
    Null,
    Undefined,
    Bss,
    AbsoluteSymbol,
    Common,
    InternalMemory,
    Unknown,
}

impl SegmentKind {
    /// Short label shown in the chooser's type column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORM",
            Self::External => "XTRN",
            Self::Code => "CODE",
            Self::Data => "DATA",
            Self::JavaImport => "JVIMP",
            Self::Group => "GROUP",
            Self::Null => "NULL",
            Self::Undefined => "UNDEF",
            Self::Bss => "BSS",
            Self::AbsoluteSymbol => "ABSSYM",
            Self::Common => "COMM",
            Self::InternalMemory => "IMEM",
            Self::Unknown => "???",
        }
    }
}

/// One segment record as handed over by the host database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    pub name: String,
    pub kind: SegmentKind,
    /// Combination of the `PERM_*` bits.
    pub perm: u8,
    pub start: u64,
    pub end: u64,
}

impl SegmentInfo {
    /// Byte size of the segment.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

// ── Selection dialog ──────────────────────────────────────────────────────────

/// Show the modal segment-selection dialog and return the chosen segments.
///
/// Rows matching `hints` start checked; double-clicking a row toggles it.
/// Returns `None` on cancel or when `segments` is empty.  If the user
/// confirms with nothing checked and there is exactly one segment, that
/// one is returned.
#[cfg(windows)]
pub fn select(
    segments: &[SegmentInfo],
    hints: u32,
    title: &str,
    icon: Option<&std::path::Path>,
) -> Option<Vec<SegmentInfo>> {
    if segments.is_empty() {
        log::warn!("segment chooser: database has no segments");
        return None;
    }

    let rows = table::rows(segments);
    let checked: Vec<bool> = segments
        .iter()
        .map(|seg| table::default_checked(seg, hints))
        .collect();

    let picked = crate::platform::win32::chooser::run(title, icon, &rows, &checked)?;
    let picked = table::resolve_selection(picked, segments.len());
    Some(picked.into_iter().map(|i| segments[i].clone()).collect())
}
