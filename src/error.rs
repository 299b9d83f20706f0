// ── Central error type ────────────────────────────────────────────────────────
//
// Fallible operations inside the crate return `error::Result<T>`.  At every
// host-facing boundary the error is caught, logged to the host console, and
// swallowed — a UI helper must never take down the host process.

/// Every error that strut can produce.
#[derive(Debug, thiserror::Error)]
pub enum StrutError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The Ogg Vorbis decoder rejected a clip.
    #[error("Ogg decode error: {0}")]
    Decode(#[from] lewton::VorbisError),

    /// A decoded clip cannot be played (no audio, unsupported shape).
    #[error("unplayable clip: {0}")]
    Unplayable(&'static str),
}

// Convert a windows-crate error (HRESULT) directly into a StrutError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for StrutError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StrutError>;
