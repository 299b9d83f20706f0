// ── Platform abstraction layer ────────────────────────────────────────────────
//
// Everything OS-specific lives below this module; the rest of the codebase is
// platform-agnostic and compiles (and tests) on any target.  No `unsafe`
// lives here; all Win32 FFI is confined to the `win32` sub-module and never
// leaks outward.

#[cfg(windows)]
pub(crate) mod win32;
