// ── PlaySound wrapper ─────────────────────────────────────────────────────────

#![allow(unsafe_code)]

use windows::core::PCWSTR;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Media::Audio::{
    PlaySoundW, SND_ASYNC, SND_MEMORY, SND_NODEFAULT, SND_PURGE,
};

/// Play a complete in-memory RIFF/WAVE image.
///
/// Synchronous playback blocks until the clip ends.  For asynchronous
/// playback the caller MUST keep `wave` alive until the clip finishes or
/// [`stop`] is called (see `ogg::ACTIVE_CLIP`).
pub(crate) fn play_wave(wave: &[u8], play_async: bool) -> bool {
    let mut flags = SND_MEMORY | SND_NODEFAULT;
    if play_async {
        flags |= SND_ASYNC;
    }
    // SAFETY: with SND_MEMORY the "name" parameter is read as a pointer to
    // a wave image, not a string; `wave` outlives the call (and, for async,
    // the whole playback per the contract above).
    unsafe { PlaySoundW(PCWSTR(wave.as_ptr() as *const u16), HMODULE::default(), flags) }
        .as_bool()
}

/// Stop any sound this process is playing. Idempotent.
pub(crate) fn stop() {
    // SAFETY: a null sound name with SND_PURGE stops playback; no memory
    // is referenced.
    unsafe {
        let _ = PlaySoundW(PCWSTR::null(), HMODULE::default(), SND_PURGE);
    }
}
