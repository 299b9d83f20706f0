// ── Ogg notification player ───────────────────────────────────────────────────
//
// Plays short Ogg Vorbis clips (completion chimes and the like) from memory:
// decode to interleaved 16-bit PCM, wrap in a RIFF/WAVE image, and hand the
// image to the OS sound API.  One clip at a time; an async clip's buffer
// stays alive here until it finishes or `stop()` is called.

use std::io::Cursor;
#[cfg(windows)]
use std::sync::Mutex;

use lewton::inside_ogg::OggStreamReader;

use crate::error::{Result, StrutError};

/// Only 16-bit samples are produced.
const BITS_PER_SAMPLE: u16 = 16;

/// How a clip should be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Block until the clip finishes.
    Sync,
    /// Return immediately; the clip keeps playing.
    Async,
}

// ── Public boundary ───────────────────────────────────────────────────────────

#[cfg(windows)]
static ACTIVE_CLIP: Mutex<Option<Box<[u8]>>> = Mutex::new(None);

/// Decode and play an in-memory Ogg Vorbis clip.
///
/// Failures are logged to the host console and swallowed; a broken
/// notification sound must never interrupt the host's work.  If a clip is
/// already playing, this logs and does nothing.
#[cfg(windows)]
pub fn play(clip: &[u8], mode: PlayMode) {
    let Ok(mut slot) = ACTIVE_CLIP.lock() else {
        return;
    };
    if slot.is_some() {
        log::warn!("a notification clip is already playing");
        return;
    }
    match decode_to_wave(clip) {
        Ok(wave) => {
            let wave = wave.into_boxed_slice();
            match mode {
                PlayMode::Async => {
                    if crate::platform::win32::sound::play_wave(&wave, true) {
                        // Keep the image alive while the OS streams from it.
                        *slot = Some(wave);
                    } else {
                        log::warn!("notification playback failed");
                    }
                }
                PlayMode::Sync => {
                    // Blocks; the buffer outlives playback on its own.
                    if !crate::platform::win32::sound::play_wave(&wave, false) {
                        log::warn!("notification playback failed");
                    }
                }
            }
        }
        Err(e) => log::warn!("notification clip rejected: {e}"),
    }
}

/// Stop any playing clip and release its buffer. Idempotent.
#[cfg(windows)]
pub fn stop() {
    let Ok(mut slot) = ACTIVE_CLIP.lock() else {
        return;
    };
    if slot.take().is_some() {
        crate::platform::win32::sound::stop();
    }
}

// ── Decode pipeline ───────────────────────────────────────────────────────────

/// Decode an Ogg Vorbis clip into a complete in-memory WAVE image.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn decode_to_wave(clip: &[u8]) -> Result<Vec<u8>> {
    let mut reader = OggStreamReader::new(Cursor::new(clip))?;
    let channels = u16::from(reader.ident_hdr.audio_channels);
    let sample_rate = reader.ident_hdr.audio_sample_rate;
    if channels == 0 {
        return Err(StrutError::Unplayable("stream reports zero channels"));
    }

    let mut pcm: Vec<i16> = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        pcm.extend_from_slice(&packet);
    }
    if pcm.is_empty() {
        return Err(StrutError::Unplayable("clip decoded to no samples"));
    }

    Ok(wave_image(channels, sample_rate, &pcm))
}

/// Assemble a canonical RIFF/WAVE PCM image: 44-byte header followed by
/// little-endian interleaved samples.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn wave_image(channels: u16, sample_rate: u32, pcm: &[i16]) -> Vec<u8> {
    let data_len = pcm.len() * 2;
    let block_align = u32::from(channels) * u32::from(BITS_PER_SAMPLE) / 8;

    let mut out = Vec::with_capacity(44 + data_len);
    out.extend_from_slice(b"RIFF");
    // Total file size, not counting the first 8 bytes.
    out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // PCM format chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // WAVE_FORMAT_PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align).to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());
    for sample in pcm {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn wave_image_layout() {
        let pcm: Vec<i16> = vec![0, 1, -1, i16::MAX];
        let img = wave_image(2, 44_100, &pcm);

        assert_eq!(&img[0..4], b"RIFF");
        assert_eq!(u32_at(&img, 4), 36 + 8); // 8 bytes of sample data
        assert_eq!(&img[8..12], b"WAVE");
        assert_eq!(&img[12..16], b"fmt ");
        assert_eq!(u32_at(&img, 16), 16); // PCM chunk size
        assert_eq!(u16_at(&img, 20), 1); // PCM tag
        assert_eq!(u16_at(&img, 22), 2); // channels
        assert_eq!(u32_at(&img, 24), 44_100); // sample rate
        assert_eq!(u32_at(&img, 28), 44_100 * 4); // bytes/sec
        assert_eq!(u16_at(&img, 32), 4); // block align
        assert_eq!(u16_at(&img, 34), 16); // bits/sample
        assert_eq!(&img[36..40], b"data");
        assert_eq!(u32_at(&img, 40), 8);
        assert_eq!(img.len(), 44 + 8);
    }

    #[test]
    fn wave_image_mono() {
        let img = wave_image(1, 22_050, &[0i16; 10]);
        assert_eq!(u16_at(&img, 22), 1);
        assert_eq!(u16_at(&img, 32), 2); // block align = channels * 2
        assert_eq!(u32_at(&img, 28), 22_050 * 2);
    }

    #[test]
    fn samples_are_little_endian() {
        let img = wave_image(1, 8_000, &[0x0102i16]);
        assert_eq!(&img[44..46], &[0x02, 0x01]);
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(decode_to_wave(b"definitely not an ogg stream").is_err());
        assert!(decode_to_wave(&[]).is_err());
    }
}
