//! Compile-time limits for the embedded build.
//!
//! These mirror the constants in the original C header (`PLAYBACK_CACHE_SIZE`,
//! `META_EVENT_MAX_DATA_SIZE`, `MAX_MIDI_TRACKS`) so a host tuning memory
//! usage only has to touch this one file.

/// Size in bytes of the sliding window `FileCache` keeps resident.
pub const CACHE_SIZE: usize = 10 * 1024;

/// Largest meta/sysex payload a `MidiMessage` can hold. Longer events are
/// truncated; see `MidiMessage::is_truncated`.
pub const META_EVENT_MAX_DATA_SIZE: usize = 128;

/// Upper bound on the number of tracks a session can track cursors for.
/// Format 1 files with more tracks than this are rejected at open time.
pub const MAX_TRACKS: usize = 32;

/// Number of bytes `FileCache` retreats the window start by on a miss,
/// before refilling. Carried over from the source unchanged; see
/// `cache::FileCache::ensure_window` and DESIGN.md for the rationale (or
/// lack of one).
pub const CACHE_RETREAT_BYTES: u64 = 8;

/// Fixed-point shift used when rescaling ticks to microseconds in `tempo`.
pub const TEMPO_FIXED_POINT_SHIFT: u32 = 8;

/// Default tempo (120 BPM) assumed until the first SetTempo meta event.
pub const DEFAULT_USEC_PER_QUARTER_NOTE: u32 = 500_000;

pub const MICROSECONDS_PER_MINUTE: u64 = 60_000_000;
