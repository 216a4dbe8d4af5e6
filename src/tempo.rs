//! Tempo state and fixed-point tick/microsecond rescaling.
//!
//! `SetTempo` meta events give microseconds-per-quarter-note; ticks are
//! converted to wall-clock microseconds by `usec = ticks * usec_per_tick`.
//! To avoid floating point on hosts without an FPU, `usec_per_tick` is kept
//! as a `TEMPO_FIXED_POINT_SHIFT`-bit fixed-point value, recomputed only
//! when tempo actually changes.

use crate::config::{DEFAULT_USEC_PER_QUARTER_NOTE, MICROSECONDS_PER_MINUTE, TEMPO_FIXED_POINT_SHIFT};

#[derive(Clone, Copy, Debug)]
pub struct TempoState {
    usec_per_quarter_note: u32,
    ticks_per_quarter_note: u16,
    /// `usec_per_tick`, scaled by `1 << TEMPO_FIXED_POINT_SHIFT`.
    usec_per_tick_fp: u64,
}

impl TempoState {
    pub fn new(ticks_per_quarter_note: u16) -> TempoState {
        let mut tempo = TempoState {
            usec_per_quarter_note: DEFAULT_USEC_PER_QUARTER_NOTE,
            ticks_per_quarter_note: ticks_per_quarter_note.max(1),
            usec_per_tick_fp: 0,
        };
        tempo.recompute();
        tempo
    }

    pub fn set_usec_per_quarter_note(&mut self, usec_per_quarter_note: u32) {
        self.usec_per_quarter_note = usec_per_quarter_note.max(1);
        self.recompute();
    }

    pub fn usec_per_quarter_note(&self) -> u32 {
        self.usec_per_quarter_note
    }

    pub fn beats_per_minute(&self) -> u32 {
        (MICROSECONDS_PER_MINUTE / self.usec_per_quarter_note as u64) as u32
    }

    fn recompute(&mut self) {
        self.usec_per_tick_fp =
            ((self.usec_per_quarter_note as u64) << TEMPO_FIXED_POINT_SHIFT) / self.ticks_per_quarter_note as u64;
    }

    /// Converts an absolute tick count to absolute microseconds, under the
    /// current (single) tempo. Tempo *changes* mid-stream are handled by
    /// the scheduler re-basing elapsed ticks at each `SetTempo` event
    /// rather than by this function knowing about history.
    ///
    /// A fixed-point overflow is not a malformed-file condition — it only
    /// happens on implausibly long tick spans — so it is logged and
    /// saturated rather than propagated as an error.
    pub fn ticks_to_usec(&self, ticks: u64) -> u64 {
        match ticks.checked_mul(self.usec_per_tick_fp) {
            Some(scaled) => scaled >> TEMPO_FIXED_POINT_SHIFT,
            None => {
                log::warn!("fixed-point tick-to-microsecond conversion overflowed for {} ticks", ticks);
                u64::max_value()
            }
        }
    }

    /// Converts an elapsed microsecond span to ticks, rounding down.
    pub fn usec_to_ticks(&self, usec: u64) -> u64 {
        if self.usec_per_tick_fp == 0 {
            return 0;
        }
        (usec << TEMPO_FIXED_POINT_SHIFT) / self.usec_per_tick_fp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tempo_is_120_bpm() {
        let tempo = TempoState::new(480);
        assert_eq!(tempo.beats_per_minute(), 120);
    }

    #[test]
    fn set_tempo_updates_bpm() {
        let mut tempo = TempoState::new(480);
        tempo.set_usec_per_quarter_note(60 * 1_000_000 / 102);
        assert_eq!(tempo.beats_per_minute(), 102);
    }

    #[test]
    fn round_trips_ticks_and_usec_approximately() {
        let tempo = TempoState::new(480);
        let usec = tempo.ticks_to_usec(480);
        assert_eq!(usec, 500_000);
        let ticks = tempo.usec_to_ticks(usec);
        assert_eq!(ticks, 480);
    }
}
