//! The public facade: owns the cache, header, per-track cursors, tempo
//! state and clock, and drives playback one host-supplied tick at a time.
//!
//! This is the single owned value the design's notes ask for in place of
//! the source's process-wide globals — a host can run as many independent
//! `Session`s as it has memory for for, one per file.

use std::io::{Read, Seek};

use crate::cache::FileCache;
use crate::clock::Clock;
use crate::config::MAX_TRACKS;
use crate::decoder::decode_next;
use crate::error::SmfError;
use crate::handler::{dispatch, SmfHandler};
use crate::header::{parse_header, SmfHeader};
use crate::message::{MessageKind, MetaEventKind, MidiMessage};
use crate::scheduler::{drain_due_events, PlaybackState};
use crate::tempo::TempoState;
use crate::track::{parse_track_header, TrackCursor};

pub struct Session<R, C> {
    cache: FileCache<R>,
    header: SmfHeader,
    cursors: [TrackCursor; MAX_TRACKS],
    pending: [Option<MidiMessage>; MAX_TRACKS],
    tempo: TempoState,
    clock: C,
    state: PlaybackState,
    tick_origin: u64,
    usec_origin: u64,
}

const NO_TRACK_CURSOR: TrackCursor = TrackCursor {
    start: 0,
    end: 0,
    pos: 0,
    running_status: 0,
    next_event_tick: 0,
    finished: true,
};

impl<R: Read + Seek, C: Clock> Session<R, C> {
    /// Opens an SMF stream: parses the header, then every track chunk's
    /// header in sequence, leaving each track cursor positioned at its
    /// first event. Per the design, this folds the source's separate
    /// "open" and "start playing" steps into one call; only `InvalidFormat`
    /// conditions prevent reaching the `Playing` state.
    pub fn open<H: SmfHandler>(reader: R, clock: C, handler: &mut H) -> Result<Session<R, C>, SmfError> {
        let mut cache = FileCache::new(reader);
        let header = parse_header(&mut cache)?;
        handler.on_header(header.format, header.track_count, header.ticks_per_quarter_note);

        let mut cursors = [NO_TRACK_CURSOR; MAX_TRACKS];
        for slot in cursors.iter_mut().take(header.track_count as usize) {
            *slot = parse_track_header(&mut cache)?;
        }

        let mut pending: [Option<MidiMessage>; MAX_TRACKS] = Default::default();
        for index in 0..header.track_count as usize {
            pending[index] = decode_next(&mut cache, &mut cursors[index])?;
        }

        let now = clock.now_micros();
        Ok(Session {
            cache,
            header,
            cursors,
            pending,
            tempo: TempoState::new(header.ticks_per_quarter_note),
            clock,
            state: PlaybackState::Playing,
            tick_origin: 0,
            usec_origin: now,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn header(&self) -> SmfHeader {
        self.header
    }

    pub fn tempo(&self) -> TempoState {
        self.tempo
    }

    /// Advances playback to "now" and dispatches every event that has
    /// become due since the last call. Intended to be called repeatedly
    /// by the host's cooperative scheduling loop (see `design notes` on
    /// single-threaded pull-driven ticking).
    pub fn tick<H: SmfHandler>(&mut self, handler: &mut H) -> Result<(), SmfError> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        let now = self.clock.now_micros();
        if now < self.usec_origin {
            log::warn!(
                "host clock moved backwards by {} us since the last tick, clamping elapsed time to zero",
                self.usec_origin - now
            );
        }
        let elapsed_usec = now.saturating_sub(self.usec_origin);
        let current_tick = self.tick_origin + self.tempo.usec_to_ticks(elapsed_usec);

        let track_count = self.header.track_count as usize;
        let mut next_tick = [0u64; MAX_TRACKS];
        let mut active = [false; MAX_TRACKS];
        for index in 0..track_count {
            if let Some(ref message) = self.pending[index] {
                next_tick[index] = message.abs_tick;
                active[index] = true;
            }
        }

        // Snapshot the (tick, clock) pair this pass's ticks are measured
        // from, so each dispatched event's jitter can be judged against
        // when it was actually due rather than when it happens to fire.
        let tick_origin_before = self.tick_origin;
        let usec_origin_before = self.usec_origin;

        let cache = &mut self.cache;
        let cursors = &mut self.cursors;
        let pending = &mut self.pending;
        let tempo = &mut self.tempo;
        let mut tempo_changed_at = None;

        drain_due_events(
            current_tick,
            &mut next_tick[..track_count],
            &mut active[..track_count],
            |index, _current_tick| {
                let message = pending[index].take()?;

                if message.abs_tick >= tick_origin_before {
                    let ideal_usec = usec_origin_before + tempo.ticks_to_usec(message.abs_tick - tick_origin_before);
                    let jitter_ms = now.saturating_sub(ideal_usec) / 1000;
                    if jitter_ms > 10 {
                        log::warn!(
                            "track {} event at tick {} fired {} ms later than scheduled",
                            index, message.abs_tick, jitter_ms
                        );
                    }
                }

                if let MessageKind::Meta(MetaEventKind::SetTempo) = message.kind {
                    let data = message.data();
                    if data.len() >= 3 {
                        let usec = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | data[2] as u32;
                        tempo.set_usec_per_quarter_note(usec);
                        tempo_changed_at = Some(message.abs_tick);
                    }
                }
                dispatch(handler, index, &message);
                match decode_next(cache, &mut cursors[index]) {
                    Ok(next) => {
                        let next_tick_value = next.as_ref().map(|m| m.abs_tick);
                        pending[index] = next;
                        next_tick_value
                    }
                    Err(err) => {
                        log::warn!("track {} decode error, abandoning track: {}", index, err);
                        None
                    }
                }
            },
        );

        // Rebase tick tracking against the clock so a mid-stream tempo
        // change only affects ticks dispatched from now on, matching the
        // source's `lastTick = currentTick` rebasing at the end of each
        // scheduler pass.
        self.tick_origin = tempo_changed_at.unwrap_or(current_tick).max(current_tick);
        self.usec_origin = self.clock.now_micros();

        if (0..track_count).all(|index| self.cursors[index].is_finished() && self.pending[index].is_none()) {
            self.state = PlaybackState::Finished;
            handler.on_playback_finished();
        }

        Ok(())
    }
}
