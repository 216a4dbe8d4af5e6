//! The dispatch/callback surface.
//!
//! `SmfHandler` is the Rust rendering of the design's `CallbackTable`: one
//! method per event kind, every one defaulted to a no-op. A host overrides
//! only the handful it cares about — an unoverridden method is the "null
//! callback skips silently" behavior the design calls for, modeled
//! directly on the defaulted `Handler` trait methods in the pack's newer
//! reader module. Every event callback leads with `(track_idx, abs_tick)`
//! so a host can tell which track and tick it's looking at without the
//! message object itself.

use crate::message::{ChannelVoiceMessage, MetaEventKind, SysExKind};

#[allow(unused_variables)]
pub trait SmfHandler {
    /// Fired once, after the header chunk is parsed and before playback
    /// of any track begins.
    fn on_header(&mut self, format: crate::header::Format, track_count: u16, ticks_per_quarter_note: u16) {}

    fn on_note_off(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, velocity: u8) {}
    fn on_note_on(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, velocity: u8) {}
    fn on_polyphonic_key_pressure(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, pressure: u8) {}
    fn on_control_change(&mut self, track_idx: usize, abs_tick: u64, channel: u8, controller: u8, value: u8) {}
    fn on_program_change(&mut self, track_idx: usize, abs_tick: u64, channel: u8, program: u8) {}
    fn on_channel_pressure(&mut self, track_idx: usize, abs_tick: u64, channel: u8, pressure: u8) {}
    fn on_pitch_bend_change(&mut self, track_idx: usize, abs_tick: u64, channel: u8, value: i16) {}

    fn on_sequence_number(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_text_event(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_copyright_notice(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_track_name(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_instrument_name(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_lyric(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_marker(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_cue_point(&mut self, track_idx: usize, abs_tick: u64, text: &[u8]) {}
    fn on_midi_channel_prefix(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_midi_port(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_end_of_track(&mut self, track_idx: usize, abs_tick: u64) {}
    fn on_set_tempo(&mut self, track_idx: usize, abs_tick: u64, usec_per_quarter_note: u32) {}
    fn on_smpte_offset(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_time_signature(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_key_signature(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_sequencer_specific(&mut self, track_idx: usize, abs_tick: u64, data: &[u8]) {}
    fn on_unknown_meta(&mut self, track_idx: usize, abs_tick: u64, event_type: u8, data: &[u8]) {}

    fn on_sys_ex(&mut self, track_idx: usize, abs_tick: u64, kind: SysExKind, data: &[u8]) {}

    /// Fired when control passes to the next track's events within the
    /// same tick (format 1 files interleave tracks by absolute tick).
    fn on_track_change(&mut self) {}

    /// Fired once every track has reached `EndOfTrack`.
    fn on_playback_finished(&mut self) {}
}

/// Dispatches one decoded message to the matching `SmfHandler` method.
/// Shared by the scheduler so the giant match lives in exactly one place.
pub fn dispatch<H: SmfHandler>(handler: &mut H, track_idx: usize, message: &crate::message::MidiMessage) {
    use crate::message::MessageKind::*;
    let abs_tick = message.abs_tick;
    match message.kind {
        ChannelVoice(ref voice) => dispatch_channel_voice(handler, track_idx, abs_tick, voice),
        Meta(kind) => dispatch_meta(handler, track_idx, abs_tick, kind, message.data()),
        SysEx(kind) => handler.on_sys_ex(track_idx, abs_tick, kind, message.data()),
    }
}

fn dispatch_channel_voice<H: SmfHandler>(handler: &mut H, track_idx: usize, abs_tick: u64, voice: &ChannelVoiceMessage) {
    use ChannelVoiceMessage::*;
    match *voice {
        NoteOff { channel, note, velocity } => handler.on_note_off(track_idx, abs_tick, channel, note, velocity),
        NoteOn { channel, note, velocity } => handler.on_note_on(track_idx, abs_tick, channel, note, velocity),
        PolyphonicKeyPressure { channel, note, pressure } => {
            handler.on_polyphonic_key_pressure(track_idx, abs_tick, channel, note, pressure)
        }
        ControlChange { channel, controller, value } => {
            handler.on_control_change(track_idx, abs_tick, channel, controller, value)
        }
        ProgramChange { channel, program } => handler.on_program_change(track_idx, abs_tick, channel, program),
        ChannelPressure { channel, pressure } => handler.on_channel_pressure(track_idx, abs_tick, channel, pressure),
        PitchBendChange { channel, value } => handler.on_pitch_bend_change(track_idx, abs_tick, channel, value),
    }
}

fn dispatch_meta<H: SmfHandler>(handler: &mut H, track_idx: usize, abs_tick: u64, kind: MetaEventKind, data: &[u8]) {
    use MetaEventKind::*;
    match kind {
        SequenceNumber => handler.on_sequence_number(track_idx, abs_tick, data),
        TextEvent => handler.on_text_event(track_idx, abs_tick, data),
        CopyrightNotice => handler.on_copyright_notice(track_idx, abs_tick, data),
        TrackName => handler.on_track_name(track_idx, abs_tick, data),
        InstrumentName => handler.on_instrument_name(track_idx, abs_tick, data),
        Lyric => handler.on_lyric(track_idx, abs_tick, data),
        Marker => handler.on_marker(track_idx, abs_tick, data),
        CuePoint => handler.on_cue_point(track_idx, abs_tick, data),
        MidiChannelPrefix => handler.on_midi_channel_prefix(track_idx, abs_tick, data),
        MIDIPort => handler.on_midi_port(track_idx, abs_tick, data),
        EndOfTrack => handler.on_end_of_track(track_idx, abs_tick),
        SetTempo => {
            if data.len() >= 3 {
                let usec = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | data[2] as u32;
                handler.on_set_tempo(track_idx, abs_tick, usec);
            } else {
                log::warn!("SetTempo event with short payload ({} bytes), ignoring", data.len());
            }
        }
        SmpteOffset => handler.on_smpte_offset(track_idx, abs_tick, data),
        TimeSignature => handler.on_time_signature(track_idx, abs_tick, data),
        KeySignature => handler.on_key_signature(track_idx, abs_tick, data),
        SequencerSpecific => handler.on_sequencer_specific(track_idx, abs_tick, data),
        Unknown(event_type) => handler.on_unknown_meta(track_idx, abs_tick, event_type, data),
    }
}
