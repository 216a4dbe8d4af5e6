//! Decoded SMF events.
//!
//! `MidiMessage` is a tagged union the way `ghakuf::messages::Message` is,
//! but it owns one fixed `META_EVENT_MAX_DATA_SIZE` buffer instead of a
//! `Vec<u8>` per event, since the core never allocates. Meta and SysEx
//! variants index into that buffer through accessors rather than owning
//! their own storage, which is what keeps the struct `Copy`-free but
//! heap-free too.

use std::fmt;

use crate::config::META_EVENT_MAX_DATA_SIZE;

/// One extra byte past `META_EVENT_MAX_DATA_SIZE` reserved for a NUL
/// terminator on text-kind meta payloads.
const BUFFER_SIZE: usize = META_EVENT_MAX_DATA_SIZE + 1;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ChannelVoiceMessage {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    PolyphonicKeyPressure { channel: u8, note: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBendChange { channel: u8, value: i16 },
}

impl ChannelVoiceMessage {
    pub fn channel(&self) -> u8 {
        use ChannelVoiceMessage::*;
        match *self {
            NoteOff { channel, .. }
            | NoteOn { channel, .. }
            | PolyphonicKeyPressure { channel, .. }
            | ControlChange { channel, .. }
            | ProgramChange { channel, .. }
            | ChannelPressure { channel, .. }
            | PitchBendChange { channel, .. } => channel,
        }
    }
}

impl fmt::Display for ChannelVoiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ChannelVoiceMessage::*;
        match *self {
            NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff(ch {}, note {}, vel {})", channel, note, velocity)
            }
            NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn(ch {}, note {}, vel {})", channel, note, velocity)
            }
            PolyphonicKeyPressure { channel, note, pressure } => write!(
                f,
                "PolyphonicKeyPressure(ch {}, note {}, pressure {})",
                channel, note, pressure
            ),
            ControlChange { channel, controller, value } => {
                write!(f, "ControlChange(ch {}, ctrl {}, val {})", channel, controller, value)
            }
            ProgramChange { channel, program } => write!(f, "ProgramChange(ch {}, program {})", channel, program),
            ChannelPressure { channel, pressure } => write!(f, "ChannelPressure(ch {}, pressure {})", channel, pressure),
            PitchBendChange { channel, value } => write!(f, "PitchBendChange(ch {}, value {})", channel, value),
        }
    }
}

/// Builds a `ChannelVoiceMessage` out of a running status byte and the 1-2
/// data bytes that follow it, mirroring `ghakuf::messages::MidiEventBuilder`.
pub struct ChannelVoiceBuilder {
    status: u8,
    shortage: u8,
    data: [u8; 2],
    filled: usize,
}

impl ChannelVoiceBuilder {
    pub fn new(status: u8) -> ChannelVoiceBuilder {
        ChannelVoiceBuilder {
            status,
            shortage: match status & 0xf0 {
                0x80..=0xb0 | 0xe0 => 2,
                0xc0 | 0xd0 => 1,
                _ => 0,
            },
            data: [0, 0],
            filled: 0,
        }
    }

    pub fn shortage(&self) -> u8 {
        self.shortage
    }

    pub fn push(&mut self, byte: u8) {
        if self.shortage > 0 {
            self.data[self.filled] = byte;
            self.filled += 1;
            self.shortage -= 1;
        }
    }

    pub fn build(&self) -> ChannelVoiceMessage {
        // Wire form is 0-based; the source exposes channels as 1..16, and
        // the design preserves that +1 convention at the decoder boundary.
        let channel = (self.status & 0x0f) + 1;
        match self.status & 0xf0 {
            0x80 => ChannelVoiceMessage::NoteOff { channel, note: self.data[0], velocity: self.data[1] },
            0x90 => ChannelVoiceMessage::NoteOn { channel, note: self.data[0], velocity: self.data[1] },
            0xa0 => ChannelVoiceMessage::PolyphonicKeyPressure { channel, note: self.data[0], pressure: self.data[1] },
            0xb0 => ChannelVoiceMessage::ControlChange { channel, controller: self.data[0], value: self.data[1] },
            0xc0 => ChannelVoiceMessage::ProgramChange { channel, program: self.data[0] },
            0xd0 => ChannelVoiceMessage::ChannelPressure { channel, pressure: self.data[0] },
            0xe0 => {
                let lsb = self.data[0] as u16;
                let msb = (self.data[1] as u16) << 7;
                ChannelVoiceMessage::PitchBendChange {
                    channel,
                    value: (msb | lsb) as i16 - 8192,
                }
            }
            _ => ChannelVoiceMessage::ChannelPressure { channel, pressure: 0 },
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum MetaEventKind {
    SequenceNumber,
    TextEvent,
    CopyrightNotice,
    TrackName,
    InstrumentName,
    Lyric,
    Marker,
    CuePoint,
    MidiChannelPrefix,
    MIDIPort,
    EndOfTrack,
    SetTempo,
    SmpteOffset,
    TimeSignature,
    KeySignature,
    SequencerSpecific,
    Unknown(u8),
}

impl MetaEventKind {
    pub fn from_type_byte(event_type: u8) -> MetaEventKind {
        match event_type {
            0x00 => MetaEventKind::SequenceNumber,
            0x01 => MetaEventKind::TextEvent,
            0x02 => MetaEventKind::CopyrightNotice,
            0x03 => MetaEventKind::TrackName,
            0x04 => MetaEventKind::InstrumentName,
            0x05 => MetaEventKind::Lyric,
            0x06 => MetaEventKind::Marker,
            0x07 => MetaEventKind::CuePoint,
            0x20 => MetaEventKind::MidiChannelPrefix,
            0x21 => MetaEventKind::MIDIPort,
            0x2f => MetaEventKind::EndOfTrack,
            0x51 => MetaEventKind::SetTempo,
            0x54 => MetaEventKind::SmpteOffset,
            0x58 => MetaEventKind::TimeSignature,
            0x59 => MetaEventKind::KeySignature,
            0x7f => MetaEventKind::SequencerSpecific,
            other => MetaEventKind::Unknown(other),
        }
    }

    /// True for the meta kinds whose payload is free-form text, which get a
    /// NUL terminator appended so consumers may treat it as a C-string.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            MetaEventKind::TextEvent
                | MetaEventKind::CopyrightNotice
                | MetaEventKind::TrackName
                | MetaEventKind::InstrumentName
                | MetaEventKind::Lyric
                | MetaEventKind::Marker
                | MetaEventKind::CuePoint
        )
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SysExKind {
    /// `0xF0`: a normal SysEx event, or the first packet of a split one.
    F0,
    /// `0xF7`: either an escape/continuation packet or the closing packet
    /// of a split `0xF0` event.
    F7,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum MessageKind {
    ChannelVoice(ChannelVoiceMessage),
    Meta(MetaEventKind),
    SysEx(SysExKind),
}

/// One decoded SMF event plus the fixed buffer backing its variable-length
/// payload, if it has one (meta text, SysEx data).
pub struct MidiMessage {
    pub delta_ticks: u32,
    pub abs_tick: u64,
    pub kind: MessageKind,
    /// True iff running status elided the status byte for this event.
    pub implied_status: bool,
    data: [u8; BUFFER_SIZE],
    data_len: usize,
    truncated: bool,
}

impl MidiMessage {
    pub fn channel_voice(delta_ticks: u32, abs_tick: u64, msg: ChannelVoiceMessage, implied_status: bool) -> MidiMessage {
        MidiMessage {
            delta_ticks,
            abs_tick,
            kind: MessageKind::ChannelVoice(msg),
            implied_status,
            data: [0; BUFFER_SIZE],
            data_len: 0,
            truncated: false,
        }
    }

    pub fn with_payload(
        delta_ticks: u32,
        abs_tick: u64,
        kind: MessageKind,
        data: &[u8],
        truncated: bool,
    ) -> MidiMessage {
        let mut buf = [0u8; BUFFER_SIZE];
        let len = data.len().min(META_EVENT_MAX_DATA_SIZE);
        buf[..len].copy_from_slice(&data[..len]);
        if let MessageKind::Meta(meta_kind) = kind {
            if meta_kind.is_text() {
                buf[len] = 0;
            }
        }
        MidiMessage {
            delta_ticks,
            abs_tick,
            kind,
            implied_status: false,
            data: buf,
            data_len: len,
            truncated,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len]
    }

    /// For text-kind meta events, the payload followed by its NUL
    /// terminator, suitable for treating as a C-string. `None` for every
    /// other event kind.
    pub fn meta_text(&self) -> Option<&[u8]> {
        match self.kind {
            MessageKind::Meta(kind) if kind.is_text() => Some(&self.data[..=self.data_len]),
            _ => None,
        }
    }

    /// True when the event's payload on disk was longer than
    /// `META_EVENT_MAX_DATA_SIZE` and had to be cut off; `data()` still
    /// holds the prefix that fit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Debug for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MidiMessage")
            .field("delta_ticks", &self.delta_ticks)
            .field("abs_tick", &self.abs_tick)
            .field("kind", &self.kind)
            .field("implied_status", &self.implied_status)
            .field("data_len", &self.data_len)
            .field("truncated", &self.truncated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_voice_builder_reports_one_based_channel() {
        let mut builder = ChannelVoiceBuilder::new(0x90);
        builder.push(0x3c);
        builder.push(0x7f);
        match builder.build() {
            ChannelVoiceMessage::NoteOn { channel, .. } => assert_eq!(channel, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn meta_text_is_nul_terminated() {
        let message = MidiMessage::with_payload(0, 0, MessageKind::Meta(MetaEventKind::TrackName), b"lead", false);
        let text = message.meta_text().unwrap();
        assert_eq!(text, b"lead\0");
        assert_eq!(message.data(), b"lead");
    }

    #[test]
    fn non_text_meta_has_no_meta_text() {
        let message = MidiMessage::with_payload(0, 0, MessageKind::Meta(MetaEventKind::SequencerSpecific), b"\x01\x02", false);
        assert!(message.meta_text().is_none());
    }

    #[test]
    fn midi_port_type_byte_is_recognised() {
        assert_eq!(MetaEventKind::from_type_byte(0x21), MetaEventKind::MIDIPort);
    }
}
