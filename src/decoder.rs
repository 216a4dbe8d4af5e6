//! Per-track event decoder.
//!
//! Decodes exactly one event per call, advancing the track's cursor. This
//! mirrors `ghakuf::reader::reader::Reader::read_track_block`'s inner loop
//! body, but pulled out so the scheduler can decode one event at a time
//! across many tracks instead of draining a track in one pass.

use std::io::{Read, Seek};

use crate::cache::FileCache;
use crate::config::META_EVENT_MAX_DATA_SIZE;
use crate::error::SmfError;
use crate::message::{ChannelVoiceBuilder, MessageKind, MetaEventKind, MidiMessage, SysExKind};
use crate::track::TrackCursor;
use crate::vlq::read_vlq;

/// Decodes the next event on `cursor`, advancing it past the event. Returns
/// `Ok(None)` once the track is exhausted (its `EndOfTrack` meta event has
/// already been dispatched, or its byte range is empty).
pub fn decode_next<R: Read + Seek>(
    cache: &mut FileCache<R>,
    cursor: &mut TrackCursor,
) -> Result<Option<MidiMessage>, SmfError> {
    if cursor.is_finished() {
        return Ok(None);
    }
    cache.seek_to(cursor.pos);

    let delta = read_vlq(|| cache.read_u8())?;
    cursor.next_event_tick += delta.value() as u64;
    let abs_tick = cursor.next_event_tick;

    let mut status = cache.read_u8()?;
    let implied_status = status < 0x80;
    if implied_status {
        // Running status: the byte we just read is actually the first data
        // byte of a channel voice message, so put it back.
        cache.seek_to(cache.position() - 1);
        status = cursor.running_status;
    }

    let message = match status {
        0xff => {
            let event_type = cache.read_u8()?;
            let kind = MetaEventKind::from_type_byte(event_type);
            let len = read_vlq(|| cache.read_u8())?.value() as usize;
            let mut payload = [0u8; META_EVENT_MAX_DATA_SIZE];
            let truncated = read_payload(cache, len, &mut payload)?;
            let read_len = len.min(META_EVENT_MAX_DATA_SIZE);
            if kind == MetaEventKind::EndOfTrack {
                cursor.finished = true;
            }
            MidiMessage::with_payload(delta.value(), abs_tick, MessageKind::Meta(kind), &payload[..read_len], truncated)
        }
        0x80..=0xef => {
            let mut builder = ChannelVoiceBuilder::new(status);
            while builder.shortage() > 0 {
                builder.push(cache.read_u8()?);
            }
            cursor.running_status = status;
            MidiMessage::channel_voice(delta.value(), abs_tick, builder.build(), implied_status)
        }
        0xf0 | 0xf7 => {
            let kind = if status == 0xf0 { SysExKind::F0 } else { SysExKind::F7 };
            let len = read_vlq(|| cache.read_u8())?.value() as usize;
            let mut payload = [0u8; META_EVENT_MAX_DATA_SIZE];
            let truncated = read_payload(cache, len, &mut payload)?;
            let read_len = len.min(META_EVENT_MAX_DATA_SIZE);
            MidiMessage::with_payload(delta.value(), abs_tick, MessageKind::SysEx(kind), &payload[..read_len], truncated)
        }
        other => {
            log::warn!("unknown event status {:#04x}, skipping remainder of track", other);
            cursor.finished = true;
            cursor.pos = cursor.end;
            return Ok(None);
        }
    };

    cursor.pos = cache.position();
    if cursor.pos >= cursor.end {
        cursor.finished = true;
    }
    Ok(Some(message))
}

/// Reads a variable-length payload into `out`, truncating at
/// `out.len()` (== `META_EVENT_MAX_DATA_SIZE`) and skipping whatever's left
/// on disk so the cursor still lands exactly at the next event. Returns
/// whether truncation happened.
fn read_payload<R: Read + Seek>(
    cache: &mut FileCache<R>,
    len: usize,
    out: &mut [u8; META_EVENT_MAX_DATA_SIZE],
) -> Result<bool, SmfError> {
    let truncated = len > META_EVENT_MAX_DATA_SIZE;
    let read_len = len.min(META_EVENT_MAX_DATA_SIZE);
    cache.read_into(&mut out[..read_len])?;
    if truncated {
        cache.skip((len - read_len) as u64)?;
        log::warn!("meta/sysex payload of {} bytes truncated to {}", len, read_len);
    }
    Ok(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChannelVoiceMessage;
    use crate::track::parse_track_header;
    use std::io::Cursor;

    fn cursor_over(track_bytes: &[u8]) -> (FileCache<Cursor<Vec<u8>>>, TrackCursor) {
        let mut cache = FileCache::new(Cursor::new(track_bytes.to_vec()));
        let cursor = parse_track_header(&mut cache).unwrap();
        (cache, cursor)
    }

    fn track_chunk(body: &[u8]) -> Vec<u8> {
        let mut bytes = b"MTrk".to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn decodes_note_on_then_end_of_track() {
        let bytes = track_chunk(&[0, 0x90, 0x3c, 0x7f, 0x30, 0xff, 0x2f, 0x00]);
        let (mut cache, mut cursor) = cursor_over(&bytes);

        let note_on = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert_eq!(note_on.abs_tick, 0);
        assert!(!note_on.implied_status);
        match note_on.kind {
            MessageKind::ChannelVoice(ChannelVoiceMessage::NoteOn { channel, note, velocity }) => {
                assert_eq!(channel, 1);
                assert_eq!(note, 0x3c);
                assert_eq!(velocity, 0x7f);
            }
            other => panic!("unexpected kind: {:?}", other),
        }

        let end = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert_eq!(end.abs_tick, 0x30);
        assert_eq!(end.kind, MessageKind::Meta(MetaEventKind::EndOfTrack));
        assert!(decode_next(&mut cache, &mut cursor).unwrap().is_none());
    }

    #[test]
    fn running_status_reuses_previous_channel_voice_status() {
        let bytes = track_chunk(&[0, 0x90, 0x40, 0x7f, 0x10, 0x40, 0x00, 0, 0xff, 0x2f, 0x00]);
        let (mut cache, mut cursor) = cursor_over(&bytes);
        decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        let note_off = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert!(note_off.implied_status);
        match note_off.kind {
            MessageKind::ChannelVoice(ChannelVoiceMessage::NoteOn { note, velocity, .. }) => {
                assert_eq!(note, 0x40);
                assert_eq!(velocity, 0x00);
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    fn encode_vlq(mut value: u32) -> Vec<u8> {
        let mut stack = vec![(value & 0x7f) as u8];
        value >>= 7;
        while value > 0 {
            stack.push(((value & 0x7f) as u8) | 0x80);
            value >>= 7;
        }
        stack.reverse();
        stack
    }

    #[test]
    fn oversized_meta_payload_is_truncated_not_fatal() {
        let payload_len = META_EVENT_MAX_DATA_SIZE + 10;
        let mut body = vec![0, 0xff, 0x01];
        body.extend_from_slice(&encode_vlq(payload_len as u32));
        body.extend(std::iter::repeat(0x41u8).take(payload_len));
        body.extend_from_slice(&[0, 0xff, 0x2f, 0x00]);

        let bytes = track_chunk(&body);
        let (mut cache, mut cursor) = cursor_over(&bytes);
        let text = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert!(text.is_truncated());
        assert_eq!(text.data().len(), META_EVENT_MAX_DATA_SIZE);
        let end = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert_eq!(end.kind, MessageKind::Meta(MetaEventKind::EndOfTrack));
    }

    #[test]
    fn sysex_f0_and_f7_both_decode_as_sysex() {
        let bytes = track_chunk(&[0, 0xf0, 0x02, 0x7e, 0xf7, 0, 0xf7, 0x00, 0, 0xff, 0x2f, 0x00]);
        let (mut cache, mut cursor) = cursor_over(&bytes);
        let first = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert_eq!(first.kind, MessageKind::SysEx(SysExKind::F0));
        let second = decode_next(&mut cache, &mut cursor).unwrap().unwrap();
        assert_eq!(second.kind, MessageKind::SysEx(SysExKind::F7));
    }
}
