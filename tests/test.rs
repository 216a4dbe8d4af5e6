extern crate smf_engine;

use smf_engine::clock::Clock;
use smf_engine::handler::SmfHandler;
use smf_engine::header::Format;
use smf_engine::message::SysExKind;
use smf_engine::scheduler::PlaybackState;
use smf_engine::session::Session;
use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

/// A clock whose reading is controlled from outside via a shared handle,
/// so tests can advance time deterministically between ticks.
struct SharedClock {
    micros: Rc<Cell<u64>>,
}

impl Clock for SharedClock {
    fn now_micros(&self) -> u64 {
        self.micros.get()
    }
}

#[derive(Default)]
struct RecordingHandler {
    format: Option<Format>,
    track_count: u16,
    ticks_per_quarter_note: u16,
    notes_on: Vec<(usize, u8, u8, u8)>,
    notes_off: Vec<(usize, u8, u8, u8)>,
    tempo_usec: Vec<u32>,
    sys_ex: Vec<(SysExKind, Vec<u8>)>,
    end_of_track_count: u32,
    finished: bool,
}

impl SmfHandler for RecordingHandler {
    fn on_header(&mut self, format: Format, track_count: u16, ticks_per_quarter_note: u16) {
        self.format = Some(format);
        self.track_count = track_count;
        self.ticks_per_quarter_note = ticks_per_quarter_note;
    }
    fn on_note_on(&mut self, track_idx: usize, _abs_tick: u64, channel: u8, note: u8, velocity: u8) {
        self.notes_on.push((track_idx, channel, note, velocity));
    }
    fn on_note_off(&mut self, track_idx: usize, _abs_tick: u64, channel: u8, note: u8, velocity: u8) {
        self.notes_off.push((track_idx, channel, note, velocity));
    }
    fn on_set_tempo(&mut self, _track_idx: usize, _abs_tick: u64, usec_per_quarter_note: u32) {
        self.tempo_usec.push(usec_per_quarter_note);
    }
    fn on_sys_ex(&mut self, _track_idx: usize, _abs_tick: u64, kind: SysExKind, data: &[u8]) {
        self.sys_ex.push((kind, data.to_vec()));
    }
    fn on_end_of_track(&mut self, _track_idx: usize, _abs_tick: u64) {
        self.end_of_track_count += 1;
    }
    fn on_playback_finished(&mut self) {
        self.finished = true;
    }
}

fn track_chunk(body: &[u8]) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

fn header_chunk(format: u16, track_count: u16, division: u16) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 6]);
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&track_count.to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    bytes
}

/// Runs a session to completion, advancing a shared clock in coarse steps
/// between ticks so delayed events (anything past tick 0) eventually
/// become due without this test depending on wall-clock time.
fn run_to_completion(bytes: Vec<u8>) -> RecordingHandler {
    let micros = Rc::new(Cell::new(0u64));
    let clock = SharedClock { micros: micros.clone() };
    let mut handler = RecordingHandler::default();
    let mut session = Session::open(Cursor::new(bytes), clock, &mut handler).unwrap();
    for _ in 0..1000 {
        if session.state() == PlaybackState::Finished {
            break;
        }
        session.tick(&mut handler).unwrap();
        micros.set(micros.get() + 200_000);
    }
    handler
}

#[test]
fn minimal_file_with_no_events_finishes_immediately() {
    let mut bytes = header_chunk(0, 1, 480);
    bytes.extend_from_slice(&track_chunk(&[0, 0xff, 0x2f, 0x00]));
    let handler = run_to_completion(bytes);
    assert_eq!(handler.format, Some(Format::Zero));
    assert_eq!(handler.end_of_track_count, 1);
    assert!(handler.finished);
}

#[test]
fn single_note_on_and_off_dispatch_in_order() {
    let mut bytes = header_chunk(0, 1, 480);
    bytes.extend_from_slice(&track_chunk(&[
        0, 0x90, 0x3c, 0x7f, 0x30, 0x80, 0x3c, 0x40, 0, 0xff, 0x2f, 0x00,
    ]));
    let handler = run_to_completion(bytes);
    assert_eq!(handler.notes_on, vec![(0, 1, 0x3c, 0x7f)]);
    assert_eq!(handler.notes_off, vec![(0, 1, 0x3c, 0x40)]);
}

#[test]
fn running_status_note_off_decodes_correctly() {
    let mut bytes = header_chunk(0, 1, 480);
    bytes.extend_from_slice(&track_chunk(&[
        0, 0x90, 0x40, 0x7f, 0x10, 0x40, 0x00, 0, 0xff, 0x2f, 0x00,
    ]));
    let handler = run_to_completion(bytes);
    // A zero-velocity NoteOn is how running status expresses note-off here.
    assert_eq!(handler.notes_on, vec![(0, 1, 0x40, 0x7f), (0, 1, 0x40, 0x00)]);
}

#[test]
fn tempo_change_is_dispatched_with_decoded_microseconds() {
    let mut bytes = header_chunk(0, 1, 480);
    let tempo: u32 = 60 * 1_000_000 / 102;
    bytes.extend_from_slice(&track_chunk(&[
        0,
        0xff,
        0x51,
        0x03,
        (tempo >> 16) as u8,
        (tempo >> 8) as u8,
        tempo as u8,
        0,
        0xff,
        0x2f,
        0x00,
    ]));
    let handler = run_to_completion(bytes);
    assert_eq!(handler.tempo_usec, vec![tempo]);
}

#[test]
fn two_tracks_interleave_by_absolute_tick() {
    let mut bytes = header_chunk(1, 2, 480);
    bytes.extend_from_slice(&track_chunk(&[0, 0x90, 0x3c, 0x7f, 0x78, 0xff, 0x2f, 0x00]));
    bytes.extend_from_slice(&track_chunk(&[0x3c, 0x90, 0x40, 0x7f, 0x3c, 0xff, 0x2f, 0x00]));
    let handler = run_to_completion(bytes);
    assert_eq!(handler.notes_on, vec![(0, 1, 0x3c, 0x7f), (1, 1, 0x40, 0x7f)]);
    assert_eq!(handler.end_of_track_count, 2);
}

#[test]
fn sys_ex_f0_and_f7_both_reach_the_handler() {
    let mut bytes = header_chunk(0, 1, 480);
    bytes.extend_from_slice(&track_chunk(&[
        0, 0xf0, 0x02, 0x43, 0x12, 0, 0xf7, 0x01, 0x7f, 0, 0xff, 0x2f, 0x00,
    ]));
    let handler = run_to_completion(bytes);
    assert_eq!(handler.sys_ex.len(), 2);
    assert_eq!(handler.sys_ex[0].0, SysExKind::F0);
    assert_eq!(handler.sys_ex[1].0, SysExKind::F7);
}
