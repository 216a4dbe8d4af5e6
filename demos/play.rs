//! Opens an SMF file named on the command line and plays it back against
//! the system clock, logging every dispatched event.
//!
//! Run with `cargo run --example play -- path/to/file.mid` (after adding
//! this file as an `[[example]]` target, or directly via `rustc`/a small
//! driver crate — the core library stays host-agnostic; this is one way
//! to drive it from a desktop).

extern crate smf_engine;

use smf_engine::clock::SystemClock;
use smf_engine::handler::SmfHandler;
use smf_engine::header::Format;
use smf_engine::message::SysExKind;
use smf_engine::session::Session;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

struct LoggingHandler;

impl SmfHandler for LoggingHandler {
    fn on_header(&mut self, format: Format, track_count: u16, ticks_per_quarter_note: u16) {
        log::info!(
            "header: {:?}, {} track(s), {} ticks/quarter",
            format,
            track_count,
            ticks_per_quarter_note
        );
    }
    fn on_note_on(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, velocity: u8) {
        log::info!(
            "[track {} @ {}] note on  ch {} note {} vel {}",
            track_idx, abs_tick, channel, note, velocity
        );
    }
    fn on_note_off(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, velocity: u8) {
        log::info!(
            "[track {} @ {}] note off ch {} note {} vel {}",
            track_idx, abs_tick, channel, note, velocity
        );
    }
    fn on_set_tempo(&mut self, track_idx: usize, abs_tick: u64, usec_per_quarter_note: u32) {
        log::info!(
            "[track {} @ {}] tempo change: {} usec/quarter",
            track_idx, abs_tick, usec_per_quarter_note
        );
    }
    fn on_sys_ex(&mut self, track_idx: usize, abs_tick: u64, kind: SysExKind, data: &[u8]) {
        log::info!("[track {} @ {}] sysex {:?}: {} bytes", track_idx, abs_tick, kind, data.len());
    }
    fn on_end_of_track(&mut self, track_idx: usize, abs_tick: u64) {
        log::info!("[track {} @ {}] end of track", track_idx, abs_tick);
    }
    fn on_playback_finished(&mut self) {
        log::info!("playback finished");
    }
}

fn main() {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: play <path-to-smf-file>");
            std::process::exit(1);
        }
    };

    let file = File::open(&path).unwrap_or_else(|err| {
        eprintln!("failed to open {}: {}", path.display(), err);
        std::process::exit(1);
    });

    let mut handler = LoggingHandler;
    let mut session = Session::open(BufReader::new(file), SystemClock::new(), &mut handler)
        .unwrap_or_else(|err| {
            eprintln!("failed to open SMF file: {}", err);
            std::process::exit(1);
        });

    loop {
        session.tick(&mut handler).unwrap();
        if session.state() == smf_engine::scheduler::PlaybackState::Finished {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
