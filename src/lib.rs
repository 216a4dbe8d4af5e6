//! An embedded-friendly Standard MIDI File reader and real-time playback
//! engine.
//!
//! The crate is split into the layers a host actually needs to wire up:
//! a byte-addressable [`cache`] over any `Read + Seek` backing store, a
//! streaming [`decoder`] that never allocates, fixed-point [`tempo`]
//! tracking, and a pull-driven [`scheduler`] that a host ticks from its
//! own main loop. [`session::Session`] ties all of it together behind one
//! `open`/`tick` pair.
//!
//! # Examples
//!
//! ```
//! use smf_engine::handler::SmfHandler;
//! use smf_engine::clock::SystemClock;
//! use smf_engine::session::Session;
//! use std::io::Cursor;
//!
//! struct LoggingHandler;
//! impl SmfHandler for LoggingHandler {
//!     fn on_note_on(&mut self, track_idx: usize, abs_tick: u64, channel: u8, note: u8, velocity: u8) {
//!         println!("[track {} @ {}] note on: ch {} note {} vel {}", track_idx, abs_tick, channel, note, velocity);
//!     }
//! }
//!
//! # fn minimal_smf() -> Vec<u8> {
//! #     let mut bytes = b"MThd".to_vec();
//! #     bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 1, 224]);
//! #     bytes.extend_from_slice(b"MTrk");
//! #     bytes.extend_from_slice(&[0, 0, 0, 4, 0, 0xff, 0x2f, 0]);
//! #     bytes
//! # }
//! let mut handler = LoggingHandler;
//! let mut session = Session::open(Cursor::new(minimal_smf()), SystemClock::new(), &mut handler).unwrap();
//! session.tick(&mut handler).unwrap();
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod decoder;
pub mod error;
pub mod handler;
pub mod header;
pub mod message;
pub mod scheduler;
pub mod session;
pub mod tempo;
pub mod track;
pub mod vlq;
