//! Multi-track tick scheduler.
//!
//! Grounded directly on the original `playMidiFile2` lag-compensation loop:
//! compute how many ticks have elapsed since the last check, subtract that
//! from every track's remaining delta, and dispatch (then re-arm) any track
//! whose delta has reached zero. The loop repeats until nothing is due,
//! rather than only looking at one event per tick, so a tick callback that
//! fires less often than the music needs still dispatches every event in
//! the right order.

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum PlaybackState {
    Closed,
    Playing,
    Finished,
}

/// One round of lag compensation: given the current absolute tick, fetch
/// and dispatch every track event whose `next_event_tick` is at or before
/// it, re-decoding each track's next event as it goes, until no track has
/// anything left to dispatch at or before `current_tick`.
///
/// `fetch_and_dispatch` is called once per due event; it must decode the
/// next event for `track_index`, dispatch it, and return whether that
/// track still has more events after the one it just dispatched.
pub fn drain_due_events<F>(
    current_tick: u64,
    track_next_tick: &mut [u64],
    track_active: &mut [bool],
    mut fetch_and_dispatch: F,
) where
    F: FnMut(usize, u64) -> Option<u64>,
{
    loop {
        let mut dispatched_any = false;
        for (index, active) in track_active.iter_mut().enumerate() {
            if !*active {
                continue;
            }
            while track_next_tick[index] <= current_tick {
                match fetch_and_dispatch(index, current_tick) {
                    Some(next_tick) => {
                        track_next_tick[index] = next_tick;
                        dispatched_any = true;
                    }
                    None => {
                        *active = false;
                        break;
                    }
                }
            }
        }
        if !dispatched_any {
            break;
        }
    }
}
