//! Host clock abstraction.
//!
//! The scheduler only ever needs "microseconds since playback started",
//! expressed through this trait so tests can drive it deterministically
//! and so a host with nothing but a millisecond tick can still supply one
//! (see `MillisClock`), per the design's note on mixed ms/µs time bases.

pub trait Clock {
    fn now_micros(&self) -> u64;
}

/// Wall-clock time source for desktop hosts, backed by `std::time::Instant`.
pub struct SystemClock {
    epoch: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock { epoch: std::time::Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

/// Adapts a millisecond-resolution tick function (common on constrained
/// hosts) into the microsecond `Clock` the scheduler expects.
pub struct MillisClock<F> {
    millis_fn: F,
}

impl<F: Fn() -> u64> MillisClock<F> {
    pub fn new(millis_fn: F) -> MillisClock<F> {
        MillisClock { millis_fn }
    }
}

impl<F: Fn() -> u64> Clock for MillisClock<F> {
    fn now_micros(&self) -> u64 {
        (self.millis_fn)() * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_clock_scales_to_micros() {
        let clock = MillisClock::new(|| 42u64);
        assert_eq!(clock.now_micros(), 42_000);
    }
}
