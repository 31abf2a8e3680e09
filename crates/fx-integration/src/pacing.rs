//! Frame pacing driven by master clock cycles
//!
//! The core reports how many master cycles each frame consumed. This module
//! turns that into emulated time and, when enabled, holds the host back so
//! that emulated time does not run ahead of the wall clock.

use fx_core::types::MasterCycles;
use fx_core::MasterClock;
use std::time::{Duration, Instant};

/// Converts reported cycles into emulated time and throttles to real time
#[derive(Debug, Clone)]
pub struct FramePacer {
    /// Time base for reported cycles
    clock: MasterClock,
    /// Cycles reported since the last reset
    total_cycles: MasterCycles,
    /// Frames observed since the last reset
    frames: u64,
    /// Frames that finished later than their emulated deadline
    late_frames: u64,
    /// Whether `throttle` sleeps
    realtime: bool,
    /// Wall clock at the last reset
    started: Instant,
}

impl FramePacer {
    pub fn new(clock: MasterClock) -> Self {
        Self {
            clock,
            total_cycles: 0,
            frames: 0,
            late_frames: 0,
            realtime: false,
            started: Instant::now(),
        }
    }

    /// Enable/disable real-time throttling
    pub fn set_realtime(&mut self, realtime: bool) {
        self.realtime = realtime;
    }

    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    /// Account for one frame
    pub fn advance(&mut self, cycles: MasterCycles) {
        self.total_cycles = self.total_cycles.saturating_add(cycles.max(0));
        self.frames += 1;
    }

    /// Total cycles accounted so far
    pub fn total_cycles(&self) -> MasterCycles {
        self.total_cycles
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn late_frames(&self) -> u64 {
        self.late_frames
    }

    /// Emulated time represented by `cycles`, computed in integers
    pub fn cycles_to_duration(&self, cycles: MasterCycles) -> Duration {
        let hz = self.clock.hz.raw() as i128;
        if hz <= 0 || cycles <= 0 {
            return Duration::ZERO;
        }
        let nanos = (cycles as i128 * 1_000_000_000 << 32) / hz;
        Duration::from_nanos(nanos.min(u64::MAX as i128) as u64)
    }

    /// Emulated time since the last reset
    pub fn emulated_time(&self) -> Duration {
        self.cycles_to_duration(self.total_cycles)
    }

    /// Average emulated frame rate so far
    pub fn emulated_fps(&self) -> f64 {
        let secs = self.emulated_time().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.frames as f64 / secs
        }
    }

    /// Sleep until the wall clock catches up with emulated time.
    ///
    /// Does nothing unless real-time mode is on. Returns the time slept.
    pub fn throttle(&mut self) -> Duration {
        if !self.realtime {
            return Duration::ZERO;
        }

        let wall = self.started.elapsed();
        let emulated = self.emulated_time();
        if emulated > wall {
            let ahead = emulated - wall;
            if ahead > Duration::from_micros(100) {
                std::thread::sleep(ahead);
                return ahead;
            }
        } else {
            self.late_frames += 1;
        }
        Duration::ZERO
    }

    /// Reset counters and restart the wall clock
    pub fn reset(&mut self) {
        self.total_cycles = 0;
        self.frames = 0;
        self.late_frames = 0;
        self.started = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> FramePacer {
        FramePacer::new(MasterClock::from_hz(21_477_272.0).unwrap())
    }

    #[test]
    fn test_emulated_time() {
        let mut pacer = pacer();
        for _ in 0..60 {
            pacer.advance(357_954);
        }
        // 60 frames of 357954 cycles at 21.477272 MHz is just under a second.
        let time = pacer.emulated_time();
        assert!(time < Duration::from_secs(1));
        assert!(time > Duration::from_millis(999));
        assert!((pacer.emulated_fps() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_cycles_to_duration_exact() {
        let pacer = pacer();
        assert_eq!(pacer.cycles_to_duration(21_477_272), Duration::from_secs(1));
        assert_eq!(pacer.cycles_to_duration(0), Duration::ZERO);
        assert_eq!(pacer.cycles_to_duration(-5), Duration::ZERO);
    }

    #[test]
    fn test_advance_saturates() {
        let mut pacer = pacer();
        pacer.advance(MasterCycles::MAX);
        pacer.advance(MasterCycles::MAX);
        pacer.advance(-7);
        assert_eq!(pacer.total_cycles(), MasterCycles::MAX);
        assert_eq!(pacer.frames(), 3);
        assert!(pacer.emulated_time() > Duration::from_secs(1 << 30));
    }

    #[test]
    fn test_throttle_disabled_by_default() {
        let mut pacer = pacer();
        pacer.advance(21_477_272 * 100);
        assert!(!pacer.is_realtime());
        assert_eq!(pacer.throttle(), Duration::ZERO);
    }

    #[test]
    fn test_throttle_counts_late_frames() {
        let mut pacer = pacer();
        pacer.set_realtime(true);
        std::thread::sleep(Duration::from_millis(2));
        // No emulated time has passed, so the host is behind.
        assert_eq!(pacer.throttle(), Duration::ZERO);
        assert_eq!(pacer.late_frames(), 1);

        pacer.reset();
        assert_eq!(pacer.late_frames(), 0);
        assert_eq!(pacer.total_cycles(), 0);
    }
}
