// Position synchronizer - Sweep position derived from transport time
//
// The sweep is recomputed from scratch on every tick from the transport time
// of the clock that fires the triggers. Nothing is carried over between
// ticks except the last published value, which is what the display shows
// while stopped.

use super::clock::Clock;
use super::scheduler::BeatScheduler;
use super::timeline::SubdivisionFlags;
use super::transport::TransportState;

/// Normalized position inside the current cycle, in [0, 1)
pub fn normalized_phase(transport_time: f64, cycle_duration: f64) -> f64 {
    if cycle_duration.is_nan() || cycle_duration <= 0.0 || !transport_time.is_finite() {
        return 0.0;
    }

    let phase = transport_time.rem_euclid(cycle_duration) / cycle_duration;
    // rem_euclid can round up to exactly the divisor
    if phase >= 1.0 { 0.0 } else { phase }
}

/// Horizontal span the sweep travels across during one cycle
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub width: f64,
}

impl SweepRange {
    pub fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }

    /// Map a normalized phase onto the range
    pub fn map(&self, phase: f64) -> f64 {
        self.start + phase * self.width
    }

    pub fn end(&self) -> f64 {
        self.start + self.width
    }
}

impl Default for SweepRange {
    fn default() -> Self {
        Self::new(100.0, 600.0)
    }
}

/// Publishes the sweep position for rendering
///
/// While the transport is stopped the position freezes at its last value.
#[derive(Debug, Clone)]
pub struct PositionSynchronizer {
    range: SweepRange,
    phase: f64,
}

impl PositionSynchronizer {
    pub fn new(range: SweepRange) -> Self {
        Self { range, phase: 0.0 }
    }

    /// Recompute from the scheduler's own clock
    /// Called once per animation frame
    pub fn tick<C: Clock>(&mut self, scheduler: &BeatScheduler<C>) -> f64 {
        if scheduler.state().is_stopped() {
            return self.position();
        }

        self.tick_at(scheduler.transport_time(), scheduler.cycle_duration())
    }

    /// Recompute for an explicit transport time and cycle
    pub fn tick_at(&mut self, transport_time: f64, cycle_duration: f64) -> f64 {
        self.phase = normalized_phase(transport_time, cycle_duration);
        self.position()
    }

    /// Current sweep position in display units
    pub fn position(&self) -> f64 {
        self.range.map(self.phase)
    }

    pub fn range(&self) -> SweepRange {
        self.range
    }

    /// Return to the start of the range
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Default for PositionSynchronizer {
    fn default() -> Self {
        Self::new(SweepRange::default())
    }
}

/// Everything the display reads, captured at one instant
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrainerSnapshot {
    pub bpm: u32,
    pub subdivisions: SubdivisionFlags,
    pub transport_state: TransportState,
    pub sweep_position: f64,
}

impl TrainerSnapshot {
    pub fn capture<C: Clock>(scheduler: &BeatScheduler<C>, sync: &PositionSynchronizer) -> Self {
        Self {
            bpm: scheduler.tempo().bpm(),
            subdivisions: scheduler.subdivisions(),
            transport_state: scheduler.state(),
            sweep_position: sync.position(),
        }
    }
}
