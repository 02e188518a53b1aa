// Clock - Transport time source and recurring trigger registry
//
// A clock owns the transport timeline: it knows the current transport time
// (seconds since the phase origin) and fires recurring triggers against it.
// The real implementation is driven by the audio callback (`AudioClock`),
// the test implementation is advanced by hand (`VirtualClock`).
//
// Fire times are always computed as `phase_offset + k * period` from the
// integer index k, never accumulated, so long sessions do not drift.

use super::metronome::ClickType;
use thiserror::Error;

/// Grid points this close to an instant count as that instant
///
/// Far below one sample at any output rate. Absorbs the rounding between
/// two fire-time formulas that land on the same moment, such as
/// `2/3 + 1.0` and `1/6 + 3 * 0.5`.
pub const FIRE_TIME_TOLERANCE: f64 = 1e-9;

/// Clock and audio backend errors
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Invalid trigger: period {period}s, phase offset {phase_offset}s")]
    InvalidTrigger { period: f64, phase_offset: f64 },

    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("Audio configuration error: {0}")]
    StreamConfig(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Error in stream creation: {0}")]
    StreamBuild(String),

    #[error("Error in stream start: {0}")]
    StreamPlay(String),
}

/// Opaque handle to an armed trigger, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerHandle(u64);

/// Description of a recurring trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSpec {
    /// Seconds between consecutive firings
    pub period: f64,
    /// Seconds after the origin of the first firing, in [0, period)
    pub phase_offset: f64,
    /// Sound produced when the trigger fires
    pub click: ClickType,
}

impl TriggerSpec {
    pub fn new(period: f64, phase_offset: f64, click: ClickType) -> Self {
        Self {
            period,
            phase_offset,
            click,
        }
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        let valid = self.period.is_finite()
            && self.period > 0.0
            && self.phase_offset.is_finite()
            && self.phase_offset >= 0.0
            && self.phase_offset < self.period;

        if valid {
            Ok(())
        } else {
            Err(ClockError::InvalidTrigger {
                period: self.period,
                phase_offset: self.phase_offset,
            })
        }
    }

    /// Transport time of the k-th firing
    #[inline]
    pub fn fire_time(&self, index: u64) -> f64 {
        self.phase_offset + index as f64 * self.period
    }

    /// Index of the first firing strictly after `instant`
    ///
    /// A firing within `FIRE_TIME_TOLERANCE` of `instant` is treated as
    /// already past.
    fn first_index_after(&self, instant: f64) -> u64 {
        let horizon = instant + FIRE_TIME_TOLERANCE;
        if horizon < self.phase_offset {
            return 0;
        }

        let mut index = ((horizon - self.phase_offset) / self.period).floor() as u64 + 1;

        // Correct rounding at exact boundaries
        while index > 0 && self.fire_time(index - 1) > horizon {
            index -= 1;
        }
        while self.fire_time(index) <= horizon {
            index += 1;
        }

        index
    }
}

/// A trigger firing, delivered to whoever drives the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredTrigger {
    pub handle: TriggerHandle,
    pub click: ClickType,
    /// Scheduled transport time of this firing
    pub time: f64,
}

#[derive(Debug, Clone)]
struct ArmedTrigger {
    handle: TriggerHandle,
    spec: TriggerSpec,
    next_index: u64,
}

/// Set of armed triggers plus the instant up to which they were dispatched
///
/// Shared by every clock implementation so that arming, cancellation and
/// dispatch follow exactly the same rules everywhere.
#[derive(Debug, Default)]
pub struct TriggerTable {
    armed: Vec<ArmedTrigger>,
    next_id: u64,
    dispatched_through: Option<f64>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a recurring trigger
    ///
    /// Before anything was dispatched since the origin, the trigger starts at
    /// its first occurrence. Otherwise it starts at the first occurrence
    /// strictly after the dispatched instant, so a firing that already
    /// happened is never repeated.
    pub fn arm(&mut self, spec: TriggerSpec) -> Result<TriggerHandle, ClockError> {
        spec.validate()?;

        let handle = TriggerHandle(self.next_id);
        self.next_id += 1;

        let next_index = match self.dispatched_through {
            None => 0,
            Some(instant) => spec.first_index_after(instant),
        };

        self.armed.push(ArmedTrigger {
            handle,
            spec,
            next_index,
        });

        Ok(handle)
    }

    /// Cancel a trigger. Returns false if the handle was not armed.
    pub fn cancel(&mut self, handle: TriggerHandle) -> bool {
        let before = self.armed.len();
        self.armed.retain(|trigger| trigger.handle != handle);
        self.armed.len() != before
    }

    /// Cancel every trigger and forget the dispatch position
    pub fn clear(&mut self) {
        self.armed.clear();
        self.dispatched_through = None;
    }

    /// Move the origin back to zero, keeping armed triggers
    pub fn rewind(&mut self) {
        self.dispatched_through = None;
        for trigger in &mut self.armed {
            trigger.next_index = 0;
        }
    }

    /// Fire every trigger due at or before `instant`
    ///
    /// Events are emitted per trigger in time order; callers that need a
    /// global order sort the emitted events.
    pub fn dispatch_through(&mut self, instant: f64, mut emit: impl FnMut(FiredTrigger)) {
        for trigger in &mut self.armed {
            loop {
                let time = trigger.spec.fire_time(trigger.next_index);
                if time > instant {
                    break;
                }
                emit(FiredTrigger {
                    handle: trigger.handle,
                    click: trigger.spec.click,
                    time,
                });
                trigger.next_index += 1;
            }
        }

        self.dispatched_through = Some(instant);
    }

    /// Earliest pending firing across all armed triggers
    pub fn next_fire_time(&self) -> Option<f64> {
        self.armed
            .iter()
            .map(|trigger| trigger.spec.fire_time(trigger.next_index))
            .min_by(f64::total_cmp)
    }

    /// Number of armed triggers
    pub(crate) fn len(&self) -> usize {
        self.armed.len()
    }
}

/// Transport clock capability
///
/// `now()` is the transport time in seconds since the phase origin. The
/// origin is reset to zero by `start()` and `stop()`.
pub trait Clock {
    /// Current transport time in seconds
    fn now(&self) -> f64;

    /// Whether transport time is advancing
    fn is_running(&self) -> bool;

    /// Re-origin the transport to zero and start advancing
    fn start(&mut self);

    /// Halt the transport, cancel every trigger and return to the origin
    fn stop(&mut self);

    /// Arm a recurring trigger
    fn schedule_recurring(&mut self, spec: TriggerSpec) -> Result<TriggerHandle, ClockError>;

    /// Cancel an armed trigger; unknown handles are ignored
    fn cancel(&mut self, handle: TriggerHandle);

    /// Replace one trigger set with another as a single step
    ///
    /// All specs are validated before anything is cancelled, so an error
    /// leaves the previous set armed.
    fn rearm(
        &mut self,
        cancel: &[TriggerHandle],
        arm: &[TriggerSpec],
    ) -> Result<Vec<TriggerHandle>, ClockError> {
        for spec in arm {
            spec.validate()?;
        }
        for handle in cancel {
            self.cancel(*handle);
        }
        arm.iter()
            .map(|spec| self.schedule_recurring(*spec))
            .collect()
    }
}
