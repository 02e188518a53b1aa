// Virtual clock - Manually advanced transport for tests and offline runs

use super::clock::{Clock, ClockError, FiredTrigger, TriggerHandle, TriggerSpec, TriggerTable};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct VirtualState {
    now: f64,
    running: bool,
    table: TriggerTable,
}

/// Deterministic clock advanced by the caller
///
/// Clones share the same timeline, so a test can keep one handle while a
/// `BeatScheduler` owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    state: Arc<Mutex<VirtualState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualState> {
        // A panic while holding the lock leaves the state consistent enough
        // for inspection, so poisoning is ignored
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Advance transport time by `delta` seconds
    /// Returns the triggers that fired, in time order
    pub fn advance(&self, delta: f64) -> Vec<FiredTrigger> {
        let target = self.lock().now + delta.max(0.0);
        self.advance_to(target)
    }

    /// Advance transport time to `instant` (never backwards)
    /// Does nothing while stopped
    pub fn advance_to(&self, instant: f64) -> Vec<FiredTrigger> {
        let mut state = self.lock();
        if !state.running || instant < state.now {
            return Vec::new();
        }

        let mut fired = Vec::new();
        state.now = instant;
        state
            .table
            .dispatch_through(instant, |event| fired.push(event));

        fired.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.handle.cmp(&b.handle)));
        fired
    }

    /// Number of armed triggers
    pub fn armed_count(&self) -> usize {
        self.lock().table.len()
    }

    /// Earliest pending firing
    pub fn next_fire_time(&self) -> Option<f64> {
        self.lock().table.next_fire_time()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> f64 {
        self.lock().now
    }

    fn is_running(&self) -> bool {
        self.lock().running
    }

    fn start(&mut self) {
        let mut state = self.lock();
        state.now = 0.0;
        state.table.rewind();
        state.running = true;
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.running = false;
        state.table.clear();
        state.now = 0.0;
    }

    fn schedule_recurring(&mut self, spec: TriggerSpec) -> Result<TriggerHandle, ClockError> {
        self.lock().table.arm(spec)
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        self.lock().table.cancel(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::metronome::ClickType;

    #[test]
    fn test_stopped_clock_does_not_advance() {
        let clock = VirtualClock::new();
        assert!(!clock.is_running());
        assert!(clock.advance(1.0).is_empty());
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_start_advance_stop() {
        let mut clock = VirtualClock::new();
        clock
            .schedule_recurring(TriggerSpec::new(1.0, 0.0, ClickType::Beat))
            .unwrap();
        clock.start();

        let fired = clock.advance(2.0);
        assert_eq!(fired.len(), 3); // t = 0, 1, 2
        assert_eq!(clock.now(), 2.0);

        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.armed_count(), 0);
    }

    #[test]
    fn test_events_are_time_ordered() {
        let mut clock = VirtualClock::new();
        clock
            .schedule_recurring(TriggerSpec::new(1.0, 0.5, ClickType::Accent))
            .unwrap();
        clock
            .schedule_recurring(TriggerSpec::new(1.0, 0.0, ClickType::Beat))
            .unwrap();
        clock.start();

        let times: Vec<f64> = clock.advance(2.0).iter().map(|e| e.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_clones_share_timeline() {
        let mut clock = VirtualClock::new();
        let observer = clock.clone();

        clock.start();
        observer.advance(0.25);
        assert_eq!(clock.now(), 0.25);
    }

    #[test]
    fn test_advance_never_goes_backwards() {
        let mut clock = VirtualClock::new();
        clock.start();
        clock.advance_to(3.0);
        assert!(clock.advance_to(1.0).is_empty());
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_default_rearm_keeps_previous_set_on_error() {
        let mut clock = VirtualClock::new();
        let handle = clock
            .schedule_recurring(TriggerSpec::new(1.0, 0.0, ClickType::Beat))
            .unwrap();

        let result = clock.rearm(
            &[handle],
            &[
                TriggerSpec::new(0.5, 0.0, ClickType::Beat),
                TriggerSpec::new(0.5, 0.7, ClickType::Accent),
            ],
        );
        assert!(matches!(result, Err(ClockError::InvalidTrigger { .. })));
        assert_eq!(clock.armed_count(), 1);
    }
}
