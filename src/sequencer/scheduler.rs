// Beat scheduler - Owns transport state and the armed trigger set
//
// All triggers share one period (the beat cycle) and one origin (transport
// time zero). Parameter changes while running swap the whole set through
// `Clock::rearm`, so the new period applies from the next occurrence on the
// same grid and nothing already played is repeated.

use super::clock::{Clock, ClockError, TriggerHandle, TriggerSpec};
use super::metronome::ClickType;
use super::timeline::{Subdivision, SubdivisionFlags, TempoSetting};
use super::transport::TransportState;

/// Full trigger set for a tempo and subdivision combination
///
/// Base beat at phase 0, then each enabled subdivision's accents at their
/// fraction of the cycle ("two" at 1/2, "three" at 1/3 and 2/3).
pub fn trigger_plan(tempo: TempoSetting, flags: SubdivisionFlags) -> Vec<TriggerSpec> {
    let cycle = tempo.cycle_duration();

    let mut plan = vec![TriggerSpec::new(cycle, 0.0, ClickType::Beat)];
    for kind in flags.enabled() {
        for fraction in kind.fractions() {
            plan.push(TriggerSpec::new(cycle, cycle * fraction, ClickType::Accent));
        }
    }
    plan
}

/// Metronome scheduler bound to a transport clock
#[derive(Debug)]
pub struct BeatScheduler<C: Clock> {
    clock: C,
    tempo: TempoSetting,
    subdivisions: SubdivisionFlags,
    state: TransportState,
    armed: Vec<TriggerHandle>,
}

impl<C: Clock> BeatScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self::with_settings(clock, TempoSetting::default(), SubdivisionFlags::default())
    }

    pub fn with_settings(clock: C, tempo: TempoSetting, subdivisions: SubdivisionFlags) -> Self {
        Self {
            clock,
            tempo,
            subdivisions,
            state: TransportState::Stopped,
            armed: Vec::new(),
        }
    }

    /// Start playback from the origin
    /// No-op when already running
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.state.is_running() {
            return Ok(());
        }

        // Leave nothing from an earlier run behind
        self.clock.stop();

        let plan = self.plan();
        self.armed = self.clock.rearm(&[], &plan)?;
        self.clock.start();
        self.state = TransportState::Running;

        log::info!(
            "Transport started at {} ({} triggers per cycle)",
            self.tempo,
            self.armed.len()
        );
        Ok(())
    }

    /// Stop playback and cancel every pending trigger
    /// No-op when already stopped
    pub fn stop(&mut self) {
        if self.state.is_stopped() {
            return;
        }

        for handle in self.armed.drain(..) {
            self.clock.cancel(handle);
        }
        self.clock.stop();
        self.state = TransportState::Stopped;

        log::info!("Transport stopped");
    }

    /// Start when stopped, stop when running
    pub fn toggle(&mut self) -> Result<(), ClockError> {
        if self.state.is_running() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Set tempo (clamped to the supported range)
    pub fn set_tempo(&mut self, bpm: i64) -> Result<(), ClockError> {
        let tempo = TempoSetting::new(bpm);
        if tempo == self.tempo {
            return Ok(());
        }

        self.apply(tempo, self.subdivisions)
    }

    /// Enable or disable a subdivision
    pub fn set_subdivision(&mut self, kind: Subdivision, enabled: bool) -> Result<(), ClockError> {
        if self.subdivisions.is_enabled(kind) == enabled {
            return Ok(());
        }

        let mut subdivisions = self.subdivisions;
        subdivisions.set(kind, enabled);
        self.apply(self.tempo, subdivisions)
    }

    /// Re-arm for new settings, keeping the origin
    ///
    /// Settings are committed only once the clock accepted the new trigger
    /// set, so tempo and flags always describe what is armed.
    fn apply(
        &mut self,
        tempo: TempoSetting,
        subdivisions: SubdivisionFlags,
    ) -> Result<(), ClockError> {
        if self.state.is_running() {
            let plan = trigger_plan(tempo, subdivisions);
            self.armed = self.clock.rearm(&self.armed, &plan)?;

            log::debug!(
                "Triggers rebuilt at t={:.3}s: {}, {:?}",
                self.clock.now(),
                tempo,
                subdivisions
            );
        }

        self.tempo = tempo;
        self.subdivisions = subdivisions;
        Ok(())
    }

    fn plan(&self) -> Vec<TriggerSpec> {
        trigger_plan(self.tempo, self.subdivisions)
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn tempo(&self) -> TempoSetting {
        self.tempo
    }

    pub fn subdivisions(&self) -> SubdivisionFlags {
        self.subdivisions
    }

    /// Duration of the current beat cycle in seconds
    pub fn cycle_duration(&self) -> f64 {
        self.tempo.cycle_duration()
    }

    /// Current transport time, read from the clock that fires the triggers
    pub fn transport_time(&self) -> f64 {
        self.clock.now()
    }

    /// Handles of the currently armed triggers
    pub fn armed_triggers(&self) -> &[TriggerHandle] {
        &self.armed
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
