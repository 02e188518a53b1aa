// Trainer configuration - Startup defaults shared by the audio clock and the UI
// Settings are not persisted; every launch starts from these values.

use crate::sequencer::sync::SweepRange;
use crate::sequencer::timeline::{SubdivisionFlags, TempoSetting};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Tempo at launch
    pub tempo: TempoSetting,
    /// Subdivisions enabled at launch
    pub subdivisions: SubdivisionFlags,
    /// Span the sweep travels in display units (guide rows share it)
    pub sweep_range: SweepRange,
    /// Click volume (0.0 to 1.0)
    pub click_volume: f32,
    /// Capacity of the audio -> UI notification ring buffer
    pub notification_capacity: usize,
    /// How many notifications the UI keeps around
    pub max_notifications: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tempo: TempoSetting::default(),
            subdivisions: SubdivisionFlags::default(),
            sweep_range: SweepRange::default(),
            click_volume: 0.5,
            notification_capacity: 64,
            max_notifications: 10,
        }
    }
}
