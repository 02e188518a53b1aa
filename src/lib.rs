// Beat Trainer - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod config;
pub mod messaging;
pub mod sequencer;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::AudioClock;
pub use config::TrainerConfig;
pub use sequencer::{
    BeatScheduler, ClickType, Clock, ClockError, PositionSynchronizer, Subdivision,
    SubdivisionFlags, SweepRange, TempoSetting, TrainerSnapshot, TransportState, VirtualClock,
};
