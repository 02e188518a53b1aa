// Sequencer module
// Transport clock, beat scheduling and the sweep position derived from it

pub mod clock;
pub mod metronome;
pub mod rhythm;
pub mod scheduler;
pub mod sync;
pub mod timeline;
pub mod transport;
pub mod virtual_clock;

pub use clock::{Clock, ClockError, FiredTrigger, TriggerHandle, TriggerSpec, TriggerTable};
pub use metronome::{ClickType, Metronome, MetronomeSound};
pub use rhythm::{GUIDE_ROWS, RhythmLineSpec};
pub use scheduler::{BeatScheduler, trigger_plan};
pub use sync::{PositionSynchronizer, SweepRange, TrainerSnapshot, normalized_phase};
pub use timeline::{Subdivision, SubdivisionFlags, TempoSetting};
pub use transport::TransportState;
pub use virtual_clock::VirtualClock;
