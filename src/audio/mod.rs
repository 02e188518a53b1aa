// Audio module - CPAL backend driving the transport clock

pub mod engine;
pub mod format_conversion;
pub mod status;
pub mod timing;

pub use engine::AudioClock;
