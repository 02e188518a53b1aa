// Notifications - Trainer events worth showing to the user
//
// Produced by the audio clock (device opened, stream errors) and by the UI
// when a transport control fails. Consumed by `TrainerApp`.

use std::fmt;
use std::time::{Duration, Instant};

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerEvent {
    /// Output stream opened and playing
    AudioConnected { sample_rate: u32 },
    /// The backend reported an error on the running stream
    StreamError(String),
    /// Start, tempo or subdivision change could not be applied
    TransportFailed(String),
}

impl TrainerEvent {
    pub fn is_error(&self) -> bool {
        !matches!(self, TrainerEvent::AudioConnected { .. })
    }
}

impl fmt::Display for TrainerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerEvent::AudioConnected { sample_rate } => {
                write!(f, "Audio connected: {} Hz", sample_rate)
            }
            TrainerEvent::StreamError(e) => write!(f, "Audio stream error: {}", e),
            TrainerEvent::TransportFailed(e) => write!(f, "Transport error: {}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub event: TrainerEvent,
    pub posted_at: Instant,
}

impl Notification {
    pub fn new(event: TrainerEvent) -> Self {
        Self {
            event,
            posted_at: Instant::now(),
        }
    }

    pub fn is_recent(&self, max_age: Duration) -> bool {
        self.posted_at.elapsed() < max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_messages() {
        let connected = TrainerEvent::AudioConnected { sample_rate: 48000 };
        assert_eq!(connected.to_string(), "Audio connected: 48000 Hz");
        assert!(!connected.is_error());

        let lost = TrainerEvent::StreamError("device unplugged".to_string());
        assert_eq!(lost.to_string(), "Audio stream error: device unplugged");
        assert!(lost.is_error());

        assert!(TrainerEvent::TransportFailed("x".to_string()).is_error());
    }

    #[test]
    fn test_notification_is_recent() {
        let notif = Notification::new(TrainerEvent::AudioConnected { sample_rate: 44100 });
        assert!(notif.is_recent(Duration::from_secs(10)));
        assert!(!notif.is_recent(Duration::ZERO));

        if let Some(earlier) = Instant::now().checked_sub(Duration::from_secs(60)) {
            let old = Notification {
                posted_at: earlier,
                ..notif
            };
            assert!(!old.is_recent(Duration::from_secs(10)));
        }
    }
}
