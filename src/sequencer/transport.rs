// Transport - Running/stopped state shared by scheduler and sweep

use std::fmt;

/// Transport state (run/stop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransportState {
    #[default]
    Stopped,
    Running,
}

impl TransportState {
    /// Check if transport is running
    pub fn is_running(&self) -> bool {
        matches!(self, TransportState::Running)
    }

    /// Check if transport is stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped)
    }

    /// Label for the start/stop control: the action the next press performs
    pub fn toggle_label(&self) -> &'static str {
        match self {
            TransportState::Stopped => "Start",
            TransportState::Running => "Stop",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Running => write!(f, "Running"),
        }
    }
}
