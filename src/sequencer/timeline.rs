// Timeline - Tempo and subdivision settings
// Everything here is measured in seconds relative to the transport origin

use std::fmt;

/// Tempo in BPM (Beats Per Minute)
/// Always held inside [MIN_BPM, MAX_BPM]; out-of-range input is clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TempoSetting {
    bpm: u32,
}

impl TempoSetting {
    pub const MIN_BPM: u32 = 40;
    pub const MAX_BPM: u32 = 200;
    pub const DEFAULT_BPM: u32 = 60;

    /// Creates a new tempo, clamping to the supported range
    pub fn new(bpm: i64) -> Self {
        Self {
            bpm: bpm.clamp(Self::MIN_BPM as i64, Self::MAX_BPM as i64) as u32,
        }
    }

    /// Get BPM value
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Duration of one beat cycle in seconds
    pub fn cycle_duration(&self) -> f64 {
        60.0 / self.bpm as f64
    }
}

impl Default for TempoSetting {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BPM as i64)
    }
}

impl fmt::Display for TempoSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}

/// Accent pattern layered on top of the base beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Subdivision {
    /// One extra trigger at the half-cycle point
    Two,
    /// Two extra triggers at one third and two thirds of the cycle
    Three,
}

impl Subdivision {
    /// Phase offsets of the extra triggers, as fractions of one cycle
    pub fn fractions(&self) -> &'static [f64] {
        match self {
            Subdivision::Two => &[1.0 / 2.0],
            Subdivision::Three => &[1.0 / 3.0, 2.0 / 3.0],
        }
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subdivision::Two => write!(f, "2"),
            Subdivision::Three => write!(f, "3"),
        }
    }
}

/// Which subdivisions are currently enabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubdivisionFlags {
    pub two: bool,
    pub three: bool,
}

impl SubdivisionFlags {
    pub fn is_enabled(&self, kind: Subdivision) -> bool {
        match kind {
            Subdivision::Two => self.two,
            Subdivision::Three => self.three,
        }
    }

    pub fn set(&mut self, kind: Subdivision, enabled: bool) {
        match kind {
            Subdivision::Two => self.two = enabled,
            Subdivision::Three => self.three = enabled,
        }
    }

    /// Enabled subdivisions in a stable order (Two before Three)
    pub fn enabled(&self) -> impl Iterator<Item = Subdivision> + '_ {
        [Subdivision::Two, Subdivision::Three]
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
    }
}
