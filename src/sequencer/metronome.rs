// Metronome - Click voice rendered by the audio clock
// Pre-generates short tones so triggering a click costs nothing in the callback

use std::f32::consts::PI;

/// Metronome click type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ClickType {
    /// Main beat at the start of every cycle (low A1)
    Beat,
    /// Subdivision accent inside the cycle (A3)
    Accent,
}

impl ClickType {
    /// Tone frequency in Hz
    pub fn frequency(&self) -> f32 {
        match self {
            ClickType::Beat => 55.0,
            ClickType::Accent => 220.0,
        }
    }
}

/// Metronome click sound generator
/// Pre-generates short click samples for low CPU overhead
#[derive(Debug, Clone)]
pub struct MetronomeSound {
    beat_samples: Vec<f32>,
    accent_samples: Vec<f32>,
}

impl MetronomeSound {
    /// Duration of click in milliseconds
    /// Long enough for a few periods of the 55 Hz beat tone
    const CLICK_DURATION_MS: f32 = 60.0;

    /// Create new metronome sound generator
    pub fn new(sample_rate: f32) -> Self {
        let click_samples = ((Self::CLICK_DURATION_MS / 1000.0) * sample_rate) as usize;

        Self {
            beat_samples: Self::generate_click(
                sample_rate,
                click_samples,
                ClickType::Beat.frequency(),
                0.8,
            ),
            accent_samples: Self::generate_click(
                sample_rate,
                click_samples,
                ClickType::Accent.frequency(),
                0.5,
            ),
        }
    }

    /// Generate a short tone using sine wave with exponential decay
    fn generate_click(
        sample_rate: f32,
        num_samples: usize,
        frequency: f32,
        amplitude: f32,
    ) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;

        (0..num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                let envelope = (-t * 6.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    /// Get click samples for given type
    pub fn get_click(&self, click_type: ClickType) -> &[f32] {
        match click_type {
            ClickType::Beat => &self.beat_samples,
            ClickType::Accent => &self.accent_samples,
        }
    }
}

/// Clicks that can sound at the same time
const MAX_CLICKS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct ClickPlayback {
    click_type: ClickType,
    position: usize,
}

/// Click voice
///
/// Clicks overlap: at 200 BPM with both subdivisions, accents are 50 ms
/// apart, shorter than one click. Up to `MAX_CLICKS` play at once; beyond
/// that the oldest one is replaced.
#[derive(Debug, Clone)]
pub struct Metronome {
    sound: MetronomeSound,
    volume: f32,
    playing: [Option<ClickPlayback>; MAX_CLICKS],
}

impl Metronome {
    pub fn new(sample_rate: f32, volume: f32) -> Self {
        Self {
            sound: MetronomeSound::new(sample_rate),
            volume: volume.clamp(0.0, 1.0),
            playing: [None; MAX_CLICKS],
        }
    }

    pub fn trigger_click(&mut self, click_type: ClickType) {
        let playback = ClickPlayback {
            click_type,
            position: 0,
        };

        let slot = match self.playing.iter().position(Option::is_none) {
            Some(free) => free,
            None => self
                .playing
                .iter()
                .enumerate()
                .max_by_key(|(_, p)| p.map_or(0, |p| p.position))
                .map_or(0, |(index, _)| index),
        };
        self.playing[slot] = Some(playback);
    }

    /// Process one sample of metronome output
    /// Sum of every sounding click (0.0 if none)
    pub fn process_sample(&mut self) -> f32 {
        let mut mix = 0.0;

        for slot in &mut self.playing {
            let Some(playback) = slot else {
                continue;
            };

            match self.sound.get_click(playback.click_type).get(playback.position) {
                Some(sample) => {
                    mix += sample;
                    playback.position += 1;
                }
                None => *slot = None,
            }
        }

        mix * self.volume
    }

    /// Silence immediately (no tail after a stop)
    pub fn reset(&mut self) {
        self.playing = [None; MAX_CLICKS];
    }
}
