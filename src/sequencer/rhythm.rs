// Rhythm guide rows - Static beat-marker layout drawn behind the sweep

/// One guide row: a horizontal span split into `beat_count` equal parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmLineSpec {
    pub beat_count: u32,
}

/// Guide rows shown top to bottom
pub const GUIDE_ROWS: [RhythmLineSpec; 5] = [
    RhythmLineSpec::new(1),
    RhythmLineSpec::new(2),
    RhythmLineSpec::new(3),
    RhythmLineSpec::new(4),
    RhythmLineSpec::new(6),
];

impl RhythmLineSpec {
    pub const fn new(beat_count: u32) -> Self {
        Self { beat_count }
    }

    /// Distance between markers for a span of `width`
    pub fn marker_spacing(&self, width: f64) -> f64 {
        width / self.beat_count.max(1) as f64
    }

    /// Marker x positions, starting at `start`
    /// The end of the span is not a marker: it is the next cycle's first beat
    pub fn marker_positions(&self, start: f64, width: f64) -> impl Iterator<Item = f64> {
        let spacing = self.marker_spacing(width);
        (0..self.beat_count).map(move |i| start + i as f64 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_rows() {
        let counts: Vec<u32> = GUIDE_ROWS.iter().map(|row| row.beat_count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_marker_positions() {
        let row = RhythmLineSpec::new(4);
        let positions: Vec<f64> = row.marker_positions(100.0, 600.0).collect();
        assert_eq!(positions, vec![100.0, 250.0, 400.0, 550.0]);

        let single: Vec<f64> = RhythmLineSpec::new(1).marker_positions(100.0, 600.0).collect();
        assert_eq!(single, vec![100.0]);
    }

    #[test]
    fn test_marker_spacing() {
        assert_eq!(RhythmLineSpec::new(6).marker_spacing(600.0), 100.0);
        assert_eq!(RhythmLineSpec::new(0).marker_spacing(600.0), 600.0);
        assert_eq!(RhythmLineSpec::new(0).marker_positions(0.0, 600.0).count(), 0);
    }
}
