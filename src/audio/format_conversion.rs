// Format conversion for CPAL output buffers
//
// The click voice renders mono f32; devices may want f32, i16 or u16 with
// any channel count. Conversion goes through CPAL's `FromSample` so it stays
// allocation-free inside the callback.

use cpal::{FromSample, Sample};

/// Write one mono sample to every channel of an interleaved frame
#[inline]
pub fn write_mono_to_interleaved_frame<T>(sample: f32, output_frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    let converted: T = Sample::from_sample::<f32>(sample.clamp(-1.0, 1.0));
    for channel_sample in output_frame.iter_mut() {
        *channel_sample = converted;
    }
}

/// Fill a buffer with silence for its sample format
#[inline]
pub fn write_silence<T: Sample>(output: &mut [T]) {
    for sample in output.iter_mut() {
        *sample = T::EQUILIBRIUM;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo_f32() {
        let mut frame = [0.0f32; 2];
        write_mono_to_interleaved_frame(0.25, &mut frame);
        assert_eq!(frame, [0.25, 0.25]);
    }

    #[test]
    fn test_mono_to_i16_clamps() {
        let mut frame = [0i16; 2];
        write_mono_to_interleaved_frame(2.0, &mut frame);
        assert_eq!(frame, [i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_silence_u16_is_midpoint() {
        let mut buffer = [0u16; 4];
        write_silence(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 32768));

        let mut floats = [0.7f32; 3];
        write_silence(&mut floats);
        assert!(floats.iter().all(|&s| s == 0.0));
    }
}
