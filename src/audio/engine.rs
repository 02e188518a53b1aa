// Audio clock - Transport driven by the CPAL output callback
//
// # Timing authority
//
// The output stream is the only thing that advances transport time: the
// callback counts rendered frames in `AudioTiming`, and before rendering
// each frame it dispatches every trigger due at that frame's transport time
// into the click voice. The UI reads the same counter through `Clock::now`,
// so the sweep and the clicks share one clock.
//
// # Locking
//
// The trigger table sits behind a `Mutex`. The callback only uses
// `try_lock`; if the control side holds it, the voice keeps ringing and time
// keeps advancing, and triggers that came due are dispatched with the next
// buffer. Control operations take the lock, so once `stop()` or `rearm()`
// returns, the callback sees the new trigger set from its next buffer on.
//
// # Format Support
//
// F32, I16 and U16 devices are supported; the voice renders f32 and
// `write_mono_to_interleaved_frame` converts on write.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::format_conversion::{write_mono_to_interleaved_frame, write_silence};
use crate::audio::status::{AtomicDeviceStatus, DeviceStatus};
use crate::audio::timing::AudioTiming;
use crate::config::TrainerConfig;
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::{Notification, TrainerEvent};
use crate::sequencer::clock::{Clock, ClockError, TriggerHandle, TriggerSpec, TriggerTable};
use crate::sequencer::metronome::Metronome;

pub struct AudioClock {
    _device: Device,
    _stream: Stream,
    timing: AudioTiming,
    table: Arc<Mutex<TriggerTable>>,
    status: AtomicDeviceStatus,
}

impl AudioClock {
    /// Open the default output device and start the stream
    ///
    /// The stream runs for the lifetime of the clock; the transport starts
    /// stopped and renders silence until `start()`.
    pub fn new(
        config: &TrainerConfig,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, ClockError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(ClockError::NoOutputDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| ClockError::StreamConfig(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        let stream_config: StreamConfig = supported_config.into();

        let timing = AudioTiming::new(sample_rate as f64);
        let table = Arc::new(Mutex::new(TriggerTable::new()));
        let status = AtomicDeviceStatus::new(DeviceStatus::Connecting);
        let metronome = Metronome::new(sample_rate as f32, config.click_volume);

        let parts = StreamParts {
            channels,
            timing: timing.clone(),
            table: Arc::clone(&table),
            metronome,
            status: status.clone(),
            notification_tx: Arc::clone(&notification_tx),
        };

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &stream_config, parts),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &stream_config, parts),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &stream_config, parts),
            other => Err(ClockError::UnsupportedSampleFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| ClockError::StreamPlay(e.to_string()))?;

        status.set(DeviceStatus::Connected);
        log::info!("Audio clock started: {} Hz, {} channels", sample_rate, channels);

        if let Ok(mut tx) = notification_tx.try_lock() {
            let notif = Notification::new(TrainerEvent::AudioConnected { sample_rate });
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        Ok(Self {
            _device: device,
            _stream: stream,
            timing,
            table,
            status,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        parts: StreamParts,
    ) -> Result<Stream, ClockError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let StreamParts {
            channels,
            timing,
            table,
            mut metronome,
            status,
            notification_tx,
        } = parts;

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // No allocations, no I/O, no blocking locks in here
                    let mut table = table.try_lock().ok();
                    render_block(
                        data,
                        channels,
                        table.as_deref_mut(),
                        &timing,
                        &mut metronome,
                    );
                },
                move |err| {
                    // Runs outside the audio callback, I/O is fine here
                    log::error!("Audio stream error: {}", err);
                    status.set(DeviceStatus::Error);

                    if let Ok(mut tx) = notification_tx.try_lock() {
                        let notif =
                            Notification::new(TrainerEvent::StreamError(err.to_string()));
                        let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                    }
                },
                None,
            )
            .map_err(|e| ClockError::StreamBuild(e.to_string()))
    }

    fn lock_table(&self) -> MutexGuard<'_, TriggerTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }
}

/// Render one output buffer
///
/// Without the table (held by a control operation) the voice still plays and
/// time still advances; due triggers wait for the next dispatch.
fn render_block<T>(
    data: &mut [T],
    channels: usize,
    mut table: Option<&mut TriggerTable>,
    timing: &AudioTiming,
    metronome: &mut Metronome,
) where
    T: Sample + FromSample<f32>,
{
    if !timing.is_running() {
        metronome.reset();
        write_silence(data);
        return;
    }

    for frame in data.chunks_mut(channels) {
        if let Some(table) = table.as_deref_mut() {
            table.dispatch_through(timing.seconds(), |event| {
                metronome.trigger_click(event.click)
            });
        }
        timing.advance(1);

        write_mono_to_interleaved_frame(metronome.process_sample(), frame);
    }
}

/// Everything moved into the output callback
struct StreamParts {
    channels: usize,
    timing: AudioTiming,
    table: Arc<Mutex<TriggerTable>>,
    metronome: Metronome,
    status: AtomicDeviceStatus,
    notification_tx: Arc<Mutex<NotificationProducer>>,
}

impl Clock for AudioClock {
    fn now(&self) -> f64 {
        self.timing.seconds()
    }

    fn is_running(&self) -> bool {
        self.timing.is_running()
    }

    fn start(&mut self) {
        let mut table = self.lock_table();
        self.timing.reset();
        table.rewind();
        self.timing.set_running(true);
    }

    fn stop(&mut self) {
        let mut table = self.lock_table();
        self.timing.set_running(false);
        table.clear();
        self.timing.reset();
    }

    fn schedule_recurring(&mut self, spec: TriggerSpec) -> Result<TriggerHandle, ClockError> {
        self.lock_table().arm(spec)
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        self.lock_table().cancel(handle);
    }

    /// Swap trigger sets under one lock so the callback never renders a
    /// frame with a half-built set
    fn rearm(
        &mut self,
        cancel: &[TriggerHandle],
        arm: &[TriggerSpec],
    ) -> Result<Vec<TriggerHandle>, ClockError> {
        for spec in arm {
            spec.validate()?;
        }

        let mut table = self.lock_table();
        for handle in cancel {
            table.cancel(*handle);
        }
        arm.iter().map(|spec| table.arm(*spec)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::metronome::ClickType;

    const RATE: f64 = 48000.0;
    const BUFFER: usize = 480;

    fn armed_table() -> TriggerTable {
        let mut table = TriggerTable::new();
        table
            .arm(TriggerSpec::new(1.0, 0.0, ClickType::Beat))
            .unwrap();
        table
    }

    #[test]
    fn test_stopped_renders_silence() {
        let timing = AudioTiming::new(RATE);
        let mut metronome = Metronome::new(RATE as f32, 1.0);
        let mut table = armed_table();
        let mut data = vec![1.0f32; BUFFER * 2];

        render_block(&mut data, 2, Some(&mut table), &timing, &mut metronome);

        assert!(data.iter().all(|&s| s == 0.0));
        assert_eq!(timing.current_sample(), 0);
    }

    #[test]
    fn test_dispatches_and_advances() {
        let timing = AudioTiming::new(RATE);
        timing.set_running(true);
        let mut metronome = Metronome::new(RATE as f32, 1.0);
        let mut table = armed_table();
        let mut data = vec![0.0f32; BUFFER * 2];

        render_block(&mut data, 2, Some(&mut table), &timing, &mut metronome);

        assert_eq!(timing.current_sample(), BUFFER as u64);
        assert!(data.iter().any(|s| s.abs() > 0.01));
        // Both channels carry the same click
        assert!(data.chunks(2).all(|frame| frame[0] == frame[1]));
        assert_eq!(table.next_fire_time(), Some(1.0));
    }

    /// A buffer rendered while a rebuild holds the table keeps the click
    /// ringing and time moving
    #[test]
    fn test_locked_table_keeps_voice_and_time() {
        let timing = AudioTiming::new(RATE);
        timing.set_running(true);
        let mut metronome = Metronome::new(RATE as f32, 1.0);
        let mut table = armed_table();
        let mut data = vec![0.0f32; BUFFER];

        render_block(&mut data, 1, Some(&mut table), &timing, &mut metronome);
        render_block(&mut data, 1, None, &timing, &mut metronome);

        assert_eq!(timing.current_sample(), 2 * BUFFER as u64);
        assert!(data.iter().any(|s| s.abs() > 0.01));
    }

    /// Triggers that came due during a locked buffer fire with the next one
    #[test]
    fn test_due_triggers_deferred_to_next_buffer() {
        let timing = AudioTiming::new(RATE);
        timing.set_running(true);
        let mut metronome = Metronome::new(RATE as f32, 1.0);
        let mut table = TriggerTable::new();
        table
            .arm(TriggerSpec::new(1.0, 0.005, ClickType::Accent))
            .unwrap();
        let mut data = vec![0.0f32; BUFFER];

        render_block(&mut data, 1, None, &timing, &mut metronome);
        assert!(data.iter().all(|&s| s == 0.0));
        assert_eq!(table.next_fire_time(), Some(0.005));

        render_block(&mut data, 1, Some(&mut table), &timing, &mut metronome);
        assert_eq!(table.next_fire_time(), Some(1.005));
        assert!(data.iter().any(|s| s.abs() > 0.01));
    }
}
