// Main UI - Controls, guide rows and the sweep line
//
// The app keeps no timing state of its own: it forwards control changes to
// the scheduler and, once per frame, asks the synchronizer for the sweep
// position computed from the scheduler's clock.

use crate::audio::engine::AudioClock;
use crate::config::TrainerConfig;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, TrainerEvent};
use crate::sequencer::clock::ClockError;
use crate::sequencer::rhythm::GUIDE_ROWS;
use crate::sequencer::scheduler::BeatScheduler;
use crate::sequencer::sync::{PositionSynchronizer, TrainerSnapshot};
use crate::sequencer::timeline::{Subdivision, TempoSetting};
use eframe::egui;
use std::collections::VecDeque;
use std::time::Duration;

/// Logical drawing area, scaled to fit the panel
const VIEW_WIDTH: f32 = 800.0;
const VIEW_HEIGHT: f32 = 600.0;
const ROW_SPACING: f64 = 100.0;
const MARKER_HALF_HEIGHT: f64 = 10.0;
const SWEEP_TOP: f64 = 50.0;
const SWEEP_BOTTOM: f64 = 550.0;
const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(5);

pub struct TrainerApp {
    scheduler: BeatScheduler<AudioClock>,
    sync: PositionSynchronizer,
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    max_notifications: usize,
}

impl TrainerApp {
    pub fn new(
        clock: AudioClock,
        config: &TrainerConfig,
        notification_rx: NotificationConsumer,
    ) -> Self {
        Self {
            scheduler: BeatScheduler::with_settings(clock, config.tempo, config.subdivisions),
            sync: PositionSynchronizer::new(config.sweep_range),
            notification_rx,
            notification_queue: VecDeque::new(),
            max_notifications: config.max_notifications,
        }
    }

    /// Drain new notifications from the ring buffer into the queue
    fn update_notifications(&mut self) {
        while let Some(notification) =
            ringbuf::traits::Consumer::try_pop(&mut self.notification_rx)
        {
            self.push_notification(notification);
        }
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notification_queue.push_back(notification);
        if self.notification_queue.len() > self.max_notifications {
            self.notification_queue.pop_front();
        }
    }

    /// Surface a failed control operation
    fn report(&mut self, result: Result<(), ClockError>) {
        if let Err(e) = result {
            log::error!("Transport error: {}", e);
            self.push_notification(Notification::new(TrainerEvent::TransportFailed(
                e.to_string(),
            )));
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui, snapshot: &TrainerSnapshot) {
        ui.horizontal(|ui| {
            let mut bpm = snapshot.bpm;
            let slider = egui::Slider::new(&mut bpm, TempoSetting::MIN_BPM..=TempoSetting::MAX_BPM)
                .text("BPM");
            if ui.add(slider).changed() {
                let result = self.scheduler.set_tempo(bpm as i64);
                self.report(result);
            }

            ui.separator();

            if ui
                .button(snapshot.transport_state.toggle_label())
                .clicked()
            {
                let result = self.scheduler.toggle();
                if self.scheduler.state().is_running() {
                    self.sync.reset();
                }
                self.report(result);
            }

            ui.separator();

            for kind in [Subdivision::Two, Subdivision::Three] {
                let mut enabled = snapshot.subdivisions.is_enabled(kind);
                if ui.checkbox(&mut enabled, kind.to_string()).changed() {
                    let result = self.scheduler.set_subdivision(kind, enabled);
                    self.report(result);
                }
            }
        });
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Audio: {}", self.scheduler.clock().status()));
            ui.separator();
            ui.label(format!("Transport: {}", self.scheduler.state()));
        });

        for notification in self
            .notification_queue
            .iter()
            .rev()
            .filter(|n| n.is_recent(NOTIFICATION_LIFETIME))
            .take(3)
        {
            let color = if notification.event.is_error() {
                egui::Color32::LIGHT_RED
            } else {
                egui::Color32::LIGHT_BLUE
            };
            ui.colored_label(color, notification.event.to_string());
        }
    }

    fn draw_guide(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        let scale = (rect.width() / VIEW_WIDTH).min(rect.height() / VIEW_HEIGHT);
        let to_screen =
            |x: f64, y: f64| rect.min + egui::vec2(x as f32 * scale, y as f32 * scale);

        let ink = ui.visuals().text_color();
        let stroke = egui::Stroke::new(3.0, ink);
        let range = self.sync.range();

        for (index, row) in GUIDE_ROWS.iter().enumerate() {
            let y = ROW_SPACING * (index + 1) as f64;

            painter.line_segment([to_screen(range.start, y), to_screen(range.end(), y)], stroke);
            painter.text(
                to_screen(range.start - 20.0, y),
                egui::Align2::RIGHT_CENTER,
                row.beat_count.to_string(),
                egui::FontId::proportional(20.0 * scale),
                ink,
            );

            for x in row.marker_positions(range.start, range.width) {
                painter.line_segment(
                    [
                        to_screen(x, y - MARKER_HALF_HEIGHT),
                        to_screen(x, y + MARKER_HALF_HEIGHT),
                    ],
                    stroke,
                );
            }
        }

        let x = self.sync.position();
        painter.line_segment(
            [to_screen(x, SWEEP_TOP), to_screen(x, SWEEP_BOTTOM)],
            egui::Stroke::new(3.0, egui::Color32::RED),
        );
    }
}

impl eframe::App for TrainerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_notifications();

        self.sync.tick(&self.scheduler);
        let snapshot = TrainerSnapshot::capture(&self.scheduler, &self.sync);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.heading("Beat Trainer");
            self.draw_controls(ui, &snapshot);
            self.draw_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_guide(ui);
        });

        // Animation tick: keep repainting while the sweep moves
        if self.scheduler.state().is_running() {
            ctx.request_repaint();
        }
    }
}

impl Drop for TrainerApp {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
