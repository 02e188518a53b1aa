use beat_trainer::audio::AudioClock;
use beat_trainer::config::TrainerConfig;
use beat_trainer::messaging::channels::create_notification_channel;
use beat_trainer::ui::app::TrainerApp;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrainerConfig::default();

    // Audio stream errors -> UI
    let (notification_tx, notification_rx) =
        create_notification_channel(config.notification_capacity);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    // No audio clock, no metronome: there is no silent mode
    let clock = match AudioClock::new(&config, notification_tx) {
        Ok(clock) => clock,
        Err(e) => {
            log::error!("Audio initialisation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 720.0])
            .with_title("Beat Trainer"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Beat Trainer",
        native_options,
        Box::new(move |_cc| Ok(Box::new(TrainerApp::new(clock, &config, notification_rx)))),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("UI error: {}", e);
            ExitCode::FAILURE
        }
    }
}
