// UI module - egui front-end driving the scheduler

pub mod app;
