// Messaging - Notifications from the audio side to the UI

pub mod channels;
pub mod notification;
