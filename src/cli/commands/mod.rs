pub mod analyze;
pub mod auth;
pub mod history;
pub mod misc;
pub mod play;
