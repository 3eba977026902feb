pub mod api;
pub mod app;
pub mod capture;
pub mod cli;
pub mod error;
pub mod logging;
pub mod playback;
pub mod state;
