pub mod controller;
pub mod engine;
pub mod events;
#[cfg(unix)]
pub mod mpv;
pub mod output;

#[cfg(test)]
pub(crate) mod fake;

pub use controller::PlaylistController;
pub use engine::PlaybackEngine;
pub use events::{EngineSignal, MediaEvent, PlaybackState, SourceEvent, SourceId};
#[cfg(unix)]
pub use mpv::MpvOutput;
pub use output::MediaOutput;
