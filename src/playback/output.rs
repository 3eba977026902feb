use async_trait::async_trait;

use crate::error::PlaybackError;
use crate::playback::events::SourceId;

/// The single playback resource. Only [`PlaybackEngine`] talks to it.
///
/// Progress flows back separately as [`SourceEvent`]s tagged with the id
/// passed to `set_source`.
///
/// [`PlaybackEngine`]: crate::playback::PlaybackEngine
/// [`SourceEvent`]: crate::playback::SourceEvent
#[async_trait]
pub trait MediaOutput: Send {
    async fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError>;

    /// May be rejected (no audio device, unreachable stream).
    async fn play(&mut self) -> Result<(), PlaybackError>;

    async fn pause(&mut self) -> Result<(), PlaybackError>;

    async fn seek(&mut self, position_secs: f64) -> Result<(), PlaybackError>;

    /// `level` in `[0, 1]`.
    async fn set_volume(&mut self, level: f64) -> Result<(), PlaybackError>;

    async fn stop(&mut self) -> Result<(), PlaybackError>;
}
