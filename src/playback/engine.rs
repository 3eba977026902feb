use crate::api::Track;
use crate::playback::events::{EngineSignal, MediaEvent, PlaybackState, SourceEvent, SourceId};
use crate::playback::output::MediaOutput;

pub const DEFAULT_VOLUME: f64 = 0.7;

/// Binds one track at a time to a [`MediaOutput`] and keeps the intent
/// flag, position and volume in sync with it.
///
/// `is_playing` is what the user asked for. It can be ahead of the output
/// while a play request is pending and is reset to `false` when the output
/// rejects playback.
pub struct PlaybackEngine<O: MediaOutput> {
    output: O,
    source: Option<SourceId>,
    last_source: u64,
    state: PlaybackState,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    is_muted: bool,
    warning: Option<String>,
}

impl<O: MediaOutput> PlaybackEngine<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            source: None,
            last_source: 0,
            state: PlaybackState::Idle,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            warning: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// Level actually sent to the output.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Last non-fatal playback problem, cleared on read.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    /// Sets the intent flag without touching the output. The next
    /// `load_track` honours it.
    pub fn set_intent(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub async fn load_track(&mut self, track: &Track) {
        self.last_source += 1;
        let source = SourceId(self.last_source);
        self.source = Some(source);
        self.current_time = 0.0;
        self.duration = 0.0;
        self.state = PlaybackState::Loading;

        tracing::debug!(track_id = %track.id, source = source.0, "Loading track");

        if let Err(e) = self.output.set_source(source, &track.audio_url).await {
            tracing::warn!(track_id = %track.id, error = %e, "Failed to bind track");
            self.source = None;
            self.is_playing = false;
            self.state = PlaybackState::Idle;
            self.warning = Some(e.to_string());
            return;
        }

        let level = self.effective_volume();
        if let Err(e) = self.output.set_volume(level).await {
            tracing::warn!(error = %e, "Failed to apply volume to new track");
        }

        if self.is_playing {
            self.start_output().await;
        }
    }

    pub async fn toggle_play_pause(&mut self) {
        if self.source.is_none() {
            tracing::debug!("Play/pause ignored, no track loaded");
            return;
        }

        self.is_playing = !self.is_playing;
        if self.is_playing {
            self.start_output().await;
        } else {
            if let Err(e) = self.output.pause().await {
                tracing::warn!(error = %e, "Pause failed");
            }
            self.state = PlaybackState::Paused;
        }
    }

    async fn start_output(&mut self) {
        match self.output.play().await {
            Ok(()) => {
                self.state = PlaybackState::Playing;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Playback start rejected");
                self.is_playing = false;
                if self.state != PlaybackState::Loading {
                    self.state = PlaybackState::Paused;
                }
                self.warning = Some(e.to_string());
            }
        }
    }

    /// Moves the position locally first so the UI does not jump back while
    /// the output catches up.
    pub async fn seek(&mut self, position_secs: f64) {
        if self.source.is_none() || position_secs.is_nan() {
            return;
        }

        let upper = if self.duration > 0.0 {
            self.duration
        } else {
            f64::MAX
        };
        let target = position_secs.clamp(0.0, upper);
        self.current_time = target;

        if let Err(e) = self.output.seek(target).await {
            tracing::warn!(position = target, error = %e, "Seek failed");
        }
    }

    /// Choosing a level always unmutes.
    pub async fn set_volume(&mut self, level: f64) {
        if level.is_nan() {
            return;
        }
        self.volume = level.clamp(0.0, 1.0);
        self.is_muted = false;
        self.push_volume().await;
    }

    pub async fn toggle_mute(&mut self) {
        self.is_muted = !self.is_muted;
        self.push_volume().await;
    }

    async fn push_volume(&mut self) {
        let level = self.effective_volume();
        if let Err(e) = self.output.set_volume(level).await {
            tracing::warn!(level, error = %e, "Volume change failed");
        }
    }

    /// Applies an output event. Events for any source other than the
    /// current one are dropped.
    pub fn handle_event(&mut self, event: SourceEvent) -> Option<EngineSignal> {
        if self.source != Some(event.source) {
            tracing::trace!(source = event.source.0, "Dropping stale media event");
            return None;
        }

        match event.event {
            MediaEvent::TimeUpdate(secs) if secs.is_finite() => {
                let secs = secs.max(0.0);
                self.current_time = if self.duration > 0.0 {
                    secs.min(self.duration)
                } else {
                    secs
                };
                None
            }
            MediaEvent::TimeUpdate(_) => None,
            MediaEvent::MetadataLoaded { duration } => {
                self.duration = if duration.is_finite() {
                    duration.max(0.0)
                } else {
                    0.0
                };
                self.current_time = self.current_time.min(self.duration);
                if self.state == PlaybackState::Loading {
                    self.state = if self.is_playing {
                        PlaybackState::Playing
                    } else {
                        PlaybackState::Ready
                    };
                }
                None
            }
            MediaEvent::Ended => {
                self.state = PlaybackState::Ended;
                self.current_time = self.duration;
                Some(EngineSignal::Ended)
            }
            MediaEvent::Error(message) => {
                tracing::warn!(%message, "Media output reported an error");
                self.is_playing = false;
                self.state = PlaybackState::Paused;
                self.warning = Some(message);
                None
            }
        }
    }

    /// Detaches the current track and stops the output.
    pub async fn unload(&mut self) {
        self.source = None;
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.state = PlaybackState::Idle;
        if let Err(e) = self.output.stop().await {
            tracing::warn!(error = %e, "Failed to stop output");
        }
    }
}
