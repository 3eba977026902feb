/// Identifies one binding of the output to a track. Bumped on every load so
/// events from the previous track can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    TimeUpdate(f64),
    MetadataLoaded { duration: f64 },
    Ended,
    Error(String),
}

/// A media event tagged with the source it was produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub source: SourceId,
    pub event: MediaEvent,
}

impl SourceEvent {
    pub fn new(source: SourceId, event: MediaEvent) -> Self {
        Self { source, event }
    }
}

/// What the engine reports upward after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}
