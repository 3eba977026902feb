use std::collections::HashSet;

use crate::api::{Playlist, Track};
use crate::error::PlaybackError;
use crate::playback::engine::PlaybackEngine;
use crate::playback::events::{EngineSignal, SourceEvent};
use crate::playback::output::MediaOutput;

/// Circular playlist on top of a [`PlaybackEngine`].
///
/// Track changes always go through the engine; the controller never touches
/// the output directly.
pub struct PlaylistController<O: MediaOutput> {
    engine: PlaybackEngine<O>,
    playlist: Option<Playlist>,
    current_index: usize,
    liked: HashSet<String>,
    panel_open: bool,
}

impl<O: MediaOutput> PlaylistController<O> {
    pub fn new(engine: PlaybackEngine<O>) -> Self {
        Self {
            engine,
            playlist: None,
            current_index: 0,
            liked: HashSet::new(),
            panel_open: false,
        }
    }

    pub fn engine(&self) -> &PlaybackEngine<O> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine<O> {
        &mut self.engine
    }

    pub fn into_engine(self) -> PlaybackEngine<O> {
        self.engine
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    pub fn tracks(&self) -> &[Track] {
        self.playlist
            .as_ref()
            .map(|p| p.tracks.as_slice())
            .unwrap_or_default()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks().get(self.current_index)
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.liked.contains(track_id)
    }

    pub fn liked_track_ids(&self) -> &HashSet<String> {
        &self.liked
    }

    /// Installs a new playlist (or none). Index goes back to 0 and intent
    /// to paused; the first track is bound but not started.
    pub async fn set_playlist(&mut self, playlist: Option<Playlist>) {
        self.current_index = 0;
        self.engine.set_intent(false);
        self.playlist = playlist;

        match self.playlist.as_ref().and_then(|p| p.tracks.first()) {
            Some(first) => {
                tracing::info!(
                    playlist = %self.playlist.as_ref().map(|p| p.name.as_str()).unwrap_or_default(),
                    tracks = self.tracks().len(),
                    "Playlist installed"
                );
                self.engine.load_track(first).await;
            }
            None => self.engine.unload().await,
        }
    }

    pub async fn close(&mut self) {
        self.set_playlist(None).await;
    }

    /// Advances one track, wrapping to the first after the last.
    pub async fn next(&mut self) {
        let len = self.tracks().len();
        if len == 0 {
            return;
        }
        self.play_index((self.current_index + 1) % len).await;
    }

    /// Steps back one track, wrapping to the last from the first.
    pub async fn previous(&mut self) {
        let len = self.tracks().len();
        if len == 0 {
            return;
        }
        let index = if self.current_index == 0 {
            len - 1
        } else {
            self.current_index - 1
        };
        self.play_index(index).await;
    }

    pub async fn select_track(&mut self, index: usize) -> Result<(), PlaybackError> {
        let len = self.tracks().len();
        if index >= len {
            return Err(PlaybackError::InvalidIndex { index, len });
        }
        self.panel_open = false;
        self.play_index(index).await;
        Ok(())
    }

    async fn play_index(&mut self, index: usize) {
        self.current_index = index;
        self.engine.set_intent(true);
        if let Some(track) = self.playlist.as_ref().and_then(|p| p.tracks.get(index)) {
            self.engine.load_track(track).await;
        }
    }

    /// Feeds an output event through the engine. A finished track behaves
    /// exactly like `next`.
    pub async fn handle_event(&mut self, event: SourceEvent) {
        if let Some(EngineSignal::Ended) = self.engine.handle_event(event) {
            tracing::debug!(index = self.current_index, "Track ended, advancing");
            self.next().await;
        }
    }

    /// Returns whether the track is liked afterwards.
    pub fn toggle_like(&mut self, track_id: &str) -> bool {
        if self.liked.remove(track_id) {
            false
        } else {
            self.liked.insert(track_id.to_string());
            true
        }
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::events::{MediaEvent, PlaybackState};
    use crate::playback::fake::{track, Call, FakeOutput};

    fn playlist(durations: &[(&str, f64)]) -> Playlist {
        Playlist {
            name: "Serene Moments".into(),
            tracks: durations.iter().map(|(id, d)| track(id, *d)).collect(),
            tags: vec!["calm".into()],
            total_tracks: 99,
            sentiment: Some("positive".into()),
            energy: Some("low".into()),
            error: None,
        }
    }

    async fn controller_with(durations: &[(&str, f64)]) -> PlaylistController<FakeOutput> {
        let mut controller = PlaylistController::new(PlaybackEngine::new(FakeOutput::default()));
        controller.set_playlist(Some(playlist(durations))).await;
        controller
    }

    fn ended(controller: &PlaylistController<FakeOutput>) -> SourceEvent {
        SourceEvent::new(controller.engine().source().unwrap(), MediaEvent::Ended)
    }

    #[tokio::test]
    async fn next_n_times_is_a_full_circle() {
        for n in 1..=5 {
            let ids: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
            let spec: Vec<(&str, f64)> = ids.iter().map(|id| (id.as_str(), 60.0)).collect();
            let mut controller = controller_with(&spec).await;
            controller.select_track(n / 2).await.unwrap();
            let start = controller.current_index();

            for _ in 0..n {
                controller.next().await;
            }
            assert_eq!(controller.current_index(), start, "playlist of {}", n);
        }
    }

    #[tokio::test]
    async fn wraps_in_both_directions() {
        let mut controller = controller_with(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]).await;

        controller.previous().await;
        assert_eq!(controller.current_index(), 2);
        assert!(controller.engine().is_playing());

        controller.next().await;
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.current_track().unwrap().id, "a");
    }

    #[tokio::test]
    async fn ended_advances_and_wraps() {
        let mut controller = controller_with(&[("a", 30.0), ("b", 45.0)]).await;
        controller.engine_mut().toggle_play_pause().await;
        assert!(controller.engine().is_playing());

        let event = ended(&controller);
        controller.handle_event(event).await;
        assert_eq!(controller.current_index(), 1);
        assert!(controller.engine().is_playing());

        let event = ended(&controller);
        controller.handle_event(event).await;
        assert_eq!(controller.current_index(), 0);
        assert!(controller.engine().is_playing());
        assert_eq!(controller.engine().state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn single_track_reloads_itself() {
        let mut controller = controller_with(&[("solo", 30.0)]).await;
        let first_source = controller.engine().source();

        controller.engine_mut().seek(17.0).await;
        controller.next().await;
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.engine().current_time(), 0.0);
        assert_ne!(controller.engine().source(), first_source);

        controller.previous().await;
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.engine().output().sources().len(), 3);
    }

    #[tokio::test]
    async fn select_closes_panel_and_checks_bounds() {
        let mut controller = controller_with(&[("a", 10.0), ("b", 20.0)]).await;
        assert!(controller.toggle_panel());

        let err = controller.select_track(2).await.unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidIndex { index: 2, len: 2 }));
        assert!(controller.is_panel_open());
        assert_eq!(controller.current_index(), 0);

        controller.select_track(1).await.unwrap();
        assert!(!controller.is_panel_open());
        assert_eq!(controller.current_index(), 1);
        assert!(controller.engine().is_playing());
        assert_eq!(
            controller.engine().output().sources().last().unwrap(),
            "https://audio.example/b.mp3"
        );
    }

    #[tokio::test]
    async fn new_playlist_resets_index_and_intent() {
        let mut controller = controller_with(&[("a", 10.0), ("b", 20.0)]).await;
        controller.select_track(1).await.unwrap();

        controller
            .set_playlist(Some(playlist(&[("x", 5.0), ("y", 6.0), ("z", 7.0)])))
            .await;
        assert_eq!(controller.current_index(), 0);
        assert!(!controller.engine().is_playing());
        assert_eq!(controller.current_track().unwrap().id, "x");
    }

    #[tokio::test]
    async fn empty_playlist_guards_navigation() {
        let mut controller = controller_with(&[]).await;
        controller.next().await;
        controller.previous().await;
        assert_eq!(controller.current_index(), 0);
        assert!(controller.current_track().is_none());
        assert!(controller.select_track(0).await.is_err());
        assert!(!controller.engine().is_playing());
    }

    #[tokio::test]
    async fn close_unloads_engine() {
        let mut controller = controller_with(&[("a", 10.0)]).await;
        controller.engine_mut().toggle_play_pause().await;
        controller.close().await;

        assert!(controller.playlist().is_none());
        assert!(!controller.engine().is_playing());
        assert_eq!(controller.engine().output().calls().last(), Some(&Call::Stop));
    }

    #[tokio::test]
    async fn likes_are_toggled_locally() {
        let mut controller = controller_with(&[("a", 10.0)]).await;
        assert!(controller.toggle_like("a"));
        assert!(controller.is_liked("a"));
        assert!(!controller.toggle_like("a"));
        assert!(controller.liked_track_ids().is_empty());
    }
}
