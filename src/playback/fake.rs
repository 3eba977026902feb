//! Recording output for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::Track;
use crate::error::PlaybackError;
use crate::playback::events::SourceId;
use crate::playback::output::MediaOutput;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetSource(SourceId, String),
    Play,
    Pause,
    Seek(f64),
    Volume(f64),
    Stop,
}

#[derive(Default, Clone)]
pub struct FakeOutput {
    calls: Arc<Mutex<Vec<Call>>>,
    reject_play: Arc<AtomicBool>,
    reject_source: Arc<AtomicBool>,
}

impl FakeOutput {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reject_play(&self, reject: bool) {
        self.reject_play.store(reject, Ordering::SeqCst);
    }

    pub fn reject_source(&self, reject: bool) {
        self.reject_source.store(reject, Ordering::SeqCst);
    }

    pub fn sources(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetSource(_, url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaOutput for FakeOutput {
    async fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError> {
        if self.reject_source.load(Ordering::SeqCst) {
            return Err(PlaybackError::Output("unreachable url".into()));
        }
        self.record(Call::SetSource(source, url.to_string()));
        Ok(())
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        if self.reject_play.load(Ordering::SeqCst) {
            return Err(PlaybackError::Rejected("no audio device".into()));
        }
        self.record(Call::Play);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlaybackError> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn seek(&mut self, position_secs: f64) -> Result<(), PlaybackError> {
        self.record(Call::Seek(position_secs));
        Ok(())
    }

    async fn set_volume(&mut self, level: f64) -> Result<(), PlaybackError> {
        self.record(Call::Volume(level));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), PlaybackError> {
        self.record(Call::Stop);
        Ok(())
    }
}

pub fn track(id: &str, duration: f64) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        artist: "Test Artist".to_string(),
        album: None,
        duration,
        audio_url: format!("https://audio.example/{}.mp3", id),
        image_url: None,
        attribution_url: format!("https://www.jamendo.com/track/{}", id),
        license: None,
    }
}
