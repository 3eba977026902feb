//! Dictation of journal entries.
//!
//! [`TranscriptCapture`] is the state machine; [`listen`] drives it from a
//! recognizer event stream with the auto-stop limit applied.

pub mod recognizer;
pub mod transcript;

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

pub use recognizer::{
    ProcessRecognizer, RecognitionEvent, RecognitionMessage, RecognitionResult, Recognizer,
    SessionId, SpeechBackend,
};
pub use transcript::TranscriptCapture;

/// Listening deadline. Armed when listening starts, disarmed when it stops;
/// re-arming replaces the previous deadline.
#[derive(Debug)]
pub struct AutoStop {
    limit: Duration,
    deadline: Option<Instant>,
}

impl AutoStop {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.limit);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Follows a listening-state transition.
    pub fn sync(&mut self, listening: bool) {
        match (listening, self.is_armed()) {
            (true, false) => self.arm(),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// Resolves at the deadline; never resolves while disarmed.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// Listens until the recognizer ends, `cancel` resolves or the limit hits.
pub async fn listen<F>(
    capture: &mut TranscriptCapture,
    events: &mut mpsc::UnboundedReceiver<RecognitionMessage>,
    limit: Duration,
    cancel: F,
) where
    F: Future<Output = ()>,
{
    let mut auto_stop = AutoStop::new(limit);
    capture.start();
    auto_stop.sync(capture.is_listening());
    tokio::pin!(cancel);

    while capture.is_listening() {
        tokio::select! {
            Some(msg) = events.recv() => capture.handle_event(msg.session, msg.event),
            _ = auto_stop.expired() => {
                tracing::info!(limit_secs = limit.as_secs(), "Listening limit reached");
                capture.stop();
            }
            _ = &mut cancel => capture.stop(),
        }
        auto_stop.sync(capture.is_listening());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::transcript::tests::{available, segment};

    #[tokio::test(start_paused = true)]
    async fn stops_itself_after_the_limit() {
        let (mut capture, _) = available();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();

        listen(
            &mut capture,
            &mut rx,
            Duration::from_secs(30),
            std::future::pending(),
        )
        .await;

        assert!(!capture.is_listening());
        assert!(started.elapsed() >= Duration::from_secs(30));

        tx.send(RecognitionMessage {
            session: capture.session(),
            event: RecognitionEvent::Result {
                result_index: 0,
                results: vec![segment("too late", true)],
            },
        })
        .unwrap();
        while let Ok(msg) = rx.try_recv() {
            capture.handle_event(msg.session, msg.event);
        }
        assert_eq!(capture.transcript(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn manual_stop_beats_the_timer() {
        let (mut capture, _) = available();
        let (tx, mut rx) = mpsc::unbounded_channel();

        tx.send(RecognitionMessage {
            session: 1,
            event: RecognitionEvent::Result {
                result_index: 0,
                results: vec![segment("slept well", true)],
            },
        })
        .unwrap();

        let started = Instant::now();
        listen(
            &mut capture,
            &mut rx,
            Duration::from_secs(30),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(capture.transcript(), "slept well ");
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_deadline() {
        let mut auto_stop = AutoStop::new(Duration::from_secs(30));
        auto_stop.sync(true);
        tokio::time::advance(Duration::from_secs(20)).await;
        auto_stop.sync(false);
        assert!(!auto_stop.is_armed());
        auto_stop.sync(true);

        let fired = tokio::time::timeout(Duration::from_secs(29), auto_stop.expired()).await;
        assert!(fired.is_err());
        let fired = tokio::time::timeout(Duration::from_secs(2), auto_stop.expired()).await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn unsupported_capture_returns_immediately() {
        let mut capture = TranscriptCapture::new(Recognizer::Unavailable);
        let (_tx, mut rx) = mpsc::unbounded_channel();
        listen(
            &mut capture,
            &mut rx,
            Duration::from_secs(30),
            std::future::pending(),
        )
        .await;
        assert!(!capture.is_listening());
    }
}
