use crate::capture::recognizer::{RecognitionEvent, Recognizer, SessionId};

/// Accumulates the final segments of a dictation.
pub struct TranscriptCapture {
    recognizer: Recognizer,
    is_supported: bool,
    is_listening: bool,
    session: SessionId,
    transcript: String,
    interim: String,
    error: Option<String>,
}

impl TranscriptCapture {
    pub fn new(recognizer: Recognizer) -> Self {
        let is_supported = recognizer.is_supported();
        Self {
            recognizer,
            is_supported,
            is_listening: false,
            session: 0,
            transcript: String::new(),
            interim: String::new(),
            error: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.is_supported
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Text still being revised by the recognizer. Replaced, not appended.
    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn start(&mut self) {
        if !self.is_supported || self.is_listening {
            return;
        }
        let Recognizer::Available(backend) = &mut self.recognizer else {
            return;
        };

        self.session += 1;
        match backend.start(self.session) {
            Ok(()) => {
                self.is_listening = true;
                self.error = None;
                tracing::debug!(session = self.session, "Listening");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech recognition did not start");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn stop(&mut self) {
        if !self.is_listening {
            return;
        }
        if let Recognizer::Available(backend) = &mut self.recognizer {
            backend.stop();
        }
        self.is_listening = false;
        self.interim.clear();
        tracing::debug!(session = self.session, "Stopped listening");
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.interim.clear();
    }

    /// Applies a recognizer event. Anything from an older session, or
    /// arriving after a stop, is ignored.
    pub fn handle_event(&mut self, session: SessionId, event: RecognitionEvent) {
        if !self.is_listening || session != self.session {
            tracing::trace!(session, current = self.session, "Dropping stale recognition event");
            return;
        }

        match event {
            RecognitionEvent::Result {
                result_index,
                results,
            } => {
                let mut interim = String::new();
                for result in results.iter().skip(result_index) {
                    if result.is_final {
                        self.transcript.push_str(&result.transcript);
                        self.transcript.push(' ');
                    } else {
                        interim.push_str(&result.transcript);
                    }
                }
                self.interim = interim;
            }
            RecognitionEvent::Error { message } => {
                tracing::warn!(%message, "Speech recognition error");
                self.error = Some(message);
                self.is_listening = false;
                self.interim.clear();
            }
            RecognitionEvent::End => {
                self.is_listening = false;
                self.interim.clear();
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::capture::recognizer::{RecognitionResult, SpeechBackend};
    use crate::error::CaptureError;

    #[derive(Default, Clone)]
    pub(crate) struct ScriptedBackend {
        pub(crate) log: Arc<Mutex<Vec<String>>>,
        pub(crate) fail_start: bool,
    }

    impl SpeechBackend for ScriptedBackend {
        fn start(&mut self, session: SessionId) -> Result<(), CaptureError> {
            if self.fail_start {
                return Err(CaptureError::Start("not-allowed".into()));
            }
            self.log.lock().unwrap().push(format!("start {}", session));
            Ok(())
        }

        fn stop(&mut self) {
            self.log.lock().unwrap().push("stop".into());
        }
    }

    pub(crate) fn available() -> (TranscriptCapture, Arc<Mutex<Vec<String>>>) {
        let backend = ScriptedBackend::default();
        let log = Arc::clone(&backend.log);
        (
            TranscriptCapture::new(Recognizer::Available(Box::new(backend))),
            log,
        )
    }

    pub(crate) fn segment(text: &str, is_final: bool) -> RecognitionResult {
        RecognitionResult {
            transcript: text.into(),
            is_final,
        }
    }

    #[test]
    fn only_final_segments_accumulate() {
        let (mut capture, _) = available();
        capture.start();

        capture.handle_event(
            capture.session(),
            RecognitionEvent::Result {
                result_index: 0,
                results: vec![
                    segment("hello", true),
                    segment("world", true),
                    segment("wor", false),
                ],
            },
        );

        assert_eq!(capture.transcript(), "hello world ");
        assert_eq!(capture.interim(), "wor");
    }

    #[test]
    fn earlier_results_are_not_appended_twice() {
        let (mut capture, _) = available();
        capture.start();
        let session = capture.session();

        capture.handle_event(
            session,
            RecognitionEvent::Result {
                result_index: 0,
                results: vec![segment("dear", true), segment("dia", false)],
            },
        );
        capture.handle_event(
            session,
            RecognitionEvent::Result {
                result_index: 1,
                results: vec![segment("dear", true), segment("diary", true)],
            },
        );

        assert_eq!(capture.transcript(), "dear diary ");
        assert_eq!(capture.interim(), "");
    }

    #[test]
    fn unsupported_start_is_a_silent_noop() {
        let mut capture = TranscriptCapture::new(Recognizer::Unavailable);
        capture.start();
        assert!(!capture.is_supported());
        assert!(!capture.is_listening());
        assert!(capture.error().is_none());
    }

    #[test]
    fn start_is_idempotent_and_clears_error() {
        let (mut capture, log) = available();
        capture.start();
        capture.handle_event(
            capture.session(),
            RecognitionEvent::Error {
                message: "network".into(),
            },
        );
        assert_eq!(capture.error(), Some("network"));
        assert!(!capture.is_listening());

        capture.start();
        capture.start();
        assert!(capture.is_listening());
        assert!(capture.error().is_none());
        assert_eq!(*log.lock().unwrap(), ["start 1", "start 2"]);
    }

    #[test]
    fn failed_start_reports_error() {
        let backend = ScriptedBackend {
            fail_start: true,
            ..Default::default()
        };
        let mut capture = TranscriptCapture::new(Recognizer::Available(Box::new(backend)));
        capture.start();
        assert!(!capture.is_listening());
        assert!(capture.error().unwrap().contains("not-allowed"));
    }

    #[test]
    fn natural_end_stops_without_error() {
        let (mut capture, _) = available();
        capture.start();
        capture.handle_event(capture.session(), RecognitionEvent::End);
        assert!(!capture.is_listening());
        assert!(capture.error().is_none());
    }

    #[test]
    fn events_after_stop_or_from_old_sessions_are_ignored() {
        let (mut capture, log) = available();
        capture.start();
        let first = capture.session();
        capture.stop();
        capture.stop();

        let late = RecognitionEvent::Result {
            result_index: 0,
            results: vec![segment("late", true)],
        };
        capture.handle_event(first, late.clone());
        assert_eq!(capture.transcript(), "");

        capture.start();
        capture.handle_event(first, late);
        assert_eq!(capture.transcript(), "");
        assert_eq!(*log.lock().unwrap(), ["start 1", "stop", "start 2"]);
    }

    #[test]
    fn reset_keeps_listening() {
        let (mut capture, _) = available();
        capture.start();
        capture.handle_event(
            capture.session(),
            RecognitionEvent::Result {
                result_index: 0,
                results: vec![segment("scratch that", true)],
            },
        );
        capture.reset();
        assert_eq!(capture.transcript(), "");
        assert!(capture.is_listening());
    }
}
