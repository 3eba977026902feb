use std::process::Stdio;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Numbered recognition run. A new id is opened on every start.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

/// Events a recognizer delivers.
///
/// `Result` carries the whole result list of the run; `result_index` is the
/// first entry that changed since the previous event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Result {
        #[serde(default)]
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    Error {
        message: String,
    },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionMessage {
    pub session: SessionId,
    pub event: RecognitionEvent,
}

pub trait SpeechBackend: Send {
    /// Begins continuous recognition with interim results for `session`.
    fn start(&mut self, session: SessionId) -> Result<(), CaptureError>;

    fn stop(&mut self);
}

/// The platform capability, decided once at start-up.
pub enum Recognizer {
    Available(Box<dyn SpeechBackend>),
    Unavailable,
}

impl Recognizer {
    pub fn is_supported(&self) -> bool {
        matches!(self, Recognizer::Available(_))
    }
}

/// Runs an external recognizer that prints one JSON [`RecognitionEvent`]
/// per stdout line, e.g.
/// `{"type":"result","result_index":0,"results":[{"transcript":"hi","final":true}]}`.
pub struct ProcessRecognizer {
    program: String,
    args: Vec<String>,
    events: mpsc::UnboundedSender<RecognitionMessage>,
    child: Option<Child>,
}

impl ProcessRecognizer {
    /// `None` when the command line is empty.
    pub fn new(
        command: &[String],
        events: mpsc::UnboundedSender<RecognitionMessage>,
    ) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            events,
            child: None,
        })
    }
}

impl SpeechBackend for ProcessRecognizer {
    fn start(&mut self, session: SessionId) -> Result<(), CaptureError> {
        self.stop();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::Start(format!("{}: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Start("recognizer stdout unavailable".into()))?;

        let tx = self.events.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let end = loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match serde_json::from_str::<RecognitionEvent>(&line) {
                        Ok(event) => {
                            if tx.send(RecognitionMessage { session, event }).is_err() {
                                return;
                            }
                        }
                        Err(e) => tracing::debug!(error = %e, %line, "Skipping recognizer line"),
                    },
                    Ok(None) => break RecognitionEvent::End,
                    Err(e) => {
                        break RecognitionEvent::Error {
                            message: e.to_string(),
                        }
                    }
                }
            };
            let _ = tx.send(RecognitionMessage {
                session,
                event: end,
            });
        });

        tracing::info!(program = %self.program, session, "Speech recognizer started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Recognizer already gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognizer_lines() {
        let event: RecognitionEvent = serde_json::from_str(
            r#"{"type":"result","result_index":1,"results":[{"transcript":"hello","final":true},{"transcript":"wor"}]}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            RecognitionEvent::Result {
                result_index: 1,
                results: vec![
                    RecognitionResult {
                        transcript: "hello".into(),
                        is_final: true
                    },
                    RecognitionResult {
                        transcript: "wor".into(),
                        is_final: false
                    },
                ],
            }
        );

        let event: RecognitionEvent =
            serde_json::from_str(r#"{"type":"error","message":"no-speech"}"#).unwrap();
        assert!(matches!(event, RecognitionEvent::Error { .. }));

        let event: RecognitionEvent = serde_json::from_str(r#"{"type":"end"}"#).unwrap();
        assert_eq!(event, RecognitionEvent::End);
    }

    #[test]
    fn empty_command_is_not_a_recognizer() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(ProcessRecognizer::new(&[], tx).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_output_is_forwarded_with_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = r#"echo '{"type":"result","results":[{"transcript":"good morning","final":true}]}'"#;
        let command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
        let mut recognizer = ProcessRecognizer::new(&command, tx).unwrap();

        recognizer.start(4).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.session, 4);
        assert!(matches!(first.event, RecognitionEvent::Result { .. }));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event, RecognitionEvent::End);
    }
}
