//! `mpv` driven over its JSON IPC socket.
//!
//! A background task reads the socket and turns property changes and
//! `end-file` notifications into [`SourceEvent`]s. Lines are tagged with
//! the source mpv is actually playing: a new load only takes over once mpv
//! reports `start-file` for it, so late lines from the previous file keep
//! the previous id.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::error::PlaybackError;
use crate::playback::events::{MediaEvent, SourceEvent, SourceId};
use crate::playback::output::MediaOutput;

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_DELAY: Duration = Duration::from_millis(100);

const OBSERVED: [(u64, &str); 2] = [(1, "time-pos"), (2, "duration")];

pub struct MpvOutput {
    child: Child,
    writer: OwnedWriteHalf,
    tags: Arc<Mutex<SourceTags>>,
    socket_path: PathBuf,
}

/// Source ownership of IPC lines. `loadfile` queues an id; each
/// `start-file` hands over to the oldest queued one.
#[derive(Debug, Default)]
struct SourceTags {
    current: u64,
    pending: VecDeque<u64>,
}

impl SourceTags {
    fn queue(&mut self, source: SourceId) {
        self.pending.push_back(source.0);
    }

    fn reset(&mut self) {
        self.current = 0;
        self.pending.clear();
    }

    /// Tags one line, switching sources on `start-file`.
    fn tag(&mut self, line: IpcLine) -> Option<SourceEvent> {
        match line {
            IpcLine::StartFile => {
                if let Some(next) = self.pending.pop_front() {
                    self.current = next;
                }
                None
            }
            IpcLine::Media(event) => Some(SourceEvent::new(SourceId(self.current), event)),
        }
    }
}

#[derive(Debug, PartialEq)]
enum IpcLine {
    StartFile,
    Media(MediaEvent),
}

/// One line of mpv's IPC output.
#[derive(Debug, Deserialize)]
struct IpcMessage {
    event: Option<String>,
    name: Option<String>,
    data: Option<Value>,
    reason: Option<String>,
    error: Option<String>,
}

impl MpvOutput {
    /// Starts an idle `mpv` and returns the output plus its event stream.
    pub async fn spawn(
        mpv_path: &str,
        runtime_dir: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SourceEvent>), PlaybackError> {
        std::fs::create_dir_all(runtime_dir)?;
        let socket_path = runtime_dir.join(format!("mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let child = Command::new(mpv_path)
            .arg("--idle=yes")
            .arg("--no-video")
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::Output(format!("failed to start {}: {}", mpv_path, e)))?;

        let stream = connect(&socket_path).await?;
        let (reader, writer) = stream.into_split();

        let tags = Arc::new(Mutex::new(SourceTags::default()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let reader_tags = Arc::clone(&tags);
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(parsed) = parse_line(&line) else {
                            continue;
                        };
                        let tagged = reader_tags
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .tag(parsed);
                        if let Some(event) = tagged {
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("mpv IPC socket closed");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "mpv IPC read failed");
                        break;
                    }
                }
            }
        });

        let mut output = Self {
            child,
            writer,
            tags,
            socket_path,
        };

        for (id, property) in OBSERVED {
            output
                .command(json!(["observe_property", id, property]))
                .await?;
        }

        tracing::info!(socket = ?output.socket_path, "mpv output ready");
        Ok((output, event_rx))
    }

    async fn command(&mut self, args: Value) -> Result<(), PlaybackError> {
        let mut line = json!({ "command": args }).to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    fn tags(&self) -> std::sync::MutexGuard<'_, SourceTags> {
        self.tags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn quit(mut self) -> Result<(), PlaybackError> {
        let _ = self.command(json!(["quit"])).await;
        let _ = self.child.wait().await;
        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

async fn connect(path: &Path) -> Result<UnixStream, PlaybackError> {
    let mut last_error = None;
    for _ in 0..CONNECT_ATTEMPTS {
        match UnixStream::connect(path).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                last_error = Some(e);
                tokio::time::sleep(CONNECT_DELAY).await;
            }
        }
    }
    Err(PlaybackError::Output(format!(
        "mpv IPC socket {:?} never became available: {}",
        path,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Maps an IPC line to a media event or a file start. Command replies and
/// unrelated events yield `None`.
fn parse_line(line: &str) -> Option<IpcLine> {
    let msg: IpcMessage = serde_json::from_str(line).ok()?;

    if let Some(error) = msg.error.as_deref() {
        if error != "success" {
            tracing::debug!(error, "mpv command failed");
        }
        return None;
    }

    let event = match msg.event.as_deref()? {
        "start-file" => return Some(IpcLine::StartFile),
        "property-change" => {
            let value = msg.data.as_ref().and_then(Value::as_f64)?;
            match msg.name.as_deref()? {
                "time-pos" => MediaEvent::TimeUpdate(value),
                "duration" => MediaEvent::MetadataLoaded { duration: value },
                _ => return None,
            }
        }
        "end-file" => match msg.reason.as_deref() {
            Some("eof") => MediaEvent::Ended,
            Some("error") => MediaEvent::Error("mpv could not play the track".into()),
            _ => return None,
        },
        _ => return None,
    };
    Some(IpcLine::Media(event))
}

#[async_trait]
impl MediaOutput for MpvOutput {
    async fn set_source(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError> {
        // Keep the new file paused until the engine decides to play.
        self.command(json!(["set_property", "pause", true])).await?;
        self.tags().queue(source);
        self.command(json!(["loadfile", url, "replace"])).await
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        if let Some(status) = self.child.try_wait()? {
            return Err(PlaybackError::Rejected(format!("mpv exited ({})", status)));
        }
        self.command(json!(["set_property", "pause", false])).await
    }

    async fn pause(&mut self) -> Result<(), PlaybackError> {
        self.command(json!(["set_property", "pause", true])).await
    }

    async fn seek(&mut self, position_secs: f64) -> Result<(), PlaybackError> {
        self.command(json!(["seek", position_secs, "absolute"])).await
    }

    async fn set_volume(&mut self, level: f64) -> Result<(), PlaybackError> {
        let percent = (level.clamp(0.0, 1.0) * 100.0).round();
        self.command(json!(["set_property", "volume", percent])).await
    }

    async fn stop(&mut self) -> Result<(), PlaybackError> {
        self.tags().reset();
        self.command(json!(["stop"])).await
    }
}
