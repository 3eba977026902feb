use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::sync::mpsc;

use crate::capture::{
    listen, ProcessRecognizer, RecognitionMessage, Recognizer, TranscriptCapture,
};
use crate::cli::commands::play;
use crate::cli::{display, prompt, CliApp};
use crate::state::Config;

pub async fn run(
    app: &mut CliApp,
    config: &Config,
    text: Option<String>,
    dictate: bool,
    include_music: bool,
    play_after: bool,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None if dictate => match dictate_entry(config).await? {
            Some(text) => text,
            None => prompt::read_entry("How are you feeling? ")?,
        },
        None => prompt::read_entry("How are you feeling? ")?,
    };

    let analysis = app.analyze(&text, include_music).await?;
    display::print_analysis(&analysis);

    match app.journal().latest() {
        Some(entry) if entry.saved => println!("\nSaved to your history."),
        _ => println!("\nNot saved. Log in to keep a history."),
    }

    if play_after {
        match analysis.playlist {
            Some(playlist) if !playlist.is_empty() => play::run_player(playlist, config).await?,
            _ => println!("No tracks to play."),
        }
    }
    Ok(())
}

fn recognizer(config: &Config, tx: mpsc::UnboundedSender<RecognitionMessage>) -> Recognizer {
    match config
        .speech_command
        .as_deref()
        .and_then(|command| ProcessRecognizer::new(command, tx))
    {
        Some(backend) => Recognizer::Available(Box::new(backend)),
        None => Recognizer::Unavailable,
    }
}

/// `None` when dictation is unavailable on this machine.
async fn dictate_entry(config: &Config) -> Result<Option<String>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut capture = TranscriptCapture::new(recognizer(config, tx));
    if !capture.is_supported() {
        println!("Dictation is not available (set speech_command in config.toml). Type instead.");
        return Ok(None);
    }

    let limit = config.listen_limit();
    println!("Listening for up to {}s. Press Enter to stop.", limit.as_secs());

    let stop = Arc::new(AtomicBool::new(false));
    let keys = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || wait_for_enter(&stop)
    });

    enable_raw_mode()?;
    listen(&mut capture, &mut rx, limit, async {
        let _ = keys.await;
    })
    .await;
    stop.store(true, Ordering::SeqCst);
    disable_raw_mode()?;

    if let Some(error) = capture.error() {
        println!("Recognition error: {}", error);
    }
    let transcript = capture.transcript().trim().to_string();
    if transcript.is_empty() {
        bail!("Nothing was recognised");
    }
    println!("Heard: {}", transcript);
    Ok(Some(transcript))
}

fn wait_for_enter(stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {
                if let Ok(Event::Key(KeyEvent {
                    code: KeyCode::Enter | KeyCode::Esc,
                    kind: KeyEventKind::Press,
                    ..
                })) = event::read()
                {
                    return;
                }
            }
            Ok(false) => {}
            Err(_) => return,
        }
    }
}
