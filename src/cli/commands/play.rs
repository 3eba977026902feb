use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};

use crate::api::Playlist;
use crate::cli::{display, CliApp};
use crate::playback::{MediaOutput, PlaylistController};
use crate::state::Config;

const BAR_WIDTH: usize = 24;

pub async fn saved(app: &mut CliApp, config: &Config, entry_id: i64) -> Result<()> {
    let playlist = app.saved_playlist(entry_id).await?;
    if playlist.is_empty() {
        bail!("Entry #{} has no tracks", entry_id);
    }
    display::print_playlist(&playlist);
    run_player(playlist, config).await
}

#[cfg(not(unix))]
pub async fn run_player(_playlist: Playlist, _config: &Config) -> Result<()> {
    bail!("The player needs mpv's IPC socket, which is only supported on Unix")
}

#[cfg(unix)]
pub async fn run_player(playlist: Playlist, config: &Config) -> Result<()> {
    use crate::playback::{MpvOutput, PlaybackEngine};

    let runtime_dir = config.data_dir.join("run");
    let (output, mut events) = MpvOutput::spawn(&config.mpv_path, &runtime_dir).await?;
    let mut controller = PlaylistController::new(PlaybackEngine::new(output));

    println!("\nPlaying: {} ({} tracks)", playlist.name, playlist.len());
    controller.set_playlist(Some(playlist)).await;
    controller.engine_mut().toggle_play_pause().await;

    println!(
        "Controls: [space] pause  [n] next  [p] prev  [←/→] seek  [+/-] volume  [m] mute\r\n          [l] like  [t] tracks  [1-9,0] pick  [q] quit\r\n"
    );

    enable_raw_mode()?;
    let result = player_loop(&mut controller, &mut events, config).await;
    disable_raw_mode()?;
    println!();

    if let Err(e) = controller.into_engine().into_output().quit().await {
        tracing::warn!(error = %e, "mpv did not shut down cleanly");
    }
    result
}

#[cfg(unix)]
async fn player_loop<O: MediaOutput>(
    controller: &mut PlaylistController<O>,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<crate::playback::SourceEvent>,
    config: &Config,
) -> Result<()> {
    loop {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                if !handle_key(controller, code, modifiers, config).await? {
                    return Ok(());
                }
            }
        }

        while let Ok(event) = events.try_recv() {
            controller.handle_event(event).await;
        }

        if let Some(warning) = controller.engine_mut().take_warning() {
            print_above(&format!("! {}", warning))?;
        }
        render_status(controller)?;
    }
}

/// Returns `false` when the player should exit.
async fn handle_key<O: MediaOutput>(
    controller: &mut PlaylistController<O>,
    code: KeyCode,
    modifiers: KeyModifiers,
    config: &Config,
) -> Result<bool> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(false),
        KeyCode::Char(' ') => controller.engine_mut().toggle_play_pause().await,
        KeyCode::Char('n') => controller.next().await,
        KeyCode::Char('p') => controller.previous().await,
        KeyCode::Right | KeyCode::Left => {
            let engine = controller.engine_mut();
            let step = if code == KeyCode::Right {
                config.seek_step_secs
            } else {
                -config.seek_step_secs
            };
            let target = engine.current_time() + step;
            engine.seek(target).await;
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
            let engine = controller.engine_mut();
            let level = engine.volume() + config.volume_step;
            engine.set_volume(level).await;
        }
        KeyCode::Char('-') | KeyCode::Down => {
            let engine = controller.engine_mut();
            let level = engine.volume() - config.volume_step;
            engine.set_volume(level).await;
        }
        KeyCode::Char('m') => controller.engine_mut().toggle_mute().await,
        KeyCode::Char('l') => {
            if let Some(id) = controller.current_track().map(|t| t.id.clone()) {
                let liked = controller.toggle_like(&id);
                print_above(if liked { "♥ Liked" } else { "♡ Unliked" })?;
            }
        }
        KeyCode::Char('t') => {
            if controller.toggle_panel() {
                print_track_list(controller)?;
            }
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(index) = digit_index(c) {
                if let Err(e) = controller.select_track(index).await {
                    print_above(&e.to_string())?;
                }
            }
        }
        _ => {}
    }
    Ok(true)
}

/// `1`..`9` pick tracks 1 to 9, `0` picks the tenth.
fn digit_index(key: char) -> Option<usize> {
    match key.to_digit(10)? {
        0 => Some(9),
        d => Some(d as usize - 1),
    }
}

fn print_above(line: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    write!(stdout, "{}\r\n", line)?;
    stdout.flush()?;
    Ok(())
}

fn print_track_list<O: MediaOutput>(controller: &PlaylistController<O>) -> Result<()> {
    for (i, track) in controller.tracks().iter().enumerate() {
        let line = display::track_line(
            i,
            track,
            i == controller.current_index(),
            controller.is_liked(&track.id),
        );
        print_above(&line)?;
    }
    Ok(())
}

fn render_status<O: MediaOutput>(controller: &PlaylistController<O>) -> Result<()> {
    let engine = controller.engine();
    let title = controller
        .current_track()
        .map(|t| format!("{} - {}", t.name, t.artist))
        .unwrap_or_default();
    let volume = if engine.is_muted() {
        "muted".to_string()
    } else {
        format!("{:.0}%", engine.volume() * 100.0)
    };

    let mut stdout = io::stdout();
    execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    write!(
        stdout,
        "{} {}  {} {} / {}  vol {}",
        if engine.is_playing() { "▶" } else { "⏸" },
        title,
        display::progress_bar(engine.current_time(), engine.duration(), BAR_WIDTH),
        display::format_time(engine.current_time()),
        display::format_time(engine.duration()),
        volume
    )?;
    stdout.flush()?;
    Ok(())
}
