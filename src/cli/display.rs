use crossterm::style::{Color, Stylize};

use crate::api::{MoodAnalysis, MoodEntry, Playlist, Track};

pub fn format_time(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let mins = (secs / 60.0) as u64;
    let secs = (secs % 60.0) as u64;
    format!("{}:{:02}", mins, secs)
}

pub fn progress(position_secs: f64, duration_secs: f64) -> f64 {
    if duration_secs > 0.0 {
        (position_secs / duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn progress_bar(position_secs: f64, duration_secs: f64, width: usize) -> String {
    let filled = (progress(position_secs, duration_secs) * width as f64).round() as usize;
    format!("{}{}", "━".repeat(filled), "─".repeat(width - filled.min(width)))
}

/// `#RRGGBB` (or `RRGGBB`) to an RGB colour.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn swatches(palette: &[String]) -> String {
    palette
        .iter()
        .map(|hex| match parse_hex(hex) {
            Some(color) => format!("{} {}", "    ".on(color), hex),
            None => hex.clone(),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn print_analysis(analysis: &MoodAnalysis) {
    println!(
        "\nMood: {} ({:.0}% confidence), {} energy",
        analysis.sentiment,
        analysis.sentiment_confidence * 100.0,
        analysis.energy_level
    );
    if let Some((emotion, score)) = analysis.dominant_emotion() {
        println!("  Dominant emotion: {} ({:.0}%)", emotion, score * 100.0);
    }
    if !analysis.keywords.is_empty() {
        println!("  Keywords: {}", analysis.keywords.join(", "));
    }
    if !analysis.color_palette.is_empty() {
        println!("  Palette:  {}", swatches(&analysis.color_palette));
    }
    println!("  Art style: {}  Music mood: {}", analysis.art_style, analysis.music_mood);
    if !analysis.ai_insight.is_empty() {
        println!("\n  {}", analysis.ai_insight);
    }
    if let Some(playlist) = &analysis.playlist {
        print_playlist(playlist);
    }
}

pub fn print_playlist(playlist: &Playlist) {
    println!("\n♪ {} ({} tracks)", playlist.name, playlist.len());
    if !playlist.tags.is_empty() {
        println!("  Tags: {}", playlist.tags.join(", "));
    }
    if let Some(error) = &playlist.error {
        println!("  Note: {}", error);
    }
    for (i, track) in playlist.tracks.iter().enumerate() {
        println!("  {}", track_line(i, track, false, false));
    }
}

pub fn track_line(index: usize, track: &Track, current: bool, liked: bool) -> String {
    format!(
        "{} {:>2}. [{}] {} - {}{}",
        if current { "▶" } else { " " },
        index + 1,
        format_time(track.duration),
        track.name,
        track.artist,
        if liked { " ♥" } else { "" }
    )
}

pub fn print_entries(entries: &[MoodEntry]) {
    if entries.is_empty() {
        println!("No saved entries yet.");
        return;
    }
    for entry in entries {
        println!(
            "#{:<5} {}  {:<8} {:<5} {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.sentiment.as_deref().unwrap_or("-"),
            entry.energy_level.as_deref().unwrap_or("-"),
            truncate(&entry.text_content, 48)
        );
    }
}
