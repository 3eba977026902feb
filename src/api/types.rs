use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Seconds. The music provider sometimes omits it.
    #[serde(default, deserialize_with = "non_negative_seconds")]
    pub duration: f64,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "jamendo_url")]
    pub attribution_url: String,
    #[serde(default)]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "playlist_name")]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(rename = "mood_tags", default)]
    pub tags: Vec<String>,
    /// Informational only, never checked against `tracks.len()`.
    #[serde(default)]
    pub total_tracks: usize,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub energy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Playlist {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub sentiment: String,
    #[serde(default)]
    pub sentiment_confidence: f64,
    pub energy_level: String,
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub color_palette: Vec<String>,
    #[serde(default)]
    pub art_style: String,
    #[serde(default)]
    pub music_mood: String,
    #[serde(default)]
    pub ai_insight: String,
    #[serde(default)]
    pub playlist: Option<Playlist>,
}

impl MoodAnalysis {
    /// Emotion with the highest score, if any were reported.
    pub fn dominant_emotion(&self) -> Option<(&str, f64)> {
        self.emotions
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(label, score)| (label.as_str(), *score))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_music: Option<bool>,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>, include_music: bool) -> Self {
        Self {
            text: text.into(),
            include_music: include_music.then_some(true),
        }
    }
}

/// A journal entry persisted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub text_content: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub sentiment_confidence: Option<f64>,
    #[serde(default)]
    pub energy_level: Option<String>,
    #[serde(default)]
    pub emotions: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub color_palette: Option<Vec<String>>,
    #[serde(default)]
    pub art_style: Option<String>,
    #[serde(default)]
    pub music_mood: Option<String>,
    #[serde(default)]
    pub ai_insight: Option<String>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklySummary {
    pub summary: String,
    #[serde(default)]
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

fn non_negative_seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if secs.is_finite() { secs.max(0.0) } else { 0.0 })
}

/// Accepts RFC 3339 or the naive ISO-8601 the backend emits (taken as UTC).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
