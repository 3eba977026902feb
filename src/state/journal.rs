use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::api::MoodAnalysis;

pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub analysis: MoodAnalysis,
    /// Whether the server stored this entry in the user's history.
    pub saved: bool,
}

impl JournalEntry {
    pub fn new(text: String, analysis: MoodAnalysis, saved: bool) -> Self {
        JournalEntry {
            timestamp: Utc::now(),
            text,
            analysis,
            saved,
        }
    }
}

/// Entries analysed during this run, newest first. Never written to disk.
#[derive(Debug)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Journal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(sentiment: &str) -> MoodAnalysis {
        MoodAnalysis {
            sentiment: sentiment.into(),
            sentiment_confidence: 0.9,
            energy_level: "low".into(),
            emotions: Default::default(),
            keywords: vec![],
            color_palette: vec![],
            art_style: "minimal".into(),
            music_mood: "calm".into(),
            ai_insight: String::new(),
            playlist: None,
        }
    }

    #[test]
    fn newest_first_and_bounded() {
        let mut journal = Journal::with_capacity(2);
        journal.push(JournalEntry::new("one".into(), analysis("neutral"), false));
        journal.push(JournalEntry::new("two".into(), analysis("positive"), false));
        journal.push(JournalEntry::new("three".into(), analysis("negative"), true));

        let texts: Vec<_> = journal.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["three", "two"]);
        assert!(journal.latest().unwrap().saved);

        journal.clear();
        assert!(journal.is_empty());
    }
}
