use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How urgent a crisis flow is, as grouped in the crisis center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisCategory {
    Immediate,
    Struggling,
    Processing,
}

/// A crisis flow the user just worked through.
///
/// This is what callers hand to
/// [`Store::add_crisis_completion`](crate::state::Store::add_crisis_completion);
/// the store stamps the completion time itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrisisFlow {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub category: CrisisCategory,
}

/// A completed crisis flow in the history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisRecord {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub category: CrisisCategory,
    /// Absent only in records written before completion stamping existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrisisRecord {
    pub(crate) fn completed(flow: CrisisFlow, at: DateTime<Utc>) -> Self {
        Self {
            id: flow.id,
            title: flow.title,
            icon: flow.icon,
            category: flow.category,
            completed_at: Some(at),
        }
    }
}

/// One finished mini-game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game: String,
    pub played_at: DateTime<Utc>,
    /// Seconds spent in the game
    pub duration: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Sad,
    Anxious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Great, Mood::Good, Mood::Okay, Mood::Sad, Mood::Anxious];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown mood: {s}")))
    }
}

/// Journal input before the store assigns an id and date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalDraft {
    pub mood: Mood,
    pub entry: String,
    pub gratitude: Option<String>,
}

impl JournalDraft {
    pub fn new(mood: Mood, entry: impl Into<String>) -> Self {
        Self {
            mood,
            entry: entry.into(),
            gratitude: None,
        }
    }

    pub fn with_gratitude(mut self, gratitude: impl Into<String>) -> Self {
        self.gratitude = Some(gratitude.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub mood: Mood,
    pub entry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gratitude: Option<String>,
}

impl JournalEntry {
    /// Build an entry from a draft, trimming text.
    ///
    /// Whitespace-only gratitude is dropped; whitespace-only entry text is
    /// rejected.
    pub(crate) fn from_draft(
        draft: JournalDraft,
        id: String,
        date: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let entry = draft.entry.trim();
        if entry.is_empty() {
            return Err(StoreError::EmptyJournalEntry);
        }

        let gratitude = draft
            .gratitude
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Ok(Self {
            id,
            date,
            mood: draft.mood,
            entry: entry.to_string(),
            gratitude,
        })
    }
}
