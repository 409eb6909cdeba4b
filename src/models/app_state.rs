use crate::error::StoreError;
use crate::models::contacts::{LegacyContact, TrustedContact};
use crate::models::lenient;
use crate::models::records::{CrisisRecord, GameSession, JournalEntry};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Screen id the app starts on.
pub const SPLASH_SCREEN_ID: &str = "splash";

/// Screen id shown once the splash finishes.
pub const HOME_SCREEN_ID: &str = "home";

/// Window title used while stealth mode disguises the app.
pub const STEALTH_TITLE: &str = "Notes";

pub const APP_TITLE: &str = "Crisis Copilot - Mental Wellness Companion";

/// How many entries of each history the profile screen looks at.
const RECENT_PER_HISTORY: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    SoftPastel,
    Dark,
    Sunset,
    CalmGreen,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::SoftPastel, Theme::Dark, Theme::Sunset, Theme::CalmGreen];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::SoftPastel => "soft-pastel",
            Theme::Dark => "dark",
            Theme::Sunset => "sunset",
            Theme::CalmGreen => "calm-green",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown theme: {s}")))
    }
}

/// Single source of truth for all application state.
///
/// Owned by [`crate::state::Store`], which hands out immutable snapshots
/// (`Arc<AppState>`) and replaces the whole value on every mutation. Never
/// mutate a snapshot obtained from the store; go through the store's
/// operations instead.
///
/// The serialized form is the persisted blob: every field except
/// `show_splash`, with camelCase keys and RFC 3339 timestamps. Fields missing
/// from an older blob fall back to [`AppState::default`]; unreadable values
/// fall back field by field and unreadable list elements are skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    // Settings
    #[serde(deserialize_with = "lenient::theme")]
    pub theme: Theme,
    #[serde(deserialize_with = "lenient::flag_on")]
    pub show_fireflies: bool,
    #[serde(deserialize_with = "lenient::flag_off")]
    pub stealth_mode: bool,
    #[serde(deserialize_with = "lenient::flag_off")]
    pub disguise_notifications: bool,

    // Contacts
    #[serde(deserialize_with = "lenient::optional")]
    pub trusted_contact: Option<LegacyContact>,
    #[serde(deserialize_with = "lenient::list")]
    pub trusted_contacts: Vec<TrustedContact>,

    // Histories (append-only)
    #[serde(deserialize_with = "lenient::list")]
    pub crisis_history: Vec<CrisisRecord>,
    #[serde(deserialize_with = "lenient::list")]
    pub game_history: Vec<GameSession>,
    #[serde(deserialize_with = "lenient::list")]
    pub journal_entries: Vec<JournalEntry>,

    // Navigation
    #[serde(deserialize_with = "lenient::screen_id")]
    pub current_screen: String,
    #[serde(skip, default = "splash_on_start")]
    pub show_splash: bool,
}

fn splash_on_start() -> bool {
    true
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            theme: Theme::SoftPastel,
            show_fireflies: true,
            stealth_mode: false,
            disguise_notifications: false,

            trusted_contact: None,
            trusted_contacts: Vec::new(),

            crisis_history: Vec::new(),
            game_history: Vec::new(),
            journal_entries: Vec::new(),

            current_screen: SPLASH_SCREEN_ID.to_string(),
            show_splash: true,
        }
    }
}

/// Counters shown on the profile screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivitySummary {
    pub crisis_flows_completed: usize,
    /// Crisis completions plus game sessions in the last seven days
    pub this_week_activities: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Crisis,
    Game,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub title: String,
    pub time: Option<DateTime<Utc>>,
}

impl AppState {
    /// Contact the Quick-SOS flow calls when none is picked explicitly.
    ///
    /// The flagged default if any, otherwise the first contact.
    pub fn default_contact(&self) -> Option<&TrustedContact> {
        self.trusted_contacts
            .iter()
            .find(|c| c.is_default)
            .or_else(|| self.trusted_contacts.first())
    }

    pub fn window_title(&self) -> &'static str {
        Self::window_title_for(self.stealth_mode)
    }

    pub fn window_title_for(stealth_mode: bool) -> &'static str {
        if stealth_mode { STEALTH_TITLE } else { APP_TITLE }
    }

    pub fn activity_summary(&self, now: DateTime<Utc>) -> ActivitySummary {
        let week = Duration::days(7);
        let within_week = |at: DateTime<Utc>| now - at < week;

        let crises = self
            .crisis_history
            .iter()
            .filter(|c| c.completed_at.is_some_and(within_week))
            .count();
        let games = self
            .game_history
            .iter()
            .filter(|g| within_week(g.played_at))
            .count();

        ActivitySummary {
            crisis_flows_completed: self.crisis_history.len(),
            this_week_activities: crises + games,
        }
    }

    /// Latest crisis completions and game sessions, newest first.
    ///
    /// Looks at the last five entries of each history, then keeps `limit`.
    /// Crisis records without a completion time sort last.
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityItem> {
        let crises = tail(&self.crisis_history, RECENT_PER_HISTORY)
            .iter()
            .map(|c| ActivityItem {
                kind: ActivityKind::Crisis,
                title: format!("Completed: {}", c.title),
                time: c.completed_at,
            });
        let games = tail(&self.game_history, RECENT_PER_HISTORY)
            .iter()
            .map(|g| ActivityItem {
                kind: ActivityKind::Game,
                title: format!("Played: {}", g.game),
                time: Some(g.played_at),
            });

        let mut items: Vec<ActivityItem> = crises.chain(games).collect();
        // Option orders None first; reversing puts it last
        items.sort_by(|a, b| b.time.cmp(&a.time));
        items.truncate(limit);
        items
    }

    pub fn journal_newest_first(&self) -> Vec<&JournalEntry> {
        let mut entries: Vec<&JournalEntry> = self.journal_entries.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::{CrisisCategory, Mood};

    fn crisis(title: &str, completed_at: Option<DateTime<Utc>>) -> CrisisRecord {
        CrisisRecord {
            id: title.to_lowercase(),
            title: title.to_string(),
            icon: "heart".to_string(),
            category: CrisisCategory::Struggling,
            completed_at,
        }
    }

    fn game(name: &str, played_at: DateTime<Utc>) -> GameSession {
        GameSession {
            game: name.to_string(),
            played_at,
            duration: 60,
        }
    }

    #[test]
    fn test_default_state() {
        let state = AppState::default();

        assert_eq!(state.theme, Theme::SoftPastel);
        assert!(state.show_fireflies);
        assert!(!state.stealth_mode);
        assert!(!state.disguise_notifications);
        assert!(state.trusted_contact.is_none());
        assert!(state.trusted_contacts.is_empty());
        assert!(state.crisis_history.is_empty());
        assert!(state.game_history.is_empty());
        assert!(state.journal_entries.is_empty());
        assert_eq!(state.current_screen, "splash");
        assert!(state.show_splash);
    }

    #[test]
    fn test_theme_round_trips_through_str() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), theme);
        }
        assert!(matches!(
            "neon".parse::<Theme>(),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_show_splash_not_serialized() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert!(json.get("showSplash").is_none());
        assert_eq!(json["theme"], "soft-pastel");
        assert_eq!(json["currentScreen"], "splash");
    }

    #[test]
    fn test_default_contact_prefers_flag_then_first() {
        let mut state = AppState::default();
        assert!(state.default_contact().is_none());

        state.trusted_contacts = vec![
            TrustedContact::new("1", "A", "555"),
            TrustedContact::new("2", "B", "666"),
        ];
        assert_eq!(state.default_contact().unwrap().id, "1");

        state.trusted_contacts[1].is_default = true;
        assert_eq!(state.default_contact().unwrap().id, "2");
    }

    #[test]
    fn test_window_title_follows_stealth_mode() {
        let mut state = AppState::default();
        assert_eq!(state.window_title(), APP_TITLE);

        state.stealth_mode = true;
        assert_eq!(state.window_title(), "Notes");
        assert_eq!(AppState::window_title_for(true), state.window_title());
        assert_eq!(AppState::window_title_for(false), APP_TITLE);
    }

    #[test]
    fn test_activity_summary_counts_last_week() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.crisis_history = vec![
            crisis("Old", Some(now - Duration::days(10))),
            crisis("Recent", Some(now - Duration::days(1))),
            crisis("Unstamped", None),
        ];
        state.game_history = vec![
            game("Bubble Pop", now - Duration::hours(3)),
            game("Zen Garden", now - Duration::days(8)),
        ];

        let summary = state.activity_summary(now);

        assert_eq!(summary.crisis_flows_completed, 3);
        assert_eq!(summary.this_week_activities, 2);
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.crisis_history = vec![
            crisis("Unstamped", None),
            crisis("Panic", Some(now - Duration::minutes(30))),
        ];
        state.game_history = vec![game("Starlight Tap", now - Duration::minutes(5))];

        let items = state.recent_activity(10);

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Played: Starlight Tap", "Completed: Panic", "Completed: Unstamped"]
        );
        assert_eq!(items[0].kind, ActivityKind::Game);
    }

    #[test]
    fn test_recent_activity_only_looks_at_last_five_each() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.game_history = (0..8)
            .map(|i| game(&format!("g{i}"), now - Duration::minutes(i)))
            .collect();

        let items = state.recent_activity(10);

        assert_eq!(items.len(), 5);
        // g0..g2 are the newest but sit at the front of the history
        assert_eq!(items[0].title, "Played: g3");
    }

    #[test]
    fn test_journal_newest_first() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.journal_entries = vec![
            JournalEntry {
                id: "old".to_string(),
                date: now - Duration::days(2),
                mood: Mood::Sad,
                entry: "rough".to_string(),
                gratitude: None,
            },
            JournalEntry {
                id: "new".to_string(),
                date: now,
                mood: Mood::Great,
                entry: "better".to_string(),
                gratitude: Some("friends".to_string()),
            },
        ];

        let ids: Vec<_> = state.journal_newest_first().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
