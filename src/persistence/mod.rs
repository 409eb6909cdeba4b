//! Persistence codec for [`AppState`].
//!
//! The whole state (minus the transient splash flag) is stored as one JSON
//! blob under a single key of a [`KeyValueStore`]. Persistence is
//! best-effort: [`StateCodec::save`] and [`StateCodec::load`] never return
//! errors, they log and fall back instead.

mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

#[cfg(test)]
pub use kv::MockKeyValueStore;

use crate::error::PersistenceError;
use crate::models::{AppState, DEFAULT_STATE_KEY};
use std::sync::Arc;

/// Serializes [`AppState`] to a key-value store and reads it back.
#[derive(Clone)]
pub struct StateCodec {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl StateCodec {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Codec over an in-process store under the default key.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_STATE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist `state`, dropping the write on failure.
    ///
    /// # Returns
    /// `true` if the blob was written
    pub fn save(&self, state: &AppState) -> bool {
        match self.try_save(state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Dropping state write for key {}: {}", self.key, e);
                false
            }
        }
    }

    /// Read the persisted state, or defaults if it is absent or unreadable.
    ///
    /// The splash screen always replays, so `show_splash` is forced on.
    pub fn load(&self) -> AppState {
        let mut state = match self.try_load() {
            Ok(Some(state)) => {
                tracing::info!(
                    "Restored state from key {}: {} contacts, {} crisis records, {} game sessions, {} journal entries",
                    self.key,
                    state.trusted_contacts.len(),
                    state.crisis_history.len(),
                    state.game_history.len(),
                    state.journal_entries.len()
                );
                state
            }
            Ok(None) => {
                tracing::info!("No stored state under key {}, using defaults", self.key);
                AppState::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring stored state under key {}: {}", self.key, e);
                AppState::default()
            }
        };

        state.show_splash = true;
        state
    }

    fn try_save(&self, state: &AppState) -> Result<(), PersistenceError> {
        let blob = encode(state)?;
        self.store.set(&self.key, &blob)?;
        tracing::debug!("Saved {} bytes of state under key {}", blob.len(), self.key);
        Ok(())
    }

    fn try_load(&self) -> Result<Option<AppState>, PersistenceError> {
        match self.store.get(&self.key)? {
            Some(blob) => decode(&blob).map(Some),
            None => Ok(None),
        }
    }
}

/// Encode the persisted fields of `state` as JSON.
pub fn encode(state: &AppState) -> Result<String, PersistenceError> {
    serde_json::to_string(state).map_err(PersistenceError::Serialize)
}

/// Decode a stored blob, filling fields it lacks from the defaults.
///
/// Fails only when the blob is not a JSON object. Unreadable fields fall back
/// to their defaults and unreadable records are skipped.
pub fn decode(blob: &str) -> Result<AppState, PersistenceError> {
    let mut state: AppState = serde_json::from_str(blob).map_err(PersistenceError::Deserialize)?;
    state.show_splash = true;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CrisisCategory, CrisisRecord, Theme, TrustedContact};
    use chrono::{TimeZone, Utc};

    fn codec_with(store: MemoryStore) -> StateCodec {
        StateCodec::new(Arc::new(store), DEFAULT_STATE_KEY)
    }

    #[test]
    fn test_load_empty_store_returns_defaults() {
        let codec = StateCodec::in_memory();
        assert_eq!(codec.load(), AppState::default());
    }

    #[test]
    fn test_load_corrupt_blob_returns_defaults() {
        let store = MemoryStore::new();
        store.set(DEFAULT_STATE_KEY, "{not json").unwrap();

        assert_eq!(codec_with(store).load(), AppState::default());
    }

    #[test]
    fn test_load_unknown_theme_keeps_other_fields() {
        let store = MemoryStore::new();
        store
            .set(DEFAULT_STATE_KEY, r#"{"theme":"neon","stealthMode":true}"#)
            .unwrap();

        let state = codec_with(store).load();

        assert_eq!(state.theme, Theme::SoftPastel);
        assert!(state.stealth_mode);
    }

    #[test]
    fn test_load_non_object_blob_returns_defaults() {
        for blob in ["null", "\"dark\"", "42"] {
            let store = MemoryStore::new();
            store.set(DEFAULT_STATE_KEY, blob).unwrap();

            assert_eq!(codec_with(store).load(), AppState::default(), "blob: {blob}");
        }
    }

    #[test]
    fn test_load_merges_over_defaults() {
        let store = MemoryStore::new();
        store
            .set(
                DEFAULT_STATE_KEY,
                r#"{"theme":"dark","currentScreen":"settings","somethingNew":1}"#,
            )
            .unwrap();

        let state = codec_with(store).load();

        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.current_screen, "settings");
        assert!(state.show_fireflies);
        assert!(state.journal_entries.is_empty());
        assert!(state.show_splash);
    }

    #[test]
    fn test_load_parses_iso_timestamps() {
        let store = MemoryStore::new();
        store
            .set(
                DEFAULT_STATE_KEY,
                r#"{
                    "crisisHistory":[{"id":"panic","title":"Panic","icon":"zap","category":"immediate","completedAt":"2024-03-01T10:15:30.000Z"}],
                    "gameHistory":[{"game":"Bubble Pop","playedAt":"2024-03-02T08:00:00.000Z","duration":95}],
                    "journalEntries":[{"id":"1709","date":"2024-03-03T21:45:00.000Z","mood":"okay","entry":"Test day"}]
                }"#,
            )
            .unwrap();

        let state = codec_with(store).load();

        assert_eq!(
            state.crisis_history[0].completed_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap())
        );
        assert_eq!(
            state.game_history[0].played_at,
            Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()
        );
        assert_eq!(state.game_history[0].duration, 95);
        assert_eq!(
            state.journal_entries[0].date,
            Utc.with_ymd_and_hms(2024, 3, 3, 21, 45, 0).unwrap()
        );
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let codec = StateCodec::in_memory();
        let mut state = AppState::default();
        state.theme = Theme::CalmGreen;
        state.stealth_mode = true;
        state.show_splash = false;
        state.current_screen = "profile".to_string();
        state.trusted_contacts = vec![TrustedContact::new("1", "A", "555").as_default()];
        state.crisis_history = vec![CrisisRecord {
            id: "grief".to_string(),
            title: "Grief".to_string(),
            icon: "cloud".to_string(),
            category: CrisisCategory::Processing,
            completed_at: Some(Utc::now()),
        }];

        assert!(codec.save(&state));
        let loaded = codec.load();

        assert!(loaded.show_splash);
        assert_eq!(AppState { show_splash: false, ..loaded }, state);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .returning(|_, _| Err(std::io::Error::other("disk full").into()));

        let codec = StateCodec::new(Arc::new(mock), DEFAULT_STATE_KEY);
        assert!(!codec.save(&AppState::default()));
    }

    #[test]
    fn test_load_failure_is_swallowed() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .returning(|_| Err(std::io::Error::other("unreadable").into()));

        let codec = StateCodec::new(Arc::new(mock), DEFAULT_STATE_KEY);
        assert_eq!(codec.load(), AppState::default());
    }

    #[test]
    fn test_encoded_blob_has_no_splash_flag() {
        let blob = encode(&AppState::default()).unwrap();
        assert!(!blob.contains("showSplash"));
        assert!(blob.contains("\"journalEntries\":[]"));
    }
}
