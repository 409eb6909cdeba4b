// State store
//
// The Store owns the current AppState snapshot, applies typed mutations,
// persists every new snapshot and notifies subscribers.

use crate::error::{Result, StoreError};
use crate::metrics::Metrics;
use crate::models::contacts::{keep_single_default, promote_first_if_no_default};
use crate::models::{
    AppState, ContactDraft, CrisisFlow, CrisisRecord, GameSession, HOME_SCREEN_ID, JournalDraft,
    JournalEntry, LegacyContact, Theme, TrustedContact,
};
use crate::persistence::StateCodec;
use crate::router::{self, Screen};
use crate::theme::{self, ThemeTokens};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};

/// Change events emitted when state is modified
///
/// Sent to subscribers after the new snapshot has been persisted, in the
/// order the fields are declared on [`AppState`].
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    ThemeChanged {
        theme: Theme,
    },

    FirefliesToggled {
        enabled: bool,
    },

    StealthModeToggled {
        enabled: bool,
    },

    DisguiseNotificationsToggled {
        enabled: bool,
    },

    /// The legacy single contact was set or cleared
    TrustedContactChanged {
        is_set: bool,
    },

    TrustedContactsChanged {
        count: usize,
        default_id: Option<String>,
    },

    CrisisCompleted {
        id: String,
    },

    GameSessionRecorded {
        game: String,
        duration: u32,
    },

    JournalEntryAdded {
        id: String,
    },

    /// The splash screen finished; emitted once per process
    SplashCompleted,

    /// The requested screen id or the rendered screen changed
    Navigated {
        screen_id: String,
        from: Screen,
        to: Screen,
    },
}

/// Single source of truth for application state
///
/// Explicitly constructed (usually with [`Store::load`]) and shared by
/// reference or `Arc`; there is no global instance. Each mutation:
/// 1. Clones the current snapshot and applies the change to the copy
/// 2. Rejects the change (leaving the snapshot untouched) if validation fails
/// 3. Swaps in the new snapshot as one transition
/// 4. Persists it through the [`StateCodec`] (best-effort)
/// 5. Publishes the snapshot and the [`StateChange`] events
///
/// Mutations that leave the state equal to the previous snapshot are not
/// persisted or published.
///
/// # Related Types
///
/// - [`crate::models::AppState`]: the snapshot type
/// - [`crate::router`]: derives the active screen from a snapshot
/// - [`crate::timers::ScreenTimers`]: follows navigation to cancel timers
pub struct Store {
    /// Current snapshot; replaced, never mutated in place
    state: Arc<RwLock<Arc<AppState>>>,

    codec: StateCodec,

    /// Change events, buffered for up to 100 events per subscriber
    state_tx: broadcast::Sender<StateChange>,

    /// Always holds the latest snapshot
    snapshot_tx: Arc<watch::Sender<Arc<AppState>>>,

    /// Times the active screen has changed; only written under the state lock
    screen_visits: Arc<AtomicU64>,

    metrics: Arc<Metrics>,
}

impl Store {
    /// Create a store over `codec`, restoring whatever it has persisted.
    pub fn load(codec: StateCodec) -> Self {
        let initial = codec.load();
        Self::with_state(initial, codec)
    }

    /// Create a store with default state and in-memory persistence.
    pub fn new() -> Self {
        Self::with_state(AppState::default(), StateCodec::in_memory())
    }

    fn with_state(initial: AppState, codec: StateCodec) -> Self {
        let initial = Arc::new(initial);
        let (state_tx, _) = broadcast::channel(100);
        let (snapshot_tx, _) = watch::channel(Arc::clone(&initial));

        Self {
            state: Arc::new(RwLock::new(initial)),
            codec,
            state_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            screen_visits: Arc::new(AtomicU64::new(0)),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// The current immutable snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Execute a function with read access to the current snapshot
    ///
    /// # Example
    /// ```ignore
    /// let entries = store.read(|state| state.journal_entries.len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn active_screen(&self) -> Screen {
        self.read(router::active_screen)
    }

    /// The active screen together with the number of the visit to it.
    ///
    /// The number grows every time the active screen changes, so leaving a
    /// screen and coming back yields a different pair.
    pub fn active_visit(&self) -> (Screen, u64) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (
            router::active_screen(&state),
            self.screen_visits.load(Ordering::Acquire),
        )
    }

    /// Theme tokens for the current snapshot, resolved on every call.
    pub fn theme_tokens(&self) -> ThemeTokens {
        theme::resolve(self.read(|s| s.theme))
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Subscribe to snapshots; the receiver always sees the latest one.
    pub fn watch_snapshots(&self) -> watch::Receiver<Arc<AppState>> {
        self.snapshot_tx.subscribe()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Apply a fallible mutation to a copy of the current snapshot.
    fn apply<F>(&self, update_fn: F) -> Result<Vec<StateChange>>
    where
        F: FnOnce(&mut AppState) -> Result<()>,
    {
        let mut current = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = AppState::clone(&current);

        if let Err(e) = update_fn(&mut next) {
            self.metrics.record_rejection();
            tracing::debug!("Rejected state mutation: {}", e);
            return Err(e);
        }

        if next == **current {
            return Ok(Vec::new());
        }

        let changes = detect_changes(&current, &next);
        if router::active_screen(&current) != router::active_screen(&next) {
            self.screen_visits.fetch_add(1, Ordering::AcqRel);
        }
        let next = Arc::new(next);
        *current = Arc::clone(&next);
        self.metrics.record_mutation();

        self.metrics.record_persist(self.codec.save(&next));

        self.snapshot_tx.send_replace(next);
        for change in &changes {
            // Nobody listening is fine
            let delivered = self.state_tx.send(change.clone()).is_ok();
            self.metrics.record_broadcast(delivered);
        }

        Ok(changes)
    }

    fn apply_infallible<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        self.apply(|state| {
            update_fn(state);
            Ok(())
        })
        .unwrap_or_default()
    }

    // Settings

    pub fn set_theme(&self, theme: Theme) -> Vec<StateChange> {
        self.apply_infallible(|state| state.theme = theme)
    }

    /// Set the theme from its id, e.g. `"calm-green"`.
    ///
    /// # Errors
    /// [`StoreError::InvalidArgument`] for unknown ids; the theme is unchanged
    pub fn set_theme_by_id(&self, theme_id: &str) -> Result<Vec<StateChange>> {
        self.apply(|state| {
            state.theme = theme_id.parse()?;
            Ok(())
        })
    }

    pub fn toggle_fireflies(&self) -> Vec<StateChange> {
        self.apply_infallible(|state| state.show_fireflies = !state.show_fireflies)
    }

    pub fn toggle_stealth_mode(&self) -> Vec<StateChange> {
        let changes = self.apply_infallible(|state| state.stealth_mode = !state.stealth_mode);
        for change in &changes {
            if let StateChange::StealthModeToggled { enabled } = change {
                tracing::info!("Window title is now {:?}", AppState::window_title_for(*enabled));
            }
        }
        changes
    }

    pub fn toggle_disguise_notifications(&self) -> Vec<StateChange> {
        self.apply_infallible(|state| state.disguise_notifications = !state.disguise_notifications)
    }

    // Contacts

    /// Replace the legacy single contact.
    pub fn set_trusted_contact(&self, contact: Option<LegacyContact>) -> Vec<StateChange> {
        self.apply_infallible(|state| state.trusted_contact = contact)
    }

    /// Replace the whole contact list.
    ///
    /// Only the first contact flagged default keeps the flag.
    ///
    /// # Errors
    /// [`StoreError::InvalidArgument`] if two contacts share an id
    pub fn set_trusted_contacts(&self, mut contacts: Vec<TrustedContact>) -> Result<Vec<StateChange>> {
        let duplicate = {
            let mut ids = HashSet::new();
            contacts
                .iter()
                .find(|c| !ids.insert(c.id.as_str()))
                .map(|c| c.id.clone())
        };
        if let Some(id) = duplicate {
            return self.reject(StoreError::InvalidArgument(format!(
                "duplicate contact id: {id}"
            )));
        }

        keep_single_default(&mut contacts);
        self.apply(|state| {
            state.trusted_contacts = contacts;
            Ok(())
        })
    }

    /// Add a contact, or edit the one with `editing_id`.
    ///
    /// An edited contact keeps its id, position and default flag. A new
    /// contact gets a fresh id and becomes default if it is the first one.
    ///
    /// # Errors
    /// - [`StoreError::InvalidArgument`] for a blank name or phone
    /// - [`StoreError::UnknownContact`] if `editing_id` matches nothing
    pub fn save_trusted_contact(
        &self,
        draft: ContactDraft,
        editing_id: Option<&str>,
    ) -> Result<Vec<StateChange>> {
        self.apply(|state| {
            let (name, phone) = draft.validated()?;

            match editing_id {
                Some(id) => {
                    let contact = state
                        .trusted_contacts
                        .iter_mut()
                        .find(|c| c.id == id)
                        .ok_or_else(|| StoreError::UnknownContact(id.to_string()))?;
                    contact.name = name;
                    contact.phone = phone;
                }
                None => {
                    let is_default = state.trusted_contacts.is_empty();
                    state.trusted_contacts.push(TrustedContact {
                        id: new_id(),
                        name,
                        phone,
                        is_default,
                    });
                }
            }
            Ok(())
        })
    }

    /// Remove a contact; if it was the default, the first remaining one takes over.
    pub fn remove_trusted_contact(&self, id: &str) -> Vec<StateChange> {
        self.apply_infallible(|state| {
            state.trusted_contacts.retain(|c| c.id != id);
            promote_first_if_no_default(&mut state.trusted_contacts);
        })
    }

    /// # Errors
    /// [`StoreError::UnknownContact`] if no contact has `id`
    pub fn set_default_contact(&self, id: &str) -> Result<Vec<StateChange>> {
        self.apply(|state| {
            if !state.trusted_contacts.iter().any(|c| c.id == id) {
                return Err(StoreError::UnknownContact(id.to_string()));
            }
            for contact in &mut state.trusted_contacts {
                contact.is_default = contact.id == id;
            }
            Ok(())
        })
    }

    // Histories

    /// Record a finished crisis flow, stamped with the current time.
    pub fn add_crisis_completion(&self, flow: CrisisFlow) -> Vec<StateChange> {
        let record = CrisisRecord::completed(flow, Utc::now());
        self.apply_infallible(|state| state.crisis_history.push(record))
    }

    pub fn add_game_session(&self, session: GameSession) -> Vec<StateChange> {
        self.apply_infallible(|state| state.game_history.push(session))
    }

    /// Record a journal entry with a fresh id, dated now.
    ///
    /// # Errors
    /// [`StoreError::EmptyJournalEntry`] if the text is blank after trimming
    pub fn add_journal_entry(&self, draft: JournalDraft) -> Result<Vec<StateChange>> {
        self.apply(|state| {
            let entry = JournalEntry::from_draft(draft, new_id(), Utc::now())?;
            state.journal_entries.push(entry);
            Ok(())
        })
    }

    // Navigation

    /// Request a screen by id. Unknown ids are stored as given and render as home.
    pub fn set_current_screen(&self, screen_id: impl Into<String>) -> Vec<StateChange> {
        let screen_id = screen_id.into();
        self.apply_infallible(|state| state.current_screen = screen_id)
    }

    pub fn navigate(&self, screen: Screen) -> Vec<StateChange> {
        self.set_current_screen(screen.as_str())
    }

    /// Leave the splash screen for home in a single transition.
    pub fn set_splash_complete(&self) -> Vec<StateChange> {
        self.apply_infallible(|state| {
            state.show_splash = false;
            state.current_screen = HOME_SCREEN_ID.to_string();
        })
    }

    fn reject(&self, error: StoreError) -> Result<Vec<StateChange>> {
        self.metrics.record_rejection();
        tracing::debug!("Rejected state mutation: {}", error);
        Err(error)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same state, channels and metrics
impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            codec: self.codec.clone(),
            state_tx: self.state_tx.clone(),
            snapshot_tx: Arc::clone(&self.snapshot_tx),
            screen_visits: Arc::clone(&self.screen_visits),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Work out which events a transition from `old` to `new` produces.
fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.theme != new.theme {
        changes.push(StateChange::ThemeChanged { theme: new.theme });
    }
    if old.show_fireflies != new.show_fireflies {
        changes.push(StateChange::FirefliesToggled {
            enabled: new.show_fireflies,
        });
    }
    if old.stealth_mode != new.stealth_mode {
        changes.push(StateChange::StealthModeToggled {
            enabled: new.stealth_mode,
        });
    }
    if old.disguise_notifications != new.disguise_notifications {
        changes.push(StateChange::DisguiseNotificationsToggled {
            enabled: new.disguise_notifications,
        });
    }

    if old.trusted_contact != new.trusted_contact {
        changes.push(StateChange::TrustedContactChanged {
            is_set: new.trusted_contact.is_some(),
        });
    }
    if old.trusted_contacts != new.trusted_contacts {
        changes.push(StateChange::TrustedContactsChanged {
            count: new.trusted_contacts.len(),
            default_id: new
                .trusted_contacts
                .iter()
                .find(|c| c.is_default)
                .map(|c| c.id.clone()),
        });
    }

    // Histories only grow, so anything past the old length is new
    for record in new.crisis_history.iter().skip(old.crisis_history.len()) {
        changes.push(StateChange::CrisisCompleted {
            id: record.id.clone(),
        });
    }
    for session in new.game_history.iter().skip(old.game_history.len()) {
        changes.push(StateChange::GameSessionRecorded {
            game: session.game.clone(),
            duration: session.duration,
        });
    }
    for entry in new.journal_entries.iter().skip(old.journal_entries.len()) {
        changes.push(StateChange::JournalEntryAdded {
            id: entry.id.clone(),
        });
    }

    if old.show_splash && !new.show_splash {
        changes.push(StateChange::SplashCompleted);
    }

    let from = router::active_screen(old);
    let to = router::active_screen(new);
    if old.current_screen != new.current_screen || from != to {
        changes.push(StateChange::Navigated {
            screen_id: new.current_screen.clone(),
            from,
            to,
        });
    }

    changes
}
