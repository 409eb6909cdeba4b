//! Data models for the Crisis Copilot core.
//!
//! - [`AppState`]: the central state value handed out by the store as immutable snapshots
//! - [`TrustedContact`] / [`LegacyContact`]: people reachable from the emergency toolkit
//! - [`CrisisRecord`], [`GameSession`], [`JournalEntry`]: append-only histories
//! - [`AppConfig`]: storage, logging and splash settings loaded from `copilot.yaml`
//!
//! # Architecture Note
//!
//! `AppState` doubles as the persisted schema: it derives `Serialize`/`Deserialize`
//! with container-level defaults so that blobs written by older versions still load.
//! All mutation goes through [`Store`](crate::state::Store).

pub mod app_state;
pub mod config;
pub mod contacts;
mod lenient;
pub mod records;

pub use app_state::{
    APP_TITLE, ActivityItem, ActivityKind, ActivitySummary, AppState, HOME_SCREEN_ID,
    SPLASH_SCREEN_ID, STEALTH_TITLE, Theme,
};
pub use config::{AppConfig, DEFAULT_STATE_KEY, LoggingSettings, SplashSettings, StorageSettings};
pub use contacts::{ContactDraft, LegacyContact, TrustedContact};
pub use records::{
    CrisisCategory, CrisisFlow, CrisisRecord, GameSession, JournalDraft, JournalEntry, Mood,
};
