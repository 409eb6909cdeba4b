// Crisis Copilot - state, navigation and persistence core
//
// This is the library crate holding the state store, screen router, persistence
// codec, theme resolver and per-screen timers. The binary crate (main.rs) boots
// them headless.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod router;
pub mod state;
pub mod theme;
pub mod timers;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{PersistenceError, StoreError};
pub use models::{AppConfig, AppState, Theme};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, StateCodec};
pub use router::{Screen, ScreenRouter};
pub use state::{StateChange, Store};
pub use theme::ThemeTokens;
pub use timers::ScreenTimers;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
