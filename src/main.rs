//! Crisis Copilot - headless entry point.
//!
//! Boots the core without a view layer:
//! 1. Load `Crisis Copilot Data/copilot.yaml` (plus `COPILOT__*` overrides)
//! 2. Initialize logging → logs/crisis-copilot.<date>
//! 3. Create a current-thread tokio runtime (all mutations stay on one thread)
//! 4. Restore the store from the file-backed key-value store
//! 5. Schedule the splash hand-over and follow navigation with screen timers
//! 6. Run until Ctrl-C, then cancel timers and log store metrics

use anyhow::Result;
use crisis_copilot::persistence::{FileStore, StateCodec};
use crisis_copilot::{APP_NAME, ConfigManager, Screen, ScreenTimers, StateChange, Store, VERSION};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Crisis Copilot Data")?;
    let app_config = config_manager.load_config()?;

    let _log_guard = crisis_copilot::logging::setup_logging(&app_config.logging)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let kv = FileStore::new(&app_config.storage.data_dir);
    let codec = StateCodec::new(Arc::new(kv), app_config.storage.state_key.clone());
    let store = Store::load(codec);

    let snapshot = store.snapshot();
    tracing::info!(
        "Store ready: screen={}, theme={}, title={:?}",
        store.active_screen(),
        snapshot.theme,
        snapshot.window_title()
    );

    runtime.block_on(async {
        let timers = ScreenTimers::bound(tokio::runtime::Handle::current(), store.clone());
        let follower = timers.follow_store(&store);

        let splash_store = store.clone();
        timers.spawn_once(
            Screen::Splash,
            Duration::from_millis(app_config.splash.delay_ms),
            move || {
                splash_store.set_splash_complete();
            },
        );

        let mut changes = store.subscribe();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(StateChange::Navigated { to, .. }) => {
                        tracing::info!("Active screen: {}", to);
                    }
                    Ok(change) => tracing::debug!("State change: {:?}", change),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Skipped {} state change events", missed);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => {
                    tracing::info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        timers.cancel_all();
        follower.abort();
    });

    store.metrics().log_summary();
    tracing::info!("Application shutdown complete");
    Ok(())
}
