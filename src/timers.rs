//! Per-screen timers: repeating ticks, one-shot delays and once-a-second countdowns.
//!
//! Every timer belongs to a [`Screen`]. Leaving that screen, or calling
//! [`ScreenTimers::cancel_screen`], stops it for good, even if the screen is
//! entered again later. A timer checks whether it may fire right before each
//! callback, so once cancellation returns (or once the store's active screen
//! has moved on) no new callback starts. On a current-thread runtime that
//! means none runs at all; on a multi-thread runtime a callback that had
//! already started on another worker may still be finishing.
//!
//! # Example
//! ```ignore
//! let timers = ScreenTimers::bound(runtime.handle().clone(), store.clone());
//! let _follower = timers.follow_store(&store);
//!
//! let splash_store = store.clone();
//! timers.spawn_once(Screen::Splash, Duration::from_millis(2500), move || {
//!     splash_store.set_splash_complete();
//! });
//! ```

use crate::router::{self, Screen};
use crate::state::Store;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

struct TimerEntry {
    alive: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TimerEntry {
    fn cancel(&self) {
        self.alive.store(false, Ordering::Release);
        self.handle.abort();
    }
}

/// Checked right before every callback.
#[derive(Clone)]
struct TimerGuard {
    screen: Screen,
    alive: Arc<AtomicBool>,

    /// The bound store and the visit of `screen` the timer was spawned in
    visit: Option<(Store, u64)>,
}

impl TimerGuard {
    fn may_fire(&self) -> bool {
        if !self.alive.load(Ordering::Acquire) {
            return false;
        }
        match &self.visit {
            Some((store, visit)) => store.active_visit() == (self.screen, *visit),
            None => true,
        }
    }
}

/// Registry of timers keyed by the screen that owns them.
///
/// Cloning shares the registry.
#[derive(Clone)]
pub struct ScreenTimers {
    runtime: tokio::runtime::Handle,

    /// When set, a timer only fires while its screen is the active one
    store: Option<Store>,

    entries: Arc<Mutex<HashMap<Screen, Vec<TimerEntry>>>>,
}

impl ScreenTimers {
    /// Timers that fire until explicitly cancelled.
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            runtime,
            store: None,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Timers that also stop as soon as `store` navigates away from their screen.
    ///
    /// A timer belongs to the visit of its screen it was spawned in; coming
    /// back to the screen later does not revive it.
    pub fn bound(runtime: tokio::runtime::Handle, store: Store) -> Self {
        Self {
            store: Some(store),
            ..Self::new(runtime)
        }
    }

    /// Call `tick` every `period`, first after one full period.
    pub fn spawn_interval<F>(&self, screen: Screen, period: Duration, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        let guard = self.guard(screen);
        let alive = Arc::clone(&guard.alive);

        let handle = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !guard.may_fire() {
                    break;
                }
                tick();
            }
        });

        self.register(screen, alive, handle);
    }

    /// Call `f` once after `delay`.
    pub fn spawn_once<F>(&self, screen: Screen, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.guard(screen);
        let alive = Arc::clone(&guard.alive);

        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if guard.may_fire() {
                f();
            }
        });

        self.register(screen, alive, handle);
    }

    /// Count down from `seconds`, once per second.
    ///
    /// `on_tick` receives the remaining seconds after each decrement that
    /// leaves time on the clock; `on_done` runs when it reaches zero.
    pub fn spawn_countdown<T, D>(&self, screen: Screen, seconds: u32, mut on_tick: T, on_done: D)
    where
        T: FnMut(u32) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let guard = self.guard(screen);
        let alive = Arc::clone(&guard.alive);

        let handle = self.runtime.spawn(async move {
            let second = Duration::from_secs(1);
            let mut interval = tokio::time::interval_at(Instant::now() + second, second);
            let mut remaining = seconds;

            while remaining > 0 {
                interval.tick().await;
                if !guard.may_fire() {
                    return;
                }
                remaining -= 1;
                if remaining > 0 {
                    on_tick(remaining);
                }
            }
            on_done();
        });

        self.register(screen, alive, handle);
    }

    /// Stop every timer owned by `screen`.
    ///
    /// # Returns
    /// How many still-running timers were stopped
    pub fn cancel_screen(&self, screen: Screen) -> usize {
        let removed = self.lock().remove(&screen).unwrap_or_default();
        let running = removed.iter().filter(|e| !e.handle.is_finished()).count();
        for entry in &removed {
            entry.cancel();
        }

        if running > 0 {
            tracing::debug!("Cancelled {} timers for screen {}", running, screen);
        }
        running
    }

    pub fn cancel_all(&self) -> usize {
        let screens: Vec<Screen> = self.lock().keys().copied().collect();
        screens.into_iter().map(|s| self.cancel_screen(s)).sum()
    }

    /// Timers of `screen` that have not finished or been cancelled.
    pub fn active_count(&self, screen: Screen) -> usize {
        self.lock()
            .get(&screen)
            .map(|entries| entries.iter().filter(|e| !e.handle.is_finished()).count())
            .unwrap_or(0)
    }

    /// Cancel the old screen's timers whenever the store's active screen changes.
    ///
    /// Runs until the returned handle is aborted.
    pub fn follow_store(&self, store: &Store) -> JoinHandle<()> {
        let mut snapshots = store.watch_snapshots();
        let mut current = router::active_screen(&snapshots.borrow());
        let timers = self.clone();

        self.runtime.spawn(async move {
            while snapshots.changed().await.is_ok() {
                let next = router::active_screen(&snapshots.borrow_and_update());
                if next != current {
                    timers.cancel_screen(current);
                    current = next;
                }
            }
        })
    }

    fn guard(&self, screen: Screen) -> TimerGuard {
        TimerGuard {
            screen,
            alive: Arc::new(AtomicBool::new(true)),
            visit: self.store.as_ref().map(|store| {
                let (_, visit) = store.active_visit();
                (store.clone(), visit)
            }),
        }
    }

    fn register(&self, screen: Screen, alive: Arc<AtomicBool>, handle: JoinHandle<()>) {
        let mut entries = self.lock();
        let screen_entries = entries.entry(screen).or_default();
        screen_entries.retain(|e| !e.handle.is_finished());
        screen_entries.push(TimerEntry { alive, handle });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Screen, Vec<TimerEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
