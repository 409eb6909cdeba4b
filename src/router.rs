//! Screen router: decides which screen is active.
//!
//! The router owns no state. The active screen is a projection of the store's
//! `(show_splash, current_screen)` pair; [`ScreenRouter`] adds a dispatch table
//! so the view layer gets one handler per [`Screen`] with exhaustive matching
//! at construction time.

use crate::models::AppState;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Screen {
    Splash,
    Home,
    CrisisCenter,
    EmergencyToolkit,
    MoodJournal,
    MiniGames,
    BreathingTimer,
    BubblePopGame,
    DrawToCalmGame,
    StarlightTapGame,
    ZenGardenGame,
    GroundingExercise,
    QuickSos,
    TrustedContact,
    FakeCall,
    FirstAid,
    NearbyHelp,
    Settings,
    Profile,
}

impl Screen {
    pub const ALL: [Screen; 19] = [
        Screen::Splash,
        Screen::Home,
        Screen::CrisisCenter,
        Screen::EmergencyToolkit,
        Screen::MoodJournal,
        Screen::MiniGames,
        Screen::BreathingTimer,
        Screen::BubblePopGame,
        Screen::DrawToCalmGame,
        Screen::StarlightTapGame,
        Screen::ZenGardenGame,
        Screen::GroundingExercise,
        Screen::QuickSos,
        Screen::TrustedContact,
        Screen::FakeCall,
        Screen::FirstAid,
        Screen::NearbyHelp,
        Screen::Settings,
        Screen::Profile,
    ];

    /// The id stored in `AppState::current_screen`.
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Home => "home",
            Screen::CrisisCenter => "crisis-center",
            Screen::EmergencyToolkit => "emergency-toolkit",
            Screen::MoodJournal => "mood-journal",
            Screen::MiniGames => "mini-games",
            Screen::BreathingTimer => "breathing-timer",
            Screen::BubblePopGame => "bubble-pop-game",
            Screen::DrawToCalmGame => "draw-to-calm-game",
            Screen::StarlightTapGame => "starlight-tap-game",
            Screen::ZenGardenGame => "zen-garden-game",
            Screen::GroundingExercise => "grounding-exercise",
            Screen::QuickSos => "quick-sos",
            Screen::TrustedContact => "trusted-contact",
            Screen::FakeCall => "fake-call",
            Screen::FirstAid => "first-aid",
            Screen::NearbyHelp => "nearby-help",
            Screen::Settings => "settings",
            Screen::Profile => "profile",
        }
    }

    pub fn is_game(self) -> bool {
        matches!(
            self,
            Screen::BubblePopGame
                | Screen::DrawToCalmGame
                | Screen::StarlightTapGame
                | Screen::ZenGardenGame
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown screen id: {0}")]
pub struct UnknownScreen(pub String);

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| UnknownScreen(s.to_string()))
    }
}

/// Which screen is rendered for a given splash flag and screen id.
///
/// The splash wins while it is showing; unknown ids (stale or hand-edited
/// persisted state) land on home.
pub fn resolve(show_splash: bool, current_screen: &str) -> Screen {
    if show_splash {
        return Screen::Splash;
    }

    match current_screen.parse() {
        Ok(screen) => screen,
        Err(UnknownScreen(id)) => {
            tracing::debug!("Unknown screen id {:?}, falling back to home", id);
            Screen::Home
        }
    }
}

pub fn active_screen(state: &AppState) -> Screen {
    resolve(state.show_splash, &state.current_screen)
}

/// Dispatch table from every [`Screen`] to a view handler.
pub struct ScreenRouter<H> {
    handlers: IndexMap<Screen, H>,
}

impl<H> ScreenRouter<H> {
    /// Build the table by calling `factory` once per screen.
    pub fn new<F>(mut factory: F) -> Self
    where
        F: FnMut(Screen) -> H,
    {
        let handlers = Screen::ALL
            .into_iter()
            .map(|screen| (screen, factory(screen)))
            .collect();
        Self { handlers }
    }

    pub fn handler(&self, screen: Screen) -> &H {
        // Every screen is inserted by `new`
        &self.handlers[&screen]
    }

    /// The active screen for `state` and its handler.
    pub fn dispatch(&self, state: &AppState) -> (Screen, &H) {
        let screen = active_screen(state);
        (screen, self.handler(screen))
    }

    pub fn screens(&self) -> impl Iterator<Item = Screen> + '_ {
        self.handlers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_ids_round_trip() {
        for screen in Screen::ALL {
            assert_eq!(screen.as_str().parse::<Screen>().unwrap(), screen);
        }
    }

    #[test]
    fn test_splash_wins_while_showing() {
        assert_eq!(resolve(true, "anything"), Screen::Splash);
        assert_eq!(resolve(true, "settings"), Screen::Splash);
    }

    #[test]
    fn test_unknown_screen_falls_back_to_home() {
        assert_eq!(resolve(false, "bogus"), Screen::Home);
        assert_eq!(resolve(false, ""), Screen::Home);
        assert_eq!(resolve(false, "Settings"), Screen::Home);
    }

    #[test]
    fn test_known_screen_is_rendered() {
        assert_eq!(resolve(false, "zen-garden-game"), Screen::ZenGardenGame);
        assert_eq!(resolve(false, "quick-sos"), Screen::QuickSos);
        // Navigating to "splash" after it finished shows the splash view itself
        assert_eq!(resolve(false, "splash"), Screen::Splash);
    }

    #[test]
    fn test_active_screen_reads_state() {
        let mut state = AppState::default();
        assert_eq!(active_screen(&state), Screen::Splash);

        state.show_splash = false;
        state.current_screen = "mood-journal".to_string();
        assert_eq!(active_screen(&state), Screen::MoodJournal);
    }

    #[test]
    fn test_router_dispatch_table() {
        let router = ScreenRouter::new(|screen| format!("view:{}", screen));
        assert_eq!(router.screens().count(), Screen::ALL.len());

        let mut state = AppState::default();
        state.show_splash = false;
        state.current_screen = "first-aid".to_string();

        let (screen, handler) = router.dispatch(&state);
        assert_eq!(screen, Screen::FirstAid);
        assert_eq!(handler, "view:first-aid");

        state.current_screen = "gone-screen".to_string();
        assert_eq!(router.dispatch(&state).1, "view:home");
    }

    #[test]
    fn test_is_game() {
        assert!(Screen::BubblePopGame.is_game());
        assert!(!Screen::BreathingTimer.is_game());
    }
}
