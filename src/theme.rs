//! Theme resolver: maps a [`Theme`] to the presentation tokens the view layer styles with.
//!
//! Pure and stateless. Callers re-resolve from the current snapshot whenever
//! the theme changes; nothing here caches.

use crate::models::Theme;

/// Utility-class tokens for one theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeTokens {
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
    pub accent: &'static str,
    pub secondary: &'static str,
    pub gradient: &'static str,
}

const SOFT_PASTEL: ThemeTokens = ThemeTokens {
    background: "bg-gradient-to-br from-purple-100 via-pink-100 to-blue-100",
    text: "text-gray-900",
    card: "bg-white/80 backdrop-blur-sm",
    accent: "bg-purple-500",
    secondary: "bg-pink-500",
    gradient: "from-purple-200 to-pink-200",
};

const DARK: ThemeTokens = ThemeTokens {
    background: "bg-gray-900",
    text: "text-white",
    card: "bg-gray-800",
    accent: "bg-purple-600",
    secondary: "bg-blue-600",
    gradient: "from-gray-900 to-gray-800",
};

const SUNSET: ThemeTokens = ThemeTokens {
    background: "bg-gradient-to-br from-orange-200 via-pink-200 to-purple-200",
    text: "text-gray-900",
    card: "bg-white/80 backdrop-blur-sm",
    accent: "bg-orange-500",
    secondary: "bg-pink-500",
    gradient: "from-orange-300 to-pink-300",
};

const CALM_GREEN: ThemeTokens = ThemeTokens {
    background: "bg-gradient-to-br from-green-100 via-teal-100 to-cyan-100",
    text: "text-gray-900",
    card: "bg-white/80 backdrop-blur-sm",
    accent: "bg-green-500",
    secondary: "bg-teal-500",
    gradient: "from-green-200 to-teal-200",
};

pub fn resolve(theme: Theme) -> ThemeTokens {
    match theme {
        Theme::SoftPastel => SOFT_PASTEL,
        Theme::Dark => DARK,
        Theme::Sunset => SUNSET,
        Theme::CalmGreen => CALM_GREEN,
    }
}

/// Resolve a raw theme id, using soft-pastel for anything unrecognized.
pub fn resolve_id(theme_id: &str) -> ThemeTokens {
    resolve(theme_id.parse().unwrap_or_default())
}

pub fn is_dark(theme: Theme) -> bool {
    theme == Theme::Dark
}
