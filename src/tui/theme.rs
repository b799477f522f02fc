//! Theme definitions for the TUI
//!
//! This module provides colorblind-safe themes for both dark and light terminals.
//! The default is "dark" but users can configure "light" via config file or env var.

use ratatui::style::Color;

use crate::models::ClientStatus;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    #[allow(dead_code)]
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,

    // Client status colors (colorblind-safe)
    pub running: Color,
    pub pending: Color,
    pub complete: Color,
    pub failed: Color,
    pub lost: Color,

    // UI elements
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub warn: Color,

    /// Link-like cells (ID, Job, Client, Actions)
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            // Using blue for done, orange for waiting, distinct brightness levels
            running: Color::Rgb(0, 200, 0),     // Bright green
            pending: Color::Rgb(255, 180, 0),   // Orange (not yellow - better visibility)
            complete: Color::Rgb(80, 160, 255), // Light blue
            failed: Color::Rgb(255, 80, 80),    // Bright red
            lost: Color::Magenta,

            selected_bg: Color::Rgb(60, 60, 80),
            selected_fg: Color::White,
            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            warn: Color::Rgb(255, 180, 0),

            link: Color::Cyan,
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            border: Color::Rgb(120, 120, 120),
            border_focused: Color::Rgb(0, 100, 180),

            running: Color::Rgb(0, 140, 0),    // Dark green
            pending: Color::Rgb(200, 120, 0),  // Dark orange
            complete: Color::Rgb(0, 80, 180),  // Dark blue
            failed: Color::Rgb(200, 0, 0),     // Dark red
            lost: Color::Rgb(160, 0, 160),     // Dark magenta

            selected_bg: Color::Rgb(200, 220, 255),
            selected_fg: Color::Black,
            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            warn: Color::Rgb(200, 120, 0),

            link: Color::Rgb(0, 100, 180),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::from_str(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Get color for a client status
    pub fn status_color(&self, status: &ClientStatus) -> Color {
        match status {
            ClientStatus::Running => self.running,
            ClientStatus::Pending => self.pending,
            ClientStatus::Complete => self.complete,
            ClientStatus::Failed => self.failed,
            ClientStatus::Lost => self.lost,
            ClientStatus::Unknown(_) => self.fg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let dark = Theme::from_name("dark");
        assert_eq!(dark.name, ThemeName::Dark);

        let light = Theme::from_name("LIGHT");
        assert_eq!(light.name, ThemeName::Light);

        // Unknown defaults to dark
        let unknown = Theme::from_name("solarized");
        assert_eq!(unknown.name, ThemeName::Dark);
    }

    #[test]
    fn test_status_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.status_color(&ClientStatus::Running), theme.running);
        assert_eq!(theme.status_color(&ClientStatus::Pending), theme.pending);
        assert_eq!(theme.status_color(&ClientStatus::Failed), theme.failed);
        assert_eq!(
            theme.status_color(&ClientStatus::Unknown("evicted".to_string())),
            theme.fg
        );
    }
}
