//! Light/dark palette
//!
//! The whole screen is painted from one [`Palette`], derived from the
//! current [`ThemeMode`]. Nothing here is persisted: every run starts light.

use ratatui::style::{Color, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    /// Name of the screen-wide style scope for this mode
    pub fn scope_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "light-mode",
            ThemeMode::Dark => "dark-mode",
        }
    }
}

/// Colors for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mode: ThemeMode,
    pub primary: Color,    // App bar, focused borders, button, spinner
    pub secondary: Color,  // Focused input border
    pub background: Color, // Whole screen
    pub text: Color,       // Body text
    pub on_primary: Color, // Text drawn on top of `primary`
    pub error: Color,
}

// primary, secondary, background, text, on_primary, error
const LIGHT: [Color; 6] = [
    Color::Rgb(0x19, 0x76, 0xd2), // #1976d2
    Color::Rgb(0xd3, 0x2f, 0x2f), // #d32f2f
    Color::Rgb(0xff, 0xff, 0xff),
    Color::Rgb(0x00, 0x00, 0x00),
    Color::Rgb(0xff, 0xff, 0xff),
    Color::Rgb(0xd3, 0x2f, 0x2f),
];
const DARK: [Color; 6] = [
    Color::Rgb(0x90, 0xca, 0xf9), // #90caf9
    Color::Rgb(0xf4, 0x8f, 0xb1), // #f48fb1
    Color::Rgb(0x00, 0x00, 0x00),
    Color::Rgb(0xff, 0xff, 0xff),
    Color::Rgb(0x00, 0x00, 0x00),
    Color::Rgb(0xf4, 0x43, 0x36), // #f44336
];

impl Default for Palette {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        let [primary, secondary, background, text, on_primary, error] = match mode {
            ThemeMode::Light => LIGHT,
            ThemeMode::Dark => DARK,
        };

        Self {
            mode,
            primary,
            secondary,
            background,
            text,
            on_primary,
            error,
        }
    }

    /// Style for the screen-wide scope every widget draws on
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    pub fn app_bar(&self) -> Style {
        Style::default().bg(self.primary).fg(self.on_primary)
    }
}
