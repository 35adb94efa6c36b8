//! Theme colors, with optional overrides from the config file

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active column, enabled controls
    pub header: Color,      // Column labels
    pub text: Color,        // Cell text
    pub text_dim: Color,    // Disabled controls, empty state, hints
    pub bg_selected: Color, // Row cursor background
    pub inactive: Color,    // Borders
    pub warning: Color,     // Status line
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            header: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            warning: Color::Rgb(249, 226, 175),
        }
    }
}

impl Theme {
    /// Default colors with any valid overrides from `config` applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.header, &mut theme.header),
            (&config.text, &mut theme.text),
            (&config.text_dim, &mut theme.text_dim),
            (&config.selected, &mut theme.bg_selected),
        ];

        for (value, slot) in overrides {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid theme color: {}", value),
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
