use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub cell_correct: String,
    pub cell_wrong: String,
    pub cell_wrong_bg: String,
    pub cell_revealed: String,
    pub cell_pending: String,
    pub cursor_bg: String,
    pub cursor_fg: String,
    pub star: String,
    pub accent: String,
    pub muted: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub error: String,
    pub success: String,
}

impl Theme {
    /// User themes in `<config_dir>/klisis/themes/` shadow the bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        let user_theme_path = Config::config_dir().join("themes").join(&filename);
        if let Ok(content) = fs::read_to_string(&user_theme_path) {
            match toml::from_str::<Theme>(&content) {
                Ok(theme) => {
                    debug!(path = %user_theme_path.display(), "loaded user theme");
                    return Some(theme);
                }
                Err(err) => warn!(path = %user_theme_path.display(), %err, "ignoring invalid theme"),
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("parchment").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#f4ecd8".to_string(),
            fg: "#3b2f2f".to_string(),
            cell_correct: "#2e6b3a".to_string(),
            cell_wrong: "#a12c2c".to_string(),
            cell_wrong_bg: "#f2d3cc".to_string(),
            cell_revealed: "#6b5a8e".to_string(),
            cell_pending: "#3b2f2f".to_string(),
            cursor_bg: "#d9b56c".to_string(),
            cursor_fg: "#1f1a14".to_string(),
            star: "#b8860b".to_string(),
            accent: "#7a3e1d".to_string(),
            muted: "#8c7b6b".to_string(),
            border: "#c2b59b".to_string(),
            border_focused: "#7a3e1d".to_string(),
            header_bg: "#e6d8b8".to_string(),
            header_fg: "#3b2f2f".to_string(),
            error: "#a12c2c".to_string(),
            success: "#2e6b3a".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.is_ascii()
            && hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::Reset
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn cell_correct(&self) -> Color { Self::parse_color(&self.cell_correct) }
    pub fn cell_wrong(&self) -> Color { Self::parse_color(&self.cell_wrong) }
    pub fn cell_wrong_bg(&self) -> Color { Self::parse_color(&self.cell_wrong_bg) }
    pub fn cell_revealed(&self) -> Color { Self::parse_color(&self.cell_revealed) }
    pub fn cell_pending(&self) -> Color { Self::parse_color(&self.cell_pending) }
    pub fn cursor_bg(&self) -> Color { Self::parse_color(&self.cursor_bg) }
    pub fn cursor_fg(&self) -> Color { Self::parse_color(&self.cursor_fg) }
    pub fn star(&self) -> Color { Self::parse_color(&self.star) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"parchment".to_string()));
        assert!(names.contains(&"midnight".to_string()));
        for name in names {
            let file = ThemeAssets::get(&format!("{name}.toml")).unwrap();
            let content = std::str::from_utf8(file.data.as_ref()).unwrap();
            let theme: Theme = toml::from_str(content).unwrap();
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#7a3e1d"), Color::Rgb(0x7a, 0x3e, 0x1d));
        assert_eq!(ThemeColors::parse_color("nonsense"), Color::Reset);
        assert_eq!(ThemeColors::parse_color("#aéaé"), Color::Reset);
    }
}
