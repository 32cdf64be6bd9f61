use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub name: String,
    pub variant: ThemeVariant,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub item_title: Color,
    pub item_category: Color,
    pub item_likes: Color,
    pub item_downloads: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub spinner: Color,
}

impl ResolvedTheme {
    pub fn dark() -> Self {
        Self {
            name: "dark".into(),
            variant: ThemeVariant::Dark,
            foreground: Color::White,
            foreground_dim: Color::DarkGray,
            border: Color::DarkGray,
            selection_bg: Color::Rgb(45, 50, 70),
            primary: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::LightRed,
            item_title: Color::White,
            item_category: Color::Magenta,
            item_likes: Color::LightRed,
            item_downloads: Color::Green,
            status_bar_bg: Color::Cyan,
            status_bar_fg: Color::Black,
            spinner: Color::Yellow,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".into(),
            variant: ThemeVariant::Light,
            foreground: Color::Black,
            foreground_dim: Color::Gray,
            border: Color::Gray,
            selection_bg: Color::Rgb(215, 225, 245),
            primary: Color::Blue,
            success: Color::Rgb(0, 120, 0),
            warning: Color::Rgb(160, 110, 0),
            error: Color::Red,
            item_title: Color::Black,
            item_category: Color::Magenta,
            item_likes: Color::Red,
            item_downloads: Color::Rgb(0, 120, 0),
            status_bar_bg: Color::Blue,
            status_bar_fg: Color::White,
            spinner: Color::Rgb(160, 110, 0),
        }
    }

    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.foreground_dim)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn spinner_style(&self) -> Style {
        Style::default().fg(self.spinner)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .bg(self.status_bar_bg)
            .fg(self.status_bar_fg)
    }
}

/// Guess the terminal background from its luma; dark when the terminal
/// doesn't answer.
pub fn detect_terminal_theme() -> ThemeVariant {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeVariant::Light,
        _ => ThemeVariant::Dark,
    }
}

/// Resolve a theme from an explicit name, falling back to detection.
pub fn resolve(name: Option<&str>) -> ResolvedTheme {
    name.and_then(ResolvedTheme::by_name)
        .unwrap_or_else(|| ResolvedTheme::for_variant(detect_terminal_theme()))
}
