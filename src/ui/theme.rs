//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::theme::ThemeMode;

const LIME: Color = Color::Rgb(0xd1, 0xff, 0x4f);
const INDIGO: Color = Color::Rgb(0x4f, 0x46, 0xe5);
const ARROW_RED: Color = Color::Rgb(0xff, 0x5c, 0x5c);

/// What a piece of text is, so the palette can colour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Body,
    Heading,
    Muted,
    Link,
    Number,
    /// Black on lime, like the hero badge and the theme button.
    Badge,
}

/// Central theme, one palette per [`ThemeMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub cursor: Color,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self {
                bg: Color::Rgb(0x12, 0x12, 0x12),
                fg: Color::White,
                muted: Color::Gray,
                cursor: Color::Rgb(0x4b, 0x00, 0x82),
            },
            ThemeMode::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::DarkGray,
                cursor: Color::Rgb(0xff, 0xd7, 0x00),
            },
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn text_style(&self, role: Role) -> Style {
        let base = self.base_style();
        match role {
            Role::Body => base,
            Role::Heading => base.add_modifier(Modifier::BOLD),
            Role::Muted => base.fg(self.muted),
            Role::Link => base.add_modifier(Modifier::UNDERLINED),
            Role::Number => base.fg(INDIGO).add_modifier(Modifier::BOLD),
            Role::Badge => Style::default()
                .bg(LIME)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Link under the pointer.
    pub fn hover_style(&self) -> Style {
        self.base_style().fg(LIME).add_modifier(Modifier::BOLD)
    }

    pub fn cursor_style(&self) -> Style {
        Style::default().fg(self.cursor)
    }

    pub fn arrow_style(&self) -> Style {
        Style::default().fg(ARROW_RED).add_modifier(Modifier::BOLD)
    }

    /// Border of a letter while it is being dragged.
    pub fn affordance_style(&self) -> Style {
        Style::default().fg(LIME).bg(self.bg).add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    /// The intro always plays on black.
    pub fn intro_style() -> Style {
        Style::default().bg(Color::Black).fg(Color::White)
    }
}
