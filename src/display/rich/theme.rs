use ratatui::style::{Color, Modifier, Style};

use crate::protocol::ItemStatus;

pub struct BrandColors;

impl BrandColors {
    pub const CYAN: Color = Color::Rgb(0, 217, 255);
    pub const PURPLE: Color = Color::Rgb(167, 139, 250);
    pub const GREEN: Color = Color::Rgb(16, 185, 129);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const GRAY: Color = Color::Rgb(107, 114, 128);
    pub const OFF_WHITE: Color = Color::Rgb(184, 184, 184);
}

pub struct BoxChars;

impl BoxChars {
    pub const ROUND_TOP_LEFT: &'static str = "╭";
    pub const ROUND_TOP_RIGHT: &'static str = "╮";
    pub const ROUND_BOTTOM_LEFT: &'static str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &'static str = "╯";
    pub const HORIZONTAL: &'static str = "─";
    pub const VERTICAL: &'static str = "│";
    pub const DIVIDER_LIGHT: &'static str = "┄";
    pub const QUOTE: &'static str = "▏";
}

pub struct Spinners;

impl Spinners {
    pub const CIRCLES: &'static [&'static str] = &["◐", "◓", "◑", "◒"];
}

pub struct Theme;

impl Theme {
    #[must_use]
    pub const fn primary() -> Style {
        Style::new().fg(BrandColors::CYAN)
    }

    #[must_use]
    pub const fn secondary() -> Style {
        Style::new().fg(BrandColors::PURPLE)
    }

    #[must_use]
    pub const fn success() -> Style {
        Style::new().fg(BrandColors::GREEN)
    }

    #[must_use]
    pub const fn warning() -> Style {
        Style::new().fg(BrandColors::AMBER)
    }

    #[must_use]
    pub const fn error() -> Style {
        Style::new().fg(BrandColors::RED)
    }

    #[must_use]
    pub const fn muted() -> Style {
        Style::new().fg(BrandColors::GRAY)
    }

    #[must_use]
    pub const fn reasoning() -> Style {
        Style::new()
            .fg(BrandColors::GRAY)
            .add_modifier(Modifier::ITALIC)
    }

    #[must_use]
    pub const fn text() -> Style {
        Style::new().fg(BrandColors::OFF_WHITE)
    }

    #[must_use]
    pub const fn primary_bold() -> Style {
        Style::new()
            .fg(BrandColors::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    /// Card colour for an item status.
    #[must_use]
    pub const fn status(status: ItemStatus) -> Style {
        match status {
            ItemStatus::Completed => Self::success(),
            ItemStatus::Failed => Self::error(),
            ItemStatus::Incomplete | ItemStatus::Unknown => Self::warning(),
            ItemStatus::InProgress
            | ItemStatus::Searching
            | ItemStatus::Interpreting
            | ItemStatus::Generating => Self::primary(),
        }
    }
}

/// Glyph shown in a tool card title: a spinner while running, a short
/// word once done.
#[must_use]
pub fn status_glyph(status: ItemStatus, frame: usize) -> &'static str {
    match status {
        ItemStatus::Completed => "ok",
        ItemStatus::Failed => "err",
        ItemStatus::Incomplete => "--",
        ItemStatus::Unknown => "??",
        ItemStatus::InProgress
        | ItemStatus::Searching
        | ItemStatus::Interpreting
        | ItemStatus::Generating => Spinners::CIRCLES[frame % Spinners::CIRCLES.len()],
    }
}
