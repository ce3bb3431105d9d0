use ratatui::style::{Color, Modifier, Style};

use crate::chart::render::BG_COLOR;
use crate::chart::types::Rgb;

pub struct Theme;

impl Theme {
    pub fn status_bar() -> Style {
        Style::default()
            .fg(Color::Reset)
            .bg(Color::DarkGray)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn tab_selected() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_banner() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn placeholder() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn hint() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn background() -> Color {
        rgb(BG_COLOR)
    }
}

/// Terminal color for `color` drawn at `opacity` over the chart background.
pub fn faded(color: Rgb, opacity: f64) -> Color {
    rgb(color.over(BG_COLOR, opacity))
}

pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}
