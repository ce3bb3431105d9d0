//! Highlight interaction: which single line is emphasized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chart::types::SeriesGroup;

/// Opacity of everything that does not belong to the active line.
pub const INACTIVE_OPACITY: f64 = 0.3;
pub const ACTIVE_OPACITY: f64 = 1.0;

/// How the user points at lines. Resolved once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Hover highlights, leaving clears.
    Pointer,
    /// No hover available: clicks toggle.
    Touch,
}

/// Configured preference; `Auto` defers to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModePreference {
    #[default]
    Auto,
    Pointer,
    Touch,
}

impl InputModePreference {
    pub fn resolve(self, supports_hover: bool) -> InputMode {
        match self {
            Self::Pointer => InputMode::Pointer,
            Self::Touch => InputMode::Touch,
            Self::Auto if supports_hover => InputMode::Pointer,
            Self::Auto => InputMode::Touch,
        }
    }
}

impl FromStr for InputModePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "pointer" | "mouse" => Ok(Self::Pointer),
            "touch" => Ok(Self::Touch),
            other => Err(format!("unknown input mode '{}' (auto, pointer, touch)", other)),
        }
    }
}

impl fmt::Display for InputModePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Pointer => "pointer",
            Self::Touch => "touch",
        };
        f.write_str(s)
    }
}

/// Pointer interaction with a named line or legend entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(String),
    Leave,
    Click(String),
}

/// Styling of a legend entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegendStyle {
    pub uppercase: bool,
    pub underline: bool,
}

/// At most one active line; `None` is the neutral state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    active: Option<String>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_neutral(&self) -> bool {
        self.active.is_none()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Apply an event under `mode`. Returns true if the state changed.
    pub fn handle(&mut self, mode: InputMode, event: PointerEvent) -> bool {
        let before = self.active.clone();
        match (mode, event) {
            (InputMode::Pointer, PointerEvent::Enter(name)) => self.active = Some(name),
            (InputMode::Pointer, PointerEvent::Leave) => self.active = None,
            (InputMode::Touch, PointerEvent::Click(name)) => {
                if self.is_active(&name) {
                    self.active = None;
                } else {
                    self.active = Some(name);
                }
            }
            // Hover does not exist on touch; clicks do nothing in pointer mode.
            _ => {}
        }
        before != self.active
    }

    /// Opacity of a line (or anything owned by it).
    pub fn line_opacity(&self, name: &str) -> f64 {
        match &self.active {
            Some(active) if active != name => INACTIVE_OPACITY,
            _ => ACTIVE_OPACITY,
        }
    }

    /// The main axis is dimmed unless the main line is active.
    pub fn main_axis_opacity(&self, group: &SeriesGroup) -> f64 {
        self.line_opacity(group.main.line.name())
    }

    /// The dependency axis is dimmed unless a dependency line is active.
    pub fn dependency_axis_opacity(&self, group: &SeriesGroup) -> f64 {
        match &self.active {
            Some(active) if !group.dependencies.contains(active) => INACTIVE_OPACITY,
            _ => ACTIVE_OPACITY,
        }
    }

    pub fn legend_style(&self, name: &str) -> LegendStyle {
        let on = self.is_active(name);
        LegendStyle {
            uppercase: on,
            underline: on,
        }
    }
}
