//! Chart geometry: margins, axis domains, tick selection and value-to-pixel scales.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::chart::types::*;
use crate::error::{Error, Result};

/// Widths above this get denser time labels and smaller fonts.
pub const CHART_BREAKPOINT: u32 = 500;
pub const LABELED_TICK_SIZE: f64 = 10.0;
pub const UNLABELED_TICK_SIZE: f64 = 5.0;
/// Approximate number of ticks on each Y axis.
const Y_TICK_COUNT: usize = 5;
/// Largest accepted width or height, in pixels.
pub const MAX_CHART_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 100.0,
            bottom: 30.0,
            left: 100.0,
        }
    }
}

/// Size and scaling options of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub margin: Margin,
    pub width: u32,
    pub height: u32,
    /// Compresses the dependency lines below the main line's amplitude. In (0, 1].
    pub dependencies_scale: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            dependencies_scale: DEFAULT_DEPENDENCIES_SCALE,
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<()> {
        let s = self.dependencies_scale;
        if !s.is_finite() || s <= 0.0 || s > 1.0 {
            return Err(Error::invalid_input(format!(
                "dependencies_scale must be in (0, 1], got {}",
                s
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_input("chart size must be non-zero"));
        }
        if self.width > MAX_CHART_SIZE || self.height > MAX_CHART_SIZE {
            return Err(Error::invalid_input(format!(
                "chart size {}x{} exceeds {} pixels",
                self.width, self.height, MAX_CHART_SIZE
            )));
        }
        Ok(())
    }

    pub fn tick_modulo(&self) -> usize {
        if self.width > CHART_BREAKPOINT {
            5
        } else {
            10
        }
    }

    pub fn font_size(&self) -> f64 {
        if self.width > CHART_BREAKPOINT {
            12.0
        } else {
            19.0
        }
    }

    /// Plot area inside the margins, clamped to at least one pixel each way.
    pub fn plot_area(&self) -> PlotArea {
        let m = &self.margin;
        let left = m.left.min(self.width as f64 - 1.0).max(0.0);
        let top = m.top.min(self.height as f64 - 1.0).max(0.0);
        let right = (self.width as f64 - m.right).max(left + 1.0);
        let bottom = (self.height as f64 - m.bottom).max(top + 1.0);
        PlotArea { left, top, right, bottom }
    }
}

/// Pixel rectangle the lines are drawn into. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Closed numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the domain, 0.0 for a degenerate domain.
    pub fn fraction(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 || !span.is_finite() {
            0.0
        } else {
            (value - self.min) / span
        }
    }
}

pub fn main_domain(group: &SeriesGroup) -> Domain {
    Domain::new(0.0, group.main.max_y as f64)
}

/// Dividing by a scale below 1 widens the domain, so dependency lines sit lower.
pub fn dependency_domain(group: &SeriesGroup) -> Domain {
    Domain::new(0.0, group.dependencies.max_y as f64 / group.dependencies_scale)
}

/// Shared time domain, in days since the window start.
pub fn time_domain(group: &SeriesGroup) -> Domain {
    let days = (group.main.max_x - group.main.min_x).num_days();
    Domain::new(0.0, days as f64)
}

/// Maps data values to pixels for one axis pairing.
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub area: PlotArea,
    pub origin: NaiveDate,
    pub x: Domain,
    pub y: Domain,
}

impl Scale {
    pub fn x_px(&self, day: NaiveDate) -> f64 {
        let offset = (day - self.origin).num_days() as f64;
        self.area.left + self.x.fraction(offset) * (self.area.right - self.area.left)
    }

    pub fn y_px(&self, value: f64) -> f64 {
        self.area.bottom - self.y.fraction(value) * (self.area.bottom - self.area.top)
    }
}

/// A time-axis tick. Unlabeled ticks are drawn shorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub value: NaiveDate,
    pub label: Option<String>,
}

impl Tick {
    pub fn size(&self) -> f64 {
        if self.label.is_some() {
            LABELED_TICK_SIZE
        } else {
            UNLABELED_TICK_SIZE
        }
    }
}

/// One tick per point; first, last and every `modulo`-th point get a label.
pub fn time_ticks(points: &[LinePoint], modulo: usize) -> Vec<Tick> {
    let modulo = modulo.max(1);
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let labeled = index == 0 || index == last || index % modulo == 0;
            Tick {
                value: p.x,
                label: labeled.then(|| format!("{}/{}", p.x.month(), p.x.day())),
            }
        })
        .collect()
}

/// Round tick values covering `domain`, steps of 1, 2 or 5 times a power of ten.
pub fn value_ticks(domain: Domain) -> Vec<f64> {
    let span = domain.span();
    if span <= 0.0 || !span.is_finite() {
        return vec![domain.min];
    }
    let raw = span / Y_TICK_COUNT as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (domain.min / step).ceil() as i64;
    let last = (domain.max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Compact download count: `950`, `1.5k`, `12M`.
pub fn format_count(value: f64) -> String {
    let (scaled, suffix) = if value >= 1e9 {
        (value / 1e9, "G")
    } else if value >= 1e6 {
        (value / 1e6, "M")
    } else if value >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    let text = if scaled.fract().abs() < 1e-9 {
        format!("{}", scaled as i64)
    } else {
        format!("{:.1}", scaled)
    };
    format!("{}{}", text, suffix)
}
