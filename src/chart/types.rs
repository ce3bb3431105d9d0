/// Series and chart types shared by the normalizer, the layout code and the renderers.
use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Canvas dimensions used when no config overrides them.
pub const DEFAULT_WIDTH: u32 = 700;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_DEPENDENCIES_SCALE: f64 = 0.8;

/// A single day of download counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadPoint {
    pub day: NaiveDate,
    pub downloads: u64,
}

impl DownloadPoint {
    pub fn new(day: NaiveDate, downloads: u64) -> Self {
        Self { day, downloads }
    }
}

/// Downloads of one package over its validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSeries {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Sorted by `day`, strictly ascending.
    pub points: Vec<DownloadPoint>,
}

impl PackageSeries {
    /// Build a series, rejecting an inverted window or out-of-order days.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        points: Vec<DownloadPoint>,
    ) -> Result<Self> {
        let name = name.into();
        if start > end {
            return Err(Error::invalid_input(format!(
                "{}: window start {} is after end {}",
                name, start, end
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].day >= w[1].day) {
            return Err(Error::invalid_input(format!(
                "{}: days not ascending ({} then {})",
                name, pair[0].day, pair[1].day
            )));
        }
        Ok(Self { name, start, end, points })
    }

    /// Same data under a different display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Blend toward `background`; `opacity` 1.0 keeps the color unchanged.
    pub fn over(&self, background: Rgb, opacity: f64) -> Rgb {
        let a = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f64 + (fg as f64 - bg as f64) * a).round() as u8;
        Rgb(mix(self.0, background.0), mix(self.1, background.1), mix(self.2, background.2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Main,
    Dependency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLabel {
    pub name: String,
    pub role: ColorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePoint {
    pub x: NaiveDate,
    pub y: u64,
}

/// One chart-ready polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: LineLabel,
    pub color: Rgb,
    pub points: Vec<LinePoint>,
}

impl Line {
    pub fn name(&self) -> &str {
        &self.label.name
    }
}

/// The primary line plus the X window of the whole chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MainSeries {
    pub line: Line,
    pub min_x: NaiveDate,
    pub max_x: NaiveDate,
    pub min_y: u64,
    pub max_y: u64,
}

/// Comparison lines sharing one Y domain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DependencySeries {
    pub max_y: u64,
    pub lines: Vec<Line>,
}

impl DependencySeries {
    pub fn contains(&self, name: &str) -> bool {
        self.lines.iter().any(|l| l.name() == name)
    }
}

/// Normalized input of one dual-axis chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    pub main: MainSeries,
    pub dependencies: DependencySeries,
    pub dependencies_scale: f64,
}

impl SeriesGroup {
    /// Every line of the chart, main first.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        std::iter::once(&self.main.line).chain(self.dependencies.lines.iter())
    }
}
