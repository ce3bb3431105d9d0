//! The dashboard: preset selection, load lifecycle and per-chart highlights.
//!
//! Loads are issued through [`Dashboard::begin_load`] and answered through
//! [`Dashboard::complete`]. Only the answer to the most recent request is applied.

pub mod presets;

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::chart::highlight::{HighlightState, InputMode, PointerEvent};
use crate::chart::layout::ChartConfig;
use crate::chart::color::ColorCache;
use crate::chart::normalize::{normalize, normalize_with};
use crate::chart::render::{render, Drawing};
use crate::chart::types::{PackageSeries, SeriesGroup};
use crate::error::{Error, Result};
use crate::loader::{LoadResponse, RequestTag, SeriesMap};
use presets::{title_for, Preset};

/// Window widths above this get a fixed-size chart.
pub const WINDOW_BREAKPOINT: u32 = 750;
const WINDOW_PADDING: u32 = 90;

/// Chart width for a host window of `window_width` pixels.
pub fn chart_width(window_width: u32) -> u32 {
    if window_width > WINDOW_BREAKPOINT {
        WINDOW_BREAKPOINT - WINDOW_PADDING
    } else {
        window_width.saturating_sub(WINDOW_PADDING)
    }
}

/// Data of one chart, series renamed to their display titles.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInput {
    pub main: PackageSeries,
    pub dependencies: Vec<PackageSeries>,
}

impl ChartInput {
    pub fn group(&self, dependencies_scale: f64) -> Result<SeriesGroup> {
        normalize(&self.main, &self.dependencies, dependencies_scale)
    }
}

/// Build the chart inputs of `preset` from loaded data.
pub fn charts_for(preset: &Preset, data: &SeriesMap) -> Result<Vec<ChartInput>> {
    let lookup = |id: &str| {
        data.get(id)
            .map(|s| s.renamed(title_for(id)))
            .ok_or_else(|| Error::invalid_input(format!("loaded data has no series for '{}'", id)))
    };
    preset
        .charts
        .iter()
        .map(|spec| {
            Ok(ChartInput {
                main: lookup(&spec.main)?,
                dependencies: spec
                    .dependencies
                    .iter()
                    .map(|d| lookup(d))
                    .collect::<Result<Vec<_>>>()?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// A request is in flight; charts from the previous load stay visible.
    Loading { previous: Vec<ChartInput> },
    Ready(Vec<ChartInput>),
    Failed,
}

pub struct Dashboard {
    presets: Vec<Preset>,
    selector: String,
    state: LoadState,
    pending: Option<RequestTag>,
    next_seq: u64,
    highlights: Vec<HighlightState>,
    /// Normalized form of the charts on screen, built once per load.
    groups: Vec<SeriesGroup>,
    colors: ColorCache,
    config: ChartConfig,
}

impl Dashboard {
    /// `selector` defaults to the first preset.
    pub fn new(presets: Vec<Preset>, selector: Option<&str>, config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let first = presets
            .first()
            .map(|p| p.name.clone())
            .ok_or_else(|| Error::invalid_input("no presets configured"))?;
        let selector = match selector {
            Some(name) if presets.iter().any(|p| p.name == name) => name.to_string(),
            Some(name) => return Err(Error::invalid_input(format!("unknown preset '{}'", name))),
            None => first,
        };
        Ok(Self {
            presets,
            selector,
            state: LoadState::Loading { previous: Vec::new() },
            pending: None,
            next_seq: 0,
            highlights: Vec::new(),
            groups: Vec::new(),
            colors: ColorCache::default(),
            config,
        })
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn set_width(&mut self, width: u32) {
        if width > 0 {
            self.config.width = width;
        }
    }

    pub fn pending(&self) -> Option<&RequestTag> {
        self.pending.as_ref()
    }

    pub fn preset(&self) -> &Preset {
        // The selector always names an existing preset.
        self.presets
            .iter()
            .find(|p| p.name == self.selector)
            .unwrap_or(&self.presets[0])
    }

    /// Start a load of the current preset. Clears all highlights.
    pub fn begin_load(&mut self) -> (RequestTag, BTreeSet<String>) {
        self.next_seq += 1;
        let tag = RequestTag {
            selector: self.selector.clone(),
            seq: self.next_seq,
        };
        let previous = match std::mem::replace(&mut self.state, LoadState::Failed) {
            LoadState::Ready(charts) => charts,
            LoadState::Loading { previous } => previous,
            LoadState::Failed => Vec::new(),
        };
        self.state = LoadState::Loading { previous };
        for h in &mut self.highlights {
            h.clear();
        }
        self.pending = Some(tag.clone());
        info!(%tag, "loading preset");
        (tag, self.preset().flatten().into_iter().collect())
    }

    /// Switch preset. `None` if unchanged or unknown.
    pub fn select(&mut self, name: &str) -> Option<(RequestTag, BTreeSet<String>)> {
        if name == self.selector || !self.presets.iter().any(|p| p.name == name) {
            return None;
        }
        self.selector = name.to_string();
        Some(self.begin_load())
    }

    /// Select the preset `offset` positions away, wrapping around.
    pub fn cycle(&mut self, offset: isize) -> Option<(RequestTag, BTreeSet<String>)> {
        let len = self.presets.len() as isize;
        let current = self
            .presets
            .iter()
            .position(|p| p.name == self.selector)
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        let name = self.presets[next].name.clone();
        self.select(&name)
    }

    /// Manual retry after a failure (or a forced reload).
    pub fn retry(&mut self) -> (RequestTag, BTreeSet<String>) {
        self.begin_load()
    }

    /// Apply a finished load. Returns false if the response was stale.
    pub fn complete(&mut self, response: LoadResponse) -> bool {
        if self.pending.as_ref() != Some(&response.tag) {
            debug!(tag = %response.tag, "discarding stale load response");
            return false;
        }
        self.pending = None;
        let outcome = response
            .result
            .map_err(Error::from)
            .and_then(|data| charts_for(self.preset(), &data))
            .and_then(|charts| {
                let scale = self.config.dependencies_scale;
                let groups = charts
                    .iter()
                    .map(|c| normalize_with(&c.main, &c.dependencies, scale, &mut self.colors))
                    .collect::<Result<Vec<_>>>()?;
                Ok((charts, groups))
            });
        self.state = match outcome {
            Ok((charts, groups)) => {
                info!(tag = %response.tag, charts = charts.len(), "preset loaded");
                self.highlights = vec![HighlightState::new(); charts.len()];
                self.groups = groups;
                LoadState::Ready(charts)
            }
            Err(e) => {
                warn!(tag = %response.tag, error = %e, "an error occurred while loading data");
                self.highlights.clear();
                self.groups.clear();
                LoadState::Failed
            }
        };
        true
    }

    /// Charts currently on screen, including those kept during a reload.
    pub fn charts(&self) -> &[ChartInput] {
        match &self.state {
            LoadState::Ready(charts) => charts,
            LoadState::Loading { previous } => previous,
            LoadState::Failed => &[],
        }
    }

    pub fn highlight(&self, index: usize) -> Option<&HighlightState> {
        self.highlights.get(index)
    }

    /// Route a pointer event to chart `index`. Returns true if the highlight changed.
    pub fn handle_pointer(&mut self, index: usize, mode: InputMode, event: PointerEvent) -> bool {
        match self.highlights.get_mut(index) {
            Some(h) => h.handle(mode, event),
            None => false,
        }
    }

    /// Render chart `index` with its current highlight.
    pub fn drawing(&self, index: usize) -> Option<Result<Drawing>> {
        let group = self.groups.get(index)?;
        let neutral = HighlightState::new();
        let highlight = self.highlights.get(index).unwrap_or(&neutral);
        Some(render(group, highlight, &self.config))
    }

    /// "from <start> to <end>" of the first chart's main series.
    pub fn period(&self) -> Option<String> {
        let main = &self.charts().first()?.main;
        Some(format!(
            "from {} to {}",
            main.start.format("%a %b %d %Y"),
            main.end.format("%a %b %d %Y")
        ))
    }
}
