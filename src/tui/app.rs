use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use ratatui::Frame;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::chart::highlight::{InputMode, PointerEvent};
use crate::dashboard::{chart_width, Dashboard, LoadState};
use crate::export::write_drawings;
use crate::loader::LoadWorker;
use crate::tui::chart_view::{cell_tolerance, cell_to_chart, legend_hit, render_canvas, render_legend, LegendSpan};
use crate::tui::event::is_quit;
use crate::tui::help::{HelpPanel, HELP_SECTIONS};
use crate::tui::status::render_status_bar;
use crate::tui::theme::Theme;

/// Approximate pixel width of one terminal column.
pub const CELL_PX: u32 = 8;
const EXPORT_FILE: &str = "npmcharts.svg";

/// Screen regions of one chart from the last frame, for mouse hit testing.
#[derive(Debug, Clone)]
struct ChartArea {
    index: usize,
    legend_row: Rect,
    legend: Vec<LegendSpan>,
    canvas: Rect,
}

pub struct App {
    pub dashboard: Dashboard,
    pub worker: LoadWorker,
    pub input_mode: InputMode,
    pub help: HelpPanel,
    pub should_quit: bool,
    pub message: Option<String>,
    chart_areas: Vec<ChartArea>,
    banner: Option<Rect>,
}

impl App {
    pub fn new(dashboard: Dashboard, worker: LoadWorker, input_mode: InputMode) -> Self {
        Self {
            dashboard,
            worker,
            input_mode,
            help: HelpPanel::new(),
            should_quit: false,
            message: None,
            chart_areas: Vec::new(),
            banner: None,
        }
    }

    /// Kick off the initial load.
    pub fn start(&mut self) {
        let (tag, names) = self.dashboard.begin_load();
        self.worker.request(tag, names);
    }

    /// Apply finished loads. Returns true if anything changed.
    pub fn drain_loads(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.worker.poll() {
            changed |= self.dashboard.complete(response);
        }
        changed
    }

    /// Terminal was resized to `cols` columns.
    pub fn resize(&mut self, cols: u16) {
        self.dashboard.set_width(chart_width(cols as u32 * CELL_PX));
    }

    fn reload(&mut self) {
        let (tag, names) = self.dashboard.retry();
        self.worker.request(tag, names);
    }

    fn cycle_preset(&mut self, offset: isize) {
        if let Some((tag, names)) = self.dashboard.cycle(offset) {
            self.message = None;
            self.worker.request(tag, names);
        }
    }

    /// Handle a key event. Returns true if the screen should be redrawn.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.help.visible {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.help.toggle();
            }
            return true;
        }
        if is_quit(&key) {
            self.should_quit = true;
            return false;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Right => self.cycle_preset(1),
            KeyCode::BackTab | KeyCode::Left => self.cycle_preset(-1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('?') => self.help.toggle(),
            _ => return false,
        }
        true
    }

    /// Handle a mouse event. Returns true if the screen should be redrawn.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Moved if self.input_mode == InputMode::Pointer => {
                let target = self.target_at(mouse.column, mouse.row);
                self.hover(target)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.banner.is_some_and(|r| contains(r, mouse.column, mouse.row)) {
                    self.reload();
                    return true;
                }
                if self.input_mode != InputMode::Touch {
                    return false;
                }
                match self.target_at(mouse.column, mouse.row) {
                    Some((index, name)) => {
                        self.dashboard
                            .handle_pointer(index, InputMode::Touch, PointerEvent::Click(name))
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Highlight `target` and clear every other chart.
    fn hover(&mut self, target: Option<(usize, String)>) -> bool {
        let mut changed = false;
        for index in 0..self.dashboard.charts().len() {
            let event = match &target {
                Some((i, name)) if *i == index => PointerEvent::Enter(name.clone()),
                _ => PointerEvent::Leave,
            };
            changed |= self.dashboard.handle_pointer(index, InputMode::Pointer, event);
        }
        changed
    }

    /// Chart index and line name under terminal cell `(col, row)`.
    fn target_at(&self, col: u16, row: u16) -> Option<(usize, String)> {
        for area in &self.chart_areas {
            if contains(area.legend_row, col, row) {
                return legend_hit(&area.legend, col).map(|name| (area.index, name.to_string()));
            }
            if contains(area.canvas, col, row) {
                let drawing = self.dashboard.drawing(area.index)?.ok()?;
                let (x, y) = cell_to_chart(area.canvas, &drawing, col, row)?;
                let tolerance = cell_tolerance(area.canvas, &drawing);
                return drawing
                    .line_at(x, y, tolerance)
                    .map(|name| (area.index, name.to_string()));
            }
        }
        None
    }

    fn export(&mut self) {
        let drawings: Vec<_> = (0..self.dashboard.charts().len())
            .filter_map(|i| self.dashboard.drawing(i))
            .filter_map(|d| d.ok())
            .collect();
        if drawings.is_empty() {
            self.message = Some("nothing to export".to_string());
            return;
        }
        self.message = Some(match write_drawings(&PathBuf::from(EXPORT_FILE), &drawings) {
            Ok(paths) => {
                info!(files = paths.len(), "exported from the terminal");
                format!("exported {} chart(s)", paths.len())
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("export failed: {}", e)
            }
        });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let banner_height = if *self.dashboard.state() == LoadState::Failed { 1 } else { 0 };
        let outer = Layout::vertical([
            Constraint::Length(1),             // Title
            Constraint::Length(1),             // Preset tabs
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(5),                // Charts
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

        self.render_title(frame, outer[0]);
        self.render_tabs(frame, outer[1]);
        self.banner = None;
        if banner_height > 0 {
            self.render_banner(frame, outer[2]);
        }
        self.render_charts(frame, outer[3]);

        let mode = match self.input_mode {
            InputMode::Pointer => "hover",
            InputMode::Touch => "click",
        };
        let left = match (self.dashboard.state(), &self.message) {
            (LoadState::Loading { .. }, _) => "Loading ...".to_string(),
            (_, Some(message)) => message.clone(),
            _ => String::new(),
        };
        render_status_bar(frame, outer[4], &left, &format!("{} | ? help", mode));

        if self.help.visible {
            self.render_help(frame, frame.area());
        }
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" Npm downloads", Theme::title())];
        if let Some(period) = self.dashboard.period() {
            spans.push(Span::raw(" - "));
            spans.push(Span::styled(period, Style::default().add_modifier(Modifier::BOLD)));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let names: Vec<&str> = self.dashboard.presets().iter().map(|p| p.name.as_str()).collect();
        let selected = names
            .iter()
            .position(|n| *n == self.dashboard.selector())
            .unwrap_or(0);
        let tabs = Tabs::new(names)
            .select(selected)
            .style(Theme::tab())
            .highlight_style(Theme::tab_selected());
        frame.render_widget(tabs, area);
    }

    fn render_banner(&mut self, frame: &mut Frame, area: Rect) {
        let text = " ! An error occurred while loading data - press r or click here to retry";
        frame.render_widget(Paragraph::new(text).style(Theme::error_banner()), area);
        self.banner = Some(area);
    }

    fn render_charts(&mut self, frame: &mut Frame, area: Rect) {
        self.chart_areas.clear();
        let count = self.dashboard.charts().len();
        if count == 0 {
            let text = match self.dashboard.state() {
                LoadState::Failed => "",
                _ => "Loading ...",
            };
            let placeholder = Paragraph::new(text)
                .style(Theme::placeholder())
                .centered();
            frame.render_widget(placeholder, area);
            return;
        }

        let rows = Layout::vertical(vec![Constraint::Ratio(1, count as u32); count]).split(area);
        for (index, row) in rows.iter().enumerate() {
            let Some(Ok(drawing)) = self.dashboard.drawing(index) else {
                continue;
            };
            let title = format!(" {} ", self.dashboard.charts()[index].main.name);
            let active = self
                .dashboard
                .highlight(index)
                .is_some_and(|h| !h.is_neutral());
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(if active { Theme::border_focused() } else { Theme::border() })
                .title(Span::styled(title, Theme::title()));
            let inner = block.inner(*row);
            frame.render_widget(block, *row);
            if inner.height < 2 {
                continue;
            }

            let parts = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);
            let legend = render_legend(frame, parts[0], &drawing.legend);
            render_canvas(frame, parts[1], &drawing);
            self.chart_areas.push(ChartArea {
                index,
                legend_row: parts[0],
                legend,
                canvas: parts[1],
            });
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        // 80% of screen, centered
        let w = (area.width * 4 / 5).max(40).min(area.width);
        let h = (area.height * 4 / 5).max(10).min(area.height);
        let x = area.x + (area.width.saturating_sub(w)) / 2;
        let y = area.y + (area.height.saturating_sub(h)) / 2;
        let popup_area = Rect { x, y, width: w, height: h };

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Help - Esc to close ", Theme::title()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines: Vec<Line<'static>> = Vec::new();
        for &(title, content) in HELP_SECTIONS {
            lines.push(Line::from(Span::styled(
                format!(" {} ", title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            for text_line in content.lines() {
                lines.push(Line::from(Span::styled(format!("  {}", text_line), Theme::hint())));
            }
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::layout::ChartConfig;
    use crate::chart::types::{DownloadPoint, PackageSeries};
    use crate::dashboard::presets::default_presets;
    use crate::loader::StaticLoader;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use std::time::Duration;

    fn app(mode: InputMode) -> App {
        let d = |n| NaiveDate::from_ymd_opt(2024, 1, n).unwrap();
        let series = ["*", "d3", "victory", "react-d3", "gulp", "grunt"].map(|name| {
            PackageSeries::new(name, d(1), d(2), vec![DownloadPoint::new(d(1), 3), DownloadPoint::new(d(2), 9)])
                .unwrap()
        });
        let worker = LoadWorker::new(Arc::new(StaticLoader::new(series)));
        let dashboard = Dashboard::new(default_presets(), None, ChartConfig::default()).unwrap();
        let mut app = App::new(dashboard, worker, mode);
        app.start();
        let response = app.worker.wait(Duration::from_secs(5)).unwrap();
        app.dashboard.complete(response);
        app
    }

    fn area(index: usize) -> ChartArea {
        ChartArea {
            index,
            legend_row: Rect::new(0, 0, 40, 1),
            legend: vec![LegendSpan { start: 0, end: 10, name: "d3".into() }],
            canvas: Rect::new(0, 1, 70, 30),
        }
    }

    #[test]
    fn test_pointer_hover_via_legend() {
        let mut app = app(InputMode::Pointer);
        app.chart_areas = vec![area(1)];
        let moved = |col, row| MouseEvent {
            kind: MouseEventKind::Moved,
            column: col,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert!(app.handle_mouse(moved(3, 0)));
        assert_eq!(app.dashboard.highlight(1).unwrap().active(), Some("d3"));
        assert!(app.handle_mouse(moved(30, 0)));
        assert!(app.dashboard.highlight(1).unwrap().is_neutral());
    }

    #[test]
    fn test_pointer_hover_via_canvas() {
        let mut app = app(InputMode::Pointer);
        app.chart_areas = vec![area(1)];
        // Cell (10, 1) is chart pixel (105, 5): the "d3" legend box in the top margin.
        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 10,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        assert!(app.handle_mouse(moved));
        assert_eq!(app.dashboard.highlight(1).unwrap().active(), Some("d3"));
    }

    #[test]
    fn test_touch_click_toggles() {
        let mut app = app(InputMode::Touch);
        app.chart_areas = vec![area(1)];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert!(app.handle_mouse(click));
        assert_eq!(app.dashboard.highlight(1).unwrap().active(), Some("d3"));
        assert!(app.handle_mouse(click));
        assert!(app.dashboard.highlight(1).unwrap().is_neutral());
    }

    #[test]
    fn test_tab_switches_preset() {
        let mut app = app(InputMode::Pointer);
        assert!(app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert_eq!(app.dashboard.selector(), "Task runners");
        let response = app.worker.wait(Duration::from_secs(5)).unwrap();
        assert!(app.dashboard.complete(response));
        assert_eq!(app.dashboard.charts().len(), 1);
    }

    #[test]
    fn test_quit() {
        let mut app = app(InputMode::Pointer);
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[test]
    fn test_resize_sets_chart_width() {
        let mut app = app(InputMode::Pointer);
        app.resize(200);
        assert_eq!(app.dashboard.config().width, 660);
        app.resize(50);
        assert_eq!(app.dashboard.config().width, 310);
    }
}
