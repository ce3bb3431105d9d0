//! Paints a `Drawing` onto a ratatui canvas and maps mouse cells back to chart pixels.
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::Frame;

use crate::chart::render::{Drawing, HAlign, LegendEntry, Shape, VAlign};
use crate::tui::theme::{faded, Theme};

const LEGEND_MAIN_GLYPH: &str = "··· ";
const LEGEND_DEPENDENCY_GLYPH: &str = "── ";
const LEGEND_SPACING: u16 = 3;

/// Columns `[start, end)` of a legend entry in its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendSpan {
    pub start: u16,
    pub end: u16,
    pub name: String,
}

/// Render the legend row. Returns the column span of each entry.
pub fn render_legend(frame: &mut Frame, area: Rect, legend: &[LegendEntry]) -> Vec<LegendSpan> {
    let mut spans = Vec::new();
    let mut hits = Vec::new();
    let mut col = area.x;
    for entry in legend {
        let glyph = match entry.role {
            crate::chart::types::ColorRole::Main => LEGEND_MAIN_GLYPH,
            crate::chart::types::ColorRole::Dependency => LEGEND_DEPENDENCY_GLYPH,
        };
        let text = format!("{}{}", glyph, entry.display_name());
        let mut style = Style::default().fg(faded(entry.color, 1.0));
        if entry.style.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        let width = text.chars().count() as u16;
        hits.push(LegendSpan {
            start: col,
            end: col.saturating_add(width),
            name: entry.name.clone(),
        });
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" ".repeat(LEGEND_SPACING as usize)));
        col = col.saturating_add(width + LEGEND_SPACING);
    }
    frame.render_widget(Line::from(spans), area);
    hits
}

/// Name of the legend entry at column `col`.
pub fn legend_hit(spans: &[LegendSpan], col: u16) -> Option<&str> {
    spans
        .iter()
        .find(|s| col >= s.start && col < s.end)
        .map(|s| s.name.as_str())
}

/// Paint axes, ticks, labels and lines. Legend text is rendered separately.
pub fn render_canvas(frame: &mut Frame, area: Rect, drawing: &Drawing) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let width = drawing.width as f64;
    let height = drawing.height as f64;
    let cell_width = width / area.width as f64;
    let canvas = Canvas::default()
        .background_color(Theme::background())
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| paint(ctx, drawing, height, cell_width));
    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context, drawing: &Drawing, height: f64, cell_width: f64) {
    for shape in &drawing.shapes {
        match shape {
            Shape::Path { points, stroke, .. } => {
                let color = faded(stroke.color, stroke.opacity);
                match points.as_slice() {
                    [] => {}
                    [(x, y)] => ctx.draw(&Points {
                        coords: &[(*x, height - *y)],
                        color,
                    }),
                    _ => {
                        for w in points.windows(2) {
                            ctx.draw(&CanvasLine {
                                x1: w[0].0,
                                y1: height - w[0].1,
                                x2: w[1].0,
                                y2: height - w[1].1,
                                color,
                            });
                        }
                    }
                }
            }
            Shape::Text {
                owner: None,
                position,
                content,
                color,
                opacity,
                align,
                ..
            } => {
                let text_width = content.chars().count() as f64 * cell_width;
                let x = match align.0 {
                    HAlign::Left => position.0,
                    HAlign::Center => position.0 - text_width / 2.0,
                    HAlign::Right => position.0 - text_width,
                };
                let y = match align.1 {
                    VAlign::Top | VAlign::Middle => position.1,
                    VAlign::Bottom => position.1 - cell_width,
                };
                ctx.print(
                    x.max(0.0),
                    (height - y).max(0.0),
                    Span::styled(content.clone(), Style::default().fg(faded(*color, *opacity))),
                );
            }
            Shape::Text { .. } => {}
        }
    }
}

/// Chart pixel at the center of terminal cell `(col, row)` inside `area`.
pub fn cell_to_chart(area: Rect, drawing: &Drawing, col: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0
        || area.height == 0
        || col < area.x
        || row < area.y
        || col >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let x = (col - area.x) as f64 + 0.5;
    let y = (row - area.y) as f64 + 0.5;
    Some((
        x * drawing.width as f64 / area.width as f64,
        y * drawing.height as f64 / area.height as f64,
    ))
}

/// Hit tolerance: about one cell in chart pixels.
pub fn cell_tolerance(area: Rect, drawing: &Drawing) -> f64 {
    let w = drawing.width as f64 / area.width.max(1) as f64;
    let h = drawing.height as f64 / area.height.max(1) as f64;
    w.max(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::highlight::HighlightState;
    use crate::chart::layout::ChartConfig;
    use crate::chart::render_chart;
    use crate::chart::types::{DownloadPoint, PackageSeries};
    use chrono::NaiveDate;

    fn drawing() -> Drawing {
        let d = |n| NaiveDate::from_ymd_opt(2024, 1, n).unwrap();
        let main = PackageSeries::new(
            "d3",
            d(1),
            d(2),
            vec![DownloadPoint::new(d(1), 1), DownloadPoint::new(d(2), 2)],
        )
        .unwrap();
        render_chart(&main, &[], &HighlightState::new(), &ChartConfig::default()).unwrap()
    }

    #[test]
    fn test_cell_to_chart_bounds() {
        let area = Rect::new(10, 5, 70, 30);
        let drawing = drawing();
        assert_eq!(cell_to_chart(area, &drawing, 9, 6), None);
        assert_eq!(cell_to_chart(area, &drawing, 80, 6), None);
        assert_eq!(cell_to_chart(area, &drawing, 10, 5), Some((5.0, 5.0)));
        assert_eq!(cell_to_chart(area, &drawing, 79, 34), Some((695.0, 295.0)));
        assert_eq!(cell_tolerance(area, &drawing), 10.0);
    }

    #[test]
    fn test_legend_hit() {
        let spans = vec![
            LegendSpan { start: 2, end: 8, name: "d3".into() },
            LegendSpan { start: 11, end: 20, name: "victory".into() },
        ];
        assert_eq!(legend_hit(&spans, 2), Some("d3"));
        assert_eq!(legend_hit(&spans, 8), None);
        assert_eq!(legend_hit(&spans, 19), Some("victory"));
    }
}
