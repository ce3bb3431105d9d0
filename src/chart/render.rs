/// Chart rendering: (SeriesGroup, HighlightState, ChartConfig) → drawing instructions.
///
/// The output is backend-agnostic. The terminal view paints it onto a canvas and
/// `export` rasterizes it with plotters.
use crate::chart::color::EMPHASIS_COLOR;
use crate::chart::highlight::{HighlightState, LegendStyle};
use crate::chart::layout::*;
use crate::chart::types::*;
use crate::error::Result;

/// Background color (Catppuccin Mocha base).
pub const BG_COLOR: Rgb = Rgb(30, 30, 46);
/// Axis color.
pub const AXIS_COLOR: Rgb = Rgb(88, 91, 112);
/// Label color.
pub const LABEL_COLOR: Rgb = Rgb(186, 194, 222);

const MAIN_STROKE_WIDTH: f64 = 3.0;
const DEPENDENCY_STROKE_WIDTH: f64 = 1.0;
const MAIN_DASH: Dash = Dash { on: 1.0, off: 7.0 };
const VALUE_TICK_SIZE: f64 = 6.0;
const LABEL_GAP: f64 = 3.0;
const LEGEND_SPACING: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f64,
    pub off: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub opacity: f64,
    pub width: f64,
    pub dash: Option<Dash>,
}

impl Stroke {
    fn solid(color: Rgb, opacity: f64, width: f64) -> Self {
        Self {
            color,
            opacity,
            width,
            dash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// One drawing instruction. Coordinates are pixels, Y grows downward.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path {
        /// Line name for data lines, `None` for axes and ticks.
        owner: Option<String>,
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Text {
        owner: Option<String>,
        position: (f64, f64),
        content: String,
        size: f64,
        color: Rgb,
        opacity: f64,
        align: (HAlign, VAlign),
        underline: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub role: ColorRole,
    pub color: Rgb,
    pub style: LegendStyle,
    /// Bounding box `(x0, y0, x1, y1)` used for hit testing.
    pub bounds: (f64, f64, f64, f64),
}

impl LegendEntry {
    /// Text as displayed, uppercased while active.
    pub fn display_name(&self) -> String {
        if self.style.uppercase {
            self.name.to_uppercase()
        } else {
            self.name.clone()
        }
    }
}

/// Rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub shapes: Vec<Shape>,
    pub legend: Vec<LegendEntry>,
}

impl Drawing {
    /// Name of the legend entry or line under `(x, y)`, if any.
    ///
    /// Legend boxes win; otherwise the nearest line within `tolerance` pixels.
    pub fn line_at(&self, x: f64, y: f64, tolerance: f64) -> Option<&str> {
        self.legend_at(x, y).or_else(|| self.path_at(x, y, tolerance))
    }

    pub fn legend_at(&self, x: f64, y: f64) -> Option<&str> {
        self.legend
            .iter()
            .find(|e| {
                let (x0, y0, x1, y1) = e.bounds;
                x >= x0 && x <= x1 && y >= y0 && y <= y1
            })
            .map(|e| e.name.as_str())
    }

    /// Nearest data line within `tolerance` pixels.
    pub fn path_at(&self, x: f64, y: f64, tolerance: f64) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for shape in &self.shapes {
            if let Shape::Path {
                owner: Some(name),
                points,
                ..
            } = shape
            {
                let d = distance_to_path(points, (x, y));
                if d <= tolerance && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((name, d));
                }
            }
        }
        best.map(|(name, _)| name)
    }
}

/// Render a chart. The dependency domain uses the group's own scale.
pub fn render(group: &SeriesGroup, highlight: &HighlightState, config: &ChartConfig) -> Result<Drawing> {
    config.validate()?;
    let area = config.plot_area();
    let font = config.font_size();
    let x = time_domain(group);
    let main_scale = Scale {
        area,
        origin: group.main.min_x,
        x,
        y: main_domain(group),
    };
    let dep_scale = Scale {
        y: dependency_domain(group),
        ..main_scale
    };

    let mut shapes = Vec::new();
    draw_value_axis(
        &mut shapes,
        &dep_scale,
        area.left,
        -1.0,
        AXIS_COLOR,
        LABEL_COLOR,
        highlight.dependency_axis_opacity(group),
        font,
    );
    draw_value_axis(
        &mut shapes,
        &main_scale,
        area.right,
        1.0,
        EMPHASIS_COLOR,
        EMPHASIS_COLOR,
        highlight.main_axis_opacity(group),
        font,
    );
    draw_time_axis(&mut shapes, &main_scale, group, config, font);

    let main = &group.main.line;
    shapes.push(Shape::Path {
        owner: Some(main.name().to_string()),
        points: project(main, &main_scale),
        stroke: Stroke {
            dash: Some(MAIN_DASH),
            ..Stroke::solid(main.color, highlight.line_opacity(main.name()), MAIN_STROKE_WIDTH)
        },
    });
    for line in &group.dependencies.lines {
        shapes.push(Shape::Path {
            owner: Some(line.name().to_string()),
            points: project(line, &dep_scale),
            stroke: Stroke::solid(line.color, highlight.line_opacity(line.name()), DEPENDENCY_STROKE_WIDTH),
        });
    }

    let legend = layout_legend(&mut shapes, group, highlight, config, font);

    Ok(Drawing {
        width: config.width,
        height: config.height,
        background: BG_COLOR,
        shapes,
        legend,
    })
}

fn project(line: &Line, scale: &Scale) -> Vec<(f64, f64)> {
    line.points
        .iter()
        .map(|p| (scale.x_px(p.x), scale.y_px(p.y as f64)))
        .collect()
}

/// Vertical axis at `x`; `direction` -1 puts ticks and labels on the left.
#[allow(clippy::too_many_arguments)]
fn draw_value_axis(
    shapes: &mut Vec<Shape>,
    scale: &Scale,
    x: f64,
    direction: f64,
    stroke: Rgb,
    label: Rgb,
    opacity: f64,
    font: f64,
) {
    let area = scale.area;
    shapes.push(Shape::Path {
        owner: None,
        points: vec![(x, area.top), (x, area.bottom)],
        stroke: Stroke::solid(stroke, opacity, 1.0),
    });
    let align = if direction < 0.0 { HAlign::Right } else { HAlign::Left };
    for value in value_ticks(scale.y) {
        let y = scale.y_px(value);
        let end = x + direction * VALUE_TICK_SIZE;
        shapes.push(Shape::Path {
            owner: None,
            points: vec![(x, y), (end, y)],
            stroke: Stroke::solid(stroke, opacity, 1.0),
        });
        shapes.push(Shape::Text {
            owner: None,
            position: (end + direction * LABEL_GAP, y),
            content: format_count(value),
            size: font,
            color: label,
            opacity,
            align: (align, VAlign::Middle),
            underline: false,
        });
    }
}

fn draw_time_axis(shapes: &mut Vec<Shape>, scale: &Scale, group: &SeriesGroup, config: &ChartConfig, font: f64) {
    let area = scale.area;
    shapes.push(Shape::Path {
        owner: None,
        points: vec![(area.left, area.bottom), (area.right, area.bottom)],
        stroke: Stroke::solid(AXIS_COLOR, 1.0, 1.0),
    });
    for tick in time_ticks(&group.main.line.points, config.tick_modulo()) {
        let x = scale.x_px(tick.value);
        let size = tick.size();
        shapes.push(Shape::Path {
            owner: None,
            points: vec![(x, area.bottom), (x, area.bottom + size)],
            stroke: Stroke::solid(AXIS_COLOR, 1.0, 1.0),
        });
        if let Some(label) = tick.label {
            shapes.push(Shape::Text {
                owner: None,
                position: (x, area.bottom + size + LABEL_GAP),
                content: label,
                size: font,
                color: LABEL_COLOR,
                opacity: 1.0,
                align: (HAlign::Center, VAlign::Top),
                underline: false,
            });
        }
    }
}

/// Estimated rendered width of `text`.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.6
}

/// Estimated bounding box `(x0, y0, x1, y1)` of a text shape.
pub fn text_bounds(position: (f64, f64), content: &str, size: f64, align: (HAlign, VAlign)) -> (f64, f64, f64, f64) {
    let width = text_width(content, size);
    let x0 = match align.0 {
        HAlign::Left => position.0,
        HAlign::Center => position.0 - width / 2.0,
        HAlign::Right => position.0 - width,
    };
    let y0 = match align.1 {
        VAlign::Top => position.1,
        VAlign::Middle => position.1 - size / 2.0,
        VAlign::Bottom => position.1 - size,
    };
    (x0, y0, x0 + width, y0 + size)
}

/// Legend row in the top margin: main entry first, then dependencies.
fn layout_legend(
    shapes: &mut Vec<Shape>,
    group: &SeriesGroup,
    highlight: &HighlightState,
    config: &ChartConfig,
    font: f64,
) -> Vec<LegendEntry> {
    let mut x = config.plot_area().left;
    let y = 2.0;
    let mut legend = Vec::new();
    for line in group.lines() {
        let mut entry = LegendEntry {
            name: line.name().to_string(),
            role: line.label.role,
            color: line.color,
            style: highlight.legend_style(line.name()),
            bounds: (0.0, 0.0, 0.0, 0.0),
        };
        let text = entry.display_name();
        entry.bounds = text_bounds((x, y), &text, font, (HAlign::Left, VAlign::Top));
        let width = entry.bounds.2 - entry.bounds.0;
        shapes.push(Shape::Text {
            owner: Some(entry.name.clone()),
            position: (x, y),
            content: text,
            size: font,
            color: line.color,
            opacity: 1.0,
            align: (HAlign::Left, VAlign::Top),
            underline: entry.style.underline,
        });
        x += width + LEGEND_SPACING;
        legend.push(entry);
    }
    legend
}

fn distance_to_path(points: &[(f64, f64)], p: (f64, f64)) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => distance(*only, p),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(w[0], w[1], p))
            .fold(f64::INFINITY, f64::min),
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn distance_to_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(a, p);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    distance((a.0 + t * dx, a.1 + t * dy), p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::highlight::{InputMode, PointerEvent, INACTIVE_OPACITY};
    use crate::chart::normalize::normalize;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn series(name: &str, downloads: &[u64]) -> PackageSeries {
        let points = downloads
            .iter()
            .enumerate()
            .map(|(i, &n)| DownloadPoint::new(day(i as u32 + 1), n))
            .collect();
        PackageSeries::new(name, day(1), day(downloads.len().max(1) as u32), points).unwrap()
    }

    fn make_group() -> SeriesGroup {
        normalize(
            &series("d3", &[10, 30, 20]),
            &[series("victory", &[5, 5, 5]), series("react-d3", &[1, 2, 3])],
            0.8,
        )
        .unwrap()
    }

    fn path_of<'a>(drawing: &'a Drawing, name: &str) -> (&'a Vec<(f64, f64)>, &'a Stroke) {
        drawing
            .shapes
            .iter()
            .find_map(|s| match s {
                Shape::Path {
                    owner: Some(owner),
                    points,
                    stroke,
                } if owner == name => Some((points, stroke)),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_render_neutral_full_opacity() {
        let drawing = render(&make_group(), &HighlightState::new(), &ChartConfig::default()).unwrap();
        assert_eq!(drawing.width, 700);
        assert_eq!(drawing.legend.len(), 3);
        for shape in &drawing.shapes {
            match shape {
                Shape::Path { stroke, .. } => assert_eq!(stroke.opacity, 1.0),
                Shape::Text { opacity, .. } => assert_eq!(*opacity, 1.0),
            }
        }
    }

    #[test]
    fn test_main_line_spans_plot_area() {
        let config = ChartConfig::default();
        let drawing = render(&make_group(), &HighlightState::new(), &config).unwrap();
        let (points, stroke) = path_of(&drawing, "d3");
        let area = config.plot_area();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].0, area.left);
        assert!((points[0].1 - (270.0 - 250.0 / 3.0)).abs() < 1e-9);
        assert_eq!(points[1].1, area.top);
        assert_eq!(points[2].0, area.right);
        assert!(stroke.dash.is_some());
        assert_eq!(stroke.width, 3.0);
    }

    #[test]
    fn test_dependency_lines_use_scaled_domain() {
        let drawing = render(&make_group(), &HighlightState::new(), &ChartConfig::default()).unwrap();
        let (points, _) = path_of(&drawing, "victory");
        // 5 within [0, 6.25] sits at 80% of the plot height.
        let expected = 270.0 - 250.0 * 0.8;
        assert!((points[0].1 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_highlight_dims_others() {
        let mut state = HighlightState::new();
        state.handle(InputMode::Pointer, PointerEvent::Enter("victory".into()));
        let drawing = render(&make_group(), &state, &ChartConfig::default()).unwrap();
        assert_eq!(path_of(&drawing, "victory").1.opacity, 1.0);
        assert_eq!(path_of(&drawing, "react-d3").1.opacity, INACTIVE_OPACITY);
        assert_eq!(path_of(&drawing, "d3").1.opacity, INACTIVE_OPACITY);

        let victory = drawing.legend.iter().find(|e| e.name == "victory").unwrap();
        assert!(victory.style.underline);
        assert_eq!(victory.display_name(), "VICTORY");
        assert!(drawing.shapes.iter().any(|s| matches!(
            s,
            Shape::Text { content, underline: true, .. } if content == "VICTORY"
        )));
    }

    #[test]
    fn test_empty_dependencies_render() {
        let group = normalize(&series("d3", &[10, 30]), &[], 0.8).unwrap();
        let drawing = render(&group, &HighlightState::new(), &ChartConfig::default()).unwrap();
        assert_eq!(drawing.legend.len(), 1);
        assert!(drawing.shapes.iter().all(|s| match s {
            Shape::Path { points, .. } => points.iter().all(|(x, y)| x.is_finite() && y.is_finite()),
            Shape::Text { position, .. } => position.0.is_finite() && position.1.is_finite(),
        }));
    }

    #[test]
    fn test_time_tick_labels() {
        let drawing = render(&make_group(), &HighlightState::new(), &ChartConfig::default()).unwrap();
        let labels: Vec<&str> = drawing
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { content, align: (HAlign::Center, VAlign::Top), .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["6/1", "6/3"]);
    }

    #[test]
    fn test_line_at_finds_nearest() {
        let config = ChartConfig::default();
        let drawing = render(&make_group(), &HighlightState::new(), &config).unwrap();
        let (points, _) = path_of(&drawing, "d3");
        let (x, y) = points[1];
        assert_eq!(drawing.line_at(x, y + 2.0, 5.0), Some("d3"));
        assert_eq!(drawing.line_at(x, 150.0, 1.0), None);
    }

    #[test]
    fn test_line_at_legend() {
        let drawing = render(&make_group(), &HighlightState::new(), &ChartConfig::default()).unwrap();
        let entry = &drawing.legend[1];
        let (x0, y0, _, _) = entry.bounds;
        assert_eq!(drawing.line_at(x0 + 1.0, y0 + 1.0, 0.0), Some("victory"));
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut config = ChartConfig::default();
        config.dependencies_scale = 2.0;
        assert!(render(&make_group(), &HighlightState::new(), &config).is_err());
    }

    #[test]
    fn test_distance_to_segment() {
        assert_eq!(distance_to_segment((0.0, 0.0), (10.0, 0.0), (5.0, 3.0)), 3.0);
        assert_eq!(distance_to_segment((0.0, 0.0), (10.0, 0.0), (13.0, 4.0)), 5.0);
        assert_eq!(distance_to_path(&[], (0.0, 0.0)), f64::INFINITY);
    }
}
