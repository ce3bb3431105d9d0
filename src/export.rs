/// Export pipeline: Drawing → PNG bytes or SVG text via plotters.
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::chart::render::{text_bounds, Dash, Drawing, HAlign, Shape, Stroke, VAlign};
use crate::chart::types::Rgb;
use crate::error::{Error, Result};

const FONT_FAMILY: &str = "sans-serif";
const SWATCH_WIDTH: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "png" => Ok(Self::Png),
            Some(ext) if ext == "svg" => Ok(Self::Svg),
            _ => Err(Error::Export(format!(
                "unsupported export format for {} (expected .png or .svg)",
                path.display()
            ))),
        }
    }
}

/// Rasterize a drawing to PNG.
///
/// No font rasterizer is compiled in, so text is skipped and legend entries
/// become color swatches.
pub fn render_png(drawing: &Drawing) -> Result<Vec<u8>> {
    let (width, height) = (drawing.width, drawing.height);
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| Error::Export(format!("image of {}x{} pixels is too large", width, height)))?;
    let mut buf = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        paint(&root, drawing, false)?;
        root.present().map_err(|e| Error::Export(format!("present: {}", e)))?;
    }
    encode_rgb_to_png(&buf, width, height)
}

/// Render a drawing to an SVG document, text included.
pub fn render_svg(drawing: &Drawing) -> Result<String> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (drawing.width, drawing.height)).into_drawing_area();
        paint(&root, drawing, true)?;
        root.present().map_err(|e| Error::Export(format!("present: {}", e)))?;
    }
    Ok(out)
}

/// Write one file per drawing. Several drawings get `-1`, `-2`, ... suffixes.
pub fn write_drawings(path: &Path, drawings: &[Drawing]) -> Result<Vec<PathBuf>> {
    let format = Format::from_path(path)?;
    let mut written = Vec::new();
    for (i, drawing) in drawings.iter().enumerate() {
        let target = if drawings.len() == 1 {
            path.to_path_buf()
        } else {
            numbered(path, i + 1)
        };
        match format {
            Format::Png => std::fs::write(&target, render_png(drawing)?)?,
            Format::Svg => std::fs::write(&target, render_svg(drawing)?)?,
        }
        info!(path = %target.display(), "chart exported");
        written.push(target);
    }
    Ok(written)
}

fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    path.with_file_name(format!("{}-{}.{}", stem, n, ext))
}

fn paint<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, drawing: &Drawing, with_text: bool) -> Result<()> {
    root.fill(&rgb(drawing.background))
        .map_err(|e| Error::Export(format!("fill: {}", e)))?;

    for shape in &drawing.shapes {
        match shape {
            Shape::Path { points, stroke, .. } => draw_path(root, points, stroke)?,
            Shape::Text {
                position,
                content,
                size,
                color,
                opacity,
                align,
                underline,
                ..
            } if with_text => {
                let fill = rgb(*color).mix(*opacity);
                let style = TextStyle::from((FONT_FAMILY, *size).into_font())
                    .color(&fill)
                    .pos(anchor(*align));
                root.draw(&Text::new(content.clone(), px(*position), style))
                    .map_err(|e| Error::Export(format!("text: {}", e)))?;
                if *underline {
                    let (x0, _, x1, y1) = text_bounds(*position, content, *size, *align);
                    let stroke = Stroke {
                        color: *color,
                        opacity: *opacity,
                        width: 1.0,
                        dash: None,
                    };
                    draw_path(root, &[(x0, y1 + 1.0), (x1, y1 + 1.0)], &stroke)?;
                }
            }
            Shape::Text { .. } => {}
        }
    }

    if !with_text {
        for entry in &drawing.legend {
            let (x0, y0, _, y1) = entry.bounds;
            let y = (y0 + y1) / 2.0;
            let stroke = Stroke {
                color: entry.color,
                opacity: 1.0,
                width: if entry.style.underline { 4.0 } else { 2.0 },
                dash: None,
            };
            draw_path(root, &[(x0, y), (x0 + SWATCH_WIDTH, y)], &stroke)?;
        }
    }
    Ok(())
}

fn draw_path<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, points: &[(f64, f64)], stroke: &Stroke) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let style = rgb(stroke.color)
        .mix(stroke.opacity)
        .stroke_width(stroke.width.round().max(1.0) as u32);
    let coords: Vec<(i32, i32)> = points.iter().map(|p| px(*p)).collect();
    let drawn = match stroke.dash {
        Some(Dash { on, off }) => root.draw(&DashedPathElement::new(coords, on, off, style)),
        None => root.draw(&PathElement::new(coords, style)),
    };
    drawn.map_err(|e| Error::Export(format!("path: {}", e)))
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn px(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

fn anchor(align: (HAlign, VAlign)) -> Pos {
    let h = match align.0 {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    };
    let v = match align.1 {
        VAlign::Top => VPos::Top,
        VAlign::Middle => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    };
    Pos::new(h, v)
}

/// Encode a raw RGB pixel buffer to PNG.
fn encode_rgb_to_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    let encoder = PngEncoder::new(&mut png);
    encoder
        .write_image(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| Error::Export(format!("PNG encode: {}", e)))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_drawing(dash: Option<Dash>) -> Drawing {
        Drawing {
            width: 100,
            height: 20,
            background: Rgb(0, 0, 0),
            shapes: vec![Shape::Path {
                owner: Some("d3".into()),
                points: vec![(10.0, 10.0), (90.0, 10.0)],
                stroke: Stroke {
                    color: Rgb(255, 255, 255),
                    opacity: 1.0,
                    width: 1.0,
                    dash,
                },
            }],
            legend: Vec::new(),
        }
    }

    fn lit_pixels(png: &[u8]) -> usize {
        let image = image::load_from_memory(png).unwrap().to_rgb8();
        image.pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn test_png_dashed_stroke_leaves_gaps() {
        let solid = lit_pixels(&render_png(&line_drawing(None)).unwrap());
        let dashed = lit_pixels(&render_png(&line_drawing(Some(Dash { on: 1.0, off: 7.0 }))).unwrap());
        assert!(solid >= 80);
        assert!(dashed > 0);
        assert!(dashed * 2 < solid);
    }

    #[test]
    fn test_png_rejects_oversized_drawing() {
        let mut drawing = line_drawing(None);
        drawing.width = u32::MAX;
        drawing.height = u32::MAX;
        assert!(matches!(render_png(&drawing), Err(Error::Export(_))));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.PNG")).unwrap(), Format::Png);
        assert_eq!(Format::from_path(Path::new("a.svg")).unwrap(), Format::Svg);
        assert!(Format::from_path(Path::new("a.jpg")).is_err());
        assert!(Format::from_path(Path::new("a")).is_err());
    }

    #[test]
    fn test_numbered() {
        assert_eq!(numbered(Path::new("/tmp/out.svg"), 2), PathBuf::from("/tmp/out-2.svg"));
    }
}
