/// Series normalization: raw package series → chart-ready `SeriesGroup`.
use tracing::debug;

use crate::chart::color::{color_of, ColorCache, EMPHASIS_COLOR};
use crate::chart::types::*;
use crate::error::{Error, Result};

/// Build the main line and the dependency lines of one chart.
///
/// The X window comes from the main series' declared `start`/`end`, not from
/// its points. Dependency lines share a single `max_y`.
pub fn normalize(
    main: &PackageSeries,
    dependencies: &[PackageSeries],
    dependencies_scale: f64,
) -> Result<SeriesGroup> {
    build(main, dependencies, dependencies_scale, color_of)
}

/// [`normalize`] with dependency colors looked up through `colors`.
pub fn normalize_with(
    main: &PackageSeries,
    dependencies: &[PackageSeries],
    dependencies_scale: f64,
    colors: &mut ColorCache,
) -> Result<SeriesGroup> {
    build(main, dependencies, dependencies_scale, |name| colors.get(name))
}

fn build(
    main: &PackageSeries,
    dependencies: &[PackageSeries],
    dependencies_scale: f64,
    mut color: impl FnMut(&str) -> Rgb,
) -> Result<SeriesGroup> {
    if !dependencies_scale.is_finite() || dependencies_scale <= 0.0 {
        return Err(Error::invalid_input(format!(
            "dependencies scale must be positive, got {}",
            dependencies_scale
        )));
    }

    let mut main_max_y = 0;
    let main_line = to_line(main, ColorRole::Main, EMPHASIS_COLOR, &mut main_max_y);

    let mut dependencies_max_y = 0;
    let lines: Vec<Line> = dependencies
        .iter()
        .map(|dep| to_line(dep, ColorRole::Dependency, color(&dep.name), &mut dependencies_max_y))
        .collect();

    debug!(
        main = %main.name,
        dependencies = lines.len(),
        main_max_y,
        dependencies_max_y,
        "normalized series"
    );

    Ok(SeriesGroup {
        main: MainSeries {
            line: main_line,
            min_x: main.start,
            max_x: main.end,
            min_y: 0,
            max_y: main_max_y,
        },
        dependencies: DependencySeries {
            max_y: dependencies_max_y,
            lines,
        },
        dependencies_scale,
    })
}

/// Map points to a line while folding their downloads into `max_y`.
fn to_line(series: &PackageSeries, role: ColorRole, color: Rgb, max_y: &mut u64) -> Line {
    let points = series
        .points
        .iter()
        .map(|p| {
            *max_y = (*max_y).max(p.downloads);
            LinePoint { x: p.day, y: p.downloads }
        })
        .collect();
    Line {
        label: LineLabel {
            name: series.name.clone(),
            role,
        },
        color,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(name: &str, downloads: &[u64]) -> PackageSeries {
        let points = downloads
            .iter()
            .enumerate()
            .map(|(i, &n)| DownloadPoint::new(day(i as u32 + 1), n))
            .collect();
        PackageSeries::new(name, day(1), day(30), points).unwrap()
    }

    #[test]
    fn test_main_max_is_true_maximum() {
        let group = normalize(&series("d3", &[10, 30, 7, 29]), &[], 0.8).unwrap();
        assert_eq!(group.main.max_y, 30);
        assert_eq!(group.main.min_y, 0);
        assert_eq!(group.main.line.points.len(), 4);
        assert_eq!(group.main.line.points[1], LinePoint { x: day(2), y: 30 });
    }

    #[test]
    fn test_empty_main_has_zero_max() {
        let group = normalize(&series("d3", &[]), &[], 0.8).unwrap();
        assert_eq!(group.main.max_y, 0);
        assert!(group.main.line.points.is_empty());
    }

    #[test]
    fn test_x_window_comes_from_declared_range() {
        let group = normalize(&series("d3", &[1, 2]), &[], 0.8).unwrap();
        assert_eq!(group.main.min_x, day(1));
        assert_eq!(group.main.max_x, day(30));
    }

    #[test]
    fn test_dependency_max_spans_all_lines() {
        let deps = vec![
            series("victory", &[5, 9]),
            series("react-d3", &[1, 2, 3, 4, 12]),
            series("nvd3", &[11]),
        ];
        let group = normalize(&series("d3", &[100]), &deps, 0.8).unwrap();
        assert_eq!(group.dependencies.max_y, 12);
        assert_eq!(group.dependencies.lines.len(), 3);
        assert_eq!(group.dependencies.lines[1].points.len(), 5);
        assert_eq!(group.main.max_y, 100);
    }

    #[test]
    fn test_empty_dependency_contributes_zero() {
        let deps = vec![series("victory", &[]), series("react-d3", &[3])];
        let group = normalize(&series("d3", &[1]), &deps, 0.8).unwrap();
        assert_eq!(group.dependencies.max_y, 3);
        assert!(group.dependencies.lines[0].points.is_empty());
    }

    #[test]
    fn test_no_dependencies() {
        let group = normalize(&series("d3", &[1]), &[], 0.8).unwrap();
        assert_eq!(group.dependencies.max_y, 0);
        assert!(group.dependencies.lines.is_empty());
    }

    #[test]
    fn test_colors_and_roles() {
        let deps = vec![series("victory", &[1])];
        let group = normalize(&series("d3", &[1]), &deps, 0.8).unwrap();
        assert_eq!(group.main.line.color, EMPHASIS_COLOR);
        assert_eq!(group.main.line.label.role, ColorRole::Main);
        let dep = &group.dependencies.lines[0];
        assert_eq!(dep.color, color_of("victory"));
        assert_eq!(dep.label.role, ColorRole::Dependency);
    }

    #[test]
    fn test_cached_colors_match_pure() {
        let deps = vec![series("victory", &[1]), series("react-d3", &[2])];
        let main = series("d3", &[1]);
        let mut colors = ColorCache::default();
        let cached = normalize_with(&main, &deps, 0.8, &mut colors).unwrap();
        assert_eq!(cached, normalize(&main, &deps, 0.8).unwrap());
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn test_rejects_bad_scale() {
        let main = series("d3", &[1]);
        assert!(normalize(&main, &[], 0.0).is_err());
        assert!(normalize(&main, &[], -0.5).is_err());
        assert!(normalize(&main, &[], f64::NAN).is_err());
    }
}
