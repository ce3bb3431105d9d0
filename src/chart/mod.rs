pub mod color;
pub mod highlight;
pub mod layout;
pub mod normalize;
pub mod render;
pub mod types;

use crate::error::Result;
use highlight::HighlightState;
use layout::ChartConfig;
use render::Drawing;
use types::PackageSeries;

/// Normalize and render one chart in a single call.
pub fn render_chart(
    main: &PackageSeries,
    dependencies: &[PackageSeries],
    highlight: &HighlightState,
    config: &ChartConfig,
) -> Result<Drawing> {
    config.validate()?;
    let group = normalize::normalize(main, dependencies, config.dependencies_scale)?;
    render::render(&group, highlight, config)
}
