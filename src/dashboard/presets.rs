/// Named package configurations the user can switch between.
use serde::{Deserialize, Serialize};

/// Package id standing for the whole registry.
pub const ALL_PACKAGES: &str = "*";

/// One chart: a main package compared against dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub main: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ChartSpec {
    pub fn new(main: &str, dependencies: &[&str]) -> Self {
        Self {
            main: main.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(rename = "chart")]
    pub charts: Vec<ChartSpec>,
}

impl Preset {
    /// Every package id the preset needs, first occurrence order.
    pub fn flatten(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for chart in &self.charts {
            for id in std::iter::once(&chart.main).chain(chart.dependencies.iter()) {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }
}

pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "d3 / react".to_string(),
            charts: vec![
                ChartSpec::new(ALL_PACKAGES, &["d3"]),
                ChartSpec::new("d3", &["victory", "react-d3"]),
            ],
        },
        Preset {
            name: "Task runners".to_string(),
            charts: vec![ChartSpec::new(ALL_PACKAGES, &["gulp", "grunt"])],
        },
    ]
}

/// Display title of a package id.
pub fn title_for(id: &str) -> String {
    if id == ALL_PACKAGES {
        "All npm packages".to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_dedups_in_order() {
        let presets = default_presets();
        assert_eq!(presets[0].flatten(), vec!["*", "d3", "victory", "react-d3"]);
        assert_eq!(presets[1].flatten(), vec!["*", "gulp", "grunt"]);
    }

    #[test]
    fn test_title_for() {
        assert_eq!(title_for("*"), "All npm packages");
        assert_eq!(title_for("gulp"), "gulp");
    }

    #[test]
    fn test_preset_toml_shape() {
        let text = r#"
            name = "Bundlers"
            [[chart]]
            main = "*"
            dependencies = ["webpack", "rollup"]
            [[chart]]
            main = "webpack"
        "#;
        let preset: Preset = toml::from_str(text).unwrap();
        assert_eq!(preset.charts.len(), 2);
        assert!(preset.charts[1].dependencies.is_empty());
    }
}
