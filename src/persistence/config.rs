use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::chart::highlight::InputModePreference;
use crate::chart::layout::ChartConfig;
use crate::dashboard::presets::{default_presets, Preset};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bundle file or directory of npm range JSON documents.
    pub data: Option<PathBuf>,
    /// Preset selected at start-up; the first one if unset.
    pub preset: Option<String>,
    /// "auto", "pointer" or "touch".
    pub input_mode: InputModePreference,
    pub chart: ChartConfig,
    #[serde(rename = "preset_list")]
    pub presets: Vec<Preset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            preset: None,
            input_mode: InputModePreference::Auto,
            chart: ChartConfig::default(),
            presets: default_presets(),
        }
    }
}

/// Path to the config file.
pub fn config_path() -> Option<PathBuf> {
    Some(super::config_dir()?.join("config.toml"))
}

/// Load config from disk, returning defaults if the file doesn't exist or is invalid.
pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(mut config) => {
                if config.presets.is_empty() {
                    config.presets = default_presets();
                }
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        },
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
        Err(_) => {
            // Create default config file on first run
            let config = Config::default();
            match write_default_config(path, &config) {
                Ok(()) => info!(path = %path.display(), "wrote default config"),
                Err(e) => warn!(path = %path.display(), error = %e, "could not write default config"),
            }
            config
        }
    }
}

/// Write a default config file with comments.
fn write_default_config(path: &Path, config: &Config) -> Result<(), String> {
    let chart = &config.chart;
    let mut content = format!(
        "# npmcharts configuration\n\
         \n\
         # Bundle file or directory of npm downloads/range JSON documents\n\
         # data = \"/path/to/downloads.json\"\n\
         \n\
         # Preset selected at start-up\n\
         # preset = \"d3 / react\"\n\
         \n\
         # How lines are highlighted: \"auto\", \"pointer\" (hover) or \"touch\" (click to toggle)\n\
         input_mode = \"{}\"\n\
         \n\
         [chart]\n\
         width = {}\n\
         height = {}\n\
         # Dependency lines are drawn against max / dependencies_scale, in (0, 1]\n\
         dependencies_scale = {}\n\
         \n\
         [chart.margin]\n\
         top = {}\n\
         right = {}\n\
         bottom = {}\n\
         left = {}\n",
        config.input_mode,
        chart.width,
        chart.height,
        chart.dependencies_scale,
        chart.margin.top,
        chart.margin.right,
        chart.margin.bottom,
        chart.margin.left,
    );
    for preset in &config.presets {
        content.push_str(&format!("\n[[preset_list]]\nname = {:?}\n", preset.name));
        for chart in &preset.charts {
            let deps: Vec<String> = chart.dependencies.iter().map(|d| format!("{:?}", d)).collect();
            content.push_str(&format!(
                "[[preset_list.chart]]\nmain = {:?}\ndependencies = [{}]\n",
                chart.main,
                deps.join(", ")
            ));
        }
    }
    std::fs::write(path, content.as_bytes()).map_err(|e| format!("write error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let first = load_config_from(&path);
        assert_eq!(first, Config::default());
        assert!(path.exists());
        let second = load_config_from(&path);
        assert_eq!(second, Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "input_mode = \"touch\"\n[chart]\nwidth = 400\n").unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.input_mode, InputModePreference::Touch);
        assert_eq!(config.chart.width, 400);
        assert_eq!(config.chart.dependencies_scale, 0.8);
        assert_eq!(config.chart.margin.left, 100.0);
        assert_eq!(config.presets, default_presets());
    }

    #[test]
    fn test_invalid_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "chart = 5").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "chart = 5");
    }

    #[test]
    fn test_non_utf8_config_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = b"data = \"/srv/npm\"\n# caf\xe9\n".to_vec();
        std::fs::write(&path, &original).unwrap();
        assert_eq!(load_config_from(&path), Config::default());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }
}
