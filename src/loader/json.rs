/// Loader for npm "downloads/range" JSON documents on disk.
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::chart::types::{DownloadPoint, PackageSeries};
use crate::error::LoadError;
use crate::loader::{Loader, SeriesMap};

/// One package's range response as served by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub package: Option<String>,
    pub downloads: Vec<DayDownloads>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DayDownloads {
    pub day: NaiveDate,
    pub downloads: u64,
}

impl RangeResponse {
    /// Validate into a series named `name`.
    pub fn into_series(self, name: &str) -> Result<PackageSeries, LoadError> {
        let points = self
            .downloads
            .into_iter()
            .map(|d| DownloadPoint::new(d.day, d.downloads))
            .collect();
        PackageSeries::new(name, self.start, self.end, points).map_err(|e| LoadError::new(e.to_string()))
    }
}

/// Where the JSON lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A single object keyed by package name.
    Bundle(PathBuf),
    /// One `<package>.json` per package.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    source: Source,
}

impl JsonFileLoader {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    /// Directory if `path` is one, bundle file otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let source = if path.is_dir() {
            Source::Directory(path)
        } else {
            Source::Bundle(path)
        };
        Self::new(source)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    fn load_bundle(path: &Path, names: &BTreeSet<String>) -> Result<SeriesMap, LoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoadError::new(format!("read {}: {}", path.display(), e)))?;
        let mut bundle: HashMap<String, RangeResponse> = serde_json::from_str(&content)
            .map_err(|e| LoadError::new(format!("parse {}: {}", path.display(), e)))?;
        names
            .iter()
            .map(|name| {
                let raw = bundle
                    .remove(name)
                    .ok_or_else(|| LoadError::new(format!("{} has no entry for '{}'", path.display(), name)))?;
                Ok((name.clone(), raw.into_series(name)?))
            })
            .collect()
    }

    fn load_directory(dir: &Path, names: &BTreeSet<String>) -> Result<SeriesMap, LoadError> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(format!("{}.json", file_stem(name)));
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| LoadError::new(format!("read {}: {}", path.display(), e)))?;
                let raw: RangeResponse = serde_json::from_str(&content)
                    .map_err(|e| LoadError::new(format!("parse {}: {}", path.display(), e)))?;
                if let Some(package) = raw.package.as_deref() {
                    if package != name {
                        debug!(file = %path.display(), package, name = %name, "package field differs from requested name");
                    }
                }
                Ok((name.clone(), raw.into_series(name)?))
            })
            .collect()
    }
}

/// File name used for a package id: `*` is `_all`, scope slashes become `__`.
pub fn file_stem(name: &str) -> String {
    if name == "*" {
        "_all".to_string()
    } else {
        name.replace('/', "__")
    }
}

impl Loader for JsonFileLoader {
    fn load(&self, names: &BTreeSet<String>) -> Result<SeriesMap, LoadError> {
        let result = match &self.source {
            Source::Bundle(path) => Self::load_bundle(path, names),
            Source::Directory(dir) => Self::load_directory(dir, names),
        };
        if let Err(e) = &result {
            warn!(reason = %e.reason, "batch load failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const D3: &str = r#"{"start":"2024-01-01","end":"2024-01-03","package":"d3",
        "downloads":[{"day":"2024-01-01","downloads":10},{"day":"2024-01-02","downloads":30}]}"#;
    const GULP: &str = r#"{"start":"2024-01-01","end":"2024-01-03","package":"gulp","downloads":[]}"#;

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bundle_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        fs::write(&path, format!(r#"{{"d3":{},"gulp":{}}}"#, D3, GULP)).unwrap();

        let loader = JsonFileLoader::from_path(&path);
        assert_eq!(loader.source(), &Source::Bundle(path.clone()));
        let data = loader.load(&names(&["d3", "gulp"])).unwrap();
        assert_eq!(data["d3"].points.len(), 2);
        assert_eq!(data["d3"].points[1].downloads, 30);
        assert!(data["gulp"].points.is_empty());
        assert_eq!(data["gulp"].end, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_bundle_missing_package_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        fs::write(&path, format!(r#"{{"d3":{}}}"#, D3)).unwrap();
        let err = JsonFileLoader::from_path(&path).load(&names(&["d3", "gulp"])).unwrap_err();
        assert!(err.reason.contains("gulp"));
    }

    #[test]
    fn test_directory_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("d3.json"), D3).unwrap();
        fs::write(dir.path().join("_all.json"), GULP).unwrap();
        let loader = JsonFileLoader::from_path(dir.path());
        let data = loader.load(&names(&["d3", "*"])).unwrap();
        assert_eq!(data["*"].name, "*");
        assert_eq!(data["d3"].points[0].downloads, 10);
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("d3.json"), r#"{"start":"2024-01-01"}"#).unwrap();
        let err = JsonFileLoader::from_path(dir.path()).load(&names(&["d3"])).unwrap_err();
        assert!(err.reason.contains("parse"));
    }

    #[test]
    fn test_unsorted_days_rejected_at_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"start":"2024-01-01","end":"2024-01-03",
            "downloads":[{"day":"2024-01-02","downloads":1},{"day":"2024-01-01","downloads":2}]}"#;
        fs::write(dir.path().join("d3.json"), raw).unwrap();
        let err = JsonFileLoader::from_path(dir.path()).load(&names(&["d3"])).unwrap_err();
        assert!(err.reason.contains("not ascending"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("*"), "_all");
        assert_eq!(file_stem("@babel/core"), "@babel__core");
        assert_eq!(file_stem("d3"), "d3");
    }
}
