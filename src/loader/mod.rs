//! Download-series loaders.
//!
//! A loader turns a set of package names into one validated `PackageSeries`
//! per name, or fails the whole batch.

pub mod json;
pub mod worker;

use std::collections::{BTreeSet, HashMap};

use crate::chart::types::PackageSeries;
use crate::error::LoadError;

pub use json::JsonFileLoader;
pub use worker::{LoadResponse, LoadWorker, RequestTag};

pub type SeriesMap = HashMap<String, PackageSeries>;

pub trait Loader: Send + Sync {
    fn load(&self, names: &BTreeSet<String>) -> Result<SeriesMap, LoadError>;
}

/// Serves series from memory. Missing names fail the batch.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    series: SeriesMap,
}

impl StaticLoader {
    pub fn new(series: impl IntoIterator<Item = PackageSeries>) -> Self {
        Self {
            series: series.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }
}

impl Loader for StaticLoader {
    fn load(&self, names: &BTreeSet<String>) -> Result<SeriesMap, LoadError> {
        names
            .iter()
            .map(|name| {
                self.series
                    .get(name)
                    .cloned()
                    .map(|s| (name.clone(), s))
                    .ok_or_else(|| LoadError::new(format!("no data for package '{}'", name)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(name: &str) -> PackageSeries {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PackageSeries::new(name, d, d, vec![]).unwrap()
    }

    #[test]
    fn test_static_loader_returns_requested() {
        let loader = StaticLoader::new([series("d3"), series("gulp"), series("grunt")]);
        let names: BTreeSet<String> = ["d3", "gulp"].iter().map(|s| s.to_string()).collect();
        let data = loader.load(&names).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["gulp"].name, "gulp");
    }

    #[test]
    fn test_static_loader_fails_whole_batch() {
        let loader = StaticLoader::new([series("d3")]);
        let names: BTreeSet<String> = ["d3", "missing"].iter().map(|s| s.to_string()).collect();
        let err = loader.load(&names).unwrap_err();
        assert!(err.reason.contains("missing"));
    }
}
