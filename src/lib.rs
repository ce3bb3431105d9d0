//! Dual-axis charts of npm download counts.
//!
//! `loader` produces package series, `chart` normalizes and renders them,
//! `dashboard` drives loads and highlights, `tui` and `export` display the result.

pub mod chart;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod loader;
pub mod persistence;
pub mod tui;

pub use error::{Error, LoadError, Result};
