pub mod app;
pub mod chart_view;
pub mod event;
pub mod help;
pub mod status;
pub mod theme;
