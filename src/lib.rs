//! Dashboard over the US Department of Labor LCA disclosure data: cached
//! loading of per-quarter parquet files, baseline and user filters, and the
//! summaries behind the map, employer and wage-level charts.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
