//! Chartify Core - shared types for turning cluster manifests into Helm charts
//!
//! This crate provides the foundational types used throughout chartify:
//! - `Values`: the extracted values store, mirrored as a nested YAML mapping
//! - `ValuePath`: dotted paths into the values store and their placeholders
//! - `Template` / `ChartData`: the contract between processed resources and
//!   the pipeline that writes the chart

pub mod context;
pub mod error;
pub mod path;
pub mod values;

pub use context::{CHART_NAME_PLACEHOLDER, ChartData, Template};
pub use error::{CoreError, Result};
pub use path::ValuePath;
pub use values::Values;
