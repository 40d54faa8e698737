//! Persisted-results serialization

pub mod json;

pub use json::{render_summary, ReportPaths, ReportWriter};
