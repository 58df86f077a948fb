//! CLI library components for survey dataset export.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
