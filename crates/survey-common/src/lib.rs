//! Shared utilities for the survey export crates.
//!
//! This crate provides Polars value helpers and the numeric parsing used
//! when coercing flattened rows into typed columns.

pub mod polars;

pub use polars::{any_to_string, format_numeric, parse_f64, parse_i64, truncate_to_i64};
