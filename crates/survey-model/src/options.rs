//! Configuration options for survey processing and export.

use serde::{Deserialize, Serialize};

/// SPSS short-string width in bytes.
pub const DEFAULT_MAX_STRING_WIDTH: usize = 255;

/// Output artifacts a run may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain tabular CSV.
    Csv,
    /// SPSS syntax file plus tab-delimited data file.
    Spss,
    /// Variable metadata as JSON.
    Metadata,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Spss => "spss",
            OutputFormat::Metadata => "metadata",
        }
    }

    pub fn all() -> Vec<OutputFormat> {
        vec![OutputFormat::Csv, OutputFormat::Spss, OutputFormat::Metadata]
    }
}

/// Options controlling survey processing behavior.
///
/// Every field has a default, so a configuration file only needs to name
/// the settings it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Widest string value, in bytes, the statistical export accepts before
    /// falling back to coded text columns.
    pub max_string_width: usize,

    /// Flatten responses on the rayon thread pool.
    pub parallel: bool,

    /// Output artifacts to write.
    pub formats: Vec<OutputFormat>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            max_string_width: DEFAULT_MAX_STRING_WIDTH,
            parallel: true,
            formats: OutputFormat::all(),
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_string_width(mut self, width: usize) -> Self {
        self.max_string_width = width;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}
