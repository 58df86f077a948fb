//! Processing options loaded from TOML.
//!
//! ```toml
//! max_string_width = 255
//! parallel = true
//! formats = ["csv", "spss", "metadata"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use survey_model::{OutputFormat, ProcessingOptions};

/// Load options from a TOML file. Missing keys keep their defaults.
pub fn load_options(path: &Path) -> Result<ProcessingOptions> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse_options(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn parse_options(content: &str) -> Result<ProcessingOptions> {
    Ok(toml::from_str(content)?)
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub max_string_width: Option<usize>,
    pub formats: Option<Vec<OutputFormat>>,
    pub sequential: bool,
}

impl OptionOverrides {
    pub fn apply(&self, mut options: ProcessingOptions) -> ProcessingOptions {
        if let Some(width) = self.max_string_width {
            options = options.with_max_string_width(width);
        }
        if let Some(formats) = &self.formats {
            options = options.with_formats(formats.clone());
        }
        if self.sequential {
            options = options.with_parallel(false);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let options = parse_options("max_string_width = 80\n").unwrap();
        assert_eq!(options.max_string_width, 80);
        assert!(options.parallel);
        assert_eq!(options.formats, OutputFormat::all());
    }

    #[test]
    fn formats_parse_lowercase() {
        let options = parse_options("formats = [\"csv\"]\nparallel = false\n").unwrap();
        assert_eq!(options.formats, vec![OutputFormat::Csv]);
        assert!(!options.parallel);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(parse_options("formats = [\"xlsx\"]").is_err());
    }

    #[test]
    fn overrides_win() {
        let base = parse_options("max_string_width = 80\nformats = [\"csv\"]\n").unwrap();
        let overrides = OptionOverrides {
            max_string_width: Some(120),
            formats: Some(vec![OutputFormat::Spss]),
            sequential: true,
        };
        let options = overrides.apply(base);
        assert_eq!(options.max_string_width, 120);
        assert_eq!(options.formats, vec![OutputFormat::Spss]);
        assert!(!options.parallel);
    }
}
