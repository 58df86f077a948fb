//! Shared helpers for output writers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ExportError::io(parent, source))?;
    }
    Ok(())
}

/// Normalize a survey id for use in file names, defaulting to "survey".
pub fn normalize_survey_id(survey_id: &str) -> String {
    let cleaned: String = survey_id
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "survey".to_string()
    } else {
        cleaned
    }
}

/// Output file paths for one survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub metadata: PathBuf,
    /// Directory and stem the SPSS exporter writes `<stem>.sps` and `<stem>.dat` under.
    pub spss_dir: PathBuf,
    pub spss_stem: String,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, survey_id: &str) -> Self {
        let id = normalize_survey_id(survey_id);
        Self {
            csv: output_dir.join(format!("survey_{id}_responses.csv")),
            metadata: output_dir.join(format!("survey_{id}_metadata.json")),
            spss_dir: output_dir.to_path_buf(),
            spss_stem: format!("survey_{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_ids_are_file_safe() {
        assert_eq!(normalize_survey_id(" 10551 "), "10551");
        assert_eq!(normalize_survey_id("a/b c"), "a_b_c");
        assert_eq!(normalize_survey_id("   "), "survey");
    }

    #[test]
    fn output_paths_follow_naming_scheme() {
        let paths = OutputPaths::new(Path::new("out"), "42");
        assert_eq!(paths.csv, Path::new("out/survey_42_responses.csv"));
        assert_eq!(paths.metadata, Path::new("out/survey_42_metadata.json"));
        assert_eq!(paths.spss_stem, "survey_42");
    }
}
