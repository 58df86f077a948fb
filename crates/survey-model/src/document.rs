//! Loading of schema and response documents.
//!
//! Retrieval of these documents happens elsewhere. This module only parses
//! JSON that is already on disk or in memory.

use std::fs;
use std::path::Path;

use crate::error::{ModelError, Result};
use crate::response::RawResponse;
use crate::schema::SurveySchema;

impl SurveySchema {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| ModelError::Json {
            document: "schema",
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json_str(&read_document(path)?)
    }
}

/// Parse a JSON array of responses.
pub fn load_responses_str(json: &str) -> Result<Vec<RawResponse>> {
    serde_json::from_str(json).map_err(|source| ModelError::Json {
        document: "responses",
        source,
    })
}

pub fn load_responses_path(path: &Path) -> Result<Vec<RawResponse>> {
    load_responses_str(&read_document(path)?)
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}
