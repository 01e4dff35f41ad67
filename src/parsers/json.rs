use std::path::Path;

use crate::error::ProfileError;
use crate::parsers::{read_to_string, ParsedProfile, ProfileFileParser};
use crate::types::*;

/// JSON profile files, e.g. `{"genotype": "AS", "rhesus_factor": "O POS"}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProfileParser;

impl JsonProfileParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        let content = read_to_string(path)?;
        let record: ProfileRecord =
            serde_json::from_str(&content).map_err(|source| ProfileError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(ParsedProfile::new(path, FileFormat::Json, record))
    }
}

impl ProfileFileParser for JsonProfileParser {
    fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        self.parse(path)
    }
}
