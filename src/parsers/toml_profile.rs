use std::path::Path;

use crate::error::ProfileError;
use crate::parsers::{read_to_string, ParsedProfile, ProfileFileParser};
use crate::types::*;

/// TOML profile files with the same keys as the JSON form
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlProfileParser;

impl TomlProfileParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        let content = read_to_string(path)?;
        let record: ProfileRecord = toml::from_str(&content).map_err(|source| ProfileError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(ParsedProfile::new(path, FileFormat::Toml, record))
    }
}

impl ProfileFileParser for TomlProfileParser {
    fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        self.parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_toml_profile() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("chidi.toml");
        fs::write(&path, "genotype = \"sc\"\nrhesus_factor = \"A POS\"\n")?;

        let parsed = TomlProfileParser::new().parse(&path)?;
        assert_eq!(parsed.candidate_id, "chidi");
        assert_eq!(parsed.record.genotype, Some(Genotype::SC));
        assert_eq!(parsed.record.rhesus_factor.as_deref(), Some("A POS"));
        Ok(())
    }

    #[test]
    fn test_bad_blood_group_is_an_error() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "blood_group = \"Q+\"\n")?;

        let err = TomlProfileParser::new().parse(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
        Ok(())
    }
}
