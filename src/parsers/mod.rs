use std::fs;
use std::path::Path;

use crate::error::ProfileError;
use crate::types::*;

pub mod json;
pub mod report;
pub mod toml_profile;

pub use json::JsonProfileParser;
pub use report::{ReportScanner, ScannedReport};
pub use toml_profile::TomlProfileParser;

/// A decoded profile file
#[derive(Debug, Clone)]
pub struct ParsedProfile {
    pub candidate_id: String,
    pub source_file: String,
    pub format: FileFormat,
    pub record: ProfileRecord,
}

impl ParsedProfile {
    /// Record name wins over the file stem
    pub fn new(path: &Path, format: FileFormat, record: ProfileRecord) -> Self {
        let candidate_id = record
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_string()
            });

        Self {
            candidate_id,
            source_file: path.to_string_lossy().to_string(),
            format,
            record,
        }
    }
}

/// Common interface for all profile file parsers
pub trait ProfileFileParser {
    fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError>;
}

/// Picks a parser by file extension
pub struct ProfileParser;

impl ProfileParser {
    pub fn new() -> Self {
        Self
    }

    pub fn detect_format(&self, path: &Path) -> FileFormat {
        path.extension()
            .map(|ext| FileFormat::from_extension(&ext.to_string_lossy()))
            .unwrap_or(FileFormat::Unknown)
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        let parser: Box<dyn ProfileFileParser> = match self.detect_format(path) {
            FileFormat::Json => Box::new(JsonProfileParser::new()),
            FileFormat::Toml => Box::new(TomlProfileParser::new()),
            FileFormat::Report => Box::new(ReportScanner::new()),
            FileFormat::Unknown => {
                return Err(ProfileError::UnsupportedFormat(path.to_path_buf()))
            }
        };

        parser.parse(path)
    }
}

impl Default for ProfileParser {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, ProfileError> {
    fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parsers_default_construct() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let json_path = temp_dir.path().join("ada.json");
        fs::write(&json_path, r#"{"genotype": "AA"}"#)?;
        let toml_path = temp_dir.path().join("ada.toml");
        fs::write(&toml_path, "genotype = \"AC\"\n")?;

        let parsed = JsonProfileParser::default().parse(&json_path)?;
        assert_eq!(parsed.record.genotype, Some(Genotype::AA));
        let parsed = TomlProfileParser::default().parse(&toml_path)?;
        assert_eq!(parsed.record.genotype, Some(Genotype::AC));
        let scanned = ReportScanner::default().scan_text("Genotype: SC");
        assert_eq!(scanned.genotype, Some(Genotype::SC));
        Ok(())
    }

    #[test]
    fn test_dispatch_by_extension() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path();

        let json_path = dir.join("tunde.json");
        fs::write(&json_path, r#"{"genotype": "AS", "rhesus_factor": "O POS"}"#)?;

        let toml_path = dir.join("amara.toml");
        fs::write(&toml_path, "name = \"Amara\"\ngenotype = \"AA\"\nblood_group = \"B-\"\n")?;

        let report_path = dir.join("lab.txt");
        fs::write(&report_path, "HB ELECTROPHORESIS: SS\nBLOOD GROUP: A POS\n")?;

        let parser = ProfileParser::new();

        let json = parser.parse(&json_path)?;
        assert_eq!(json.candidate_id, "tunde");
        assert_eq!(json.format, FileFormat::Json);
        assert_eq!(json.record.genotype, Some(Genotype::AS));

        let toml = parser.parse(&toml_path)?;
        assert_eq!(toml.candidate_id, "Amara");
        assert_eq!(toml.record.blood_group, Some(BloodGroup::BNeg));

        let report = parser.parse(&report_path)?;
        assert_eq!(report.format, FileFormat::Report);
        assert_eq!(report.record.genotype, Some(Genotype::SS));
        assert_eq!(report.record.blood_group, Some(BloodGroup::APos));

        Ok(())
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let parser = ProfileParser::new();
        let err = parser.parse(Path::new("scan.png")).unwrap_err();
        assert!(matches!(err, ProfileError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let parser = ProfileParser::new();
        let err = parser.parse(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, ProfileError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/profile.json"));
    }
}
