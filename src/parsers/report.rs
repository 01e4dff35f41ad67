use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::error::ProfileError;
use crate::parsers::{read_to_string, ParsedProfile, ProfileFileParser};
use crate::types::*;

const EXCERPT_CHARS: usize = 500;

lazy_static! {
    // Priority order matters: the first genotype found wins. Codes are matched
    // case-sensitively; labs print them upper-case and "as" is an English word.
    static ref GENOTYPE_PATTERNS: Vec<(Genotype, Regex)> = Genotype::ALL
        .iter()
        .map(|g| (*g, Regex::new(&format!(r"\b{}\b", g.as_str())).unwrap()))
        .collect();

    // AB is tried before A and B; the ABO letters may not trail another letter.
    static ref BLOOD_GROUP_PATTERNS: Vec<(BloodGroup, Regex)> = [
        (BloodGroup::OPos, "O", r"(?:\+|POS)"),
        (BloodGroup::ONeg, "O", r"(?:-|NEG)"),
        (BloodGroup::ABPos, "AB", r"(?:\+|POS)"),
        (BloodGroup::ABNeg, "AB", r"(?:-|NEG)"),
        (BloodGroup::APos, "A", r"(?:\+|POS)"),
        (BloodGroup::ANeg, "A", r"(?:-|NEG)"),
        (BloodGroup::BPos, "B", r"(?:\+|POS)"),
        (BloodGroup::BNeg, "B", r"(?:-|NEG)"),
    ]
    .iter()
    .map(|(group, abo, polarity)| {
        let pattern = format!(r"(?:^|[^A-Z]){}\s*{}", abo, polarity);
        (*group, Regex::new(&pattern).unwrap())
    })
    .collect();
}

/// Keywords found in a lab report's text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedReport {
    pub genotype: Option<Genotype>,
    pub blood_group: Option<BloodGroup>,
    pub raw_text: String,
}

impl ScannedReport {
    pub fn into_record(self, name: Option<String>) -> ProfileRecord {
        ProfileRecord {
            name,
            blood_group: self.blood_group,
            genotype: self.genotype,
            rhesus_factor: None,
        }
    }
}

/// Scans plain-text lab reports (e.g. OCR output) for genotype and blood group
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportScanner;

impl ReportScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan_text(&self, text: &str) -> ScannedReport {
        let clean = text.to_uppercase();

        let genotype = GENOTYPE_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(g, _)| *g);

        let blood_group = BLOOD_GROUP_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&clean))
            .map(|(bg, _)| *bg);

        let mut raw_text: String = text.chars().take(EXCERPT_CHARS).collect();
        raw_text.push_str("...");

        ScannedReport {
            genotype,
            blood_group,
            raw_text,
        }
    }

    pub fn scan_file(&self, path: &Path) -> Result<ScannedReport, ProfileError> {
        let text = read_to_string(path)?;
        let scanned = self.scan_text(&text);
        debug!(
            "Scanned {}: genotype={:?} blood_group={:?}",
            path.display(),
            scanned.genotype,
            scanned.blood_group
        );
        Ok(scanned)
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        let record = self.scan_file(path)?.into_record(None);
        Ok(ParsedProfile::new(path, FileFormat::Report, record))
    }
}

impl ProfileFileParser for ReportScanner {
    fn parse(&self, path: &Path) -> Result<ParsedProfile, ProfileError> {
        self.parse(path)
    }
}
