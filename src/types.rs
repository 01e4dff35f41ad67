use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProfileError;

/// Hemoglobin genotype as reported by a lab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Genotype {
    AA, // normal
    AS, // sickle trait
    SS, // sickle cell disease
    AC, // hemoglobin C trait
    SC, // hemoglobin SC disease
}

impl Genotype {
    pub const ALL: [Genotype; 5] = [
        Genotype::AA,
        Genotype::AS,
        Genotype::SS,
        Genotype::AC,
        Genotype::SC,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genotype::AA => "AA",
            Genotype::AS => "AS",
            Genotype::SS => "SS",
            Genotype::AC => "AC",
            Genotype::SC => "SC",
        }
    }

    /// Only AA carries no abnormal hemoglobin allele
    pub fn is_normal(&self) -> bool {
        matches!(self, Genotype::AA)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Genotype::AA => "Normal hemoglobin",
            Genotype::AS => "Sickle cell trait (carrier)",
            Genotype::SS => "Sickle cell disease",
            Genotype::AC => "Hemoglobin C trait (carrier)",
            Genotype::SC => "Hemoglobin SC disease",
        }
    }
}

impl FromStr for Genotype {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AA" => Ok(Genotype::AA),
            "AS" | "SA" => Ok(Genotype::AS),
            "SS" => Ok(Genotype::SS),
            "AC" | "CA" => Ok(Genotype::AC),
            "SC" | "CS" => Ok(Genotype::SC),
            _ => Err(ProfileError::InvalidGenotype(s.to_string())),
        }
    }
}

impl TryFrom<String> for Genotype {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> String {
        genotype.as_str().to_string()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light verdict. Variant order is severity order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RiskLevel {
    #[default]
    #[serde(rename = "safe")]
    Green,
    #[serde(rename = "caution")]
    Amber,
    #[serde(rename = "danger")]
    Red,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "safe",
            RiskLevel::Amber => "caution",
            RiskLevel::Red => "danger",
        }
    }

    /// Photos stay blurred only for a danger verdict
    pub fn can_unblur_photos(&self) -> bool {
        !matches!(self, RiskLevel::Red)
    }

    /// Raise to `other` if it is more severe; never lowers.
    pub fn escalate(self, other: RiskLevel) -> RiskLevel {
        self.max(other)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rhesus antigen polarity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RhesusPolarity {
    Positive,
    Negative,
}

/// ABO blood group with rhesus polarity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum BloodGroup {
    APos,
    ANeg,
    BPos,
    BNeg,
    OPos,
    ONeg,
    ABPos,
    ABNeg,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
        BloodGroup::ABPos,
        BloodGroup::ABNeg,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
            BloodGroup::ABPos => "AB+",
            BloodGroup::ABNeg => "AB-",
        }
    }

    pub fn rhesus(&self) -> RhesusPolarity {
        match self {
            BloodGroup::APos | BloodGroup::BPos | BloodGroup::OPos | BloodGroup::ABPos => {
                RhesusPolarity::Positive
            }
            BloodGroup::ANeg | BloodGroup::BNeg | BloodGroup::ONeg | BloodGroup::ABNeg => {
                RhesusPolarity::Negative
            }
        }
    }

    fn from_parts(abo: &str, polarity: RhesusPolarity) -> Option<Self> {
        use RhesusPolarity::*;
        match (abo, polarity) {
            ("A", Positive) => Some(BloodGroup::APos),
            ("A", Negative) => Some(BloodGroup::ANeg),
            ("B", Positive) => Some(BloodGroup::BPos),
            ("B", Negative) => Some(BloodGroup::BNeg),
            ("O", Positive) => Some(BloodGroup::OPos),
            ("O", Negative) => Some(BloodGroup::ONeg),
            ("AB", Positive) => Some(BloodGroup::ABPos),
            ("AB", Negative) => Some(BloodGroup::ABNeg),
            _ => None,
        }
    }
}

impl FromStr for BloodGroup {
    type Err = ProfileError;

    /// Accepts "O+", "O -", "O POS", "o_neg", "AB NEGATIVE" and similar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let compact: String = upper
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();

        let abo_len = compact
            .find(|c: char| !matches!(c, 'A' | 'B' | 'O'))
            .unwrap_or(compact.len());
        let (abo, rest) = compact.split_at(abo_len);

        let polarity = match rest {
            "+" | "POS" | "POSITIVE" => Some(RhesusPolarity::Positive),
            "-" | "NEG" | "NEGATIVE" => Some(RhesusPolarity::Negative),
            _ => None,
        };

        polarity
            .and_then(|p| BloodGroup::from_parts(abo, p))
            .ok_or_else(|| ProfileError::InvalidBloodGroup(s.to_string()))
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodGroup> for String {
    fn from(group: BloodGroup) -> String {
        group.label().to_string()
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two fields the rules engine looks at. `None` means not yet provided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiologicalProfile {
    pub genotype: Option<Genotype>,
    pub rhesus_factor: Option<String>,
}

impl BiologicalProfile {
    pub fn new(genotype: Option<Genotype>, rhesus_factor: Option<&str>) -> Self {
        Self {
            genotype,
            rhesus_factor: rhesus_factor.map(str::to_string),
        }
    }

    /// Trailing '+' or the substring "POS", case-insensitive
    pub fn has_positive_rhesus_marker(&self) -> bool {
        self.rhesus_factor.as_deref().map_or(false, |rh| {
            let rh = rh.trim().to_uppercase();
            rh.contains("POS") || rh.ends_with('+')
        })
    }

    /// Trailing '-' or the substring "NEG", case-insensitive
    pub fn has_negative_rhesus_marker(&self) -> bool {
        self.rhesus_factor.as_deref().map_or(false, |rh| {
            let rh = rh.trim().to_uppercase();
            rh.contains("NEG") || rh.ends_with('-')
        })
    }
}

/// Verdict of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub status: RiskLevel,
    pub messages: Vec<String>,
}

impl RiskAssessment {
    pub fn can_unblur_photos(&self) -> bool {
        self.status.can_unblur_photos()
    }
}

/// Contents of a profile file (JSON or TOML) or of a scanned lab report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub genotype: Option<Genotype>,
    #[serde(default)]
    pub rhesus_factor: Option<String>,
}

impl ProfileRecord {
    /// Falls back to the blood group label when no explicit rhesus field is set.
    pub fn to_profile(&self) -> BiologicalProfile {
        let rhesus_factor = self
            .rhesus_factor
            .clone()
            .filter(|rh| !rh.trim().is_empty())
            .or_else(|| self.blood_group.map(|bg| bg.label().to_string()));

        BiologicalProfile {
            genotype: self.genotype,
            rhesus_factor,
        }
    }
}

/// Request body: two partners in their fixed roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub male_profile: ProfileRecord,
    pub female_profile: ProfileRecord,
}

/// Response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub status: RiskLevel,
    pub messages: Vec<String>,
    pub can_unblur_photos: bool,
}

impl From<RiskAssessment> for MatchResponse {
    fn from(assessment: RiskAssessment) -> Self {
        let can_unblur_photos = assessment.can_unblur_photos();
        Self {
            status: assessment.status,
            messages: assessment.messages,
            can_unblur_photos,
        }
    }
}

/// Which side of the rhesus rule a screened subject sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PartnerRole {
    Paternal,
    Maternal,
}

impl PartnerRole {
    pub fn opposite(&self) -> PartnerRole {
        match self {
            PartnerRole::Paternal => PartnerRole::Maternal,
            PartnerRole::Maternal => PartnerRole::Paternal,
        }
    }
}

/// Supported profile file formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Report,
    Unknown,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => FileFormat::Json,
            "toml" => FileFormat::Toml,
            "txt" | "report" => FileFormat::Report,
            _ => FileFormat::Unknown,
        }
    }

    pub fn is_profile_format(&self) -> bool {
        !matches!(self, FileFormat::Unknown)
    }
}

/// One candidate's verdict in a batch screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub candidate_id: String,
    pub source_file: String,
    pub candidate_role: PartnerRole,
    pub assessment: RiskAssessment,
    pub can_unblur_photos: bool,
}
