use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use crate::parsers::ParsedProfile;
use crate::types::*;

pub const RHESUS_ADVISORY: &str =
    "ADVISORY: Rhesus Incompatibility detected (Mother Rh- / Father Rh+).";
pub const GENOTYPE_SAFE: &str = "Genotype compatibility: Safe.";

/// Rules engine comparing two partners' profiles.
///
/// Rules run in a fixed order (genotype, then rhesus) and the verdict can only
/// escalate. A rule whose inputs are missing is skipped without a message.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityEvaluator;

impl CompatibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        paternal: &BiologicalProfile,
        maternal: &BiologicalProfile,
    ) -> RiskAssessment {
        let mut assessment = RiskAssessment::default();
        self.check_genotypes(paternal, maternal, &mut assessment);
        self.check_rhesus(paternal, maternal, &mut assessment);
        assessment
    }

    /// Evaluate a request body in its male/female roles
    pub fn evaluate_request(&self, request: &MatchRequest) -> MatchResponse {
        let paternal = request.male_profile.to_profile();
        let maternal = request.female_profile.to_profile();
        self.evaluate(&paternal, &maternal).into()
    }

    fn check_genotypes(
        &self,
        paternal: &BiologicalProfile,
        maternal: &BiologicalProfile,
        assessment: &mut RiskAssessment,
    ) {
        let (Some(father), Some(mother)) = (paternal.genotype, maternal.genotype) else {
            return;
        };

        if !father.is_normal() && !mother.is_normal() {
            assessment.status = assessment.status.escalate(RiskLevel::Red);
            assessment.messages.push(format!(
                "CRITICAL: Genetic incompatibility. Both partners carry traits ({} + {}). High risk of Sickle Cell Disease.",
                father, mother
            ));
        } else {
            assessment.messages.push(GENOTYPE_SAFE.to_string());
        }
    }

    // Maternal Rh- against paternal Rh+ only; the reverse pairing carries no
    // sensitization risk.
    fn check_rhesus(
        &self,
        paternal: &BiologicalProfile,
        maternal: &BiologicalProfile,
        assessment: &mut RiskAssessment,
    ) {
        if paternal.rhesus_factor.is_none() || maternal.rhesus_factor.is_none() {
            return;
        }

        if maternal.has_negative_rhesus_marker() && paternal.has_positive_rhesus_marker() {
            assessment.status = assessment.status.escalate(RiskLevel::Amber);
            assessment.messages.push(RHESUS_ADVISORY.to_string());
        }
    }
}

/// Free-function form of [`CompatibilityEvaluator::evaluate`]
pub fn evaluate(paternal: &BiologicalProfile, maternal: &BiologicalProfile) -> RiskAssessment {
    CompatibilityEvaluator::new().evaluate(paternal, maternal)
}

/// Screens one subject against many candidates
pub struct CandidateScreener {
    subject: BiologicalProfile,
    subject_role: PartnerRole,
    evaluator: CompatibilityEvaluator,
}

impl CandidateScreener {
    pub fn new(subject: BiologicalProfile, subject_role: PartnerRole) -> Self {
        Self {
            subject,
            subject_role,
            evaluator: CompatibilityEvaluator::new(),
        }
    }

    /// Results come back in candidate order
    pub fn screen(&self, candidates: &[ParsedProfile]) -> Vec<ScreeningResult> {
        candidates
            .par_iter()
            .map(|candidate| self.screen_candidate(candidate))
            .collect()
    }

    fn screen_candidate(&self, candidate: &ParsedProfile) -> ScreeningResult {
        let profile = candidate.record.to_profile();
        let assessment = match self.subject_role {
            PartnerRole::Paternal => self.evaluator.evaluate(&self.subject, &profile),
            PartnerRole::Maternal => self.evaluator.evaluate(&profile, &self.subject),
        };

        debug!(
            "Candidate {} -> {} ({} messages)",
            candidate.candidate_id,
            assessment.status,
            assessment.messages.len()
        );

        ScreeningResult {
            candidate_id: candidate.candidate_id.clone(),
            source_file: candidate.source_file.clone(),
            candidate_role: self.subject_role.opposite(),
            can_unblur_photos: assessment.can_unblur_photos(),
            assessment,
        }
    }
}

/// Count of results per risk level, every level present
pub fn summarize(results: &[ScreeningResult]) -> BTreeMap<RiskLevel, usize> {
    let mut counts: BTreeMap<RiskLevel, usize> = [RiskLevel::Green, RiskLevel::Amber, RiskLevel::Red]
        .into_iter()
        .map(|level| (level, 0))
        .collect();

    for result in results {
        *counts.entry(result.assessment.status).or_default() += 1;
    }

    counts
}
