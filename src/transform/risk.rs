//! Phenotype → risk classification and clinical recommendation.

use serde::Serialize;

use crate::entities::drug::{Drug, Gene};
use crate::entities::phenotype::Phenotype;
use crate::entities::report::{ClinicalRecommendation, RiskAssessment, RiskLabel, RiskLevel};
use crate::entities::variant::VariantRecord;
use crate::sources::cpic::{self, GenotypeOverride, OverrideKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskEvaluation {
    pub risk_assessment: RiskAssessment,
    pub recommendation: ClinicalRecommendation,
}

fn is_ultrarapid(label: &str) -> bool {
    label.contains("Ultra-rapid") || label.contains("Ultrarapid")
}

/// First matching keyword wins; loss of function is never downgraded.
pub fn determine_risk(gene: Gene, label: &str) -> RiskLevel {
    let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

    if has(&["Poor", "Deficient"]) {
        RiskLevel::Critical
    } else if has(&["Intermediate", "Reduced", "Decreased"]) {
        RiskLevel::Moderate
    } else if has(&["Normal"]) {
        RiskLevel::Low
    } else if is_ultrarapid(label) {
        if gene == Gene::Cyp2d6 {
            RiskLevel::Critical
        } else {
            RiskLevel::Moderate
        }
    } else if has(&["Rapid"]) {
        RiskLevel::Low
    } else {
        RiskLevel::Unknown
    }
}

pub fn risk_label(drug: Drug, level: RiskLevel, label: &str) -> RiskLabel {
    match level {
        RiskLevel::Low => RiskLabel::Safe,
        RiskLevel::Unknown => RiskLabel::Unknown,
        RiskLevel::Moderate => RiskLabel::AdjustDosage,
        RiskLevel::Critical | RiskLevel::High => match drug {
            Drug::Codeine if is_ultrarapid(label) => RiskLabel::Toxic,
            Drug::Codeine | Drug::Clopidogrel => RiskLabel::Ineffective,
            _ => RiskLabel::Toxic,
        },
    }
}

pub fn confidence(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Critical => 95,
        RiskLevel::High => 92,
        RiskLevel::Low => 90,
        RiskLevel::Moderate => 85,
        RiskLevel::Unknown => 20,
    }
}

fn severity(drug: Drug, label: &str, level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => format!(
            "Standard {} response expected with {label}.",
            drug.lowercase()
        ),
        RiskLevel::Unknown => format!("Unable to determine risk for {drug} with phenotype: {label}."),
        _ => cpic::severity_narrative(drug, label)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "{} risk for {drug} with {label}. Consult CPIC guidelines.",
                    level.as_str()
                )
            }),
    }
}

fn recommendation(drug: Drug, label: &str, level: RiskLevel) -> ClinicalRecommendation {
    let dosing_guidance = cpic::dosing_guidance(drug, label)
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "Use standard {} dosing. Consult CPIC guidelines for {label}.",
                drug.lowercase()
            )
        });

    let (alternative_drugs, warnings, cpic_level) = match level {
        RiskLevel::Critical | RiskLevel::High => (
            cpic::alternative_drugs(drug)
                .iter()
                .map(|d| d.to_string())
                .collect(),
            vec![format!(
                "CPIC recommends avoiding or significantly adjusting {} for this phenotype.",
                drug.lowercase()
            )],
            "Strong",
        ),
        RiskLevel::Moderate => (
            Vec::new(),
            vec!["Dose adjustment recommended. Monitor closely for adverse effects.".to_string()],
            "Moderate",
        ),
        RiskLevel::Low | RiskLevel::Unknown => (Vec::new(), Vec::new(), "Optional"),
    };

    ClinicalRecommendation {
        dosing_guidance,
        alternative_drugs,
        warnings,
        cpic_level: cpic_level.to_string(),
    }
}

/// Evaluates drug risk for a phenotype code of the drug's target gene.
pub fn evaluate_risk(drug: Drug, gene: Gene, phenotype: Phenotype) -> RiskEvaluation {
    let label = gene.phenotype_label(phenotype);
    let level = determine_risk(gene, label);

    RiskEvaluation {
        risk_assessment: RiskAssessment {
            risk_level: level,
            risk_label: risk_label(drug, level, label),
            confidence_score: confidence(level),
            severity: severity(drug, label, level),
        },
        recommendation: recommendation(drug, label, level),
    }
}

/// Looks for a star-allele/genotype combination with a curated risk, in
/// variant order. Both the genotype as written and its unphased form are tried.
pub fn find_genotype_override(
    drug: Drug,
    gene: Gene,
    variants: &[VariantRecord],
) -> Option<&'static GenotypeOverride> {
    variants
        .iter()
        .filter(|v| v.is_gene(gene.as_str()))
        .filter_map(|v| Some((v.star_allele.as_deref()?, v.genotype.as_deref()?)))
        .filter(|(star, genotype)| !star.is_empty() && !genotype.is_empty())
        .find_map(|(star, genotype)| {
            cpic::genotype_override(&OverrideKey::literal(drug, gene, star, genotype))
                .or_else(|| cpic::genotype_override(&OverrideKey::canonical(drug, gene, star, genotype)))
        })
}

/// Replaces the risk fields with the override's. The recommendation is left
/// as computed from the phenotype.
pub fn apply_override(assessment: &mut RiskAssessment, entry: &GenotypeOverride) {
    assessment.risk_level = entry.risk_level;
    assessment.risk_label = entry.risk_label;
    assessment.severity = entry.severity.to_string();
    assessment.confidence_score = entry.confidence;
}
