use serde::{Deserialize, Serialize};

use crate::entities::drug::Drug;
use crate::entities::variant::DetectedVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    /// Legacy tier; never produced by the phenotype rules but still honoured downstream.
    High,
    Moderate,
    Low,
    Unknown,
}

impl RiskLevel {
    /// Presentation order, most severe first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Moderate => 2,
            Self::Low => 3,
            Self::Unknown => 4,
        }
    }

    pub fn is_severe(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Safe,
    #[serde(rename = "Adjust Dosage")]
    AdjustDosage,
    Ineffective,
    Toxic,
    Unknown,
}

impl RiskLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::AdjustDosage => "Adjust Dosage",
            Self::Ineffective => "Ineffective",
            Self::Toxic => "Toxic",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_label: RiskLabel,
    pub confidence_score: u8,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecommendation {
    pub dosing_guidance: String,
    pub alternative_drugs: Vec<String>,
    pub warnings: Vec<String>,
    pub cpic_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub mechanism: String,
    pub patient_friendly: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacogenomicProfile {
    pub gene: String,
    pub diplotype: String,
    pub phenotype: String,
    pub phenotype_label: String,
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub variants_analyzed: usize,
    pub pgx_variants_found: usize,
    pub gene_coverage: Vec<String>,
    pub analysis_version: String,
    pub pipeline: String,
}

/// Full analysis for one drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugReport {
    pub patient_id: String,
    pub drug: Drug,
    pub timestamp: String,
    pub risk_assessment: RiskAssessment,
    pub pharmacogenomic_profile: PharmacogenomicProfile,
    pub clinical_recommendations: ClinicalRecommendation,
    pub ai_explanation: Explanation,
    pub quality_metrics: QualityMetrics,
}

/// All drug analyses for one VCF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiDrugReport {
    pub patient_id: String,
    pub timestamp: String,
    pub quality_metrics: QualityMetrics,
    pub results: Vec<DrugReport>,
}

impl MultiDrugReport {
    /// Stable sort by risk severity; ties keep catalogue order.
    pub fn sorted_by_severity(&self) -> Vec<&DrugReport> {
        let mut sorted: Vec<&DrugReport> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.risk_assessment.risk_level.rank());
        sorted
    }

    /// Results needing attention (Critical or Moderate).
    pub fn flagged_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.risk_assessment.risk_level,
                    RiskLevel::Critical | RiskLevel::Moderate
                )
            })
            .count()
    }

    pub fn average_confidence(&self) -> u8 {
        if self.results.is_empty() {
            return 0;
        }
        let total: u32 = self
            .results
            .iter()
            .map(|r| u32::from(r.risk_assessment.confidence_score))
            .sum();
        (f64::from(total) / self.results.len() as f64).round() as u8
    }

    pub fn result_for(&self, drug: Drug) -> Option<&DrugReport> {
        self.results.iter().find(|r| r.drug == drug)
    }
}
