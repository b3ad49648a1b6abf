//! Full VCF → per-drug report pipeline.
//!
//! The VCF is parsed once; every requested drug is then analyzed
//! independently against the shared variant list. Results keep catalogue
//! order; presentation order is `MultiDrugReport::sorted_by_severity`.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::entities::drug::{Drug, Gene};
use crate::entities::report::{
    DrugReport, MultiDrugReport, PharmacogenomicProfile, QualityMetrics, RiskLabel, RiskLevel,
};
use crate::entities::variant::{DetectedVariant, VariantRecord};
use crate::error::PharmaGuardError;
use crate::sources::vcf;
use crate::transform::diplotype::build_diplotype;
use crate::transform::explanation::generate_explanation;
use crate::transform::phenotype::map_phenotype;
use crate::transform::risk::{apply_override, evaluate_risk, find_genotype_override};
use crate::utils::date;

pub const ANALYSIS_VERSION: &str = "1.0.0";
pub const PIPELINE_NAME: &str = "PharmaGuard CPIC-Aligned PGx Pipeline";

const UNTESTED_GENE_CONFIDENCE: u8 = 30;
const NO_PGX_CONFIDENCE: u8 = 10;

/// Shared per-file context handed to each drug analysis.
struct Cohort<'a> {
    variants: &'a [VariantRecord],
    detected_genes: &'a [String],
    patient_id: &'a str,
    timestamp: &'a str,
    quality_metrics: &'a QualityMetrics,
}

/// Parses `text` and analyzes `drugs` (all supported drugs when empty).
pub fn analyze(text: &str, drugs: &[Drug]) -> Result<MultiDrugReport, PharmaGuardError> {
    analyze_at(text, drugs, OffsetDateTime::now_utc())
}

/// Same as [`analyze`] with a fixed clock.
pub fn analyze_at(
    text: &str,
    drugs: &[Drug],
    now: OffsetDateTime,
) -> Result<MultiDrugReport, PharmaGuardError> {
    let parsed = vcf::parse(text)?;
    if parsed.variants.is_empty() {
        return Err(PharmaGuardError::NoVariants);
    }

    let detected_genes = vcf::detected_genes(&parsed.variants);
    let quality_metrics = QualityMetrics {
        variants_analyzed: parsed.variants.len(),
        pgx_variants_found: parsed.variants.iter().filter(|v| v.gene.is_some()).count(),
        gene_coverage: detected_genes.clone(),
        analysis_version: ANALYSIS_VERSION.to_string(),
        pipeline: PIPELINE_NAME.to_string(),
    };
    let patient_id = parsed
        .sample_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| date::generated_sample_id(now));
    let timestamp = date::iso_timestamp(now);

    let cohort = Cohort {
        variants: &parsed.variants,
        detected_genes: &detected_genes,
        patient_id: &patient_id,
        timestamp: &timestamp,
        quality_metrics: &quality_metrics,
    };

    let selected: &[Drug] = if drugs.is_empty() { &Drug::ALL } else { drugs };
    let mut results = Vec::with_capacity(selected.len());
    for drug in ordered_unique(selected) {
        results.push(analyze_drug(&cohort, drug)?);
    }

    let report = MultiDrugReport {
        patient_id,
        timestamp,
        quality_metrics,
        results,
    };
    info!(
        patient = %report.patient_id,
        variants = report.quality_metrics.variants_analyzed,
        genes = report.quality_metrics.gene_coverage.len(),
        flagged = report.flagged_count(),
        "analysis complete"
    );
    Ok(report)
}

/// Catalogue order, duplicates removed.
fn ordered_unique(drugs: &[Drug]) -> Vec<Drug> {
    Drug::ALL
        .into_iter()
        .filter(|d| drugs.contains(d))
        .collect()
}

fn detected_variants(cohort: &Cohort<'_>, gene: Gene, gene_tested: bool) -> Vec<DetectedVariant> {
    if gene_tested {
        vcf::filter_for_gene(cohort.variants, gene.as_str())
            .into_iter()
            .map(|v| DetectedVariant::from_record(v, gene.as_str()))
            .collect()
    } else {
        cohort
            .variants
            .iter()
            .filter(|v| v.gene.is_some())
            .map(|v| DetectedVariant::from_record(v, "Unknown"))
            .collect()
    }
}

fn analyze_drug(cohort: &Cohort<'_>, drug: Drug) -> Result<DrugReport, PharmaGuardError> {
    let gene = drug.gene();
    let gene_tested = cohort.detected_genes.iter().any(|g| g == gene.as_str());

    let diplotype = if gene_tested {
        build_diplotype(cohort.variants, gene.as_str())
    } else {
        "*1/*1".to_string()
    };
    let phenotype = map_phenotype(gene, &diplotype);

    let evaluation = evaluate_risk(drug, gene, phenotype.phenotype);
    let mut assessment = evaluation.risk_assessment;
    let mut recommendation = evaluation.recommendation;

    if let Some(entry) = find_genotype_override(drug, gene, cohort.variants) {
        debug!(%drug, %gene, level = entry.risk_level.as_str(), "genotype override applied");
        apply_override(&mut assessment, entry);
    }

    if !gene_tested {
        assessment.risk_level = RiskLevel::Unknown;
        assessment.risk_label = RiskLabel::Unknown;
        if cohort.detected_genes.is_empty() {
            assessment.confidence_score = NO_PGX_CONFIDENCE;
            assessment.severity = "No pharmacogenomic variants detected.".to_string();
            recommendation.dosing_guidance =
                "No PGx variants found. Use standard clinical protocols.".to_string();
            recommendation
                .warnings
                .push("No PGx variants detected in VCF.".to_string());
        } else {
            assessment.confidence_score = UNTESTED_GENE_CONFIDENCE;
            assessment.severity = format!("No {gene} variants detected.");
            recommendation.dosing_guidance = format!(
                "No {gene} variants found. Assume wildtype (*1/*1) pending testing. Use standard dosing."
            );
            recommendation
                .warnings
                .push(format!("VCF did not contain variants for {gene}."));
        }
    }

    let explanation = generate_explanation(drug, gene, phenotype.phenotype, &diplotype)?;

    debug!(
        %drug,
        diplotype = %phenotype.diplotype,
        phenotype = %phenotype.phenotype,
        level = assessment.risk_level.as_str(),
        "drug analyzed"
    );

    Ok(DrugReport {
        patient_id: cohort.patient_id.to_string(),
        drug,
        timestamp: cohort.timestamp.to_string(),
        risk_assessment: assessment,
        pharmacogenomic_profile: PharmacogenomicProfile {
            gene: gene.as_str().to_string(),
            diplotype: phenotype.diplotype,
            phenotype: phenotype.phenotype.code().to_string(),
            phenotype_label: phenotype.phenotype_label,
            detected_variants: detected_variants(cohort, gene, gene_tested),
        },
        clinical_recommendations: recommendation,
        ai_explanation: explanation,
        quality_metrics: cohort.quality_metrics.clone(),
    })
}
