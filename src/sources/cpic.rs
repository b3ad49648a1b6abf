//! Curated CPIC-aligned tables: diplotype phenotypes, allele activity values,
//! allele severity ranks, genotype overrides and per-drug clinical wording.
//!
//! Diplotype and genotype keys are canonicalized with the same helpers the
//! query side uses, so table entries can be written in any allele order.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::entities::drug::{Drug, Gene};
use crate::entities::phenotype::Phenotype;
use crate::entities::report::{RiskLabel, RiskLevel};
use crate::sources::vcf::clean_genotype;
use crate::transform::phenotype::normalize_diplotype;

use Phenotype::{Im, Nm, Pm, Rm, Urm};

pub const WILDTYPE_ALLELES: &[&str] = &["*1", "*1a", "*1b", "*37"];

pub fn is_wildtype(allele: &str) -> bool {
    WILDTYPE_ALLELES.contains(&allele)
}

const DIPLOTYPES: &[(Gene, &str, Phenotype)] = &[
    (Gene::Tpmt, "*1/*1", Nm),
    (Gene::Tpmt, "*1/*2", Im),
    (Gene::Tpmt, "*1/*3", Im),
    (Gene::Tpmt, "*1/*3A", Im),
    (Gene::Tpmt, "*1/*3B", Im),
    (Gene::Tpmt, "*1/*3C", Im),
    (Gene::Tpmt, "*2/*2", Pm),
    (Gene::Tpmt, "*2/*3", Pm),
    (Gene::Tpmt, "*2/*3A", Pm),
    (Gene::Tpmt, "*2/*3B", Pm),
    (Gene::Tpmt, "*2/*3C", Pm),
    (Gene::Tpmt, "*3/*3", Pm),
    (Gene::Tpmt, "*3A/*3A", Pm),
    (Gene::Tpmt, "*3A/*3B", Pm),
    (Gene::Tpmt, "*3A/*3C", Pm),
    (Gene::Tpmt, "*3B/*3B", Pm),
    (Gene::Tpmt, "*3B/*3C", Pm),
    (Gene::Tpmt, "*3C/*3C", Pm),
    (Gene::Cyp2c9, "*1/*1", Nm),
    (Gene::Cyp2c9, "*1/*2", Im),
    (Gene::Cyp2c9, "*1/*3", Im),
    (Gene::Cyp2c9, "*2/*2", Im),
    (Gene::Cyp2c9, "*2/*3", Pm),
    (Gene::Cyp2c9, "*3/*3", Pm),
    (Gene::Cyp2d6, "*1/*1", Nm),
    (Gene::Cyp2d6, "*1/*4", Im),
    (Gene::Cyp2d6, "*1/*5", Im),
    (Gene::Cyp2d6, "*1/*6", Im),
    (Gene::Cyp2d6, "*1/*9", Im),
    (Gene::Cyp2d6, "*1/*10", Im),
    (Gene::Cyp2d6, "*1/*17", Im),
    (Gene::Cyp2d6, "*1/*29", Im),
    (Gene::Cyp2d6, "*1/*41", Im),
    (Gene::Cyp2d6, "*4/*4", Pm),
    (Gene::Cyp2d6, "*5/*5", Pm),
    (Gene::Cyp2d6, "*6/*6", Pm),
    (Gene::Cyp2d6, "*10/*10", Pm),
    (Gene::Cyp2d6, "*4/*5", Pm),
    (Gene::Cyp2d6, "*4/*6", Pm),
    (Gene::Cyp2d6, "*4/*10", Pm),
    (Gene::Cyp2d6, "*4/*41", Pm),
    (Gene::Cyp2d6, "*5/*6", Pm),
    (Gene::Cyp2d6, "*5/*10", Pm),
    (Gene::Cyp2d6, "*5/*41", Pm),
    (Gene::Cyp2d6, "*6/*10", Pm),
    (Gene::Cyp2d6, "*6/*41", Pm),
    (Gene::Cyp2d6, "*10/*41", Im),
    (Gene::Cyp2d6, "*41/*41", Im),
    (Gene::Cyp2d6, "*9/*41", Im),
    (Gene::Cyp2d6, "*10/*17", Im),
    (Gene::Cyp2d6, "*1/*1xN", Urm),
    (Gene::Cyp2d6, "*1xN/*1xN", Urm),
    (Gene::Cyp2d6, "*1xN/*4", Im),
    (Gene::Cyp2d6, "*1xN/*41", Nm),
    (Gene::Cyp2d6, "*2/*2xN", Urm),
    (Gene::Cyp2c19, "*1/*1", Nm),
    (Gene::Cyp2c19, "*1/*2", Im),
    (Gene::Cyp2c19, "*1/*3", Im),
    (Gene::Cyp2c19, "*1/*4", Im),
    (Gene::Cyp2c19, "*2/*2", Pm),
    (Gene::Cyp2c19, "*3/*3", Pm),
    (Gene::Cyp2c19, "*2/*3", Pm),
    (Gene::Cyp2c19, "*2/*4", Pm),
    (Gene::Cyp2c19, "*3/*4", Pm),
    (Gene::Cyp2c19, "*4/*4", Pm),
    (Gene::Cyp2c19, "*1/*17", Rm),
    (Gene::Cyp2c19, "*17/*17", Urm),
    (Gene::Cyp2c19, "*2/*17", Im),
    (Gene::Cyp2c19, "*3/*17", Im),
    (Gene::Slco1b1, "*1/*1", Nm),
    (Gene::Slco1b1, "*1/*1a", Nm),
    (Gene::Slco1b1, "*1/*1b", Nm),
    (Gene::Slco1b1, "*1a/*1a", Nm),
    (Gene::Slco1b1, "*1a/*1b", Nm),
    (Gene::Slco1b1, "*1b/*1b", Nm),
    (Gene::Slco1b1, "*1/*5", Im),
    (Gene::Slco1b1, "*1a/*5", Im),
    (Gene::Slco1b1, "*1b/*5", Im),
    (Gene::Slco1b1, "*1/*15", Im),
    (Gene::Slco1b1, "*1a/*15", Im),
    (Gene::Slco1b1, "*1b/*15", Im),
    (Gene::Slco1b1, "*1/*37", Nm),
    (Gene::Slco1b1, "*5/*5", Pm),
    (Gene::Slco1b1, "*15/*15", Pm),
    (Gene::Slco1b1, "*5/*15", Pm),
    (Gene::Dpyd, "*1/*1", Nm),
    (Gene::Dpyd, "*1/*2A", Im),
    (Gene::Dpyd, "*1/*13", Im),
    (Gene::Dpyd, "*1/c.2846A>T", Im),
    (Gene::Dpyd, "*1/HapB3", Im),
    (Gene::Dpyd, "*2A/*2A", Pm),
    (Gene::Dpyd, "*13/*13", Pm),
    (Gene::Dpyd, "*13/*2A", Pm),
    (Gene::Dpyd, "*2A/c.2846A>T", Pm),
    (Gene::Dpyd, "*13/c.2846A>T", Pm),
    (Gene::Dpyd, "*2A/HapB3", Pm),
    (Gene::Dpyd, "*13/HapB3", Pm),
    (Gene::Dpyd, "HapB3/HapB3", Pm),
    (Gene::Dpyd, "HapB3/c.2846A>T", Pm),
    (Gene::Dpyd, "c.2846A>T/c.2846A>T", Pm),
];

const ACTIVITY: &[(Gene, &str, f64)] = &[
    (Gene::Cyp2d6, "*1", 1.0),
    (Gene::Cyp2d6, "*2", 1.0),
    (Gene::Cyp2d6, "*4", 0.0),
    (Gene::Cyp2d6, "*5", 0.0),
    (Gene::Cyp2d6, "*6", 0.0),
    (Gene::Cyp2d6, "*9", 0.5),
    (Gene::Cyp2d6, "*10", 0.25),
    (Gene::Cyp2d6, "*17", 0.5),
    (Gene::Cyp2d6, "*29", 0.5),
    (Gene::Cyp2d6, "*41", 0.5),
    (Gene::Cyp2d6, "*1xN", 2.0),
    (Gene::Cyp2d6, "*2xN", 2.0),
    (Gene::Cyp2d6, "*4xN", 0.0),
    (Gene::Cyp2c19, "*1", 1.0),
    (Gene::Cyp2c19, "*2", 0.0),
    (Gene::Cyp2c19, "*3", 0.0),
    (Gene::Cyp2c19, "*4", 0.0),
    (Gene::Cyp2c19, "*17", 1.5),
    (Gene::Cyp2c9, "*1", 1.0),
    (Gene::Cyp2c9, "*2", 0.5),
    (Gene::Cyp2c9, "*3", 0.0),
    (Gene::Cyp2c9, "*5", 0.0),
    (Gene::Cyp2c9, "*6", 0.0),
    (Gene::Slco1b1, "*1", 1.0),
    (Gene::Slco1b1, "*1a", 1.0),
    (Gene::Slco1b1, "*1b", 1.0),
    (Gene::Slco1b1, "*5", 0.0),
    (Gene::Slco1b1, "*15", 0.0),
    (Gene::Slco1b1, "*37", 1.0),
    (Gene::Tpmt, "*1", 1.0),
    (Gene::Tpmt, "*2", 0.0),
    (Gene::Tpmt, "*3", 0.0),
    (Gene::Tpmt, "*3A", 0.0),
    (Gene::Tpmt, "*3B", 0.0),
    (Gene::Tpmt, "*3C", 0.0),
    (Gene::Dpyd, "*1", 1.0),
    (Gene::Dpyd, "*2A", 0.0),
    (Gene::Dpyd, "*13", 0.0),
    (Gene::Dpyd, "c.2846A>T", 0.5),
    (Gene::Dpyd, "HapB3", 0.5),
];

fn diplotype_table() -> &'static HashMap<(Gene, String), Phenotype> {
    static TABLE: OnceLock<HashMap<(Gene, String), Phenotype>> = OnceLock::new();
    TABLE.get_or_init(|| {
        DIPLOTYPES
            .iter()
            .map(|&(gene, diplotype, phenotype)| ((gene, normalize_diplotype(diplotype)), phenotype))
            .collect()
    })
}

fn activity_table() -> &'static HashMap<(Gene, &'static str), f64> {
    static TABLE: OnceLock<HashMap<(Gene, &'static str), f64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ACTIVITY
            .iter()
            .map(|&(gene, allele, score)| ((gene, allele), score))
            .collect()
    })
}

/// Exact diplotype lookup. `diplotype` must already be normalized.
pub fn diplotype_phenotype(gene: Gene, diplotype: &str) -> Option<Phenotype> {
    diplotype_table()
        .get(&(gene, diplotype.to_string()))
        .copied()
}

pub fn allele_activity(gene: Gene, allele: &str) -> Option<f64> {
    activity_table().get(&(gene, allele)).copied()
}

/// Clinical impact rank used to pick alleles when more than two are observed.
/// Lower is more severe.
pub fn allele_severity(allele: &str) -> u8 {
    match allele {
        "*4" | "*5" | "*6" | "*2A" | "*13" | "*3" | "*3A" | "*3B" | "*3C" | "*2" => 0,
        "*9" | "*10" | "*17" | "*29" | "*41" | "*15" | "c.2846A>T" | "HapB3" => 1,
        "*1xN" | "*2xN" => 2,
        "*1" | "*1a" | "*1b" | "*37" => 99,
        _ => 50,
    }
}

/// Risk fields that replace the phenotype-derived assessment for a specific
/// star allele / genotype combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenotypeOverride {
    pub risk_level: RiskLevel,
    pub risk_label: RiskLabel,
    pub severity: &'static str,
    pub confidence: u8,
}

const fn moderate(severity: &'static str, confidence: u8) -> GenotypeOverride {
    GenotypeOverride {
        risk_level: RiskLevel::Moderate,
        risk_label: RiskLabel::AdjustDosage,
        severity,
        confidence,
    }
}

const fn critical(risk_label: RiskLabel, severity: &'static str, confidence: u8) -> GenotypeOverride {
    GenotypeOverride {
        risk_level: RiskLevel::Critical,
        risk_label,
        severity,
        confidence,
    }
}

const OVERRIDES: &[(Drug, &str, &str, GenotypeOverride)] = &[
    (
        Drug::Clopidogrel,
        "*2",
        "0/1",
        moderate(
            "Heterozygous CYP2C19*2. Intermediate metabolizer. Reduced clopidogrel activation.",
            90,
        ),
    ),
    (
        Drug::Clopidogrel,
        "*2",
        "1/1",
        critical(
            RiskLabel::Ineffective,
            "Homozygous CYP2C19*2. Poor metabolizer. Severely impaired clopidogrel activation. Contraindicated.",
            98,
        ),
    ),
    (
        Drug::Clopidogrel,
        "*3",
        "0/1",
        moderate("Heterozygous CYP2C19*3. Reduced clopidogrel activation.", 90),
    ),
    (
        Drug::Clopidogrel,
        "*3",
        "1/1",
        critical(
            RiskLabel::Ineffective,
            "Homozygous CYP2C19*3. Severely impaired clopidogrel activation.",
            98,
        ),
    ),
    (
        Drug::Codeine,
        "*4",
        "0/1",
        moderate(
            "Heterozygous CYP2D6*4. Reduced codeine-to-morphine conversion.",
            90,
        ),
    ),
    (
        Drug::Codeine,
        "*4",
        "1/1",
        critical(
            RiskLabel::Ineffective,
            "Homozygous CYP2D6*4. No codeine-to-morphine conversion. Drug completely ineffective.",
            98,
        ),
    ),
    (
        Drug::Codeine,
        "*1xN",
        "0/1",
        critical(
            RiskLabel::Toxic,
            "CYP2D6 gene duplication (*1xN). Ultra-rapid metabolizer. Risk of morphine overdose and respiratory depression.",
            95,
        ),
    ),
    (
        Drug::Codeine,
        "*1xN",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "CYP2D6 gene duplication (homozygous *1xN). Ultra-rapid metabolizer. Severe morphine overdose risk.",
            98,
        ),
    ),
    (
        Drug::Warfarin,
        "*2",
        "0/1",
        moderate("Heterozygous CYP2C9*2. Mildly reduced warfarin clearance.", 88),
    ),
    (
        Drug::Warfarin,
        "*2",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous CYP2C9*2. Significantly reduced warfarin clearance. High bleeding risk.",
            95,
        ),
    ),
    (
        Drug::Warfarin,
        "*3",
        "0/1",
        moderate("Heterozygous CYP2C9*3. Reduced warfarin clearance.", 90),
    ),
    (
        Drug::Warfarin,
        "*3",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous CYP2C9*3. Severely reduced warfarin clearance. Very high bleeding risk.",
            97,
        ),
    ),
    (
        Drug::Simvastatin,
        "*5",
        "0/1",
        moderate(
            "Heterozygous SLCO1B1*5. Decreased function. Elevated myopathy risk.",
            88,
        ),
    ),
    (
        Drug::Simvastatin,
        "*5",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous SLCO1B1*5. Poor function. High myopathy/rhabdomyolysis risk.",
            95,
        ),
    ),
    (
        Drug::Azathioprine,
        "*3A",
        "0/1",
        moderate(
            "Heterozygous TPMT*3A. Intermediate activity. Reduce dose 30-50%.",
            90,
        ),
    ),
    (
        Drug::Azathioprine,
        "*3A",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous TPMT*3A. No TPMT activity. Life-threatening myelosuppression.",
            98,
        ),
    ),
    (
        Drug::Azathioprine,
        "*3C",
        "0/1",
        moderate("Heterozygous TPMT*3C. Intermediate activity.", 90),
    ),
    (
        Drug::Azathioprine,
        "*3C",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous TPMT*3C. No TPMT activity. Life-threatening myelosuppression.",
            98,
        ),
    ),
    (
        Drug::Fluorouracil,
        "*2A",
        "0/1",
        moderate(
            "Heterozygous DPYD*2A. Reduced DPD activity. Dose reduction 25-50% required.",
            90,
        ),
    ),
    (
        Drug::Fluorouracil,
        "*2A",
        "1/1",
        critical(
            RiskLabel::Toxic,
            "Homozygous DPYD*2A. No DPD activity. Fatal toxicity risk. Contraindicated.",
            99,
        ),
    ),
];

/// Composite key for the override table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverrideKey {
    drug: Drug,
    gene: Gene,
    star_allele: String,
    genotype: String,
}

impl OverrideKey {
    /// Builds a key from the literal genotype as written.
    pub fn literal(drug: Drug, gene: Gene, star_allele: &str, genotype: &str) -> Self {
        Self {
            drug,
            gene,
            star_allele: star_allele.trim().to_string(),
            genotype: genotype.trim().to_string(),
        }
    }

    /// Builds a key with the genotype phase separator normalized to `/`.
    pub fn canonical(drug: Drug, gene: Gene, star_allele: &str, genotype: &str) -> Self {
        Self::literal(drug, gene, star_allele, &clean_genotype(genotype))
    }
}

fn override_table() -> &'static HashMap<OverrideKey, GenotypeOverride> {
    static TABLE: OnceLock<HashMap<OverrideKey, GenotypeOverride>> = OnceLock::new();
    TABLE.get_or_init(|| {
        OVERRIDES
            .iter()
            .map(|&(drug, star, genotype, entry)| {
                (
                    OverrideKey::canonical(drug, drug.gene(), star, genotype),
                    entry,
                )
            })
            .collect()
    })
}

pub fn genotype_override(key: &OverrideKey) -> Option<&'static GenotypeOverride> {
    override_table().get(key)
}

/// Drug-specific narrative for Critical/Moderate risk, keyed by phenotype label.
pub fn severity_narrative(drug: Drug, label: &str) -> Option<&'static str> {
    let text = match (drug, label) {
        (Drug::Codeine, "Poor Metabolizer") => {
            "Reduced conversion to morphine. Therapy may be ineffective. Consider alternative analgesics."
        }
        (Drug::Codeine, "Intermediate Metabolizer") => {
            "Reduced but partial conversion to morphine. Monitor for inadequate pain relief."
        }
        (Drug::Codeine, "Ultra-rapid Metabolizer" | "Ultrarapid Metabolizer") => {
            "Excessive morphine formation. Risk of respiratory depression and CNS toxicity."
        }
        (Drug::Clopidogrel, "Poor Metabolizer") => {
            "Severely impaired activation. High risk of cardiovascular events (stent thrombosis). Contraindicated."
        }
        (Drug::Clopidogrel, "Intermediate Metabolizer") => {
            "Reduced activation. Consider increased dose or alternative antiplatelet (prasugrel, ticagrelor)."
        }
        (Drug::Warfarin, "Poor Metabolizer") => {
            "Significantly reduced clearance. High bleeding risk. Requires major dose reduction (30-80%)."
        }
        (Drug::Warfarin, "Intermediate Metabolizer") => {
            "Moderately reduced clearance. Requires dose reduction (20-40%) with close INR monitoring."
        }
        (Drug::Simvastatin, "Poor Function") => {
            "Greatly increased plasma levels. High risk of myopathy and rhabdomyolysis. Contraindicated at high doses."
        }
        (Drug::Simvastatin, "Decreased Function") => {
            "Increased plasma levels. Elevated myopathy risk. Consider lower dose or alternative statin."
        }
        (Drug::Azathioprine, "Deficient TPMT Activity") => {
            "Severely impaired drug inactivation. Life-threatening myelosuppression risk. Contraindicated or reduce dose by 90%."
        }
        (Drug::Azathioprine, "Intermediate TPMT Activity") => {
            "Reduced inactivation. Increased toxicity risk. Reduce dose by 30-50% and monitor blood counts."
        }
        (Drug::Fluorouracil, "Deficient DPD Activity") => {
            "Severely impaired clearance. Fatal toxicity risk. Contraindicated."
        }
        (Drug::Fluorouracil, "Reduced DPD Activity") => {
            "Reduced clearance. Increased GI and hematologic toxicity. Reduce dose by 25-50%."
        }
        _ => return None,
    };
    Some(text)
}

/// CPIC dosing guidance keyed by phenotype label.
pub fn dosing_guidance(drug: Drug, label: &str) -> Option<&'static str> {
    const STANDARD: &str = "Use standard dosing per clinical guidelines.";
    let text = match (drug, label) {
        (Drug::Codeine, "Poor Metabolizer") => {
            "AVOID codeine. Use alternative analgesics not metabolized by CYP2D6 (e.g., acetaminophen, NSAIDs, morphine at standard doses)."
        }
        (Drug::Codeine, "Intermediate Metabolizer") => {
            "Use codeine with caution. Monitor for efficacy. Consider alternative analgesics if inadequate response."
        }
        (Drug::Codeine, "Normal Metabolizer") => STANDARD,
        (Drug::Codeine, "Ultra-rapid Metabolizer" | "Ultrarapid Metabolizer") => {
            "AVOID codeine. Risk of fatal respiratory depression. Use non-opioid analgesics."
        }
        (Drug::Clopidogrel, "Poor Metabolizer") => {
            "AVOID clopidogrel. Use prasugrel or ticagrelor as alternative antiplatelet therapy."
        }
        (Drug::Clopidogrel, "Intermediate Metabolizer") => {
            "Consider prasugrel or ticagrelor. If clopidogrel is used, consider platelet function testing."
        }
        (
            Drug::Clopidogrel,
            "Normal Metabolizer"
            | "Rapid Metabolizer"
            | "Ultra-rapid Metabolizer"
            | "Ultrarapid Metabolizer",
        ) => STANDARD,
        (Drug::Warfarin, "Poor Metabolizer") => {
            "Reduce initial dose by 50-80%. Use pharmacogenomic dosing algorithms. Monitor INR closely for 2-3 weeks."
        }
        (Drug::Warfarin, "Intermediate Metabolizer") => {
            "Reduce initial dose by 20-40%. Monitor INR more frequently during dose titration."
        }
        (Drug::Warfarin, "Normal Metabolizer") => {
            "Use standard warfarin dosing with routine INR monitoring."
        }
        (Drug::Simvastatin, "Poor Function") => {
            "AVOID simvastatin or do not exceed 20mg/day. Use rosuvastatin or pravastatin instead."
        }
        (Drug::Simvastatin, "Decreased Function") => {
            "Use simvastatin at max 20mg/day. Monitor for muscle symptoms. Consider alternative statin."
        }
        (Drug::Simvastatin, "Normal Function") => STANDARD,
        (Drug::Azathioprine, "Deficient TPMT Activity") => {
            "Reduce dose by 90% or AVOID. Use alternative immunosuppressant. Monitor CBC weekly for 8 weeks."
        }
        (Drug::Azathioprine, "Intermediate TPMT Activity") => {
            "Reduce starting dose by 30-50%. Monitor CBC every 1-2 weeks for first 2 months."
        }
        (Drug::Azathioprine, "Normal TPMT Activity") => STANDARD,
        (Drug::Fluorouracil, "Deficient DPD Activity") => {
            "CONTRAINDICATED. Use alternative chemotherapy regimen. Fatal toxicity has been reported."
        }
        (Drug::Fluorouracil, "Reduced DPD Activity") => {
            "Reduce dose by 25-50%. Monitor closely for GI and hematologic toxicity."
        }
        (Drug::Fluorouracil, "Normal DPD Activity") => "Use standard dosing per protocol.",
        _ => return None,
    };
    Some(text)
}

pub fn alternative_drugs(drug: Drug) -> &'static [&'static str] {
    match drug {
        Drug::Codeine => &[
            "Acetaminophen",
            "Ibuprofen",
            "Morphine (direct)",
            "Hydromorphone",
            "Oxycodone",
        ],
        Drug::Clopidogrel => &["Prasugrel", "Ticagrelor", "Aspirin"],
        Drug::Warfarin => &["Apixaban", "Rivaroxaban", "Edoxaban", "Dabigatran"],
        Drug::Simvastatin => &["Rosuvastatin", "Pravastatin", "Fluvastatin", "Pitavastatin"],
        Drug::Azathioprine => &["Mycophenolate mofetil", "Methotrexate", "Cyclosporine"],
        Drug::Fluorouracil => &[
            "Capecitabine (also DPYD-dependent)",
            "Gemcitabine",
            "Oxaliplatin",
        ],
    }
}
