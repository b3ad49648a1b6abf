use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::phenotype::Phenotype;
use crate::error::PharmaGuardError;

/// Drugs with a CPIC guideline covered by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Drug {
    Codeine,
    Warfarin,
    Clopidogrel,
    Simvastatin,
    Azathioprine,
    Fluorouracil,
}

impl Drug {
    pub const ALL: [Drug; 6] = [
        Drug::Codeine,
        Drug::Warfarin,
        Drug::Clopidogrel,
        Drug::Simvastatin,
        Drug::Azathioprine,
        Drug::Fluorouracil,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Codeine => "CODEINE",
            Self::Warfarin => "WARFARIN",
            Self::Clopidogrel => "CLOPIDOGREL",
            Self::Simvastatin => "SIMVASTATIN",
            Self::Azathioprine => "AZATHIOPRINE",
            Self::Fluorouracil => "FLUOROURACIL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Codeine => "Codeine",
            Self::Warfarin => "Warfarin",
            Self::Clopidogrel => "Clopidogrel",
            Self::Simvastatin => "Simvastatin",
            Self::Azathioprine => "Azathioprine",
            Self::Fluorouracil => "5-Fluorouracil",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Codeine => "Opioid analgesic",
            Self::Warfarin => "Anticoagulant",
            Self::Clopidogrel => "Antiplatelet",
            Self::Simvastatin => "Statin / Lipid-lowering",
            Self::Azathioprine => "Immunosuppressant",
            Self::Fluorouracil => "Chemotherapy",
        }
    }

    /// Primary pharmacogene whose phenotype drives the risk call.
    pub fn gene(self) -> Gene {
        match self {
            Self::Codeine => Gene::Cyp2d6,
            Self::Warfarin => Gene::Cyp2c9,
            Self::Clopidogrel => Gene::Cyp2c19,
            Self::Simvastatin => Gene::Slco1b1,
            Self::Azathioprine => Gene::Tpmt,
            Self::Fluorouracil => Gene::Dpyd,
        }
    }

    pub(crate) fn lowercase(self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    pub fn info(self) -> DrugInfo {
        DrugInfo {
            drug: self,
            label: self.label(),
            description: self.description(),
            gene: self.gene(),
        }
    }
}

/// Catalogue entry for listing supported drugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrugInfo {
    pub drug: Drug,
    pub label: &'static str,
    pub description: &'static str,
    pub gene: Gene,
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Drug {
    type Err = PharmaGuardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "CODEINE" => Ok(Self::Codeine),
            "WARFARIN" => Ok(Self::Warfarin),
            "CLOPIDOGREL" => Ok(Self::Clopidogrel),
            "SIMVASTATIN" => Ok(Self::Simvastatin),
            "AZATHIOPRINE" => Ok(Self::Azathioprine),
            "FLUOROURACIL" | "5-FLUOROURACIL" | "5-FU" | "5FU" | "FU" => Ok(Self::Fluorouracil),
            _ => Err(PharmaGuardError::UnsupportedDrug(value.trim().to_string())),
        }
    }
}

/// Pharmacogenes with curated diplotype and activity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gene {
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[serde(rename = "CYP2C9")]
    Cyp2c9,
    #[serde(rename = "SLCO1B1")]
    Slco1b1,
    #[serde(rename = "TPMT")]
    Tpmt,
    #[serde(rename = "DPYD")]
    Dpyd,
}

/// Vocabulary used to spell out a phenotype for a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminology {
    Metabolizer,
    TpmtActivity,
    DpdActivity,
    Function,
}

impl Terminology {
    pub fn label(self, phenotype: Phenotype) -> &'static str {
        use Phenotype::*;
        match (self, phenotype) {
            (Self::TpmtActivity, Pm) => "Deficient TPMT Activity",
            (Self::TpmtActivity, Im) => "Intermediate TPMT Activity",
            (Self::TpmtActivity, Nm | Rm | Urm) => "Normal TPMT Activity",
            (Self::DpdActivity, Pm) => "Deficient DPD Activity",
            (Self::DpdActivity, Im) => "Reduced DPD Activity",
            (Self::DpdActivity, Nm | Rm | Urm) => "Normal DPD Activity",
            (Self::Function, Pm) => "Poor Function",
            (Self::Function, Im) => "Decreased Function",
            (Self::Function, Nm | Rm | Urm) => "Normal Function",
            (Self::Metabolizer, Pm) => "Poor Metabolizer",
            (Self::Metabolizer, Im) => "Intermediate Metabolizer",
            (Self::Metabolizer, Nm) => "Normal Metabolizer",
            (Self::Metabolizer, Rm) => "Rapid Metabolizer",
            (Self::Metabolizer, Urm) => "Ultra-rapid Metabolizer",
        }
    }
}

impl Gene {
    pub const ALL: [Gene; 6] = [
        Gene::Cyp2d6,
        Gene::Cyp2c19,
        Gene::Cyp2c9,
        Gene::Slco1b1,
        Gene::Tpmt,
        Gene::Dpyd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cyp2d6 => "CYP2D6",
            Self::Cyp2c19 => "CYP2C19",
            Self::Cyp2c9 => "CYP2C9",
            Self::Slco1b1 => "SLCO1B1",
            Self::Tpmt => "TPMT",
            Self::Dpyd => "DPYD",
        }
    }

    pub fn terminology(self) -> Terminology {
        match self {
            Self::Tpmt => Terminology::TpmtActivity,
            Self::Dpyd => Terminology::DpdActivity,
            Self::Slco1b1 => Terminology::Function,
            Self::Cyp2d6 | Self::Cyp2c19 | Self::Cyp2c9 => Terminology::Metabolizer,
        }
    }

    /// Gene-specific display label for a phenotype code.
    pub fn phenotype_label(self, phenotype: Phenotype) -> &'static str {
        self.terminology().label(phenotype)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gene {
    type Err = PharmaGuardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Gene::ALL
            .into_iter()
            .find(|gene| gene.as_str() == normalized)
            .ok_or_else(|| {
                PharmaGuardError::InvalidArgument(format!(
                    "Unsupported gene: {value}. Supported: CYP2D6, CYP2C19, CYP2C9, SLCO1B1, TPMT, DPYD"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_drug_targets_a_distinct_gene() {
        let mut genes: Vec<Gene> = Drug::ALL.iter().map(|d| d.gene()).collect();
        genes.sort();
        genes.dedup();
        assert_eq!(genes.len(), Drug::ALL.len());
    }

    #[test]
    fn drug_parse_is_case_insensitive_and_accepts_5fu_aliases() {
        assert_eq!("codeine".parse::<Drug>().expect("drug"), Drug::Codeine);
        assert_eq!(" Warfarin ".parse::<Drug>().expect("drug"), Drug::Warfarin);
        assert_eq!("5-FU".parse::<Drug>().expect("drug"), Drug::Fluorouracil);
        let err = "aspirin".parse::<Drug>().expect_err("unsupported");
        assert_eq!(err.code(), "UNSUPPORTED_DRUG");
    }

    #[test]
    fn gene_labels_follow_gene_vocabulary() {
        assert_eq!(Gene::Tpmt.phenotype_label(Phenotype::Pm), "Deficient TPMT Activity");
        assert_eq!(Gene::Dpyd.phenotype_label(Phenotype::Im), "Reduced DPD Activity");
        assert_eq!(Gene::Slco1b1.phenotype_label(Phenotype::Im), "Decreased Function");
        assert_eq!(
            Gene::Cyp2d6.phenotype_label(Phenotype::Urm),
            "Ultra-rapid Metabolizer"
        );
        assert_eq!(Gene::Tpmt.phenotype_label(Phenotype::Urm), "Normal TPMT Activity");
    }

    #[test]
    fn gene_serializes_as_hgnc_symbol() {
        let json = serde_json::to_string(&Gene::Cyp2c19).expect("json");
        assert_eq!(json, "\"CYP2C19\"");
        assert_eq!("slco1b1".parse::<Gene>().expect("gene"), Gene::Slco1b1);
    }
}
