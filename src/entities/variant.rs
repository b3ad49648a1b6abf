use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Zygosity of a diploid genotype call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zygosity {
    #[serde(rename = "Homozygous Reference")]
    HomozygousReference,
    #[serde(rename = "Heterozygous")]
    Heterozygous,
    #[serde(rename = "Homozygous Alternate")]
    HomozygousAlternate,
    #[serde(rename = "Compound Heterozygous")]
    CompoundHeterozygous,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Zygosity {
    /// Classifies two validated allele indices (0 = REF, k = k-th ALT).
    pub fn from_alleles(a: u32, b: u32) -> Self {
        match (a, b) {
            (0, 0) => Self::HomozygousReference,
            (0, _) | (_, 0) => Self::Heterozygous,
            (a, b) if a == b => Self::HomozygousAlternate,
            _ => Self::CompoundHeterozygous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HomozygousReference => "Homozygous Reference",
            Self::Heterozygous => "Heterozygous",
            Self::HomozygousAlternate => "Homozygous Alternate",
            Self::CompoundHeterozygous => "Compound Heterozygous",
            Self::Unknown => "Unknown",
        }
    }
}

/// One carried variant from the patient's VCF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub chromosome: String,
    pub position: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reference: String,
    pub alternates: Vec<String>,
    pub quality: String,
    pub filter: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_allele: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genotype: Option<String>,
    pub zygosity: Zygosity,
}

impl VariantRecord {
    pub fn rsid(&self) -> &str {
        self.id.as_deref().unwrap_or(".")
    }

    pub fn alt_field(&self) -> String {
        if self.alternates.is_empty() {
            ".".to_string()
        } else {
            self.alternates.join(",")
        }
    }

    pub fn is_gene(&self, gene: &str) -> bool {
        self.gene.as_deref() == Some(gene)
    }
}

/// Report-facing view of a carried variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedVariant {
    pub rsid: String,
    pub chromosome: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub gene: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_allele: Option<String>,
}

impl DetectedVariant {
    pub fn from_record(record: &VariantRecord, fallback_gene: &str) -> Self {
        Self {
            rsid: record.rsid().to_string(),
            chromosome: record.chromosome.clone(),
            position: record.position,
            ref_allele: record.reference.clone(),
            alt_allele: record.alt_field(),
            gene: record
                .gene
                .clone()
                .unwrap_or_else(|| fallback_gene.to_string()),
            star_allele: record.star_allele.clone(),
        }
    }
}
