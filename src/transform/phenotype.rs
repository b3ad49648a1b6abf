//! Diplotype → phenotype mapping.
//!
//! Resolution order: exact diplotype table, then summed allele activity, then a
//! wildtype/non-wildtype classification of the two alleles. Always yields a
//! result.

use crate::entities::drug::Gene;
use crate::entities::phenotype::{Phenotype, PhenotypeResult};
use crate::sources::cpic;

const REFERENCE_ALLELE: &str = "*1";

/// Canonical two-allele form: components trimmed and sorted.
pub fn normalize_diplotype(diplotype: &str) -> String {
    let parts: Vec<&str> = diplotype
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut pair = match parts.as_slice() {
        [] => return format!("{REFERENCE_ALLELE}/{REFERENCE_ALLELE}"),
        [only] => [REFERENCE_ALLELE, *only],
        [a, b] => [*a, *b],
        _ => {
            let variants: Vec<&str> = parts
                .iter()
                .copied()
                .filter(|p| *p != REFERENCE_ALLELE)
                .collect();
            if variants.len() >= 2 {
                [variants[0], variants[1]]
            } else {
                [parts[0], parts[1]]
            }
        }
    };
    pair.sort_unstable();
    format!("{}/{}", pair[0], pair[1])
}

fn score_to_phenotype(gene: Gene, score: f64) -> Phenotype {
    if score == 0.0 {
        return Phenotype::Pm;
    }
    match gene {
        Gene::Cyp2d6 => {
            if score > 0.0 && score < 1.25 {
                Phenotype::Im
            } else if score > 2.25 {
                Phenotype::Urm
            } else {
                Phenotype::Nm
            }
        }
        Gene::Cyp2c19 => {
            if score > 0.0 && score < 1.0 {
                Phenotype::Im
            } else if score >= 2.0 {
                Phenotype::Urm
            } else if score > 1.25 {
                Phenotype::Rm
            } else {
                Phenotype::Nm
            }
        }
        _ => {
            if score > 0.0 && score < 1.0 {
                Phenotype::Im
            } else {
                Phenotype::Nm
            }
        }
    }
}

/// Maps a diplotype to its phenotype for `gene`.
pub fn map_phenotype(gene: Gene, diplotype: &str) -> PhenotypeResult {
    let normalized = normalize_diplotype(diplotype);
    let result = |phenotype: Phenotype, label: &str, activity_score: Option<f64>| PhenotypeResult {
        gene,
        diplotype: normalized.clone(),
        phenotype,
        phenotype_label: label.to_string(),
        activity_score,
    };

    if let Some(phenotype) = cpic::diplotype_phenotype(gene, &normalized) {
        return result(phenotype, gene.phenotype_label(phenotype), None);
    }

    let (first, second) = normalized.split_once('/').unwrap_or((normalized.as_str(), ""));

    if let (Some(a), Some(b)) = (
        cpic::allele_activity(gene, first),
        cpic::allele_activity(gene, second),
    ) {
        let score = a + b;
        let phenotype = score_to_phenotype(gene, score);
        return result(phenotype, gene.phenotype_label(phenotype), Some(score));
    }

    if first.is_empty() || second.is_empty() {
        return result(Phenotype::Nm, "Normal Function", None);
    }

    match (cpic::is_wildtype(first), cpic::is_wildtype(second)) {
        (true, true) => result(Phenotype::Nm, "Normal Function", None),
        (true, false) | (false, true) => result(Phenotype::Im, "Reduced Function", None),
        (false, false) => result(Phenotype::Pm, "Poor Function", None),
    }
}
