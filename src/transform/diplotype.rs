//! Builds a two-allele diplotype call for one gene from carried variants.

use crate::entities::variant::VariantRecord;
use crate::sources::cpic::allele_severity;
use crate::sources::vcf::{clean_genotype, filter_for_gene};

const REFERENCE_ALLELE: &str = "*1";
const HOMOZYGOUS_ALT: &str = "1/1";

fn is_homozygous_alt(genotype: &str) -> bool {
    matches!(genotype.split_once('/'), Some((a, b)) if a == b && a != "0" && !b.contains('/'))
}

/// Returns a sorted `a/b` diplotype for `gene`, `*1/*1` when nothing qualifies.
///
/// When more than two distinct star alleles are carried, the most severe ones
/// (null before reduced before increased function) fill the two slots.
pub fn build_diplotype(variants: &[VariantRecord], gene: &str) -> String {
    // (star allele, strongest genotype seen) in first-appearance order
    let mut observed: Vec<(&str, String)> = Vec::new();
    for variant in filter_for_gene(variants, gene) {
        let Some(allele) = variant
            .star_allele
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        else {
            continue;
        };
        let genotype = variant
            .genotype
            .as_deref()
            .map(clean_genotype)
            .unwrap_or_else(|| "0/1".to_string());

        match observed.iter_mut().find(|(a, _)| *a == allele) {
            Some(entry) if genotype == HOMOZYGOUS_ALT => entry.1 = genotype,
            Some(_) => {}
            None => observed.push((allele, genotype)),
        }
    }

    observed.sort_by_key(|(allele, _)| allele_severity(allele));

    let mut alleles: Vec<&str> = Vec::with_capacity(2);
    for (allele, genotype) in &observed {
        if alleles.len() >= 2 {
            break;
        }
        alleles.push(*allele);
        if is_homozygous_alt(genotype) {
            alleles.push(*allele);
        }
    }

    let mut pair = match alleles.as_slice() {
        [] => return format!("{REFERENCE_ALLELE}/{REFERENCE_ALLELE}"),
        [only] => [REFERENCE_ALLELE, *only],
        [first, second, ..] => [*first, *second],
    };
    pair.sort_unstable();
    format!("{}/{}", pair[0], pair[1])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::entities::variant::Zygosity;

    fn carried(gene: &str, star: Option<&str>, genotype: Option<&str>) -> VariantRecord {
        VariantRecord {
            chromosome: "chr1".into(),
            position: 1,
            id: None,
            reference: "G".into(),
            alternates: vec!["A".into()],
            quality: ".".into(),
            filter: "PASS".into(),
            info: BTreeMap::new(),
            gene: Some(gene.into()),
            star_allele: star.map(str::to_string),
            genotype: genotype.map(str::to_string),
            zygosity: Zygosity::Heterozygous,
        }
    }

    #[test]
    fn empty_input_is_wildtype() {
        assert_eq!(build_diplotype(&[], "CYP2D6"), "*1/*1");
        let unannotated = [carried("CYP2D6", None, Some("0/1"))];
        assert_eq!(build_diplotype(&unannotated, "CYP2D6"), "*1/*1");
    }

    #[test]
    fn homozygous_alt_fills_both_slots() {
        let variants = [carried("CYP2D6", Some("*4"), Some("1/1"))];
        assert_eq!(build_diplotype(&variants, "CYP2D6"), "*4/*4");
    }

    #[test]
    fn single_het_pairs_with_reference() {
        let variants = [carried("CYP2C19", Some("*17"), Some("0|1"))];
        assert_eq!(build_diplotype(&variants, "CYP2C19"), "*1/*17");
    }

    #[test]
    fn only_the_target_gene_is_considered() {
        let variants = [
            carried("CYP2C19", Some("*2"), Some("0/1")),
            carried("CYP2D6", Some("*4"), Some("1/1")),
        ];
        assert_eq!(build_diplotype(&variants, "CYP2C19"), "*1/*2");
    }

    #[test]
    fn most_severe_alleles_win_when_more_than_two_are_carried() {
        let variants = [
            carried("CYP2D6", Some("*41"), Some("0/1")),
            carried("CYP2D6", Some("*2xN"), Some("0/1")),
            carried("CYP2D6", Some("*4"), Some("0/1")),
        ];
        assert_eq!(build_diplotype(&variants, "CYP2D6"), "*4/*41");
    }

    #[test]
    fn later_homozygous_call_upgrades_earlier_het() {
        let variants = [
            carried("CYP2C9", Some("*3"), Some("0/1")),
            carried("CYP2C9", Some("*3"), Some("1|1")),
            carried("CYP2C9", Some("*2"), Some("0/1")),
        ];
        assert_eq!(build_diplotype(&variants, "CYP2C9"), "*3/*3");
    }

    #[test]
    fn compound_het_row_contributes_one_copy() {
        let variants = [carried("TPMT", Some("*3C"), Some("1/2"))];
        assert_eq!(build_diplotype(&variants, "TPMT"), "*1/*3C");
    }

    #[test]
    fn never_more_than_two_components() {
        let variants = [
            carried("DPYD", Some("*2A"), Some("1/1")),
            carried("DPYD", Some("*13"), Some("1/1")),
            carried("DPYD", Some("HapB3"), None),
        ];
        let diplotype = build_diplotype(&variants, "DPYD");
        assert_eq!(diplotype.split('/').count(), 2);
        assert_eq!(diplotype, "*2A/*2A");
    }
}
