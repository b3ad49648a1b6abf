use pharmaguard::entities::analysis::analyze_at;
use pharmaguard::entities::drug::{Drug, Gene};
use pharmaguard::entities::phenotype::Phenotype;
use pharmaguard::entities::report::{RiskLabel, RiskLevel};
use pharmaguard::entities::variant::Zygosity;
use pharmaguard::sources::vcf;
use pharmaguard::transform::diplotype::build_diplotype;
use pharmaguard::transform::phenotype::{map_phenotype, normalize_diplotype};
use pharmaguard::transform::risk::{confidence, evaluate_risk};
use time::OffsetDateTime;
use time::macros::datetime;

const HEADER: &str =
    "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1\n";

fn vcf(rows: &[&str]) -> String {
    let mut out = HEADER.to_string();
    for row in rows {
        out.push_str(&row.replace(' ', "\t"));
        out.push('\n');
    }
    out
}

fn now() -> OffsetDateTime {
    datetime!(2025-02-19 08:15:30 UTC)
}

#[test]
fn homozygous_cyp2d6_star4_flows_through_every_stage() {
    let text = vcf(&["chr22 42130692 rs3892097 G A . . GENE=CYP2D6;STAR=*4 GT 1/1"]);

    let parsed = vcf::parse(&text).expect("parse");
    assert_eq!(parsed.sample_id.as_deref(), Some("SAMPLE1"));
    let variant = &parsed.variants[0];
    assert_eq!(variant.gene.as_deref(), Some("CYP2D6"));
    assert_eq!(variant.star_allele.as_deref(), Some("*4"));
    assert_eq!(variant.genotype.as_deref(), Some("1/1"));
    assert_eq!(variant.zygosity, Zygosity::HomozygousAlternate);

    let diplotype = build_diplotype(&parsed.variants, "CYP2D6");
    assert_eq!(diplotype, "*4/*4");

    let phenotype = map_phenotype(Gene::Cyp2d6, &diplotype);
    assert_eq!(phenotype.phenotype, Phenotype::Pm);
    assert_eq!(phenotype.phenotype_label, "Poor Metabolizer");

    let evaluation = evaluate_risk(Drug::Codeine, Gene::Cyp2d6, phenotype.phenotype);
    assert_eq!(evaluation.risk_assessment.risk_level, RiskLevel::Critical);
    assert_eq!(evaluation.risk_assessment.risk_label, RiskLabel::Ineffective);
}

#[test]
fn warfarin_without_cyp2c9_variants_is_unknown_at_30() {
    let text = vcf(&["chr10 94781859 rs4244285 G A . . GENE=CYP2C19;STAR=*2 GT 0/1"]);
    let report = analyze_at(&text, &[Drug::Warfarin], now()).expect("report");
    let warfarin = report.result_for(Drug::Warfarin).expect("warfarin");

    assert_eq!(warfarin.risk_assessment.risk_level, RiskLevel::Unknown);
    assert_eq!(warfarin.risk_assessment.confidence_score, 30);
    assert!(
        warfarin
            .clinical_recommendations
            .dosing_guidance
            .contains("wildtype")
    );
}

#[test]
fn no_pgx_variants_anywhere_gives_confidence_10() {
    let text = vcf(&[
        "chr1 1000 rs1 G A . . . GT 0/1",
        "chr2 2000 rs2 C T . . . GT 1/1",
    ]);
    let report = analyze_at(&text, &[], now()).expect("report");
    assert_eq!(report.results.len(), 6);
    for result in &report.results {
        assert_eq!(result.risk_assessment.risk_level, RiskLevel::Unknown);
        assert_eq!(result.risk_assessment.confidence_score, 10);
    }
}

#[test]
fn heterozygous_cyp2c19_star2_override_for_clopidogrel() {
    let text = vcf(&["chr10 94781859 rs4244285 G A . . GENE=CYP2C19;STAR=*2 GT 0/1"]);
    let report = analyze_at(&text, &[Drug::Clopidogrel], now()).expect("report");
    let result = report.result_for(Drug::Clopidogrel).expect("clopidogrel");

    assert_eq!(result.risk_assessment.risk_level, RiskLevel::Moderate);
    assert_eq!(result.risk_assessment.risk_label, RiskLabel::AdjustDosage);
    assert_eq!(result.risk_assessment.confidence_score, 90);
}

#[test]
fn phenotype_is_independent_of_allele_order() {
    let pairs = [
        (Gene::Cyp2d6, "*1", "*4"),
        (Gene::Cyp2d6, "*10", "*41"),
        (Gene::Cyp2c19, "*17", "*4"),
        (Gene::Cyp2c9, "*2", "*3"),
        (Gene::Tpmt, "*3A", "*1"),
        (Gene::Dpyd, "*2A", "HapB3"),
        (Gene::Slco1b1, "*5", "*15"),
    ];
    for (gene, a, b) in pairs {
        let forward = map_phenotype(gene, &format!("{a}/{b}"));
        let reverse = map_phenotype(gene, &format!("{b}/{a}"));
        assert_eq!(forward, reverse, "{gene} {a}/{b}");
        assert_eq!(normalize_diplotype(&forward.diplotype), forward.diplotype);
    }
}

#[test]
fn confidence_depends_only_on_risk_level() {
    for drug in Drug::ALL {
        for phenotype in Phenotype::ALL {
            let evaluation = evaluate_risk(drug, drug.gene(), phenotype);
            let score = evaluation.risk_assessment.confidence_score;
            assert!([95, 92, 90, 85, 20].contains(&score));
            assert_eq!(score, confidence(evaluation.risk_assessment.risk_level));
        }
    }
}

#[test]
fn reader_excludes_reference_calls_and_bad_indices() {
    let text = vcf(&[
        "chr22 42130692 rs3892097 G A . . . GT 0/0",
        "chr10 94781859 rs4244285 G A,T . . . GT 1/2",
        "chr10 94780653 rs4986893 G A,T . . . GT 2/5",
    ]);
    let parsed = vcf::parse(&text).expect("parse");

    assert_eq!(parsed.variants.len(), 1);
    assert_eq!(parsed.variants[0].zygosity, Zygosity::CompoundHeterozygous);
    assert_eq!(parsed.variants[0].id.as_deref(), Some("rs4244285"));
}

#[test]
fn diplotype_has_two_components_and_defaults_to_wildtype() {
    assert_eq!(build_diplotype(&[], "CYP2D6"), "*1/*1");

    let text = vcf(&[
        "chr22 1 rs3892097 G A . . GENE=CYP2D6;STAR=*4 GT 0/1",
        "chr22 2 rs5030655 G A . . GENE=CYP2D6;STAR=*6 GT 0/1",
        "chr22 3 rs1065852 G A . . GENE=CYP2D6;STAR=*10 GT 0/1",
    ]);
    let parsed = vcf::parse(&text).expect("parse");
    let diplotype = build_diplotype(&parsed.variants, "CYP2D6");
    assert_eq!(diplotype.split('/').count(), 2);
    assert_eq!(diplotype, "*4/*6");
}
