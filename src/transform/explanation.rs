//! Deterministic, template-based narrative for a drug/gene result.

use std::sync::OnceLock;

use minijinja::{Environment, UndefinedBehavior, context};

use crate::entities::drug::{Drug, Gene};
use crate::entities::phenotype::Phenotype;
use crate::entities::report::Explanation;
use crate::error::PharmaGuardError;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

pub const BASE_CITATIONS: [&str; 3] = [
    "CPIC Guidelines - Clinical Pharmacogenetics Implementation Consortium. https://cpicpgx.org/guidelines/",
    "PharmGKB - Pharmacogenomics Knowledge Base. https://www.pharmgkb.org/",
    "PharmVar - Pharmacogene Variation Consortium. https://www.pharmvar.org/",
];

const TEMPLATES: &[(&str, &str)] = &[
    (
        "CODEINE.summary",
        "CYP2D6 {{ phenotype_label }} status detected. CYP2D6 is the primary enzyme responsible for converting codeine (a prodrug) into its active metabolite morphine. {{ risk_explanation }}",
    ),
    (
        "CODEINE.mechanism",
        "Codeine undergoes O-demethylation by hepatic CYP2D6 to form morphine, which is the primary analgesic metabolite. The CYP2D6 gene is highly polymorphic, with over 100 known allelic variants. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} status with an activity score that {{ activity_explanation }}. This directly impacts the rate and extent of codeine-to-morphine conversion, {{ clinical_consequence }}",
    ),
    (
        "CODEINE.patient",
        "Your body uses an enzyme called CYP2D6 to convert codeine into morphine, which is the part of the drug that actually relieves pain. Your genetic test shows you are a {{ phenotype_label }}, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
    (
        "CLOPIDOGREL.summary",
        "CYP2C19 {{ phenotype_label }} status detected. CYP2C19 is the primary enzyme responsible for activating clopidogrel. {{ risk_explanation }}",
    ),
    (
        "CLOPIDOGREL.mechanism",
        "Clopidogrel is a prodrug that requires two sequential CYP-dependent oxidation steps for activation, with CYP2C19 playing the primary role. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} status, {{ activity_explanation }}. {{ clinical_consequence }}",
    ),
    (
        "CLOPIDOGREL.patient",
        "Clopidogrel is a blood thinner that needs to be activated by your body before it can work. Your genetic test shows you are a {{ phenotype_label }} for the enzyme CYP2C19, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
    (
        "WARFARIN.summary",
        "CYP2C9 {{ phenotype_label }} status detected. CYP2C9 metabolizes the more potent S-enantiomer of warfarin. {{ risk_explanation }}",
    ),
    (
        "WARFARIN.mechanism",
        "Warfarin is administered as a racemic mixture. The S-enantiomer is 3-5 times more potent than the R-enantiomer and is primarily metabolized by CYP2C9. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} status, {{ activity_explanation }}. {{ clinical_consequence }}",
    ),
    (
        "WARFARIN.patient",
        "Warfarin is a blood thinner used to prevent blood clots. Your body breaks down warfarin using an enzyme called CYP2C9. Your genetic test shows you are a {{ phenotype_label }}, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
    (
        "SIMVASTATIN.summary",
        "SLCO1B1 {{ phenotype_label }} status detected. SLCO1B1 encodes the hepatic uptake transporter OATP1B1, which facilitates simvastatin acid uptake into the liver. {{ risk_explanation }}",
    ),
    (
        "SIMVASTATIN.mechanism",
        "SLCO1B1 encodes the organic anion transporting polypeptide 1B1 (OATP1B1), a hepatic influx transporter critical for simvastatin lactone and acid uptake into hepatocytes. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} transporter function, {{ activity_explanation }}. {{ clinical_consequence }}",
    ),
    (
        "SIMVASTATIN.patient",
        "Simvastatin is a cholesterol-lowering medication. Your body uses a transporter protein called OATP1B1 to move this drug into your liver where it works. Your genetic test shows you have {{ phenotype_label }} transporter function, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
    (
        "AZATHIOPRINE.summary",
        "TPMT {{ phenotype_label }} status detected. TPMT is a key enzyme in the metabolism of thiopurine drugs including azathioprine. {{ risk_explanation }}",
    ),
    (
        "AZATHIOPRINE.mechanism",
        "Azathioprine is converted to 6-mercaptopurine (6-MP), which undergoes competing metabolic pathways. TPMT catalyzes S-methylation of 6-MP, diverting it away from cytotoxic thioguanine nucleotide (TGN) formation. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} TPMT activity, {{ activity_explanation }}. {{ clinical_consequence }}",
    ),
    (
        "AZATHIOPRINE.patient",
        "Azathioprine is an immunosuppressant medication. Your body uses an enzyme called TPMT to break it down. Your genetic test shows you are a {{ phenotype_label }}, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
    (
        "FLUOROURACIL.summary",
        "DPYD {{ phenotype_label }} status detected. Dihydropyrimidine dehydrogenase (DPD), encoded by DPYD, is the rate-limiting enzyme in fluoropyrimidine catabolism. {{ risk_explanation }}",
    ),
    (
        "FLUOROURACIL.mechanism",
        "Dihydropyrimidine dehydrogenase (DPD) is the initial and rate-limiting enzyme in the catabolism of 5-fluorouracil, responsible for degrading >80% of administered dose. The detected diplotype {{ diplotype }} results in {{ phenotype_label }} DPD activity, {{ activity_explanation }}. {{ clinical_consequence }}",
    ),
    (
        "FLUOROURACIL.patient",
        "5-Fluorouracil (5-FU) is a chemotherapy drug. Your body uses an enzyme called DPD to break down this drug after it does its job. Your genetic test shows you are a {{ phenotype_label }}, which means {{ patient_explanation }}. {{ patient_action }}",
    ),
];

fn env() -> Result<&'static Environment<'static>, PharmaGuardError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(ENV.get_or_init(|| env))
}

fn guideline_citation(drug: Drug) -> &'static str {
    match drug {
        Drug::Codeine => {
            "Crews KR, et al. Clinical Pharmacogenetics Implementation Consortium Guidelines for Cytochrome P450 2D6 Genotype and Codeine Therapy: 2014 update. Clin Pharmacol Ther. 2014;95(4):376-382."
        }
        Drug::Clopidogrel => {
            "Scott SA, et al. Clinical Pharmacogenetics Implementation Consortium Guidelines for CYP2C19 Genotype and Clopidogrel Therapy: 2013 update. Clin Pharmacol Ther. 2013;94(3):317-323."
        }
        Drug::Warfarin => {
            "Johnson JA, et al. Clinical Pharmacogenetics Implementation Consortium (CPIC) Guidelines for Pharmacogenetics-Guided Warfarin Dosing: 2017 Update. Clin Pharmacol Ther. 2017;102(3):397-404."
        }
        Drug::Simvastatin => {
            "Ramsey LB, et al. The Clinical Pharmacogenetics Implementation Consortium Guideline for SLCO1B1 and Simvastatin-Induced Myopathy: 2014 Update. Clin Pharmacol Ther. 2014;96(4):423-428."
        }
        Drug::Azathioprine => {
            "Relling MV, et al. Clinical Pharmacogenetics Implementation Consortium Guidelines for Thiopurine Methyltransferase Genotype and Thiopurine Dosing: 2013 Update. Clin Pharmacol Ther. 2013;93(4):324-325."
        }
        Drug::Fluorouracil => {
            "Amstutz U, et al. Clinical Pharmacogenetics Implementation Consortium (CPIC) Guideline for Dihydropyrimidine Dehydrogenase Genotype and Fluoropyrimidine Dosing: 2017 Update. Clin Pharmacol Ther. 2018;103(2):210-216."
        }
    }
}

fn risk_explanation(phenotype: Phenotype, drug: &str) -> String {
    match phenotype {
        Phenotype::Pm => format!(
            "This patient has significantly reduced or absent enzyme activity, which substantially impacts {drug} metabolism and clinical outcomes."
        ),
        Phenotype::Im => format!(
            "This patient has reduced enzyme activity, which may moderately impact {drug} metabolism and clinical response."
        ),
        Phenotype::Nm => format!(
            "This patient has normal enzyme activity. Standard {drug} metabolism and clinical response are expected."
        ),
        Phenotype::Rm => format!(
            "This patient has increased enzyme activity, which may result in enhanced {drug} metabolism."
        ),
        Phenotype::Urm => format!(
            "This patient has significantly increased enzyme activity, which may substantially alter {drug} metabolism and increase risk of adverse effects."
        ),
    }
}

fn activity_explanation(phenotype: Phenotype) -> &'static str {
    match phenotype {
        Phenotype::Pm => "indicating absent or severely reduced enzymatic activity",
        Phenotype::Im => "indicating reduced enzymatic activity compared to normal metabolizers",
        Phenotype::Nm => "indicating normal enzymatic activity",
        Phenotype::Rm => "indicating increased enzymatic activity above the normal range",
        Phenotype::Urm => "indicating significantly elevated enzymatic activity",
    }
}

fn clinical_consequence(phenotype: Phenotype, drug: &str) -> String {
    match phenotype {
        Phenotype::Pm => format!(
            "This significantly alters the pharmacokinetics of {drug}, requiring major dosing adjustments or drug avoidance."
        ),
        Phenotype::Im => format!(
            "This may result in altered {drug} pharmacokinetics, potentially requiring dosing modifications."
        ),
        Phenotype::Nm => format!(
            "Standard pharmacokinetics of {drug} are expected, and standard dosing is appropriate."
        ),
        Phenotype::Rm => format!("Enhanced metabolism of {drug} may result in altered drug exposure."),
        Phenotype::Urm => format!(
            "Significantly enhanced metabolism of {drug} may result in dangerous changes in drug exposure."
        ),
    }
}

fn patient_explanation(phenotype: Phenotype) -> &'static str {
    match phenotype {
        Phenotype::Pm => {
            "your body breaks down this medication much more slowly than most people, or cannot break it down at all"
        }
        Phenotype::Im => "your body breaks down this medication somewhat more slowly than most people",
        Phenotype::Nm => "your body processes this medication at a normal rate",
        Phenotype::Rm => "your body breaks down this medication faster than most people",
        Phenotype::Urm => "your body breaks down this medication much faster than most people",
    }
}

fn patient_action(phenotype: Phenotype) -> &'static str {
    match phenotype {
        Phenotype::Pm => {
            "Your doctor may need to use a different medication or a much lower dose. Do not change your medication without consulting your healthcare provider."
        }
        Phenotype::Im => {
            "Your doctor may consider adjusting your dose or monitoring you more closely. Discuss this result with your healthcare provider."
        }
        Phenotype::Nm => {
            "Standard dosing should work well for you. Continue taking your medication as prescribed."
        }
        Phenotype::Rm => {
            "Your doctor may want to monitor your response more closely. Discuss this result with your healthcare provider."
        }
        Phenotype::Urm => {
            "Your doctor may need to use a different medication. This result is important to share with all your healthcare providers."
        }
    }
}

fn generic_explanation(drug: Drug, gene: Gene, phenotype: Phenotype) -> Explanation {
    Explanation {
        summary: format!(
            "{gene} {} status detected for {drug}. Consult CPIC guidelines for specific recommendations.",
            phenotype.generic_label()
        ),
        mechanism: format!("No detailed mechanism template available for {drug}-{gene} interaction."),
        patient_friendly: format!(
            "Your genetic test found a result that may affect how your body processes {drug}. Please discuss with your doctor."
        ),
        citations: BASE_CITATIONS.iter().map(|c| c.to_string()).collect(),
    }
}

/// Builds the summary, mechanism and patient-facing text for a result.
///
/// Only the drug's own guideline gene has a detailed narrative; any other
/// pairing gets a generic explanation with the base citations.
pub fn generate_explanation(
    drug: Drug,
    gene: Gene,
    phenotype: Phenotype,
    diplotype: &str,
) -> Result<Explanation, PharmaGuardError> {
    if gene != drug.gene() {
        return Ok(generic_explanation(drug, gene, phenotype));
    }

    let drug_lower = drug.lowercase();
    let ctx = context! {
        phenotype_label => phenotype.generic_label(),
        diplotype => diplotype,
        risk_explanation => risk_explanation(phenotype, &drug_lower),
        activity_explanation => activity_explanation(phenotype),
        clinical_consequence => clinical_consequence(phenotype, &drug_lower),
        patient_explanation => patient_explanation(phenotype),
        patient_action => patient_action(phenotype),
    };

    let env = env()?;
    let render = |part: &str| -> Result<String, PharmaGuardError> {
        let name = format!("{drug}.{part}");
        Ok(env.get_template(&name)?.render(&ctx)?)
    };

    let mut citations: Vec<String> = BASE_CITATIONS.iter().map(|c| c.to_string()).collect();
    citations.push(guideline_citation(drug).to_string());

    Ok(Explanation {
        summary: render("summary")?,
        mechanism: render("mechanism")?,
        patient_friendly: render("patient")?,
        citations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_drug_has_all_three_templates() {
        for drug in Drug::ALL {
            for phenotype in Phenotype::ALL {
                let explanation =
                    generate_explanation(drug, drug.gene(), phenotype, "*1/*1").expect("render");
                assert!(!explanation.summary.contains("{{"), "{drug}");
                assert!(!explanation.mechanism.contains("{{"), "{drug}");
                assert!(!explanation.patient_friendly.contains("{{"), "{drug}");
                assert_eq!(explanation.citations.len(), 4);
            }
        }
    }

    #[test]
    fn codeine_poor_metabolizer_text() {
        let explanation =
            generate_explanation(Drug::Codeine, Gene::Cyp2d6, Phenotype::Pm, "*4/*4").expect("render");
        assert!(explanation
            .summary
            .starts_with("CYP2D6 Poor Metabolizer status detected."));
        assert!(explanation
            .summary
            .ends_with("substantially impacts codeine metabolism and clinical outcomes."));
        assert!(explanation.mechanism.contains("The detected diplotype *4/*4 results in"));
        assert!(explanation.mechanism.ends_with("or drug avoidance."));
        assert!(explanation.citations[3].starts_with("Crews KR"));
    }

    #[test]
    fn diplotype_is_not_html_escaped() {
        let explanation = generate_explanation(
            Drug::Fluorouracil,
            Gene::Dpyd,
            Phenotype::Im,
            "*1/c.2846A>T",
        )
        .expect("render");
        assert!(explanation.mechanism.contains("*1/c.2846A>T"));
        assert!(explanation.mechanism.contains(">80% of administered dose"));
    }

    #[test]
    fn mismatched_gene_gets_generic_text() {
        let explanation =
            generate_explanation(Drug::Warfarin, Gene::Tpmt, Phenotype::Nm, "*1/*1").expect("render");
        assert_eq!(
            explanation.summary,
            "TPMT Normal Metabolizer status detected for WARFARIN. Consult CPIC guidelines for specific recommendations."
        );
        assert_eq!(explanation.citations.len(), 3);
    }
}
