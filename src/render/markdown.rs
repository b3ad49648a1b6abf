use std::sync::OnceLock;

use minijinja::{Environment, context};

use crate::entities::drug::{Drug, DrugInfo};
use crate::entities::phenotype::PhenotypeResult;
use crate::entities::report::{DrugReport, MultiDrugReport};
use crate::error::PharmaGuardError;
use crate::transform::risk::RiskEvaluation;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn env() -> Result<&'static Environment<'static>, PharmaGuardError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("report.md.j2", include_str!("../../templates/report.md.j2"))?;
    env.add_template("drug.md.j2", include_str!("../../templates/drug.md.j2"))?;
    env.add_template(
        "drug_body.md.j2",
        include_str!("../../templates/drug_body.md.j2"),
    )?;
    env.add_template(
        "summary.md.j2",
        include_str!("../../templates/summary.md.j2"),
    )?;
    env.add_template(
        "phenotype.md.j2",
        include_str!("../../templates/phenotype.md.j2"),
    )?;
    env.add_template("risk.md.j2", include_str!("../../templates/risk.md.j2"))?;
    env.add_template("drugs.md.j2", include_str!("../../templates/drugs.md.j2"))?;

    Ok(ENV.get_or_init(|| env))
}

pub fn report_markdown(report: &MultiDrugReport) -> Result<String, PharmaGuardError> {
    let tmpl = env()?.get_template("report.md.j2")?;
    Ok(tmpl.render(context! {
        patient_id => &report.patient_id,
        timestamp => &report.timestamp,
        quality_metrics => &report.quality_metrics,
        results => &report.results,
    })?)
}

/// Severity-ordered overview, most severe first.
pub fn summary_markdown(report: &MultiDrugReport) -> Result<String, PharmaGuardError> {
    let tmpl = env()?.get_template("summary.md.j2")?;
    Ok(tmpl.render(context! {
        patient_id => &report.patient_id,
        total => report.results.len(),
        flagged => report.flagged_count(),
        average_confidence => report.average_confidence(),
        results => report.sorted_by_severity(),
    })?)
}

pub fn drug_markdown(result: &DrugReport) -> Result<String, PharmaGuardError> {
    let tmpl = env()?.get_template("drug.md.j2")?;
    Ok(tmpl.render(context! { r => result })?)
}

pub fn phenotype_markdown(result: &PhenotypeResult) -> Result<String, PharmaGuardError> {
    let tmpl = env()?.get_template("phenotype.md.j2")?;
    Ok(tmpl.render(context! {
        gene => result.gene.as_str(),
        diplotype => &result.diplotype,
        phenotype => result.phenotype.code(),
        phenotype_label => &result.phenotype_label,
        activity_score => result.activity_score,
    })?)
}

pub fn risk_markdown(
    drug: Drug,
    phenotype_code: &str,
    evaluation: &RiskEvaluation,
) -> Result<String, PharmaGuardError> {
    let tmpl = env()?.get_template("risk.md.j2")?;
    Ok(tmpl.render(context! {
        drug => drug.as_str(),
        gene => drug.gene().as_str(),
        phenotype => phenotype_code,
        risk_assessment => &evaluation.risk_assessment,
        recommendation => &evaluation.recommendation,
    })?)
}

pub fn drugs_markdown() -> Result<String, PharmaGuardError> {
    let rows: Vec<DrugInfo> = Drug::ALL.into_iter().map(Drug::info).collect();
    let tmpl = env()?.get_template("drugs.md.j2")?;
    Ok(tmpl.render(context! { drugs => rows })?)
}
