//! Command tree and command execution for the `pharmaguard` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::entities::analysis::analyze;
use crate::entities::drug::{Drug, DrugInfo, Gene};
use crate::entities::phenotype::Phenotype;
use crate::entities::report::{DrugReport, MultiDrugReport};
use crate::entities::store::AnalysisStore;
use crate::error::PharmaGuardError;
use crate::render::{json, markdown};
use crate::transform::phenotype::map_phenotype;
use crate::transform::risk::evaluate_risk;

pub mod input;

#[derive(Parser, Debug)]
#[command(
    name = "pharmaguard",
    version,
    about = "Pharmacogenomic risk classification from VCF files",
    after_help = "\
Examples:
  pharmaguard analyze patient.vcf
  pharmaguard analyze patient.vcf.gz --drug codeine --drug clopidogrel --save
  pharmaguard analyze patient.vcf --summary --json
  pharmaguard phenotype CYP2D6 '*1/*4'
  pharmaguard risk warfarin IM
  pharmaguard last --drug codeine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON instead of Markdown
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a VCF file against the supported drugs
    Analyze {
        /// Path to a .vcf or .vcf.gz file (max 5 MiB)
        file: PathBuf,
        /// Drug to analyze (repeatable; all supported drugs when omitted)
        #[arg(short, long = "drug", value_name = "DRUG")]
        drugs: Vec<String>,
        /// Print the severity-ordered overview instead of the full report
        #[arg(long)]
        summary: bool,
        /// Keep the report for later `last` invocations
        #[arg(long)]
        save: bool,
    },
    /// Map a gene diplotype to its phenotype
    Phenotype {
        /// Gene symbol (CYP2D6, CYP2C19, CYP2C9, SLCO1B1, TPMT, DPYD)
        gene: String,
        /// Diplotype such as *1/*4
        diplotype: String,
    },
    /// Evaluate drug risk for a phenotype of the drug's target gene
    Risk {
        drug: String,
        /// Phenotype code (PM, IM, NM, RM, URM)
        phenotype: String,
    },
    /// List supported drugs and their target genes
    Drugs,
    /// Show the last saved analysis
    Last {
        /// Select one drug from the saved analysis
        #[arg(short, long)]
        drug: Option<String>,
    },
    /// Clear the saved analysis
    Clear,
    /// Show version
    Version,
}

#[derive(Serialize)]
struct RiskSummary<'a> {
    patient_id: &'a str,
    total: usize,
    flagged: usize,
    average_confidence: u8,
    results: Vec<&'a DrugReport>,
}

impl<'a> RiskSummary<'a> {
    fn new(report: &'a MultiDrugReport) -> Self {
        Self {
            patient_id: &report.patient_id,
            total: report.results.len(),
            flagged: report.flagged_count(),
            average_confidence: report.average_confidence(),
            results: report.sorted_by_severity(),
        }
    }
}

fn parse_drugs(values: &[String]) -> Result<Vec<Drug>, PharmaGuardError> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .filter(|v| !v.trim().is_empty())
        .map(str::parse)
        .collect()
}

fn render_report(
    report: &MultiDrugReport,
    summary: bool,
    json: bool,
) -> Result<String, PharmaGuardError> {
    match (summary, json) {
        (true, true) => json::to_pretty(&RiskSummary::new(report)),
        (true, false) => markdown::summary_markdown(report),
        (false, true) => json::to_pretty(report),
        (false, false) => markdown::report_markdown(report),
    }
}

/// Runs a parsed command against the default store location.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let mut store = AnalysisStore::default();
    execute(cli, &mut store).await
}

pub async fn execute(cli: Cli, store: &mut AnalysisStore) -> anyhow::Result<String> {
    let json = cli.json;
    match cli.command {
        Commands::Analyze {
            file,
            drugs,
            summary,
            save,
        } => {
            let drugs = parse_drugs(&drugs)?;
            let text = input::read_vcf_file(&file).await?;
            let report = analyze(&text, &drugs)?;
            let out = render_report(&report, summary, json)?;
            if save {
                store.set_report(report).await?;
            }
            Ok(out)
        }
        Commands::Phenotype { gene, diplotype } => {
            let gene: Gene = gene.parse()?;
            let result = map_phenotype(gene, &diplotype);
            if json {
                Ok(json::to_pretty(&result)?)
            } else {
                Ok(markdown::phenotype_markdown(&result)?)
            }
        }
        Commands::Risk { drug, phenotype } => {
            let drug: Drug = drug.parse()?;
            let phenotype: Phenotype = phenotype.parse()?;
            let evaluation = evaluate_risk(drug, drug.gene(), phenotype);
            if json {
                Ok(json::to_pretty(&evaluation)?)
            } else {
                Ok(markdown::risk_markdown(drug, phenotype.code(), &evaluation)?)
            }
        }
        Commands::Drugs => {
            if json {
                let rows: Vec<DrugInfo> = Drug::ALL.into_iter().map(Drug::info).collect();
                Ok(json::to_pretty(&rows)?)
            } else {
                Ok(markdown::drugs_markdown()?)
            }
        }
        Commands::Last { drug } => {
            let drug = drug.as_deref().map(str::parse::<Drug>).transpose()?;
            let Some(report) = store.report().await.cloned() else {
                return Ok(if json {
                    "null".to_string()
                } else {
                    "No saved analysis. Run `pharmaguard analyze <FILE> --save` first.".to_string()
                });
            };
            let Some(drug) = drug else {
                return Ok(render_report(&report, false, json)?);
            };
            let Some(result) = report.result_for(drug).cloned() else {
                return Err(PharmaGuardError::InvalidArgument(format!(
                    "Saved analysis has no result for {drug}"
                ))
                .into());
            };
            let out = if json {
                json::to_pretty(&result)?
            } else {
                markdown::drug_markdown(&result)?
            };
            store.set_selected(result).await?;
            Ok(out)
        }
        Commands::Clear => {
            store.clear().await?;
            Ok(format!("Cleared saved analysis in {}", store.dir().display()))
        }
        Commands::Version => Ok(format!("pharmaguard {}", env!("CARGO_PKG_VERSION"))),
    }
}
