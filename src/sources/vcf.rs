//! Single-sample VCF reader for PGx marker files.
//!
//! Structural problems (size, missing headers, wrong columns) fail the whole
//! parse. Row-level problems never do: an anomalous row is dropped with a
//! `debug!` trace and the rest of the file is still read. The returned
//! variant list only holds variants the patient actually carries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::entities::variant::{VariantRecord, Zygosity};
use crate::error::VcfError;
use crate::sources::markers;

pub const MAX_VCF_BYTES: usize = 5 * 1024 * 1024;

const FILE_FORMAT_PREFIX: &str = "##fileformat=";
const FORMAT_FAMILY: &str = "VCF";
const COLUMN_HEADER_PREFIX: &str = "#CHROM";
const MIN_DATA_COLUMNS: usize = 5;
const DEFAULT_GENOTYPE: &str = "0/1";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedVcf {
    pub variants: Vec<VariantRecord>,
    pub sample_id: Option<String>,
    pub file_format: String,
}

/// Why a data row was left out of the variant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ReferenceOnly,
    HomozygousReference,
    StructuralVariant,
    EmptyAlt,
    MissingGenotype,
    UnsupportedPloidy(usize),
    MalformedGenotype,
    InvalidAltIndex { index: u64, alt_count: usize },
}

impl SkipReason {
    pub fn zygosity(&self) -> Zygosity {
        match self {
            Self::ReferenceOnly | Self::HomozygousReference => Zygosity::HomozygousReference,
            _ => Zygosity::Unknown,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceOnly => f.write_str("reference only variant"),
            Self::HomozygousReference => f.write_str("homozygous reference call"),
            Self::StructuralVariant => f.write_str("structural variant"),
            Self::EmptyAlt => f.write_str("empty ALT after cleaning"),
            Self::MissingGenotype => f.write_str("missing genotype"),
            Self::UnsupportedPloidy(n) => write!(f, "unsupported ploidy ({n} alleles)"),
            Self::MalformedGenotype => f.write_str("malformed genotype"),
            Self::InvalidAltIndex { index, alt_count } => {
                write!(f, "invalid ALT index ({index} > {alt_count})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Whitespace,
}

impl Delimiter {
    fn detect(header_line: &str) -> Self {
        if header_line.contains('\t') {
            Self::Tab
        } else {
            Self::Whitespace
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        match self {
            Self::Tab => line.split('\t').collect(),
            Self::Whitespace => whitespace_re().split(line).collect(),
        }
    }
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn allele_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

fn is_symbolic(alt: &str) -> bool {
    alt.starts_with('<') && alt.ends_with('>')
}

/// Normalizes phased genotypes (`0|1`) to the unphased form (`0/1`).
pub fn clean_genotype(gt: &str) -> String {
    gt.replace('|', "/").trim().to_string()
}

/// Splits an INFO column into key/value pairs. Flags map to `"true"`.
pub fn parse_info(info: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let info = info.trim();
    if info.is_empty() || info == "." {
        return out;
    }
    for field in info.split(';').filter(|f| !f.is_empty()) {
        match field.find('=') {
            Some(eq) if eq > 0 => {
                out.insert(field[..eq].to_string(), field[eq + 1..].to_string());
            }
            _ => {
                out.insert(field.to_string(), "true".to_string());
            }
        }
    }
    out
}

fn info_value<'a>(info: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    info.get(key)
        .or_else(|| {
            info.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Picks the carried allele from an inline STAR annotation such as `*1/*4`.
fn resolve_star(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.contains('/') {
        return Some(trimmed.to_string());
    }
    let parts: Vec<&str> = trimmed.split('/').map(str::trim).collect();
    parts
        .iter()
        .find(|p| **p != "*1")
        .or_else(|| parts.first())
        .map(|p| p.to_string())
}

/// Parses raw VCF text into the variants the patient carries.
pub fn parse(text: &str) -> Result<ParsedVcf, VcfError> {
    if text.len() > MAX_VCF_BYTES {
        return Err(VcfError::TooLarge { bytes: text.len() });
    }
    if text.trim().is_empty() {
        return Err(VcfError::Empty);
    }

    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let file_format = lines
        .iter()
        .find_map(|l| l.strip_prefix(FILE_FORMAT_PREFIX))
        .ok_or(VcfError::MissingFileFormat)?;
    if !file_format.starts_with(FORMAT_FAMILY) {
        return Err(VcfError::UnrecognizedFormat(file_format.to_string()));
    }

    let header_index = lines
        .iter()
        .position(|l| l.starts_with(COLUMN_HEADER_PREFIX))
        .ok_or(VcfError::MissingColumnHeader)?;
    let header_line = lines[header_index];
    let delimiter = Delimiter::detect(header_line);
    let header_cols = delimiter.split(header_line);

    for (i, &expected) in REQUIRED_COLUMNS.iter().enumerate() {
        let found = header_cols.get(i).copied();
        if found != Some(expected) {
            return Err(VcfError::ColumnHeaderMismatch {
                expected,
                column: i + 1,
                found: found.unwrap_or("missing").to_string(),
            });
        }
    }
    let sample_id = header_cols.get(9).map(|s| s.to_string());

    let mut variants = Vec::new();
    for (offset, line) in lines[header_index + 1..].iter().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = header_index + offset + 2;
        let cols = delimiter.split(line);
        if cols.len() < MIN_DATA_COLUMNS {
            debug!(line = line_no, columns = cols.len(), "skipping short VCF row");
            continue;
        }
        match process_row(&cols) {
            Ok(record) => variants.push(record),
            Err(reason) => {
                debug!(
                    line = line_no,
                    zygosity = reason.zygosity().label(),
                    %reason,
                    "skipping VCF row"
                );
            }
        }
    }

    debug!(
        variants = variants.len(),
        sample = sample_id.as_deref().unwrap_or("-"),
        "parsed VCF"
    );

    Ok(ParsedVcf {
        variants,
        sample_id,
        file_format: file_format.to_string(),
    })
}

fn field<'a>(cols: &[&'a str], idx: usize) -> &'a str {
    cols.get(idx).copied().unwrap_or("")
}

fn or_dot(value: &str) -> String {
    if value.is_empty() {
        ".".to_string()
    } else {
        value.to_string()
    }
}

fn process_row(cols: &[&str]) -> Result<VariantRecord, SkipReason> {
    let info = parse_info(field(cols, 7));

    let mut gene = info_value(&info, "GENE").map(str::to_string);
    let mut star_allele = info_value(&info, "STAR").and_then(resolve_star);

    let id = Some(field(cols, 2))
        .filter(|id| !id.is_empty() && *id != ".")
        .map(str::to_string);
    if let Some(marker) = id.as_deref().and_then(markers::lookup) {
        gene.get_or_insert_with(|| marker.gene.to_string());
        star_allele.get_or_insert_with(|| marker.star_allele.to_string());
    }

    let alt = field(cols, 4).trim();
    if alt.is_empty() || alt == "." {
        return Err(SkipReason::ReferenceOnly);
    }
    if is_symbolic(alt) {
        return Err(SkipReason::StructuralVariant);
    }
    let alternates: Vec<String> = alt
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    if alternates.is_empty() {
        return Err(SkipReason::EmptyAlt);
    }
    if alternates.iter().any(|a| is_symbolic(a)) {
        return Err(SkipReason::StructuralVariant);
    }

    let (genotype, zygosity) = resolve_genotype(field(cols, 8), field(cols, 9), alternates.len())?;

    Ok(VariantRecord {
        chromosome: or_dot(field(cols, 0)),
        position: field(cols, 1).parse().unwrap_or(0),
        id,
        reference: or_dot(field(cols, 3)),
        alternates,
        quality: or_dot(field(cols, 5)),
        filter: or_dot(field(cols, 6)),
        info,
        gene,
        star_allele,
        genotype: Some(genotype),
        zygosity,
    })
}

/// Extracts and validates the GT call. Rows without genotype columns are
/// treated as carrying one copy of the listed variant.
fn resolve_genotype(
    format: &str,
    sample: &str,
    alt_count: usize,
) -> Result<(String, Zygosity), SkipReason> {
    let default = || (DEFAULT_GENOTYPE.to_string(), Zygosity::Heterozygous);
    if format.is_empty() || sample.is_empty() {
        return Ok(default());
    }
    let Some(gt_index) = format.split(':').position(|k| k == "GT") else {
        return Ok(default());
    };
    let Some(raw_gt) = sample.split(':').nth(gt_index) else {
        return Ok(default());
    };

    let gt = clean_genotype(raw_gt);
    if matches!(gt.as_str(), "" | "." | "./." | "././.") {
        return Err(SkipReason::MissingGenotype);
    }

    let parts: Vec<&str> = gt.split('/').collect();
    if parts.len() != 2 {
        return Err(SkipReason::UnsupportedPloidy(parts.len()));
    }

    let mut indices = [0u32; 2];
    for (slot, part) in indices.iter_mut().zip(&parts) {
        if part.is_empty() || *part == "." {
            return Err(SkipReason::MissingGenotype);
        }
        if !allele_index_re().is_match(part) {
            return Err(SkipReason::MalformedGenotype);
        }
        let index: u64 = part.parse().map_err(|_| SkipReason::MalformedGenotype)?;
        if index > alt_count as u64 {
            return Err(SkipReason::InvalidAltIndex { index, alt_count });
        }
        *slot = index as u32;
    }

    match Zygosity::from_alleles(indices[0], indices[1]) {
        Zygosity::HomozygousReference => Err(SkipReason::HomozygousReference),
        zygosity => Ok((gt, zygosity)),
    }
}

/// Genes present in the variant list, in order of first appearance.
pub fn detected_genes(variants: &[VariantRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for gene in variants.iter().filter_map(|v| v.gene.as_deref()) {
        if !out.iter().any(|g| g == gene) {
            out.push(gene.to_string());
        }
    }
    out
}

pub fn filter_for_gene<'a>(variants: &'a [VariantRecord], gene: &str) -> Vec<&'a VariantRecord> {
    variants.iter().filter(|v| v.is_gene(gene)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vcf(rows: &[&str]) -> String {
        let mut out = String::from(
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1\n",
        );
        for row in rows {
            out.push_str(&row.replace(' ', "\t"));
            out.push('\n');
        }
        out
    }

    fn single(row: &str) -> Option<VariantRecord> {
        let parsed = parse(&vcf(&[row])).expect("valid vcf");
        parsed.variants.into_iter().next()
    }

    #[test]
    fn parses_scenario_row_with_inline_annotation() {
        let text = "##fileformat=VCFv4.2\n#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT SAMPLE1\nchr22 42130692 rs3892097 G A . . GENE=CYP2D6;STAR=*4 GT 1/1\n";
        let parsed = parse(text).expect("valid vcf");
        assert_eq!(parsed.sample_id.as_deref(), Some("SAMPLE1"));
        assert_eq!(parsed.file_format, "VCFv4.2");
        assert_eq!(parsed.variants.len(), 1);

        let v = &parsed.variants[0];
        assert_eq!(v.gene.as_deref(), Some("CYP2D6"));
        assert_eq!(v.star_allele.as_deref(), Some("*4"));
        assert_eq!(v.genotype.as_deref(), Some("1/1"));
        assert_eq!(v.zygosity, Zygosity::HomozygousAlternate);
        assert_eq!(v.position, 42_130_692);
    }

    #[test]
    fn homozygous_reference_rows_are_never_returned() {
        assert!(single("chr1 1 rs1 G A . . . GT 0/0").is_none());
        assert!(single("chr1 1 rs1 G A,T,C . . . GT 0|0").is_none());
        assert!(single("chr1 1 rs1 G . . . . GT 0/1").is_none());
    }

    #[test]
    fn multi_allelic_calls_resolve_or_are_rejected() {
        let v = single("chr1 1 rs1 G A,T . . . GT 1/2").expect("compound het");
        assert_eq!(v.zygosity, Zygosity::CompoundHeterozygous);

        assert!(single("chr1 1 rs1 G A,T . . . GT 2/5").is_none());

        let v = single("chr1 1 rs1 G A,T, . . . GT 2/2").expect("trailing comma alt");
        assert_eq!(v.alternates, vec!["A", "T"]);
        assert_eq!(v.zygosity, Zygosity::HomozygousAlternate);
    }

    #[test]
    fn anomalous_genotypes_are_dropped_without_failing_the_file() {
        let parsed = parse(&vcf(&[
            "chr1 1 rs1 G A . . . GT ./.",
            "chr1 2 rs2 G A . . . GT 0/.",
            "chr1 3 rs3 G A . . . GT 0/1/1",
            "chr1 4 rs4 G A . . . GT 1",
            "chr1 5 rs5 G A . . . GT a/1",
            "chr1 6 rs6 G <DEL> . . . GT 0/1",
            "chr1 7 rs7 G A,<DUP> . . . GT 0/1",
            "chr1 8 rs8 G , . . . GT 0/1",
            "chr1 9 rs9 G A . . . GT 0|1",
        ]))
        .expect("valid vcf");

        assert_eq!(parsed.variants.len(), 1);
        assert_eq!(parsed.variants[0].position, 9);
        assert_eq!(parsed.variants[0].genotype.as_deref(), Some("0/1"));
    }

    #[test]
    fn missing_genotype_columns_default_to_heterozygous() {
        let text = "##fileformat=VCFv4.1\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr10\t94781859\trs4244285\tG\tA\t.\tPASS\t.\n";
        let parsed = parse(text).expect("valid vcf");
        assert!(parsed.sample_id.is_none());
        let v = &parsed.variants[0];
        assert_eq!(v.gene.as_deref(), Some("CYP2C19"));
        assert_eq!(v.star_allele.as_deref(), Some("*2"));
        assert_eq!(v.genotype.as_deref(), Some("0/1"));
        assert_eq!(v.zygosity, Zygosity::Heterozygous);

        let v = single("chr1 1 rs1 G A . . . DP 12").expect("no GT key");
        assert_eq!(v.genotype.as_deref(), Some("0/1"));
    }

    #[test]
    fn gt_is_found_anywhere_in_format() {
        let v = single("chr1 1 rs1 G A . . . DP:GT 30:1|1").expect("hom alt");
        assert_eq!(v.genotype.as_deref(), Some("1/1"));
        assert_eq!(v.zygosity, Zygosity::HomozygousAlternate);
    }

    #[test]
    fn inline_star_prefers_non_reference_component() {
        let v = single("chr1 1 . G A . . gene=TPMT;star=*1/*3C GT 0/1").expect("row");
        assert_eq!(v.gene.as_deref(), Some("TPMT"));
        assert_eq!(v.star_allele.as_deref(), Some("*3C"));
        assert!(v.id.is_none());

        let v = single("chr1 1 . G A . . GENE=TPMT;STAR=*1/*1 GT 0/1").expect("row");
        assert_eq!(v.star_allele.as_deref(), Some("*1"));
    }

    #[test]
    fn inline_annotation_wins_over_marker_table() {
        let v = single("chr1 1 rs3892097 G A . . STAR=*10 GT 0/1").expect("row");
        assert_eq!(v.gene.as_deref(), Some("CYP2D6"));
        assert_eq!(v.star_allele.as_deref(), Some("*10"));
    }

    #[test]
    fn info_flags_map_to_true() {
        let info = parse_info("DB;GENE=CYP2C9;AF=0.1");
        assert_eq!(info.get("DB").map(String::as_str), Some("true"));
        assert_eq!(info.get("GENE").map(String::as_str), Some("CYP2C9"));
        assert!(parse_info(".").is_empty());
    }

    #[test]
    fn structural_errors_fail_fast_in_order() {
        assert_eq!(parse("  \n\n"), Err(VcfError::Empty));
        assert_eq!(
            parse("#CHROM\tPOS\n"),
            Err(VcfError::MissingFileFormat)
        );
        assert_eq!(
            parse("##fileformat=BCFv2\n#CHROM\tPOS\n"),
            Err(VcfError::UnrecognizedFormat("BCFv2".into()))
        );
        assert_eq!(
            parse("##fileformat=VCFv4.2\nchr1\t1\n"),
            Err(VcfError::MissingColumnHeader)
        );
        assert_eq!(
            parse("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tALT\tREF\tQUAL\tFILTER\tINFO\n"),
            Err(VcfError::ColumnHeaderMismatch {
                expected: "REF",
                column: 4,
                found: "ALT".into()
            })
        );
        assert_eq!(
            parse("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\n"),
            Err(VcfError::ColumnHeaderMismatch {
                expected: "FILTER",
                column: 7,
                found: "missing".into()
            })
        );
    }

    #[test]
    fn rejects_oversized_input() {
        let text = "#".repeat(MAX_VCF_BYTES + 1);
        assert!(matches!(parse(&text), Err(VcfError::TooLarge { .. })));
    }

    #[test]
    fn short_rows_and_comments_after_header_are_ignored() {
        let parsed = parse(&vcf(&["chr1 1 rs1 G", "# trailing comment", ""])).expect("valid");
        assert!(parsed.variants.is_empty());
    }

    #[test]
    fn gene_helpers_preserve_first_appearance_order() {
        let parsed = parse(&vcf(&[
            "chr1 1 rs4244285 G A . . . GT 0/1",
            "chr1 2 rs3892097 G A . . . GT 0/1",
            "chr1 3 rs4986893 G A . . . GT 0/1",
            "chr1 4 rs999 G A . . . GT 0/1",
        ]))
        .expect("valid");
        assert_eq!(detected_genes(&parsed.variants), vec!["CYP2C19", "CYP2D6"]);

        let cyp2c19 = filter_for_gene(&parsed.variants, "CYP2C19");
        let positions: Vec<u64> = cyp2c19.iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![1, 3]);
    }
}
