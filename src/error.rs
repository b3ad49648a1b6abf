/// Structural VCF failures. Any of these aborts the whole parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VcfError {
    #[error("File exceeds 5MB size limit (file size: {:.2}MB)", megabytes(.bytes))]
    TooLarge { bytes: usize },

    #[error("Empty VCF file")]
    Empty,

    #[error("Invalid VCF format: missing ##fileformat header line.")]
    MissingFileFormat,

    #[error("Invalid VCF format: unrecognized format: {0}.")]
    UnrecognizedFormat(String),

    #[error("Invalid VCF format: missing #CHROM header line.")]
    MissingColumnHeader,

    #[error("Invalid VCF column headers: expected {expected} at column {column}, found {found}.")]
    ColumnHeaderMismatch {
        expected: &'static str,
        column: usize,
        found: String,
    },
}

fn megabytes(bytes: &usize) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

impl VcfError {
    /// Short human-readable message without the detail part.
    pub fn message(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "File exceeds 5MB size limit",
            Self::Empty => "Empty VCF file",
            Self::MissingFileFormat | Self::UnrecognizedFormat(_) | Self::MissingColumnHeader => {
                "Invalid VCF format"
            }
            Self::ColumnHeaderMismatch { .. } => "Invalid VCF column headers",
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            Self::TooLarge { bytes } => Some(format!("File size: {:.2}MB", megabytes(bytes))),
            Self::Empty => None,
            Self::MissingFileFormat => Some("Missing ##fileformat header line.".into()),
            Self::UnrecognizedFormat(format) => Some(format!("Unrecognized format: {format}.")),
            Self::MissingColumnHeader => Some("Missing #CHROM header line.".into()),
            Self::ColumnHeaderMismatch {
                expected,
                column,
                found,
            } => Some(format!("Expected {expected} at column {column}, found {found}.")),
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PharmaGuardError {
    #[error(transparent)]
    Vcf(#[from] VcfError),

    #[error("No VCF file found at '{0}'")]
    MissingFile(String),

    #[error("Invalid file type: '{0}'. Please upload a .vcf file.")]
    InvalidFileType(String),

    #[error("No variants detected in VCF file. The uploaded VCF file contains no variant data lines.")]
    NoVariants,

    #[error("Unsupported drug: '{0}'. Supported: CODEINE, WARFARIN, CLOPIDOGREL, SIMVASTATIN, AZATHIOPRINE, FLUOROURACIL")]
    UnsupportedDrug(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PharmaGuardError {
    /// Stable error code surfaced to callers of the analysis pipeline.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vcf(VcfError::TooLarge { .. }) => "FILE_TOO_LARGE",
            Self::Vcf(_) | Self::InvalidFileType(_) => "INVALID_VCF",
            Self::MissingFile(_) => "MISSING_FILE",
            Self::NoVariants => "NO_VARIANTS",
            Self::UnsupportedDrug(_) => "UNSUPPORTED_DRUG",
            Self::InvalidArgument(_)
            | Self::Template(_)
            | Self::Json(_)
            | Self::Io(_) => "PARSE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PharmaGuardError, VcfError};

    #[test]
    fn header_mismatch_display_names_column_and_position() {
        let err = VcfError::ColumnHeaderMismatch {
            expected: "REF",
            column: 4,
            found: "ALT".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("expected REF at column 4"));
        assert!(msg.contains("found ALT"));
        assert_eq!(err.message(), "Invalid VCF column headers");
    }

    #[test]
    fn too_large_details_report_megabytes() {
        let err = VcfError::TooLarge {
            bytes: 6 * 1024 * 1024,
        };
        assert_eq!(err.details().as_deref(), Some("File size: 6.00MB"));
        assert!(err.to_string().contains("5MB size limit"));
    }

    #[test]
    fn codes_are_stable_per_category() {
        assert_eq!(
            PharmaGuardError::from(VcfError::TooLarge { bytes: 1 }).code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(PharmaGuardError::from(VcfError::Empty).code(), "INVALID_VCF");
        assert_eq!(PharmaGuardError::NoVariants.code(), "NO_VARIANTS");
        assert_eq!(
            PharmaGuardError::MissingFile("x.vcf".into()).code(),
            "MISSING_FILE"
        );
        assert_eq!(
            PharmaGuardError::UnsupportedDrug("ASPIRIN".into()).code(),
            "UNSUPPORTED_DRUG"
        );
        assert_eq!(
            PharmaGuardError::InvalidFileType("x.txt".into()).code(),
            "INVALID_VCF"
        );
    }

    #[test]
    fn unsupported_drug_display_lists_catalogue() {
        let msg = PharmaGuardError::UnsupportedDrug("ASPIRIN".into()).to_string();
        assert!(msg.contains("ASPIRIN"));
        assert!(msg.contains("CLOPIDOGREL"));
    }
}
