use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::drug::Gene;
use crate::error::PharmaGuardError;

/// Metabolizer / function class derived from a diplotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phenotype {
    Pm,
    Im,
    Nm,
    Rm,
    Urm,
}

impl Phenotype {
    pub const ALL: [Phenotype; 5] = [
        Phenotype::Pm,
        Phenotype::Im,
        Phenotype::Nm,
        Phenotype::Rm,
        Phenotype::Urm,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Pm => "PM",
            Self::Im => "IM",
            Self::Nm => "NM",
            Self::Rm => "RM",
            Self::Urm => "URM",
        }
    }

    /// Gene-agnostic wording used in narrative text.
    pub fn generic_label(self) -> &'static str {
        match self {
            Self::Pm => "Poor Metabolizer",
            Self::Im => "Intermediate Metabolizer",
            Self::Nm => "Normal Metabolizer",
            Self::Rm => "Rapid Metabolizer",
            Self::Urm => "Ultrarapid Metabolizer",
        }
    }
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Phenotype {
    type Err = PharmaGuardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PM" => Ok(Self::Pm),
            "IM" => Ok(Self::Im),
            "NM" | "EM" => Ok(Self::Nm),
            "RM" => Ok(Self::Rm),
            "URM" | "UM" => Ok(Self::Urm),
            _ => Err(PharmaGuardError::InvalidArgument(format!(
                "Unknown phenotype: {value}. Expected one of PM, IM, NM, RM, URM"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeResult {
    pub gene: Gene,
    pub diplotype: String,
    pub phenotype: Phenotype,
    pub phenotype_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_score: Option<f64>,
}
