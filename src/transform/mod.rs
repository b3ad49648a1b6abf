//! Diplotype, phenotype, risk and explanation stages of the pipeline.

pub mod diplotype;
pub mod explanation;
pub mod phenotype;
pub mod risk;
