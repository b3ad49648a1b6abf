//! Domain model, the per-drug analysis workflow and the session store.

pub mod analysis;
pub mod drug;
pub mod phenotype;
pub mod report;
pub mod store;
pub mod variant;
