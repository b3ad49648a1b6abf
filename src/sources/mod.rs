//! Input readers and static pharmacogenomic knowledge tables.

pub mod cpic;
pub mod markers;
pub mod vcf;
