//! Known PGx marker rsIDs and the star allele each one tags.

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub gene: &'static str,
    pub star_allele: &'static str,
}

const KNOWN_MARKERS: &[(&str, &str, &str)] = &[
    ("rs3892097", "CYP2D6", "*4"),
    ("rs5030655", "CYP2D6", "*6"),
    ("rs1065852", "CYP2D6", "*10"),
    ("rs28371725", "CYP2D6", "*41"),
    ("rs16947", "CYP2D6", "*2"),
    ("rs1135840", "CYP2D6", "*2"),
    ("rs4244285", "CYP2C19", "*2"),
    ("rs4986893", "CYP2C19", "*3"),
    ("rs12248560", "CYP2C19", "*17"),
    ("rs28399504", "CYP2C19", "*4"),
    ("rs1799853", "CYP2C9", "*2"),
    ("rs1057910", "CYP2C9", "*3"),
    ("rs28371686", "CYP2C9", "*5"),
    ("rs4149056", "SLCO1B1", "*5"),
    ("rs2306283", "SLCO1B1", "*1b"),
    ("rs4149015", "SLCO1B1", "*15"),
    ("rs1800462", "TPMT", "*2"),
    ("rs1800460", "TPMT", "*3B"),
    ("rs1142345", "TPMT", "*3C"),
    ("rs3918290", "DPYD", "*2A"),
    ("rs55886062", "DPYD", "*13"),
    ("rs67376798", "DPYD", "c.2846A>T"),
    ("rs75017182", "DPYD", "HapB3"),
];

fn table() -> &'static HashMap<&'static str, Marker> {
    static TABLE: OnceLock<HashMap<&'static str, Marker>> = OnceLock::new();
    TABLE.get_or_init(|| {
        KNOWN_MARKERS
            .iter()
            .map(|&(rsid, gene, star_allele)| (rsid, Marker { gene, star_allele }))
            .collect()
    })
}

pub fn lookup(rsid: &str) -> Option<Marker> {
    table().get(rsid).copied()
}
