use serde::Serialize;

use crate::error::PharmaGuardError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, PharmaGuardError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::to_pretty;
    use crate::entities::drug::{Drug, Gene};
    use crate::entities::phenotype::Phenotype;
    use crate::transform::phenotype::map_phenotype;
    use crate::transform::risk::evaluate_risk;

    #[test]
    fn phenotype_result_uses_wire_names() {
        let result = map_phenotype(Gene::Cyp2d6, "*1/*4");
        let json = to_pretty(&result).expect("json");
        assert!(json.contains('\n'));
        assert!(json.contains("\"gene\": \"CYP2D6\""));
        assert!(json.contains("\"phenotype\": \"IM\""));
        assert!(json.contains("\"phenotype_label\": \"Intermediate Metabolizer\""));
        assert!(!json.contains("activity_score"));
    }

    #[test]
    fn risk_evaluation_serializes_display_labels() {
        let evaluation = evaluate_risk(Drug::Simvastatin, Gene::Slco1b1, Phenotype::Im);
        let json = to_pretty(&evaluation).expect("json");
        assert!(json.contains("\"risk_level\": \"Moderate\""));
        assert!(json.contains("\"risk_label\": \"Adjust Dosage\""));
        assert!(json.contains("\"cpic_level\": \"Moderate\""));
    }
}
