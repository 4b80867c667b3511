//! Risk flag derivation from profiling signals

use crate::profiling::{FieldSignals, RiskFlag};
use crate::semantic::normalizer::is_numeric_type;
use crate::semantic::types::{FieldRole, SensitivityTier};

const HIGH_NULL_RATIO: f64 = 0.5;
const STABLE_ENUM_MAX_DISTINCT: u64 = 20;

/// Flags in a fixed order: data-quality flags first, then sensitivity
pub fn derive_risk_flags(
    signals: Option<&FieldSignals>,
    data_type: &str,
    role: FieldRole,
    sensitivity: SensitivityTier,
) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    if let Some(s) = signals {
        if s.null_ratio > HIGH_NULL_RATIO {
            flags.push(RiskFlag::HighNull);
        }

        if role == FieldRole::Identifier {
            if let Some(rows) = s.row_count {
                if s.distinct_count < rows {
                    flags.push(RiskFlag::LowUniqueness);
                }
            }
        }

        if role == FieldRole::Status && s.distinct_count > STABLE_ENUM_MAX_DISTINCT {
            flags.push(RiskFlag::EnumNotStable);
        }

        if is_numeric_type(data_type)
            && s.top_values.iter().any(|v| v.trim().parse::<f64>().is_err())
        {
            flags.push(RiskFlag::DirtyType);
        }
    }

    match sensitivity {
        SensitivityTier::L4 => flags.push(RiskFlag::SensitiveL4),
        SensitivityTier::L3 => flags.push(RiskFlag::SensitiveL3),
        _ => {}
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(null_ratio: f64, distinct: u64, rows: Option<u64>, top: &[&str]) -> FieldSignals {
        FieldSignals {
            field_name: "f".to_string(),
            null_ratio,
            distinct_count: distinct,
            top3_concentration: 0.5,
            top_values: top.iter().map(|v| v.to_string()).collect(),
            row_count: rows,
        }
    }

    #[test]
    fn test_identifier_with_duplicates() {
        let s = signals(0.6, 90, Some(100), &["1", "2", "3"]);
        let flags = derive_risk_flags(Some(&s), "bigint", FieldRole::Identifier, SensitivityTier::L1);
        assert_eq!(flags, vec![RiskFlag::HighNull, RiskFlag::LowUniqueness]);
    }

    #[test]
    fn test_unstable_status_and_dirty_numeric() {
        let s = signals(0.0, 45, None, &["1", "N/A"]);
        let flags = derive_risk_flags(Some(&s), "int", FieldRole::Status, SensitivityTier::L1);
        assert_eq!(flags, vec![RiskFlag::EnumNotStable, RiskFlag::DirtyType]);
    }

    #[test]
    fn test_sensitivity_without_signals() {
        let flags = derive_risk_flags(None, "varchar", FieldRole::BusinessAttribute, SensitivityTier::L3);
        assert_eq!(flags, vec![RiskFlag::SensitiveL3]);

        let flags = derive_risk_flags(None, "varchar", FieldRole::BusinessAttribute, SensitivityTier::L2);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_text_columns_never_dirty_type() {
        let s = signals(0.1, 3, None, &["abc"]);
        let flags = derive_risk_flags(Some(&s), "varchar(32)", FieldRole::BusinessAttribute, SensitivityTier::L1);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_non_numeric_types_containing_int_are_not_dirty() {
        let s = signals(0.0, 2, None, &["1 day", "(1,2)"]);
        for data_type in ["interval", "point", "varchar(20) -- printable"] {
            let flags = derive_risk_flags(Some(&s), data_type, FieldRole::BusinessAttribute, SensitivityTier::L1);
            assert!(flags.is_empty(), "{} flagged {:?}", data_type, flags);
        }

        let flags = derive_risk_flags(Some(&s), "DECIMAL(10,2)", FieldRole::BusinessAttribute, SensitivityTier::L1);
        assert_eq!(flags, vec![RiskFlag::DirtyType]);
    }
}
