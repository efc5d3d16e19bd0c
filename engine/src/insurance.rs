//! Insurance-type resolution for hangar imports.
//!
//! Fleet entries never store a raw "lifetime" boolean; they reference an
//! `insurance_types` row by id. This module maps the free-form insurance
//! label from a hangar dump (or the bare LTI flag) onto one of those rows.

/// An `insurance_types` row as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceTypeRef {
    pub id: i64,
    pub label: String,
    pub is_lifetime: bool,
}

/// Resolve a hangar entry's insurance to a typed row id.
///
/// An explicit label (e.g. `"120-Month Insurance"`) is matched against the
/// row labels case-insensitively. When no label is present, a set `lti`
/// flag resolves to the lifetime row. A label that matches nothing stays
/// unresolved even if `lti` is set; the importer reports it instead of
/// guessing.
pub fn resolve_insurance(
    label: Option<&str>,
    lti: bool,
    types: &[InsuranceTypeRef],
) -> Option<i64> {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => types
            .iter()
            .find(|t| t.label.eq_ignore_ascii_case(label))
            .map(|t| t.id),
        None if lti => types.iter().find(|t| t.is_lifetime).map(|t| t.id),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types() -> Vec<InsuranceTypeRef> {
        vec![
            InsuranceTypeRef {
                id: 1,
                label: "Lifetime Insurance".to_string(),
                is_lifetime: true,
            },
            InsuranceTypeRef {
                id: 2,
                label: "120-Month Insurance".to_string(),
                is_lifetime: false,
            },
            InsuranceTypeRef {
                id: 3,
                label: "6-Month Insurance".to_string(),
                is_lifetime: false,
            },
        ]
    }

    #[test]
    fn label_matches_case_insensitively() {
        let t = types();
        assert_eq!(resolve_insurance(Some("120-month insurance"), false, &t), Some(2));
        assert_eq!(resolve_insurance(Some("6-Month Insurance"), true, &t), Some(3));
    }

    #[test]
    fn lti_flag_without_label() {
        let t = types();
        assert_eq!(resolve_insurance(None, true, &t), Some(1));
        assert_eq!(resolve_insurance(Some("  "), true, &t), Some(1));
    }

    #[test]
    fn unknown_label_stays_unresolved() {
        let t = types();
        assert_eq!(resolve_insurance(Some("10-Year Insurance"), false, &t), None);
        assert_eq!(resolve_insurance(Some("10-Year Insurance"), true, &t), None);
        assert_eq!(resolve_insurance(None, false, &t), None);
    }
}
