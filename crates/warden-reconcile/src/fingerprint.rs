//! Order-insensitive fingerprints of condition lists.
//!
//! Two condition lists describe the same policy when they differ only in
//! the order of conditions, operands, values or entries. The remote service
//! may return any of those in a different order than declared, so a plain
//! `==` reports drift that is not there.
//!
//! Canonical form (hashed with SHA-256):
//!   1. each operand as a JSON object with sorted `values` and `entries`
//!   2. each condition as `{operator, negated, operands}` with its operand
//!      strings sorted
//!   3. the list of condition strings, sorted

use serde_json::json;
use sha2::{Digest, Sha256};

use warden_contracts::condition::{Condition, Operand};

/// Lowercase 64-character hex SHA-256 of the canonical form of `conditions`.
pub fn fingerprint(conditions: &[Condition]) -> String {
    let mut canonical: Vec<String> = conditions.iter().map(canonical_condition).collect();
    canonical.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(json!(canonical).to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `a` and `b` are the same condition set up to ordering.
pub fn conditions_equivalent(a: &[Condition], b: &[Condition]) -> bool {
    a.len() == b.len() && fingerprint(a) == fingerprint(b)
}

fn canonical_condition(condition: &Condition) -> String {
    let mut operands: Vec<String> = condition.operands.iter().map(canonical_operand).collect();
    operands.sort_unstable();

    json!({
        "operator": condition.operator.as_str(),
        "negated": condition.negated,
        "operands": operands,
    })
    .to_string()
}

fn canonical_operand(operand: &Operand) -> String {
    let mut values = operand.values.clone();
    values.sort_unstable();

    let mut entries: Vec<[&str; 2]> = operand
        .entries
        .iter()
        .map(|e| [e.lhs.as_str(), e.rhs.as_str()])
        .collect();
    entries.sort_unstable();

    let (idp_id, idp_name) = match &operand.idp {
        Some(idp) => (idp.idp_id.as_deref(), idp.idp_name.as_deref()),
        None => (None, None),
    };

    json!({
        "object_type": operand.object_type.as_str(),
        "values": values,
        "entries": entries,
        "idp_id": idp_id,
        "idp_name": idp_name,
    })
    .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use warden_contracts::condition::{Condition, IdpScope, ObjectType, Operand, OperandEntry};

    use super::{conditions_equivalent, fingerprint};

    fn sample() -> Vec<Condition> {
        vec![
            Condition::or(vec![
                Operand::flat(ObjectType::App, ["app-1", "app-2"]),
                Operand::flat(ObjectType::Platform, ["linux"]),
            ]),
            Condition::and(vec![Operand::pairs(
                ObjectType::Saml,
                vec![
                    OperandEntry::new("attr-1", "a@b.c"),
                    OperandEntry::new("attr-2", "eng"),
                ],
            )]),
        ]
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint(&sample());
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(fp, fingerprint(&sample()));
    }

    #[test]
    fn test_reordering_is_not_drift() {
        let original = sample();
        let mut reordered = vec![
            Condition::and(vec![Operand::pairs(
                ObjectType::Saml,
                vec![
                    OperandEntry::new("attr-2", "eng"),
                    OperandEntry::new("attr-1", "a@b.c"),
                ],
            )]),
            Condition::or(vec![
                Operand::flat(ObjectType::Platform, ["linux"]),
                Operand::flat(ObjectType::App, ["app-2", "app-1"]),
            ]),
        ];
        assert!(conditions_equivalent(&original, &reordered));

        reordered[1].negated = true;
        assert!(!conditions_equivalent(&original, &reordered));
    }

    #[test]
    fn test_content_changes_are_drift() {
        let original = sample();

        let mut changed = sample();
        changed[0].operands[0].values[1] = "app-3".to_string();
        assert!(!conditions_equivalent(&original, &changed));

        let mut operator = sample();
        operator[0] = Condition::and(operator[0].operands.clone());
        assert!(!conditions_equivalent(&original, &operator));

        let mut scoped = sample();
        scoped[1].operands[0].idp = Some(IdpScope::by_name("Okta"));
        assert!(!conditions_equivalent(&original, &scoped));
    }

    /// Duplicated conditions are not collapsed.
    #[test]
    fn test_duplicates_count() {
        let mut doubled = sample();
        doubled.push(doubled[0].clone());
        assert!(!conditions_equivalent(&sample(), &doubled));
    }
}
