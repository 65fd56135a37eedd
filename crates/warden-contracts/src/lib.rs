//! # warden-contracts
//!
//! Shared types and error definitions for the WARDEN policy condition engine.
//!
//! Every crate in the workspace imports from here. No validation logic lives
//! in this crate, only the condition model, category and scope types, port
//! range types, and errors.

pub mod category;
pub mod condition;
pub mod error;
pub mod ports;
pub mod rule;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use category::{ContainerId, PolicyRuleCategory, SourceLogType, TenantScope};
    use condition::{Condition, IdpScope, ObjectType, Operand, OperandEntry, Operator};
    use error::{ConditionError, ConditionFailure, RemoteError, RemoteErrorKind, ValidationError};
    use ports::{PortRange, RawPortRange, RawPortRanges};

    // ── String conversions ───────────────────────────────────────────────────

    #[test]
    fn object_type_names_round_trip_through_from_str() {
        for object_type in ObjectType::ALL {
            let parsed = ObjectType::from_str(object_type.as_str()).unwrap();
            assert_eq!(parsed, object_type);
        }
    }

    #[test]
    fn object_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&ObjectType::ScimGroup).unwrap();
        assert_eq!(json, "\"SCIM_GROUP\"");
        let json = serde_json::to_string(&ObjectType::MachineGrp).unwrap();
        assert_eq!(json, "\"MACHINE_GRP\"");
    }

    #[test]
    fn unknown_object_type_is_rejected_at_parse() {
        let err = ObjectType::from_str("SCIM_GRUOP").unwrap_err();
        assert_eq!(
            err,
            ConditionError::UnknownObjectType {
                name: "SCIM_GRUOP".to_string()
            }
        );
    }

    #[test]
    fn category_and_source_type_parse() {
        assert_eq!(
            PolicyRuleCategory::from_str("CLIENT_FORWARDING_POLICY").unwrap(),
            PolicyRuleCategory::ClientForwardingPolicy
        );
        assert_eq!(
            SourceLogType::from_str("zpn_auth_log").unwrap(),
            SourceLogType::UserStatus
        );
        assert!(PolicyRuleCategory::from_str("access_policy").is_err());
        assert!(SourceLogType::from_str("zpn_bogus_log").is_err());
    }

    #[test]
    fn operator_parse() {
        assert_eq!(Operator::from_str("OR").unwrap(), Operator::Or);
        assert!(Operator::from_str("XOR").is_err());
    }

    // ── Condition serde ──────────────────────────────────────────────────────

    #[test]
    fn condition_deserializes_with_defaults() {
        let json = r#"{
            "operator": "OR",
            "operands": [
                { "object_type": "PLATFORM", "values": ["linux", "mac"] },
                { "object_type": "SAML", "entries": [{ "lhs": "Email", "rhs": "a@b.c" }],
                  "idp": { "idp_name": "Okta" } }
            ]
        }"#;
        let condition: Condition = serde_json::from_str(json).unwrap();

        assert_eq!(condition.operator, Operator::Or);
        assert!(!condition.negated);
        assert_eq!(condition.operands.len(), 2);
        assert_eq!(
            condition.operands[0],
            Operand::flat(ObjectType::Platform, ["linux", "mac"])
        );
        assert_eq!(
            condition.operands[1],
            Operand::pairs(ObjectType::Saml, vec![OperandEntry::new("Email", "a@b.c")])
                .with_idp(IdpScope::by_name("Okta"))
        );
    }

    #[test]
    fn unknown_object_type_fails_deserialization() {
        let json = r#"{ "object_type": "NOT_A_TYPE", "values": ["x"] }"#;
        assert!(serde_json::from_str::<Operand>(json).is_err());
    }

    // ── Scopes and ids ───────────────────────────────────────────────────────

    #[test]
    fn tenant_scope_from_optional() {
        assert_eq!(TenantScope::from_optional(None), TenantScope::Default);
        assert_eq!(TenantScope::from_optional(Some("")), TenantScope::Default);
        assert_eq!(
            TenantScope::from_optional(Some("mt-7")),
            TenantScope::microtenant("mt-7")
        );
    }

    #[test]
    fn container_ids_are_unique() {
        let ids: std::collections::HashSet<ContainerId> =
            (0..50).map(|_| ContainerId::generate()).collect();
        assert_eq!(ids.len(), 50);
    }

    // ── Port ranges ──────────────────────────────────────────────────────────

    #[test]
    fn raw_port_ranges_accept_both_encodings() {
        let flat: RawPortRanges = serde_json::from_str(r#"["80", "80"]"#).unwrap();
        assert_eq!(flat, RawPortRanges::Flat(vec!["80".into(), "80".into()]));

        let structured: RawPortRanges =
            serde_json::from_str(r#"[{ "from": "80", "to": "90" }]"#).unwrap();
        assert_eq!(
            structured,
            RawPortRanges::Structured(vec![RawPortRange::new("80", "90")])
        );
    }

    #[test]
    fn port_range_display() {
        assert_eq!(PortRange::single(443).to_string(), "443");
        assert_eq!(PortRange::new(8080, 8090).to_string(), "8080-8090");
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn value_not_allowed_names_the_value() {
        let err = ConditionError::ValueNotAllowed {
            object_type: ObjectType::CountryCode,
            value: "ZZ".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("COUNTRY_CODE"));
        assert!(msg.contains("'ZZ'"));
    }

    #[test]
    fn rejected_lists_every_failure() {
        let err = ValidationError::Rejected(vec![
            ConditionFailure {
                location: "conditions[0]".to_string(),
                error: ConditionError::EmptyCondition,
            },
            ConditionFailure {
                location: "conditions[1].operands[0]".to_string(),
                error: ConditionError::ValueNotAllowed {
                    object_type: ObjectType::Platform,
                    value: "beos".to_string(),
                },
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 condition check(s) failed"));
        assert!(msg.contains("conditions[0]: condition has no operands"));
        assert!(msg.contains("'beos'"));
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn remote_error_reads_as_unavailable() {
        let err = ValidationError::from(RemoteError::new(
            RemoteErrorKind::Timeout,
            "idp lookup exceeded 30s",
        ));
        assert!(err.to_string().contains("resolution unavailable (timeout)"));
        assert!(err.failures().is_empty());
    }
}
