//! Demo scenarios.
//!
//! Each scenario wires real WARDEN components (resolver, validator,
//! admission pipeline, reconciler) to in-memory collaborators seeded with a
//! small fixture tenant.

use std::path::Path;

use warden_contracts::{
    category::{PolicyRuleCategory, TenantScope},
    condition::{Condition, EntityKind, ObjectType, Operand, OperandEntry},
    error::WardenResult,
    ports::RawPortRanges,
};
use warden_core::{Admission, AdmissionOutcome};
use warden_policy::{flatten_conditions, RuleDocument};
use warden_reconcile::{conditions_equivalent, fingerprint, ports};
use warden_resolve::{CategoryResolver, InMemoryDirectory, InMemoryEntityLookup, InMemoryRuleStore};
use warden_verify::ConditionValidator;

/// The reference rule set.
const ZERO_TRUST_POLICY: &str = include_str!("../policies/zero-trust.toml");

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// One container per category the reference rules use.
fn fixture_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    for category in [
        PolicyRuleCategory::GlobalPolicy,
        PolicyRuleCategory::AccessPolicy,
        PolicyRuleCategory::CredentialPolicy,
        PolicyRuleCategory::SiemPolicy,
    ] {
        directory.register(category, TenantScope::Default);
    }
    directory.register(
        PolicyRuleCategory::TimeoutPolicy,
        TenantScope::microtenant("mt-contractors"),
    );
    directory
}

fn fixture_lookup() -> InMemoryEntityLookup {
    InMemoryEntityLookup::new()
        .with_idp("Okta", "idp-okta")
        .with_entity("idp-okta", EntityKind::ScimGroup, "Engineering", "grp-eng-4411")
        .with_entity("idp-okta", EntityKind::ScimGroup, "Finance", "grp-fin-2208")
        .with_entity("idp-okta", EntityKind::SamlAttribute, "Email", "attr-email-17")
}

fn fixture_admission(store: &InMemoryRuleStore) -> Admission {
    Admission::new(
        Box::new(CategoryResolver::new(Box::new(fixture_directory()))),
        Box::new(ConditionValidator::new()),
        Box::new(fixture_lookup()),
        Box::new(store.clone()),
    )
}

fn load_document(file: Option<&Path>) -> WardenResult<RuleDocument> {
    match file {
        Some(path) => RuleDocument::from_file(path),
        None => RuleDocument::from_toml_str(ZERO_TRUST_POLICY),
    }
}

fn print_outcome(outcome: &AdmissionOutcome) {
    match outcome {
        AdmissionOutcome::Admitted(rule) => {
            println!("  {:<28} ADMITTED", rule.name);
            println!("    category:   {} ({})", rule.category, rule.scope);
            println!("    container:  {}", rule.container_id);
            println!("    conditions: {}", fingerprint(&rule.conditions));
        }
        AdmissionOutcome::Rejected { rule, failures } => {
            println!("  {:<28} REJECTED ({} failure(s))", rule, failures.len());
            for failure in failures {
                println!("    - {}", failure);
            }
        }
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// Admit every policy rule in the document.
pub fn run_admit_rules(file: Option<&Path>) -> WardenResult<()> {
    println!("=== Policy rule admission ===");
    println!();

    let document = load_document(file)?;
    let store = InMemoryRuleStore::new();
    let admission = fixture_admission(&store);

    for rule in &document.rules {
        let outcome = admission.admit(rule)?;
        print_outcome(&outcome);
    }

    println!();
    println!(
        "  {} of {} rule(s) written",
        store.rules().len(),
        document.rules.len()
    );
    println!();
    Ok(())
}

/// Admit every log receiver in the document under the default tenant.
pub fn run_log_receivers(file: Option<&Path>) -> WardenResult<()> {
    println!("=== Log receiver filters ===");
    println!();

    let document = load_document(file)?;
    let store = InMemoryRuleStore::new();
    let admission = fixture_admission(&store);

    for receiver in &document.log_receivers {
        println!("  source log type: {}", receiver.source_log_type);
        let outcome = admission.admit_log_receiver(receiver, &TenantScope::Default)?;
        print_outcome(&outcome);
    }

    println!();
    Ok(())
}

/// Show the port-range reconciler suppressing representation drift.
pub fn run_port_drift() -> WardenResult<()> {
    println!("=== Port-range drift ===");
    println!();

    let previous = RawPortRanges::Flat(vec![
        "3223".into(),
        "3223".into(),
        "3392".into(),
        "3392".into(),
    ]);
    let remote = RawPortRanges::Flat(vec![
        "3392".into(),
        "3392".into(),
        "3223".into(),
        "3223".into(),
    ]);
    let declared = RawPortRanges::Structured(ports::to_structured(&ports::normalize(&remote)?));

    let chosen = ports::reconcile_raw(&declared, &previous, &remote)?;
    println!("  previous (flat):       {:?}", ports::to_flat(&ports::normalize(&previous)?));
    println!("  remote (flat):         {:?}", ports::to_flat(&ports::normalize(&remote)?));
    println!("  declared (structured): same ranges, different order");
    println!(
        "  write as:              {:?} {:?}",
        chosen.encoding,
        ports::to_flat(&chosen.ranges)
    );

    let widened = RawPortRanges::Flat(vec!["8000".into(), "8100".into()]);
    let changed = ports::reconcile_raw(&widened, &previous, &remote)?;
    println!(
        "  after a real change:   {:?} {}",
        changed.encoding,
        changed
            .ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    match ports::normalize(&RawPortRanges::Flat(vec!["9000".into(), "8000".into()])) {
        Ok(_) => println!("  malformed range:       unexpectedly accepted"),
        Err(e) => println!("  malformed range:       {}", e),
    }

    println!();
    Ok(())
}

/// Show order-insensitive comparison of condition sets and the flat form.
pub fn run_condition_drift() -> WardenResult<()> {
    println!("=== Condition-set drift ===");
    println!();

    let declared = vec![
        Condition::or(vec![
            Operand::flat(ObjectType::Platform, ["linux", "mac"]),
            Operand::pairs(
                ObjectType::ScimGroup,
                vec![OperandEntry::new("idp-okta", "grp-eng-4411")],
            ),
        ]),
        Condition::or(vec![Operand::flat(ObjectType::CountryCode, ["US", "DE"])]),
    ];
    let returned = vec![
        Condition::or(vec![Operand::flat(ObjectType::CountryCode, ["DE", "US"])]),
        Condition::or(vec![
            Operand::pairs(
                ObjectType::ScimGroup,
                vec![OperandEntry::new("idp-okta", "grp-eng-4411")],
            ),
            Operand::flat(ObjectType::Platform, ["mac", "linux"]),
        ]),
    ];

    println!("  declared fingerprint:  {}", fingerprint(&declared));
    println!("  returned fingerprint:  {}", fingerprint(&returned));
    println!(
        "  drift:                 {}",
        if conditions_equivalent(&declared, &returned) { "none" } else { "DETECTED" }
    );
    println!();
    println!("  flat form of declared conditions:");
    for (key, value) in flatten_conditions(&declared) {
        println!("    {key} = {value}");
    }

    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use warden_contracts::{
        category::{PolicyRuleCategory, TenantScope},
        error::ConditionError,
    };
    use warden_core::AdmissionOutcome;
    use warden_policy::RuleDocument;

    use super::{fixture_admission, ZERO_TRUST_POLICY};
    use warden_resolve::InMemoryRuleStore;

    fn outcomes() -> (Vec<AdmissionOutcome>, InMemoryRuleStore) {
        let document = RuleDocument::from_toml_str(ZERO_TRUST_POLICY).unwrap();
        let store = InMemoryRuleStore::new();
        let admission = fixture_admission(&store);
        let outcomes = document
            .rules
            .iter()
            .map(|rule| admission.admit(rule).unwrap())
            .collect();
        (outcomes, store)
    }

    #[test]
    fn reference_rules_admit_all_but_the_misconfigured_one() {
        let (outcomes, store) = outcomes();

        let admitted: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| match o {
                AdmissionOutcome::Admitted(rule) => Some(rule.name.as_str()),
                AdmissionOutcome::Rejected { .. } => None,
            })
            .collect();
        assert_eq!(
            admitted,
            vec!["engineering-linux-access", "contractor-timeout", "console-credentials"]
        );
        assert_eq!(store.rules().len(), 3);

        let engineering = &store.rules()[0];
        assert_eq!(engineering.category, PolicyRuleCategory::GlobalPolicy);
        assert_eq!(engineering.scope, TenantScope::Default);

        let timeout = &store.rules()[1];
        assert_eq!(timeout.category, PolicyRuleCategory::TimeoutPolicy);
        assert_eq!(timeout.scope, TenantScope::microtenant("mt-contractors"));
    }

    #[test]
    fn by_name_group_is_written_resolved() {
        let (_, store) = outcomes();
        let group = &store.rules()[0].conditions[1].operands[0];
        assert_eq!(group.entries[0].rhs, "grp-eng-4411");
        assert!(group.idp.is_none());
    }

    #[test]
    fn misconfigured_rule_reports_every_failure() {
        let (outcomes, _) = outcomes();
        let AdmissionOutcome::Rejected { failures, .. } = &outcomes[3] else {
            panic!("expected the fourth rule to be rejected");
        };

        let locations: Vec<&str> = failures.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(
            locations,
            vec![
                "conditions[0].operands[0]",
                "conditions[0].operands[1]",
                "conditions[1].operands[0]",
                "conditions[1].operands[1]",
            ]
        );
        assert!(matches!(failures[0].error, ConditionError::ValueNotAllowed { .. }));
        assert!(matches!(failures[1].error, ConditionError::ShapeMismatch { .. }));
        assert!(matches!(failures[2].error, ConditionError::ObjectTypeNotApplicable { .. }));
        assert!(matches!(failures[3].error, ConditionError::ReferenceNotFound { .. }));
    }

    #[test]
    fn log_receivers_follow_their_source_type() {
        let document = RuleDocument::from_toml_str(ZERO_TRUST_POLICY).unwrap();
        let store = InMemoryRuleStore::new();
        let admission = fixture_admission(&store);

        let activity = admission
            .admit_log_receiver(&document.log_receivers[0], &TenantScope::Default)
            .unwrap();
        let AdmissionOutcome::Admitted(rule) = activity else {
            panic!("expected the activity receiver to be admitted");
        };
        assert_eq!(rule.category, PolicyRuleCategory::SiemPolicy);
        assert_eq!(rule.conditions[0].operands[0].entries[0].lhs, "attr-email-17");

        let audit = admission
            .admit_log_receiver(&document.log_receivers[1], &TenantScope::Default)
            .unwrap();
        let AdmissionOutcome::Rejected { failures, .. } = audit else {
            panic!("expected the audit receiver to be rejected");
        };
        assert!(matches!(
            failures.as_slice(),
            [f] if matches!(f.error, ConditionError::FilterNotSupportedForSourceType { .. })
        ));
    }

    #[test]
    fn scenarios_run_cleanly() {
        super::run_port_drift().unwrap();
        super::run_condition_drift().unwrap();
    }
}
