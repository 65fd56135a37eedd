//! The WARDEN admission pipeline.
//!
//! A candidate rule goes through:
//!
//!   Scope → Container resolution → Condition validation → [RuleWriter::write]
//!
//! `RuleWriter::write()` is only reachable after the container resolved and
//! the condition tree validated cleanly. A rejected rule is a normal outcome,
//! not an error; resolution failures and unreachable collaborators are.

use chrono::Utc;
use tracing::{debug, info, warn};

use warden_contracts::{
    category::{PolicyContainer, PolicyRuleCategory, TenantScope, ValidationContext},
    condition::Condition,
    error::{ConditionFailure, ValidationError, WardenError, WardenResult},
    rule::{AdmittedRule, LogReceiverDeclaration, RuleDeclaration},
};

use crate::traits::{ConditionChecker, ContainerResolver, EntityLookup, RuleWriter};

/// What happened to a rule submitted for admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The rule validated and was handed to the writer.
    Admitted(AdmittedRule),

    /// The rule's conditions failed validation. Nothing was written.
    Rejected {
        rule: String,
        failures: Vec<ConditionFailure>,
    },
}

/// Wires the resolver, validator, entity lookup, and rule writer together.
///
/// The admission pipeline holds no per-request state: the tenant scope comes
/// from each declaration (or is passed explicitly for log receivers), so one
/// `Admission` can serve any number of tenants.
pub struct Admission {
    resolver: Box<dyn ContainerResolver>,
    checker: Box<dyn ConditionChecker>,
    lookup: Box<dyn EntityLookup>,
    writer: Box<dyn RuleWriter>,
}

impl Admission {
    pub fn new(
        resolver: Box<dyn ContainerResolver>,
        checker: Box<dyn ConditionChecker>,
        lookup: Box<dyn EntityLookup>,
        writer: Box<dyn RuleWriter>,
    ) -> Self {
        Self {
            resolver,
            checker,
            lookup,
            writer,
        }
    }

    /// Admit one policy rule.
    ///
    /// Conditions are checked under the rule's own category (access policy
    /// when none is given). The admitted record carries the category of the
    /// container the rule was filed under, which differs for a category-less
    /// rule in the default tenant.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the container cannot be resolved, when a remote
    /// lookup is unavailable, or when the writer fails. Condition failures
    /// are returned as `AdmissionOutcome::Rejected`.
    pub fn admit(&self, rule: &RuleDeclaration) -> WardenResult<AdmissionOutcome> {
        let scope = rule.scope();
        let category = rule.effective_category();

        debug!(
            rule = %rule.name,
            category = %category,
            scope = %scope,
            "admitting policy rule"
        );

        let container = self.resolver.resolve_container(rule.category, &scope)?;

        self.finish(
            &rule.name,
            scope,
            container,
            &rule.conditions,
            ValidationContext::Policy(category),
        )
    }

    /// Admit the filter conditions of a log receiver.
    ///
    /// Log receivers attach to the SIEM policy container of `scope`, and their
    /// conditions are validated against the source log type's filter table.
    pub fn admit_log_receiver(
        &self,
        receiver: &LogReceiverDeclaration,
        scope: &TenantScope,
    ) -> WardenResult<AdmissionOutcome> {
        debug!(
            receiver = %receiver.name,
            source_log_type = %receiver.source_log_type,
            scope = %scope,
            "admitting log receiver"
        );

        let container = self
            .resolver
            .resolve_container(Some(PolicyRuleCategory::SiemPolicy), scope)?;

        self.finish(
            &receiver.name,
            scope.clone(),
            container,
            &receiver.conditions,
            ValidationContext::LogReceiver(receiver.source_log_type),
        )
    }

    fn finish(
        &self,
        name: &str,
        scope: TenantScope,
        container: PolicyContainer,
        conditions: &[Condition],
        context: ValidationContext,
    ) -> WardenResult<AdmissionOutcome> {
        let resolved = match self.checker.check(conditions, context, self.lookup.as_ref()) {
            Ok(resolved) => resolved,
            Err(ValidationError::Rejected(failures)) => {
                warn!(
                    rule = %name,
                    failure_count = failures.len(),
                    context = %context,
                    "rule rejected"
                );
                return Ok(AdmissionOutcome::Rejected {
                    rule: name.to_string(),
                    failures,
                });
            }
            Err(ValidationError::Unavailable(err)) => {
                warn!(rule = %name, error = %err, "validation abandoned");
                return Err(WardenError::Unavailable(err));
            }
        };

        let admitted = AdmittedRule {
            name: name.to_string(),
            category: container.category,
            scope,
            container_id: container.id,
            conditions: resolved,
            admitted_at: Utc::now(),
        };

        self.writer.write(&admitted)?;

        info!(
            rule = %admitted.name,
            category = %admitted.category,
            container_id = %admitted.container_id,
            "rule admitted"
        );

        Ok(AdmissionOutcome::Admitted(admitted))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use warden_contracts::{
        category::{
            ContainerId, PolicyContainer, PolicyRuleCategory, SourceLogType, TenantScope,
            ValidationContext,
        },
        condition::{Condition, EntityKind, ObjectType, Operand},
        error::{
            ConditionError, ConditionFailure, RemoteError, RemoteErrorKind, ResolutionError,
            ValidationError, WardenError, WardenResult,
        },
        rule::{AdmittedRule, LogReceiverDeclaration, RuleDeclaration},
    };

    use crate::traits::{ConditionChecker, ContainerResolver, EntityLookup, RuleWriter};

    use super::{Admission, AdmissionOutcome};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn make_rule(category: Option<PolicyRuleCategory>, microtenant: Option<&str>) -> RuleDeclaration {
        RuleDeclaration {
            name: "allow-engineering".to_string(),
            description: None,
            category,
            microtenant_id: microtenant.map(str::to_string),
            conditions: vec![Condition::or(vec![Operand::flat(
                ObjectType::Platform,
                ["linux"],
            )])],
        }
    }

    /// A resolver that records every request and answers with a fixed result.
    ///
    /// The returned container has the requested category (access policy when
    /// none was requested) unless `filed_under` says otherwise.
    struct MockResolver {
        result: Result<ContainerId, ResolutionError>,
        filed_under: Option<PolicyRuleCategory>,
        calls: Arc<Mutex<Vec<(Option<PolicyRuleCategory>, TenantScope)>>>,
    }

    impl MockResolver {
        fn ok(id: &str) -> Self {
            Self {
                result: Ok(ContainerId::new(id)),
                filed_under: None,
                calls: Arc::new(Mutex::new(vec![])),
            }
        }

        fn substituting(id: &str, category: PolicyRuleCategory) -> Self {
            Self {
                filed_under: Some(category),
                ..Self::ok(id)
            }
        }
    }

    impl ContainerResolver for MockResolver {
        fn resolve_container(
            &self,
            category: Option<PolicyRuleCategory>,
            scope: &TenantScope,
        ) -> Result<PolicyContainer, ResolutionError> {
            self.calls.lock().unwrap().push((category, scope.clone()));
            let id = self.result.clone()?;
            Ok(PolicyContainer {
                id,
                category: self
                    .filed_under
                    .or(category)
                    .unwrap_or(PolicyRuleCategory::AccessPolicy),
                scope: scope.clone(),
                name: String::new(),
            })
        }
    }

    /// A checker that returns a configured result and records the context.
    struct MockChecker {
        result: Result<Vec<Condition>, ValidationError>,
        contexts: Arc<Mutex<Vec<ValidationContext>>>,
    }

    impl MockChecker {
        fn passing(conditions: Vec<Condition>) -> Self {
            Self {
                result: Ok(conditions),
                contexts: Arc::new(Mutex::new(vec![])),
            }
        }

        fn failing(result: ValidationError) -> Self {
            Self {
                result: Err(result),
                contexts: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl ConditionChecker for MockChecker {
        fn check(
            &self,
            _conditions: &[Condition],
            context: ValidationContext,
            _lookup: &dyn EntityLookup,
        ) -> Result<Vec<Condition>, ValidationError> {
            self.contexts.lock().unwrap().push(context);
            self.result.clone()
        }
    }

    struct NoLookup;

    impl EntityLookup for NoLookup {
        fn lookup(
            &self,
            _idp: Option<&str>,
            _kind: EntityKind,
            _name: &str,
        ) -> Result<Option<String>, RemoteError> {
            Ok(None)
        }
    }

    /// A writer that records every admitted rule.
    struct MockWriter {
        written: Arc<Mutex<Vec<AdmittedRule>>>,
        fail: bool,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(vec![])),
                fail: false,
            }
        }
    }

    impl RuleWriter for MockWriter {
        fn write(&self, rule: &AdmittedRule) -> WardenResult<()> {
            if self.fail {
                return Err(WardenError::WriteFailed {
                    reason: "remote returned 503".to_string(),
                });
            }
            self.written.lock().unwrap().push(rule.clone());
            Ok(())
        }
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    /// A valid rule is written with the resolved container and conditions.
    #[test]
    fn test_valid_rule_is_written() {
        let resolved = vec![Condition::or(vec![Operand::flat(ObjectType::App, ["seg-1"])])];
        let writer = MockWriter::new();
        let written = writer.written.clone();

        let admission = Admission::new(
            Box::new(MockResolver::ok("216196257331281920")),
            Box::new(MockChecker::passing(resolved.clone())),
            Box::new(NoLookup),
            Box::new(writer),
        );

        let outcome = admission
            .admit(&make_rule(Some(PolicyRuleCategory::AccessPolicy), None))
            .unwrap();

        match outcome {
            AdmissionOutcome::Admitted(rule) => {
                assert_eq!(rule.container_id, ContainerId::new("216196257331281920"));
                assert_eq!(rule.conditions, resolved);
                assert_eq!(rule.category, PolicyRuleCategory::AccessPolicy);
            }
            other => panic!("expected Admitted, got {:?}", other),
        }
        assert_eq!(written.lock().unwrap().len(), 1);
    }

    /// A rejected rule must never reach the writer.
    #[test]
    fn test_rejected_rule_is_not_written() {
        let writer = MockWriter::new();
        let written = writer.written.clone();
        let failures = vec![ConditionFailure {
            location: "conditions[0].operands[0]".to_string(),
            error: ConditionError::ValueNotAllowed {
                object_type: ObjectType::CountryCode,
                value: "ZZ".to_string(),
            },
        }];

        let admission = Admission::new(
            Box::new(MockResolver::ok("c-1")),
            Box::new(MockChecker::failing(ValidationError::Rejected(failures.clone()))),
            Box::new(NoLookup),
            Box::new(writer),
        );

        let outcome = admission.admit(&make_rule(None, None)).unwrap();

        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected {
                rule: "allow-engineering".to_string(),
                failures,
            }
        );
        assert!(written.lock().unwrap().is_empty(), "rejected rule must not be written");
    }

    /// An unavailable lookup is an error, not a rejection.
    #[test]
    fn test_unavailable_lookup_propagates() {
        let admission = Admission::new(
            Box::new(MockResolver::ok("c-1")),
            Box::new(MockChecker::failing(ValidationError::Unavailable(
                RemoteError::new(RemoteErrorKind::Cancelled, "apply interrupted"),
            ))),
            Box::new(NoLookup),
            Box::new(MockWriter::new()),
        );

        let err = admission.admit(&make_rule(None, None)).unwrap_err();
        assert!(matches!(err, WardenError::Unavailable(_)), "got {:?}", err);
    }

    /// A missing container stops admission before validation runs.
    #[test]
    fn test_missing_container_stops_admission() {
        let checker = MockChecker::passing(vec![]);
        let contexts = checker.contexts.clone();
        let resolver = MockResolver {
            result: Err(ResolutionError::ContainerNotFound {
                category: PolicyRuleCategory::TimeoutPolicy,
                scope: TenantScope::microtenant("mt-1"),
            }),
            filed_under: None,
            calls: Arc::new(Mutex::new(vec![])),
        };

        let admission = Admission::new(
            Box::new(resolver),
            Box::new(checker),
            Box::new(NoLookup),
            Box::new(MockWriter::new()),
        );

        let err = admission
            .admit(&make_rule(Some(PolicyRuleCategory::TimeoutPolicy), Some("mt-1")))
            .unwrap_err();

        assert!(matches!(
            err,
            WardenError::Resolution(ResolutionError::ContainerNotFound { .. })
        ));
        assert!(contexts.lock().unwrap().is_empty(), "validation must not run");
    }

    /// The rule's microtenant becomes the resolver scope, and a rule without
    /// a category is validated as an access rule.
    #[test]
    fn test_scope_and_default_category_flow_through() {
        let resolver = MockResolver::ok("c-9");
        let calls = resolver.calls.clone();
        let checker = MockChecker::passing(vec![]);
        let contexts = checker.contexts.clone();

        let admission = Admission::new(
            Box::new(resolver),
            Box::new(checker),
            Box::new(NoLookup),
            Box::new(MockWriter::new()),
        );

        admission.admit(&make_rule(None, Some("mt-42"))).unwrap();

        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[(None, TenantScope::microtenant("mt-42"))]
        );
        assert_eq!(
            contexts.lock().unwrap().as_slice(),
            &[ValidationContext::Policy(PolicyRuleCategory::AccessPolicy)]
        );
    }

    /// A category-less rule in the default tenant is filed under the global
    /// policy container but still validated as an access rule.
    #[test]
    fn test_default_tenant_rule_records_container_category() {
        let writer = MockWriter::new();
        let written = writer.written.clone();
        let checker = MockChecker::passing(vec![]);
        let contexts = checker.contexts.clone();

        let admission = Admission::new(
            Box::new(MockResolver::substituting("global-1", PolicyRuleCategory::GlobalPolicy)),
            Box::new(checker),
            Box::new(NoLookup),
            Box::new(writer),
        );

        let outcome = admission.admit(&make_rule(None, None)).unwrap();

        match outcome {
            AdmissionOutcome::Admitted(rule) => {
                assert_eq!(rule.container_id, ContainerId::new("global-1"));
                assert_eq!(rule.category, PolicyRuleCategory::GlobalPolicy);
                assert_eq!(rule.scope, TenantScope::Default);
            }
            other => panic!("expected Admitted, got {:?}", other),
        }
        assert_eq!(written.lock().unwrap()[0].category, PolicyRuleCategory::GlobalPolicy);
        assert_eq!(
            contexts.lock().unwrap().as_slice(),
            &[ValidationContext::Policy(PolicyRuleCategory::AccessPolicy)]
        );
    }

    /// Log receivers resolve the SIEM container and validate by source type.
    #[test]
    fn test_log_receiver_uses_siem_container() {
        let resolver = MockResolver::ok("siem-1");
        let calls = resolver.calls.clone();
        let checker = MockChecker::passing(vec![]);
        let contexts = checker.contexts.clone();

        let admission = Admission::new(
            Box::new(resolver),
            Box::new(checker),
            Box::new(NoLookup),
            Box::new(MockWriter::new()),
        );

        let receiver = LogReceiverDeclaration {
            name: "splunk-user-activity".to_string(),
            source_log_type: SourceLogType::UserActivity,
            conditions: vec![],
        };
        let outcome = admission
            .admit_log_receiver(&receiver, &TenantScope::Default)
            .unwrap();

        assert!(matches!(outcome, AdmissionOutcome::Admitted(ref r) if r.category == PolicyRuleCategory::SiemPolicy));
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[(Some(PolicyRuleCategory::SiemPolicy), TenantScope::Default)]
        );
        assert_eq!(
            contexts.lock().unwrap().as_slice(),
            &[ValidationContext::LogReceiver(SourceLogType::UserActivity)]
        );
    }

    /// Writer failures surface as errors.
    #[test]
    fn test_writer_failure_propagates() {
        let mut writer = MockWriter::new();
        writer.fail = true;

        let admission = Admission::new(
            Box::new(MockResolver::ok("c-1")),
            Box::new(MockChecker::passing(vec![])),
            Box::new(NoLookup),
            Box::new(writer),
        );

        let err = admission.admit(&make_rule(None, None)).unwrap_err();
        assert!(err.to_string().contains("remote returned 503"));
    }
}
