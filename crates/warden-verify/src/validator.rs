//! The condition validator.
//!
//! `ConditionValidator` implements the `ConditionChecker` trait from
//! `warden-core`. Every operand of every condition is checked in tree
//! pre-order, in five steps:
//!
//! 1. **Descriptor**: the object type must have an entry in the rule table.
//! 2. **Shape**: flat values or entry pairs, whichever the table names.
//! 3. **Value set**: closed enumerations reject unknown tokens.
//! 4. **Identity**: by-name references are resolved through the
//!    `EntityLookup` collaborator.
//! 5. **Applicability**: the object type must be allowed under the
//!    validation context.
//!
//! A failed descriptor or shape check skips the remaining steps for that
//! operand. All other failures are accumulated so callers see the full set
//! in one pass. A lookup that cannot be completed abandons the pass.

use std::collections::HashMap;

use tracing::{debug, warn};

use warden_contracts::{
    category::ValidationContext,
    condition::{Condition, EntityKind, IdpScope, Operand},
    error::{ConditionError, ConditionFailure, RemoteError, ValidationError},
};
use warden_core::traits::{ConditionChecker, EntityLookup};
use warden_policy::table::{self, NamedReference, ObjectTypeRule, OperandShape};

/// The WARDEN condition validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionValidator;

impl ConditionValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ConditionChecker for ConditionValidator {
    fn check(
        &self,
        conditions: &[Condition],
        context: ValidationContext,
        lookup: &dyn EntityLookup,
    ) -> Result<Vec<Condition>, ValidationError> {
        validate_and_resolve(conditions, context, lookup)
    }
}

/// Check `conditions` under `context`, discarding the resolved tree.
pub fn validate(
    conditions: &[Condition],
    context: ValidationContext,
    lookup: &dyn EntityLookup,
) -> Result<(), ValidationError> {
    validate_and_resolve(conditions, context, lookup).map(|_| ())
}

/// Check `conditions` under `context` and return a copy in which every
/// by-name reference has been replaced by the id it resolved to.
///
/// Resolved operands no longer carry an `idp` scope: their entries hold
/// opaque ids.
pub fn validate_and_resolve(
    conditions: &[Condition],
    context: ValidationContext,
    lookup: &dyn EntityLookup,
) -> Result<Vec<Condition>, ValidationError> {
    let mut pass = Pass::new(context, lookup);

    if let ValidationContext::LogReceiver(source) = context {
        if !conditions.is_empty() && !table::supports_filters(source) {
            pass.fail(
                "conditions",
                ConditionError::FilterNotSupportedForSourceType {
                    source_log_type: source,
                },
            );
            return Err(pass.finish());
        }
    }

    let mut resolved = conditions.to_vec();
    for (i, condition) in resolved.iter_mut().enumerate() {
        if condition.operands.is_empty() {
            pass.fail(&format!("conditions[{i}]"), ConditionError::EmptyCondition);
            continue;
        }
        for (j, operand) in condition.operands.iter_mut().enumerate() {
            pass.check_operand(&format!("conditions[{i}].operands[{j}]"), operand)
                .map_err(|e| {
                    warn!(error = %e, "entity lookup failed; validation pass abandoned");
                    ValidationError::Unavailable(e)
                })?;
        }
    }

    debug!(
        %context,
        conditions = conditions.len(),
        failure_count = pass.failures.len(),
        "validation pass complete"
    );

    if pass.failures.is_empty() {
        Ok(resolved)
    } else {
        Err(pass.finish())
    }
}

type LookupKey = (Option<String>, EntityKind, String);

/// State for one validation pass.
struct Pass<'a> {
    context: ValidationContext,
    lookup: &'a dyn EntityLookup,
    failures: Vec<ConditionFailure>,
    /// Each distinct reference is looked up at most once per pass.
    resolved: HashMap<LookupKey, Option<String>>,
}

impl<'a> Pass<'a> {
    fn new(context: ValidationContext, lookup: &'a dyn EntityLookup) -> Self {
        Self {
            context,
            lookup,
            failures: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    fn fail(&mut self, location: &str, error: ConditionError) {
        warn!(%location, %error, "condition check failed");
        self.failures.push(ConditionFailure {
            location: location.to_string(),
            error,
        });
    }

    fn finish(self) -> ValidationError {
        ValidationError::Rejected(self.failures)
    }

    /// Run every check on one operand. `Err` only for remote failures.
    fn check_operand(&mut self, location: &str, operand: &mut Operand) -> Result<(), RemoteError> {
        let object_type = operand.object_type;

        // ── Descriptor ───────────────────────────────────────────────────────
        let Some(rule) = table::descriptor(self.context, object_type) else {
            self.fail(
                location,
                ConditionError::UnknownObjectType {
                    name: object_type.to_string(),
                },
            );
            return Ok(());
        };
        debug!(%location, %object_type, shape = ?rule.shape, "descriptor found");

        // ── Shape ────────────────────────────────────────────────────────────
        if !self.check_shape(location, &rule, operand) {
            return Ok(());
        }

        // ── Value set ────────────────────────────────────────────────────────
        // Entry pairs carry their enumerated token on the rhs.
        let rejected: Vec<String> = match rule.shape {
            OperandShape::FlatValues => operand
                .values
                .iter()
                .filter(|value| !rule.admits(value))
                .cloned()
                .collect(),
            OperandShape::EntryPairs => operand
                .entries
                .iter()
                .map(|entry| &entry.rhs)
                .filter(|value| !rule.admits(value))
                .cloned()
                .collect(),
        };

        self.finish_operand(location, &rule, operand, rejected)
    }

    /// Value-set failures, identity resolution and applicability.
    fn finish_operand(
        &mut self,
        location: &str,
        rule: &ObjectTypeRule,
        operand: &mut Operand,
        rejected_values: Vec<String>,
    ) -> Result<(), RemoteError> {
        for value in rejected_values {
            self.fail(
                location,
                ConditionError::ValueNotAllowed {
                    object_type: rule.object_type,
                    value,
                },
            );
        }

        // ── Identity ─────────────────────────────────────────────────────────
        if let (Some(reference), Some(scope)) = (rule.named_reference, operand.idp.clone()) {
            if self.resolve_references(location, rule, reference, &scope, operand)? {
                operand.idp = None;
            }
        }

        // ── Applicability ────────────────────────────────────────────────────
        if !rule.applies_to(self.context) {
            self.fail(
                location,
                ConditionError::ObjectTypeNotApplicable {
                    object_type: rule.object_type,
                    context: self.context.to_string(),
                },
            );
        }

        Ok(())
    }

    /// Returns `false` when the operand's shape is wrong and later checks
    /// must be skipped.
    fn check_shape(&mut self, location: &str, rule: &ObjectTypeRule, operand: &Operand) -> bool {
        let object_type = rule.object_type;
        let before = self.failures.len();

        match rule.shape {
            OperandShape::FlatValues => {
                if !operand.entries.is_empty() {
                    self.fail(
                        location,
                        ConditionError::ShapeMismatch {
                            object_type,
                            reason: "expects flat values, but entry pairs were supplied"
                                .to_string(),
                        },
                    );
                } else if operand.values.is_empty() {
                    self.fail(
                        location,
                        ConditionError::ShapeMismatch {
                            object_type,
                            reason: "expects at least one value".to_string(),
                        },
                    );
                }
            }
            OperandShape::EntryPairs => {
                if !operand.values.is_empty() {
                    self.fail(
                        location,
                        ConditionError::ShapeMismatch {
                            object_type,
                            reason: "expects entry pairs, but flat values were supplied"
                                .to_string(),
                        },
                    );
                } else if operand.entries.is_empty() {
                    self.fail(
                        location,
                        ConditionError::ShapeMismatch {
                            object_type,
                            reason: "expects at least one entry pair".to_string(),
                        },
                    );
                }

                for (index, entry) in operand.entries.iter().enumerate() {
                    let reason = match (entry.lhs.is_empty(), entry.rhs.is_empty()) {
                        (true, true) => "lhs and rhs are empty",
                        (true, false) => "lhs is empty",
                        (false, true) => "rhs is empty",
                        (false, false) => continue,
                    };
                    self.fail(
                        location,
                        ConditionError::MalformedEntryPair {
                            object_type,
                            index,
                            reason: reason.to_string(),
                        },
                    );
                }
            }
        }

        if operand.idp.is_some() && rule.named_reference.is_none() {
            self.fail(
                location,
                ConditionError::ShapeMismatch {
                    object_type,
                    reason: "does not accept an identity provider scope".to_string(),
                },
            );
        }

        self.failures.len() == before
    }

    /// Resolve every referenced name in `operand` within `scope`, rewriting
    /// the entries in place. Returns `true` when every reference resolved.
    fn resolve_references(
        &mut self,
        location: &str,
        rule: &ObjectTypeRule,
        reference: NamedReference,
        scope: &IdpScope,
        operand: &mut Operand,
    ) -> Result<bool, RemoteError> {
        let object_type = rule.object_type;

        let idp_id = match (&scope.idp_id, &scope.idp_name) {
            (Some(id), None) => id.clone(),
            (None, Some(name)) => {
                match self.resolve(None, EntityKind::IdentityProvider, name)? {
                    Some(id) => id,
                    None => {
                        self.fail(
                            location,
                            ConditionError::ReferenceNotFound {
                                kind: EntityKind::IdentityProvider,
                                name: name.clone(),
                                scope: "this tenant".to_string(),
                            },
                        );
                        return Ok(false);
                    }
                }
            }
            (Some(_), Some(_)) => {
                self.fail(
                    location,
                    ConditionError::MissingIdentityScope {
                        object_type,
                        reason: "both idp_id and idp_name were supplied; expected exactly one"
                            .to_string(),
                    },
                );
                return Ok(false);
            }
            (None, None) => {
                self.fail(
                    location,
                    ConditionError::MissingIdentityScope {
                        object_type,
                        reason: "by-name references need an idp_id or idp_name".to_string(),
                    },
                );
                return Ok(false);
            }
        };

        let mut all_resolved = true;
        for entry in operand.entries.iter_mut() {
            let name = entry.side(reference.side).to_string();
            match self.resolve(Some(&idp_id), reference.kind, &name)? {
                Some(id) => *entry.side_mut(reference.side) = id,
                None => {
                    all_resolved = false;
                    self.fail(
                        location,
                        ConditionError::ReferenceNotFound {
                            kind: reference.kind,
                            name,
                            scope: scope.to_string(),
                        },
                    );
                }
            }
        }

        Ok(all_resolved)
    }

    fn resolve(
        &mut self,
        idp: Option<&str>,
        kind: EntityKind,
        name: &str,
    ) -> Result<Option<String>, RemoteError> {
        let key = (idp.map(String::from), kind, name.to_string());
        if let Some(hit) = self.resolved.get(&key) {
            return Ok(hit.clone());
        }

        debug!(idp = ?idp, %kind, %name, "looking up entity by name");
        let id = self.lookup.lookup(idp, kind, name)?;
        self.resolved.insert(key, id.clone());
        Ok(id)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
