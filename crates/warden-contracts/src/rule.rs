//! Rule declarations as submitted by callers, and rules as admitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{ContainerId, PolicyRuleCategory, SourceLogType, TenantScope};
use crate::condition::Condition;

/// A candidate policy rule.
///
/// `category` may be omitted for access rules; the resolver then applies its
/// backward-compatible default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDeclaration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PolicyRuleCategory>,

    /// Microtenant the rule belongs to. Absent means the default tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microtenant_id: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RuleDeclaration {
    pub fn scope(&self) -> TenantScope {
        TenantScope::from_optional(self.microtenant_id.as_deref())
    }

    /// The category used for object-type applicability checks.
    ///
    /// A rule without an explicit category is an access rule.
    pub fn effective_category(&self) -> PolicyRuleCategory {
        self.category.unwrap_or(PolicyRuleCategory::AccessPolicy)
    }
}

/// A log receiver and the filter conditions on the stream it ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReceiverDeclaration {
    pub name: String,
    pub source_log_type: SourceLogType,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A rule that passed validation, ready for the remote write collaborator.
///
/// Conditions are in resolved form: by-name references have been replaced by
/// the ids they resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmittedRule {
    pub name: String,
    /// Category of the container identified by `container_id`.
    pub category: PolicyRuleCategory,
    pub scope: TenantScope,
    pub container_id: ContainerId,
    pub conditions: Vec<Condition>,
    pub admitted_at: DateTime<Utc>,
}
