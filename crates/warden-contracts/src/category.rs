//! Policy categories, tenant scopes, and container identifiers.
//!
//! Every rule belongs to exactly one pre-existing policy container. The
//! container is selected by `(PolicyRuleCategory, TenantScope)`; the engine
//! only ever looks containers up, it never creates them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which default policy container a rule attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyRuleCategory {
    AccessPolicy,
    GlobalPolicy,
    TimeoutPolicy,
    ReauthPolicy,
    ClientForwardingPolicy,
    BypassPolicy,
    IsolationPolicy,
    InspectionPolicy,
    SiemPolicy,
    CredentialPolicy,
    CapabilitiesPolicy,
    RedirectionPolicy,
}

impl PolicyRuleCategory {
    pub const ALL: [PolicyRuleCategory; 12] = [
        PolicyRuleCategory::AccessPolicy,
        PolicyRuleCategory::GlobalPolicy,
        PolicyRuleCategory::TimeoutPolicy,
        PolicyRuleCategory::ReauthPolicy,
        PolicyRuleCategory::ClientForwardingPolicy,
        PolicyRuleCategory::BypassPolicy,
        PolicyRuleCategory::IsolationPolicy,
        PolicyRuleCategory::InspectionPolicy,
        PolicyRuleCategory::SiemPolicy,
        PolicyRuleCategory::CredentialPolicy,
        PolicyRuleCategory::CapabilitiesPolicy,
        PolicyRuleCategory::RedirectionPolicy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyRuleCategory::AccessPolicy => "ACCESS_POLICY",
            PolicyRuleCategory::GlobalPolicy => "GLOBAL_POLICY",
            PolicyRuleCategory::TimeoutPolicy => "TIMEOUT_POLICY",
            PolicyRuleCategory::ReauthPolicy => "REAUTH_POLICY",
            PolicyRuleCategory::ClientForwardingPolicy => "CLIENT_FORWARDING_POLICY",
            PolicyRuleCategory::BypassPolicy => "BYPASS_POLICY",
            PolicyRuleCategory::IsolationPolicy => "ISOLATION_POLICY",
            PolicyRuleCategory::InspectionPolicy => "INSPECTION_POLICY",
            PolicyRuleCategory::SiemPolicy => "SIEM_POLICY",
            PolicyRuleCategory::CredentialPolicy => "CREDENTIAL_POLICY",
            PolicyRuleCategory::CapabilitiesPolicy => "CAPABILITIES_POLICY",
            PolicyRuleCategory::RedirectionPolicy => "REDIRECTION_POLICY",
        }
    }
}

impl fmt::Display for PolicyRuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyRuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyRuleCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown policy rule category '{s}'"))
    }
}

/// The log stream a log receiver ships. Selects which filter object types a
/// log receiver's conditions may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceLogType {
    #[serde(rename = "zpn_trans_log")]
    UserActivity,
    #[serde(rename = "zpn_auth_log")]
    UserStatus,
    #[serde(rename = "zpn_ast_auth_log")]
    AppConnectorStatus,
    #[serde(rename = "zpn_http_trans_log")]
    BrowserAccess,
    #[serde(rename = "zpn_ast_comprehensive_stats")]
    AppConnectorMetrics,
    #[serde(rename = "zpn_sys_auth_log")]
    PrivateServiceEdgeStatus,
    #[serde(rename = "zpn_waf_http_exchanges_log")]
    AppProtection,
    #[serde(rename = "zpn_pbroker_comprehensive_stats")]
    PrivateServiceEdgeMetrics,
    #[serde(rename = "zpn_audit_log")]
    Audit,
}

impl SourceLogType {
    pub const ALL: [SourceLogType; 9] = [
        SourceLogType::UserActivity,
        SourceLogType::UserStatus,
        SourceLogType::AppConnectorStatus,
        SourceLogType::BrowserAccess,
        SourceLogType::AppConnectorMetrics,
        SourceLogType::PrivateServiceEdgeStatus,
        SourceLogType::AppProtection,
        SourceLogType::PrivateServiceEdgeMetrics,
        SourceLogType::Audit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLogType::UserActivity => "zpn_trans_log",
            SourceLogType::UserStatus => "zpn_auth_log",
            SourceLogType::AppConnectorStatus => "zpn_ast_auth_log",
            SourceLogType::BrowserAccess => "zpn_http_trans_log",
            SourceLogType::AppConnectorMetrics => "zpn_ast_comprehensive_stats",
            SourceLogType::PrivateServiceEdgeStatus => "zpn_sys_auth_log",
            SourceLogType::AppProtection => "zpn_waf_http_exchanges_log",
            SourceLogType::PrivateServiceEdgeMetrics => "zpn_pbroker_comprehensive_stats",
            SourceLogType::Audit => "zpn_audit_log",
        }
    }
}

impl fmt::Display for SourceLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceLogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceLogType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown source log type '{s}'"))
    }
}

/// The dialect a condition list is validated under.
///
/// Policy rules select object-type descriptors by category; log receivers
/// select them by source log type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationContext {
    Policy(PolicyRuleCategory),
    LogReceiver(SourceLogType),
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationContext::Policy(category) => write!(f, "policy category {category}"),
            ValidationContext::LogReceiver(source) => write!(f, "source log type {source}"),
        }
    }
}

/// The tenant partition a request runs under.
///
/// Passed explicitly to every resolver call; it is part of the container
/// lookup key, never a filter applied afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantScope {
    #[default]
    Default,
    Microtenant(String),
}

impl TenantScope {
    pub fn microtenant(id: impl Into<String>) -> Self {
        TenantScope::Microtenant(id.into())
    }

    /// Build a scope from an optional microtenant id. Empty ids mean the
    /// default tenant.
    pub fn from_optional(id: Option<&str>) -> Self {
        match id {
            Some(id) if !id.is_empty() => TenantScope::Microtenant(id.to_string()),
            _ => TenantScope::Default,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, TenantScope::Default)
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantScope::Default => f.write_str("default tenant"),
            TenantScope::Microtenant(id) => write!(f, "microtenant '{id}'"),
        }
    }
}

/// Opaque identifier of a live policy container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id, for directories that mint their own.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A container as reported by the remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyContainer {
    pub id: ContainerId,
    pub category: PolicyRuleCategory,
    pub scope: TenantScope,
    #[serde(default)]
    pub name: String,
}
