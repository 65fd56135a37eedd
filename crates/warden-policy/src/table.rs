//! Static object-type rule tables.
//!
//! Two tables live here:
//!
//! - the policy table, one `ObjectTypeRule` per object type, consulted for
//!   every policy rule category;
//! - the log-receiver table, listing which object types each source log type
//!   accepts as filters.
//!
//! Both are plain `static` data and safe to read from any thread.

use warden_contracts::{
    category::{PolicyRuleCategory, SourceLogType, ValidationContext},
    condition::{EntityKind, EntrySide, ObjectType},
};

/// Which operand field an object type uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    FlatValues,
    EntryPairs,
}

/// Where a by-name reference sits in an entry pair, and what it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedReference {
    pub kind: EntityKind,
    pub side: EntrySide,
}

/// The descriptor for one object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTypeRule {
    pub object_type: ObjectType,
    pub shape: OperandShape,

    /// Closed admissible values. For entry-pair types it applies to `rhs`.
    pub value_set: Option<&'static [&'static str]>,

    /// Categories allowed to reference this object type. `None` means all.
    pub applicable_categories: Option<&'static [PolicyRuleCategory]>,

    /// Present when entries may reference an IdP-scoped entity by name.
    pub named_reference: Option<NamedReference>,
}

impl ObjectTypeRule {
    const fn flat(object_type: ObjectType) -> Self {
        Self {
            object_type,
            shape: OperandShape::FlatValues,
            value_set: None,
            applicable_categories: None,
            named_reference: None,
        }
    }

    const fn pairs(object_type: ObjectType) -> Self {
        Self {
            object_type,
            shape: OperandShape::EntryPairs,
            value_set: None,
            applicable_categories: None,
            named_reference: None,
        }
    }

    const fn values(mut self, set: &'static [&'static str]) -> Self {
        self.value_set = Some(set);
        self
    }

    const fn only_in(mut self, categories: &'static [PolicyRuleCategory]) -> Self {
        self.applicable_categories = Some(categories);
        self
    }

    const fn named(mut self, kind: EntityKind, side: EntrySide) -> Self {
        self.named_reference = Some(NamedReference { kind, side });
        self
    }

    /// Whether `value` is admissible. Always true without a value set.
    pub fn admits(&self, value: &str) -> bool {
        self.value_set.map_or(true, |set| set.contains(&value))
    }

    /// Whether this object type may be used under `context`.
    pub fn applies_to(&self, context: ValidationContext) -> bool {
        match context {
            ValidationContext::Policy(category) => self
                .applicable_categories
                .map_or(true, |categories| categories.contains(&category)),
            ValidationContext::LogReceiver(source) => {
                log_filter_types(source).contains(&self.object_type)
            }
        }
    }
}

// ── Value sets ───────────────────────────────────────────────────────────────

pub const PLATFORMS: &[&str] = &["linux", "android", "ios", "mac", "windows", "chromeos"];

pub const CLIENT_TYPES: &[&str] = &[
    "zpn_client_type_exporter",
    "zpn_client_type_exporter_noauth",
    "zpn_client_type_browser_isolation",
    "zpn_client_type_machine_tunnel",
    "zpn_client_type_ip_anchoring",
    "zpn_client_type_edge_connector",
    "zpn_client_type_zapp",
    "zpn_client_type_slogger",
    "zpn_client_type_branch_connector",
    "zpn_client_type_zapp_partner",
    "zpn_client_type_vdi",
    "zpn_client_type_zia_inspection",
];

/// Client types a log receiver can filter on.
pub const LOG_CLIENT_TYPES: &[&str] = &[
    "zpn_client_type_exporter",
    "zpn_client_type_browser_isolation",
    "zpn_client_type_machine_tunnel",
    "zpn_client_type_ip_anchoring",
    "zpn_client_type_edge_connector",
    "zpn_client_type_zapp",
    "zpn_client_type_slogger",
    "zpn_client_type_branch_connector",
    "zpn_client_type_zapp_partner",
];

pub const RISK_LEVELS: &[&str] = &["UNKNOWN", "LOW", "MEDIUM", "HIGH", "CRITICAL"];

/// ISO 3166-1 alpha-2.
pub const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

const CREDENTIAL_ONLY: &[PolicyRuleCategory] = &[PolicyRuleCategory::CredentialPolicy];

const ACCESS_ONLY: &[PolicyRuleCategory] =
    &[PolicyRuleCategory::AccessPolicy, PolicyRuleCategory::GlobalPolicy];

// ── Policy table ─────────────────────────────────────────────────────────────

static OBJECT_TYPE_RULES: &[ObjectTypeRule] = &[
    ObjectTypeRule::flat(ObjectType::App),
    ObjectTypeRule::flat(ObjectType::AppGroup),
    ObjectTypeRule::pairs(ObjectType::Idp),
    ObjectTypeRule::pairs(ObjectType::Saml).named(EntityKind::SamlAttribute, EntrySide::Lhs),
    ObjectTypeRule::pairs(ObjectType::Scim).named(EntityKind::ScimAttribute, EntrySide::Lhs),
    ObjectTypeRule::pairs(ObjectType::ScimGroup).named(EntityKind::ScimGroup, EntrySide::Rhs),
    ObjectTypeRule::flat(ObjectType::Posture),
    ObjectTypeRule::flat(ObjectType::TrustedNetwork),
    ObjectTypeRule::flat(ObjectType::Platform).values(PLATFORMS),
    ObjectTypeRule::flat(ObjectType::ClientType).values(CLIENT_TYPES),
    ObjectTypeRule::flat(ObjectType::CountryCode).values(COUNTRY_CODES),
    ObjectTypeRule::flat(ObjectType::MachineGrp),
    ObjectTypeRule::flat(ObjectType::Location),
    ObjectTypeRule::flat(ObjectType::BranchConnectorGroup),
    ObjectTypeRule::flat(ObjectType::EdgeConnectorGroup),
    ObjectTypeRule::flat(ObjectType::Console).only_in(CREDENTIAL_ONLY),
    ObjectTypeRule::flat(ObjectType::RiskFactorType)
        .values(RISK_LEVELS)
        .only_in(ACCESS_ONLY),
];

/// The policy-table descriptor for `object_type`, if any.
pub fn rule_for(object_type: ObjectType) -> Option<&'static ObjectTypeRule> {
    OBJECT_TYPE_RULES
        .iter()
        .find(|rule| rule.object_type == object_type)
}

/// The descriptor used for `object_type` under `context`.
///
/// Log receivers share the policy shapes but narrow some value sets.
pub fn descriptor(context: ValidationContext, object_type: ObjectType) -> Option<ObjectTypeRule> {
    let rule = *rule_for(object_type)?;
    match (context, object_type) {
        (ValidationContext::LogReceiver(_), ObjectType::ClientType) => {
            Some(rule.values(LOG_CLIENT_TYPES))
        }
        _ => Some(rule),
    }
}

// ── Log-receiver table ───────────────────────────────────────────────────────

const USER_ACTIVITY_FILTERS: &[ObjectType] = &[
    ObjectType::App,
    ObjectType::AppGroup,
    ObjectType::ClientType,
    ObjectType::Idp,
    ObjectType::Saml,
    ObjectType::Scim,
    ObjectType::ScimGroup,
];

const USER_STATUS_FILTERS: &[ObjectType] = &[
    ObjectType::ClientType,
    ObjectType::Saml,
    ObjectType::Scim,
    ObjectType::ScimGroup,
];

const WEB_FILTERS: &[ObjectType] = &[
    ObjectType::App,
    ObjectType::AppGroup,
    ObjectType::Idp,
    ObjectType::Saml,
    ObjectType::Scim,
    ObjectType::ScimGroup,
];

/// Object types a log receiver of `source` may filter on. Empty means the
/// source type accepts no filter conditions.
pub fn log_filter_types(source: SourceLogType) -> &'static [ObjectType] {
    match source {
        SourceLogType::UserActivity => USER_ACTIVITY_FILTERS,
        SourceLogType::UserStatus => USER_STATUS_FILTERS,
        SourceLogType::BrowserAccess | SourceLogType::AppProtection => WEB_FILTERS,
        SourceLogType::AppConnectorStatus
        | SourceLogType::AppConnectorMetrics
        | SourceLogType::PrivateServiceEdgeStatus
        | SourceLogType::PrivateServiceEdgeMetrics
        | SourceLogType::Audit => &[],
    }
}

pub fn supports_filters(source: SourceLogType) -> bool {
    !log_filter_types(source).is_empty()
}
