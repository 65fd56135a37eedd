//! The typed condition tree attached to every policy rule.
//!
//! A rule carries a list of `Condition`s that are combined with AND. Each
//! condition combines its `Operand`s with its own `operator`. Every operand is
//! scoped to exactly one `ObjectType`, and the object type alone decides
//! whether the operand carries flat `values` or `(lhs, rhs)` `entries`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConditionError;

/// How the operands of a single condition combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            other => Err(format!("unknown condition operator '{other}'")),
        }
    }
}

/// The closed set of entity kinds an operand can constrain.
///
/// External names are the upper snake case tokens used by the remote API
/// (e.g. `"SCIM_GROUP"`). Conversion from those strings happens once, at the
/// decoding boundary; everything past that point works with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    App,
    AppGroup,
    Idp,
    Saml,
    Scim,
    ScimGroup,
    Posture,
    TrustedNetwork,
    Platform,
    ClientType,
    CountryCode,
    MachineGrp,
    Location,
    BranchConnectorGroup,
    EdgeConnectorGroup,
    Console,
    RiskFactorType,
}

impl ObjectType {
    /// Every object type, in declaration order.
    pub const ALL: [ObjectType; 17] = [
        ObjectType::App,
        ObjectType::AppGroup,
        ObjectType::Idp,
        ObjectType::Saml,
        ObjectType::Scim,
        ObjectType::ScimGroup,
        ObjectType::Posture,
        ObjectType::TrustedNetwork,
        ObjectType::Platform,
        ObjectType::ClientType,
        ObjectType::CountryCode,
        ObjectType::MachineGrp,
        ObjectType::Location,
        ObjectType::BranchConnectorGroup,
        ObjectType::EdgeConnectorGroup,
        ObjectType::Console,
        ObjectType::RiskFactorType,
    ];

    /// The external (wire) name of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::App => "APP",
            ObjectType::AppGroup => "APP_GROUP",
            ObjectType::Idp => "IDP",
            ObjectType::Saml => "SAML",
            ObjectType::Scim => "SCIM",
            ObjectType::ScimGroup => "SCIM_GROUP",
            ObjectType::Posture => "POSTURE",
            ObjectType::TrustedNetwork => "TRUSTED_NETWORK",
            ObjectType::Platform => "PLATFORM",
            ObjectType::ClientType => "CLIENT_TYPE",
            ObjectType::CountryCode => "COUNTRY_CODE",
            ObjectType::MachineGrp => "MACHINE_GRP",
            ObjectType::Location => "LOCATION",
            ObjectType::BranchConnectorGroup => "BRANCH_CONNECTOR_GROUP",
            ObjectType::EdgeConnectorGroup => "EDGE_CONNECTOR_GROUP",
            ObjectType::Console => "CONSOLE",
            ObjectType::RiskFactorType => "RISK_FACTOR_TYPE",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConditionError::UnknownObjectType {
                name: s.to_string(),
            })
    }
}

/// One `(lhs, rhs)` pair: "attribute `lhs` of an IdP-scoped entity equals `rhs`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperandEntry {
    pub lhs: String,
    pub rhs: String,
}

impl OperandEntry {
    pub fn new(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

/// The identity provider an operand's by-name references are scoped to.
///
/// Exactly one of `idp_id` / `idp_name` must be supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdpScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_name: Option<String>,
}

impl IdpScope {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            idp_id: Some(id.into()),
            idp_name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            idp_id: None,
            idp_name: Some(name.into()),
        }
    }
}

impl fmt::Display for IdpScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.idp_id, &self.idp_name) {
            (Some(id), None) => write!(f, "idp id '{id}'"),
            (None, Some(name)) => write!(f, "idp '{name}'"),
            (Some(id), Some(name)) => write!(f, "idp id '{id}' / idp '{name}'"),
            (None, None) => f.write_str("no idp"),
        }
    }
}

/// The atomic constraint unit of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub object_type: ObjectType,

    /// Flat identifiers or enumeration tokens. Legal only for flat-value types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// `(lhs, rhs)` pairs. Legal only for entry-pair types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<OperandEntry>,

    /// When set, the referenced side of each entry is a human-readable name
    /// resolved within this identity provider instead of an opaque id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp: Option<IdpScope>,
}

impl Operand {
    /// A flat-value operand.
    pub fn flat<I, S>(object_type: ObjectType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object_type,
            values: values.into_iter().map(Into::into).collect(),
            entries: Vec::new(),
            idp: None,
        }
    }

    /// An entry-pair operand.
    pub fn pairs(object_type: ObjectType, entries: Vec<OperandEntry>) -> Self {
        Self {
            object_type,
            values: Vec::new(),
            entries,
            idp: None,
        }
    }

    /// Scope this operand's entries to an identity provider, switching them
    /// to by-name references.
    pub fn with_idp(mut self, idp: IdpScope) -> Self {
        self.idp = Some(idp);
        self
    }
}

/// A boolean grouping of operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Operator,

    #[serde(default)]
    pub negated: bool,

    #[serde(default)]
    pub operands: Vec<Operand>,
}

impl Condition {
    pub fn new(operator: Operator, operands: Vec<Operand>) -> Self {
        Self {
            operator,
            negated: false,
            operands,
        }
    }

    pub fn or(operands: Vec<Operand>) -> Self {
        Self::new(Operator::Or, operands)
    }

    pub fn and(operands: Vec<Operand>) -> Self {
        Self::new(Operator::And, operands)
    }
}

/// The kinds of remote entity an operand may reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    IdentityProvider,
    SamlAttribute,
    ScimAttribute,
    ScimGroup,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::IdentityProvider => "identity provider",
            EntityKind::SamlAttribute => "SAML attribute",
            EntityKind::ScimAttribute => "SCIM attribute",
            EntityKind::ScimGroup => "SCIM group",
        })
    }
}

/// Which side of an entry pair holds the referenced entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntrySide {
    Lhs,
    Rhs,
}

impl OperandEntry {
    pub fn side(&self, side: EntrySide) -> &str {
        match side {
            EntrySide::Lhs => &self.lhs,
            EntrySide::Rhs => &self.rhs,
        }
    }

    pub fn side_mut(&mut self, side: EntrySide) -> &mut String {
        match side {
            EntrySide::Lhs => &mut self.lhs,
            EntrySide::Rhs => &mut self.rhs,
        }
    }
}
