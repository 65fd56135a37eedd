//! Error types for the WARDEN validation and reconciliation engine.
//!
//! Configuration errors (`ConditionError`, `PortRangeError`) are caused
//! entirely by caller input and are never retried. `RemoteError` marks a
//! collaborator that could not be reached; it is kept apart from "not found"
//! so callers can tell "does not exist" from "could not check".

use std::fmt;

use thiserror::Error;

use crate::category::{PolicyRuleCategory, SourceLogType, TenantScope};
use crate::condition::{EntityKind, ObjectType};

/// A single operand- or condition-level configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The object type has no descriptor in the rule table.
    #[error("unknown object type '{name}'")]
    UnknownObjectType { name: String },

    /// The operand carries the wrong shape (values vs. entries) for its type.
    #[error("object type {object_type}: {reason}")]
    ShapeMismatch {
        object_type: ObjectType,
        reason: String,
    },

    /// An entry pair is missing its `lhs` or `rhs`.
    #[error("object type {object_type}: entry {index} is malformed: {reason}")]
    MalformedEntryPair {
        object_type: ObjectType,
        index: usize,
        reason: String,
    },

    /// A submitted value is outside the object type's closed value set.
    #[error("object type {object_type}: value '{value}' is not allowed")]
    ValueNotAllowed { object_type: ObjectType, value: String },

    /// The object type may not be used under the current category or source type.
    #[error("object type {object_type} is not applicable to {context}")]
    ObjectTypeNotApplicable {
        object_type: ObjectType,
        context: String,
    },

    /// The log receiver's source type accepts no filter conditions at all.
    #[error("source log type {source_log_type} does not support filter conditions")]
    FilterNotSupportedForSourceType { source_log_type: SourceLogType },

    /// A by-name operand lacks a usable identity provider scope.
    #[error("object type {object_type}: {reason}")]
    MissingIdentityScope {
        object_type: ObjectType,
        reason: String,
    },

    /// A by-name reference did not resolve.
    #[error("{kind} '{name}' not found in {scope}")]
    ReferenceNotFound {
        kind: EntityKind,
        name: String,
        scope: String,
    },

    /// A condition with no operands.
    #[error("condition has no operands")]
    EmptyCondition,
}

/// A `ConditionError` tagged with where in the tree it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFailure {
    /// `conditions[i]` or `conditions[i].operands[j]`.
    pub location: String,
    pub error: ConditionError,
}

impl fmt::Display for ConditionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.error)
    }
}

fn join_failures(failures: &[ConditionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a remote collaborator call did not produce an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Timeout,
    Transport,
    Cancelled,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemoteErrorKind::Timeout => "timeout",
            RemoteErrorKind::Transport => "transport failure",
            RemoteErrorKind::Cancelled => "cancelled",
        })
    }
}

/// A remote lookup that could not be completed. Passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resolution unavailable ({kind}): {reason}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub reason: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// The result of a failed validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Every configuration failure found in the pass, in tree pre-order.
    #[error("{} condition check(s) failed: {}", .0.len(), join_failures(.0))]
    Rejected(Vec<ConditionFailure>),

    /// A remote lookup failed; the pass was abandoned.
    #[error(transparent)]
    Unavailable(#[from] RemoteError),
}

impl ValidationError {
    /// The collected failures, empty when the pass was abandoned.
    pub fn failures(&self) -> &[ConditionFailure] {
        match self {
            ValidationError::Rejected(failures) => failures,
            ValidationError::Unavailable(_) => &[],
        }
    }
}

/// Container resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No live container for the category in this scope.
    #[error("no {category} container exists for {scope}")]
    ContainerNotFound {
        category: PolicyRuleCategory,
        scope: TenantScope,
    },

    /// More than one live container for the category in this scope.
    #[error("{count} {category} containers exist for {scope}; expected exactly one")]
    DuplicateContainer {
        category: PolicyRuleCategory,
        scope: TenantScope,
        count: usize,
    },

    #[error(transparent)]
    Unavailable(#[from] RemoteError),
}

/// Port-range normalization failures. Normalization aborts on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortRangeError {
    #[error("malformed port range: {reason}")]
    MalformedPortRange { reason: String },
}

/// The unified error type for the WARDEN pipeline.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("condition validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("container resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    PortRange(#[from] PortRangeError),

    #[error(transparent)]
    Unavailable(#[from] RemoteError),

    /// A rule document could not be read or did not match the schema.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A flat key/value representation could not be expanded.
    #[error("decode error at '{path}': {reason}")]
    DecodeError { path: String, reason: String },

    /// The rule writer collaborator rejected an admitted rule.
    #[error("rule write failed: {reason}")]
    WriteFailed { reason: String },
}

/// Convenience alias used throughout the WARDEN crates.
pub type WardenResult<T> = Result<T, WardenError>;
