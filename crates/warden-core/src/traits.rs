//! Trait definitions for the WARDEN pipeline.
//!
//! Three traits describe external collaborators:
//!
//! - `EntityLookup`: resolves IdP-scoped entities by human-readable name
//! - `ContainerDirectory`: lists the live policy containers for a key
//! - `RuleWriter`: performs the remote write of an admitted rule
//!
//! Two traits describe the engine's own stages, so the pipeline can be wired
//! with alternative implementations in tests:
//!
//! - `ConditionChecker`: validates a condition tree
//! - `ContainerResolver`: maps a category and scope to one container id
//!
//! Remote calls are made at most once per validation pass. Implementations
//! of the collaborator traits own their timeout and retry policy; the engine
//! never retries.

use warden_contracts::{
    category::{PolicyContainer, PolicyRuleCategory, TenantScope, ValidationContext},
    condition::{Condition, EntityKind},
    error::{RemoteError, ResolutionError, ValidationError, WardenResult},
    rule::AdmittedRule,
};

/// Resolves entities referenced by name.
pub trait EntityLookup: Send + Sync {
    /// Return the opaque id of the entity `name` of `kind`, scoped to the
    /// identity provider id `idp`.
    ///
    /// Identity providers themselves are looked up with `idp = None`.
    /// `Ok(None)` means the entity does not exist; `Err` means the lookup
    /// could not be completed.
    fn lookup(
        &self,
        idp: Option<&str>,
        kind: EntityKind,
        name: &str,
    ) -> Result<Option<String>, RemoteError>;
}

/// The remote directory of policy containers.
pub trait ContainerDirectory: Send + Sync {
    /// List every live container keyed by `(category, scope)`.
    ///
    /// The scope is part of the key: a directory must never return a
    /// container from a different tenant partition.
    fn find(
        &self,
        category: PolicyRuleCategory,
        scope: &TenantScope,
    ) -> Result<Vec<PolicyContainer>, RemoteError>;
}

/// Performs the remote write of a rule that passed admission.
pub trait RuleWriter: Send + Sync {
    fn write(&self, rule: &AdmittedRule) -> WardenResult<()>;
}

/// Validates a condition tree under a context.
pub trait ConditionChecker: Send + Sync {
    /// Validate `conditions` and return them with by-name references
    /// replaced by resolved ids.
    ///
    /// All configuration failures in the tree are collected into
    /// `ValidationError::Rejected`. A failed remote lookup aborts the pass
    /// with `ValidationError::Unavailable`.
    fn check(
        &self,
        conditions: &[Condition],
        context: ValidationContext,
        lookup: &dyn EntityLookup,
    ) -> Result<Vec<Condition>, ValidationError>;
}

/// Maps a logical policy category to the one live container that owns it.
pub trait ContainerResolver: Send + Sync {
    /// `category = None` requests the access-policy container under its
    /// backward-compatible default name. The returned container carries the
    /// category that was actually looked up.
    fn resolve_container(
        &self,
        category: Option<PolicyRuleCategory>,
        scope: &TenantScope,
    ) -> Result<PolicyContainer, ResolutionError>;
}
