//! In-memory collaborators.
//!
//! Reference implementations of the `warden-core` collaborator traits, used
//! by the demo and by tests across the workspace:
//!
//! - `InMemoryDirectory`: a container directory
//! - `InMemoryEntityLookup`: a fixed table of IdP-scoped entities
//! - `InMemoryRuleStore`: a rule writer that keeps what it is given
//!
//! The directory and the store keep their state behind `Arc<Mutex<_>>` so
//! clones share it: hand one clone to the pipeline and inspect another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use warden_contracts::{
    category::{ContainerId, PolicyContainer, PolicyRuleCategory, TenantScope},
    condition::EntityKind,
    error::{RemoteError, RemoteErrorKind, WardenError, WardenResult},
    rule::AdmittedRule,
};
use warden_core::traits::{ContainerDirectory, EntityLookup, RuleWriter};

// ── Container directory ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    containers: Arc<Mutex<Vec<PolicyContainer>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container for `(category, scope)` under a fresh id.
    pub fn register(&self, category: PolicyRuleCategory, scope: TenantScope) -> ContainerId {
        let id = ContainerId::generate();
        let name = format!("{category} ({scope})");
        self.insert(PolicyContainer {
            id: id.clone(),
            category,
            scope,
            name,
        });
        id
    }

    /// Add a container exactly as given. Nothing stops two containers from
    /// sharing a key; the resolver reports that as a duplicate.
    pub fn insert(&self, container: PolicyContainer) {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(container);
    }

    pub fn len(&self) -> usize {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContainerDirectory for InMemoryDirectory {
    fn find(
        &self,
        category: PolicyRuleCategory,
        scope: &TenantScope,
    ) -> Result<Vec<PolicyContainer>, RemoteError> {
        let containers = self.containers.lock().map_err(|e| {
            RemoteError::new(
                RemoteErrorKind::Transport,
                format!("directory state lock poisoned: {}", e),
            )
        })?;

        Ok(containers
            .iter()
            .filter(|c| c.category == category && &c.scope == scope)
            .cloned()
            .collect())
    }
}

// ── Entity lookup ─────────────────────────────────────────────────────────────

/// A fixed table of entities, built up front and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityLookup {
    entities: HashMap<(Option<String>, EntityKind, String), String>,
}

impl InMemoryEntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity provider by name.
    pub fn with_idp(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.entities
            .insert((None, EntityKind::IdentityProvider, name.into()), id.into());
        self
    }

    /// Register an entity of `kind` scoped to the identity provider `idp_id`.
    pub fn with_entity(
        mut self,
        idp_id: impl Into<String>,
        kind: EntityKind,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        self.entities
            .insert((Some(idp_id.into()), kind, name.into()), id.into());
        self
    }
}

impl EntityLookup for InMemoryEntityLookup {
    fn lookup(
        &self,
        idp: Option<&str>,
        kind: EntityKind,
        name: &str,
    ) -> Result<Option<String>, RemoteError> {
        let found = self
            .entities
            .get(&(idp.map(String::from), kind, name.to_string()))
            .cloned();
        debug!(idp = ?idp, %kind, %name, found = found.is_some(), "entity lookup");
        Ok(found)
    }
}

// ── Rule store ────────────────────────────────────────────────────────────────

/// A rule writer that appends every admitted rule to a shared list.
#[derive(Clone, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<Mutex<Vec<AdmittedRule>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every rule written so far, in write order.
    pub fn rules(&self) -> Vec<AdmittedRule> {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RuleWriter for InMemoryRuleStore {
    fn write(&self, rule: &AdmittedRule) -> WardenResult<()> {
        let mut rules = self.rules.lock().map_err(|e| WardenError::WriteFailed {
            reason: format!("rule store lock poisoned: {}", e),
        })?;
        rules.push(rule.clone());

        info!(
            rule = %rule.name,
            container_id = %rule.container_id,
            stored = rules.len(),
            "rule stored"
        );
        Ok(())
    }
}
