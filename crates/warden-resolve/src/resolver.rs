//! Maps a policy rule category to the one live container that owns it.
//!
//! Containers are looked up, never created. Each lookup goes to the
//! directory; nothing is cached between calls.

use tracing::{debug, warn};

use warden_contracts::{
    category::{PolicyContainer, PolicyRuleCategory, TenantScope},
    error::ResolutionError,
};
use warden_core::traits::{ContainerDirectory, ContainerResolver};

/// The category used when no category is given and no microtenant is set.
///
/// Requests without a category mean "access policy". In the default tenant
/// the access rules live in the global policy container; this is the only
/// substitution the resolver makes.
pub const UNSCOPED_ACCESS_CATEGORY: PolicyRuleCategory = PolicyRuleCategory::GlobalPolicy;

/// Resolves containers through a `ContainerDirectory`.
pub struct CategoryResolver {
    directory: Box<dyn ContainerDirectory>,
}

impl CategoryResolver {
    pub fn new(directory: Box<dyn ContainerDirectory>) -> Self {
        Self { directory }
    }
}

/// The category actually looked up for a request.
pub fn effective_category(
    category: Option<PolicyRuleCategory>,
    scope: &TenantScope,
) -> PolicyRuleCategory {
    match category {
        Some(category) => category,
        None if scope.is_default() => UNSCOPED_ACCESS_CATEGORY,
        None => PolicyRuleCategory::AccessPolicy,
    }
}

impl ContainerResolver for CategoryResolver {
    fn resolve_container(
        &self,
        category: Option<PolicyRuleCategory>,
        scope: &TenantScope,
    ) -> Result<PolicyContainer, ResolutionError> {
        let category = effective_category(category, scope);
        debug!(%category, %scope, "resolving policy container");

        let containers = self.directory.find(category, scope)?;

        match containers.as_slice() {
            [] => {
                warn!(%category, %scope, "no policy container found");
                Err(ResolutionError::ContainerNotFound {
                    category,
                    scope: scope.clone(),
                })
            }
            [container] => {
                debug!(%category, %scope, container_id = %container.id, "policy container resolved");
                Ok(container.clone())
            }
            many => {
                warn!(%category, %scope, count = many.len(), "duplicate policy containers");
                Err(ResolutionError::DuplicateContainer {
                    category,
                    scope: scope.clone(),
                    count: many.len(),
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
