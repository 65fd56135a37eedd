//! # warden-resolve
//!
//! Policy container resolution for the WARDEN policy engine.
//!
//! [`CategoryResolver`] implements the
//! [`ContainerResolver`](warden_core::traits::ContainerResolver) trait over any
//! [`ContainerDirectory`](warden_core::traits::ContainerDirectory). Exactly one
//! live container must exist per `(category, scope)`; zero or several are
//! errors.
//!
//! The [`memory`] module holds in-memory collaborators for tests and demos.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_resolve::{CategoryResolver, InMemoryDirectory};
//!
//! let directory = InMemoryDirectory::new();
//! directory.register(PolicyRuleCategory::GlobalPolicy, TenantScope::Default);
//! let resolver = CategoryResolver::new(Box::new(directory.clone()));
//! let container = resolver.resolve_container(None, &TenantScope::Default)?;
//! ```

pub mod memory;
pub mod resolver;

pub use memory::{InMemoryDirectory, InMemoryEntityLookup, InMemoryRuleStore};
pub use resolver::{effective_category, CategoryResolver, UNSCOPED_ACCESS_CATEGORY};

// ── Tests ─────────────────────────────────────────────────────────────────────
