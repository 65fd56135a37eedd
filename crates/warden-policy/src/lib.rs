//! # warden-policy
//!
//! Static knowledge about object types, and the two ways condition trees
//! enter and leave the engine.
//!
//! ## Overview
//!
//! - [`table`] holds the object-type rule table and the log-receiver filter
//!   table. The validator and the mapper read shapes, value sets and
//!   applicability from here and nowhere else.
//! - [`loader`] reads rule documents (TOML or JSON) in two phases: a JSON
//!   Schema structural check over the untyped tree, then typed decoding.
//! - [`mapper`] converts condition lists to and from flat dotted-key maps.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use warden_policy::RuleDocument;
//!
//! let document = RuleDocument::from_file(Path::new("policies/zero-trust.toml"))?;
//! for rule in &document.rules {
//!     // Hand each declaration to `warden_core::Admission::admit`.
//! }
//! ```

pub mod loader;
pub mod mapper;
pub mod table;

pub use loader::RuleDocument;
pub use mapper::{expand_conditions, flatten_conditions};
pub use table::{descriptor, log_filter_types, rule_for, ObjectTypeRule, OperandShape};

// ── Tests ─────────────────────────────────────────────────────────────────────
