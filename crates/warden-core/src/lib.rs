//! # warden-core
//!
//! The seams of the WARDEN policy engine and the pipeline that joins them.
//!
//! This crate provides:
//! - The collaborator traits (`EntityLookup`, `ContainerDirectory`,
//!   `RuleWriter`) the engine calls out to
//! - The engine traits (`ConditionChecker`, `ContainerResolver`) implemented
//!   by `warden-verify` and `warden-resolve`
//! - The `Admission` pipeline: resolve container → validate → write
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_core::{Admission, traits::{ConditionChecker, ContainerResolver, EntityLookup, RuleWriter}};
//! ```

pub mod admission;
pub mod traits;

pub use admission::{Admission, AdmissionOutcome};
