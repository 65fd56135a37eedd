//! # warden-verify
//!
//! Condition validation for the WARDEN policy engine.
//!
//! This crate provides [`validator::ConditionValidator`], which implements the
//! [`warden_core::traits::ConditionChecker`] trait, and the free functions
//! [`validate`] and [`validate_and_resolve`] it is built on.
//!
//! Validation is collect-all: a rejected tree reports every failure it
//! contains, in pre-order, each tagged with its `conditions[i].operands[j]`
//! location. The only early exit is a remote lookup that cannot be completed,
//! which surfaces as `ValidationError::Unavailable`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use warden_contracts::category::{PolicyRuleCategory, ValidationContext};
//! use warden_verify::validate;
//!
//! let context = ValidationContext::Policy(PolicyRuleCategory::AccessPolicy);
//! validate(&rule.conditions, context, &lookup)?;
//! ```

pub mod validator;

pub use validator::{validate, validate_and_resolve, ConditionValidator};
