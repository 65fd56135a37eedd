//! # warden-reconcile
//!
//! Drift-free comparison for the WARDEN policy engine.
//!
//! After a rule is written, the remote service returns it in its own order
//! and encoding. This crate decides whether what came back differs
//! meaningfully from what was declared:
//!
//! - [`ports`] normalizes the flat and structured port-range encodings,
//!   compares them as multisets, and picks the encoding to write on update.
//! - [`fingerprint`] hashes a condition list in a canonical order so two
//!   orderings of the same conditions compare equal.

pub mod fingerprint;
pub mod ports;

pub use fingerprint::{conditions_equivalent, fingerprint};
pub use ports::{equivalent, normalize, reconcile, reconcile_raw, to_flat, to_structured};
