//! Port-range types shared by the reconciler and its callers.
//!
//! A port range may be declared in two encodings:
//!
//! - flat: `["80", "80", "8080", "8090"]`, alternating start/end values
//! - structured: `[{ from = "80", to = "80" }, { from = "8080", to = "8090" }]`
//!
//! Both normalize to the same `Vec<PortRange>`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An inclusive `(from, to)` port range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    /// Build a range without checking `from <= to`.
    ///
    /// Use the reconciler's `normalize` for untrusted input.
    pub const fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    pub const fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// One structured `{from, to}` record, exactly as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPortRange {
    pub from: String,
    pub to: String,
}

impl RawPortRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Either admissible encoding of a port-range list, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPortRanges {
    Flat(Vec<String>),
    Structured(Vec<RawPortRange>),
}

impl RawPortRanges {
    pub fn is_empty(&self) -> bool {
        match self {
            RawPortRanges::Flat(values) => values.is_empty(),
            RawPortRanges::Structured(records) => records.is_empty(),
        }
    }
}

impl From<&[PortRange]> for RawPortRanges {
    /// Re-encode already normalized ranges in the structured form.
    fn from(ranges: &[PortRange]) -> Self {
        RawPortRanges::Structured(
            ranges
                .iter()
                .map(|r| RawPortRange::new(r.from.to_string(), r.to.to_string()))
                .collect(),
        )
    }
}

/// Which encoding the reconciler chose as authoritative for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortEncoding {
    Flat,
    Structured,
}

/// The outcome of the three-way port-range comparison done during update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledPorts {
    pub encoding: PortEncoding,
    pub ranges: Vec<PortRange>,
}
