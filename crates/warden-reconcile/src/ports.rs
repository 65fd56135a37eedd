//! Port-range normalization and comparison.
//!
//! Both encodings normalize to the same ordered `Vec<PortRange>`. Order is
//! preserved; comparison ignores it.

use tracing::debug;

use warden_contracts::{
    error::PortRangeError,
    ports::{PortEncoding, PortRange, RawPortRange, RawPortRanges, ReconciledPorts},
};

/// Normalize either encoding into `(from, to)` pairs, in declaration order.
///
/// Fails on the first malformed value; nothing is returned for the rest.
pub fn normalize(raw: &RawPortRanges) -> Result<Vec<PortRange>, PortRangeError> {
    match raw {
        RawPortRanges::Flat(values) => {
            if values.len() % 2 != 0 {
                return Err(malformed(format!(
                    "flat port list has {} values; expected start/end pairs",
                    values.len()
                )));
            }
            values
                .chunks_exact(2)
                .map(|pair| range(&pair[0], &pair[1]))
                .collect()
        }
        RawPortRanges::Structured(records) => records
            .iter()
            .map(|record| range(&record.from, &record.to))
            .collect(),
    }
}

fn range(from: &str, to: &str) -> Result<PortRange, PortRangeError> {
    let from = port(from)?;
    let to = port(to)?;
    if from > to {
        return Err(malformed(format!("range {from}-{to} starts after it ends")));
    }
    Ok(PortRange::new(from, to))
}

fn port(raw: &str) -> Result<u16, PortRangeError> {
    let value: u32 = raw
        .parse()
        .map_err(|_| malformed(format!("'{raw}' is not a port number")))?;
    match u16::try_from(value) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(malformed(format!("port {value} is outside 1-65535"))),
    }
}

fn malformed(reason: String) -> PortRangeError {
    PortRangeError::MalformedPortRange { reason }
}

/// Whether `a` and `b` hold the same multiset of ranges.
pub fn equivalent(a: &[PortRange], b: &[PortRange]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// The flat alternating encoding: `["80", "80", "8080", "8090"]`.
pub fn to_flat(ranges: &[PortRange]) -> Vec<String> {
    ranges
        .iter()
        .flat_map(|r| [r.from.to_string(), r.to.to_string()])
        .collect()
}

/// The structured `{from, to}` encoding.
pub fn to_structured(ranges: &[PortRange]) -> Vec<RawPortRange> {
    ranges
        .iter()
        .map(|r| RawPortRange::new(r.from.to_string(), r.to.to_string()))
        .collect()
}

/// Choose what to write during an update.
///
/// `declared` is the newly declared structured list, `previous_flat` the
/// flat list declared before, and `remote` the remote's last-known ranges.
///
/// - equivalent to `previous_flat`: flat encoding, `previous_flat` verbatim
/// - else equivalent to `remote`: flat encoding, `remote` verbatim
/// - otherwise: structured encoding, `declared` verbatim
///
/// Preferring the flat form when nothing changed keeps repeated applies from
/// flipping between the two encodings.
pub fn reconcile(
    declared: &[PortRange],
    previous_flat: &[PortRange],
    remote: &[PortRange],
) -> ReconciledPorts {
    let (encoding, ranges) = if equivalent(declared, previous_flat) {
        (PortEncoding::Flat, previous_flat)
    } else if equivalent(declared, remote) {
        (PortEncoding::Flat, remote)
    } else {
        (PortEncoding::Structured, declared)
    };

    debug!(
        ?encoding,
        declared = declared.len(),
        chosen = ranges.len(),
        "port ranges reconciled"
    );

    ReconciledPorts {
        encoding,
        ranges: ranges.to_vec(),
    }
}

/// Normalize all three inputs and reconcile them.
pub fn reconcile_raw(
    declared: &RawPortRanges,
    previous_flat: &RawPortRanges,
    remote: &RawPortRanges,
) -> Result<ReconciledPorts, PortRangeError> {
    Ok(reconcile(
        &normalize(declared)?,
        &normalize(previous_flat)?,
        &normalize(remote)?,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
