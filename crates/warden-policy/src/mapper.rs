//! Flat key/value representation of a condition list.
//!
//! Some stores only hold string maps. A condition list flattens to dotted
//! keys with `#` entries carrying list lengths:
//!
//! ```text
//! conditions.#                               = 1
//! conditions.0.operator                      = OR
//! conditions.0.negated                       = false
//! conditions.0.operands.#                    = 1
//! conditions.0.operands.0.object_type        = SCIM_GROUP
//! conditions.0.operands.0.entries.#          = 1
//! conditions.0.operands.0.entries.0.lhs      = idp-1
//! conditions.0.operands.0.entries.0.rhs      = grp-9
//! conditions.0.operands.0.idp.idp_name       = Okta
//! ```
//!
//! There is one mapper for every object type. Whether an operand is written
//! as `values` or `entries` comes from the rule table's shape for its type.

use std::collections::BTreeMap;
use std::str::FromStr;

use warden_contracts::{
    condition::{Condition, IdpScope, ObjectType, Operand, OperandEntry, Operator},
    error::{WardenError, WardenResult},
};

use crate::table::{rule_for, OperandShape};

const ROOT: &str = "conditions";

fn shape_of(object_type: ObjectType) -> Option<OperandShape> {
    rule_for(object_type).map(|rule| rule.shape)
}

/// Flatten `conditions` into dotted keys.
///
/// Operands are written in the shape the table assigns to their object type;
/// a field the table does not use for that type is not written. Validate
/// before flattening.
pub fn flatten_conditions(conditions: &[Condition]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(format!("{ROOT}.#"), conditions.len().to_string());

    for (i, condition) in conditions.iter().enumerate() {
        let prefix = format!("{ROOT}.{i}");
        map.insert(format!("{prefix}.operator"), condition.operator.to_string());
        map.insert(format!("{prefix}.negated"), condition.negated.to_string());
        map.insert(
            format!("{prefix}.operands.#"),
            condition.operands.len().to_string(),
        );

        for (j, operand) in condition.operands.iter().enumerate() {
            flatten_operand(&mut map, &format!("{prefix}.operands.{j}"), operand);
        }
    }

    map
}

fn flatten_operand(map: &mut BTreeMap<String, String>, prefix: &str, operand: &Operand) {
    map.insert(
        format!("{prefix}.object_type"),
        operand.object_type.to_string(),
    );

    match shape_of(operand.object_type) {
        Some(OperandShape::FlatValues) => {
            map.insert(format!("{prefix}.values.#"), operand.values.len().to_string());
            for (k, value) in operand.values.iter().enumerate() {
                map.insert(format!("{prefix}.values.{k}"), value.clone());
            }
        }
        Some(OperandShape::EntryPairs) => {
            map.insert(
                format!("{prefix}.entries.#"),
                operand.entries.len().to_string(),
            );
            for (k, entry) in operand.entries.iter().enumerate() {
                map.insert(format!("{prefix}.entries.{k}.lhs"), entry.lhs.clone());
                map.insert(format!("{prefix}.entries.{k}.rhs"), entry.rhs.clone());
            }
        }
        // Only the type is written; expanding it fails.
        None => {}
    }

    if let Some(idp) = &operand.idp {
        if let Some(id) = &idp.idp_id {
            map.insert(format!("{prefix}.idp.idp_id"), id.clone());
        }
        if let Some(name) = &idp.idp_name {
            map.insert(format!("{prefix}.idp.idp_name"), name.clone());
        }
    }
}

/// Rebuild a condition list from its flat form.
///
/// Fails with `DecodeError` naming the first key that is missing or cannot
/// be parsed. Keys outside the layout are ignored.
pub fn expand_conditions(map: &BTreeMap<String, String>) -> WardenResult<Vec<Condition>> {
    let reader = FlatReader { map };

    let count = reader.count(ROOT)?;
    let mut conditions = Vec::new();

    for i in 0..count {
        let prefix = format!("{ROOT}.{i}");

        let operator_key = format!("{prefix}.operator");
        let operator = Operator::from_str(reader.required(&operator_key)?)
            .map_err(|reason| decode_error(&operator_key, reason))?;

        let negated_key = format!("{prefix}.negated");
        let negated = match reader.optional(&negated_key) {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|e| decode_error(&negated_key, e.to_string()))?,
            None => false,
        };

        let operands_prefix = format!("{prefix}.operands");
        let operand_count = reader.count(&operands_prefix)?;
        let operands = (0..operand_count)
            .map(|j| expand_operand(&reader, &format!("{operands_prefix}.{j}")))
            .collect::<WardenResult<Vec<_>>>()?;

        conditions.push(Condition {
            operator,
            negated,
            operands,
        });
    }

    Ok(conditions)
}

fn expand_operand(reader: &FlatReader<'_>, prefix: &str) -> WardenResult<Operand> {
    let type_key = format!("{prefix}.object_type");
    let object_type = ObjectType::from_str(reader.required(&type_key)?)
        .map_err(|e| decode_error(&type_key, e.to_string()))?;

    let shape = shape_of(object_type)
        .ok_or_else(|| decode_error(&type_key, format!("no descriptor for {object_type}")))?;

    let mut operand = match shape {
        OperandShape::FlatValues => {
            let values_prefix = format!("{prefix}.values");
            let values = (0..reader.count(&values_prefix)?)
                .map(|k| reader.required(&format!("{values_prefix}.{k}")).map(String::from))
                .collect::<WardenResult<Vec<_>>>()?;
            Operand::flat(object_type, values)
        }
        OperandShape::EntryPairs => {
            let entries_prefix = format!("{prefix}.entries");
            let entries = (0..reader.count(&entries_prefix)?)
                .map(|k| -> WardenResult<OperandEntry> {
                    Ok(OperandEntry::new(
                        reader.required(&format!("{entries_prefix}.{k}.lhs"))?,
                        reader.required(&format!("{entries_prefix}.{k}.rhs"))?,
                    ))
                })
                .collect::<WardenResult<Vec<_>>>()?;
            Operand::pairs(object_type, entries)
        }
    };

    let idp_id = reader.optional(&format!("{prefix}.idp.idp_id"));
    let idp_name = reader.optional(&format!("{prefix}.idp.idp_name"));
    if idp_id.is_some() || idp_name.is_some() {
        operand.idp = Some(IdpScope {
            idp_id: idp_id.map(String::from),
            idp_name: idp_name.map(String::from),
        });
    }

    Ok(operand)
}

struct FlatReader<'a> {
    map: &'a BTreeMap<String, String>,
}

impl<'a> FlatReader<'a> {
    fn optional(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).map(String::as_str)
    }

    fn required(&self, key: &str) -> WardenResult<&'a str> {
        self.optional(key)
            .ok_or_else(|| decode_error(key, "missing key"))
    }

    /// The list length stored under `{prefix}.#`. A missing count is an
    /// empty list.
    ///
    /// Every listed item needs at least one key of its own, so a count larger
    /// than the map is rejected before anything is read.
    fn count(&self, prefix: &str) -> WardenResult<usize> {
        let key = format!("{prefix}.#");
        let Some(raw) = self.optional(&key) else {
            return Ok(0);
        };
        let count = raw
            .parse::<usize>()
            .map_err(|e| decode_error(&key, format!("invalid count '{raw}': {e}")))?;
        if count > self.map.len() {
            return Err(decode_error(
                &key,
                format!("count {count} exceeds the {} keys present", self.map.len()),
            ));
        }
        Ok(count)
    }
}

fn decode_error(path: &str, reason: impl Into<String>) -> WardenError {
    WardenError::DecodeError {
        path: path.to_string(),
        reason: reason.into(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
