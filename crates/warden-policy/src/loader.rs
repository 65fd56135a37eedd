//! Rule document loading.
//!
//! Documents are parsed in two phases:
//!
//! 1. **Untyped**: the TOML or JSON text becomes a `serde_json::Value` and is
//!    checked against a JSON Schema describing the document's structure
//!    (field names, list vs. string, entry pair layout). Every structural
//!    problem is reported at once, with its JSON pointer.
//! 2. **Typed**: the checked tree is deserialized into `RuleDocument`.
//!    Object types, categories, operators and source log types are converted
//!    from their external names here, and only here.
//!
//! Semantic checks (shapes per object type, value sets, references) belong to
//! the condition validator, not to the loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use warden_contracts::{
    error::{WardenError, WardenResult},
    rule::{LogReceiverDeclaration, RuleDeclaration},
};

/// The top-level structure of a rule document.
///
/// Example:
/// ```toml
/// [[rules]]
/// name = "allow-engineering-linux"
/// category = "ACCESS_POLICY"
///
/// [[rules.conditions]]
/// operator = "OR"
///
/// [[rules.conditions.operands]]
/// object_type = "PLATFORM"
/// values = ["linux"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub rules: Vec<RuleDeclaration>,

    #[serde(default)]
    pub log_receivers: Vec<LogReceiverDeclaration>,
}

impl RuleDocument {
    /// Parse `s` as TOML and load it as a rule document.
    pub fn from_toml_str(s: &str) -> WardenResult<Self> {
        let raw: toml::Value = toml::from_str(s).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to parse rule document TOML: {}", e),
        })?;
        let value = serde_json::to_value(raw).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to convert rule document TOML: {}", e),
        })?;
        Self::from_value(value)
    }

    /// Parse `s` as JSON and load it as a rule document.
    pub fn from_json_str(s: &str) -> WardenResult<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to parse rule document JSON: {}", e),
        })?;
        Self::from_value(value)
    }

    /// Read the file at `path`. Files ending in `.json` are parsed as JSON,
    /// everything else as TOML.
    pub fn from_file(path: &Path) -> WardenResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to read rule document '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "loading rule document");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Structurally check an untyped tree, then convert it to typed form.
    pub fn from_value(value: Value) -> WardenResult<Self> {
        check_structure(&value)?;
        let document: RuleDocument =
            serde_json::from_value(value).map_err(|e| WardenError::ConfigError {
                reason: format!("invalid rule document: {}", e),
            })?;
        debug!(
            rules = document.rules.len(),
            log_receivers = document.log_receivers.len(),
            "rule document loaded"
        );
        Ok(document)
    }
}

/// Run the JSON Schema check over an untyped document.
fn check_structure(value: &Value) -> WardenResult<()> {
    let schema = document_schema();
    let validator = jsonschema::validator_for(&schema).map_err(|e| WardenError::ConfigError {
        reason: format!("invalid rule document schema: {e}"),
    })?;

    let problems: Vec<String> = validator
        .iter_errors(value)
        .map(|error| format!("at '{}': {}", error.instance_path, error))
        .collect();

    if problems.is_empty() {
        return Ok(());
    }

    warn!(problem_count = problems.len(), "rule document failed structural check");
    Err(WardenError::ConfigError {
        reason: format!("rule document is malformed: {}", problems.join("; ")),
    })
}

/// The JSON Schema describing a rule document's structure.
pub fn document_schema() -> Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    let operand = json!({
        "type": "object",
        "required": ["object_type"],
        "additionalProperties": false,
        "properties": {
            "object_type": { "type": "string" },
            "values": string_list,
            "entries": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["lhs", "rhs"],
                    "additionalProperties": false,
                    "properties": {
                        "lhs": { "type": "string" },
                        "rhs": { "type": "string" }
                    }
                }
            },
            "idp": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "idp_id": { "type": "string" },
                    "idp_name": { "type": "string" }
                }
            }
        }
    });

    let condition = json!({
        "type": "object",
        "required": ["operator"],
        "additionalProperties": false,
        "properties": {
            "operator": { "type": "string" },
            "negated": { "type": "boolean" },
            "operands": { "type": "array", "items": operand }
        }
    });

    let conditions = json!({ "type": "array", "items": condition });

    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "rules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "additionalProperties": false,
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "category": { "type": "string" },
                        "microtenant_id": { "type": "string" },
                        "conditions": conditions
                    }
                }
            },
            "log_receivers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "source_log_type"],
                    "additionalProperties": false,
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "source_log_type": { "type": "string" },
                        "conditions": conditions
                    }
                }
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
