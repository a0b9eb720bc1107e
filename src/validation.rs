//! Configuration validation against a [`Schema`].
//!
//! # Example
//!
//! ```
//! use sonarr_provider::schema::{Attribute, Schema};
//! use sonarr_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("path", Attribute::required_string())
//!     .with_attribute("quality_profile", Attribute::required_int32());
//!
//! let diagnostics = validate(&schema, &json!({"path": "/tv", "quality_profile": 1}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"path": "/tv", "quality_profile": "hd"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("quality_profile".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Block, Diagnostic, NestedBlock, Schema};
use serde_json::Value;

/// Validate a configuration value against a schema.
///
/// Returns one diagnostic per problem; an empty list means the value is valid.
///
/// # Validation Rules
///
/// - `null` is treated as an empty configuration
/// - Required attributes must be present and non-null
/// - Computed-only attributes must not be set
/// - Attribute types must match the schema, and int32 values must fit
/// - Attributes and blocks the schema doesn't know are rejected
/// - Nested blocks are validated recursively
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Like [`validate`], but returns `Err` with the diagnostics if there are any.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let empty = serde_json::Map::new();
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            let mut diag =
                Diagnostic::error("Expected object").with_detail(format!("Got {}", type_name(value)));
            if !path.is_empty() {
                diag = diag.with_attribute(path);
            }
            diagnostics.push(diag);
            return;
        }
    };

    for (name, attr) in &block.attributes {
        validate_attribute(attr, obj.get(name), &join_path(path, name), diagnostics);
    }

    for (name, nested) in &block.blocks {
        validate_nested_block(nested, obj.get(name), &join_path(path, name), diagnostics);
    }

    for key in obj.keys() {
        if !block.attributes.contains_key(key) && !block.blocks.contains_key(key) {
            let key_path = join_path(path, key);
            diagnostics.push(
                Diagnostic::error(format!("Unsupported argument '{}'", key_path))
                    .with_detail("An argument with this name is not expected here")
                    .with_attribute(key_path),
            );
        }
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error(format!("Invalid configuration for read-only attribute '{}'", path))
                    .with_detail("This value is set by the provider and cannot be configured")
                    .with_attribute(path),
            );
        }
        Some(v) => validate_attribute_type(attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let ok = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Int32 => match value.as_i64() {
            Some(n) if i32::try_from(n).is_ok() => true,
            Some(n) => {
                diagnostics.push(
                    Diagnostic::error(format!("Value out of range for '{}'", path))
                        .with_detail(format!("{} does not fit in a 32-bit integer", n))
                        .with_attribute(path),
                );
                return;
            }
            None => false,
        },
    };

    if !ok {
        diagnostics.push(
            Diagnostic::error(format!("Invalid type for '{}'", path))
                .with_detail(format!(
                    "Expected {}, got {}",
                    attr_type.name(),
                    type_name(value)
                ))
                .with_attribute(path),
        );
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required block '{}'", path))
                        .with_detail("This block is required")
                        .with_attribute(path),
                );
            }
        }
        Some(v) => validate_block(&nested.block, v, path, diagnostics),
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock};
    use serde_json::json;

    fn series_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("tvdb_id", Attribute::required_int32().requires_replace())
            .with_attribute("title", Attribute::optional_string().optional_computed())
            .with_attribute("path", Attribute::required_string())
            .with_block(
                "add_options",
                NestedBlock::optional(
                    Block::new().with_attribute("monitor", Attribute::optional_string()),
                ),
            )
    }

    #[test]
    fn test_valid_config() {
        let config = json!({
            "tvdb_id": 81189,
            "path": "/tv",
            "add_options": {"monitor": "all"}
        });
        assert!(validate(&series_schema(), &config).is_empty());
        assert!(validate_result(&series_schema(), &config).is_ok());
    }

    #[test]
    fn test_missing_required() {
        let diagnostics = validate(&series_schema(), &json!({"path": "/tv"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("tvdb_id"));
        assert!(diagnostics[0].summary.contains("Missing required"));
    }

    #[test]
    fn test_null_config_is_empty() {
        let diagnostics = validate(&series_schema(), &Value::Null);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_type_mismatch() {
        let diagnostics = validate(
            &series_schema(),
            &json!({"tvdb_id": "81189", "path": 3}),
        );
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .any(|d| d.detail.as_deref() == Some("Expected int32, got string")));
        assert!(diagnostics
            .iter()
            .any(|d| d.detail.as_deref() == Some("Expected string, got integer")));
    }

    #[test]
    fn test_int32_range() {
        let diagnostics = validate(
            &series_schema(),
            &json!({"tvdb_id": 4_000_000_000u64, "path": "/tv"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.starts_with("Value out of range"));

        let diagnostics = validate(&series_schema(), &json!({"tvdb_id": 1.5, "path": "/tv"}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_computed_only_cannot_be_set() {
        let diagnostics = validate(
            &series_schema(),
            &json!({"id": "12", "tvdb_id": 1, "path": "/tv"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("id"));
    }

    #[test]
    fn test_unknown_attributes_rejected() {
        let diagnostics = validate(
            &series_schema(),
            &json!({
                "tvdb_id": 1,
                "path": "/tv",
                "qualityProfile": 4,
                "add_options": {"monitor": "all", "search": true}
            }),
        );
        let attrs: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attrs.len(), 2);
        assert!(attrs.contains(&"qualityProfile"));
        assert!(attrs.contains(&"add_options.search"));
    }

    #[test]
    fn test_nested_block_must_be_object() {
        let diagnostics = validate(
            &series_schema(),
            &json!({"tvdb_id": 1, "path": "/tv", "add_options": "all"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("add_options"));
    }

    #[test]
    fn test_required_nested_block() {
        let schema = Schema::v0().with_block(
            "auth",
            NestedBlock::required(Block::new().with_attribute("key", Attribute::required_string())),
        );
        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("auth"));

        let diagnostics = validate(&schema, &json!({"auth": {}}));
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("auth.key"));
    }
}
