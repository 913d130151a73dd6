use schemars::schema::{RootSchema, Schema};
use schemars::schema_for;
use serde_json::json;

use crate::CompatConfig;

/// JSON schema for `nova-compat.toml`.
///
/// This schema is intended for editor tooling (TOML JSON schema integration) and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(CompatConfig);
    apply_semantic_constraints(&mut schema);
    schema
}

fn apply_semantic_constraints(schema: &mut RootSchema) {
    // JSON Schema does not apply defaults during validation, so these constraints only trigger
    // when the relevant keys are explicitly set.
    push_all_of(
        schema,
        schema_from_json(json!({
            "if": {
                "required": ["annotations"],
                "properties": {
                    "annotations": { "required": ["gates"] }
                }
            },
            "then": {
                "properties": {
                    "annotations": {
                        "properties": {
                            "gates": {
                                "type": "array",
                                "minItems": 1,
                                "uniqueItems": true,
                                "items": { "type": "string", "minLength": 1 }
                            }
                        }
                    }
                }
            }
        })),
    );

    push_all_of(
        schema,
        schema_from_json(json!({
            "properties": {
                "annotations": {
                    "properties": {
                        "compat": { "type": "string", "minLength": 1 }
                    }
                }
            }
        })),
    );
}

fn push_all_of(root: &mut RootSchema, schema: Schema) {
    let subschemas = root.schema.subschemas();
    subschemas.all_of.get_or_insert_with(Vec::new).push(schema);
}

fn schema_from_json(value: serde_json::Value) -> Schema {
    serde_json::from_value(value).expect("valid json schema")
}
