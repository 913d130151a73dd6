use nova_config::json_schema;

#[test]
fn json_schema_describes_every_section() {
    let schema = json_schema();
    let value = serde_json::to_value(schema).expect("schema serializes");

    for section in ["annotations", "analysis", "logging"] {
        assert!(
            value.pointer(&format!("/properties/{section}")).is_some(),
            "missing {section} section"
        );
    }
    assert!(value
        .pointer("/definitions/AnalysisConfig/properties/allow_value_vararg")
        .is_some());
}

#[test]
fn json_schema_requires_at_least_one_gate_annotation() {
    let schema = json_schema();
    let value = serde_json::to_value(schema).expect("schema serializes");

    let all_of = value
        .pointer("/allOf")
        .and_then(|v| v.as_array())
        .expect("root schema should include allOf semantic constraints");

    let min_items = all_of.iter().find_map(|entry| {
        entry
            .pointer("/then/properties/annotations/properties/gates/minItems")
            .and_then(|v| v.as_u64())
    });
    assert_eq!(min_items, Some(1));
}
