//! End-to-end validation over decoded and hand-built graphs

use serde_json::json;
use std::sync::Arc;
use tessera_format::UnknownElementPolicy;
use tessera_models::{
    ChoiceValue, ErrorKind, Node, Primitive, PrimitiveKind, ResourceTypeResolver, TypeDescriptor,
    TypeRef, VariantDescriptor,
};
use tessera_validator::{
    ContainedMode, IssueCode, IssueSeverity, Preset, PrimitivesMode, SharedResolver, Validator,
    ValidatorConfig,
};

mod test_support;
use test_support::summarize;

fn decode(validator: &Validator, type_name: &str, json: serde_json::Value) -> Node {
    validator
        .codec()
        .decode_type(json.to_string().as_bytes(), type_name)
        .unwrap()
}

fn valid_item() -> serde_json::Value {
    json!({
        "sequence": 1,
        "category": {"coding": [{"system": "http://example.org/cat", "code": "lab"}]},
        "site": [{"text": "left arm"}]
    })
}

#[test]
fn test_required_fields_present() {
    test_support::init_tracing();
    let validator = test_support::validator(Preset::Strict);

    let item = decode(&validator, "ClaimItem", valid_item());
    assert!(validator.validate(&item).is_ok());
}

#[test]
fn test_required_field_missing() {
    let validator = test_support::validator(Preset::Strict);
    let item = decode(
        &validator,
        "ClaimItem",
        json!({"sequence": 1, "site": [{"text": "left arm"}]}),
    );

    let errors = validator.validate(&item).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("category".to_string(), "required-field-missing")]
    );
}

#[test]
fn test_empty_list_below_minimum() {
    let validator = test_support::validator(Preset::Strict);
    let item = decode(
        &validator,
        "ClaimItem",
        json!({"sequence": 1, "category": {}, "site": []}),
    );

    let errors = validator.validate(&item).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "site");
    assert_eq!(
        errors[0].kind,
        ErrorKind::MinCardinalityViolation {
            required_min: 1,
            actual: 0
        }
    );
}

#[test]
fn test_list_above_maximum() {
    let validator = test_support::validator(Preset::Strict);
    let item = decode(
        &validator,
        "ClaimItem",
        json!({
            "sequence": 1,
            "category": {},
            "site": [{"text": "a"}, {"text": "b"}, {"text": "c"}, {"text": "d"}]
        }),
    );

    let errors = validator.validate(&item).unwrap_err();
    assert_eq!(
        errors[0].kind,
        ErrorKind::MaxCardinalityViolation {
            allowed_max: 3,
            actual: 4
        }
    );
}

#[test]
fn test_discriminator_mismatch() {
    let validator = test_support::validator(Preset::Strict);
    let binary = decode(
        &validator,
        "Binary",
        json!({"resourceType": "Bundle", "contentType": "text/plain"}),
    );

    let errors = validator.validate(&binary).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "resourceType");
    assert_eq!(
        errors[0].kind,
        ErrorKind::DiscriminatorMismatch {
            expected: "Binary".to_string(),
            actual: "Bundle".to_string()
        }
    );
}

#[test]
fn test_every_defect_is_reported() {
    let validator = test_support::validator(Preset::Strict);
    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "item": [
                {"site": [{"text": "a"}]},
                {"sequence": 2, "category": {}, "site": []}
            ]
        }),
    );

    let errors = validator.validate(&claim).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![
            ("status".to_string(), "required-field-missing"),
            ("item[0].sequence".to_string(), "required-field-missing"),
            ("item[0].category".to_string(), "required-field-missing"),
            ("item[1].site".to_string(), "min-cardinality"),
        ]
    );
}

#[test]
fn test_missing_required_choice() {
    let validator = test_support::validator(Preset::Strict);
    let answer = decode(&validator, "Answer", json!({}));

    let errors = validator.validate(&answer).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("value[x]".to_string(), "missing-choice")]
    );
}

#[test]
fn test_choice_payload_is_walked() {
    let validator = test_support::validator(Preset::Strict);
    let period = Node::new("Period").with_primitive("start", Primitive::new("2024-13-01"));
    let descriptor = validator
        .schemas()
        .require("Observation")
        .unwrap()
        .field("value")
        .and_then(|f| f.choice_descriptor())
        .cloned()
        .unwrap();

    let observation = Node::resource("Observation")
        .with_primitive("status", Primitive::new("final"))
        .with_choice(ChoiceValue::new(&descriptor, "Period", period).unwrap());

    let errors = validator.validate(&observation).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("valuePeriod.start".to_string(), "malformed-primitive")]
    );

    let relaxed = test_support::validator_with(
        ValidatorConfig::builder()
            .primitives_mode(PrimitivesMode::Off)
            .build(),
    );
    assert!(relaxed.validate(&observation).is_ok());
}

#[test]
fn test_hand_built_graph_structure() {
    let validator = test_support::validator(Preset::Strict);
    let foreign = Arc::new(
        VariantDescriptor::from_kinds("serviced", [TypeRef::Primitive(PrimitiveKind::String)])
            .unwrap(),
    );

    let item = Node::new("ClaimItem")
        .with_primitive("sequence", Primitive::new(1_i64))
        .with_node("category", Node::new("CodeableConcept"))
        .with_list("site", [Node::new("CodeableConcept")])
        .with_choice(ChoiceValue::new(&foreign, "String", Primitive::new("today")).unwrap())
        .with_primitive("colour", Primitive::new("red"));

    let errors = validator.validate(&item).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![
            ("colour".to_string(), "unknown-element"),
            ("servicedString".to_string(), "unknown-variant-tag"),
        ]
    );
}

#[test]
fn test_single_value_in_list_field() {
    let validator = test_support::validator(Preset::Strict);
    let item = Node::new("ClaimItem")
        .with_primitive("sequence", Primitive::new(1_i64))
        .with_node("category", Node::new("CodeableConcept"))
        .with_node("site", Node::new("CodeableConcept"));

    let outcome = validator.validate_outcome(&item);
    assert!(!outcome.valid);
    assert_eq!(outcome.issues[0].error.path, "site");
    assert_eq!(outcome.issues[0].code(), IssueCode::Structure);
}

#[test]
fn test_primitive_extensions_are_walked() {
    let validator = test_support::validator(Preset::Strict);
    let status = Primitive::new("active").with_extension(Node::new("Extension"));
    let claim = Node::resource("Claim").with_primitive("status", status);

    let errors = validator.validate(&claim).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("status.extension[0].url".to_string(), "required-field-missing")]
    );
}

#[test]
fn test_depth_limit() {
    let decoding = test_support::validator(Preset::Strict);
    let claim = decode(
        &decoding,
        "Claim",
        json!({
            "resourceType": "Claim",
            "status": "active",
            "item": [{
                "sequence": 1,
                "category": {"coding": [{"code": "lab"}]},
                "site": [{"text": "a"}]
            }]
        }),
    );
    assert!(decoding.validate(&claim).is_ok());

    let shallow = test_support::validator_with(ValidatorConfig::builder().max_depth(2).build());
    let errors = shallow.validate(&claim).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("item[0].category.coding[0]".to_string(), "depth-limit")]
    );
}

#[test]
fn test_contained_resources_stay_opaque_by_default() {
    let validator = test_support::validator(Preset::Strict)
        .with_resolver(test_support::schemas() as SharedResolver);
    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "contained": [{"resourceType": "Binary"}],
            "status": "active"
        }),
    );

    assert!(validator.validate(&claim).is_ok());
}

#[test]
fn test_contained_resources_resolved() {
    let validator = test_support::validator(Preset::Thorough)
        .with_resolver(test_support::schemas() as SharedResolver);
    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "contained": [
                {"resourceType": "Binary", "contentType": "text/plain"},
                {"resourceType": "Binary"},
                {"resourceType": "Device", "name": "scanner"}
            ],
            "status": "active"
        }),
    );

    let errors = validator.validate(&claim).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("contained[1].contentType".to_string(), "required-field-missing")]
    );
}

#[test]
fn test_contained_decode_failure_is_prefixed() {
    let schemas = test_support::schemas();
    let lookup = Arc::clone(&schemas);
    let resolver: SharedResolver =
        Arc::new(move |name: &str| lookup.resolve_resource_type(name));
    let validator = test_support::validator(Preset::Thorough).with_resolver(resolver);

    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "contained": [{"resourceType": "Binary", "contentType": "text/plain", "size": 3}],
            "status": "active"
        }),
    );

    let errors = validator.validate(&claim).unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("contained[0].size".to_string(), "unknown-element")]
    );
}

#[test]
fn test_contained_without_resolver() {
    let validator = test_support::validator(Preset::Thorough);
    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "contained": [{"resourceType": "Binary"}],
            "status": "active"
        }),
    );

    assert!(validator.validate(&claim).is_ok());
}

#[test]
fn test_validate_json() {
    let validator = test_support::validator(Preset::Strict);

    let node = validator
        .validate_json(
            br#"{"resourceType":"Binary","contentType":"text/plain"}"#,
            "Binary",
        )
        .unwrap();
    assert_eq!(node.resource_type(), Some("Binary"));

    let errors = validator
        .validate_json(br#"{"resourceType":"Binary"}"#, "Binary")
        .unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("contentType".to_string(), "required-field-missing")]
    );

    let errors = validator
        .validate_json(br#"{"resourceType":"Binary","#, "Binary")
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::DecodeError);

    let errors = validator.validate_json(b"{}", "Device").unwrap_err();
    assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_validate_json_unknown_elements() {
    let document = br#"{"resourceType":"Binary","contentType":"text/plain","size":3}"#;

    let strict = test_support::validator(Preset::Strict);
    let errors = strict.validate_json(document, "Binary").unwrap_err();
    assert_eq!(
        summarize(&errors),
        vec![("size".to_string(), "unknown-element")]
    );

    let lenient = test_support::validator(Preset::Lenient);
    let (node, outcome) = lenient.validate_json_outcome(document, "Binary");
    assert!(node.is_some());
    assert!(outcome.valid);
    assert_eq!(outcome.warning_count(), 1);
    assert_eq!(outcome.issues[0].severity, IssueSeverity::Warning);
    assert_eq!(outcome.issues[0].error.path, "size");
}

#[test]
fn test_fail_fast() {
    let validator = test_support::validator_with(ValidatorConfig::builder().fail_fast(true).build());
    let claim = decode(
        &validator,
        "Claim",
        json!({"resourceType": "Claim", "item": [{"site": []}]}),
    );

    let outcome = validator.validate_outcome(&claim);
    assert_eq!(outcome.error_count(), 1);
    assert!(outcome.truncated);
    assert_eq!(outcome.issues[0].error.path, "status");
}

#[test]
fn test_max_issues() {
    let validator = test_support::validator_with(ValidatorConfig::builder().max_issues(2).build());
    let claim = decode(
        &validator,
        "Claim",
        json!({"resourceType": "Claim", "item": [{"site": []}, {}]}),
    );

    let outcome = validator.validate_outcome(&claim);
    assert_eq!(outcome.error_count(), 2);
    assert!(outcome.truncated);
}

#[test]
fn test_max_issues_reached_exactly_is_not_truncated() {
    let validator = test_support::validator_with(ValidatorConfig::builder().max_issues(1).build());
    let claim = decode(
        &validator,
        "Claim",
        json!({
            "resourceType": "Claim",
            "item": [{"sequence": 1, "category": {}, "site": [{"text": "a"}]}]
        }),
    );

    let outcome = validator.validate_outcome(&claim);
    assert_eq!(outcome.error_count(), 1);
    assert!(!outcome.truncated);
}

#[test]
fn test_max_issues_bounds_decode_warnings() {
    let validator = test_support::validator_with(
        ValidatorConfig::builder()
            .unknown_elements(UnknownElementPolicy::Warn)
            .max_issues(1)
            .build(),
    );

    let (node, outcome) = validator.validate_json_outcome(
        br#"{"resourceType":"Binary","contentType":"text/plain","a":1,"b":2,"c":3}"#,
        "Binary",
    );
    assert!(node.is_some());
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].severity, IssueSeverity::Warning);
    assert_eq!(outcome.issues[0].error.path, "a");
    assert!(outcome.truncated);
    assert!(outcome.valid);
}

#[test]
fn test_config_from_yaml() {
    let config = ValidatorConfig::from_yaml(
        r#"
exec:
  max_depth: 16
decoding:
  unknown_elements: Warn
contained:
  mode: Resolve
"#,
    )
    .unwrap();
    assert_eq!(config.contained.mode, ContainedMode::Resolve);
    assert_eq!(config.decoding.unknown_elements, UnknownElementPolicy::Warn);

    let validator = test_support::validator_with(config);
    assert_eq!(validator.plan().max_depth, 16);
    assert!(validator.plan().contained.resolve);
    assert!(!validator.codec().options().is_strict());
}

#[test]
fn test_operation_outcome() {
    let validator = test_support::validator(Preset::Strict);
    let outcome = validator.validate_outcome(&Node::resource("Binary"));

    let op = outcome.to_operation_outcome();
    assert_eq!(op["issue"][0]["code"], "required");
    assert_eq!(op["issue"][0]["expression"][0], "contentType");
}

#[test]
fn test_unregistered_root_type() {
    let validator = test_support::validator(Preset::Strict);
    let errors = validator.validate(&Node::new("Device")).unwrap_err();
    assert_eq!(summarize(&errors), vec![(String::new(), "type-mismatch")]);
}

#[test]
fn test_batch_and_shared_use() {
    let validator = Arc::new(test_support::validator(Preset::Strict));
    let good = decode(&validator, "ClaimItem", valid_item());
    let bad = Node::new("ClaimItem");

    let outcomes = validator.validate_batch(&[good.clone(), bad]);
    assert!(outcomes[0].valid);
    assert_eq!(outcomes[1].error_count(), 3);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let validator = Arc::clone(&validator);
            let good = &good;
            scope.spawn(move || assert!(validator.validate(good).is_ok()));
        }
    });
}

#[test]
fn test_resolver_only_knows_resources() {
    let schemas = test_support::schemas();
    let found: Option<Arc<TypeDescriptor>> = schemas.resolve_resource_type("Binary");
    assert!(found.is_some());
    assert!(schemas.resolve_resource_type("Period").is_none());
}
