//! Sample schemas and validator builders shared by the validation tests

#![allow(dead_code)]

use std::sync::{Arc, Once};
use tessera_models::{
    FieldDescriptor, PathedError, PrimitiveKind, SchemaSet, TypeDescriptor, TypeRef,
    VariantDescriptor,
};
use tessera_validator::{Preset, Validator, ValidatorConfig};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn schemas() -> Arc<SchemaSet> {
    let mut set = SchemaSet::new();

    set.register(
        TypeDescriptor::complex("Coding")
            .field(FieldDescriptor::primitive("system", PrimitiveKind::Uri))
            .field(FieldDescriptor::primitive("code", PrimitiveKind::Code))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::complex("CodeableConcept")
            .field(FieldDescriptor::complex("coding", "Coding").repeated())
            .field(FieldDescriptor::primitive("text", PrimitiveKind::String))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::complex("Period")
            .field(FieldDescriptor::primitive("start", PrimitiveKind::DateTime))
            .field(FieldDescriptor::primitive("end", PrimitiveKind::DateTime))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::complex("ClaimItem")
            .field(FieldDescriptor::primitive("sequence", PrimitiveKind::PositiveInt).required())
            .field(FieldDescriptor::complex("category", "CodeableConcept").required())
            .field(FieldDescriptor::choice(
                VariantDescriptor::from_kinds(
                    "serviced",
                    [
                        TypeRef::Primitive(PrimitiveKind::Date),
                        TypeRef::complex("Period"),
                    ],
                )
                .unwrap(),
            ))
            .field(
                FieldDescriptor::complex("site", "CodeableConcept")
                    .repeated()
                    .min(1)
                    .max(3),
            )
            .field(FieldDescriptor::primitive("note", PrimitiveKind::String).repeated())
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::complex("Answer")
            .field(
                FieldDescriptor::choice(
                    VariantDescriptor::from_kinds(
                        "value",
                        [
                            TypeRef::Primitive(PrimitiveKind::Boolean),
                            TypeRef::Primitive(PrimitiveKind::String),
                        ],
                    )
                    .unwrap(),
                )
                .required(),
            )
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::resource("Claim")
            .field(FieldDescriptor::primitive("id", PrimitiveKind::Id))
            .field(FieldDescriptor::resource("contained").repeated())
            .field(FieldDescriptor::primitive("status", PrimitiveKind::Code).required())
            .field(FieldDescriptor::complex("item", "ClaimItem").repeated())
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::resource("Observation")
            .field(FieldDescriptor::primitive("status", PrimitiveKind::Code).required())
            .field(FieldDescriptor::choice(
                VariantDescriptor::from_kinds(
                    "value",
                    [
                        TypeRef::complex("CodeableConcept"),
                        TypeRef::Primitive(PrimitiveKind::String),
                        TypeRef::Primitive(PrimitiveKind::Boolean),
                        TypeRef::complex("Period"),
                    ],
                )
                .unwrap(),
            ))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::resource("Binary")
            .field(FieldDescriptor::primitive("contentType", PrimitiveKind::Code).required())
            .field(FieldDescriptor::primitive("data", PrimitiveKind::Base64Binary))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.check_references().unwrap();
    Arc::new(set)
}

pub fn validator(preset: Preset) -> Validator {
    Validator::from_config(&ValidatorConfig::preset(preset), schemas()).unwrap()
}

pub fn validator_with(config: ValidatorConfig) -> Validator {
    Validator::from_config(&config, schemas()).unwrap()
}

/// `(path, kind code)` pairs, for compact assertions
pub fn summarize(errors: &[PathedError]) -> Vec<(String, &'static str)> {
    errors
        .iter()
        .map(|e| (e.path.clone(), e.kind.code()))
        .collect()
}
