//! Shared sample schemas for codec tests

#![allow(dead_code)]

use std::sync::{Arc, Once};
use tessera_format::{Codec, DecodeOptions};
use tessera_models::{
    FieldDescriptor, PrimitiveKind, SchemaSet, TypeDescriptor, TypeRef, VariantDescriptor,
};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (shown with `--nocapture`)
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
            .field(FieldDescriptor::primitive("display", PrimitiveKind::String))
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
        TypeDescriptor::complex("Quantity")
            .field(FieldDescriptor::primitive("value", PrimitiveKind::Decimal))
            .field(FieldDescriptor::primitive("unit", PrimitiveKind::String))
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
                    .min(1),
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
            .field(FieldDescriptor::primitive("total", PrimitiveKind::Integer64))
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
                        TypeRef::complex("Quantity"),
                        TypeRef::complex("CodeableConcept"),
                        TypeRef::Primitive(PrimitiveKind::String),
                        TypeRef::Primitive(PrimitiveKind::Boolean),
                        TypeRef::Primitive(PrimitiveKind::Integer),
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

    set.register(
        TypeDescriptor::complex("BundleEntry")
            .field(FieldDescriptor::primitive("fullUrl", PrimitiveKind::Uri))
            .field(FieldDescriptor::resource("resource"))
            .build()
            .unwrap(),
    )
    .unwrap();

    set.register(
        TypeDescriptor::resource("Bundle")
            .field(FieldDescriptor::primitive("type", PrimitiveKind::Code).required())
            .field(FieldDescriptor::complex("entry", "BundleEntry").repeated())
            .build()
            .unwrap(),
    )
    .unwrap();

    set.check_references().unwrap();
    Arc::new(set)
}

pub fn codec() -> Codec {
    Codec::new(schemas())
}

pub fn lenient_codec() -> Codec {
    Codec::new(schemas()).with_options(DecodeOptions::lenient())
}

pub fn schema(codec: &Codec, name: &str) -> Arc<TypeDescriptor> {
    Arc::clone(codec.schemas().require(name).unwrap())
}

/// Decode `json` as `type_name` and encode it back compactly
pub fn round_trip(codec: &Codec, type_name: &str, json: &str) -> String {
    let node = codec.decode_type(json.as_bytes(), type_name).unwrap();
    String::from_utf8(codec.encode(&node).unwrap()).unwrap()
}
