//! Error types for schema authoring and programmatic construction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate variant tag '{tag}' in {field}[x]")]
    DuplicateVariantTag { field: String, tag: String },

    #[error("Empty variant set for {0}[x]")]
    EmptyVariantSet(String),

    #[error("Duplicate field '{field}' in type {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),

    #[error("Choice field {type_name}.{field}[x] cannot repeat")]
    RepeatedChoice { type_name: String, field: String },

    #[error("Fixed value on {type_name}.{field} requires a single string-like primitive")]
    InvalidFixedField { type_name: String, field: String },

    #[error("Type {type_name} references unknown type {missing}")]
    UnknownTypeReference { type_name: String, missing: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown variant tag '{tag}' for {field}[x]")]
    UnknownVariantTag { field: String, tag: String },

    #[error("Variant '{tag}' of {field}[x] does not accept this payload: {reason}")]
    VariantPayloadMismatch {
        field: String,
        tag: String,
        reason: String,
    },

    #[error("Opaque resource content must be a JSON object")]
    OpaqueNotObject,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
