//! Choice values and structured nodes for FHIR-style data models
//!
//! This crate provides the in-memory graph shared by the codec (`tessera-format`) and the
//! validation engine (`tessera-validator`), plus the schema metadata both are driven by.
//!
//! # Module Organization
//!
//! - `primitive`: primitive value cells and the primitive kinds with their lexical rules
//! - `schema`: type, field and variant descriptors
//! - `registry`: the `SchemaSet` registry and the opaque-resource resolution hook
//! - `choice`: `ChoiceValue`, a tagged one-of-N payload
//! - `node`: `Node`, `FieldSlot` and `Element`
//! - `opaque`: `OpaqueResource`, an embedded resource kept uninterpreted
//! - `issue` / `path`: path-qualified defects
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_models::{
//!     ChoiceValue, FieldDescriptor, Node, Primitive, PrimitiveKind, TypeDescriptor, TypeRef,
//!     VariantDescriptor,
//! };
//!
//! let value = Arc::new(
//!     VariantDescriptor::from_kinds(
//!         "value",
//!         [
//!             TypeRef::Primitive(PrimitiveKind::Boolean),
//!             TypeRef::Primitive(PrimitiveKind::String),
//!         ],
//!     )
//!     .unwrap(),
//! );
//!
//! let schema = TypeDescriptor::complex("Answer")
//!     .field(FieldDescriptor::choice(Arc::clone(&value)).required())
//!     .build()
//!     .unwrap();
//! assert!(schema.field("value").is_some());
//!
//! let answer = Node::new("Answer")
//!     .with_choice(ChoiceValue::new(&value, "Boolean", Primitive::new(true)).unwrap());
//! assert_eq!(answer.choice("value").unwrap().wire_key(), "valueBoolean");
//! ```

pub mod choice;
pub mod error;
pub mod issue;
pub mod node;
pub mod opaque;
pub mod path;
pub mod primitive;
pub mod registry;
pub mod schema;

// Re-export commonly used types
pub use choice::ChoiceValue;
pub use error::{Error, Result};
pub use issue::{ErrorKind, PathedError};
pub use node::{Element, FieldSlot, Node};
pub use opaque::OpaqueResource;
pub use path::ElementPath;
pub use primitive::{Primitive, PrimitiveKind, Scalar, ScalarType};
pub use registry::{extension_type, ResourceTypeResolver, SchemaSet, EXTENSION_TYPE};
pub use schema::{
    Cardinality, FieldDescriptor, FieldShape, KeyMatch, TypeBuilder, TypeDescriptor, TypeKind,
    TypeRef, Variant, VariantDescriptor, RESOURCE_TYPE_FIELD,
};
