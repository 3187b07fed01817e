//! JSON wire codec for structured nodes.
//!
//! The mapping follows the FHIR JSON conventions:
//! - Choice fields occupy one key, `{field}{Tag}` (`valueBoolean`, `valueQuantity`).
//! - Primitive metadata (`id`, `extension`) travels in a `_field` entry next to the value.
//! - Repeated primitives use aligned `field` / `_field` arrays with `null` placeholders.
//! - Embedded resources are captured verbatim and resolved only on request.
//!
//! ```
//! use std::sync::Arc;
//! use tessera_format::Codec;
//! use tessera_models::{FieldDescriptor, PrimitiveKind, SchemaSet, TypeDescriptor};
//!
//! let mut schemas = SchemaSet::new();
//! let binary = schemas
//!     .register(
//!         TypeDescriptor::resource("Binary")
//!             .field(FieldDescriptor::primitive("contentType", PrimitiveKind::Code).required())
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let codec = Codec::new(Arc::new(schemas));
//! let node = codec
//!     .decode(br#"{"contentType":"text/plain","resourceType":"Binary"}"#, &binary)
//!     .unwrap();
//! assert_eq!(
//!     codec.encode(&node).unwrap(),
//!     br#"{"resourceType":"Binary","contentType":"text/plain"}"#
//! );
//! ```

mod choice;
mod decode;
mod encode;
pub mod error;
pub mod options;

pub use choice::Presence;
pub use error::{DecodeError, EncodeError};
pub use options::{DecodeOptions, UnknownElementPolicy, DEFAULT_MAX_DEPTH};

use decode::Decoder;
use encode::Encoder;
use serde_json::{Map, Value};
use std::sync::Arc;
use tessera_models::{
    ChoiceValue, ElementPath, Node, OpaqueResource, PathedError, ResourceTypeResolver, SchemaSet,
    TypeDescriptor, VariantDescriptor,
};
use tracing::debug;

/// Result of a decode pass that may have skipped unknown keys
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub node: Node,
    /// Keys skipped in lenient mode; always empty in strict mode
    pub warnings: Vec<PathedError>,
}

/// Converts between JSON and node graphs for the types in a `SchemaSet`.
///
/// Decoding checks wire structure and primitive lexical forms only. Required fields,
/// discriminators and cardinalities are left to the validator so that every such defect is
/// reported in one pass.
#[derive(Debug, Clone)]
pub struct Codec {
    schemas: Arc<SchemaSet>,
    options: DecodeOptions,
}

impl Codec {
    pub fn new(schemas: Arc<SchemaSet>) -> Self {
        Self {
            schemas,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schemas(&self) -> &Arc<SchemaSet> {
        &self.schemas
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a document of type `schema`.
    pub fn decode(&self, bytes: &[u8], schema: &TypeDescriptor) -> Result<Node, DecodeError> {
        Ok(self.decode_with_warnings(bytes, schema)?.node)
    }

    /// Decode a document of the registered type `type_name`.
    pub fn decode_type(&self, bytes: &[u8], type_name: &str) -> Result<Node, DecodeError> {
        let schema = self
            .schemas
            .get(type_name)
            .cloned()
            .ok_or_else(|| DecodeError::UnknownType(type_name.to_string()))?;
        self.decode(bytes, &schema)
    }

    pub fn decode_with_warnings(
        &self,
        bytes: &[u8],
        schema: &TypeDescriptor,
    ) -> Result<Decoded, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        self.decode_value(&value, schema)
    }

    /// Decode an already parsed JSON value.
    pub fn decode_value(
        &self,
        value: &Value,
        schema: &TypeDescriptor,
    ) -> Result<Decoded, DecodeError> {
        debug!(type_name = schema.name(), "decoding document");
        let mut decoder = Decoder::new(&self.schemas, &self.options);
        let node = decoder.decode_node(value, schema, &ElementPath::root(), 0)?;
        let warnings = decoder.into_warnings();
        debug!(
            type_name = schema.name(),
            warnings = warnings.len(),
            "decoded document"
        );
        Ok(Decoded { node, warnings })
    }

    /// Decode the variant of `descriptor` carried by `object`.
    ///
    /// Only keys with the descriptor's field-name prefix are considered; errors are reported
    /// relative to `object`.
    pub fn decode_choice(
        &self,
        object: &Map<String, Value>,
        descriptor: &Arc<VariantDescriptor>,
        presence: Presence,
    ) -> Result<Option<ChoiceValue>, DecodeError> {
        let mut decoder = Decoder::new(&self.schemas, &self.options);
        choice::decode_standalone(&mut decoder, object, descriptor, presence)
    }

    pub fn encode(&self, node: &Node) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(&self.encode_value(node)?)?)
    }

    pub fn encode_pretty(&self, node: &Node) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec_pretty(&self.encode_value(node)?)?)
    }

    pub fn encode_value(&self, node: &Node) -> Result<Value, EncodeError> {
        debug!(type_name = node.type_name(), "encoding document");
        let encoded = Encoder::new(&self.schemas).encode_node(node, &ElementPath::root())?;
        Ok(Value::Object(encoded))
    }

    /// Encode a choice on its own as a one-key object (two with primitive metadata).
    pub fn encode_choice(&self, value: &ChoiceValue) -> Result<Map<String, Value>, EncodeError> {
        let mut out = Map::new();
        choice::encode_into(
            &Encoder::new(&self.schemas),
            value,
            value.descriptor(),
            &ElementPath::root(),
            &mut out,
        )?;
        Ok(out)
    }

    /// Capture an embedded resource without interpreting it.
    pub fn capture(&self, bytes: &[u8]) -> Result<OpaqueResource, DecodeError> {
        match serde_json::from_slice(bytes)? {
            Value::Object(fragment) => Ok(OpaqueResource::capture(fragment)),
            _ => Err(PathedError::type_mismatch(
                &ElementPath::root(),
                "an embedded resource must be a JSON object",
            )
            .into()),
        }
    }

    pub fn reemit(&self, slot: &OpaqueResource) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(slot.as_map())?)
    }

    /// Decode an opaque slot against the type named by its `resourceType`.
    ///
    /// Returns `Ok(None)` when the slot has no discriminator or the resolver does not know
    /// it. The slot itself is left untouched.
    pub fn resolve_resource(
        &self,
        slot: &OpaqueResource,
        resolver: &dyn ResourceTypeResolver,
    ) -> Result<Option<Node>, DecodeError> {
        let Some(discriminator) = slot.discriminator() else {
            debug!("embedded resource has no discriminator");
            return Ok(None);
        };
        let Some(schema) = resolver.resolve_resource_type(discriminator) else {
            debug!(discriminator, "no schema for embedded resource");
            return Ok(None);
        };
        Ok(Some(self.decode_fragment(slot, &schema)?.node))
    }

    /// Decode an opaque slot against a schema the caller has already picked.
    pub fn decode_fragment(
        &self,
        slot: &OpaqueResource,
        schema: &TypeDescriptor,
    ) -> Result<Decoded, DecodeError> {
        let mut decoder = Decoder::new(&self.schemas, &self.options);
        let node = decoder.decode_object(slot.as_map(), schema, &ElementPath::root(), 0)?;
        Ok(Decoded {
            node,
            warnings: decoder.into_warnings(),
        })
    }
}
