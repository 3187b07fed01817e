//! Wire → node graph

use crate::choice::{self, Presence};
use crate::error::DecodeError;
use crate::options::{DecodeOptions, UnknownElementPolicy};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_models::primitive::json_type_name;
use tessera_models::{
    Element, ElementPath, ErrorKind, FieldDescriptor, FieldShape, FieldSlot, KeyMatch, Node,
    OpaqueResource, PathedError, Primitive, PrimitiveKind, SchemaSet, TypeDescriptor, TypeRef,
    EXTENSION_TYPE,
};
use tracing::{trace, warn};

/// One decode pass. Collects lenient-mode warnings; the first hard error ends the pass.
pub(crate) struct Decoder<'a> {
    schemas: &'a SchemaSet,
    options: &'a DecodeOptions,
    warnings: Vec<PathedError>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(schemas: &'a SchemaSet, options: &'a DecodeOptions) -> Self {
        Self {
            schemas,
            options,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn into_warnings(self) -> Vec<PathedError> {
        self.warnings
    }

    /// Report a key the schema has no place for
    pub(crate) fn unknown(&mut self, error: PathedError) -> Result<(), DecodeError> {
        match self.options.unknown_elements {
            UnknownElementPolicy::Reject => Err(error.into()),
            UnknownElementPolicy::Warn => {
                warn!(path = %error.path, kind = %error.kind, "{}", error.detail);
                self.warnings.push(error);
                Ok(())
            }
        }
    }

    fn schema(&self, name: &str) -> Result<Arc<TypeDescriptor>, DecodeError> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| DecodeError::UnknownType(name.to_string()))
    }

    pub(crate) fn decode_node(
        &mut self,
        value: &Value,
        schema: &TypeDescriptor,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Node, DecodeError> {
        match value {
            Value::Object(object) => self.decode_object(object, schema, path, depth),
            other => Err(PathedError::type_mismatch(
                path,
                format!(
                    "expected an object for {}, found {}",
                    schema.name(),
                    json_type_name(other)
                ),
            )
            .into()),
        }
    }

    pub(crate) fn decode_object(
        &mut self,
        object: &Map<String, Value>,
        schema: &TypeDescriptor,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Node, DecodeError> {
        if depth > self.options.max_depth {
            return Err(PathedError::depth_exceeded(path, self.options.max_depth).into());
        }
        trace!(type_name = schema.name(), path = %path, "decoding node");

        let keys = KeyPartition::new(object, schema);
        let mut node = Node::new(schema.name());

        for field in schema.fields() {
            let slot = match &field.shape {
                FieldShape::Single(kind) => {
                    self.decode_field(object, field, kind, &path.field(&field.name), depth)?
                }
                FieldShape::Choice(descriptor) => {
                    let owned = keys.choice_keys(descriptor.field_name());
                    choice::decode_from_keys(
                        self,
                        object,
                        descriptor,
                        owned,
                        Presence::Optional,
                        path,
                        depth,
                    )?
                    .map(FieldSlot::Choice)
                }
            };
            if let Some(slot) = slot {
                node.set(field.name.clone(), slot);
            }
        }

        for key in keys.unclaimed {
            self.unknown(PathedError::new(
                ErrorKind::UnknownElement,
                &path.field(key),
                format!("'{}' is not a field of {}", key, schema.name()),
            ))?;
        }

        Ok(node)
    }

    fn decode_field(
        &mut self,
        object: &Map<String, Value>,
        field: &FieldDescriptor,
        kind: &TypeRef,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Option<FieldSlot>, DecodeError> {
        let value = object.get(&field.name);
        let meta = match kind {
            TypeRef::Primitive(_) => object.get(&format!("_{}", field.name)),
            _ => None,
        };

        if field.is_repeated() {
            self.decode_list(kind, value, meta, path, depth)
        } else {
            Ok(self
                .decode_single(kind, value, meta, path, depth)?
                .map(FieldSlot::Single))
        }
    }

    /// Decode one element; `None` when neither key is present.
    pub(crate) fn decode_single(
        &mut self,
        kind: &TypeRef,
        value: Option<&Value>,
        meta: Option<&Value>,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Option<Element>, DecodeError> {
        if matches!(value, Some(Value::Null)) || matches!(meta, Some(Value::Null)) {
            return Err(null_value(path));
        }

        match kind {
            TypeRef::Primitive(primitive) => {
                if value.is_none() && meta.is_none() {
                    return Ok(None);
                }
                let cell = self.decode_primitive(*primitive, value, meta, path, depth)?;
                Ok(Some(Element::Primitive(cell)))
            }
            TypeRef::Complex(type_name) => match value {
                None => Ok(None),
                Some(value) => {
                    let schema = self.schema(type_name)?;
                    let node = self.decode_node(value, &schema, path, depth + 1)?;
                    Ok(Some(Element::Node(node)))
                }
            },
            TypeRef::Resource => match value {
                None => Ok(None),
                Some(Value::Object(fragment)) => Ok(Some(Element::Resource(
                    OpaqueResource::capture(fragment.clone()),
                ))),
                Some(other) => Err(PathedError::type_mismatch(
                    path,
                    format!(
                        "expected an embedded resource object, found {}",
                        json_type_name(other)
                    ),
                )
                .into()),
            },
        }
    }

    fn decode_list(
        &mut self,
        kind: &TypeRef,
        value: Option<&Value>,
        meta: Option<&Value>,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Option<FieldSlot>, DecodeError> {
        let values = as_array(value, path)?;
        let metas = as_array(meta, path)?;

        let len = match (values, metas) {
            (None, None) => return Ok(None),
            (Some(v), Some(m)) if v.len() != m.len() => {
                return Err(PathedError::new(
                    ErrorKind::DecodeError,
                    path,
                    format!(
                        "value and metadata arrays differ in length ({} vs {})",
                        v.len(),
                        m.len()
                    ),
                )
                .into())
            }
            (Some(v), _) => v.len(),
            (None, Some(m)) => m.len(),
        };

        let mut items = Vec::with_capacity(len);
        for index in 0..len {
            let item_path = path.index(index);
            let item_value = values.and_then(|v| v.get(index)).filter(|v| !v.is_null());
            let item_meta = metas.and_then(|m| m.get(index)).filter(|m| !m.is_null());

            if item_value.is_none() && item_meta.is_none() {
                return Err(null_value(&item_path));
            }
            if let Some(element) =
                self.decode_single(kind, item_value, item_meta, &item_path, depth)?
            {
                items.push(element);
            }
        }

        Ok(Some(FieldSlot::List(items)))
    }

    fn decode_primitive(
        &mut self,
        kind: PrimitiveKind,
        value: Option<&Value>,
        meta: Option<&Value>,
        path: &ElementPath,
        depth: usize,
    ) -> Result<Primitive, DecodeError> {
        let mut cell = Primitive::empty();

        match value {
            None => {}
            Some(v @ (Value::Array(_) | Value::Object(_))) => {
                return Err(PathedError::type_mismatch(
                    path,
                    format!("expected a {} value, found {}", kind, json_type_name(v)),
                )
                .into())
            }
            Some(v) => {
                let scalar = kind
                    .from_json(v)
                    .map_err(|reason| PathedError::malformed_primitive(path, reason))?;
                cell.value = Some(scalar);
            }
        }

        if let Some(meta) = meta {
            self.decode_metadata(&mut cell, meta, path, depth)?;
        }
        Ok(cell)
    }

    /// Decode the `_name` side channel into `cell`
    fn decode_metadata(
        &mut self,
        cell: &mut Primitive,
        meta: &Value,
        path: &ElementPath,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let Value::Object(meta) = meta else {
            return Err(PathedError::type_mismatch(
                path,
                format!(
                    "primitive metadata must be an object, found {}",
                    json_type_name(meta)
                ),
            )
            .into());
        };

        for (key, value) in meta {
            match key.as_str() {
                "id" => {
                    let id = value.as_str().ok_or_else(|| {
                        PathedError::malformed_primitive(
                            &path.field("id"),
                            "element id must be a string",
                        )
                    })?;
                    cell.id = Some(id.to_string());
                }
                "extension" => {
                    let extension_path = path.field("extension");
                    let items = value.as_array().ok_or_else(|| {
                        PathedError::type_mismatch(&extension_path, "extension must be an array")
                    })?;
                    let schema = self.schema(EXTENSION_TYPE)?;
                    for (index, item) in items.iter().enumerate() {
                        let item_path = extension_path.index(index);
                        if item.is_null() {
                            return Err(null_value(&item_path));
                        }
                        let extension = self.decode_node(item, &schema, &item_path, depth + 1)?;
                        cell.extension.push(extension);
                    }
                }
                other => self.unknown(PathedError::new(
                    ErrorKind::UnknownElement,
                    &path.field(other),
                    format!("'{}' is not allowed in primitive metadata", other),
                ))?,
            }
        }
        Ok(())
    }
}

fn null_value(path: &ElementPath) -> DecodeError {
    PathedError::new(ErrorKind::DecodeError, path, "null is not a valid value here").into()
}

fn as_array<'v>(
    value: Option<&'v Value>,
    path: &ElementPath,
) -> Result<Option<&'v Vec<Value>>, DecodeError> {
    match value {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(PathedError::type_mismatch(
            path,
            format!("repeated field must be an array, found {}", json_type_name(other)),
        )
        .into()),
    }
}

/// Wire keys of one object, grouped by the field that owns them.
///
/// A key naming a plain field belongs to that field even when it also carries some choice
/// field's prefix. Among choice fields, the longest matching field name wins.
struct KeyPartition<'k> {
    choices: HashMap<&'k str, Vec<&'k str>>,
    unclaimed: Vec<&'k str>,
}

impl<'k> KeyPartition<'k> {
    fn new(object: &'k Map<String, Value>, schema: &'k TypeDescriptor) -> Self {
        let mut choices: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut unclaimed = Vec::new();

        for key in object.keys() {
            let (base, is_meta) = match key.strip_prefix('_') {
                Some(base) => (base, true),
                None => (key.as_str(), false),
            };

            if let Some(FieldShape::Single(kind)) = schema.field(base).map(|f| &f.shape) {
                if is_meta && !matches!(kind, TypeRef::Primitive(_)) {
                    unclaimed.push(key.as_str());
                }
                continue;
            }

            let owner = schema
                .fields()
                .iter()
                .filter_map(FieldDescriptor::choice_descriptor)
                .filter(|d| d.match_key(base) != KeyMatch::NotPrefixed)
                .max_by_key(|d| d.field_name().len());

            match owner {
                Some(descriptor) => {
                    let meta_on_node = is_meta
                        && matches!(
                            descriptor.match_key(base),
                            KeyMatch::Known(variant) if !matches!(variant.kind, TypeRef::Primitive(_))
                        );
                    if meta_on_node {
                        unclaimed.push(key.as_str());
                    } else {
                        choices
                            .entry(descriptor.field_name())
                            .or_default()
                            .push(key.as_str());
                    }
                }
                None => unclaimed.push(key.as_str()),
            }
        }

        Self { choices, unclaimed }
    }

    fn choice_keys(&self, field_name: &str) -> &[&'k str] {
        self.choices.get(field_name).map(Vec::as_slice).unwrap_or(&[])
    }
}
