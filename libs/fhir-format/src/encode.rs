//! Node graph → wire
//!
//! Output follows the schema's field order, never the order fields were set on the node.
//! A primitive's `_name` key directly follows its value key.

use crate::choice;
use crate::error::EncodeError;
use serde_json::{Map, Value};
use tessera_models::{
    Element, ElementPath, FieldShape, FieldSlot, Node, Primitive, PrimitiveKind, SchemaSet,
    TypeRef, EXTENSION_TYPE,
};
use tracing::trace;

pub(crate) struct Encoder<'a> {
    schemas: &'a SchemaSet,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(schemas: &'a SchemaSet) -> Self {
        Self { schemas }
    }

    pub(crate) fn encode_node(
        &self,
        node: &Node,
        path: &ElementPath,
    ) -> Result<Map<String, Value>, EncodeError> {
        let schema = self
            .schemas
            .get(node.type_name())
            .ok_or_else(|| EncodeError::UnknownType(node.type_name().to_string()))?;
        trace!(type_name = node.type_name(), path = %path, "encoding node");

        if let Some((name, _)) = node.fields().find(|(name, _)| schema.field(name).is_none()) {
            return Err(EncodeError::UndeclaredField {
                type_name: node.type_name().to_string(),
                field: name.to_string(),
            });
        }

        let mut out = Map::new();
        for field in schema.fields() {
            let Some(slot) = node.get(&field.name) else {
                continue;
            };
            let field_path = path.field(&field.name);

            match (&field.shape, slot) {
                (FieldShape::Single(kind), FieldSlot::Single(element))
                    if !field.is_repeated() =>
                {
                    self.encode_element(&field.name, kind, element, &field_path, &mut out)?
                }
                (FieldShape::Single(kind), FieldSlot::List(items)) if field.is_repeated() => {
                    self.encode_list(&field.name, kind, items, &field_path, &mut out)?
                }
                (FieldShape::Choice(declared), FieldSlot::Choice(value)) => {
                    choice::encode_into(self, value, declared, path, &mut out)?
                }
                _ => {
                    return Err(EncodeError::shape(
                        &field_path,
                        format!("slot does not match the declared shape of '{}'", field.name),
                    ))
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn encode_element(
        &self,
        key: &str,
        kind: &TypeRef,
        element: &Element,
        path: &ElementPath,
        out: &mut Map<String, Value>,
    ) -> Result<(), EncodeError> {
        element
            .conforms_to(kind)
            .map_err(|detail| EncodeError::shape(path, detail))?;

        match (element, kind) {
            (Element::Primitive(cell), TypeRef::Primitive(primitive)) => {
                if let Some(value) = encode_value(cell, *primitive) {
                    out.insert(key.to_string(), value);
                }
                if cell.value.is_none() || cell.has_metadata() {
                    let meta = self.encode_metadata(cell, path)?;
                    out.insert(format!("_{}", key), Value::Object(meta));
                }
            }
            (Element::Node(node), _) => {
                out.insert(key.to_string(), Value::Object(self.encode_node(node, path)?));
            }
            (Element::Resource(resource), _) => {
                out.insert(key.to_string(), resource.reemit());
            }
            (Element::Primitive(_), _) => {
                return Err(EncodeError::shape(path, format!("expected {}", kind)))
            }
        }
        Ok(())
    }

    fn encode_list(
        &self,
        key: &str,
        kind: &TypeRef,
        items: &[Element],
        path: &ElementPath,
        out: &mut Map<String, Value>,
    ) -> Result<(), EncodeError> {
        let TypeRef::Primitive(primitive) = kind else {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let mut single = Map::new();
                self.encode_element(key, kind, item, &path.index(index), &mut single)?;
                values.extend(single.remove(key));
            }
            out.insert(key.to_string(), Value::Array(values));
            return Ok(());
        };

        let mut values = Vec::with_capacity(items.len());
        let mut metas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = path.index(index);
            item.conforms_to(kind)
                .map_err(|detail| EncodeError::shape(&item_path, detail))?;
            let Element::Primitive(cell) = item else {
                return Err(EncodeError::shape(&item_path, format!("expected {}", kind)));
            };

            values.push(encode_value(cell, *primitive).unwrap_or(Value::Null));
            if cell.value.is_none() || cell.has_metadata() {
                metas.push(Value::Object(self.encode_metadata(cell, &item_path)?));
            } else {
                metas.push(Value::Null);
            }
        }

        if items.is_empty() || values.iter().any(|v| !v.is_null()) {
            out.insert(key.to_string(), Value::Array(values));
        }
        if metas.iter().any(|m| !m.is_null()) {
            out.insert(format!("_{}", key), Value::Array(metas));
        }
        Ok(())
    }

    fn encode_metadata(
        &self,
        cell: &Primitive,
        path: &ElementPath,
    ) -> Result<Map<String, Value>, EncodeError> {
        let mut meta = Map::new();
        if let Some(id) = &cell.id {
            meta.insert("id".to_string(), Value::String(id.clone()));
        }
        if !cell.extension.is_empty() {
            let extension_path = path.field("extension");
            let mut extensions = Vec::with_capacity(cell.extension.len());
            for (index, extension) in cell.extension.iter().enumerate() {
                let item_path = extension_path.index(index);
                if extension.type_name() != EXTENSION_TYPE {
                    return Err(EncodeError::shape(
                        &item_path,
                        format!("expected Extension but found {}", extension.type_name()),
                    ));
                }
                let encoded = self.encode_node(extension, &item_path)?;
                extensions.push(Value::Object(encoded));
            }
            meta.insert("extension".to_string(), Value::Array(extensions));
        }
        Ok(meta)
    }
}

fn encode_value(cell: &Primitive, kind: PrimitiveKind) -> Option<Value> {
    cell.value.as_ref().map(|scalar| kind.to_json(scalar))
}
