//! Structured nodes and their field slots

use crate::choice::ChoiceValue;
use crate::opaque::OpaqueResource;
use crate::primitive::{Primitive, PrimitiveKind, Scalar, ScalarType};
use crate::schema::{TypeRef, RESOURCE_TYPE_FIELD};
use indexmap::IndexMap;

/// One value inside a slot: a primitive cell, a nested node or an opaque resource
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Primitive(Primitive),
    Node(Node),
    Resource(OpaqueResource),
}

impl Element {
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Self::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&OpaqueResource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Check the element's shape against a declared kind. Primitive lexical rules are
    /// not part of this check.
    pub fn conforms_to(&self, kind: &TypeRef) -> Result<(), String> {
        match (self, kind) {
            (Self::Primitive(p), TypeRef::Primitive(expected)) => match &p.value {
                Some(scalar) if scalar_matches(scalar, *expected) => Ok(()),
                Some(_) => Err(format!("value is not a {}", expected)),
                None => Ok(()),
            },
            (Self::Node(n), TypeRef::Complex(expected)) if n.type_name() == expected => Ok(()),
            (Self::Node(n), TypeRef::Complex(expected)) => Err(format!(
                "expected {} but found {}",
                expected,
                n.type_name()
            )),
            (Self::Resource(_), TypeRef::Resource) => Ok(()),
            (element, expected) => Err(format!(
                "expected {} but found {}",
                expected,
                element.describe()
            )),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Self::Primitive(_) => "a primitive",
            Self::Node(n) => n.type_name(),
            Self::Resource(_) => "a resource",
        }
    }
}

fn scalar_matches(scalar: &Scalar, kind: PrimitiveKind) -> bool {
    matches!(
        (scalar, kind.scalar_type()),
        (Scalar::Boolean(_), ScalarType::Boolean)
            | (Scalar::Integer(_), ScalarType::Integer)
            | (Scalar::Decimal(_), ScalarType::Decimal)
            | (Scalar::String(_), ScalarType::String)
    )
}

impl From<Primitive> for Element {
    fn from(value: Primitive) -> Self {
        Self::Primitive(value)
    }
}

impl From<Node> for Element {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<OpaqueResource> for Element {
    fn from(value: OpaqueResource) -> Self {
        Self::Resource(value)
    }
}

/// Content of one named field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
    Single(Element),
    Choice(ChoiceValue),
    /// A repeated field; an empty list is present-but-empty, not absent
    List(Vec<Element>),
}

impl FieldSlot {
    pub fn as_single(&self) -> Option<&Element> {
        match self {
            Self::Single(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceValue> {
        match self {
            Self::Choice(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A composite value: ordered named fields, possibly nested
///
/// Nodes are plain data. Nothing is checked on construction so partially built graphs can
/// exist; run the validator to check them against their schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    type_name: String,
    fields: IndexMap<String, FieldSlot>,
}

impl Node {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Resource node with its `resourceType` discriminator already set
    pub fn resource(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let discriminator = Primitive::new(type_name.as_str());
        Self::new(type_name).with_primitive(RESOURCE_TYPE_FIELD, discriminator)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field, returning the previous slot
    pub fn set(&mut self, name: impl Into<String>, slot: FieldSlot) -> Option<FieldSlot> {
        self.fields.insert(name.into(), slot)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldSlot> {
        self.fields.shift_remove(name)
    }

    pub fn with(mut self, name: impl Into<String>, slot: FieldSlot) -> Self {
        self.set(name, slot);
        self
    }

    pub fn with_primitive(self, name: impl Into<String>, value: Primitive) -> Self {
        self.with(name, FieldSlot::Single(Element::Primitive(value)))
    }

    pub fn with_node(self, name: impl Into<String>, node: Node) -> Self {
        self.with(name, FieldSlot::Single(Element::Node(node)))
    }

    pub fn with_resource(self, name: impl Into<String>, resource: OpaqueResource) -> Self {
        self.with(name, FieldSlot::Single(Element::Resource(resource)))
    }

    /// Store a choice under its descriptor's field name
    pub fn with_choice(self, choice: ChoiceValue) -> Self {
        let name = choice.field_name().to_string();
        self.with(name, FieldSlot::Choice(choice))
    }

    pub fn with_list<I, E>(self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.with(
            name,
            FieldSlot::List(items.into_iter().map(Into::into).collect()),
        )
    }

    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSlot> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSlot)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn primitive(&self, name: &str) -> Option<&Primitive> {
        self.get(name)
            .and_then(FieldSlot::as_single)
            .and_then(Element::as_primitive)
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.get(name)
            .and_then(FieldSlot::as_single)
            .and_then(Element::as_node)
    }

    pub fn resource_slot(&self, name: &str) -> Option<&OpaqueResource> {
        self.get(name)
            .and_then(FieldSlot::as_single)
            .and_then(Element::as_resource)
    }

    pub fn choice(&self, name: &str) -> Option<&ChoiceValue> {
        self.get(name).and_then(FieldSlot::as_choice)
    }

    pub fn list(&self, name: &str) -> Option<&[Element]> {
        self.get(name).and_then(FieldSlot::as_list)
    }

    /// Value of the `resourceType` field, if set
    pub fn resource_type(&self) -> Option<&str> {
        self.primitive(RESOURCE_TYPE_FIELD).and_then(Primitive::as_str)
    }
}
