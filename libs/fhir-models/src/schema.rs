//! Schema metadata: type, field and variant descriptors
//!
//! Descriptors are authored once (by hand or by a generator) and shared read-only by the
//! codec and the validation engine. Adding a payload type to a choice field is a matter of
//! adding a `Variant` entry; nothing in the engine needs to change.

use crate::error::{Error, Result};
use crate::primitive::{PrimitiveKind, ScalarType};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Field name of the fixed discriminator carried by every resource type
pub const RESOURCE_TYPE_FIELD: &str = "resourceType";

/// What a field or variant holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// A structured type, resolved by name against a `SchemaSet`
    Complex(String),
    /// An embedded resource of any type, kept opaque at this layer
    Resource,
}

impl TypeRef {
    pub fn complex(name: impl Into<String>) -> Self {
        Self::Complex(name.into())
    }

    /// Default variant tag for this payload kind (`String`, `Quantity`, `Resource`)
    pub fn default_tag(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.tag(),
            Self::Complex(name) => name.clone(),
            Self::Resource => "Resource".to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind),
            Self::Complex(name) => f.write_str(name),
            Self::Resource => f.write_str("Resource"),
        }
    }
}

/// Cardinality of a field (min..max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Minimum occurrences
    pub min: u32,
    /// Maximum occurrences (None means unbounded/*)
    pub max: Option<u32>,
}

impl Cardinality {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// 0..1
    pub fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// Check if this field is a list/array
    pub fn is_array(&self) -> bool {
        self.max.map(|m| m > 1).unwrap_or(true)
    }

    /// Check if this field is required
    pub fn is_required(&self) -> bool {
        self.min > 0
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// One permissible payload of a choice field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Capitalized tag appended to the field name on the wire
    pub tag: String,
    pub kind: TypeRef,
}

/// Result of matching a wire key against a variant descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch<'a> {
    /// The key does not start with `{field_name}{Uppercase}`
    NotPrefixed,
    Known(&'a Variant),
    /// The key has the field-name prefix but its tag is not declared
    Unknown(&'a str),
}

/// Static description of a `name[x]` field: the ordered set of permissible variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    field_name: String,
    variants: Vec<Variant>,
}

impl VariantDescriptor {
    /// Build a descriptor; tags must be unique and the set non-empty.
    pub fn new<T, I>(field_name: impl Into<String>, variants: I) -> Result<Self>
    where
        T: Into<String>,
        I: IntoIterator<Item = (T, TypeRef)>,
    {
        let field_name = field_name.into();
        let mut seen = HashSet::new();
        let mut list = Vec::new();

        for (tag, kind) in variants {
            let tag = tag.into();
            if !seen.insert(tag.clone()) {
                return Err(Error::DuplicateVariantTag {
                    field: field_name,
                    tag,
                });
            }
            list.push(Variant { tag, kind });
        }

        if list.is_empty() {
            return Err(Error::EmptyVariantSet(field_name));
        }

        Ok(Self {
            field_name,
            variants: list,
        })
    }

    /// Build a descriptor whose tags are derived from the payload kinds
    pub fn from_kinds(
        field_name: impl Into<String>,
        kinds: impl IntoIterator<Item = TypeRef>,
    ) -> Result<Self> {
        Self::new(
            field_name,
            kinds.into_iter().map(|kind| (kind.default_tag(), kind)),
        )
    }

    /// Descriptor accepting every primitive kind (as used by `Extension.value[x]`)
    pub fn all_primitives(field_name: impl Into<String>) -> Result<Self> {
        Self::from_kinds(
            field_name,
            PrimitiveKind::ALL
                .iter()
                .filter(|k| **k != PrimitiveKind::Xhtml)
                .map(|k| TypeRef::Primitive(*k)),
        )
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.tag.as_str())
    }

    pub fn variant(&self, tag: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    /// Pure lookup of the payload kind for `tag`
    pub fn resolve(&self, tag: &str) -> Option<&TypeRef> {
        self.variant(tag).map(|v| &v.kind)
    }

    /// Wire key for a tag (`value` + `Boolean` = `valueBoolean`)
    pub fn wire_key(&self, tag: &str) -> String {
        format!("{}{}", self.field_name, tag)
    }

    /// Match a wire key by name only; payload shape is never consulted.
    pub fn match_key<'a>(&'a self, key: &'a str) -> KeyMatch<'a> {
        let Some(rest) = key.strip_prefix(self.field_name.as_str()) else {
            return KeyMatch::NotPrefixed;
        };
        if !rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return KeyMatch::NotPrefixed;
        }
        match self.variant(rest) {
            Some(variant) => KeyMatch::Known(variant),
            None => KeyMatch::Unknown(rest),
        }
    }
}

/// Shape of a field slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    Single(TypeRef),
    Choice(Arc<VariantDescriptor>),
}

/// A named field of a structured type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub shape: FieldShape,
    pub cardinality: Cardinality,
    /// Literal the field must hold (discriminators)
    pub fixed: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeRef) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::Single(kind),
            cardinality: Cardinality::optional(),
            fixed: None,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeRef::Primitive(kind))
    }

    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::complex(type_name))
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Resource)
    }

    /// A `name[x]` field; the field name is taken from the descriptor
    pub fn choice(descriptor: impl Into<Arc<VariantDescriptor>>) -> Self {
        let descriptor = descriptor.into();
        Self {
            name: descriptor.field_name().to_string(),
            shape: FieldShape::Choice(descriptor),
            cardinality: Cardinality::optional(),
            fixed: None,
        }
    }

    /// min = 1
    pub fn required(mut self) -> Self {
        self.cardinality.min = self.cardinality.min.max(1);
        self
    }

    /// max = *
    pub fn repeated(mut self) -> Self {
        self.cardinality.max = None;
        self
    }

    pub fn min(mut self, min: u32) -> Self {
        self.cardinality.min = min;
        self
    }

    pub fn max(mut self, max: u32) -> Self {
        self.cardinality.max = Some(max);
        self
    }

    pub fn fixed(mut self, literal: impl Into<String>) -> Self {
        self.fixed = Some(literal.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.cardinality.is_required()
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality.is_array()
    }

    pub fn choice_descriptor(&self) -> Option<&Arc<VariantDescriptor>> {
        match &self.shape {
            FieldShape::Choice(descriptor) => Some(descriptor),
            FieldShape::Single(_) => None,
        }
    }

    pub fn single_kind(&self) -> Option<&TypeRef> {
        match &self.shape {
            FieldShape::Single(kind) => Some(kind),
            FieldShape::Choice(_) => None,
        }
    }
}

/// Kind of structured type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Carries a `resourceType` discriminator
    Resource,
    /// Datatypes and backbone elements
    Complex,
}

/// Schema of one structured type: its fields in declared (and encoding) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Start a datatype/backbone schema
    pub fn complex(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            kind: TypeKind::Complex,
            fields: Vec::new(),
        }
    }

    /// Start a resource schema; `resourceType` is declared first, required and fixed.
    pub fn resource(name: impl Into<String>) -> TypeBuilder {
        let name = name.into();
        let discriminator = FieldDescriptor::primitive(RESOURCE_TYPE_FIELD, PrimitiveKind::Code)
            .required()
            .fixed(name.clone());
        TypeBuilder {
            name,
            kind: TypeKind::Resource,
            fields: vec![discriminator],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Names of complex types referenced by fields and variants
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for field in &self.fields {
            let kinds: Vec<&TypeRef> = match &field.shape {
                FieldShape::Single(kind) => vec![kind],
                FieldShape::Choice(descriptor) => {
                    descriptor.variants().iter().map(|v| &v.kind).collect()
                }
            };
            for kind in kinds {
                if let TypeRef::Complex(name) = kind {
                    if !names.contains(&name.as_str()) {
                        names.push(name.as_str());
                    }
                }
            }
        }
        names
    }
}

/// Incremental construction of a `TypeDescriptor`; `build` checks the authoring rules.
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    fields: Vec<FieldDescriptor>,
}

impl TypeBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<TypeDescriptor> {
        let mut seen = HashSet::new();

        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::DuplicateField {
                    type_name: self.name.clone(),
                    field: field.name.clone(),
                });
            }

            match &field.shape {
                FieldShape::Choice(_) if field.is_repeated() => {
                    return Err(Error::RepeatedChoice {
                        type_name: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                FieldShape::Single(kind) if field.fixed.is_some() => {
                    let string_like = matches!(
                        kind,
                        TypeRef::Primitive(p) if p.scalar_type() == ScalarType::String
                    );
                    if !string_like || field.is_repeated() {
                        return Err(Error::InvalidFixedField {
                            type_name: self.name.clone(),
                            field: field.name.clone(),
                        });
                    }
                }
                FieldShape::Choice(_) if field.fixed.is_some() => {
                    return Err(Error::InvalidFixedField {
                        type_name: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(TypeDescriptor {
            name: self.name,
            kind: self.kind,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_descriptor() -> VariantDescriptor {
        VariantDescriptor::from_kinds(
            "value",
            [
                TypeRef::Primitive(PrimitiveKind::Boolean),
                TypeRef::Primitive(PrimitiveKind::String),
                TypeRef::complex("Quantity"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve() {
        let descriptor = value_descriptor();
        assert_eq!(
            descriptor.resolve("Boolean"),
            Some(&TypeRef::Primitive(PrimitiveKind::Boolean))
        );
        assert_eq!(
            descriptor.resolve("Quantity"),
            Some(&TypeRef::complex("Quantity"))
        );
        assert_eq!(descriptor.resolve("Integer"), None);
        assert_eq!(descriptor.wire_key("String"), "valueString");
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let err = VariantDescriptor::new(
            "value",
            [
                ("Reference", TypeRef::complex("Reference")),
                ("Reference", TypeRef::complex("CodeableReference")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateVariantTag { .. }));

        let empty: Vec<(String, TypeRef)> = Vec::new();
        assert!(matches!(
            VariantDescriptor::new("value", empty),
            Err(Error::EmptyVariantSet(_))
        ));
    }

    #[test]
    fn test_match_key() {
        let descriptor = value_descriptor();
        assert!(matches!(
            descriptor.match_key("valueBoolean"),
            KeyMatch::Known(v) if v.tag == "Boolean"
        ));
        assert_eq!(descriptor.match_key("valueInteger"), KeyMatch::Unknown("Integer"));
        assert_eq!(descriptor.match_key("valueset"), KeyMatch::NotPrefixed);
        assert_eq!(descriptor.match_key("value"), KeyMatch::NotPrefixed);
        assert_eq!(descriptor.match_key("status"), KeyMatch::NotPrefixed);
    }

    #[test]
    fn test_resource_builder_declares_discriminator() {
        let binary = TypeDescriptor::resource("Binary")
            .field(FieldDescriptor::primitive("contentType", PrimitiveKind::Code).required())
            .build()
            .unwrap();

        let first = &binary.fields()[0];
        assert_eq!(first.name, RESOURCE_TYPE_FIELD);
        assert_eq!(first.fixed.as_deref(), Some("Binary"));
        assert!(first.is_required());
        assert!(binary.is_resource());
        assert_eq!(binary.required_fields().count(), 2);
    }

    #[test]
    fn test_builder_rules() {
        let dup = TypeDescriptor::complex("Thing")
            .field(FieldDescriptor::primitive("a", PrimitiveKind::String))
            .field(FieldDescriptor::primitive("a", PrimitiveKind::Code))
            .build();
        assert!(matches!(dup, Err(Error::DuplicateField { .. })));

        let repeated_choice = TypeDescriptor::complex("Thing")
            .field(FieldDescriptor::choice(value_descriptor()).repeated())
            .build();
        assert!(matches!(repeated_choice, Err(Error::RepeatedChoice { .. })));

        let fixed_bool = TypeDescriptor::complex("Thing")
            .field(FieldDescriptor::primitive("flag", PrimitiveKind::Boolean).fixed("true"))
            .build();
        assert!(matches!(fixed_bool, Err(Error::InvalidFixedField { .. })));
    }

    #[test]
    fn test_referenced_types() {
        let item = TypeDescriptor::complex("Item")
            .field(FieldDescriptor::complex("category", "CodeableConcept"))
            .field(FieldDescriptor::choice(value_descriptor()))
            .field(FieldDescriptor::complex("modifier", "CodeableConcept").repeated())
            .build()
            .unwrap();
        assert_eq!(item.referenced_types(), vec!["CodeableConcept", "Quantity"]);
    }

    #[test]
    fn test_cardinality() {
        let field = FieldDescriptor::complex("site", "CodeableConcept")
            .repeated()
            .min(1);
        assert!(field.is_repeated());
        assert!(field.is_required());
        assert_eq!(field.cardinality.to_string(), "1..*");
        assert_eq!(Cardinality::optional().to_string(), "0..1");
    }
}
