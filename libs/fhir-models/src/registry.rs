//! Schema registry and the opaque-resource resolution hook

use crate::error::{Error, Result};
use crate::primitive::PrimitiveKind;
use crate::schema::{FieldDescriptor, TypeDescriptor, VariantDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the built-in extension type
pub const EXTENSION_TYPE: &str = "Extension";

/// Looks up a resource schema by the discriminator found inside an opaque fragment.
///
/// Supplied by callers; the set of resolvable resource types is open-ended.
pub trait ResourceTypeResolver {
    fn resolve_resource_type(&self, discriminator: &str) -> Option<Arc<TypeDescriptor>>;
}

impl<F> ResourceTypeResolver for F
where
    F: Fn(&str) -> Option<Arc<TypeDescriptor>>,
{
    fn resolve_resource_type(&self, discriminator: &str) -> Option<Arc<TypeDescriptor>> {
        self(discriminator)
    }
}

/// All type descriptors known to a codec or validator, indexed by type name
#[derive(Debug, Clone)]
pub struct SchemaSet {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl SchemaSet {
    /// A registry holding the core `Extension` type
    pub fn new() -> Self {
        let mut set = Self::empty();
        let extension = Arc::new(extension_type());
        set.types.insert(extension.name().to_string(), extension);
        set
    }

    /// A registry with no types at all
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Add a type; names must be unique
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>> {
        if self.types.contains_key(descriptor.name()) {
            return Err(Error::DuplicateType(descriptor.name().to_string()));
        }
        let descriptor = Arc::new(descriptor);
        self.types
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Builder-style `register`
    pub fn with(mut self, descriptor: TypeDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    /// Like `get`, but an unknown name is an error
    pub fn require(&self, name: &str) -> Result<&Arc<TypeDescriptor>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all types
    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    /// Get all resource types
    pub fn resource_types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values().filter(|t| t.is_resource())
    }

    /// Check that every complex type referenced by a field or variant is registered.
    pub fn check_references(&self) -> Result<()> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();

        for name in names {
            let descriptor = &self.types[name];
            for referenced in descriptor.referenced_types() {
                if !self.types.contains_key(referenced) {
                    return Err(Error::UnknownTypeReference {
                        type_name: name.clone(),
                        missing: referenced.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTypeResolver for SchemaSet {
    fn resolve_resource_type(&self, discriminator: &str) -> Option<Arc<TypeDescriptor>> {
        self.get(discriminator)
            .filter(|t| t.is_resource())
            .cloned()
    }
}

/// The core `Extension` type: `url` plus an optional primitive `value[x]`, nestable.
pub fn extension_type() -> TypeDescriptor {
    // Static field set; the build cannot fail
    let value = VariantDescriptor::all_primitives("value")
        .expect("primitive tags are unique");
    TypeDescriptor::complex(EXTENSION_TYPE)
        .field(FieldDescriptor::primitive("id", PrimitiveKind::String))
        .field(FieldDescriptor::complex("extension", EXTENSION_TYPE).repeated())
        .field(FieldDescriptor::primitive("url", PrimitiveKind::Uri).required())
        .field(FieldDescriptor::choice(value))
        .build()
        .expect("extension schema is well-formed")
}
