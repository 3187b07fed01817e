//! Opaque resource slots
//!
//! A slot holds an embedded resource whose concrete type is not known to the containing
//! schema. The fragment is kept exactly as captured (key order included) and re-emitted
//! unchanged; turning it into a typed node is left to a caller-supplied resolver.

use crate::error::{Error, Result};
use crate::schema::RESOURCE_TYPE_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueResource {
    content: Map<String, Value>,
}

impl OpaqueResource {
    /// Capture an already well-formed object fragment.
    pub fn capture(fragment: Map<String, Value>) -> Self {
        Self { content: fragment }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(content) => Ok(Self::capture(content)),
            _ => Err(Error::OpaqueNotObject),
        }
    }

    /// Parse and capture a JSON text fragment
    pub fn from_json_str(input: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(input)?)
    }

    /// The fragment as captured
    pub fn reemit(&self) -> Value {
        Value::Object(self.content.clone())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.content
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.content
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.content)?)
    }

    /// The `resourceType` carried inside the fragment, if any
    pub fn discriminator(&self) -> Option<&str> {
        self.content.get(RESOURCE_TYPE_FIELD).and_then(Value::as_str)
    }
}
