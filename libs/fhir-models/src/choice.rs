//! Choice values (`value[x]`, `defaultValue[x]`, `fixed[x]`, ...)
//!
//! A choice value is a true sum: one tag, one payload. Holding two variants at once is not
//! representable, so exclusivity is enforced by the type rather than by scanning optional
//! fields.

use crate::error::{Error, Result};
use crate::node::Element;
use crate::schema::{TypeRef, VariantDescriptor};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ChoiceValue {
    descriptor: Arc<VariantDescriptor>,
    tag: String,
    payload: Box<Element>,
}

impl ChoiceValue {
    /// Select exactly one variant of `descriptor`.
    ///
    /// Fails when the tag is not declared or the payload's shape does not fit the
    /// variant's kind.
    pub fn new(
        descriptor: &Arc<VariantDescriptor>,
        tag: &str,
        payload: impl Into<Element>,
    ) -> Result<Self> {
        let payload = payload.into();
        let kind = descriptor
            .resolve(tag)
            .ok_or_else(|| Error::UnknownVariantTag {
                field: descriptor.field_name().to_string(),
                tag: tag.to_string(),
            })?;

        payload
            .conforms_to(kind)
            .map_err(|reason| Error::VariantPayloadMismatch {
                field: descriptor.field_name().to_string(),
                tag: tag.to_string(),
                reason,
            })?;

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            tag: tag.to_string(),
            payload: Box::new(payload),
        })
    }

    pub fn descriptor(&self) -> &Arc<VariantDescriptor> {
        &self.descriptor
    }

    pub fn field_name(&self) -> &str {
        self.descriptor.field_name()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Declared payload kind of the selected variant
    pub fn kind(&self) -> Option<&TypeRef> {
        self.descriptor.resolve(&self.tag)
    }

    pub fn payload(&self) -> &Element {
        &self.payload
    }

    pub fn into_payload(self) -> Element {
        *self.payload
    }

    /// Key this value occupies on the wire (`valueBoolean`)
    pub fn wire_key(&self) -> String {
        self.descriptor.wire_key(&self.tag)
    }
}

impl PartialEq for ChoiceValue {
    fn eq(&self, other: &Self) -> bool {
        self.field_name() == other.field_name()
            && self.tag == other.tag
            && self.payload == other.payload
    }
}
