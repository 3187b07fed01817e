//! Choice fields on the wire
//!
//! A choice occupies exactly one key, `{field}{Tag}` (plus `_{field}{Tag}` for primitive
//! metadata). Keys are matched by name only; the payload is never inspected to guess a tag.

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{DecodeError, EncodeError};
use serde_json::{Map, Value};
use std::sync::Arc;
use tessera_models::{
    ChoiceValue, ElementPath, KeyMatch, PathedError, TypeRef, Variant, VariantDescriptor,
};

/// Whether a choice field must be populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Path used for errors about the choice as a whole (`value[x]`)
pub(crate) fn choice_path(parent: &ElementPath, descriptor: &VariantDescriptor) -> ElementPath {
    parent.field(&format!("{}[x]", descriptor.field_name()))
}

/// Decode the choice from the keys already assigned to it.
///
/// Zero matches is `MissingChoice` or absent depending on `presence`; more than one distinct
/// tag is `AmbiguousChoice` naming every tag seen, in wire order.
pub(crate) fn decode_from_keys(
    decoder: &mut Decoder<'_>,
    object: &Map<String, Value>,
    descriptor: &Arc<VariantDescriptor>,
    keys: &[&str],
    presence: Presence,
    parent: &ElementPath,
    depth: usize,
) -> Result<Option<ChoiceValue>, DecodeError> {
    let mut selected: Vec<&Variant> = Vec::new();

    for &key in keys {
        let base = key.strip_prefix('_').unwrap_or(key);
        match descriptor.match_key(base) {
            KeyMatch::Known(variant) => {
                if !selected.iter().any(|v| v.tag == variant.tag) {
                    selected.push(variant);
                }
            }
            KeyMatch::Unknown(tag) => decoder.unknown(PathedError::unknown_variant(
                &parent.field(key),
                descriptor.field_name(),
                tag,
            ))?,
            KeyMatch::NotPrefixed => {}
        }
    }

    let variant = match selected.as_slice() {
        [] => {
            return match presence {
                Presence::Required => Err(PathedError::missing_choice(
                    &choice_path(parent, descriptor),
                    descriptor.field_name(),
                )
                .into()),
                Presence::Optional => Ok(None),
            }
        }
        [variant] => *variant,
        many => {
            let tags = many.iter().map(|v| v.tag.clone()).collect();
            return Err(
                PathedError::ambiguous_choice(&choice_path(parent, descriptor), tags).into(),
            );
        }
    };

    let key = descriptor.wire_key(&variant.tag);
    let path = parent.field(&key);
    let meta = match variant.kind {
        TypeRef::Primitive(_) => object.get(&format!("_{}", key)),
        _ => None,
    };
    let Some(payload) = decoder.decode_single(&variant.kind, object.get(&key), meta, &path, depth)?
    else {
        return Ok(None);
    };

    let choice = ChoiceValue::new(descriptor, &variant.tag, payload)
        .map_err(|err| PathedError::type_mismatch(&path, err.to_string()))?;
    Ok(Some(choice))
}

/// Scan every key of `object` for variants of `descriptor`.
pub(crate) fn decode_standalone(
    decoder: &mut Decoder<'_>,
    object: &Map<String, Value>,
    descriptor: &Arc<VariantDescriptor>,
    presence: Presence,
) -> Result<Option<ChoiceValue>, DecodeError> {
    let keys: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| {
            let base = key.strip_prefix('_').unwrap_or(*key);
            descriptor.match_key(base) != KeyMatch::NotPrefixed
        })
        .collect();
    decode_from_keys(
        decoder,
        object,
        descriptor,
        &keys,
        presence,
        &ElementPath::root(),
        0,
    )
}

/// Emit the single `{field}{Tag}` key (and its `_` metadata key) for `choice`.
pub(crate) fn encode_into(
    encoder: &Encoder<'_>,
    choice: &ChoiceValue,
    declared: &VariantDescriptor,
    parent: &ElementPath,
    out: &mut Map<String, Value>,
) -> Result<(), EncodeError> {
    let key = declared.wire_key(choice.tag());
    let path = parent.field(&key);
    let kind = declared.resolve(choice.tag()).ok_or_else(|| {
        EncodeError::shape(
            &path,
            format!(
                "'{}' is not a declared variant of {}[x]",
                choice.tag(),
                declared.field_name()
            ),
        )
    })?;
    encoder.encode_element(&key, kind, choice.payload(), &path, out)
}
