//! Choice fields: exactly one declared variant, with a payload of the declared kind
//!
//! Two populated variants cannot be represented by `ChoiceValue`; that case is caught when
//! decoding. What remains here is absence, foreign tags and payload shape.

use tessera_models::{ElementPath, FieldShape, FieldSlot, Node, PathedError, TypeDescriptor};

pub fn validate_choices(
    node: &Node,
    schema: &TypeDescriptor,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    for field in schema.fields() {
        let FieldShape::Choice(declared) = &field.shape else {
            continue;
        };

        let Some(FieldSlot::Choice(choice)) = node.get(&field.name) else {
            // A slot of another shape is reported by the structure step
            if field.is_required() && !node.contains(&field.name) {
                errors.push(PathedError::missing_choice(
                    &path.field(&format!("{}[x]", declared.field_name())),
                    declared.field_name(),
                ));
            }
            continue;
        };

        let payload_path = path.field(&declared.wire_key(choice.tag()));
        match declared.resolve(choice.tag()) {
            None => errors.push(PathedError::unknown_variant(
                &payload_path,
                declared.field_name(),
                choice.tag(),
            )),
            Some(kind) => {
                if let Err(detail) = choice.payload().conforms_to(kind) {
                    errors.push(PathedError::type_mismatch(&payload_path, detail));
                }
            }
        }
    }
}
