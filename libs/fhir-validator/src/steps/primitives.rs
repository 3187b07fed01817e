//! Lexical checks on primitive values

use crate::plan::PrimitivesPlan;
use tessera_models::{
    Element, ElementPath, FieldShape, FieldSlot, Node, PathedError, TypeDescriptor, TypeRef,
};

/// Re-check every primitive value held directly by `node` against its declared kind.
///
/// Cells whose scalar does not even fit the kind are the structure step's concern and are
/// skipped here.
pub fn validate_primitives(
    node: &Node,
    schema: &TypeDescriptor,
    plan: &PrimitivesPlan,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    if !plan.lexical {
        return;
    }

    for field in schema.fields() {
        let Some(slot) = node.get(&field.name) else {
            continue;
        };
        let field_path = path.field(&field.name);

        match (&field.shape, slot) {
            (FieldShape::Single(kind), FieldSlot::Single(element)) => {
                check_element(element, kind, &field_path, errors)
            }
            (FieldShape::Single(kind), FieldSlot::List(items)) => {
                for (index, item) in items.iter().enumerate() {
                    check_element(item, kind, &field_path.index(index), errors);
                }
            }
            (FieldShape::Choice(declared), FieldSlot::Choice(choice)) => {
                if let Some(kind) = declared.resolve(choice.tag()) {
                    let payload_path = path.field(&declared.wire_key(choice.tag()));
                    check_element(choice.payload(), kind, &payload_path, errors);
                }
            }
            _ => {}
        }
    }
}

fn check_element(
    element: &Element,
    kind: &TypeRef,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    let (Element::Primitive(cell), TypeRef::Primitive(primitive)) = (element, kind) else {
        return;
    };
    let Some(value) = &cell.value else {
        return;
    };
    if element.conforms_to(kind).is_err() {
        return;
    }
    if let Err(reason) = primitive.check(value) {
        errors.push(PathedError::malformed_primitive(path, reason));
    }
}
