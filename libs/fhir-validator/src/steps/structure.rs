//! Slot shapes against the schema
//!
//! Decoded graphs always pass; this catches graphs assembled by hand.

use tessera_models::{
    ElementPath, ErrorKind, FieldShape, FieldSlot, Node, PathedError, TypeDescriptor,
};

pub fn validate_structure(
    node: &Node,
    schema: &TypeDescriptor,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    for (name, _) in node.fields() {
        if schema.field(name).is_none() {
            errors.push(PathedError::new(
                ErrorKind::UnknownElement,
                &path.field(name),
                format!("'{}' is not a field of {}", name, schema.name()),
            ));
        }
    }

    for field in schema.fields() {
        let Some(slot) = node.get(&field.name) else {
            continue;
        };
        let field_path = path.field(&field.name);

        match (&field.shape, slot) {
            (FieldShape::Single(kind), FieldSlot::Single(element)) if !field.is_repeated() => {
                if let Err(detail) = element.conforms_to(kind) {
                    errors.push(PathedError::type_mismatch(&field_path, detail));
                }
            }
            (FieldShape::Single(kind), FieldSlot::List(items)) if field.is_repeated() => {
                for (index, item) in items.iter().enumerate() {
                    if let Err(detail) = item.conforms_to(kind) {
                        errors.push(PathedError::type_mismatch(&field_path.index(index), detail));
                    }
                }
            }
            // Payload checks belong to the choices step
            (FieldShape::Choice(_), FieldSlot::Choice(_)) => {}
            (_, slot) => errors.push(PathedError::type_mismatch(
                &field_path,
                format!(
                    "{} slot where the schema declares {} {}",
                    describe(slot),
                    if field.is_repeated() { "a list of" } else { "a single" },
                    match &field.shape {
                        FieldShape::Single(kind) => kind.to_string(),
                        FieldShape::Choice(d) => format!("{}[x]", d.field_name()),
                    }
                ),
            )),
        }
    }
}

fn describe(slot: &FieldSlot) -> &'static str {
    match slot {
        FieldSlot::Single(_) => "single-value",
        FieldSlot::Choice(_) => "choice",
        FieldSlot::List(_) => "list",
    }
}
