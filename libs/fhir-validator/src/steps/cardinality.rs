//! List bounds of repeated fields

use tessera_models::{ElementPath, FieldSlot, Node, PathedError, TypeDescriptor};

/// Check present lists against their declared `min..max`.
///
/// An absent list is left to the required step, so a missing mandatory list yields one
/// `RequiredFieldMissing` rather than two defects.
pub fn validate_cardinality(
    node: &Node,
    schema: &TypeDescriptor,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    for field in schema.fields().iter().filter(|f| f.is_repeated()) {
        let Some(FieldSlot::List(items)) = node.get(&field.name) else {
            continue;
        };
        let cardinality = field.cardinality;
        let actual = items.len();

        if actual < cardinality.min as usize {
            errors.push(PathedError::min_cardinality(
                &path.field(&field.name),
                cardinality.min,
                actual,
            ));
        }
        if let Some(max) = cardinality.max {
            if actual > max as usize {
                errors.push(PathedError::max_cardinality(
                    &path.field(&field.name),
                    max,
                    actual,
                ));
            }
        }
    }
}
