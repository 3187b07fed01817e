//! Required fields and fixed discriminators

use tessera_models::{ElementPath, FieldShape, Node, PathedError, TypeDescriptor};

/// Report every required plain field that is absent, and every fixed field whose value
/// differs from its literal.
///
/// Required choice fields are reported by the choices step as `MissingChoice`.
pub fn validate_required(
    node: &Node,
    schema: &TypeDescriptor,
    path: &ElementPath,
    errors: &mut Vec<PathedError>,
) {
    for field in schema.required_fields() {
        if matches!(field.shape, FieldShape::Single(_)) && !node.contains(&field.name) {
            errors.push(PathedError::required_missing(&path.field(&field.name)));
        }
    }

    for field in schema.fields() {
        let Some(expected) = field.fixed.as_deref() else {
            continue;
        };
        let Some(cell) = node.primitive(&field.name) else {
            continue;
        };
        let actual = cell.as_str().unwrap_or_default();
        if actual != expected {
            errors.push(PathedError::discriminator_mismatch(
                &path.field(&field.name),
                expected,
                actual,
            ));
        }
    }
}
