//! Path-qualified defects shared by the decoder and the validation engine

use crate::path::ElementPath;
use std::fmt;
use thiserror::Error;

/// What went wrong at a given path.
///
/// Decode-time kinds (`DecodeError`, `MalformedPrimitive`, `UnknownVariantTag`,
/// `UnknownElement`, `AmbiguousChoice`, `TypeMismatch`, `DepthLimitExceeded`) abort decoding
/// of the document. The remaining kinds are produced by validation and are always
/// aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    RequiredFieldMissing,
    DiscriminatorMismatch { expected: String, actual: String },
    AmbiguousChoice { tags: Vec<String> },
    MissingChoice,
    MinCardinalityViolation { required_min: u32, actual: usize },
    MaxCardinalityViolation { allowed_max: u32, actual: usize },
    UnknownVariantTag { tag: String },
    UnknownElement,
    MalformedPrimitive,
    TypeMismatch,
    DepthLimitExceeded { limit: usize },
    DecodeError,
}

impl ErrorKind {
    /// Stable machine-readable name of the kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequiredFieldMissing => "required-field-missing",
            Self::DiscriminatorMismatch { .. } => "discriminator-mismatch",
            Self::AmbiguousChoice { .. } => "ambiguous-choice",
            Self::MissingChoice => "missing-choice",
            Self::MinCardinalityViolation { .. } => "min-cardinality",
            Self::MaxCardinalityViolation { .. } => "max-cardinality",
            Self::UnknownVariantTag { .. } => "unknown-variant-tag",
            Self::UnknownElement => "unknown-element",
            Self::MalformedPrimitive => "malformed-primitive",
            Self::TypeMismatch => "type-mismatch",
            Self::DepthLimitExceeded { .. } => "depth-limit",
            Self::DecodeError => "decode-error",
        }
    }

    /// Whether a decoder must stop when it meets this kind
    pub fn is_decode_fatal(&self) -> bool {
        !matches!(
            self,
            Self::RequiredFieldMissing
                | Self::DiscriminatorMismatch { .. }
                | Self::MissingChoice
                | Self::MinCardinalityViolation { .. }
                | Self::MaxCardinalityViolation { .. }
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single defect annotated with the structural path where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{path}': {detail}")]
pub struct PathedError {
    pub path: String,
    pub kind: ErrorKind,
    pub detail: String,
}

impl PathedError {
    pub fn new(kind: ErrorKind, path: &ElementPath, detail: impl Into<String>) -> Self {
        Self {
            path: path.as_str().to_string(),
            kind,
            detail: detail.into(),
        }
    }

    pub fn required_missing(path: &ElementPath) -> Self {
        Self::new(
            ErrorKind::RequiredFieldMissing,
            path,
            format!("required field '{}' is missing", path),
        )
    }

    pub fn discriminator_mismatch(path: &ElementPath, expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorKind::DiscriminatorMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            path,
            format!("expected '{}', found '{}'", expected, actual),
        )
    }

    pub fn ambiguous_choice(path: &ElementPath, tags: Vec<String>) -> Self {
        let detail = format!("more than one variant present: {}", tags.join(", "));
        Self::new(ErrorKind::AmbiguousChoice { tags }, path, detail)
    }

    pub fn missing_choice(path: &ElementPath, field_name: &str) -> Self {
        Self::new(
            ErrorKind::MissingChoice,
            path,
            format!("one variant of {}[x] is required", field_name),
        )
    }

    pub fn min_cardinality(path: &ElementPath, required_min: u32, actual: usize) -> Self {
        Self::new(
            ErrorKind::MinCardinalityViolation {
                required_min,
                actual,
            },
            path,
            format!("at least {} item(s) required, found {}", required_min, actual),
        )
    }

    pub fn max_cardinality(path: &ElementPath, allowed_max: u32, actual: usize) -> Self {
        Self::new(
            ErrorKind::MaxCardinalityViolation {
                allowed_max,
                actual,
            },
            path,
            format!("at most {} item(s) allowed, found {}", allowed_max, actual),
        )
    }

    pub fn unknown_variant(path: &ElementPath, field_name: &str, tag: &str) -> Self {
        Self::new(
            ErrorKind::UnknownVariantTag {
                tag: tag.to_string(),
            },
            path,
            format!("'{}' is not a declared variant of {}[x]", tag, field_name),
        )
    }

    pub fn malformed_primitive(path: &ElementPath, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPrimitive, path, detail)
    }

    pub fn type_mismatch(path: &ElementPath, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, path, detail)
    }

    pub fn depth_exceeded(path: &ElementPath, limit: usize) -> Self {
        Self::new(
            ErrorKind::DepthLimitExceeded { limit },
            path,
            format!("nesting deeper than {} levels", limit),
        )
    }

    /// Re-root this error under `prefix` (used when a nested document is validated on its own).
    pub fn prefixed(mut self, prefix: &ElementPath) -> Self {
        self.path = prefix.join(&self.path).as_str().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path_and_kind() {
        let err = PathedError::required_missing(&ElementPath::root().field("category"));
        assert_eq!(err.path, "category");
        assert_eq!(
            err.to_string(),
            "required-field-missing at 'category': required field 'category' is missing"
        );
    }

    #[test]
    fn test_fatality() {
        assert!(ErrorKind::DecodeError.is_decode_fatal());
        assert!(ErrorKind::AmbiguousChoice { tags: vec![] }.is_decode_fatal());
        assert!(!ErrorKind::MissingChoice.is_decode_fatal());
        assert!(!ErrorKind::RequiredFieldMissing.is_decode_fatal());
    }

    #[test]
    fn test_prefixed() {
        let err = PathedError::required_missing(&ElementPath::root().field("status"));
        let slot = ElementPath::root().field("contained").index(1);
        assert_eq!(err.prefixed(&slot).path, "contained[1].status");
    }
}
