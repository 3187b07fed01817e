//! Codec errors

use tessera_models::{ErrorKind, PathedError};
use thiserror::Error;

/// Failure to turn wire input into a node graph.
///
/// Decoding stops at the first of these; a malformed document never yields a partial graph.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(PathedError),

    #[error("No schema registered for type {0}")]
    UnknownType(String),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(err) => err.kind.clone(),
            Self::Json(_) | Self::UnknownType(_) => ErrorKind::DecodeError,
        }
    }

    /// Path of the offending element, empty for document-level failures
    pub fn path(&self) -> &str {
        match self {
            Self::Invalid(err) => &err.path,
            Self::Json(_) | Self::UnknownType(_) => "",
        }
    }

    /// Flatten into the shared defect shape
    pub fn into_pathed(self) -> PathedError {
        match self {
            Self::Invalid(err) => err,
            other => PathedError {
                path: String::new(),
                kind: ErrorKind::DecodeError,
                detail: other.to_string(),
            },
        }
    }
}

impl From<PathedError> for DecodeError {
    fn from(err: PathedError) -> Self {
        Self::Invalid(err)
    }
}

/// Failure to render a node graph that does not fit its schema.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("No schema registered for type {0}")]
    UnknownType(String),

    #[error("Field '{field}' is not declared on type {type_name}")]
    UndeclaredField { type_name: String, field: String },

    #[error("Cannot encode '{path}': {detail}")]
    ShapeMismatch { path: String, detail: String },

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EncodeError {
    pub(crate) fn shape(path: &tessera_models::ElementPath, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_models::ElementPath;

    #[test]
    fn test_kind_and_path() {
        let err = DecodeError::from(PathedError::malformed_primitive(
            &ElementPath::root().field("sequence"),
            "expected a number",
        ));
        assert_eq!(err.kind(), ErrorKind::MalformedPrimitive);
        assert_eq!(err.path(), "sequence");
    }

    #[test]
    fn test_syntax_error_flattens_to_decode_error() {
        let syntax = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DecodeError::from(syntax);
        assert_eq!(err.kind(), ErrorKind::DecodeError);

        let pathed = err.into_pathed();
        assert_eq!(pathed.path, "");
        assert!(pathed.detail.starts_with("JSON parse error"));
    }
}
