//! Decoder settings

use serde::{Deserialize, Serialize};

/// Nesting depth at which decoding gives up
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with a wire key that no declared field or variant accounts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownElementPolicy {
    /// Abort decoding with `UnknownElement` / `UnknownVariantTag`
    #[default]
    Reject,
    /// Log the key, report it as a warning and skip it
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub unknown_elements: UnknownElementPolicy,
    /// Maximum number of nested nodes below the root
    pub max_depth: usize,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            unknown_elements: UnknownElementPolicy::Warn,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.unknown_elements == UnknownElementPolicy::Reject
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            unknown_elements: UnknownElementPolicy::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
