use crate::{ContainedConfig, ContainedMode, PrimitivesConfig, PrimitivesMode};
use tessera_format::DecodeOptions;

/// Compiled validation plan - per-node checks plus traversal limits
#[derive(Debug, Clone)]
pub struct ValidationPlan {
    /// Checks applied to every node, in order, before descending into its children
    pub steps: Vec<Step>,
    pub contained: ContainedPlan,
    pub fail_fast: bool,
    pub max_issues: usize,
    pub max_depth: usize,
    /// Used by `Validator::validate_json`
    pub decode: DecodeOptions,
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Undeclared fields and slots whose shape differs from the schema
    Structure,
    /// Required fields and fixed discriminators
    Required,
    /// Exactly one declared variant per choice field
    Choices,
    /// Declared list bounds
    Cardinality,
    Primitives(PrimitivesPlan),
}

// ============================================================================
// Step Plans
// ============================================================================

#[derive(Debug, Clone)]
pub struct PrimitivesPlan {
    pub lexical: bool,
}

impl From<&PrimitivesConfig> for PrimitivesPlan {
    fn from(cfg: &PrimitivesConfig) -> Self {
        Self {
            lexical: cfg.mode == PrimitivesMode::Lexical,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContainedPlan {
    /// Resolve opaque slots through the validator's resolver and walk the result
    pub resolve: bool,
}

impl From<&ContainedConfig> for ContainedPlan {
    fn from(cfg: &ContainedConfig) -> Self {
        Self {
            resolve: cfg.mode == ContainedMode::Resolve,
        }
    }
}
