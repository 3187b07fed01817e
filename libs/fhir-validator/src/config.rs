//! Validator configuration
//!
//! A `ValidatorConfig` is plain data (buildable in code, loadable from YAML) that is compiled
//! once into an immutable [`ValidationPlan`].
//!
//! ```yaml
//! exec:
//!   fail_fast: false
//!   max_issues: 500
//!   max_depth: 64
//! decoding:
//!   unknown_elements: Warn
//! primitives:
//!   mode: Lexical
//! contained:
//!   mode: Resolve
//! ```

use crate::plan::{ContainedPlan, PrimitivesPlan, Step, ValidationPlan};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_format::{DecodeOptions, UnknownElementPolicy, DEFAULT_MAX_DEPTH};

/// Named starting points for common uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Reject unknown keys, check primitives, leave contained resources opaque
    Strict,
    /// Like `Strict` but unknown keys are only warnings
    Lenient,
    /// `Strict` plus recursive validation of resolvable contained resources
    Thorough,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub exec: ExecConfig,
    pub decoding: DecodingConfig,
    pub primitives: PrimitivesConfig,
    pub contained: ContainedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Stop at the first error instead of aggregating
    pub fail_fast: bool,
    /// Stop once this many issues have been collected
    pub max_issues: Option<usize>,
    /// Deepest node nesting that is still walked
    pub max_depth: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_issues: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingConfig {
    pub unknown_elements: UnknownElementPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitivesMode {
    Off,
    /// Re-check every primitive value against its declared kind
    #[default]
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitivesConfig {
    pub mode: PrimitivesMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContainedMode {
    /// Treat opaque resource slots as valid by construction
    #[default]
    Skip,
    /// Decode and validate slots whose discriminator the resolver knows
    Resolve,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainedConfig {
    pub mode: ContainedMode,
}

impl ValidatorConfig {
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::default();
        match preset {
            Preset::Strict => {}
            Preset::Lenient => config.decoding.unknown_elements = UnknownElementPolicy::Warn,
            Preset::Thorough => config.contained.mode = ContainedMode::Resolve,
        }
        config
    }

    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Decoder settings used when validating wire input
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            unknown_elements: self.decoding.unknown_elements,
            max_depth: self.exec.max_depth,
        }
    }

    /// Check the configuration and turn it into an executable plan.
    pub fn compile(&self) -> Result<ValidationPlan, ConfigError> {
        if self.exec.max_depth == 0 {
            return Err(ConfigError::InvalidConfig(
                "exec.max_depth must be at least 1".to_string(),
            ));
        }
        if self.exec.max_issues == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "exec.max_issues must be at least 1 when set".to_string(),
            ));
        }

        let mut steps = vec![Step::Structure, Step::Required, Step::Choices, Step::Cardinality];
        if self.primitives.mode != PrimitivesMode::Off {
            steps.push(Step::Primitives(PrimitivesPlan::from(&self.primitives)));
        }

        Ok(ValidationPlan {
            steps,
            contained: ContainedPlan::from(&self.contained),
            fail_fast: self.exec.fail_fast,
            max_issues: self.exec.max_issues.unwrap_or(usize::MAX),
            max_depth: self.exec.max_depth,
            decode: self.decode_options(),
        })
    }
}

#[derive(Debug, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    /// Replace everything set so far with the preset's values
    pub fn preset(mut self, preset: Preset) -> Self {
        self.config = ValidatorConfig::preset(preset);
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.exec.fail_fast = fail_fast;
        self
    }

    pub fn max_issues(mut self, max_issues: usize) -> Self {
        self.config.exec.max_issues = Some(max_issues);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.exec.max_depth = max_depth;
        self
    }

    pub fn unknown_elements(mut self, policy: UnknownElementPolicy) -> Self {
        self.config.decoding.unknown_elements = policy;
        self
    }

    pub fn primitives_mode(mut self, mode: PrimitivesMode) -> Self {
        self.config.primitives.mode = mode;
        self
    }

    pub fn contained_mode(mut self, mode: ContainedMode) -> Self {
        self.config.contained.mode = mode;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}
