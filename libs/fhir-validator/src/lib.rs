//! Schema-driven validation of node graphs
//!
//! The validator walks a [`tessera_models::Node`] graph against its registered schemas and
//! reports every defect it finds in one pass, each qualified with the path where it occurred.
//!
//! Per node the checks run in a fixed order before the walk descends into child nodes:
//! structure, required fields and discriminators, choices, cardinality, primitive lexical
//! forms. Traversal is bounded by `max_depth`; `max_issues` and `fail_fast` stop it early.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_models::{FieldDescriptor, Node, PrimitiveKind, SchemaSet, TypeDescriptor};
//! use tessera_validator::{Preset, Validator, ValidatorConfig};
//!
//! let mut schemas = SchemaSet::new();
//! schemas
//!     .register(
//!         TypeDescriptor::resource("Binary")
//!             .field(FieldDescriptor::primitive("contentType", PrimitiveKind::Code).required())
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let config = ValidatorConfig::preset(Preset::Strict);
//! let validator = Validator::from_config(&config, Arc::new(schemas)).unwrap();
//!
//! let errors = validator.validate(&Node::resource("Binary")).unwrap_err();
//! assert_eq!(errors[0].path, "contentType");
//! ```

mod config;
mod error;
mod plan;
mod steps;
mod validator;

pub use config::{
    ContainedConfig, ContainedMode, DecodingConfig, ExecConfig, Preset, PrimitivesConfig,
    PrimitivesMode, ValidatorConfig, ValidatorConfigBuilder,
};
pub use error::ConfigError;
pub use plan::{ContainedPlan, PrimitivesPlan, Step, ValidationPlan};
pub use validator::{
    IssueCode, IssueSeverity, SharedResolver, ValidationIssue, ValidationOutcome, Validator,
};
