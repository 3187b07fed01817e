use crate::{ConfigError, Step, ValidationPlan};
use serde_json::Value;
use std::sync::Arc;
use tessera_format::Codec;
use tessera_models::{
    Element, ElementPath, ErrorKind, FieldShape, FieldSlot, Node, OpaqueResource, PathedError,
    ResourceTypeResolver, SchemaSet, TypeDescriptor, TypeRef, EXTENSION_TYPE,
};
use tracing::{debug, trace, warn};

/// Resolver shared by every run of a validator
pub type SharedResolver = Arc<dyn ResourceTypeResolver + Send + Sync>;

/// Reusable validator - owns plan, schemas and the codec used for wire input
///
/// Validation only reads the graph, so one validator (and one graph) can be shared across
/// threads.
pub struct Validator {
    plan: ValidationPlan,
    codec: Codec,
    resolver: Option<SharedResolver>,
}

impl Validator {
    pub fn new(plan: ValidationPlan, schemas: Arc<SchemaSet>) -> Self {
        let codec = Codec::new(schemas).with_options(plan.decode);
        Self {
            plan,
            codec,
            resolver: None,
        }
    }

    pub fn from_config(
        config: &crate::ValidatorConfig,
        schemas: Arc<SchemaSet>,
    ) -> Result<Self, ConfigError> {
        let plan = config.compile()?;
        Ok(Self::new(plan, schemas))
    }

    /// Resolver consulted for opaque resource slots when the plan resolves contained
    /// resources
    pub fn with_resolver(mut self, resolver: SharedResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Walk `node` and report every defect found.
    pub fn validate(&self, node: &Node) -> Result<(), Vec<PathedError>> {
        self.validate_outcome(node).into_result()
    }

    pub fn validate_outcome(&self, node: &Node) -> ValidationOutcome {
        self.run(node, Vec::new())
    }

    pub fn validate_batch(&self, nodes: &[Node]) -> Vec<ValidationOutcome> {
        nodes.iter().map(|n| self.validate_outcome(n)).collect()
    }

    /// Decode `bytes` as `type_name` and validate the result.
    ///
    /// A document that cannot be decoded yields its single decode error; otherwise every
    /// validation defect is returned.
    pub fn validate_json(
        &self,
        bytes: &[u8],
        type_name: &str,
    ) -> Result<Node, Vec<PathedError>> {
        let (node, outcome) = self.validate_json_outcome(bytes, type_name);
        outcome.into_result()?;
        node.ok_or_else(Vec::new)
    }

    /// Like `validate_json`, keeping lenient-mode warnings in the outcome
    pub fn validate_json_outcome(
        &self,
        bytes: &[u8],
        type_name: &str,
    ) -> (Option<Node>, ValidationOutcome) {
        let Some(schema) = self.codec.schemas().get(type_name).cloned() else {
            let error = PathedError::type_mismatch(
                &ElementPath::root(),
                format!("no schema registered for type {}", type_name),
            );
            return (None, ValidationOutcome::from_errors(Some(type_name), vec![error]));
        };

        let decoded = serde_json::from_slice::<Value>(bytes)
            .map_err(tessera_format::DecodeError::from)
            .and_then(|value| self.codec.decode_value(&value, &schema));

        match decoded {
            Ok(decoded) => {
                let outcome = self.run(&decoded.node, decoded.warnings);
                (Some(decoded.node), outcome)
            }
            Err(err) => {
                debug!(type_name, error = %err, "document failed to decode");
                let outcome =
                    ValidationOutcome::from_errors(Some(type_name), vec![err.into_pathed()]);
                (None, outcome)
            }
        }
    }

    /// Walk `node`; decode `warnings` are recorded first and count toward `max_issues`.
    fn run(&self, node: &Node, warnings: Vec<PathedError>) -> ValidationOutcome {
        let mut run = ValidationRun::new(&self.plan, &self.codec, self.resolver.as_deref());
        for warning in warnings {
            run.warn(warning);
        }
        run.execute(node)
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn schemas(&self) -> &Arc<SchemaSet> {
        self.codec.schemas()
    }
}

/// Short-lived validation execution
struct ValidationRun<'a> {
    plan: &'a ValidationPlan,
    codec: &'a Codec,
    schemas: &'a SchemaSet,
    resolver: Option<&'a (dyn ResourceTypeResolver + Send + Sync)>,
    issues: Vec<ValidationIssue>,
    truncated: bool,
}

impl<'a> ValidationRun<'a> {
    fn new(
        plan: &'a ValidationPlan,
        codec: &'a Codec,
        resolver: Option<&'a (dyn ResourceTypeResolver + Send + Sync)>,
    ) -> Self {
        Self {
            plan,
            codec,
            schemas: codec.schemas(),
            resolver,
            issues: Vec::new(),
            truncated: false,
        }
    }

    fn execute(mut self, node: &Node) -> ValidationOutcome {
        debug!(type_name = node.type_name(), "validating node graph");
        let schemas = self.schemas;

        match schemas.get(node.type_name()) {
            Some(schema) => self.visit_node(node, schema, &ElementPath::root(), 0),
            None => self.report(PathedError::type_mismatch(
                &ElementPath::root(),
                format!("no schema registered for type {}", node.type_name()),
            )),
        }

        let outcome = ValidationOutcome {
            resource_type: Some(node.type_name().to_string()),
            valid: !self.has_errors(),
            issues: self.issues,
            truncated: self.truncated,
        };
        debug!(
            type_name = node.type_name(),
            errors = outcome.error_count(),
            truncated = outcome.truncated,
            "validation finished"
        );
        outcome
    }

    /// Enter → local checks → descend
    fn visit_node(
        &mut self,
        node: &Node,
        schema: &TypeDescriptor,
        path: &ElementPath,
        depth: usize,
    ) {
        // Once an issue has been dropped nothing below can change the outcome
        if self.truncated {
            return;
        }
        if depth > self.plan.max_depth {
            self.report(PathedError::depth_exceeded(path, self.plan.max_depth));
            return;
        }
        trace!(type_name = schema.name(), path = %path, depth, "enter node");

        let mut local = Vec::new();
        for step in &self.plan.steps {
            self.execute_step(step, node, schema, path, &mut local);
        }
        for error in local {
            self.report(error);
        }

        self.descend(node, schema, path, depth);
    }

    fn execute_step(
        &self,
        step: &Step,
        node: &Node,
        schema: &TypeDescriptor,
        path: &ElementPath,
        errors: &mut Vec<PathedError>,
    ) {
        use crate::steps;

        match step {
            Step::Structure => steps::structure::validate_structure(node, schema, path, errors),
            Step::Required => steps::required::validate_required(node, schema, path, errors),
            Step::Choices => steps::choices::validate_choices(node, schema, path, errors),
            Step::Cardinality => {
                steps::cardinality::validate_cardinality(node, schema, path, errors)
            }
            Step::Primitives(plan) => {
                steps::primitives::validate_primitives(node, schema, plan, path, errors)
            }
        }
    }

    fn descend(&mut self, node: &Node, schema: &TypeDescriptor, path: &ElementPath, depth: usize) {
        for field in schema.fields() {
            let Some(slot) = node.get(&field.name) else {
                continue;
            };
            let field_path = path.field(&field.name);

            match (&field.shape, slot) {
                (FieldShape::Single(kind), FieldSlot::Single(element)) => {
                    self.visit_element(element, kind, &field_path, depth)
                }
                (FieldShape::Single(kind), FieldSlot::List(items)) => {
                    for (index, item) in items.iter().enumerate() {
                        self.visit_element(item, kind, &field_path.index(index), depth);
                    }
                }
                (FieldShape::Choice(declared), FieldSlot::Choice(choice)) => {
                    if let Some(kind) = declared.resolve(choice.tag()) {
                        let payload_path = path.field(&declared.wire_key(choice.tag()));
                        self.visit_element(choice.payload(), kind, &payload_path, depth);
                    }
                }
                // Shape mismatches were reported by the structure step
                _ => {}
            }
        }
    }

    fn visit_element(
        &mut self,
        element: &Element,
        kind: &TypeRef,
        path: &ElementPath,
        depth: usize,
    ) {
        let schemas = self.schemas;

        match (element, kind) {
            (Element::Node(child), TypeRef::Complex(type_name))
                if child.type_name() == type_name.as_str() =>
            {
                match schemas.get(type_name) {
                    Some(schema) => self.visit_node(child, schema, path, depth + 1),
                    None => self.report(PathedError::type_mismatch(
                        path,
                        format!("no schema registered for type {}", type_name),
                    )),
                }
            }
            (Element::Primitive(cell), TypeRef::Primitive(_)) => {
                let extension_path = path.field("extension");
                for (index, extension) in cell.extension.iter().enumerate() {
                    let item_path = extension_path.index(index);
                    match schemas.get(EXTENSION_TYPE) {
                        Some(schema) if extension.type_name() == EXTENSION_TYPE => {
                            self.visit_node(extension, schema, &item_path, depth + 1)
                        }
                        _ => self.report(PathedError::type_mismatch(
                            &item_path,
                            format!("expected Extension but found {}", extension.type_name()),
                        )),
                    }
                }
            }
            (Element::Resource(slot), TypeRef::Resource) => self.visit_contained(slot, path, depth),
            _ => {}
        }
    }

    /// Resolve an opaque slot and walk the result as if it were part of this graph.
    fn visit_contained(&mut self, slot: &OpaqueResource, path: &ElementPath, depth: usize) {
        if !self.plan.contained.resolve || self.truncated {
            return;
        }
        let Some(resolver) = self.resolver else {
            return;
        };
        let Some(schema) = slot
            .discriminator()
            .and_then(|name| resolver.resolve_resource_type(name))
        else {
            trace!(path = %path, "contained resource not resolvable, left opaque");
            return;
        };

        match self.codec.decode_fragment(slot, &schema) {
            Ok(decoded) => {
                for warning in decoded.warnings {
                    self.warn(warning.prefixed(path));
                }
                self.visit_node(&decoded.node, &schema, path, depth + 1);
            }
            Err(err) => self.report(err.into_pathed().prefixed(path)),
        }
    }

    fn report(&mut self, error: PathedError) {
        self.push(ValidationIssue::error(error));
    }

    fn warn(&mut self, error: PathedError) {
        warn!(path = %error.path, kind = %error.kind, "{}", error.detail);
        self.push(ValidationIssue::warning(error));
    }

    /// Record `issue` unless the budget is spent; a refused issue marks the run truncated.
    fn push(&mut self, issue: ValidationIssue) {
        if self.is_done() {
            self.truncated = true;
            return;
        }
        self.issues.push(issue);
    }

    /// True once the plan's issue budget (or fail-fast) says to stop
    fn is_done(&self) -> bool {
        self.issues.len() >= self.plan.max_issues || (self.plan.fail_fast && self.has_errors())
    }

    fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }
}

/// Validation result for a single node graph
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub resource_type: Option<String>,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// At least one issue was dropped because of `max_issues` or fail-fast
    pub truncated: bool,
}

impl ValidationOutcome {
    pub fn success(resource_type: Option<String>) -> Self {
        Self {
            resource_type,
            valid: true,
            issues: Vec::new(),
            truncated: false,
        }
    }

    fn from_errors(resource_type: Option<&str>, errors: Vec<PathedError>) -> Self {
        Self {
            resource_type: resource_type.map(str::to_string),
            valid: errors.is_empty(),
            issues: errors.into_iter().map(ValidationIssue::error).collect(),
            truncated: false,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Errors only, in the order they were found
    pub fn errors(&self) -> impl Iterator<Item = &PathedError> {
        self.issues.iter().filter(|i| i.is_error()).map(|i| &i.error)
    }

    pub fn into_result(self) -> Result<(), Vec<PathedError>> {
        if self.valid {
            return Ok(());
        }
        Err(self
            .issues
            .into_iter()
            .filter(ValidationIssue::is_error)
            .map(|i| i.error)
            .collect())
    }

    pub fn to_operation_outcome(&self) -> Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues.iter().map(|i| i.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub error: PathedError,
}

impl ValidationIssue {
    pub fn error(error: PathedError) -> Self {
        Self {
            severity: IssueSeverity::Error,
            error,
        }
    }

    pub fn warning(error: PathedError) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }

    pub fn code(&self) -> IssueCode {
        IssueCode::from(&self.error.kind)
    }

    fn to_json(&self) -> Value {
        let mut issue = serde_json::json!({
            "severity": self.severity.to_string().to_lowercase(),
            "code": self.code().to_string(),
            "diagnostics": self.error.detail,
            "details": { "text": self.error.kind.code() },
        });

        if !self.error.path.is_empty() {
            issue["expression"] = serde_json::json!([self.error.path]);
        }

        issue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    Invalid,
    Structure,
    Required,
    Value,
    Invariant,
    NotSupported,
    MultipleMatches,
    TooCostly,
}

impl From<&ErrorKind> for IssueCode {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::RequiredFieldMissing | ErrorKind::MissingChoice => Self::Required,
            ErrorKind::DiscriminatorMismatch { .. } => Self::Invariant,
            ErrorKind::AmbiguousChoice { .. } => Self::MultipleMatches,
            ErrorKind::MinCardinalityViolation { .. }
            | ErrorKind::MaxCardinalityViolation { .. }
            | ErrorKind::UnknownElement
            | ErrorKind::TypeMismatch => Self::Structure,
            ErrorKind::UnknownVariantTag { .. } => Self::NotSupported,
            ErrorKind::MalformedPrimitive => Self::Value,
            ErrorKind::DepthLimitExceeded { .. } => Self::TooCostly,
            ErrorKind::DecodeError => Self::Invalid,
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Structure => "structure",
            Self::Required => "required",
            Self::Value => "value",
            Self::Invariant => "invariant",
            Self::NotSupported => "not-supported",
            Self::MultipleMatches => "multiple-matches",
            Self::TooCostly => "too-costly",
        };
        write!(f, "{}", s)
    }
}
