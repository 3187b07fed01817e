//! Primitive value cells
//!
//! A primitive carries an optional scalar plus the `id`/`extension` side channel that
//! travels under the `_name` key on the wire. Absent and empty are different things:
//! `Primitive { value: Some(String("")) }` is a present empty string, while a field that
//! was never on the wire has no cell at all.

use crate::node::Node;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt;

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-.]{1,64}$").expect("valid id pattern"));
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s]+(\s[^\s]+)*$").expect("valid code pattern"));
static OID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^urn:oid:[0-2](\.(0|[1-9][0-9]*))+$").expect("valid oid pattern")
});
static URI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S*$").expect("valid uri pattern"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
    )
    .expect("valid date pattern")
});
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
    )
    .expect("valid dateTime pattern")
});
static INSTANT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
    )
    .expect("valid instant pattern")
});
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?$")
        .expect("valid time pattern")
});

/// A single scalar held by a primitive cell
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    /// Kept as a JSON number so the lexical form (`1.50`) survives a round-trip
    Decimal(Number),
    String(String),
}

impl Scalar {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Boolean(_) => ScalarType::Boolean,
            Self::Integer(_) => ScalarType::Integer,
            Self::Decimal(_) => ScalarType::Decimal,
            Self::String(_) => ScalarType::String,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Self::Decimal(value)
    }
}

/// In-memory scalar representation used by a primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Boolean,
    Integer,
    Decimal,
    String,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
        };
        f.write_str(s)
    }
}

/// The FHIR primitive data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    UnsignedInt,
    PositiveInt,
    Integer64,
    Decimal,
    String,
    Code,
    Id,
    Markdown,
    Uri,
    Url,
    Canonical,
    Oid,
    Uuid,
    Date,
    DateTime,
    Instant,
    Time,
    Base64Binary,
    Xhtml,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 21] = [
        Self::Boolean,
        Self::Integer,
        Self::UnsignedInt,
        Self::PositiveInt,
        Self::Integer64,
        Self::Decimal,
        Self::String,
        Self::Code,
        Self::Id,
        Self::Markdown,
        Self::Uri,
        Self::Url,
        Self::Canonical,
        Self::Oid,
        Self::Uuid,
        Self::Date,
        Self::DateTime,
        Self::Instant,
        Self::Time,
        Self::Base64Binary,
        Self::Xhtml,
    ];

    /// Type code as written in schemas (`dateTime`)
    pub fn type_code(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::UnsignedInt => "unsignedInt",
            Self::PositiveInt => "positiveInt",
            Self::Integer64 => "integer64",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Code => "code",
            Self::Id => "id",
            Self::Markdown => "markdown",
            Self::Uri => "uri",
            Self::Url => "url",
            Self::Canonical => "canonical",
            Self::Oid => "oid",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Instant => "instant",
            Self::Time => "time",
            Self::Base64Binary => "base64Binary",
            Self::Xhtml => "xhtml",
        }
    }

    /// Variant tag used in choice keys (`valueDateTime`)
    pub fn tag(&self) -> String {
        let code = self.type_code();
        let mut chars = code.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    pub fn from_type_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.type_code() == code)
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Boolean => ScalarType::Boolean,
            Self::Integer | Self::UnsignedInt | Self::PositiveInt | Self::Integer64 => {
                ScalarType::Integer
            }
            Self::Decimal => ScalarType::Decimal,
            _ => ScalarType::String,
        }
    }

    /// Parse a wire value of this kind. Errors carry a human-readable reason.
    pub fn from_json(&self, value: &Value) -> Result<Scalar, String> {
        let scalar = match (self, value) {
            (Self::Boolean, Value::Bool(b)) => Scalar::Boolean(*b),
            (Self::Integer64, Value::String(s)) => s
                .parse::<i64>()
                .map(Scalar::Integer)
                .map_err(|_| format!("'{}' is not a valid integer64", s))?,
            (Self::Integer | Self::UnsignedInt | Self::PositiveInt, Value::Number(n)) => n
                .as_i64()
                .map(Scalar::Integer)
                .ok_or_else(|| format!("{} is not a whole number", n))?,
            (Self::Decimal, Value::Number(n)) => Scalar::Decimal(n.clone()),
            (kind, Value::String(s)) if kind.scalar_type() == ScalarType::String => {
                Scalar::String(s.clone())
            }
            (kind, other) => {
                return Err(format!(
                    "expected {} for {}, found {}",
                    kind.wire_type(),
                    kind.type_code(),
                    json_type_name(other)
                ))
            }
        };
        self.check(&scalar)?;
        Ok(scalar)
    }

    /// Render a scalar as its wire value
    pub fn to_json(&self, scalar: &Scalar) -> Value {
        match (self, scalar) {
            (Self::Integer64, Scalar::Integer(i)) => Value::String(i.to_string()),
            (_, Scalar::Boolean(b)) => Value::Bool(*b),
            (_, Scalar::Integer(i)) => Value::Number((*i).into()),
            (_, Scalar::Decimal(n)) => Value::Number(n.clone()),
            (_, Scalar::String(s)) => Value::String(s.clone()),
        }
    }

    /// Check that `scalar` is representable as this kind and satisfies its lexical rules.
    pub fn check(&self, scalar: &Scalar) -> Result<(), String> {
        if scalar.scalar_type() != self.scalar_type() {
            return Err(format!(
                "{} value stored for {}",
                scalar.scalar_type(),
                self.type_code()
            ));
        }

        match (self, scalar) {
            (Self::Integer, Scalar::Integer(i)) if i32::try_from(*i).is_err() => {
                Err(format!("{} is out of range for integer", i))
            }
            (Self::UnsignedInt, Scalar::Integer(i)) if *i < 0 || *i > i32::MAX as i64 => {
                Err(format!("{} is out of range for unsignedInt", i))
            }
            (Self::PositiveInt, Scalar::Integer(i)) if *i < 1 || *i > i32::MAX as i64 => {
                Err(format!("{} is out of range for positiveInt", i))
            }
            (Self::Decimal, Scalar::Decimal(n)) if n.as_f64().map_or(true, |f| !f.is_finite()) => {
                Err(format!("{} is not a finite decimal", n))
            }
            (kind, Scalar::String(s)) => kind.check_lexical(s),
            _ => Ok(()),
        }
    }

    fn check_lexical(&self, s: &str) -> Result<(), String> {
        let ok = match self {
            Self::Code => CODE_RE.is_match(s),
            Self::Id => ID_RE.is_match(s),
            Self::Uri | Self::Url | Self::Canonical => URI_RE.is_match(s),
            Self::Oid => OID_RE.is_match(s),
            Self::Uuid => s
                .strip_prefix("urn:uuid:")
                .is_some_and(|u| uuid::Uuid::parse_str(u).is_ok()),
            Self::Date => DATE_RE.is_match(s) && calendar_date_ok(s),
            Self::DateTime => DATE_TIME_RE.is_match(s) && calendar_date_ok(s),
            Self::Instant => INSTANT_RE.is_match(s) && calendar_date_ok(s),
            Self::Time => TIME_RE.is_match(s),
            Self::Base64Binary => {
                let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .is_ok()
            }
            _ => true,
        };

        if ok {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid {}", s, self.type_code()))
        }
    }

    fn wire_type(&self) -> &'static str {
        match (self, self.scalar_type()) {
            (Self::Integer64, _) => "a string",
            (_, ScalarType::Boolean) => "a boolean",
            (_, ScalarType::Integer | ScalarType::Decimal) => "a number",
            (_, ScalarType::String) => "a string",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_code())
    }
}

/// Full dates must exist on the calendar; the pattern alone accepts 2023-02-30.
fn calendar_date_ok(s: &str) -> bool {
    match s.get(..10) {
        Some(day) if day.len() == 10 && day.as_bytes()[4] == b'-' && day.as_bytes()[7] == b'-' => {
            chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok()
        }
        _ => true,
    }
}

/// JSON type name used in decode diagnostics
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A primitive value cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Primitive {
    /// Element id from the `_name` side channel
    pub id: Option<String>,

    pub value: Option<Scalar>,

    /// Extensions from the `_name` side channel, each an `Extension` node
    pub extension: Vec<Node>,
}

impl Primitive {
    pub fn new(value: impl Into<Scalar>) -> Self {
        Self {
            id: None,
            value: Some(value.into()),
            extension: Vec::new(),
        }
    }

    /// A cell with neither value nor side channel
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: Node) -> Self {
        self.extension.push(extension);
        self
    }

    /// True when the cell carries nothing at all
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && !self.has_metadata()
    }

    /// True when the `_name` side channel has something to say
    pub fn has_metadata(&self) -> bool {
        self.id.is_some() || !self.extension.is_empty()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Scalar::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(Scalar::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_ref().and_then(Scalar::as_i64)
    }
}
