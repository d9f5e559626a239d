//! Declarative payload schemas and the validator that enforces them.
//!
//! Every request and response record carries a static table of [`FieldSpec`]s
//! through the [`Schema`] trait. The validator walks a raw JSON value against
//! that table and reports *every* violation it finds rather than stopping at
//! the first one, so a client learns about all offending fields in a single
//! round trip.
//!
//! Validation never mutates its input and has no side effects, so running it
//! twice on the same value yields the same outcome.
//!
//! # Example
//!
//! ```
//! use astroshield_lib::schema::{parse, RuleKind};
//! use astroshield_lib::EncryptRequest;
//! use serde_json::json;
//!
//! let failure = parse::<EncryptRequest>(&json!({ "value": "" })).unwrap_err();
//! assert_eq!(failure.violations()[0].field, "value");
//! assert_eq!(failure.violations()[0].code, RuleKind::MinLength);
//! assert_eq!(failure.violations()[0].rule, "min length 1");
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name used for violations that concern the payload as a whole.
pub const BODY_FIELD: &str = "body";

/// JSON type expected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    /// Name used in violation messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }
}

/// Constraints declared for a single payload field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub name: &'static str,
    /// Expected JSON type.
    pub field_type: FieldType,
    /// Whether the field must be present.
    pub required: bool,
    /// Minimum length in characters (strings only).
    pub min_length: Option<usize>,
    /// Inclusive numeric bounds (numbers only).
    pub range: Option<(f64, f64)>,
    /// Expected type of each element (arrays only).
    pub item_type: Option<FieldType>,
    /// Field table for an object, or for each object element of an array.
    pub nested: Option<&'static [FieldSpec]>,
}

impl FieldSpec {
    /// Declare a field that must be present.
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
            min_length: None,
            range: None,
            item_type: None,
            nested: None,
        }
    }

    /// Declare a field that may be omitted or `null`.
    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    pub const fn min_length(self, min: usize) -> Self {
        Self {
            min_length: Some(min),
            ..self
        }
    }

    pub const fn range(self, min: f64, max: f64) -> Self {
        Self {
            range: Some((min, max)),
            ..self
        }
    }

    pub const fn items(self, item_type: FieldType) -> Self {
        Self {
            item_type: Some(item_type),
            ..self
        }
    }

    pub const fn nested(self, fields: &'static [FieldSpec]) -> Self {
        Self {
            nested: Some(fields),
            ..self
        }
    }
}

/// A payload record with a declared field table.
pub trait Schema {
    /// Field constraints for this record, keyed by wire name.
    const FIELDS: &'static [FieldSpec];
}

/// Machine-readable identifier of a violated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A required field is missing.
    Required,
    /// The field has the wrong JSON type.
    Type,
    /// A string is shorter than its declared minimum.
    MinLength,
    /// A number lies outside its declared bounds.
    Range,
    /// The body could not be decoded as JSON.
    Json,
}

/// One violated rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the offending field (`analysisResult.predictions[0].probability`).
    pub field: String,
    /// Rule identifier.
    pub code: RuleKind,
    /// Human-readable rule description, e.g. `min length 1`.
    pub rule: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, code: RuleKind, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            rule: rule.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, RuleKind::Required, "field required")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: FieldType) -> Self {
        Self::new(
            field,
            RuleKind::Type,
            format!("expected {}", expected.name()),
        )
    }

    pub fn min_length(field: impl Into<String>, min: usize) -> Self {
        Self::new(field, RuleKind::MinLength, format!("min length {}", min))
    }

    pub fn range(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(
            field,
            RuleKind::Range,
            format!("must be between {} and {}", min, max),
        )
    }

    pub fn json(message: impl fmt::Display) -> Self {
        Self::new(BODY_FIELD, RuleKind::Json, format!("invalid JSON: {}", message))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.rule)
    }
}

/// Every violation found while validating one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(violation: Violation) -> Self {
        Self::new(vec![violation])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(Violation::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

/// Check a raw value against a field table, returning every violation.
///
/// The value itself must be a JSON object; anything else is reported as a
/// type violation on [`BODY_FIELD`].
pub fn check_fields(value: &Value, fields: &[FieldSpec]) -> Vec<Violation> {
    let mut violations = Vec::new();
    match value.as_object() {
        Some(map) => check_object(map, fields, "", &mut violations),
        None => violations.push(Violation::type_mismatch(BODY_FIELD, FieldType::Object)),
    }
    violations
}

/// Validate a raw value and decode it into a typed record.
pub fn parse<T>(raw: &Value) -> Result<T, ValidationFailure>
where
    T: Schema + DeserializeOwned,
{
    let violations = check_fields(raw, T::FIELDS);
    if !violations.is_empty() {
        return Err(ValidationFailure::new(violations));
    }

    // `null` on an optional field means "absent" so serde defaults apply.
    let mut value = raw.clone();
    if let Some(map) = value.as_object_mut() {
        for spec in T::FIELDS.iter().filter(|spec| !spec.required) {
            if map.get(spec.name).is_some_and(Value::is_null) {
                map.remove(spec.name);
            }
        }
    }

    // The field table already guarantees the shape; a decode error here means
    // the table and the struct disagree.
    serde_json::from_value(value).map_err(|e| {
        ValidationFailure::single(Violation::new(BODY_FIELD, RuleKind::Type, e.to_string()))
    })
}

/// Decode a JSON body and validate it as `T`.
///
/// An absent or blank body is reported as a missing `body`.
pub fn parse_body<T>(body: Option<&str>) -> Result<T, ValidationFailure>
where
    T: Schema + DeserializeOwned,
{
    let text = match body.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ValidationFailure::single(Violation::required(BODY_FIELD))),
    };

    let raw: Value =
        serde_json::from_str(text).map_err(|e| ValidationFailure::single(Violation::json(e)))?;
    parse(&raw)
}

/// Validate an outgoing record against its own field table.
pub fn check<T>(record: &T) -> Result<(), ValidationFailure>
where
    T: Schema + Serialize,
{
    let value = serde_json::to_value(record).map_err(|e| {
        ValidationFailure::single(Violation::new(BODY_FIELD, RuleKind::Type, e.to_string()))
    })?;

    let violations = check_fields(&value, T::FIELDS);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::new(violations))
    }
}

fn check_object(
    map: &Map<String, Value>,
    fields: &[FieldSpec],
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    for spec in fields {
        let path = join_path(prefix, spec.name);

        let Some(value) = map.get(spec.name) else {
            if spec.required {
                out.push(Violation::required(path));
            }
            continue;
        };

        if value.is_null() && !spec.required {
            continue;
        }

        check_value(value, spec, &path, out);
    }
}

fn check_value(value: &Value, spec: &FieldSpec, path: &str, out: &mut Vec<Violation>) {
    if !spec.field_type.matches(value) {
        out.push(Violation::type_mismatch(path, spec.field_type));
        return;
    }

    if let (Some(min), Some(text)) = (spec.min_length, value.as_str()) {
        if text.chars().count() < min {
            out.push(Violation::min_length(path, min));
        }
    }

    if let (Some((min, max)), Some(number)) = (spec.range, value.as_f64()) {
        if !(min..=max).contains(&number) {
            out.push(Violation::range(path, min, max));
        }
    }

    match value {
        Value::Object(map) => {
            if let Some(nested) = spec.nested {
                check_object(map, nested, path, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, index);

                if let Some(item_type) = spec.item_type {
                    if !item_type.matches(item) {
                        out.push(Violation::type_mismatch(item_path, item_type));
                        continue;
                    }
                }

                if let Some(nested) = spec.nested {
                    match item.as_object() {
                        Some(map) => check_object(map, nested, &item_path, out),
                        None => out.push(Violation::type_mismatch(item_path, FieldType::Object)),
                    }
                }
            }
        }
        _ => {}
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
