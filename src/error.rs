use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::format::ErrorTree;

/// A segment in a validation error path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object field name.
    Field(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

impl PathSegment {
    /// Whether both segments are written the same way in a dotted path.
    /// `Field("2024")` and `Index(2024)` match.
    pub fn same_text(&self, other: &PathSegment) -> bool {
        match (self, other) {
            (PathSegment::Field(a), PathSegment::Field(b)) => a == b,
            (PathSegment::Index(a), PathSegment::Index(b)) => a == b,
            (PathSegment::Field(name), PathSegment::Index(idx))
            | (PathSegment::Index(idx), PathSegment::Field(name)) => *name == idx.to_string(),
        }
    }
}

/// Digit-only text without leading zeros becomes an index; everything else
/// is a field name.
impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        let canonical = s == "0" || !s.starts_with('0');
        if canonical && !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = s.parse::<usize>() {
                return PathSegment::Index(idx);
            }
        }
        PathSegment::Field(s.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// Location of a value inside a candidate, e.g. `skills.1.name`.
///
/// Paths render in the dotted form used by form bindings to name their
/// inputs: field names and array indices joined by `.`. The root path is
/// the empty string.
///
/// ```
/// use formcheck::error::{FieldPath, PathSegment};
///
/// let path = FieldPath::from("skills.1.name");
/// assert_eq!(path.segments()[1], PathSegment::Index(1));
/// assert_eq!(path.to_string(), "skills.1.name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path (the validated value itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend the path with a field name.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Field(name.into()));
        self
    }

    /// Extend the path with an array index.
    pub fn index(mut self, idx: usize) -> Self {
        self.0.push(PathSegment::Index(idx));
        self
    }

    /// Insert a segment at the front (used while errors bubble up to a parent).
    pub fn prepend(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }

    /// Whether `prefix` is a (non-strict) prefix of this path, comparing
    /// segments by their dotted text.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.len() >= prefix.0.len()
            && self.0.iter().zip(&prefix.0).all(|(a, b)| a.same_text(b))
    }

    /// Whether both paths render to the same dotted text. A digit-only
    /// object field and an array index at that position are the same
    /// location for a form.
    ///
    /// ```
    /// use formcheck::error::{FieldPath, PathSegment};
    ///
    /// let stored = FieldPath::from(vec![PathSegment::Field("2024".into())]);
    /// assert!(stored.matches(&FieldPath::from("2024")));
    /// ```
    pub fn matches(&self, other: &FieldPath) -> bool {
        self.0.len() == other.0.len() && self.starts_with(other)
    }

    /// Mutable access to the segment right after `prefix`, if this path
    /// extends `prefix`.
    pub(crate) fn segment_after_mut(&mut self, prefix: &FieldPath) -> Option<&mut PathSegment> {
        if self.0.len() > prefix.0.len() && self.starts_with(prefix) {
            self.0.get_mut(prefix.0.len())
        } else {
            None
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldPath::from(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return FieldPath::root();
        }
        FieldPath(s.split('.').map(PathSegment::from).collect())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::from(s.as_str())
    }
}

impl From<&String> for FieldPath {
    fn from(s: &String) -> Self {
        FieldPath::from(s.as_str())
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        FieldPath(segments)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Type of string validation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StringValidation {
    Email,
    Regex,
    StartsWith,
    EndsWith,
    Contains,
}

/// Validation issue code. Describes what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueCode {
    /// The value is not of the kind the schema expects (or is absent).
    InvalidType { expected: String, received: String },
    TooSmall { minimum: f64, inclusive: bool },
    TooBig { maximum: f64, inclusive: bool },
    InvalidString { validation: StringValidation },
    NotInt,
    NotFinite,
    InvalidEnumValue { options: Vec<String> },
    UnrecognizedField,
    ParseError,
    /// An asynchronous check could not be performed. This is not a verdict
    /// on the value.
    CheckFailed,
    Custom { code: String },
}

impl IssueCode {
    /// Stable string key for this error code.
    pub fn key(&self) -> &str {
        match self {
            IssueCode::InvalidType { .. } => "invalid_type",
            IssueCode::TooSmall { .. } => "too_small",
            IssueCode::TooBig { .. } => "too_big",
            IssueCode::InvalidString { .. } => "invalid_string",
            IssueCode::NotInt => "not_int",
            IssueCode::NotFinite => "not_finite",
            IssueCode::InvalidEnumValue { .. } => "invalid_enum_value",
            IssueCode::UnrecognizedField => "unrecognized_field",
            IssueCode::ParseError => "parse_error",
            IssueCode::CheckFailed => "check_failed",
            IssueCode::Custom { code } => code,
        }
    }

    pub(crate) fn custom(code: &str) -> Self {
        IssueCode::Custom {
            code: code.to_string(),
        }
    }
}

/// A single validation issue with path, message and received value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub path: FieldPath,
    /// The value that was received (if available).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

impl ValidationIssue {
    /// Whether this issue reports a failed check rather than a rejected value.
    pub fn is_check_failure(&self) -> bool {
        matches!(self.code, IssueCode::CheckFailed)
    }
}

/// Failure outcome of a validation attempt.
///
/// Issues from sibling fields and array elements are all collected, so one
/// attempt reports every failing location at once. Use [`tree()`](Self::tree)
/// to look messages up by path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Create an empty error container.
    pub fn new() -> Self {
        Self { issues: vec![] }
    }

    /// Create an error with a single issue (no received value).
    pub fn single(code: IssueCode, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(code, message);
        errors
    }

    /// Create an error with a single issue and the received value.
    pub fn single_with_value(code: IssueCode, message: impl Into<String>, received: &Value) -> Self {
        let mut errors = Self::new();
        errors.push_with_value(code, message, received);
        errors
    }

    /// Prepend a path segment to all issues (used for nested objects/arrays).
    pub fn with_prefix(mut self, segment: PathSegment) -> Self {
        for issue in &mut self.issues {
            issue.path.prepend(segment.clone());
        }
        self
    }

    /// Merge another error's issues into this one.
    pub fn merge(mut self, other: ValidationError) -> Self {
        self.issues.extend(other.issues);
        self
    }

    /// Check if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Push a single issue (no received value).
    pub fn push(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            code,
            message: message.into(),
            path: FieldPath::root(),
            received: None,
        });
    }

    /// Push a single issue with the received value.
    pub fn push_with_value(&mut self, code: IssueCode, message: impl Into<String>, received: &Value) {
        self.issues.push(ValidationIssue {
            code,
            message: message.into(),
            path: FieldPath::root(),
            received: Some(truncate_value(received)),
        });
    }

    /// Whether any issue comes from a check that could not be performed.
    pub fn has_check_failures(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_check_failure)
    }

    /// Group the issues by path.
    pub fn tree(&self) -> ErrorTree {
        ErrorTree::from_issues(self.issues.iter().cloned())
    }

    pub(crate) fn into_result<T>(self, ok: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(ok)
        } else {
            Err(self)
        }
    }
}

/// Fluent builder for constructing a single [`ValidationIssue`].
///
/// Obtained via [`ValidationError::issue()`]. Push it into the error with
/// [`.finish()`](IssueBuilder::finish).
///
/// # Example
/// ```
/// use formcheck::prelude::*;
///
/// let mut errors = ValidationError::new();
/// errors
///     .issue(IssueCode::Custom { code: "password_weak".into() })
///     .message("Password is too weak")
///     .path_field("password")
///     .received(&serde_json::json!("123"))
///     .finish();
/// assert_eq!(errors.issues.len(), 1);
/// assert_eq!(errors.issues[0].path.to_string(), "password");
/// ```
pub struct IssueBuilder<'a> {
    errors: &'a mut ValidationError,
    code: IssueCode,
    message: Option<String>,
    path: FieldPath,
    received: Option<Value>,
}

impl<'a> IssueBuilder<'a> {
    /// Set the error message.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Replace the whole path.
    pub fn at(mut self, path: impl Into<FieldPath>) -> Self {
        self.path = path.into();
        self
    }

    /// Add a field path segment.
    pub fn path_field(mut self, name: impl Into<String>) -> Self {
        self.path = self.path.field(name);
        self
    }

    /// Add an index path segment.
    pub fn path_index(mut self, idx: usize) -> Self {
        self.path = self.path.index(idx);
        self
    }

    /// Attach the received value.
    pub fn received(mut self, value: &Value) -> Self {
        self.received = Some(truncate_value(value));
        self
    }

    /// Finish building and push the issue into the parent error.
    pub fn finish(self) {
        let msg = self
            .message
            .unwrap_or_else(|| format!("Validation error: {}", self.code.key()));
        self.errors.issues.push(ValidationIssue {
            code: self.code,
            message: msg,
            path: self.path,
            received: self.received,
        });
    }
}

impl ValidationError {
    /// Start building a new issue with the fluent API.
    pub fn issue(&mut self, code: IssueCode) -> IssueBuilder<'_> {
        IssueBuilder {
            errors: self,
            code,
            message: None,
            path: FieldPath::root(),
            received: None,
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if !issue.path.is_root() {
                write!(f, "{}: ", issue.path)?;
            }
            write!(f, "{}", issue.message)?;
            if let Some(val) = &issue.received {
                write!(f, ", received {}", format_value_short(val))?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Failure of the operation behind an asynchronous check, e.g. an
/// availability lookup that could not reach its backend.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("check unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CheckError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CheckError::Unavailable(reason.into())
    }
}

/// Misuse detected while composing a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("refinement target `{path}` is not reachable in the wrapped schema")]
    UnreachablePath { path: FieldPath },
}

/// Returns the kind name of a candidate value; absent values are `undefined`.
#[doc(hidden)]
pub fn value_type_name(value: Option<&Value>) -> String {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
    .to_string()
}

/// Format a JSON value for display in errors (short form).
pub fn format_value_short(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("Array(len={})", arr.len()),
        Value::Object(obj) => format!("Object(keys={})", obj.len()),
    }
}

/// Truncate large values to avoid storing huge payloads in errors.
fn truncate_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 100 => {
            let head: String = s.chars().take(97).collect();
            Value::String(format!("{}...", head))
        }
        Value::Array(arr) if arr.len() > 5 => {
            let mut truncated: Vec<Value> = arr[..5].to_vec();
            truncated.push(Value::String(format!("... ({} more)", arr.len() - 5)));
            Value::Array(truncated)
        }
        _ => value.clone(),
    }
}
