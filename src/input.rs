//! Turning raw submissions into candidate values.

use serde_json::{Map, Value};

use crate::error::{FieldPath, IssueCode, PathSegment, ValidationError};

/// Types that can be validated with [`Schema::parse`](crate::schema::Schema::parse).
///
/// Implemented for JSON text (`str`, `String`), raw bytes (`[u8]`) and
/// `serde_json::Value`. Malformed JSON is reported as a
/// [`IssueCode::ParseError`] issue at the root.
pub trait CandidateInput {
    fn to_candidate(&self) -> Result<Value, ValidationError>;
}

impl CandidateInput for Value {
    fn to_candidate(&self) -> Result<Value, ValidationError> {
        Ok(self.clone())
    }
}

impl CandidateInput for str {
    fn to_candidate(&self) -> Result<Value, ValidationError> {
        serde_json::from_str(self).map_err(invalid_json)
    }
}

impl CandidateInput for String {
    fn to_candidate(&self) -> Result<Value, ValidationError> {
        self.as_str().to_candidate()
    }
}

impl CandidateInput for [u8] {
    fn to_candidate(&self) -> Result<Value, ValidationError> {
        serde_json::from_slice(self).map_err(invalid_json)
    }
}

fn invalid_json(e: serde_json::Error) -> ValidationError {
    ValidationError::single(IssueCode::ParseError, format!("Invalid JSON: {}", e))
}

/// Build a candidate from named form inputs.
///
/// Names use the dotted path form (`personalInfo.firstName`,
/// `skills.0.level`). Numeric segments create arrays; gaps before an index
/// are filled with `null`, and an index above [`MAX_FORM_INDEX`] is a
/// [`IssueCode::ParseError`] at that name. A numeric segment under an
/// existing group is a key of that group. A later input with the same name
/// replaces the earlier value. A name that needs a different shape than an earlier one
/// (`age` and `age.years`) is a [`IssueCode::ParseError`] at that name.
///
/// ```
/// use formcheck::input::from_form_fields;
/// use serde_json::json;
///
/// let candidate = from_form_fields([
///     ("personalInfo.firstName", json!("Ada")),
///     ("skills.0.name", json!("Rust")),
///     ("skills.0.level", json!("Expert")),
/// ])
/// .unwrap();
/// assert_eq!(
///     candidate,
///     json!({
///         "personalInfo": {"firstName": "Ada"},
///         "skills": [{"name": "Rust", "level": "Expert"}]
///     })
/// );
/// ```
pub fn from_form_fields<I, K, V>(fields: I) -> Result<Value, ValidationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let mut root = Value::Object(Map::new());
    let mut errors = ValidationError::new();

    for (name, value) in fields {
        let path = FieldPath::from(name.as_ref());
        let message = match insert_at(&mut root, path.segments(), value.into()) {
            Ok(()) => continue,
            Err(InsertError::Conflict) => format!("Conflicting form field \"{}\"", path),
            Err(InsertError::IndexTooLarge(idx)) => format!(
                "Form field \"{}\" uses index {}, above the limit of {}",
                path, idx, MAX_FORM_INDEX
            ),
        };
        errors
            .issue(IssueCode::ParseError)
            .message(message)
            .at(path)
            .finish();
    }

    errors.into_result(root)
}

/// Highest array index a form input name may use.
pub const MAX_FORM_INDEX: usize = 9_999;

enum InsertError {
    /// The existing shape at the slot does not allow the insert.
    Conflict,
    IndexTooLarge(usize),
}

fn insert_at(slot: &mut Value, segments: &[PathSegment], value: Value) -> Result<(), InsertError> {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => {
            if matches!(slot, Value::Object(_) | Value::Array(_)) {
                return Err(InsertError::Conflict);
            }
            *slot = value;
            return Ok(());
        }
    };

    if slot.is_null() {
        *slot = match first {
            PathSegment::Field(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        };
    }

    match (slot, first) {
        // digit-only names under an existing group are plain keys
        (Value::Object(obj), segment) => {
            let child = obj.entry(segment.to_string()).or_insert(Value::Null);
            insert_at(child, rest, value)
        }
        (Value::Array(arr), PathSegment::Index(idx)) => {
            if *idx > MAX_FORM_INDEX {
                return Err(InsertError::IndexTooLarge(*idx));
            }
            if arr.len() <= *idx {
                arr.resize(*idx + 1, Value::Null);
            }
            insert_at(&mut arr[*idx], rest, value)
        }
        _ => Err(InsertError::Conflict),
    }
}
