use futures::future::{join_all, BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::{value_type_name, IssueCode, PathSegment, ValidationError};
use crate::options::ValidationOptions;
use crate::schema::Schema;

/// Schema for array validation. Created via [`formcheck::array()`](crate::array).
///
/// Length bounds are reported at the array's own path; element errors at
/// `array.<index>`. Elements are validated even when a bound fails.
///
/// # Example
/// ```
/// let skills = formcheck::array(formcheck::string().min(1))
///     .min_len_msg(1, "At least one skill is required")
///     .max_len_msg(3, "Maximum 3 skills allowed");
/// ```
#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Box<Schema>,
    min_len: Option<(usize, String)>,
    max_len: Option<(usize, String)>,
    exact_len: Option<(usize, String)>,
    custom_type_error: Option<String>,
}

impl ArraySchema {
    pub fn new(element: impl Into<Schema>) -> Self {
        Self {
            element: Box::new(element.into()),
            min_len: None,
            max_len: None,
            exact_len: None,
            custom_type_error: None,
        }
    }

    pub fn element(&self) -> &Schema {
        &self.element
    }

    /// Minimum number of elements.
    pub fn min_len(self, len: usize) -> Self {
        self.min_len_msg(len, format!("Array must have at least {} elements", len))
    }

    pub fn min_len_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.min_len = Some((len, msg.into()));
        self
    }

    /// Maximum number of elements.
    pub fn max_len(self, len: usize) -> Self {
        self.max_len_msg(len, format!("Array must have at most {} elements", len))
    }

    pub fn max_len_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.max_len = Some((len, msg.into()));
        self
    }

    /// Exact number of elements.
    pub fn len(self, len: usize) -> Self {
        self.len_msg(len, format!("Array must have exactly {} elements", len))
    }

    pub fn len_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.exact_len = Some((len, msg.into()));
        self
    }

    /// Alias for `min_len(1)`: array must not be empty.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Set a custom error message for type mismatch (not an array, or absent).
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    fn bound_errors(&self, len: usize, value: &Value) -> ValidationError {
        let mut errors = ValidationError::new();

        if let Some((min, msg)) = &self.min_len {
            if len < *min {
                errors.push_with_value(
                    IssueCode::TooSmall {
                        minimum: *min as f64,
                        inclusive: true,
                    },
                    msg.clone(),
                    value,
                );
            }
        }

        if let Some((max, msg)) = &self.max_len {
            if len > *max {
                errors.push_with_value(
                    IssueCode::TooBig {
                        maximum: *max as f64,
                        inclusive: true,
                    },
                    msg.clone(),
                    value,
                );
            }
        }

        if let Some((exact, msg)) = &self.exact_len {
            if len != *exact {
                errors.push_with_value(IssueCode::custom("invalid_length"), msg.clone(), value);
            }
        }

        errors
    }

    pub(crate) fn run<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, Result<Option<Value>, ValidationError>> {
        async move {
            let (value, arr) = match value {
                Some(v @ Value::Array(arr)) => (v, arr),
                other => {
                    let received = value_type_name(other);
                    let msg = self.custom_type_error.clone().unwrap_or_else(|| match other {
                        None => "Required".to_string(),
                        Some(_) => format!("Expected array, received {}", received),
                    });
                    return Err(ValidationError::single(
                        IssueCode::InvalidType {
                            expected: "array".to_string(),
                            received,
                        },
                        msg,
                    ));
                }
            };

            let mut errors = self.bound_errors(arr.len(), value);

            let outcomes =
                join_all(arr.iter().map(|item| self.element.run(Some(item), options))).await;

            let mut results = Vec::with_capacity(arr.len());
            for (i, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Ok(v) => results.push(v.unwrap_or(Value::Null)),
                    Err(e) => {
                        errors = errors.merge(e.with_prefix(PathSegment::Index(i)));
                    }
                }
            }

            errors.into_result(Some(Value::Array(results)))
        }
        .boxed()
    }
}
