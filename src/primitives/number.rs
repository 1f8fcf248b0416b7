use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::error::{value_type_name, IssueCode, ValidationError};
use crate::options::ValidationOptions;

use super::{absent_error, NumberPredicate};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE: f64 = 9007199254740991.0;

#[derive(Clone)]
enum NumberCheck {
    Min(f64, String),
    Max(f64, String),
    Gt(f64, String),
    Lt(f64, String),
    Int(String),
    Positive(String),
    Negative(String),
    NonNegative(String),
    NonPositive(String),
    Finite(String),
    MultipleOf(f64, String),
    Custom(NumberPredicate, String),
}

impl NumberCheck {
    /// Stable key identifying the check category.
    fn key(&self) -> &str {
        match self {
            NumberCheck::Min(..) => "too_small",
            NumberCheck::Max(..) => "too_big",
            NumberCheck::Gt(..) => "too_small",
            NumberCheck::Lt(..) => "too_big",
            NumberCheck::Int(..) => "not_int",
            NumberCheck::Positive(..) => "not_positive",
            NumberCheck::Negative(..) => "not_negative",
            NumberCheck::NonNegative(..) => "not_non_negative",
            NumberCheck::NonPositive(..) => "not_non_positive",
            NumberCheck::Finite(..) => "not_finite",
            NumberCheck::MultipleOf(..) => "not_multiple_of",
            NumberCheck::Custom(..) => "custom",
        }
    }

    /// Replace the error message stored in this check.
    fn set_message(&mut self, msg: String) {
        match self {
            NumberCheck::Min(_, ref mut m)
            | NumberCheck::Max(_, ref mut m)
            | NumberCheck::Gt(_, ref mut m)
            | NumberCheck::Lt(_, ref mut m)
            | NumberCheck::Int(ref mut m)
            | NumberCheck::Positive(ref mut m)
            | NumberCheck::Negative(ref mut m)
            | NumberCheck::NonNegative(ref mut m)
            | NumberCheck::NonPositive(ref mut m)
            | NumberCheck::Finite(ref mut m)
            | NumberCheck::MultipleOf(_, ref mut m)
            | NumberCheck::Custom(_, ref mut m) => *m = msg,
        }
    }

    /// Run the check; `None` means it passed.
    fn failure(&self, n: f64) -> Option<(IssueCode, &str)> {
        let too_small = |minimum: f64, inclusive: bool| IssueCode::TooSmall { minimum, inclusive };
        let too_big = |maximum: f64, inclusive: bool| IssueCode::TooBig { maximum, inclusive };
        match self {
            NumberCheck::Min(min, msg) => (n < *min).then(|| (too_small(*min, true), msg.as_str())),
            NumberCheck::Max(max, msg) => (n > *max).then(|| (too_big(*max, true), msg.as_str())),
            NumberCheck::Gt(val, msg) => (n <= *val).then(|| (too_small(*val, false), msg.as_str())),
            NumberCheck::Lt(val, msg) => (n >= *val).then(|| (too_big(*val, false), msg.as_str())),
            NumberCheck::Int(msg) => (n.fract() != 0.0 || !n.is_finite())
                .then(|| (IssueCode::NotInt, msg.as_str())),
            NumberCheck::Positive(msg) => (n <= 0.0).then(|| (too_small(0.0, false), msg.as_str())),
            NumberCheck::Negative(msg) => (n >= 0.0).then(|| (too_big(0.0, false), msg.as_str())),
            NumberCheck::NonNegative(msg) => {
                (n < 0.0).then(|| (too_small(0.0, true), msg.as_str()))
            }
            NumberCheck::NonPositive(msg) => (n > 0.0).then(|| (too_big(0.0, true), msg.as_str())),
            NumberCheck::Finite(msg) => {
                (!n.is_finite()).then(|| (IssueCode::NotFinite, msg.as_str()))
            }
            NumberCheck::MultipleOf(step, msg) => (!is_multiple_of(n, *step))
                .then(|| (IssueCode::custom("not_multiple_of"), msg.as_str())),
            NumberCheck::Custom(check, msg) => {
                (!check(n)).then(|| (IssueCode::custom("custom"), msg.as_str()))
            }
        }
    }
}

/// Whether `n / step` is a whole number, allowing for the rounding error of
/// decimal steps such as `0.1`.
fn is_multiple_of(n: f64, step: f64) -> bool {
    let quotient = n / step;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

/// Schema for number validation. Created via [`formcheck::number()`](crate::number).
///
/// Integers are a constraint (`.int()`), not a separate type, so they take
/// part in the declared check order like any other bound.
///
/// # Example
/// ```
/// let age = formcheck::number()
///     .type_error("Age must be a number")
///     .int_msg("Age must be a whole number")
///     .min_msg(18, "You must be at least 18 years old")
///     .max(120);
/// ```
#[derive(Clone)]
pub struct NumberSchema {
    checks: Vec<NumberCheck>,
    coerce: bool,
    custom_type_error: Option<String>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self {
            checks: vec![],
            coerce: false,
            custom_type_error: None,
        }
    }

    /// Set a custom error message for type mismatch (not a number, or absent).
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    /// Override error messages in bulk by check key.
    ///
    /// Keys: `"too_small"`, `"too_big"`, `"not_int"`, `"not_positive"`,
    /// `"not_negative"`, `"not_non_negative"`, `"not_non_positive"`,
    /// `"not_finite"`, `"not_multiple_of"`, `"custom"`.
    pub fn with_messages<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for check in &mut self.checks {
            if let Some(msg) = f(check.key()) {
                check.set_message(msg);
            }
        }
        self
    }

    /// Minimum value (inclusive). Alias: `gte`.
    pub fn min(self, val: impl Into<f64>) -> Self {
        let val = val.into();
        self.min_msg(val, format!("Number must be at least {}", val))
    }

    pub fn min_msg(mut self, val: impl Into<f64>, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Min(val.into(), msg.into()));
        self
    }

    /// Maximum value (inclusive). Alias: `lte`.
    pub fn max(self, val: impl Into<f64>) -> Self {
        let val = val.into();
        self.max_msg(val, format!("Number must be at most {}", val))
    }

    pub fn max_msg(mut self, val: impl Into<f64>, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Max(val.into(), msg.into()));
        self
    }

    /// Greater than (exclusive).
    pub fn gt(self, val: impl Into<f64>) -> Self {
        let val = val.into();
        self.gt_msg(val, format!("Number must be greater than {}", val))
    }

    pub fn gt_msg(mut self, val: impl Into<f64>, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Gt(val.into(), msg.into()));
        self
    }

    pub fn gte(self, val: impl Into<f64>) -> Self {
        self.min(val)
    }

    /// Less than (exclusive).
    pub fn lt(self, val: impl Into<f64>) -> Self {
        let val = val.into();
        self.lt_msg(val, format!("Number must be less than {}", val))
    }

    pub fn lt_msg(mut self, val: impl Into<f64>, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Lt(val.into(), msg.into()));
        self
    }

    pub fn lte(self, val: impl Into<f64>) -> Self {
        self.max(val)
    }

    /// Must be a whole number.
    pub fn int(self) -> Self {
        self.int_msg("Expected integer, received float")
    }

    pub fn int_msg(mut self, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Int(msg.into()));
        self
    }

    /// Must be positive (> 0).
    pub fn positive(self) -> Self {
        self.positive_msg("Number must be positive")
    }

    pub fn positive_msg(mut self, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Positive(msg.into()));
        self
    }

    /// Must be negative (< 0).
    pub fn negative(self) -> Self {
        self.negative_msg("Number must be negative")
    }

    pub fn negative_msg(mut self, msg: impl Into<String>) -> Self {
        self.checks.push(NumberCheck::Negative(msg.into()));
        self
    }

    /// Must be non-negative (>= 0).
    pub fn non_negative(mut self) -> Self {
        self.checks.push(NumberCheck::NonNegative(
            "Number must be non-negative".to_string(),
        ));
        self
    }

    /// Must be non-positive (<= 0).
    pub fn non_positive(mut self) -> Self {
        self.checks.push(NumberCheck::NonPositive(
            "Number must be non-positive".to_string(),
        ));
        self
    }

    /// Must be finite (not NaN or infinity).
    pub fn finite(mut self) -> Self {
        self.checks
            .push(NumberCheck::Finite("Number must be finite".to_string()));
        self
    }

    /// Must be a multiple of the given value.
    ///
    /// # Panics
    ///
    /// Panics if `val` is zero or not finite.
    #[track_caller]
    pub fn multiple_of(mut self, val: impl Into<f64>) -> Self {
        let val = val.into();
        assert!(
            val.is_finite() && val != 0.0,
            "multiple_of step must be finite and non-zero, got {}",
            val
        );
        self.checks.push(NumberCheck::MultipleOf(
            val,
            format!("Number must be a multiple of {}", val),
        ));
        self
    }

    /// Arbitrary `(predicate, message)` constraint.
    pub fn check<F>(mut self, predicate: F, msg: impl Into<String>) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.checks
            .push(NumberCheck::Custom(Arc::new(predicate), msg.into()));
        self
    }

    /// Coerce numeric strings (form input) and booleans to numbers.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    fn type_err(&self, value: &Value) -> ValidationError {
        let received = value_type_name(Some(value));
        let msg = self
            .custom_type_error
            .clone()
            .unwrap_or_else(|| format!("Expected number, received {}", received));
        ValidationError::single_with_value(
            IssueCode::InvalidType {
                expected: "number".to_string(),
                received,
            },
            msg,
            value,
        )
    }

    /// Extract the number and the value it normalizes to.
    fn extract_number(&self, value: &Value) -> Result<(f64, Value), ValidationError> {
        if let Some(n) = value.as_f64() {
            return Ok((n, value.clone()));
        }
        if !self.coerce {
            return Err(self.type_err(value));
        }
        let n = match value {
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => {
                    let msg = self
                        .custom_type_error
                        .clone()
                        .unwrap_or_else(|| format!("Cannot coerce \"{}\" to number", s));
                    return Err(ValidationError::single_with_value(
                        IssueCode::InvalidType {
                            expected: "number".to_string(),
                            received: "string".to_string(),
                        },
                        msg,
                        value,
                    ));
                }
            },
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            _ => return Err(self.type_err(value)),
        };
        Ok((n, number_value(n)))
    }

    pub(crate) fn check_value(
        &self,
        value: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        let value = match value {
            Some(v) => v,
            None => return Err(absent_error("number", self.custom_type_error.as_deref())),
        };
        let (n, normalized) = self.extract_number(value)?;

        let mut errors = ValidationError::new();
        for check in &self.checks {
            if let Some((code, msg)) = check.failure(n) {
                errors.push_with_value(code, msg, value);
                if options.stops_at_first() {
                    break;
                }
            }
        }
        errors.into_result(normalized)
    }
}

/// Whole numbers in the exact range become JSON integers, so a coerced
/// `"25"` normalizes to `25` rather than `25.0`.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NumberSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberSchema")
            .field("checks", &self.checks.iter().map(NumberCheck::key).collect::<Vec<_>>())
            .field("coerce", &self.coerce)
            .finish()
    }
}
