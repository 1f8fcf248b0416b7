use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{value_type_name, IssueCode, ValidationError};
use crate::options::ValidationOptions;

use super::{absent_error, BoolPredicate};

/// Schema for boolean validation. Created via [`formcheck::boolean()`](crate::boolean).
#[derive(Clone)]
pub struct BooleanSchema {
    checks: Vec<(BoolPredicate, String)>,
    coerce: bool,
    custom_type_error: Option<String>,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self {
            checks: vec![],
            coerce: false,
            custom_type_error: None,
        }
    }

    /// Set a custom error message for type mismatch (not a boolean, or absent).
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    /// Coerce checkbox-style values to booleans.
    ///
    /// Accepted coercions:
    /// - Strings: `"true"`, `"1"`, `"on"` → `true`; `"false"`, `"0"`, `"off"`, `""` → `false`
    /// - Numbers: `0` → `false`; anything else → `true`
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// The value must be `true` (an "I accept" checkbox).
    pub fn accepted(self, msg: impl Into<String>) -> Self {
        self.check(|b| b, msg)
    }

    /// Arbitrary `(predicate, message)` constraint.
    pub fn check<F>(mut self, predicate: F, msg: impl Into<String>) -> Self
    where
        F: Fn(bool) -> bool + Send + Sync + 'static,
    {
        self.checks.push((Arc::new(predicate), msg.into()));
        self
    }

    fn type_err(&self, value: &Value, msg: Option<String>) -> ValidationError {
        let received = value_type_name(Some(value));
        let msg = self
            .custom_type_error
            .clone()
            .or(msg)
            .unwrap_or_else(|| format!("Expected boolean, received {}", received));
        ValidationError::single_with_value(
            IssueCode::InvalidType {
                expected: "boolean".into(),
                received,
            },
            msg,
            value,
        )
    }

    fn extract_bool(&self, value: &Value) -> Result<bool, ValidationError> {
        if let Some(b) = value.as_bool() {
            return Ok(b);
        }
        if !self.coerce {
            return Err(self.type_err(value, None));
        }
        match value {
            Value::String(s) => match s.as_str() {
                "true" | "1" | "on" => Ok(true),
                "false" | "0" | "off" | "" => Ok(false),
                _ => Err(self.type_err(value, Some(format!("Cannot coerce \"{}\" to boolean", s)))),
            },
            Value::Number(n) => Ok(n.as_f64() != Some(0.0)),
            _ => Err(self.type_err(value, None)),
        }
    }

    pub(crate) fn check_value(
        &self,
        value: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        let value = match value {
            Some(v) => v,
            None => return Err(absent_error("boolean", self.custom_type_error.as_deref())),
        };
        let b = self.extract_bool(value)?;

        let mut errors = ValidationError::new();
        for (check, msg) in &self.checks {
            if !check(b) {
                errors.push_with_value(IssueCode::custom("custom"), msg.clone(), value);
                if options.stops_at_first() {
                    break;
                }
            }
        }
        errors.into_result(Value::Bool(b))
    }
}

impl Default for BooleanSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BooleanSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanSchema")
            .field("checks", &self.checks.len())
            .field("coerce", &self.coerce)
            .finish()
    }
}
