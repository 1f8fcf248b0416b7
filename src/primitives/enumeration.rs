use serde_json::Value;

use crate::error::{value_type_name, IssueCode, ValidationError};

use super::absent_error;

/// Schema for string enum validation. Created via [`formcheck::enumeration()`](crate::enumeration).
///
/// # Example
/// ```
/// let level = formcheck::enumeration(&["Beginner", "Intermediate", "Advanced", "Expert"])
///     .message("Please select a valid skill level");
/// ```
#[derive(Debug, Clone)]
pub struct EnumSchema {
    variants: Vec<String>,
    custom_type_error: Option<String>,
    custom_invalid: Option<String>,
}

impl EnumSchema {
    pub fn new(variants: &[&str]) -> Self {
        Self::from_strings(variants.iter().map(|s| s.to_string()).collect())
    }

    /// Create from a Vec of Strings.
    pub fn from_strings(variants: Vec<String>) -> Self {
        Self {
            variants,
            custom_type_error: None,
            custom_invalid: None,
        }
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Message used when the value is not a string, or absent.
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    /// Message used when the string is not one of the variants.
    pub fn invalid_msg(mut self, msg: impl Into<String>) -> Self {
        self.custom_invalid = Some(msg.into());
        self
    }

    /// One message for every failure of this field.
    pub fn message(self, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        self.type_error(msg.clone()).invalid_msg(msg)
    }

    pub(crate) fn check_value(&self, value: Option<&Value>) -> Result<Value, ValidationError> {
        let value = match value {
            Some(v) => v,
            None => return Err(absent_error("string", self.custom_type_error.as_deref())),
        };
        let s = value.as_str().ok_or_else(|| {
            let received = value_type_name(Some(value));
            let msg = self
                .custom_type_error
                .clone()
                .unwrap_or_else(|| format!("Expected string, received {}", received));
            ValidationError::single_with_value(
                IssueCode::InvalidType {
                    expected: "string".to_string(),
                    received,
                },
                msg,
                value,
            )
        })?;

        if self.variants.iter().any(|v| v == s) {
            return Ok(value.clone());
        }
        let msg = self.custom_invalid.clone().unwrap_or_else(|| {
            format!(
                "Invalid enum value: \"{}\". Expected one of: {}",
                s,
                self.variants
                    .iter()
                    .map(|v| format!("\"{}\"", v))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        });
        Err(ValidationError::single_with_value(
            IssueCode::InvalidEnumValue {
                options: self.variants.clone(),
            },
            msg,
            value,
        ))
    }
}
