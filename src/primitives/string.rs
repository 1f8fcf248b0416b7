use std::fmt;
use std::sync::Arc;

use regex_lite::Regex;
use serde_json::Value;

use crate::error::{value_type_name, IssueCode, StringValidation, ValidationError};
use crate::options::ValidationOptions;

use super::{absent_error, StrPredicate};

// ---------------------------------------------------------------------------
// Manual validation functions
// ---------------------------------------------------------------------------

fn is_valid_email(s: &str) -> bool {
    // local@domain, basic RFC-like check
    let at = match s.find('@') {
        Some(pos) if pos > 0 => pos,
        _ => return false,
    };
    let local = &s[..at];
    let domain = &s[at + 1..];

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return false;
    }

    for ch in local.chars() {
        if ch.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(ch) {
            continue;
        }
        return false;
    }

    is_valid_hostname(domain)
}

fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// StringCheck / StringTransform
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum StringCheck {
    Min(usize, String),
    Max(usize, String),
    Len(usize, String),
    Email(String),
    Regex(Regex, String),
    StartsWith(String, String),
    EndsWith(String, String),
    Contains(String, String),
    NonEmpty(String),
    Custom(StrPredicate, String),
}

impl StringCheck {
    /// Stable key identifying the check category.
    fn key(&self) -> &str {
        match self {
            StringCheck::Min(..) => "too_small",
            StringCheck::Max(..) => "too_big",
            StringCheck::Len(..) => "invalid_length",
            StringCheck::Email(..) => "invalid_email",
            StringCheck::Regex(..) => "invalid_regex",
            StringCheck::StartsWith(..) => "invalid_starts_with",
            StringCheck::EndsWith(..) => "invalid_ends_with",
            StringCheck::Contains(..) => "invalid_contains",
            StringCheck::NonEmpty(..) => "non_empty",
            StringCheck::Custom(..) => "custom",
        }
    }

    /// Replace the error message stored in this check.
    fn set_message(&mut self, msg: String) {
        match self {
            StringCheck::Min(_, ref mut m)
            | StringCheck::Max(_, ref mut m)
            | StringCheck::Len(_, ref mut m)
            | StringCheck::Email(ref mut m)
            | StringCheck::NonEmpty(ref mut m)
            | StringCheck::Regex(_, ref mut m)
            | StringCheck::StartsWith(_, ref mut m)
            | StringCheck::EndsWith(_, ref mut m)
            | StringCheck::Contains(_, ref mut m)
            | StringCheck::Custom(_, ref mut m) => *m = msg,
        }
    }

    /// Run the check; `None` means it passed.
    fn failure(&self, s: &str) -> Option<(IssueCode, &str)> {
        let len = s.chars().count();
        match self {
            StringCheck::Min(min, msg) => (len < *min).then(|| {
                (
                    IssueCode::TooSmall {
                        minimum: *min as f64,
                        inclusive: true,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::Max(max, msg) => (len > *max).then(|| {
                (
                    IssueCode::TooBig {
                        maximum: *max as f64,
                        inclusive: true,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::Len(exact, msg) => {
                (len != *exact).then(|| (IssueCode::custom("invalid_length"), msg.as_str()))
            }
            StringCheck::Email(msg) => (!is_valid_email(s)).then(|| {
                (
                    IssueCode::InvalidString {
                        validation: StringValidation::Email,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::Regex(re, msg) => (!re.is_match(s)).then(|| {
                (
                    IssueCode::InvalidString {
                        validation: StringValidation::Regex,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::StartsWith(prefix, msg) => (!s.starts_with(prefix.as_str())).then(|| {
                (
                    IssueCode::InvalidString {
                        validation: StringValidation::StartsWith,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::EndsWith(suffix, msg) => (!s.ends_with(suffix.as_str())).then(|| {
                (
                    IssueCode::InvalidString {
                        validation: StringValidation::EndsWith,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::Contains(sub, msg) => (!s.contains(sub.as_str())).then(|| {
                (
                    IssueCode::InvalidString {
                        validation: StringValidation::Contains,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::NonEmpty(msg) => (len == 0).then(|| {
                (
                    IssueCode::TooSmall {
                        minimum: 1.0,
                        inclusive: true,
                    },
                    msg.as_str(),
                )
            }),
            StringCheck::Custom(check, msg) => {
                (!check(s)).then(|| (IssueCode::custom("custom"), msg.as_str()))
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum StringTransform {
    Trim,
    ToLowerCase,
    ToUpperCase,
}

/// Schema for string validation. Created via [`formcheck::string()`](crate::string).
///
/// Constraints run in the order they were declared.
///
/// # Example
/// ```
/// let schema = formcheck::string()
///     .min_msg(8, "Password must be at least 8 characters")
///     .regex_msg(formcheck::regex_lite::Regex::new("[A-Z]").unwrap(), "Password must contain at least one uppercase letter");
/// ```
#[derive(Clone)]
pub struct StringSchema {
    checks: Vec<StringCheck>,
    transforms: Vec<StringTransform>,
    coerce: bool,
    custom_type_error: Option<String>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            checks: vec![],
            transforms: vec![],
            coerce: false,
            custom_type_error: None,
        }
    }

    /// Set a custom error message for type mismatch (not a string, or absent).
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    /// Override error messages in bulk by check key.
    ///
    /// The closure receives the check key (e.g. `"too_small"`, `"invalid_email"`)
    /// and should return `Some(new_message)` to replace, or `None` to keep the original.
    ///
    /// Available keys: `"too_small"`, `"too_big"`, `"invalid_length"`, `"invalid_email"`,
    /// `"invalid_regex"`, `"invalid_starts_with"`, `"invalid_ends_with"`,
    /// `"invalid_contains"`, `"non_empty"`, `"custom"`.
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

    /// Minimum string length in characters (inclusive).
    pub fn min(self, len: usize) -> Self {
        self.min_msg(len, format!("String must be at least {} characters", len))
    }

    /// Minimum string length with custom message.
    pub fn min_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::Min(len, msg.into()));
        self
    }

    /// Maximum string length in characters (inclusive).
    pub fn max(self, len: usize) -> Self {
        self.max_msg(len, format!("String must be at most {} characters", len))
    }

    /// Maximum string length with custom message.
    pub fn max_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::Max(len, msg.into()));
        self
    }

    /// Exact string length.
    pub fn len(self, len: usize) -> Self {
        self.len_msg(len, format!("String must be exactly {} characters", len))
    }

    /// Exact string length with custom message.
    pub fn len_msg(mut self, len: usize, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::Len(len, msg.into()));
        self
    }

    /// Must be a valid email address.
    pub fn email(self) -> Self {
        self.email_msg("Invalid email address")
    }

    /// Must be a valid email address, with custom message.
    pub fn email_msg(mut self, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::Email(msg.into()));
        self
    }

    /// Must match the given regex (anywhere in the string unless anchored).
    pub fn regex(self, re: Regex) -> Self {
        self.regex_msg(re, "String does not match pattern")
    }

    /// Must match the given regex, with custom message.
    pub fn regex_msg(mut self, re: Regex, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::Regex(re, msg.into()));
        self
    }

    /// Must start with the given prefix.
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        let p = prefix.into();
        let msg = format!("String must start with \"{}\"", p);
        self.starts_with_msg(p, msg)
    }

    /// Must start with the given prefix, with custom message.
    pub fn starts_with_msg(mut self, prefix: impl Into<String>, msg: impl Into<String>) -> Self {
        self.checks
            .push(StringCheck::StartsWith(prefix.into(), msg.into()));
        self
    }

    /// Must end with the given suffix.
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        let s = suffix.into();
        let msg = format!("String must end with \"{}\"", s);
        self.ends_with_msg(s, msg)
    }

    /// Must end with the given suffix, with custom message.
    pub fn ends_with_msg(mut self, suffix: impl Into<String>, msg: impl Into<String>) -> Self {
        self.checks
            .push(StringCheck::EndsWith(suffix.into(), msg.into()));
        self
    }

    /// Must contain the given substring.
    pub fn contains(self, sub: impl Into<String>) -> Self {
        let s = sub.into();
        let msg = format!("String must contain \"{}\"", s);
        self.contains_msg(s, msg)
    }

    /// Must contain the given substring, with custom message.
    pub fn contains_msg(mut self, sub: impl Into<String>, msg: impl Into<String>) -> Self {
        self.checks
            .push(StringCheck::Contains(sub.into(), msg.into()));
        self
    }

    /// Must not be empty.
    pub fn non_empty(self) -> Self {
        self.non_empty_msg("String must not be empty")
    }

    /// Must not be empty, with custom message.
    pub fn non_empty_msg(mut self, msg: impl Into<String>) -> Self {
        self.checks.push(StringCheck::NonEmpty(msg.into()));
        self
    }

    /// Arbitrary `(predicate, message)` constraint, run in declaration order
    /// with the built-in ones.
    pub fn check<F>(mut self, predicate: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.checks
            .push(StringCheck::Custom(Arc::new(predicate), msg.into()));
        self
    }

    /// Trim whitespace before validation.
    pub fn trim(mut self) -> Self {
        self.transforms.push(StringTransform::Trim);
        self
    }

    /// Convert to lowercase before validation.
    pub fn to_lowercase(mut self) -> Self {
        self.transforms.push(StringTransform::ToLowerCase);
        self
    }

    /// Convert to uppercase before validation.
    pub fn to_uppercase(mut self) -> Self {
        self.transforms.push(StringTransform::ToUpperCase);
        self
    }

    /// Coerce numbers and booleans to strings.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub(crate) fn check_value(
        &self,
        value: Option<&Value>,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        let value = match value {
            Some(v) => v,
            None => return Err(absent_error("string", self.custom_type_error.as_deref())),
        };

        let type_err = |value: &Value| -> ValidationError {
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
        };

        let mut s = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) if self.coerce => n.to_string(),
            Value::Bool(b) if self.coerce => b.to_string(),
            _ => return Err(type_err(value)),
        };

        for t in &self.transforms {
            match t {
                StringTransform::Trim => s = s.trim().to_string(),
                StringTransform::ToLowerCase => s = s.to_lowercase(),
                StringTransform::ToUpperCase => s = s.to_uppercase(),
            }
        }

        let str_val = Value::String(s);
        let s = str_val.as_str().unwrap_or_default();
        let mut errors = ValidationError::new();

        for check in &self.checks {
            if let Some((code, msg)) = check.failure(s) {
                errors.push_with_value(code, msg, &str_val);
                if options.stops_at_first() {
                    break;
                }
            }
        }

        errors.into_result(str_val)
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringSchema")
            .field("checks", &self.checks.iter().map(StringCheck::key).collect::<Vec<_>>())
            .field("transforms", &self.transforms)
            .field("coerce", &self.coerce)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_heuristics() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.org"));
        assert!(!is_valid_email("john@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@localhost"));
        assert!(!is_valid_email("jo hn@example.com"));
    }

    #[test]
    fn transforms_apply_before_checks() {
        let schema = StringSchema::new().trim().to_lowercase().min(3);
        let out = schema
            .check_value(Some(&json!("  ABC  ")), &ValidationOptions::default())
            .unwrap();
        assert_eq!(out, json!("abc"));
    }
}
