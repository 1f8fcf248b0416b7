use std::sync::Arc;

use crate::error::{IssueCode, ValidationError};

mod boolean;
mod enumeration;
mod number;
mod string;

pub use boolean::BooleanSchema;
pub use enumeration::EnumSchema;
pub use number::NumberSchema;
pub use string::StringSchema;

pub(crate) type StrPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub(crate) type NumberPredicate = Arc<dyn Fn(f64) -> bool + Send + Sync>;
pub(crate) type BoolPredicate = Arc<dyn Fn(bool) -> bool + Send + Sync>;

/// A required leaf received no value at all: it fails its base type check.
pub(crate) fn absent_error(expected: &str, custom: Option<&str>) -> ValidationError {
    ValidationError::single(
        IssueCode::InvalidType {
            expected: expected.to_string(),
            received: "undefined".to_string(),
        },
        custom.unwrap_or("Required"),
    )
}
