//! # formcheck: schema-driven form validation
//!
//! Describe the expected shape of a form's data once, as a tree of schema
//! nodes, then validate candidate values (`serde_json::Value`) against it.
//! A successful validation returns the normalized value; a failed one
//! returns every issue found, keyed by the dotted path of the offending
//! input (`personalInfo.firstName`, `skills.1.level`).
//!
//! Validation is always asynchronous so that a rule may consult a remote
//! service (a username availability lookup, for instance). Rules that do
//! not suspend complete on the first poll.
//!
//! ## Quick Start
//!
//! ```rust
//! use formcheck::prelude::*;
//! use serde_json::json;
//!
//! let signup = formcheck::object()
//!     .field("username", formcheck::string().min_msg(3, "Username must be at least 3 characters"))
//!     .field("password", formcheck::string().min(8))
//!     .field("confirmPassword", formcheck::string())
//!     .refine_at(
//!         "confirmPassword",
//!         |v| v["password"] == v["confirmPassword"],
//!         "Passwords don't match",
//!     );
//!
//! let candidate = json!({
//!     "username": "ada",
//!     "password": "Abc12345!",
//!     "confirmPassword": "different",
//! });
//! let err = futures::executor::block_on(signup.validate(&candidate)).unwrap_err();
//! let tree = err.tree();
//! assert_eq!(tree.messages("confirmPassword"), vec!["Passwords don't match"]);
//! assert!(!tree.contains("password"));
//! ```

pub mod collections;
pub mod combinators;
pub mod error;
pub mod format;
pub mod input;
pub mod mutation;
pub mod object;
pub mod options;
pub mod primitives;
pub mod schema;
pub mod session;

pub use regex_lite;

/// Create a string validation schema.
pub fn string() -> primitives::StringSchema {
    primitives::StringSchema::new()
}

/// Create a number validation schema (`f64`, see [`NumberSchema::int`](primitives::NumberSchema::int)).
pub fn number() -> primitives::NumberSchema {
    primitives::NumberSchema::new()
}

/// Create a boolean validation schema.
pub fn boolean() -> primitives::BooleanSchema {
    primitives::BooleanSchema::new()
}

/// Create a string enum schema. Validates against a fixed set of values.
///
/// ```
/// use formcheck::prelude::*;
/// use serde_json::json;
///
/// let level = formcheck::enumeration(&["Beginner", "Intermediate", "Advanced", "Expert"])
///     .message("Please select a valid skill level")
///     .into_schema();
/// let err = futures::executor::block_on(level.validate(&json!("Guru"))).unwrap_err();
/// assert_eq!(err.issues[0].message, "Please select a valid skill level");
/// ```
pub fn enumeration(variants: &[&str]) -> primitives::EnumSchema {
    primitives::EnumSchema::new(variants)
}

/// Create an object schema.
pub fn object() -> object::ObjectSchema {
    object::ObjectSchema::new()
}

/// Create an array schema whose elements all follow `element`.
pub fn array(element: impl Into<schema::Schema>) -> collections::ArraySchema {
    collections::ArraySchema::new(element)
}

/// Wrap a schema so an absent value passes without running its checks.
pub fn optional(inner: impl Into<schema::Schema>) -> schema::Schema {
    schema::SchemaExt::optional(inner)
}

/// Common imports for working with `formcheck`.
pub mod prelude {
    pub use crate::collections::ArraySchema;
    pub use crate::combinators::{Check, Refinement};
    pub use crate::error::{
        CheckError, FieldPath, IssueBuilder, IssueCode, PathSegment, SchemaError, StringValidation,
        ValidationError, ValidationIssue,
    };
    pub use crate::format::{flatten_error, prettify_error, ErrorTree, FlatError, NestedErrors};
    pub use crate::input::{from_form_fields, CandidateInput};
    pub use crate::mutation::MutationError;
    pub use crate::object::ObjectSchema;
    pub use crate::options::{LeafMode, ValidationOptions};
    pub use crate::primitives::{BooleanSchema, EnumSchema, NumberSchema, StringSchema};
    pub use crate::schema::{Schema, SchemaExt};
    pub use crate::session::{FormSession, Submission};
}
