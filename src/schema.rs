use std::future::Future;

use futures::future::{ready, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collections::ArraySchema;
use crate::combinators::{Check, Refinement};
use crate::error::{CheckError, FieldPath, IssueCode, PathSegment, SchemaError, ValidationError};
use crate::input::CandidateInput;
use crate::object::ObjectSchema;
use crate::options::ValidationOptions;
use crate::primitives::{BooleanSchema, EnumSchema, NumberSchema, StringSchema};

/// A schema node: the expected shape and constraints of one value.
///
/// Nodes are built once and never change afterwards; they are `Clone`,
/// `Send` and `Sync`, so one schema can back any number of concurrent
/// validations (wrap it in an `Arc` to share it).
///
/// # Example
/// ```
/// use formcheck::prelude::*;
/// use serde_json::json;
///
/// let schema: Schema = formcheck::object()
///     .field("name", formcheck::string().min_msg(2, "Name must be at least 2 characters"))
///     .field("email", formcheck::string().email_msg("Invalid email address"))
///     .into();
///
/// let err = futures::executor::block_on(schema.validate(&json!({"name": "J", "email": "nope"})))
///     .unwrap_err();
/// let tree = err.tree();
/// assert_eq!(tree.first_message("name"), Some("Name must be at least 2 characters"));
/// assert_eq!(tree.first_message("email"), Some("Invalid email address"));
/// ```
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Enumeration(EnumSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    /// Skips every inner check when the value is absent.
    Optional(Box<Schema>),
    Refinement(Refinement),
}

impl Schema {
    /// Validate `candidate` with the default [`ValidationOptions`].
    ///
    /// Always asynchronous, whether or not the schema contains async
    /// refinements. There is no timeout: a predicate that never resolves
    /// keeps the attempt pending until the caller drops the future.
    pub async fn validate(&self, candidate: &Value) -> Result<Value, ValidationError> {
        self.validate_with(candidate, &ValidationOptions::default())
            .await
    }

    /// Validate `candidate`; `Ok` carries the normalized value.
    pub async fn validate_with(
        &self,
        candidate: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        tracing::debug!(schema = self.kind(), leaf_mode = ?options.leaf_mode, "validation started");
        let result = self
            .run(Some(candidate), options)
            .await
            .map(|v| v.unwrap_or(Value::Null));
        match &result {
            Ok(_) => tracing::debug!("validation succeeded"),
            Err(e) => tracing::debug!(
                issues = e.issues.len(),
                check_failures = e.has_check_failures(),
                "validation failed"
            ),
        }
        result
    }

    /// Parse from any supported input (JSON string, bytes, `serde_json::Value`).
    pub async fn parse<I: CandidateInput + ?Sized>(&self, input: &I) -> Result<Value, ValidationError> {
        let candidate = input.to_candidate()?;
        self.validate(&candidate).await
    }

    /// Validate and deserialize the normalized value into `T`.
    pub async fn validate_as<T: DeserializeOwned>(&self, candidate: &Value) -> Result<T, ValidationError> {
        let value = self.validate(candidate).await?;
        serde_json::from_value(value).map_err(|e| {
            ValidationError::single(
                IssueCode::ParseError,
                format!("Validated value does not fit the target type: {}", e),
            )
        })
    }

    /// Short name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Schema::String(_) => "string",
            Schema::Number(_) => "number",
            Schema::Boolean(_) => "boolean",
            Schema::Enumeration(_) => "enum",
            Schema::Object(_) => "object",
            Schema::Array(_) => "array",
            Schema::Optional(_) => "optional",
            Schema::Refinement(_) => "refinement",
        }
    }

    /// Whether validating may suspend on an async refinement.
    pub fn is_async(&self) -> bool {
        match self {
            Schema::Object(o) => o.schemas().any(Schema::is_async),
            Schema::Array(a) => a.element().is_async(),
            Schema::Optional(inner) => inner.is_async(),
            Schema::Refinement(r) => r.is_async() || r.inner_schema().is_async(),
            _ => false,
        }
    }

    /// The node that validates the value at `path`, looking through
    /// optional and refinement wrappers. Any index matches an array element,
    /// and a digit-only segment also matches an object field of that name.
    pub fn at(&self, path: &FieldPath) -> Option<&Schema> {
        self.locate(path.segments(), &mut Vec::new())
    }

    /// `path` spelled the way validation reports it, or `None` if no node
    /// sits there.
    pub(crate) fn resolve(&self, path: &FieldPath) -> Option<FieldPath> {
        let mut resolved = Vec::with_capacity(path.len());
        self.locate(path.segments(), &mut resolved)?;
        Some(FieldPath::from(resolved))
    }

    fn locate(&self, segments: &[PathSegment], resolved: &mut Vec<PathSegment>) -> Option<&Schema> {
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return Some(self),
        };
        match (self, first) {
            (Schema::Optional(inner), _) => inner.locate(segments, resolved),
            (Schema::Refinement(r), _) => r.inner_schema().locate(segments, resolved),
            (Schema::Object(o), segment) => {
                let name = segment.to_string();
                let child = o.field_schema(&name)?;
                resolved.push(PathSegment::Field(name));
                child.locate(rest, resolved)
            }
            (Schema::Array(a), PathSegment::Index(idx)) => {
                resolved.push(PathSegment::Index(*idx));
                a.element().locate(rest, resolved)
            }
            _ => None,
        }
    }

    /// Validate the value at one location; `Ok(None)` means an absent
    /// optional value.
    pub(crate) fn run<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, Result<Option<Value>, ValidationError>> {
        match self {
            Schema::String(s) => ready(s.check_value(value, options).map(Some)).boxed(),
            Schema::Number(n) => ready(n.check_value(value, options).map(Some)).boxed(),
            Schema::Boolean(b) => ready(b.check_value(value, options).map(Some)).boxed(),
            Schema::Enumeration(e) => ready(e.check_value(value).map(Some)).boxed(),
            Schema::Object(o) => o.run(value, options),
            Schema::Array(a) => a.run(value, options),
            Schema::Optional(inner) => match value {
                None => ready(Ok(None)).boxed(),
                Some(_) => inner.run(value, options),
            },
            Schema::Refinement(r) => r.run(value, options),
        }
    }
}

impl From<StringSchema> for Schema {
    fn from(s: StringSchema) -> Self {
        Schema::String(s)
    }
}

impl From<NumberSchema> for Schema {
    fn from(s: NumberSchema) -> Self {
        Schema::Number(s)
    }
}

impl From<BooleanSchema> for Schema {
    fn from(s: BooleanSchema) -> Self {
        Schema::Boolean(s)
    }
}

impl From<EnumSchema> for Schema {
    fn from(s: EnumSchema) -> Self {
        Schema::Enumeration(s)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(s: ObjectSchema) -> Self {
        Schema::Object(s)
    }
}

impl From<ArraySchema> for Schema {
    fn from(s: ArraySchema) -> Self {
        Schema::Array(s)
    }
}

impl From<Refinement> for Schema {
    fn from(r: Refinement) -> Self {
        Schema::Refinement(r)
    }
}

/// Combinators shared by every schema node.
///
/// Each one consumes the node and returns a new, wrapped [`Schema`]; nothing
/// is evaluated until validation.
pub trait SchemaExt: Into<Schema> + Sized {
    /// Convert into a [`Schema`] node.
    fn into_schema(self) -> Schema {
        self.into()
    }

    /// Make this node skippable when the value is absent.
    fn optional(self) -> Schema {
        match self.into() {
            optional @ Schema::Optional(_) => optional,
            other => Schema::Optional(Box::new(other)),
        }
    }

    /// Add a rule checked after this node accepted the value; a rejection is
    /// reported at this node's own path.
    ///
    /// ```
    /// use formcheck::prelude::*;
    ///
    /// let even = formcheck::number().int().refine(|v| v.as_i64().is_some_and(|n| n % 2 == 0), "Must be even");
    /// ```
    fn refine<F>(self, check: F, message: impl Into<String>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Refinement::new(self.into(), Check::sync(check), message, FieldPath::root()).into()
    }

    /// Like [`refine`](Self::refine), reporting a rejection at `path`
    /// relative to this node. Use it for cross-field rules on objects.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not exist in this schema; see
    /// [`try_refine_at`](Self::try_refine_at) for the fallible form.
    ///
    /// ```
    /// use formcheck::prelude::*;
    ///
    /// let signup = formcheck::object()
    ///     .field("password", formcheck::string().min(8))
    ///     .field("confirmPassword", formcheck::string())
    ///     .refine_at(
    ///         "confirmPassword",
    ///         |v| v["password"] == v["confirmPassword"],
    ///         "Passwords don't match",
    ///     );
    /// ```
    #[track_caller]
    fn refine_at<P, F>(self, path: P, check: F, message: impl Into<String>) -> Schema
    where
        P: Into<FieldPath>,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        match self.try_refine_at(path, check, message) {
            Ok(schema) => schema,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`refine_at`](Self::refine_at).
    fn try_refine_at<P, F>(self, path: P, check: F, message: impl Into<String>) -> Result<Schema, SchemaError>
    where
        P: Into<FieldPath>,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        refine_checked(self.into(), path.into(), Check::sync(check), message.into())
    }

    /// Add an asynchronous rule, e.g. a remote availability lookup.
    fn refine_async<F, Fut>(self, check: F, message: impl Into<String>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Refinement::new(self.into(), Check::future(check), message, FieldPath::root()).into()
    }

    /// Asynchronous rule reported at `path` relative to this node.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not exist in this schema.
    #[track_caller]
    fn refine_async_at<P, F, Fut>(self, path: P, check: F, message: impl Into<String>) -> Schema
    where
        P: Into<FieldPath>,
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        match refine_checked(self.into(), path.into(), Check::future(check), message.into()) {
            Ok(schema) => schema,
            Err(e) => panic!("{}", e),
        }
    }

    /// Asynchronous rule whose lookup may fail. A [`CheckError`] is reported
    /// as an [`IssueCode::CheckFailed`] issue, never as a rejection.
    fn try_refine_async<F, Fut>(self, check: F, message: impl Into<String>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
    {
        Refinement::new(self.into(), Check::fallible(check), message, FieldPath::root()).into()
    }

    /// Fallible asynchronous rule reported at `path` relative to this node.
    /// Both a rejection and a [`CheckError`] land at `path`.
    ///
    /// ```
    /// use formcheck::prelude::*;
    /// use serde_json::Value;
    ///
    /// let signup = formcheck::object()
    ///     .field("username", formcheck::string().min(3))
    ///     .try_refine_async_at(
    ///         "username",
    ///         |v: Value| async move {
    ///             match v["username"].as_str() {
    ///                 Some(name) => Ok(name != "admin"),
    ///                 None => Err(CheckError::unavailable("no username")),
    ///             }
    ///         },
    ///         "This username is already taken",
    ///     );
    /// assert!(signup.is_ok());
    /// ```
    fn try_refine_async_at<P, F, Fut>(
        self,
        path: P,
        check: F,
        message: impl Into<String>,
    ) -> Result<Schema, SchemaError>
    where
        P: Into<FieldPath>,
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
    {
        refine_checked(self.into(), path.into(), Check::fallible(check), message.into())
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

fn refine_checked(
    inner: Schema,
    path: FieldPath,
    check: Check,
    message: String,
) -> Result<Schema, SchemaError> {
    match inner.resolve(&path) {
        Some(resolved) => Ok(Refinement::new(inner, check, message, resolved).into()),
        None => Err(SchemaError::UnreachablePath { path }),
    }
}
