use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::{CheckError, FieldPath, IssueCode, ValidationError};
use crate::options::ValidationOptions;
use crate::schema::Schema;

type SyncCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncCheck = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<bool, CheckError>> + Send + Sync>;

/// Predicate of a [`Refinement`].
#[derive(Clone)]
pub enum Check {
    Sync(SyncCheck),
    /// Resolves to a verdict, or to a [`CheckError`] when the verdict could
    /// not be reached.
    Async(AsyncCheck),
}

impl Check {
    pub fn sync<F>(check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Check::Sync(Arc::new(check))
    }

    /// Async predicate that cannot fail on its own.
    pub fn future<F, Fut>(check: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Check::Async(Arc::new(move |value| check(value).map(Ok::<bool, CheckError>).boxed()))
    }

    /// Async predicate whose underlying operation may fail.
    pub fn fallible<F, Fut>(check: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
    {
        Check::Async(Arc::new(move |value| check(value).boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Check::Async(_))
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Sync(_) => f.write_str("Check::Sync"),
            Check::Async(_) => f.write_str("Check::Async"),
        }
    }
}

/// Extra rule evaluated after the wrapped schema accepted the value.
///
/// The predicate sees the normalized value of the wrapped schema; for an
/// object that is the whole object, which is how cross-field rules read
/// sibling fields. A rejection is reported at `path`, relative to the
/// wrapped schema (the root path reports at the schema itself).
///
/// Created via [`SchemaExt::refine`](crate::schema::SchemaExt::refine) and
/// its variants.
#[derive(Debug, Clone)]
pub struct Refinement {
    inner: Box<Schema>,
    check: Check,
    message: String,
    path: FieldPath,
}

impl Refinement {
    pub fn new(inner: Schema, check: Check, message: impl Into<String>, path: FieldPath) -> Self {
        Self {
            inner: Box::new(inner),
            check,
            message: message.into(),
            path,
        }
    }

    /// Access the inner schema.
    pub fn inner_schema(&self) -> &Schema {
        &self.inner
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn is_async(&self) -> bool {
        self.check.is_async()
    }

    fn rejection(&self, code: IssueCode, message: String) -> ValidationError {
        let mut errors = ValidationError::new();
        errors
            .issue(code)
            .message(message)
            .at(&self.path)
            .finish();
        errors
    }

    pub(crate) fn run<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, Result<Option<Value>, ValidationError>> {
        async move {
            let validated = match self.inner.run(value, options).await? {
                Some(v) => v,
                // absent optional value: nothing to refine
                None => return Ok(None),
            };

            let verdict = match &self.check {
                Check::Sync(check) => Ok(check(&validated)),
                Check::Async(check) => {
                    tracing::trace!(path = %self.path, "awaiting async refinement");
                    check(validated.clone()).await
                }
            };

            match verdict {
                Ok(true) => Ok(Some(validated)),
                Ok(false) => Err(self.rejection(IssueCode::custom("custom"), self.message.clone())),
                Err(e) => {
                    tracing::warn!(path = %self.path, error = %e, "refinement check could not be performed");
                    Err(self.rejection(
                        IssueCode::CheckFailed,
                        format!("Could not verify this value: {}", e),
                    ))
                }
            }
        }
        .boxed()
    }
}
