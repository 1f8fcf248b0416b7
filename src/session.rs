//! Last-request-wins submission handling for one form.
//!
//! The validator itself never cancels anything: two overlapping attempts
//! both run to completion and may finish in any order. A [`FormSession`]
//! numbers every attempt and discards any result that is no longer the
//! latest, so a slow availability check cannot overwrite the outcome of a
//! newer submission.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::{FieldPath, ValidationError};
use crate::options::ValidationOptions;
use crate::schema::Schema;

/// Outcome of [`FormSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The candidate passed; carries the normalized value.
    Accepted(Value),
    Rejected(ValidationError),
    /// A newer submission started before this one finished.
    Superseded,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Submission::Superseded)
    }
}

/// Validation front-end for one form instance.
///
/// Share it behind an `Arc` between the tasks that submit.
///
/// ```
/// use formcheck::prelude::*;
/// use serde_json::json;
///
/// let session = FormSession::new(formcheck::object().field("name", formcheck::string().min(2)));
/// let outcome = futures::executor::block_on(session.submit(&json!({"name": "Ada"})));
/// assert_eq!(outcome, Submission::Accepted(json!({"name": "Ada"})));
/// assert!(!session.is_pending());
/// ```
#[derive(Debug)]
pub struct FormSession {
    schema: Arc<Schema>,
    options: ValidationOptions,
    generation: AtomicU64,
    /// Highest submission ticket that has finished or been dropped.
    settled: AtomicU64,
    field_tickets: Mutex<HashMap<FieldPath, Tickets>>,
}

/// Ticket counters for the checks of one input.
#[derive(Debug, Default, Clone, Copy)]
struct Tickets {
    issued: u64,
    settled: u64,
}

impl FormSession {
    pub fn new(schema: impl Into<Schema>) -> Self {
        Self::shared(Arc::new(schema.into()))
    }

    /// Build a session around a schema that other sessions also use.
    pub fn shared(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            options: ValidationOptions::default(),
            generation: AtomicU64::new(0),
            settled: AtomicU64::new(0),
            field_tickets: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether the latest submission, or the latest check of some input, is
    /// still running. Superseded attempts that have not finished yet do not
    /// count. A UI disables its submit control while this is true.
    pub fn is_pending(&self) -> bool {
        if self.settled.load(Ordering::SeqCst) < self.generation.load(Ordering::SeqCst) {
            return true;
        }
        self.lock_fields()
            .values()
            .any(|tickets| tickets.settled < tickets.issued)
    }

    /// Validate the whole candidate as a submission.
    pub async fn submit(&self, candidate: &Value) -> Submission {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _pending = PendingGuard {
            session: self,
            attempt: Attempt::Submit(ticket),
        };

        let result = self.schema.validate_with(candidate, &self.options).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "discarding superseded submission");
            return Submission::Superseded;
        }
        match result {
            Ok(value) => Submission::Accepted(value),
            Err(errors) => Submission::Rejected(errors),
        }
    }

    /// Validate the candidate when the input at `path` loses focus and
    /// return the messages for that input only (empty when it is valid).
    ///
    /// Returns `None` when a newer check of the same input started first.
    pub async fn check_field(&self, candidate: &Value, path: impl Into<FieldPath>) -> Option<Vec<String>> {
        let path = path.into();
        let ticket = self.next_field_ticket(&path);
        let _pending = PendingGuard {
            session: self,
            attempt: Attempt::Field(path.clone(), ticket),
        };

        let result = self.schema.validate_with(candidate, &self.options).await;

        if self.field_ticket(&path) != ticket {
            tracing::debug!(%path, ticket, "discarding superseded field check");
            return None;
        }
        let messages = match result {
            Ok(_) => Vec::new(),
            Err(errors) => errors
                .issues
                .into_iter()
                .filter(|issue| issue.path.matches(&path))
                .map(|issue| issue.message)
                .collect(),
        };
        Some(messages)
    }

    fn lock_fields(&self) -> MutexGuard<'_, HashMap<FieldPath, Tickets>> {
        self.field_tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_field_ticket(&self, path: &FieldPath) -> u64 {
        let mut fields = self.lock_fields();
        let tickets = fields.entry(path.clone()).or_default();
        tickets.issued += 1;
        tickets.issued
    }

    fn field_ticket(&self, path: &FieldPath) -> u64 {
        self.lock_fields()
            .get(path)
            .map_or(0, |tickets| tickets.issued)
    }

    fn settle(&self, attempt: &Attempt) {
        match attempt {
            Attempt::Submit(ticket) => {
                self.settled.fetch_max(*ticket, Ordering::SeqCst);
            }
            Attempt::Field(path, ticket) => {
                if let Some(tickets) = self.lock_fields().get_mut(path) {
                    tickets.settled = tickets.settled.max(*ticket);
                }
            }
        }
    }
}

#[derive(Debug)]
enum Attempt {
    Submit(u64),
    Field(FieldPath, u64),
}

/// Settles its attempt when dropped, including when the attempt's future is
/// dropped before completing.
struct PendingGuard<'a> {
    session: &'a FormSession,
    attempt: Attempt,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.session.settle(&self.attempt);
    }
}
