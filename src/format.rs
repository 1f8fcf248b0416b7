//! Views over a [`ValidationError`] for presenting messages next to inputs.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{format_value_short, FieldPath, PathSegment, ValidationError, ValidationIssue};

/// Issues grouped by the path of the value they belong to.
///
/// This is what a form renders: each input looks up the messages at its own
/// name. Array elements are keyed by position, so after removing an element
/// call [`remove_index`](Self::remove_index) (or validate again) to keep the
/// entries lined up with the remaining inputs.
///
/// Serializes as an object mapping dotted paths to their messages.
///
/// # Example
/// ```
/// use formcheck::prelude::*;
/// use serde_json::json;
///
/// let schema = formcheck::object()
///     .field("skills", formcheck::array(
///         formcheck::object().field("name", formcheck::string().min_msg(1, "Skill name is required")),
///     ));
///
/// let err = futures::executor::block_on(
///     schema.into_schema().validate(&json!({"skills": [{"name": "Rust"}, {"name": ""}]})),
/// )
/// .unwrap_err();
/// let tree = err.tree();
/// assert_eq!(tree.messages("skills.1.name"), vec!["Skill name is required"]);
/// assert!(!tree.contains("skills.0.name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorTree {
    entries: BTreeMap<FieldPath, Vec<ValidationIssue>>,
}

impl ErrorTree {
    pub fn from_issues<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        let mut entries: BTreeMap<FieldPath, Vec<ValidationIssue>> = BTreeMap::new();
        for issue in issues {
            entries.entry(issue.path.clone()).or_default().push(issue);
        }
        Self { entries }
    }

    /// Messages at `path`, in the order they were produced.
    pub fn messages(&self, path: impl Into<FieldPath>) -> Vec<&str> {
        self.issues(path)
            .iter()
            .map(|issue| issue.message.as_str())
            .collect()
    }

    /// The message a form shows for `path`.
    pub fn first_message(&self, path: impl Into<FieldPath>) -> Option<&str> {
        self.issues(path).first().map(|issue| issue.message.as_str())
    }

    pub fn issues(&self, path: impl Into<FieldPath>) -> &[ValidationIssue] {
        self.lookup(&path.into()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, path: impl Into<FieldPath>) -> bool {
        self.lookup(&path.into()).is_some()
    }

    /// A digit-only field name parses as an index, so fall back to
    /// comparing the dotted text.
    fn lookup(&self, path: &FieldPath) -> Option<&Vec<ValidationIssue>> {
        self.entries.get(path).or_else(|| {
            self.entries
                .iter()
                .find(|(key, _)| key.matches(path))
                .map(|(_, issues)| issues)
        })
    }

    /// Paths that have at least one issue.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.entries.keys()
    }

    /// Number of paths with issues.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Issues from checks that could not be performed, as opposed to
    /// rejected values.
    pub fn check_failures(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.entries
            .values()
            .flatten()
            .filter(|issue| issue.is_check_failure())
    }

    /// Account for removing element `index` of the array at `array_path`:
    /// drops that element's entries and shifts every later element down by one.
    ///
    /// ```
    /// use formcheck::format::ErrorTree;
    /// use formcheck::prelude::*;
    ///
    /// let mut errors = ValidationError::new();
    /// errors.issue(IssueCode::NotInt).message("bad").at("skills.2.level").finish();
    /// errors.issue(IssueCode::NotInt).message("bad").at("skills.0.level").finish();
    ///
    /// let mut tree = errors.tree();
    /// tree.remove_index("skills", 0);
    /// assert!(tree.contains("skills.1.level"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn remove_index(&mut self, array_path: impl Into<FieldPath>, index: usize) {
        let array_path = array_path.into();
        let issues = std::mem::take(&mut self.entries).into_values().flatten();

        let kept = issues.filter_map(|mut issue| {
            match issue.path.segment_after_mut(&array_path) {
                Some(PathSegment::Index(i)) if *i == index => return None,
                Some(PathSegment::Index(i)) if *i > index => *i -= 1,
                _ => {}
            }
            Some(issue)
        });

        *self = Self::from_issues(kept);
    }

    /// Reshape into a tree that mirrors the candidate.
    pub fn nested(&self) -> NestedErrors {
        let mut root = NestedErrors::default();

        for (path, issues) in &self.entries {
            let mut current = &mut root;
            for segment in path.segments() {
                current = match segment {
                    PathSegment::Field(name) => current.properties.entry(name.clone()).or_default(),
                    PathSegment::Index(idx) => {
                        if current.items.len() <= *idx {
                            current.items.resize(*idx + 1, None);
                        }
                        current.items[*idx].get_or_insert_with(NestedErrors::default)
                    }
                };
            }
            current
                .errors
                .extend(issues.iter().map(|issue| issue.message.clone()));
        }

        root
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, issues) in &self.entries {
            let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
            map.serialize_entry(&path.to_string(), &messages)?;
        }
        map.end()
    }
}

impl From<&ValidationError> for ErrorTree {
    fn from(error: &ValidationError) -> Self {
        error.tree()
    }
}

/// Errors arranged like the candidate: messages for the value itself,
/// per-field subtrees and per-element subtrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NestedErrors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, NestedErrors>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Option<NestedErrors>>,
}

/// Flat error structure for simple forms.
///
/// - `form_errors`: errors about the value as a whole (root path)
/// - `field_errors`: errors grouped by top-level field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatError {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// Flatten a [`ValidationError`] into form-level and top-level-field messages.
///
/// # Example
/// ```
/// use formcheck::format::flatten_error;
/// use formcheck::prelude::*;
///
/// let mut err = ValidationError::new();
/// err.issue(IssueCode::NotInt).message("Expected integer").at("education.0.graduationYear").finish();
/// let flat = flatten_error(&err);
/// assert_eq!(flat.field_errors["education"], vec!["Expected integer"]);
/// assert!(flat.form_errors.is_empty());
/// ```
pub fn flatten_error(error: &ValidationError) -> FlatError {
    let mut flat = FlatError::default();

    for issue in &error.issues {
        match issue.path.segments().first() {
            None => flat.form_errors.push(issue.message.clone()),
            Some(first) => flat
                .field_errors
                .entry(first.to_string())
                .or_default()
                .push(issue.message.clone()),
        }
    }

    flat
}

/// Format a [`ValidationError`] as a human-readable report.
///
/// # Example output
/// ```text
/// ✖ Name must be at least 2 characters
///   → at name, received "J"
/// ✖ Invalid email address
///   → at email, received "nope"
/// ```
pub fn prettify_error(error: &ValidationError) -> String {
    let mut lines = Vec::new();

    for issue in &error.issues {
        lines.push(format!("✖ {}", issue.message));
        let mut parts = Vec::new();
        if !issue.path.is_root() {
            parts.push(format!("at {}", issue.path));
        }
        if let Some(val) = &issue.received {
            parts.push(format!("received {}", format_value_short(val)));
        }
        if !parts.is_empty() {
            lines.push(format!("  → {}", parts.join(", ")));
        }
    }

    lines.join("\n")
}
