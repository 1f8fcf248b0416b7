//! Runtime configuration for a validation attempt.

use serde::{Deserialize, Serialize};

/// What a leaf does after one of its constraints fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafMode {
    /// Report only the first failing constraint of each leaf, so a field
    /// shows one message at a time.
    #[default]
    FirstFailure,
    /// Run every constraint and report each failure in declaration order.
    AllFailures,
}

/// Options for [`Schema::validate_with`](crate::schema::Schema::validate_with).
///
/// Deserializable so a host can keep it in its own configuration file:
///
/// ```
/// use formcheck::options::{LeafMode, ValidationOptions};
///
/// let opts: ValidationOptions = serde_json::from_str(r#"{"leaf_mode": "all_failures"}"#).unwrap();
/// assert_eq!(opts.leaf_mode, LeafMode::AllFailures);
/// assert_eq!(ValidationOptions::default().leaf_mode, LeafMode::FirstFailure);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub leaf_mode: LeafMode,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf_mode(mut self, mode: LeafMode) -> Self {
        self.leaf_mode = mode;
        self
    }

    /// Shorthand for `leaf_mode(LeafMode::AllFailures)`.
    pub fn all_failures() -> Self {
        Self::new().leaf_mode(LeafMode::AllFailures)
    }

    pub(crate) fn stops_at_first(&self) -> bool {
        self.leaf_mode == LeafMode::FirstFailure
    }
}
