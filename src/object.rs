use futures::future::{join_all, BoxFuture, FutureExt};
use serde_json::{Map, Value};

use crate::error::{value_type_name, IssueCode, PathSegment, ValidationError};
use crate::options::ValidationOptions;
use crate::schema::Schema;

#[derive(Debug, Clone)]
struct ObjectField {
    name: String,
    schema: Schema,
}

/// How to handle unknown fields not declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownFieldMode {
    /// Silently drop unknown fields from the output (default).
    Strip,
    /// Reject unknown fields with a validation error.
    Strict,
    /// Keep unknown fields as-is in the output.
    Passthrough,
}

/// Object schema mapping field names to child schemas.
///
/// Every declared field is validated, even after an earlier sibling failed,
/// and all of their errors end up in the same [`ValidationError`] under the
/// field's name.
///
/// # Unknown field handling
///
/// - **`strip()`** (default): unknown fields are silently removed from the output.
/// - **`strict()`**: unknown fields cause a validation error.
/// - **`passthrough()`**: unknown fields are kept as-is in the output.
///
/// # Example
/// ```
/// let schema = formcheck::object()
///     .field("name", formcheck::string().min_msg(2, "Name must be at least 2 characters"))
///     .field("email", formcheck::string().email_msg("Invalid email address"));
/// ```
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    fields: Vec<ObjectField>,
    unknown_mode: UnknownFieldMode,
    custom_type_error: Option<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            fields: vec![],
            unknown_mode: UnknownFieldMode::Strip,
            custom_type_error: None,
        }
    }

    /// Add a field with its validation schema. Redeclaring a field replaces it.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(ObjectField {
            name,
            schema: schema.into(),
        });
        self
    }

    /// Add a field that may be absent. Shorthand for `.field(name, schema.optional())`.
    pub fn field_optional(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.field(name, Schema::Optional(Box::new(schema.into())))
    }

    /// Set a custom error message for type mismatch (not an object, or absent).
    pub fn type_error(mut self, msg: impl Into<String>) -> Self {
        self.custom_type_error = Some(msg.into());
        self
    }

    /// Reject unknown fields not defined in the schema.
    pub fn strict(mut self) -> Self {
        self.unknown_mode = UnknownFieldMode::Strict;
        self
    }

    /// Silently remove unknown fields from the output (default behavior).
    pub fn strip(mut self) -> Self {
        self.unknown_mode = UnknownFieldMode::Strip;
        self
    }

    /// Keep unknown fields as-is in the output without validation.
    pub fn passthrough(mut self) -> Self {
        self.unknown_mode = UnknownFieldMode::Passthrough;
        self
    }

    /// Remove a field definition by name.
    pub fn omit(mut self, name: &str) -> Self {
        self.fields.retain(|f| f.name != name);
        self
    }

    /// Keep only the listed fields, removing all others.
    pub fn pick(mut self, names: &[&str]) -> Self {
        self.fields.retain(|f| names.contains(&f.name.as_str()));
        self
    }

    /// Merge another object schema's fields into this one.
    ///
    /// If both schemas define the same field, the one from `other` wins.
    pub fn extend(mut self, other: ObjectSchema) -> Self {
        for field in other.fields {
            self.fields.retain(|f| f.name != field.name);
            self.fields.push(field);
        }
        self
    }

    /// Make every field optional (a form where each input may be left out).
    pub fn partial(mut self) -> Self {
        self.fields = self
            .fields
            .into_iter()
            .map(|f| ObjectField {
                name: f.name,
                schema: match f.schema {
                    optional @ Schema::Optional(_) => optional,
                    other => Schema::Optional(Box::new(other)),
                },
            })
            .collect();
        self
    }

    /// Names of the declared fields, in declaration order.
    pub fn keyof(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Schema of a declared field.
    pub fn field_schema(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.schema)
    }

    pub(crate) fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.fields.iter().map(|f| &f.schema)
    }

    fn type_err(&self, value: Option<&Value>) -> ValidationError {
        let received = value_type_name(value);
        let msg = self.custom_type_error.clone().unwrap_or_else(|| match value {
            None => "Required".to_string(),
            Some(_) => format!("Expected object, received {}", received),
        });
        let code = IssueCode::InvalidType {
            expected: "object".to_string(),
            received,
        };
        match value {
            Some(v) => ValidationError::single_with_value(code, msg, v),
            None => ValidationError::single(code, msg),
        }
    }

    pub(crate) fn run<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, Result<Option<Value>, ValidationError>> {
        async move {
            let obj = match value {
                Some(Value::Object(obj)) => obj,
                other => return Err(self.type_err(other)),
            };

            let outcomes = join_all(
                self.fields
                    .iter()
                    .map(|field| field.schema.run(obj.get(&field.name), options)),
            )
            .await;

            let mut result = Map::new();
            let mut errors = ValidationError::new();

            for (field, outcome) in self.fields.iter().zip(outcomes) {
                match outcome {
                    Ok(Some(v)) => {
                        result.insert(field.name.clone(), v);
                    }
                    // absent optional field
                    Ok(None) => {}
                    Err(e) => {
                        errors = errors.merge(e.with_prefix(PathSegment::Field(field.name.clone())));
                    }
                }
            }

            let unknown_keys = obj
                .keys()
                .filter(|k| !self.fields.iter().any(|f| &f.name == *k));
            match self.unknown_mode {
                UnknownFieldMode::Strip => {}
                UnknownFieldMode::Strict => {
                    for key in unknown_keys {
                        let issue_err = ValidationError::single(
                            IssueCode::UnrecognizedField,
                            format!("Unrecognized field: \"{}\"", key),
                        );
                        errors = errors.merge(issue_err.with_prefix(PathSegment::Field(key.clone())));
                    }
                }
                UnknownFieldMode::Passthrough => {
                    for key in unknown_keys {
                        result.insert(key.clone(), obj[key.as_str()].clone());
                    }
                }
            }

            errors.into_result(Some(Value::Object(result)))
        }
        .boxed()
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}
