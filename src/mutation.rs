//! Growing and shrinking repeatable groups (array fields) of a candidate.
//!
//! Elements are identified by position only. Removing an element shifts the
//! later ones down, so errors keyed by the old indices must be shifted too;
//! see [`ErrorTree::remove_index`](crate::format::ErrorTree::remove_index).

use serde_json::Value;
use thiserror::Error;

use crate::error::{FieldPath, PathSegment};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("no value at `{path}`")]
    PathNotFound { path: FieldPath },
    #[error("value at `{path}` is not an array")]
    NotAnArray { path: FieldPath },
    #[error("index {index} is out of bounds for `{path}` (length {len})")]
    IndexOutOfBounds { path: FieldPath, index: usize, len: usize },
}

/// Append `item` to the array at `array_path` and return its index.
///
/// ```
/// use formcheck::mutation::append;
/// use serde_json::json;
///
/// let mut candidate = json!({"skills": [{"name": "Rust"}]});
/// let idx = append(&mut candidate, "skills", json!({"name": "", "level": null})).unwrap();
/// assert_eq!(idx, 1);
/// assert_eq!(candidate["skills"][1]["name"], "");
/// ```
pub fn append(
    candidate: &mut Value,
    array_path: impl Into<FieldPath>,
    item: Value,
) -> Result<usize, MutationError> {
    let path = array_path.into();
    let arr = array_at(candidate, &path)?;
    arr.push(item);
    Ok(arr.len() - 1)
}

/// Insert `item` at `index`, shifting later elements up. `index` may equal
/// the current length.
pub fn insert(
    candidate: &mut Value,
    array_path: impl Into<FieldPath>,
    index: usize,
    item: Value,
) -> Result<(), MutationError> {
    let path = array_path.into();
    let arr = array_at(candidate, &path)?;
    if index > arr.len() {
        return Err(MutationError::IndexOutOfBounds {
            len: arr.len(),
            path,
            index,
        });
    }
    arr.insert(index, item);
    Ok(())
}

/// Remove and return the element at `index`, shifting later elements down.
pub fn remove(
    candidate: &mut Value,
    array_path: impl Into<FieldPath>,
    index: usize,
) -> Result<Value, MutationError> {
    let path = array_path.into();
    let arr = array_at(candidate, &path)?;
    if index >= arr.len() {
        return Err(MutationError::IndexOutOfBounds {
            len: arr.len(),
            path,
            index,
        });
    }
    Ok(arr.remove(index))
}

fn array_at<'a>(candidate: &'a mut Value, path: &FieldPath) -> Result<&'a mut Vec<Value>, MutationError> {
    let mut current = candidate;
    for segment in path.segments() {
        let next = match segment {
            PathSegment::Field(name) => current.as_object_mut().and_then(|obj| obj.get_mut(name)),
            PathSegment::Index(idx) => match current {
                Value::Array(arr) => arr.get_mut(*idx),
                Value::Object(obj) => obj.get_mut(&idx.to_string()),
                _ => None,
            },
        };
        current = next.ok_or_else(|| MutationError::PathNotFound { path: path.clone() })?;
    }
    current
        .as_array_mut()
        .ok_or_else(|| MutationError::NotAnArray { path: path.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_array_paths_resolve() {
        let mut v = json!({"education": [{"courses": ["a"]}]});
        append(&mut v, "education.0.courses", json!("b")).unwrap();
        assert_eq!(v["education"][0]["courses"], json!(["a", "b"]));
    }

    #[test]
    fn digit_only_keys_address_object_fields() {
        let mut v = json!({"years": {"2024": ["a"]}});
        assert_eq!(append(&mut v, "years.2024", json!("b")), Ok(1));
        assert_eq!(v["years"]["2024"], json!(["a", "b"]));
    }

    #[test]
    fn missing_path_and_wrong_kind() {
        let mut v = json!({"name": "x"});
        assert_eq!(
            append(&mut v, "skills", json!(1)),
            Err(MutationError::PathNotFound { path: "skills".into() })
        );
        assert_eq!(
            remove(&mut v, "name", 0),
            Err(MutationError::NotAnArray { path: "name".into() })
        );
    }
}
