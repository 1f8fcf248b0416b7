use formcheck::prelude::*;
use serde_json::{json, Value};

fn skills() -> Schema {
    let skill = formcheck::object()
        .field("name", formcheck::string().min_msg(1, "Skill name is required"))
        .field(
            "level",
            formcheck::enumeration(&["Beginner", "Intermediate", "Advanced", "Expert"])
                .message("Please select a valid skill level"),
        );
    formcheck::object()
        .field(
            "skills",
            formcheck::array(skill)
                .min_len_msg(1, "At least one skill is required")
                .max_len_msg(3, "Maximum 3 skills allowed"),
        )
        .into()
}

fn skill(name: &str) -> Value {
    json!({"name": name, "level": "Advanced"})
}

#[tokio::test]
async fn empty_array_fails_at_array_path() {
    let err = skills().validate(&json!({"skills": []})).await.unwrap_err();
    assert_eq!(err.tree().messages("skills"), vec!["At least one skill is required"]);
}

#[tokio::test]
async fn too_many_elements_fail_at_array_path() {
    let candidate = json!({"skills": [skill("a"), skill("b"), skill("c"), skill("d")]});
    let err = skills().validate(&candidate).await.unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.messages("skills"), vec!["Maximum 3 skills allowed"]);
    assert_eq!(tree.len(), 1);
}

#[tokio::test]
async fn within_bounds_succeeds() {
    let candidate = json!({"skills": [skill("Rust"), skill("SQL")]});
    assert_eq!(skills().validate(&candidate).await.unwrap(), candidate);
}

#[tokio::test]
async fn only_the_invalid_element_is_reported() {
    let candidate = json!({"skills": [skill("Rust"), {"name": "", "level": "Expert"}]});
    let err = skills().validate(&candidate).await.unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.messages("skills.1.name"), vec!["Skill name is required"]);
    assert!(!tree.contains("skills.0.name"));
    assert!(!tree.contains("skills"));
}

#[tokio::test]
async fn bound_and_element_errors_are_reported_together() {
    let candidate = json!({"skills": [skill("a"), skill("b"), skill("c"), {"name": "d", "level": "Guru"}]});
    let err = skills().validate(&candidate).await.unwrap_err();
    let tree = err.tree();
    assert!(tree.contains("skills"));
    assert_eq!(tree.first_message("skills.3.level"), Some("Please select a valid skill level"));
}

#[tokio::test]
async fn non_array_is_type_error() {
    let err = skills().validate(&json!({"skills": "Rust"})).await.unwrap_err();
    assert_eq!(err.tree().messages("skills"), vec!["Expected array, received string"]);
}

#[tokio::test]
async fn exact_length_and_non_empty() {
    let pair: Schema = formcheck::array(formcheck::number()).len(2).into();
    assert!(pair.validate(&json!([1, 2])).await.is_ok());
    assert!(pair.validate(&json!([1])).await.is_err());

    let tags: Schema = formcheck::array(formcheck::string()).non_empty().into();
    assert!(tags.validate(&json!([])).await.is_err());
}

#[tokio::test]
async fn array_elements_report_their_index() {
    let numbers: Schema = formcheck::array(formcheck::number().int()).into();
    let err = numbers.validate(&json!([1, 2.5, 3, "x"])).await.unwrap_err();
    let paths: Vec<String> = err.tree().paths().map(ToString::to_string).collect();
    assert_eq!(paths, vec!["1", "3"]);
}
