use formcheck::format::{flatten_error, prettify_error};
use formcheck::prelude::*;
use serde_json::json;

fn profile() -> Schema {
    formcheck::object()
        .field(
            "personalInfo",
            formcheck::object()
                .field("firstName", formcheck::string().min_msg(1, "First name is required"))
                .field("email", formcheck::string().email()),
        )
        .field(
            "skills",
            formcheck::array(formcheck::object().field("name", formcheck::string().min_msg(1, "Skill name is required")))
                .min_len_msg(1, "At least one skill is required"),
        )
        .into()
}

async fn profile_errors() -> ValidationError {
    profile()
        .validate(&json!({
            "personalInfo": {"firstName": "", "email": "nope"},
            "skills": [{"name": "Rust"}, {"name": ""}]
        }))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn tree_lookups() {
    let tree = profile_errors().await.tree();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.first_message("personalInfo.firstName"), Some("First name is required"));
    assert_eq!(tree.first_message("personalInfo.email"), Some("Invalid email address"));
    assert_eq!(tree.first_message("skills.1.name"), Some("Skill name is required"));
    assert_eq!(tree.first_message("skills.0.name"), None);
    assert!(tree.messages("skills").is_empty());
    assert_eq!(tree.check_failures().count(), 0);
}

#[tokio::test]
async fn tree_serializes_as_path_map() {
    let tree = profile_errors().await.tree();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({
            "personalInfo.email": ["Invalid email address"],
            "personalInfo.firstName": ["First name is required"],
            "skills.1.name": ["Skill name is required"]
        })
    );
}

#[tokio::test]
async fn nested_mirrors_candidate_shape() {
    let nested = profile_errors().await.tree().nested();
    assert_eq!(
        nested.properties["personalInfo"].properties["firstName"].errors,
        vec!["First name is required"]
    );
    let items = &nested.properties["skills"].items;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_none());
    assert_eq!(
        items[1].as_ref().map(|n| n.properties["name"].errors.clone()),
        Some(vec!["Skill name is required".to_string()])
    );
}

#[tokio::test]
async fn removing_an_element_shifts_later_errors() {
    let schema = profile();
    let mut candidate = json!({
        "personalInfo": {"firstName": "Ada", "email": "ada@example.com"},
        "skills": [{"name": "Rust"}, {"name": ""}]
    });

    let mut predicted = schema.validate(&candidate).await.unwrap_err().tree();
    assert!(predicted.contains("skills.1.name"));

    formcheck::mutation::remove(&mut candidate, "skills", 0).unwrap();
    predicted.remove_index("skills", 0);

    let actual = schema.validate(&candidate).await.unwrap_err().tree();
    assert!(actual.contains("skills.0.name"));
    assert!(!actual.contains("skills.1.name"));
    assert_eq!(actual, predicted);
}

#[tokio::test]
async fn removing_the_invalid_element_clears_its_errors() {
    let mut tree = profile_errors().await.tree();
    tree.remove_index("skills", 1);
    assert!(tree.paths().all(|p| !p.starts_with(&"skills".into())));
    assert_eq!(tree.len(), 2);
}

#[tokio::test]
async fn flatten_groups_by_top_level_field() {
    let flat = flatten_error(&profile_errors().await);
    assert!(flat.form_errors.is_empty());
    assert_eq!(flat.field_errors["personalInfo"].len(), 2);
    assert_eq!(flat.field_errors["skills"], vec!["Skill name is required"]);
}

#[tokio::test]
async fn prettify_lists_message_and_location() {
    let err = formcheck::object()
        .field("name", formcheck::string().min(5))
        .into_schema()
        .validate(&json!({"name": "ab"}))
        .await
        .unwrap_err();
    assert_eq!(
        prettify_error(&err),
        "✖ String must be at least 5 characters\n  → at name, received \"ab\""
    );
}

#[tokio::test]
async fn display_joins_issues_by_line() {
    let err = profile_errors().await;
    let text = err.to_string();
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("skills.1.name: Skill name is required"));
}

#[tokio::test]
async fn issues_serialize_with_kind_tag() {
    let err = formcheck::number()
        .int()
        .into_schema()
        .validate(&json!(1.5))
        .await
        .unwrap_err();
    let v = serde_json::to_value(&err.issues[0]).unwrap();
    assert_eq!(v["code"], json!({"kind": "not_int"}));
    assert_eq!(v["path"], json!(""));
    assert_eq!(v["received"], json!(1.5));
}
