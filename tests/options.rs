use formcheck::prelude::*;
use serde_json::json;

fn password() -> Schema {
    formcheck::string()
        .min_msg(8, "Password must be at least 8 characters")
        .regex_msg(
            formcheck::regex_lite::Regex::new("[A-Z]").unwrap(),
            "Password must contain at least one uppercase letter",
        )
        .regex_msg(
            formcheck::regex_lite::Regex::new("[0-9]").unwrap(),
            "Password must contain at least one number",
        )
        .into()
}

#[tokio::test]
async fn first_failure_is_the_default() {
    let err = password().validate(&json!("abc")).await.unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].message, "Password must be at least 8 characters");
}

#[tokio::test]
async fn all_failures_in_declaration_order() {
    let err = password()
        .validate_with(&json!("abc"), &ValidationOptions::all_failures())
        .await
        .unwrap_err();
    let messages: Vec<_> = err.issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Password must be at least 8 characters",
            "Password must contain at least one uppercase letter",
            "Password must contain at least one number",
        ]
    );
}

#[tokio::test]
async fn leaf_mode_does_not_hide_sibling_errors() {
    let schema: Schema = formcheck::object()
        .field("a", formcheck::number().int().positive())
        .field("b", formcheck::number().int().positive())
        .into();
    let candidate = json!({"a": -1.5, "b": -2.5});

    let first = schema.validate(&candidate).await.unwrap_err();
    assert_eq!(first.issues.len(), 2);

    let all = schema
        .validate_with(&candidate, &ValidationOptions::new().leaf_mode(LeafMode::AllFailures))
        .await
        .unwrap_err();
    assert_eq!(all.issues.len(), 4);
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: ValidationOptions = serde_json::from_value(json!({})).unwrap();
    assert_eq!(opts, ValidationOptions::default());

    let opts: ValidationOptions = serde_json::from_value(json!({"leaf_mode": "all_failures"})).unwrap();
    assert_eq!(opts.leaf_mode, LeafMode::AllFailures);

    assert!(serde_json::from_value::<ValidationOptions>(json!({"leaf_mode": "some"})).is_err());
}
