use formcheck::prelude::*;
use serde::Deserialize;
use serde_json::json;

fn basic() -> Schema {
    formcheck::object()
        .field("name", formcheck::string().min(2))
        .field("email", formcheck::string().email())
        .into()
}

#[tokio::test]
async fn parse_json_text() {
    let out = basic()
        .parse(r#"{"name": "Ada", "email": "ada@example.com"}"#)
        .await
        .unwrap();
    assert_eq!(out["name"], "Ada");
}

#[tokio::test]
async fn parse_reports_malformed_json() {
    let err = basic().parse("{\"name\":").await.unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].code, IssueCode::ParseError);
}

#[tokio::test]
async fn parse_bytes_and_values() {
    let bytes: &[u8] = br#"{"name": "Ada", "email": "ada@example.com"}"#;
    assert!(basic().parse(bytes).await.is_ok());
    assert!(basic()
        .parse(&json!({"name": "Ada", "email": "ada@example.com"}))
        .await
        .is_ok());
}

#[derive(Debug, Deserialize, PartialEq)]
struct Signup {
    name: String,
    email: String,
}

#[tokio::test]
async fn validate_as_typed_struct() {
    let signup: Signup = basic()
        .validate_as(&json!({"name": "Ada", "email": "ada@example.com", "extra": 1}))
        .await
        .unwrap();
    assert_eq!(
        signup,
        Signup {
            name: "Ada".into(),
            email: "ada@example.com".into()
        }
    );
}

#[tokio::test]
async fn form_fields_feed_the_validator() {
    let schema: Schema = formcheck::object()
        .field(
            "personalInfo",
            formcheck::object().field("firstName", formcheck::string().min_msg(1, "First name is required")),
        )
        .field(
            "education",
            formcheck::array(formcheck::object().field("graduationYear", formcheck::number().coerce().int())),
        )
        .into();

    let candidate = from_form_fields([
        ("personalInfo.firstName", ""),
        ("education.0.graduationYear", "2019"),
        ("education.1.graduationYear", "soon"),
    ])
    .unwrap();

    let err = schema.validate(&candidate).await.unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.messages("personalInfo.firstName"), vec!["First name is required"]);
    assert!(tree.contains("education.1.graduationYear"));
    assert!(!tree.contains("education.0.graduationYear"));
}
