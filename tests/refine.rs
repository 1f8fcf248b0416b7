use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use formcheck::prelude::*;
use serde_json::{json, Value};

fn signup() -> Schema {
    formcheck::object()
        .field("password", formcheck::string().min_msg(8, "Password must be at least 8 characters"))
        .field("confirmPassword", formcheck::string())
        .refine_at(
            "confirmPassword",
            |v| v["password"] == v["confirmPassword"],
            "Passwords don't match",
        )
}

const TAKEN: &[&str] = &["admin", "user", "test", "moderator", "system"];

fn availability(delay: Duration) -> Schema {
    formcheck::object()
        .field(
            "username",
            formcheck::string().min(3).max(20).refine_async(
                move |v: Value| async move {
                    tokio::time::sleep(delay).await;
                    let name = v.as_str().unwrap_or_default().to_lowercase();
                    !TAKEN.contains(&name.as_str())
                },
                "This username is already taken",
            ),
        )
        .field("email", formcheck::string().email())
        .into()
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mismatch_is_reported_at_target_only() {
    let err = signup()
        .validate(&json!({"password": "Abc12345!", "confirmPassword": "different"}))
        .await
        .unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.messages("confirmPassword"), vec!["Passwords don't match"]);
    assert!(!tree.contains("password"));
    assert_eq!(
        tree.issues("confirmPassword")[0].code,
        IssueCode::Custom {
            code: "custom".into()
        }
    );
}

#[tokio::test]
async fn matching_passwords_pass() {
    let candidate = json!({"password": "Abc12345!", "confirmPassword": "Abc12345!"});
    assert_eq!(signup().validate(&candidate).await.unwrap(), candidate);
}

#[tokio::test]
async fn object_refinement_waits_for_fields() {
    // a field error suppresses the cross-field rule
    let err = signup()
        .validate(&json!({"password": "short", "confirmPassword": "other"}))
        .await
        .unwrap_err();
    let tree = err.tree();
    assert!(tree.contains("password"));
    assert!(!tree.contains("confirmPassword"));
}

#[tokio::test]
async fn refine_on_leaf_reports_at_leaf() {
    let schema = formcheck::object().field(
        "termsAccepted",
        formcheck::boolean().refine(|v| v == &json!(true), "You must accept the terms and conditions"),
    );
    let err = schema
        .into_schema()
        .validate(&json!({"termsAccepted": false}))
        .await
        .unwrap_err();
    assert_eq!(
        err.tree().messages("termsAccepted"),
        vec!["You must accept the terms and conditions"]
    );
}

#[tokio::test]
async fn refinement_on_absent_optional_is_skipped() {
    let schema = formcheck::object().field(
        "bio",
        formcheck::string().optional().refine(|_| false, "never"),
    );
    assert!(schema.into_schema().validate(&json!({})).await.is_ok());
}

#[test]
fn unreachable_target_is_a_schema_error() {
    let result = formcheck::object()
        .field("password", formcheck::string())
        .try_refine_at("confirm", |_| true, "x");
    assert_eq!(
        result.unwrap_err(),
        SchemaError::UnreachablePath {
            path: "confirm".into()
        }
    );
}

#[test]
#[should_panic(expected = "not reachable")]
fn refine_at_panics_on_unreachable_target() {
    let _ = formcheck::string().refine_at("nested", |_| true, "x");
}

#[test]
fn refine_at_accepts_nested_and_element_targets() {
    let schema = formcheck::object()
        .field("education", formcheck::array(formcheck::object().field("year", formcheck::number())))
        .try_refine_at("education.0.year", |_| true, "x");
    assert!(schema.is_ok());
}

// ---------------------------------------------------------------------------
// Async rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn taken_username_is_rejected() {
    let err = availability(Duration::from_millis(5))
        .validate(&json!({"username": "admin", "email": "a@example.com"}))
        .await
        .unwrap_err();
    assert_eq!(err.tree().messages("username"), vec!["This username is already taken"]);
    assert!(!err.has_check_failures());
}

#[tokio::test]
async fn free_username_passes() {
    let out = availability(Duration::from_millis(5))
        .validate(&json!({"username": "freshname123", "email": "a@example.com"}))
        .await;
    assert!(out.is_ok());
}

#[tokio::test]
async fn async_check_is_not_run_when_leaf_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let schema = formcheck::string().min(3).refine_async(
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { true }
        },
        "taken",
    );
    assert!(schema.validate(&json!("ab")).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(schema.validate(&json!("abc")).await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sibling_async_checks_run_concurrently() {
    let schema: Schema = formcheck::object()
        .field("a", formcheck::string().refine_async(slow_true, "a"))
        .field("b", formcheck::string().refine_async(slow_true, "b"))
        .into();
    assert!(schema.is_async());

    let started = tokio::time::Instant::now();
    schema.validate(&json!({"a": "x", "b": "y"})).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(190));
}

async fn slow_true(_: Value) -> bool {
    tokio::time::sleep(Duration::from_millis(100)).await;
    true
}

#[tokio::test]
async fn failed_lookup_is_a_check_failure_not_a_rejection() {
    let schema = formcheck::object().field(
        "username",
        formcheck::string().try_refine_async(
            |_| async { Err::<bool, _>(CheckError::unavailable("user service timed out")) },
            "This username is already taken",
        ),
    );
    let err = schema
        .into_schema()
        .validate(&json!({"username": "ada"}))
        .await
        .unwrap_err();

    assert!(err.has_check_failures());
    let tree = err.tree();
    let issue = &tree.issues("username")[0];
    assert_eq!(issue.code, IssueCode::CheckFailed);
    assert_ne!(issue.message, "This username is already taken");
    assert!(issue.message.contains("user service timed out"));
    assert_eq!(tree.check_failures().count(), 1);
}

#[tokio::test]
async fn fallible_check_can_still_reject() {
    let schema = formcheck::string().try_refine_async(|_| async { Ok::<bool, CheckError>(false) }, "taken");
    let err = schema.validate(&json!("ada")).await.unwrap_err();
    assert!(!err.has_check_failures());
    assert_eq!(err.issues[0].message, "taken");
}

#[tokio::test]
async fn async_target_path_on_object() {
    let schema = formcheck::object()
        .field("email", formcheck::string())
        .refine_async_at(
            "email",
            |v: Value| async move { v["email"] != json!("taken@example.com") },
            "Email already registered",
        );
    let err = schema
        .validate(&json!({"email": "taken@example.com"}))
        .await
        .unwrap_err();
    assert_eq!(err.tree().messages("email"), vec!["Email already registered"]);
}

#[tokio::test]
async fn cross_field_lookup_failure_lands_at_target() {
    let schema = formcheck::object()
        .field("username", formcheck::string())
        .field("email", formcheck::string())
        .try_refine_async_at(
            "username",
            |v: Value| async move {
                if v["email"] == json!("offline@example.com") {
                    Err(CheckError::unavailable("directory offline"))
                } else {
                    Ok(v["username"] != json!("admin"))
                }
            },
            "This username is already taken",
        )
        .unwrap();

    let err = schema
        .validate(&json!({"username": "ada", "email": "offline@example.com"}))
        .await
        .unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.issues("username")[0].code, IssueCode::CheckFailed);
    assert!(!tree.contains("email"));

    let err = schema
        .validate(&json!({"username": "admin", "email": "a@example.com"}))
        .await
        .unwrap_err();
    assert!(!err.has_check_failures());
    assert_eq!(err.tree().messages("username"), vec!["This username is already taken"]);
}

#[test]
fn fallible_async_target_must_exist() {
    let result = formcheck::object()
        .field("username", formcheck::string())
        .try_refine_async_at("email", |_: Value| async { Ok::<bool, CheckError>(true) }, "x");
    assert!(matches!(result, Err(SchemaError::UnreachablePath { .. })));
}

#[tokio::test]
async fn digit_only_field_is_a_refinement_target() {
    let schema = formcheck::object()
        .field("2024", formcheck::number())
        .field("2025", formcheck::number())
        .try_refine_at(
            "2025",
            |v| v["2025"].as_f64() >= v["2024"].as_f64(),
            "Must not drop below last year",
        )
        .unwrap();

    let err = schema
        .validate(&json!({"2024": 10, "2025": 5}))
        .await
        .unwrap_err();
    let tree = err.tree();
    assert_eq!(tree.paths().count(), 1);
    assert_eq!(tree.messages("2025"), vec!["Must not drop below last year"]);
    assert_eq!(err.issues[0].path, FieldPath::root().field("2025"));
}
