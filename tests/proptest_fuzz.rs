//! Property-based (fuzz) tests: validators never panic on arbitrary JSON
//! input, and validating twice gives the same outcome.

use formcheck::prelude::*;
use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::Value;

// -----------------------------------------------------------------------
// Helpers: arbitrary JSON value generators
// -----------------------------------------------------------------------

fn arb_json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| serde_json::json!(f)),
        any::<i64>().prop_map(|i| serde_json::json!(i)),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(
        3,  // max depth
        64, // max nodes
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec(("[a-z_]{1,8}", inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        },
    )
}

/// Candidates shaped like the signup form, with arbitrary leaves.
fn arb_signup() -> impl Strategy<Value = Value> {
    (arb_json_value(), arb_json_value(), arb_json_value(), arb_json_value()).prop_map(
        |(username, password, confirm, skills)| {
            serde_json::json!({
                "username": username,
                "password": password,
                "confirmPassword": confirm,
                "skills": skills,
            })
        },
    )
}

fn signup() -> Schema {
    formcheck::object()
        .field("username", formcheck::string().trim().min(3).max(20))
        .field("password", formcheck::string().min(8))
        .field("confirmPassword", formcheck::string())
        .field(
            "skills",
            formcheck::array(
                formcheck::object()
                    .field("name", formcheck::string().min(1))
                    .field("level", formcheck::enumeration(&["Beginner", "Expert"])),
            )
            .min_len(1)
            .max_len(3),
        )
        .field_optional("bio", formcheck::string().max(200))
        .refine_at(
            "confirmPassword",
            |v| v["password"] == v["confirmPassword"],
            "Passwords don't match",
        )
}

fn all_kinds() -> Vec<Schema> {
    vec![
        formcheck::string().min(1).max(100).into(),
        formcheck::string().email().into(),
        formcheck::string().coerce().to_lowercase().into(),
        formcheck::number().int().positive().min(18).max(120).into(),
        formcheck::number().coerce().multiple_of(0.5).into(),
        formcheck::boolean().coerce().accepted("must accept").into(),
        formcheck::enumeration(&["a", "b"]).into(),
        formcheck::array(formcheck::number()).min_len(1).into(),
        formcheck::object().strict().field("a", formcheck::string()).into(),
        formcheck::optional(formcheck::string()),
        signup(),
    ]
}

proptest! {
    #[test]
    fn validators_never_panic(val in arb_json_value()) {
        for schema in all_kinds() {
            let _ = block_on(schema.validate(&val));
            let _ = block_on(schema.validate_with(&val, &ValidationOptions::all_failures()));
        }
    }

    #[test]
    fn form_shaped_candidates_never_panic(val in arb_signup()) {
        let schema = signup();
        if let Err(err) = block_on(schema.validate(&val)) {
            prop_assert!(!err.issues.is_empty());
            let tree = err.tree();
            prop_assert!(!tree.is_empty());
            let _ = tree.nested();
            let _ = formcheck::format::prettify_error(&err);
        }
    }

    #[test]
    fn validation_is_idempotent(val in arb_signup()) {
        let schema = signup();
        let first = block_on(schema.validate(&val));
        let second = block_on(schema.validate(&val));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn accepted_output_validates_again(val in arb_json_value()) {
        for schema in all_kinds() {
            if let Ok(out) = block_on(schema.validate(&val)) {
                prop_assert!(block_on(schema.validate(&out)).is_ok());
            }
        }
    }

    #[test]
    fn string_length_bounds_hold(s in ".{0,40}") {
        let schema: Schema = formcheck::string().min(5).max(20).into();
        let len = s.chars().count();
        let ok = block_on(schema.validate(&Value::String(s))).is_ok();
        prop_assert_eq!(ok, (5..=20).contains(&len));
    }

    #[test]
    fn error_paths_round_trip(val in arb_signup()) {
        if let Err(err) = block_on(signup().validate(&val)) {
            for issue in &err.issues {
                let text = issue.path.to_string();
                prop_assert_eq!(&FieldPath::from(text.as_str()), &issue.path);
            }
        }
    }
}
