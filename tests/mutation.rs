use formcheck::mutation::{append, insert, remove, MutationError};
use serde_json::json;

#[test]
fn append_returns_new_index() {
    let mut v = json!({"education": []});
    assert_eq!(append(&mut v, "education", json!({"institution": ""})), Ok(0));
    assert_eq!(append(&mut v, "education", json!({"institution": "MIT"})), Ok(1));
    assert_eq!(v["education"][1]["institution"], "MIT");
}

#[test]
fn insert_shifts_later_elements() {
    let mut v = json!({"skills": ["a", "c"]});
    insert(&mut v, "skills", 1, json!("b")).unwrap();
    assert_eq!(v["skills"], json!(["a", "b", "c"]));
    insert(&mut v, "skills", 3, json!("d")).unwrap();
    assert_eq!(v["skills"], json!(["a", "b", "c", "d"]));
}

#[test]
fn remove_keeps_order_of_the_rest() {
    let mut v = json!({"skills": [{"name": "a"}, {"name": "b"}, {"name": "c"}]});
    let removed = remove(&mut v, "skills", 1).unwrap();
    assert_eq!(removed, json!({"name": "b"}));
    assert_eq!(v["skills"], json!([{"name": "a"}, {"name": "c"}]));
}

#[test]
fn out_of_bounds() {
    let mut v = json!({"skills": ["a"]});
    assert_eq!(
        remove(&mut v, "skills", 1),
        Err(MutationError::IndexOutOfBounds {
            path: "skills".into(),
            index: 1,
            len: 1
        })
    );
    assert!(insert(&mut v, "skills", 3, json!("x")).is_err());
    assert_eq!(v["skills"], json!(["a"]));
}

#[test]
fn errors_render_the_path() {
    let mut v = json!({});
    let err = append(&mut v, "personalInfo.tags", json!("x")).unwrap_err();
    assert_eq!(err.to_string(), "no value at `personalInfo.tags`");
}

#[test]
fn root_array_is_addressable() {
    let mut v = json!([1]);
    assert_eq!(append(&mut v, "", json!(2)), Ok(1));
    assert_eq!(v, json!([1, 2]));
}
