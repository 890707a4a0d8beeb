use super::JsonPath;
use serde_json::Value;
use std::collections::HashSet;

/// List every addressable path in `document`, in document order.
///
/// The bare root is never included. Object members are emitted before
/// their children; array elements that are themselves objects or arrays
/// are emitted after their children, so an event with
/// `"exception": [{"error_class": ..}]` yields `$.exception`,
/// `$.exception[0].error_class`, then `$.exception[0]`.
///
/// Duplicate paths keep their first position.
pub fn enumerate_paths(document: &Value) -> Vec<JsonPath> {
    let mut paths = Vec::new();
    walk(document, &JsonPath::root(), &mut paths);
    dedup_paths(paths)
}

/// Remove repeated paths by canonical string, keeping first-seen order
pub(crate) fn dedup_paths(paths: impl IntoIterator<Item = JsonPath>) -> Vec<JsonPath> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.to_string()))
        .collect()
}

fn walk(value: &Value, at: &JsonPath, paths: &mut Vec<JsonPath>) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = at.key(key.as_str());
                paths.push(path.clone());
                if is_composite(child) {
                    walk(child, &path, paths);
                }
            }
        }
        Value::Array(arr) => {
            for (idx, child) in arr.iter().enumerate() {
                let path = at.index(idx);
                if is_composite(child) {
                    walk(child, &path, paths);
                }
                paths.push(path);
            }
        }
        _ => {
            // Scalars have no children
        }
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::extract;
    use serde_json::json;

    fn strings(paths: &[JsonPath]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn sample_event() -> Value {
        json!({
            "id": "33333",
            "url": "https://api.bugsnag.com/projects/11111/events/33333",
            "exception": [
                {"error_class": "NotFoundError", "message": "Response code = 404"}
            ]
        })
    }

    #[test]
    fn test_document_order() {
        let paths = enumerate_paths(&sample_event());
        assert_eq!(
            strings(&paths),
            [
                "$.id",
                "$.url",
                "$.exception",
                "$.exception[0].error_class",
                "$.exception[0].message",
                "$.exception[0]",
            ]
        );
    }

    #[test]
    fn test_scalar_arrays_and_nested_arrays() {
        let doc = json!({"tags": ["a", "b"], "grid": [[1], []]});
        assert_eq!(
            strings(&enumerate_paths(&doc)),
            [
                "$.tags",
                "$.tags[0]",
                "$.tags[1]",
                "$.grid",
                "$.grid[0][0]",
                "$.grid[0]",
                "$.grid[1]",
            ]
        );
    }

    #[test]
    fn test_scalar_and_empty_documents() {
        assert!(enumerate_paths(&json!(42)).is_empty());
        assert!(enumerate_paths(&json!({})).is_empty());
        assert!(enumerate_paths(&json!(null)).is_empty());
    }

    #[test]
    fn test_top_level_array() {
        let doc = json!([{"id": 1}, 2]);
        assert_eq!(strings(&enumerate_paths(&doc)), ["$[0].id", "$[0]", "$[1]"]);
    }

    #[test]
    fn test_no_duplicates_and_no_root() {
        let doc = json!({
            "a": {"b": [1, {"c": null}], "d": {}},
            "app.version": "1.0",
            "metaData": {"x": [true, false, [1, 2]]}
        });
        let paths = strings(&enumerate_paths(&doc));
        let unique: HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), paths.len());
        assert!(!paths.iter().any(|p| p == "$"));
    }

    #[test]
    fn test_every_enumerated_path_extracts() {
        let doc = json!({
            "id": "1",
            "app.version": "1.0",
            "exception": [{"stacktrace": [{"file": "a.rb", "lineNumber": 3}]}],
            "breadcrumbs": [],
            "metaData": {"it's": {"nested": [null, 0.5]}}
        });
        for path in enumerate_paths(&doc) {
            let reparsed = JsonPath::parse(&path.to_string()).unwrap();
            assert_eq!(reparsed, path);
            assert_eq!(extract(&doc, &path).len(), 1, "{} did not extract", path);
        }
    }

    #[test]
    fn test_dedup_keeps_first_position() {
        let a = JsonPath::root().key("a");
        let b = JsonPath::root().key("b");
        let deduped = dedup_paths(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(deduped, [a, b]);
    }

    // Property-based checks over arbitrary documents
    mod proptest_documents {
        use super::*;
        use proptest::prelude::*;

        fn arb_document() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                ".{0,8}".prop_map(Value::from),
            ];
            leaf.prop_recursive(4, 48, 6, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                    // Keys deliberately include path syntax characters
                    prop::collection::vec((r#"[a-z0-9 .'"\[\]*\\$]{0,6}"#, inner), 0..6)
                        .prop_map(|members| Value::Object(members.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn enumerated_paths_are_unique_and_never_root(doc in arb_document()) {
                let paths = strings(&enumerate_paths(&doc));
                let unique: HashSet<_> = paths.iter().collect();
                prop_assert_eq!(unique.len(), paths.len());
                prop_assert!(!paths.iter().any(|p| p == "$"));
            }

            #[test]
            fn enumerated_paths_extract_exactly_one_value(doc in arb_document()) {
                for path in enumerate_paths(&doc) {
                    let text = path.to_string();
                    let reparsed = JsonPath::parse(&text);
                    prop_assert!(reparsed.is_ok(), "{} did not parse", text);
                    prop_assert_eq!(reparsed.unwrap(), path.clone());
                    prop_assert_eq!(extract(&doc, &path).len(), 1, "{} did not extract", text);
                }
            }
        }
    }
}
