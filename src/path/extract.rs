use super::{JsonPath, PathError, PathToken};
use serde_json::Value;

/// Resolve `path` against `document`.
///
/// Returns every matched node in document order. A missing member, an
/// out-of-range index, or indexing into the wrong kind of node matches
/// nothing, so the result is simply empty. Exact paths match at most one
/// node; wildcards may match many.
pub fn extract<'a>(document: &'a Value, path: &JsonPath) -> Vec<&'a Value> {
    let mut current = vec![document];

    for token in path.tokens() {
        let mut next = Vec::new();
        for value in current {
            step(value, token, &mut next);
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

/// Parse `path` and resolve it in one go
pub fn extract_str<'a>(document: &'a Value, path: &str) -> Result<Vec<&'a Value>, PathError> {
    let path = JsonPath::parse(path)?;
    Ok(extract(document, &path))
}

fn step<'a>(value: &'a Value, token: &PathToken, out: &mut Vec<&'a Value>) {
    match (token, value) {
        (PathToken::Key(key), Value::Object(obj)) => {
            if let Some(child) = obj.get(key) {
                out.push(child);
            }
        }
        (PathToken::Index(idx), Value::Array(arr)) => {
            if let Some(child) = arr.get(*idx) {
                out.push(child);
            }
        }
        (PathToken::Wildcard, Value::Object(obj)) => out.extend(obj.values()),
        (PathToken::Wildcard, Value::Array(arr)) => out.extend(arr.iter()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "id": "33333",
            "is_full_report": true,
            "exception": [
                {"error_class": "NotFoundError", "message": "Response code = 404"},
                {"error_class": "NotFoundError", "message": "Response code = 500"}
            ],
            "user": null
        })
    }

    #[test]
    fn test_exact_paths() {
        let doc = event();
        assert_eq!(extract_str(&doc, "$.id").unwrap(), [&json!("33333")]);
        assert_eq!(
            extract_str(&doc, "$.exception[1].message").unwrap(),
            [&json!("Response code = 500")]
        );
        assert_eq!(extract_str(&doc, "$.user").unwrap(), [&Value::Null]);
    }

    #[test]
    fn test_root_returns_document() {
        let doc = event();
        assert_eq!(extract(&doc, &JsonPath::root()), [&doc]);
    }

    #[test]
    fn test_missing_values_are_empty() {
        let doc = event();
        assert!(extract_str(&doc, "$.missing").unwrap().is_empty());
        assert!(extract_str(&doc, "$.exception[5]").unwrap().is_empty());
        assert!(extract_str(&doc, "$.id[0]").unwrap().is_empty());
        assert!(extract_str(&doc, "$.exception.error_class").unwrap().is_empty());
        assert!(extract_str(&doc, "$.user.name").unwrap().is_empty());
    }

    #[test]
    fn test_wildcards_fan_out() {
        let doc = event();
        assert_eq!(
            extract_str(&doc, "$.exception[*].error_class").unwrap(),
            [&json!("NotFoundError"), &json!("NotFoundError")]
        );
        assert_eq!(extract_str(&doc, "$.exception[*].missing").unwrap().len(), 0);
        assert_eq!(extract_str(&doc, "$.*").unwrap().len(), 4);
    }

    #[test]
    fn test_invalid_path_is_error() {
        assert!(extract_str(&event(), "exception").is_err());
    }
}
