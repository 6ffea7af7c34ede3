use serde_json::{Map, Value};

/// Strips MongoDB operator-shaped keys from untrusted input before it
/// reaches validation or filter construction. A key is dropped when it
/// starts with `$` or contains `.` (operator and path sigils). Arrays and
/// nested objects are cleaned recursively; scalars pass through untouched.
///
/// Pure and idempotent: sanitizing already-clean input returns an equal
/// value.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut clean = Map::with_capacity(map.len());
            for (key, val) in map {
                if is_operator_key(key) {
                    log::warn!("🧹 Dropping operator-shaped key from input: {}", key);
                    continue;
                }
                clean.insert(key.clone(), sanitize(val));
            }
            Value::Object(clean)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

/// Same cleaning applied to a query-string map (key/value pairs).
pub fn sanitize_query(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(key, _)| !is_operator_key(key))
        .cloned()
        .collect()
}

fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_operator_keys() {
        let input = json!({"email": {"$gt": ""}, "password": "secret"});
        let clean = sanitize(&input);
        assert_eq!(clean, json!({"email": {}, "password": "secret"}));
    }

    #[test]
    fn test_strips_nested_and_array_keys() {
        let input = json!({
            "filter": {"$where": "sleep(1000)", "status": "pending"},
            "items": [{"$inc": {"qty": 1}, "name": "ok"}]
        });
        let clean = sanitize(&input);
        assert_eq!(
            clean,
            json!({
                "filter": {"status": "pending"},
                "items": [{"name": "ok"}]
            })
        );
    }

    #[test]
    fn test_strips_dotted_keys() {
        let input = json!({"a.b": 1, "plain": 2});
        assert_eq!(sanitize(&input), json!({"plain": 2}));
    }

    #[test]
    fn test_clean_input_unchanged() {
        let input = json!({
            "user": "64f0c2",
            "products": ["a", "b"],
            "totalAmount": 19.90,
            "nested": {"status": "pending", "tags": [1, 2, 3]}
        });
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn test_idempotent() {
        let input = json!({"$set": {"x": 1}, "keep": {"$or": [], "y": [{"$a": 1}]}});
        let once = sanitize(&input);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(sanitize(&json!("$gt")), json!("$gt"));
        assert_eq!(sanitize(&json!(42)), json!(42));
        assert_eq!(sanitize(&json!(null)), json!(null));
    }

    #[test]
    fn test_sanitize_query() {
        let params = vec![
            ("status".to_string(), "pending".to_string()),
            ("$where".to_string(), "1==1".to_string()),
        ];
        let clean = sanitize_query(&params);
        assert_eq!(clean, vec![("status".to_string(), "pending".to_string())]);
    }
}
