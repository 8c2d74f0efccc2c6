//! Decoding of urlencoded bodies with bracketed keys.
//!
//! The admin form posts keys such as `shipment[items][11]=2` and
//! `packages[1][params][shipping_product]=DPD`. The pairs are folded into a
//! JSON tree so typed forms can be deserialized with serde. Objects keep the
//! order in which keys first appeared in the body.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::forms::FormError;

/// Decodes a urlencoded body into a nested JSON object.
pub fn parse_nested(body: &[u8]) -> Result<Value, FormError> {
    let pairs: Vec<(String, String)> =
        serde_html_form::from_bytes(body).map_err(|e| FormError::Malformed(e.to_string()))?;

    let mut root = Value::Object(Map::new());
    for (key, value) in pairs {
        let path = split_key(&key);
        if path.is_empty() {
            continue;
        }
        insert(&mut root, &path, value);
    }
    Ok(root)
}

/// Deserializes a tree built by [`parse_nested`] into `T`.
pub fn decode<T: DeserializeOwned>(tree: Value) -> Result<T, FormError> {
    serde_json::from_value(tree).map_err(|e| FormError::Malformed(e.to_string()))
}

/// Splits `a[b][][c]` into `["a", "b", "", "c"]`. An unterminated bracket is
/// kept as part of the key.
fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return if key.is_empty() { vec![] } else { vec![key] };
    };
    if open == 0 {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return vec![key];
        };
        segments.push(&stripped[..close]);
        rest = &stripped[close + 1..];
    }
    segments
}

fn insert(node: &mut Value, path: &[&str], value: String) {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    let key = match path[0] {
        "" => next_index(map).to_string(),
        named => named.to_string(),
    };

    if path.len() == 1 {
        map.insert(key, Value::String(value));
        return;
    }

    let child = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    insert(child, &path[1..], value);
}

/// Index used by `a[]`: one past the largest numeric key already present.
fn next_index(map: &Map<String, Value>) -> u64 {
    map.keys()
        .filter_map(|key| key.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

/// Accepts either a JSON array or an object whose values form the list, in
/// body order. Used for `packages[1][..]` and `tracking[0][..]` style lists.
pub fn ordered_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let values = match value {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::String(s) if s.is_empty() => Vec::new(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a list, got {other}"
            )));
        }
    };

    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}

/// `!empty(...)` style check: present, non-empty and not `"0"`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// `isset(...)` style check: the key was submitted, whatever its value.
pub fn is_set(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn split_key_handles_brackets() {
        assert_eq!(split_key("order_id"), vec!["order_id"]);
        assert_eq!(split_key("shipment[items][11]"), vec!["shipment", "items", "11"]);
        assert_eq!(split_key("tracking[][number]"), vec!["tracking", "", "number"]);
        assert_eq!(split_key("broken[key"), vec!["broken[key"]);
        assert!(split_key("").is_empty());
    }

    #[test]
    fn nested_tree_keeps_body_order() {
        let body = b"order_id=5&packages%5B2%5D%5Bparams%5D%5Bshipping_product%5D=B\
&packages%5B1%5D%5Bparams%5D%5Bshipping_product%5D=A&shipment%5Bsend_email%5D=1";

        let tree = parse_nested(body).unwrap();

        assert_eq!(tree["order_id"], "5");
        assert_eq!(tree["shipment"]["send_email"], "1");
        let keys: Vec<_> = tree["packages"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["2", "1"]);
    }

    #[test]
    fn empty_brackets_append() {
        let tree = parse_nested(b"tracking[][number]=A1&tracking[][number]=B2").unwrap();
        assert_eq!(
            tree["tracking"],
            json!({"0": {"number": "A1"}, "1": {"number": "B2"}})
        );
    }

    #[test]
    fn empty_brackets_follow_explicit_indexes() {
        let tree =
            parse_nested(b"tracking[1][number]=A1&tracking[][number]=B2&tracking[][number]=C3")
                .unwrap();
        assert_eq!(
            tree["tracking"],
            json!({"1": {"number": "A1"}, "2": {"number": "B2"}, "3": {"number": "C3"}})
        );
    }

    #[test]
    fn truthiness_follows_form_conventions() {
        assert!(is_truthy(Some(&json!("1"))));
        assert!(is_truthy(Some(&json!("on"))));
        assert!(!is_truthy(Some(&json!("0"))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(None));

        assert!(is_set(Some(&json!("0"))));
        assert!(is_set(Some(&json!(""))));
        assert!(!is_set(None));
    }
}
