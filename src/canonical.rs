use serde_json::Value;

/// Error raised when a value cannot be canonicalized.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("non-finite number at {0}")]
    NonFiniteNumber(String),

    #[error("value not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize a JSON value into its canonical byte form: object keys in
/// lexicographic order, `,` and `:` separators, no insignificant
/// whitespace. The same logical mapping always yields byte-identical
/// output regardless of insertion order, so the result is safe to hash.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    write_value(value, &mut out, "$")?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>, path: &str) -> Result<(), EncodingError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(EncodingError::NonFiniteNumber(path.to_string()));
                }
            }
            out.extend_from_slice(n.to_string().as_bytes());
        }
        Value::String(s) => {
            out.extend_from_slice(serde_json::to_string(s)?.as_bytes());
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out, &format!("{path}[{i}]"))?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(serde_json::to_string(key)?.as_bytes());
                out.push(b':');
                write_value(&map[*key], out, &format!("{path}.{key}"))?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_keys_sorted_no_whitespace() {
        let value = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "random": 1,
            "signature_type": "X",
            "hash_alg": "SHA-256",
        });
        let bytes = canonical_bytes(&value).unwrap();
        assert_eq!(
            bytes,
            br#"{"hash_alg":"SHA-256","random":1,"signature_type":"X","timestamp":"2024-01-01T00:00:00Z"}"#
        );
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let mut a = Map::new();
        a.insert("zebra".to_string(), json!(1));
        a.insert("alpha".to_string(), json!("x"));

        let mut b = Map::new();
        b.insert("alpha".to_string(), json!("x"));
        b.insert("zebra".to_string(), json!(1));

        assert_eq!(
            canonical_bytes(&Value::Object(a)).unwrap(),
            canonical_bytes(&Value::Object(b)).unwrap()
        );
    }

    #[test]
    fn test_nested_structures() {
        let value = json!({"b": {"d": [1, 2, null], "c": true}, "a": false});
        let bytes = canonical_bytes(&value).unwrap();
        assert_eq!(bytes, br#"{"a":false,"b":{"c":true,"d":[1,2,null]}}"#);
    }

    #[test]
    fn test_string_escaping() {
        let value = json!({"k": "line\nbreak \"quoted\""});
        let bytes = canonical_bytes(&value).unwrap();
        assert_eq!(bytes, br#"{"k":"line\nbreak \"quoted\""}"#);
    }

    #[test]
    fn test_integers_render_without_fraction() {
        let value = json!({"n": 4294967295u32});
        assert_eq!(canonical_bytes(&value).unwrap(), br#"{"n":4294967295}"#);
    }
}
