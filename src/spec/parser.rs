use crate::error::Error;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Parses JSON or YAML content into the generic JSON tree every node parser consumes.
///
/// Content whose first non-whitespace character is `{` is read as JSON first and
/// falls back to YAML; anything else is read as YAML first and falls back to JSON.
///
/// # Errors
///
/// Returns an error if the content is neither valid JSON nor valid YAML, or if
/// the YAML cannot be represented as JSON (non-finite numbers, complex keys).
pub fn parse_content(content: &str) -> Result<Value, Error> {
    if content.trim_start().starts_with('{') {
        parse_json_with_fallback(content)
    } else {
        parse_yaml_with_fallback(content)
    }
}

/// Parse JSON content with YAML fallback
fn parse_json_with_fallback(content: &str) -> Result<Value, Error> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            if let Ok(yaml) = serde_yaml::from_str::<YamlValue>(content) {
                return yaml_to_json(yaml);
            }
            Err(Error::Json(json_err))
        }
    }
}

/// Parse YAML content with JSON fallback
fn parse_yaml_with_fallback(content: &str) -> Result<Value, Error> {
    match serde_yaml::from_str::<YamlValue>(content) {
        Ok(yaml) => yaml_to_json(yaml),
        Err(yaml_err) => {
            if let Ok(value) = serde_json::from_str::<Value>(content) {
                return Ok(value);
            }
            Err(Error::Yaml(yaml_err))
        }
    }
}

/// Transcodes a YAML tree into a JSON tree.
///
/// Scalar mapping keys (`200:`, `true:`) become strings; tags are dropped.
///
/// # Errors
///
/// Returns a parse error for non-finite floats and non-scalar mapping keys.
pub fn yaml_to_json(yaml: YamlValue) -> Result<Value, Error> {
    transcode(yaml, "")
}

fn transcode(yaml: YamlValue, path: &str) -> Result<Value, Error> {
    Ok(match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => transcode_number(&n, path)?,
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| transcode(item, &format!("{path}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = scalar_key(key, path)?;
                let child = format!("{path}/{}", crate::pointer::escape(&key));
                map.insert(key, transcode(value, &child)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => transcode(tagged.value, path)?,
    })
}

fn transcode_number(n: &serde_yaml::Number, path: &str) -> Result<Value, Error> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Number(i.into()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::Number(u.into()));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::parse_error(path, format!("number '{n}' cannot be represented in JSON")))
}

fn scalar_key(key: YamlValue, path: &str) -> Result<String, Error> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => scalar_key(tagged.value, path),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Error::parse_error(
            path,
            "mapping keys must be scalars",
        )),
    }
}

/// Serializes a JSON tree as YAML text.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn to_yaml_string(value: &Value) -> Result<String, Error> {
    Ok(serde_yaml::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json() {
        let value = parse_content(r#"{"openapi": "3.1.0", "paths": {}}"#).unwrap();
        assert_eq!(value["openapi"], "3.1.0");
    }

    #[test]
    fn parses_yaml_with_numeric_keys() {
        let value = parse_content(
            r"
responses:
  200:
    description: ok
  default:
    description: error
",
        )
        .unwrap();
        assert_eq!(value["responses"]["200"]["description"], "ok");
        assert_eq!(value["responses"]["default"]["description"], "error");
    }

    #[test]
    fn yaml_keeps_key_order() {
        let value = parse_content("b: 1\na: 2\nc: 3\n").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn yaml_numbers_and_tags() {
        let value = parse_content("a: 1.5\nb: -3\nc: !custom 7\n").unwrap();
        assert_eq!(value, json!({"a": 1.5, "b": -3, "c": 7}));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let err = parse_content("a: .nan\n").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn invalid_content_fails() {
        assert!(parse_content("not: valid: yaml: at: all:").is_err());
        assert!(parse_content("{ broken json").is_err());
    }
}
