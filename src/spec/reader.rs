use crate::constants::is_extension_key;
use crate::error::Error;
use crate::model::{Extensions, FromNode};
use crate::pointer::escape;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Reads the fields of one JSON object into a node.
///
/// Every accessor marks its key as consumed. [`ObjectReader::finish`] then
/// gathers the `x-*` keys into [`Extensions`] and rejects anything else, so a
/// typo in a field name is a parse error instead of silently lost data.
pub struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
    consumed: HashSet<&'static str>,
}

impl<'a> ObjectReader<'a> {
    /// # Errors
    ///
    /// Returns a parse error if `value` is not a JSON object.
    pub fn new(value: &'a Value, path: &'a str, what: &str) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::parse_error(
                path,
                format!("{what} must be an object, found {}", type_name(value)),
            ));
        };
        Ok(Self {
            map,
            path,
            consumed: HashSet::new(),
        })
    }

    #[must_use]
    pub fn child_path(&self, key: &str) -> String {
        format!("{}/{}", self.path, escape(key))
    }

    #[must_use]
    pub const fn path(&self) -> &str {
        self.path
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Any JSON value, unchecked.
    pub fn value(&mut self, key: &'static str) -> Option<Value> {
        self.take(key).cloned()
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is present with a non-string value.
    pub fn string(&mut self, key: &'static str) -> Result<Option<String>, Error> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(key, "a string", other)),
        }
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is missing or not a string.
    pub fn required_string(&mut self, key: &'static str) -> Result<String, Error> {
        self.string(key)?.ok_or_else(|| self.missing(key))
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is present with a non-boolean value.
    pub fn bool(&mut self, key: &'static str) -> Result<Option<bool>, Error> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(key, "a boolean", other)),
        }
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is present and is not an array of strings.
    pub fn string_list(&mut self, key: &'static str) -> Result<Option<Vec<String>>, Error> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(self.wrong_type(key, "an array", value));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::parse_error(
                        format!("{}/{i}", self.child_path(key)),
                        format!("expected a string, found {}", type_name(item)),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is present with an invalid value.
    pub fn node<T: FromNode>(&mut self, key: &'static str) -> Result<Option<T>, Error> {
        match self.take(key) {
            None => Ok(None),
            Some(value) => T::from_node(value, &self.child_path(key)).map(Some),
        }
    }

    /// # Errors
    ///
    /// Returns a parse error if the key is missing or its value is invalid.
    pub fn required_node<T: FromNode>(&mut self, key: &'static str) -> Result<T, Error> {
        self.node(key)?.ok_or_else(|| self.missing(key))
    }

    /// A list of nodes.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the value is not an array or an element is invalid.
    pub fn list<T: FromNode>(&mut self, key: &'static str) -> Result<Option<Vec<T>>, Error> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(self.wrong_type(key, "an array", value));
        };
        let base = self.child_path(key);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_node(item, &format!("{base}/{i}")))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// A name → node map, in input order.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the value is not an object or an entry is invalid.
    pub fn map<T: FromNode>(
        &mut self,
        key: &'static str,
    ) -> Result<Option<IndexMap<String, T>>, Error> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let path = self.child_path(key);
        read_map(value, &path).map(Some)
    }

    /// A name → string map (OAuth scopes, discriminator-like tables).
    ///
    /// # Errors
    ///
    /// Returns a parse error if the value is not an object of strings.
    pub fn string_map(
        &mut self,
        key: &'static str,
    ) -> Result<Option<IndexMap<String, String>>, Error> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let Value::Object(map) = value else {
            return Err(self.wrong_type(key, "an object", value));
        };
        let base = self.child_path(key);
        map.iter()
            .map(|(name, item)| {
                item.as_str()
                    .map(|s| (name.clone(), s.to_string()))
                    .ok_or_else(|| {
                        Error::parse_error(
                            format!("{base}/{}", escape(name)),
                            format!("expected a string, found {}", type_name(item)),
                        )
                    })
            })
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Some)
    }

    /// Consumes the reader, returning extension data.
    ///
    /// # Errors
    ///
    /// Returns a parse error listing every key that is neither a known field
    /// nor an `x-` extension.
    pub fn finish(self) -> Result<Extensions, Error> {
        let mut extensions = IndexMap::new();
        let mut unknown = Vec::new();
        for (key, value) in self.map {
            if self.consumed.contains(key.as_str()) {
                continue;
            }
            if is_extension_key(key) {
                extensions.insert(key.clone(), value.clone());
            } else {
                unknown.push(key.as_str());
            }
        }
        if !unknown.is_empty() {
            return Err(Error::parse_error(
                self.path,
                format!("unexpected key(s): {}", unknown.join(", ")),
            ));
        }
        Ok(Extensions::from_entries(extensions))
    }

    fn take(&mut self, key: &'static str) -> Option<&'a Value> {
        self.consumed.insert(key);
        self.map.get(key)
    }

    fn missing(&self, key: &str) -> Error {
        Error::parse_error(self.path, format!("missing required field '{key}'"))
    }

    fn wrong_type(&self, key: &str, expected: &str, found: &Value) -> Error {
        Error::parse_error(
            self.child_path(key),
            format!("expected {expected}, found {}", type_name(found)),
        )
    }
}

/// Reads an object of nodes keyed by name.
///
/// # Errors
///
/// Returns a parse error if `value` is not an object or an entry is invalid.
pub fn read_map<T: FromNode>(value: &Value, path: &str) -> Result<IndexMap<String, T>, Error> {
    let Value::Object(map) = value else {
        return Err(Error::parse_error(
            path,
            format!("expected an object, found {}", type_name(value)),
        ));
    };
    map.iter()
        .map(|(name, item)| {
            T::from_node(item, &format!("{path}/{}", escape(name))).map(|node| (name.clone(), node))
        })
        .collect()
}

#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_extensions_and_rejects_unknown_keys() {
        let value = json!({"name": "a", "x-one": 1});
        let mut reader = ObjectReader::new(&value, "/tags/0", "tag").unwrap();
        assert_eq!(reader.required_string("name").unwrap(), "a");
        let ext = reader.finish().unwrap();
        assert_eq!(ext.get("x-one"), Some(&json!(1)));

        let value = json!({"name": "a", "nmae": "typo"});
        let mut reader = ObjectReader::new(&value, "/tags/0", "tag").unwrap();
        reader.required_string("name").unwrap();
        let err = reader.finish().unwrap_err();
        assert!(err.to_string().contains("nmae"));
    }

    #[test]
    fn type_errors_carry_child_path() {
        let value = json!({"deprecated": "yes"});
        let mut reader = ObjectReader::new(&value, "/paths/~1a/get", "operation").unwrap();
        let err = reader.bool("deprecated").unwrap_err();
        assert!(matches!(err, Error::Parse { ref path, .. } if path == "/paths/~1a/get/deprecated"));
    }

    #[test]
    fn missing_required_field() {
        let value = json!({});
        let mut reader = ObjectReader::new(&value, "/info", "info").unwrap();
        let err = reader.required_string("title").unwrap_err();
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn non_object_is_rejected() {
        let value = json!([1]);
        assert!(ObjectReader::new(&value, "/info", "info").is_err());
    }
}
