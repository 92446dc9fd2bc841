use crate::model::{Extensions, ToNode};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt::Display;

/// Builds the JSON object for one node. Unset fields are omitted.
#[derive(Default)]
pub struct ObjectWriter {
    map: Map<String, Value>,
}

impl ObjectWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&mut self, key: &str, value: &str) -> &mut Self {
        self.map.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn opt_string(&mut self, key: &str, value: Option<&String>) -> &mut Self {
        if let Some(value) = value {
            self.string(key, value);
        }
        self
    }

    pub fn opt_bool(&mut self, key: &str, value: Option<bool>) -> &mut Self {
        if let Some(value) = value {
            self.map.insert(key.to_string(), Value::Bool(value));
        }
        self
    }

    pub fn value(&mut self, key: &str, value: Value) -> &mut Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn opt_value(&mut self, key: &str, value: Option<&Value>) -> &mut Self {
        if let Some(value) = value {
            self.map.insert(key.to_string(), value.clone());
        }
        self
    }

    pub fn node<T: ToNode + ?Sized>(&mut self, key: &str, node: &T) -> &mut Self {
        self.map.insert(key.to_string(), node.to_node());
        self
    }

    pub fn opt_node<T: ToNode>(&mut self, key: &str, node: Option<&T>) -> &mut Self {
        if let Some(node) = node {
            self.node(key, node);
        }
        self
    }

    pub fn opt_list<T: ToNode>(&mut self, key: &str, items: Option<&Vec<T>>) -> &mut Self {
        if let Some(items) = items {
            self.map.insert(
                key.to_string(),
                Value::Array(items.iter().map(ToNode::to_node).collect()),
            );
        }
        self
    }

    pub fn opt_strings(&mut self, key: &str, items: Option<&Vec<String>>) -> &mut Self {
        if let Some(items) = items {
            self.map.insert(
                key.to_string(),
                Value::Array(items.iter().cloned().map(Value::String).collect()),
            );
        }
        self
    }

    pub fn opt_map<K: Display, T: ToNode>(
        &mut self,
        key: &str,
        entries: Option<&IndexMap<K, T>>,
    ) -> &mut Self {
        if let Some(entries) = entries {
            self.map.insert(key.to_string(), write_map(entries));
        }
        self
    }

    pub fn opt_string_map(
        &mut self,
        key: &str,
        entries: Option<&IndexMap<String, String>>,
    ) -> &mut Self {
        if let Some(entries) = entries {
            let map = entries
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            self.map.insert(key.to_string(), Value::Object(map));
        }
        self
    }

    pub fn extensions(&mut self, extensions: &Extensions) -> &mut Self {
        for (key, value) in extensions.iter() {
            self.map.insert(key.clone(), value.clone());
        }
        self
    }

    #[must_use]
    pub fn finish(&mut self) -> Value {
        Value::Object(std::mem::take(&mut self.map))
    }
}

/// Writes a keyed collection as a JSON object, keys rendered with `Display`.
pub fn write_map<K: Display, T: ToNode>(entries: &IndexMap<K, T>) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(name, node)| (name.to_string(), node.to_node()))
            .collect(),
    )
}
