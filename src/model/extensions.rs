use crate::error::Error;
use crate::lookup::{LookupResult, Node};
use crate::pointer::evaluate_segments;
use indexmap::IndexMap;
use serde_json::Value;

/// Vendor extension data (`x-*` keys) attached to a node.
///
/// "No extensions" is `None` rather than an empty map so that serialization
/// never produces an artificial `{}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions(Option<IndexMap<String, Value>>);

impl Extensions {
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_ref().and_then(|map| map.get(key))
    }

    /// Inserts an extension value.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `key` does not start with `x-`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>, Error> {
        let key = key.into();
        if !crate::constants::is_extension_key(&key) {
            return Err(Error::parse_error(
                crate::pointer::escape(&key),
                "extension keys must start with 'x-'",
            ));
        }
        Ok(self.0.get_or_insert_with(IndexMap::new).insert(key, value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.0.as_mut().and_then(|map| map.shift_remove(key));
        if self.0.as_ref().is_some_and(IndexMap::is_empty) {
            self.0 = None;
        }
        removed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_none_or(IndexMap::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().flat_map(IndexMap::iter)
    }

    /// Evaluates `keys` as a JSON Pointer into the extension data.
    pub(crate) fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(None);
        };
        Ok(self
            .get(first)
            .and_then(|value| evaluate_segments(rest, value))
            .map(|value| Node::Json(value.clone())))
    }

    /// These extensions laid over `base`: every key of either, with this
    /// side's value winning.
    pub(crate) fn merge_over(&self, base: &Self) -> Self {
        let mut merged = base.0.clone().unwrap_or_default();
        for (key, value) in self.iter() {
            merged.insert(key.clone(), value.clone());
        }
        Self::from_entries(merged)
    }

    pub(crate) fn from_entries(entries: IndexMap<String, Value>) -> Self {
        if entries.is_empty() {
            Self(None)
        } else {
            Self(Some(entries))
        }
    }
}
