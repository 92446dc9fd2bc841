use crate::constants::{
    is_extension_key, COMPONENT_PATH_ITEMS, HTTP_METHOD_DELETE, HTTP_METHOD_GET, HTTP_METHOD_HEAD,
    HTTP_METHOD_OPTIONS, HTTP_METHOD_PATCH, HTTP_METHOD_POST, HTTP_METHOD_PUT, HTTP_METHOD_TRACE,
    KEY_REF,
};
use crate::error::Error;
use crate::lookup::{resolve_child, resolve_indexed, Addressable, LookupResult, Node};
use crate::model::reference::{component_target, validate_target};
use crate::model::{Component, Extensions, FromNode, Operation, ParameterOrRef, Server, ToNode};
use crate::path_template::PathTemplate;
use crate::pointer::escape;
use crate::spec::reader::{type_name, ObjectReader};
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The `$ref` of a path item. Unlike other references it sits next to local
/// fields, and resolution merges rather than replaces.
#[derive(Debug, Clone)]
pub struct PathItemReference {
    target: String,
    resolved: Option<Box<PathItem>>,
}

impl PathItemReference {
    /// # Errors
    ///
    /// Returns a parse error if `target` is not a valid `$ref`.
    pub fn new(target: impl Into<String>) -> Result<Self, Error> {
        let target = target.into();
        validate_target(&target, "")?;
        Ok(Self {
            target,
            resolved: None,
        })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The referenced path item as found at the target, before merging.
    #[must_use]
    pub fn resolved(&self) -> Option<&PathItem> {
        self.resolved.as_deref()
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub(crate) fn set_resolved(&mut self, target: PathItem) -> bool {
        if self.resolved.is_some() {
            return false;
        }
        self.resolved = Some(Box::new(target));
        true
    }
}

impl PartialEq for PathItemReference {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub reference: Option<PathItemReference>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    pub servers: Option<Vec<Server>>,
    pub parameters: Option<Vec<ParameterOrRef>>,
    pub extensions: Extensions,
}

impl PathItem {
    /// A path item that only refers to `#/components/pathItems/<name>`.
    #[must_use]
    pub fn to_component(name: &str) -> Self {
        Self {
            reference: Some(PathItemReference {
                target: component_target(COMPONENT_PATH_ITEMS, name),
                resolved: None,
            }),
            ..Self::default()
        }
    }

    /// Operations in declaration order, keyed by lowercase HTTP method.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            (HTTP_METHOD_GET, self.get.as_ref()),
            (HTTP_METHOD_PUT, self.put.as_ref()),
            (HTTP_METHOD_POST, self.post.as_ref()),
            (HTTP_METHOD_DELETE, self.delete.as_ref()),
            (HTTP_METHOD_OPTIONS, self.options.as_ref()),
            (HTTP_METHOD_HEAD, self.head.as_ref()),
            (HTTP_METHOD_PATCH, self.patch.as_ref()),
            (HTTP_METHOD_TRACE, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }

    pub(crate) fn operations_mut(&mut self) -> [(&'static str, Option<&mut Operation>); 8] {
        [
            (HTTP_METHOD_GET, self.get.as_mut()),
            (HTTP_METHOD_PUT, self.put.as_mut()),
            (HTTP_METHOD_POST, self.post.as_mut()),
            (HTTP_METHOD_DELETE, self.delete.as_mut()),
            (HTTP_METHOD_OPTIONS, self.options.as_mut()),
            (HTTP_METHOD_HEAD, self.head.as_mut()),
            (HTTP_METHOD_PATCH, self.patch.as_mut()),
            (HTTP_METHOD_TRACE, self.trace.as_mut()),
        ]
    }

    #[must_use]
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        match method {
            HTTP_METHOD_GET => self.get.as_ref(),
            HTTP_METHOD_PUT => self.put.as_ref(),
            HTTP_METHOD_POST => self.post.as_ref(),
            HTTP_METHOD_DELETE => self.delete.as_ref(),
            HTTP_METHOD_OPTIONS => self.options.as_ref(),
            HTTP_METHOD_HEAD => self.head.as_ref(),
            HTTP_METHOD_PATCH => self.patch.as_ref(),
            HTTP_METHOD_TRACE => self.trace.as_ref(),
            _ => None,
        }
    }

    /// The path item as seen by lookups: local fields, with anything left
    /// unset filled from the resolved `$ref` target.
    #[must_use]
    pub fn effective(&self) -> Cow<'_, Self> {
        match self.reference.as_ref().and_then(PathItemReference::resolved) {
            Some(target) => Cow::Owned(self.merged_with(target)),
            None => Cow::Borrowed(self),
        }
    }

    fn merged_with(&self, target: &Self) -> Self {
        let target = target.effective();
        Self {
            reference: self.reference.clone(),
            summary: self.summary.clone().or_else(|| target.summary.clone()),
            description: self.description.clone().or_else(|| target.description.clone()),
            get: self.get.clone().or_else(|| target.get.clone()),
            put: self.put.clone().or_else(|| target.put.clone()),
            post: self.post.clone().or_else(|| target.post.clone()),
            delete: self.delete.clone().or_else(|| target.delete.clone()),
            options: self.options.clone().or_else(|| target.options.clone()),
            head: self.head.clone().or_else(|| target.head.clone()),
            patch: self.patch.clone().or_else(|| target.patch.clone()),
            trace: self.trace.clone().or_else(|| target.trace.clone()),
            servers: self.servers.clone().or_else(|| target.servers.clone()),
            parameters: self.parameters.clone().or_else(|| target.parameters.clone()),
            extensions: self.extensions.merge_over(&target.extensions),
        }
    }

    fn resolve_local(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(Some(Node::PathItem(self.clone())));
        };
        match first.as_str() {
            "servers" => resolve_indexed(self.servers.as_deref(), rest),
            "parameters" => resolve_indexed(self.parameters.as_deref(), rest),
            method => match self.operation(method) {
                Some(op) => resolve_child(Some(op), rest),
                None => self.extensions.resolve(keys),
            },
        }
    }
}

impl FromNode for PathItem {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "path item")?;
        let reference = match r.string(KEY_REF)? {
            Some(target) => {
                validate_target(&target, &r.child_path(KEY_REF))?;
                Some(PathItemReference {
                    target,
                    resolved: None,
                })
            }
            None => None,
        };
        Ok(Self {
            reference,
            summary: r.string("summary")?,
            description: r.string("description")?,
            get: r.node(HTTP_METHOD_GET)?,
            put: r.node(HTTP_METHOD_PUT)?,
            post: r.node(HTTP_METHOD_POST)?,
            delete: r.node(HTTP_METHOD_DELETE)?,
            options: r.node(HTTP_METHOD_OPTIONS)?,
            head: r.node(HTTP_METHOD_HEAD)?,
            patch: r.node(HTTP_METHOD_PATCH)?,
            trace: r.node(HTTP_METHOD_TRACE)?,
            servers: r.list("servers")?,
            parameters: r.list("parameters")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for PathItem {
    fn to_node(&self) -> Value {
        let mut w = ObjectWriter::new();
        if let Some(reference) = &self.reference {
            w.string(KEY_REF, &reference.target);
        }
        w.opt_string("summary", self.summary.as_ref())
            .opt_string("description", self.description.as_ref());
        for (method, op) in self.operations() {
            w.node(method, op);
        }
        w.opt_list("servers", self.servers.as_ref())
            .opt_list("parameters", self.parameters.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for PathItem {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        self.effective().resolve_local(keys)
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::PathItem(self.effective().into_owned()))
    }
}

impl Component for PathItem {
    const SECTION: &'static str = COMPONENT_PATH_ITEMS;
}

/// `paths`: template → path item, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths {
    pub entries: IndexMap<PathTemplate, PathItem>,
    pub extensions: Extensions,
}

impl Paths {
    /// Looks up a path by its template text; placeholder names need not match.
    #[must_use]
    pub fn get(&self, template: &str) -> Option<&PathItem> {
        PathTemplate::parse(template)
            .ok()
            .and_then(|template| self.entries.get(&template))
    }

    /// Finds the template a concrete request path belongs to.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&PathTemplate, &PathItem)> {
        self.entries
            .iter()
            .find(|(template, _)| template.matches_path(path))
    }

    /// # Errors
    ///
    /// Returns a parse error if an equivalent template is already present.
    pub fn insert(&mut self, template: PathTemplate, item: PathItem) -> Result<(), Error> {
        if let Some((existing, _)) = self.entries.get_key_value(&template) {
            return Err(Error::parse_error(
                format!("/paths/{}", escape(&template.to_string())),
                format!("path '{template}' is equivalent to '{existing}'"),
            ));
        }
        self.entries.insert(template, item);
        Ok(())
    }
}

impl FromNode for Paths {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::parse_error(
                path,
                format!("paths must be an object, found {}", type_name(value)),
            ));
        };
        let mut paths = Self::default();
        let mut extensions = IndexMap::new();
        for (key, item) in map {
            if is_extension_key(key) {
                extensions.insert(key.clone(), item.clone());
                continue;
            }
            let template = PathTemplate::parse(key)?;
            let item = PathItem::from_node(item, &format!("{path}/{}", escape(key)))?;
            paths.insert(template, item)?;
        }
        paths.extensions = Extensions::from_entries(extensions);
        Ok(paths)
    }
}

impl ToNode for Paths {
    fn to_node(&self) -> Value {
        let mut map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(template, item)| (template.to_string(), item.to_node()))
            .collect();
        for (key, value) in self.extensions.iter() {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// Only individual paths are lookup targets, not the collection.
impl Addressable for Paths {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(None);
        };
        match self.get(first) {
            Some(item) => resolve_child(Some(item), rest),
            None => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_ref_next_to_local_fields() {
        let value = json!({
            "$ref": "#/components/pathItems/shared",
            "get": {"responses": {"200": {"description": "local"}}}
        });
        let item = PathItem::from_node(&value, "/paths/~1a").unwrap();
        assert_eq!(item.reference.as_ref().unwrap().target(), "#/components/pathItems/shared");
        assert_eq!(item.to_node(), value);
    }

    #[test]
    fn merge_prefers_local_fields() {
        let mut item = PathItem::from_node(
            &json!({
                "$ref": "#/components/pathItems/shared",
                "get": {"operationId": "localGet"},
                "x-owner": "local"
            }),
            "",
        )
        .unwrap();
        let target = PathItem::from_node(
            &json!({
                "summary": "shared",
                "get": {"operationId": "targetGet"},
                "post": {"operationId": "targetPost"},
                "x-owner": "shared",
                "x-tier": "gold"
            }),
            "",
        )
        .unwrap();
        assert!(item.reference.as_mut().unwrap().set_resolved(target));
        let view = item.effective();
        assert_eq!(view.get.as_ref().unwrap().operation_id.as_deref(), Some("localGet"));
        assert_eq!(view.post.as_ref().unwrap().operation_id.as_deref(), Some("targetPost"));
        assert_eq!(view.summary.as_deref(), Some("shared"));
        assert_eq!(view.extensions.get("x-owner"), Some(&json!("local")));
        assert_eq!(view.extensions.get("x-tier"), Some(&json!("gold")));
        // serialization keeps the authored form
        assert!(item.to_node().get("post").is_none());
    }

    #[test]
    fn equivalent_templates_are_duplicates() {
        let value = json!({"/pets/{id}": {}, "/pets/{petId}": {}});
        let err = Paths::from_node(&value, "/paths").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn lookup_by_any_placeholder_name() {
        let paths = Paths::from_node(
            &json!({"/pets/{petId}": {"get": {}}, "/v2": {}, "x-tier": "gold"}),
            "/paths",
        )
        .unwrap();
        let keys = ["/pets/{id}", "get"].map(String::from);
        assert!(matches!(paths.resolve(&keys).unwrap(), Some(Node::Operation(_))));
        let keys = ["/v2".to_string()];
        assert!(matches!(paths.resolve(&keys).unwrap(), Some(Node::PathItem(_))));
        let keys = ["x-tier".to_string()];
        assert_eq!(paths.resolve(&keys).unwrap(), Some(Node::Json(json!("gold"))));
        assert_eq!(paths.resolve(&[]).unwrap(), None);
        assert!(paths.match_path("/pets/7").is_some());
    }
}
