use crate::error::Error;
use crate::lookup::{resolve_child, resolve_json, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, ToNode};
use crate::pointer::escape;
use crate::spec::reader::{type_name, ObjectReader};
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    MutualTls,
    OAuth2,
    OpenIdConnect,
}

impl SecuritySchemeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Http => "http",
            Self::MutualTls => "mutualTLS",
            Self::OAuth2 => "oauth2",
            Self::OpenIdConnect => "openIdConnect",
        }
    }

    fn parse(text: &str, path: &str) -> Result<Self, Error> {
        Ok(match text {
            "apiKey" => Self::ApiKey,
            "http" => Self::Http,
            "mutualTLS" => Self::MutualTls,
            "oauth2" => Self::OAuth2,
            "openIdConnect" => Self::OpenIdConnect,
            other => {
                return Err(Error::parse_error(
                    path,
                    format!("'{other}' is not a security scheme type"),
                ))
            }
        })
    }
}

impl fmt::Display for SecuritySchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityScheme {
    pub scheme_type: SecuritySchemeType,
    pub description: Option<String>,
    /// `apiKey`: header, query or cookie name.
    pub name: Option<String>,
    /// `apiKey`: `header`, `query` or `cookie`.
    pub location: Option<String>,
    /// `http`: authorization scheme, e.g. `bearer`.
    pub scheme: Option<String>,
    pub bearer_format: Option<String>,
    pub flows: Option<OAuthFlows>,
    pub open_id_connect_url: Option<String>,
    pub extensions: Extensions,
}

impl SecurityScheme {
    #[must_use]
    pub const fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            extensions: Extensions::new(),
        }
    }

    fn check(&self, path: &str) -> Result<(), Error> {
        let missing = |field: &str| {
            Err(Error::parse_error(
                path,
                format!("'{}' security schemes require '{field}'", self.scheme_type),
            ))
        };
        match self.scheme_type {
            SecuritySchemeType::ApiKey => {
                if self.name.is_none() {
                    return missing("name");
                }
                match self.location.as_deref() {
                    Some("header" | "query" | "cookie") => Ok(()),
                    Some(other) => Err(Error::parse_error(
                        format!("{path}/in"),
                        format!("'{other}' is not an apiKey location (header, query, cookie)"),
                    )),
                    None => missing("in"),
                }
            }
            SecuritySchemeType::Http if self.scheme.is_none() => missing("scheme"),
            SecuritySchemeType::OAuth2 if self.flows.is_none() => missing("flows"),
            SecuritySchemeType::OpenIdConnect if self.open_id_connect_url.is_none() => {
                missing("openIdConnectUrl")
            }
            _ => Ok(()),
        }
    }
}

impl FromNode for SecurityScheme {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "security scheme")?;
        let type_path = r.child_path("type");
        let scheme = Self {
            scheme_type: SecuritySchemeType::parse(&r.required_string("type")?, &type_path)?,
            description: r.string("description")?,
            name: r.string("name")?,
            location: r.string("in")?,
            scheme: r.string("scheme")?,
            bearer_format: r.string("bearerFormat")?,
            flows: r.node("flows")?,
            open_id_connect_url: r.string("openIdConnectUrl")?,
            extensions: r.finish()?,
        };
        scheme.check(path)?;
        Ok(scheme)
    }
}

impl ToNode for SecurityScheme {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("type", self.scheme_type.as_str())
            .opt_string("description", self.description.as_ref())
            .opt_string("name", self.name.as_ref())
            .opt_string("in", self.location.as_ref())
            .opt_string("scheme", self.scheme.as_ref())
            .opt_string("bearerFormat", self.bearer_format.as_ref())
            .opt_node("flows", self.flows.as_ref())
            .opt_string("openIdConnectUrl", self.open_id_connect_url.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for SecurityScheme {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "flows" => resolve_child(self.flows.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::SecurityScheme(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlows {
    pub implicit: Option<OAuthFlow>,
    pub password: Option<OAuthFlow>,
    pub client_credentials: Option<OAuthFlow>,
    pub authorization_code: Option<OAuthFlow>,
    pub extensions: Extensions,
}

impl FromNode for OAuthFlows {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "oauth flows")?;
        Ok(Self {
            implicit: r.node("implicit")?,
            password: r.node("password")?,
            client_credentials: r.node("clientCredentials")?,
            authorization_code: r.node("authorizationCode")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for OAuthFlows {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_node("implicit", self.implicit.as_ref())
            .opt_node("password", self.password.as_ref())
            .opt_node("clientCredentials", self.client_credentials.as_ref())
            .opt_node("authorizationCode", self.authorization_code.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for OAuthFlows {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "implicit" => resolve_child(self.implicit.as_ref(), rest),
            "password" => resolve_child(self.password.as_ref(), rest),
            "clientCredentials" => resolve_child(self.client_credentials.as_ref(), rest),
            "authorizationCode" => resolve_child(self.authorization_code.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::OAuthFlows(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    pub scopes: IndexMap<String, String>,
    pub extensions: Extensions,
}

impl FromNode for OAuthFlow {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "oauth flow")?;
        Ok(Self {
            authorization_url: r.string("authorizationUrl")?,
            token_url: r.string("tokenUrl")?,
            refresh_url: r.string("refreshUrl")?,
            scopes: r
                .string_map("scopes")?
                .ok_or_else(|| Error::parse_error(path, "missing required field 'scopes'"))?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for OAuthFlow {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("authorizationUrl", self.authorization_url.as_ref())
            .opt_string("tokenUrl", self.token_url.as_ref())
            .opt_string("refreshUrl", self.refresh_url.as_ref())
            .opt_string_map("scopes", Some(&self.scopes))
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for OAuthFlow {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "scopes" => {
                let name = rest.first().map(String::as_str);
                let scope = name
                    .and_then(|name| self.scopes.get(name))
                    .map(|text| Value::String(text.clone()));
                resolve_json(scope.as_ref(), rest.get(1..).unwrap_or_default())
            }
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::OAuthFlow(self.clone()))
    }
}

/// Scheme name → required scopes. An empty requirement (`{}`) means anonymous access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityRequirement(pub IndexMap<String, Vec<String>>);

impl FromNode for SecurityRequirement {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::parse_error(
                path,
                format!("a security requirement must be an object, found {}", type_name(value)),
            ));
        };
        map.iter()
            .map(|(name, scopes)| {
                let child = format!("{path}/{}", escape(name));
                let scopes = scopes
                    .as_array()
                    .ok_or_else(|| Error::parse_error(&child, "scopes must be an array"))?
                    .iter()
                    .map(|scope| {
                        scope
                            .as_str()
                            .map(str::to_string)
                            .ok_or_else(|| Error::parse_error(&child, "scopes must be strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((name.clone(), scopes))
            })
            .collect::<Result<IndexMap<_, _>, Error>>()
            .map(Self)
    }
}

impl ToNode for SecurityRequirement {
    fn to_node(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, scopes)| {
                    (
                        name.clone(),
                        Value::Array(scopes.iter().cloned().map(Value::String).collect()),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oauth2_round_trips() {
        let value = json!({
            "type": "oauth2",
            "flows": {
                "authorizationCode": {
                    "authorizationUrl": "https://example.com/auth",
                    "tokenUrl": "https://example.com/token",
                    "scopes": {"read:pets": "read your pets"}
                }
            }
        });
        let scheme = SecurityScheme::from_node(&value, "").unwrap();
        assert_eq!(scheme.scheme_type, SecuritySchemeType::OAuth2);
        assert_eq!(scheme.to_node(), value);
        let keys = ["flows", "authorizationCode", "scopes", "read:pets"].map(String::from);
        assert_eq!(
            scheme.resolve(&keys).unwrap(),
            Some(Node::Json(json!("read your pets")))
        );
    }

    #[test]
    fn type_specific_fields_are_required() {
        for value in [
            json!({"type": "apiKey", "in": "header"}),
            json!({"type": "apiKey", "name": "k", "in": "body"}),
            json!({"type": "http"}),
            json!({"type": "oauth2"}),
            json!({"type": "openIdConnect"}),
            json!({"type": "kerberos"}),
        ] {
            assert!(SecurityScheme::from_node(&value, "").is_err(), "{value}");
        }
        assert!(SecurityScheme::from_node(&json!({"type": "mutualTLS"}), "").is_ok());
    }

    #[test]
    fn requirement_round_trips() {
        let value = json!({"petstore_auth": ["write:pets", "read:pets"], "api_key": []});
        let req = SecurityRequirement::from_node(&value, "/security/0").unwrap();
        assert_eq!(req.to_node(), value);
        assert!(SecurityRequirement::from_node(&json!({"a": "b"}), "").is_err());
    }
}
