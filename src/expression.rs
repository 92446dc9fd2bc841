//! OpenAPI runtime expressions (`$url`, `$request.header.X`, `$response.body#/id`, ...).
//!
//! Parsing is strict: unknown keywords, unknown sources, missing names and
//! malformed body pointers are rejected. `Display` reproduces the source text.

use crate::error::Error;
use crate::pointer::JsonPointer;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// RFC 7230 `token`, the grammar for header names.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").expect("token pattern is hardcoded and valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeExpression {
    Url,
    Method,
    StatusCode,
    Request(Source),
    Response(Source),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Header(String),
    Query(String),
    Path(String),
    /// `body` optionally followed by `#` and a JSON Pointer (possibly empty).
    Body(Option<JsonPointer>),
}

impl RuntimeExpression {
    /// Parses a complete runtime expression.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the offending expression.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let fail = |message: &str| Error::parse_error(text, message.to_string());
        match text {
            "$url" => return Ok(Self::Url),
            "$method" => return Ok(Self::Method),
            "$statusCode" => return Ok(Self::StatusCode),
            _ => {}
        }
        if let Some(rest) = text.strip_prefix("$request.") {
            return Source::parse(rest).map(Self::Request).map_err(|m| fail(&m));
        }
        if let Some(rest) = text.strip_prefix("$response.") {
            return Source::parse(rest).map(Self::Response).map_err(|m| fail(&m));
        }
        Err(fail("unknown runtime expression keyword"))
    }

    /// The body pointer, when the expression reads from a message body.
    #[must_use]
    pub const fn body_pointer(&self) -> Option<&JsonPointer> {
        match self {
            Self::Request(Source::Body(pointer)) | Self::Response(Source::Body(pointer)) => {
                pointer.as_ref()
            }
            _ => None,
        }
    }

    /// Extracts every `{...}` embedded expression from a template such as a callback key
    /// (`{$request.body#/callbackUrl}/events`).
    ///
    /// # Errors
    ///
    /// Returns a parse error if a braced section is unterminated or does not parse.
    pub fn parse_embedded(template: &str) -> Result<Vec<Self>, Error> {
        let mut found = Vec::new();
        let mut remaining = template;
        while let Some(start) = remaining.find('{') {
            let after_open = &remaining[start + 1..];
            let Some(end) = after_open.find('}') else {
                return Err(Error::parse_error(
                    template,
                    "unterminated '{' in expression template",
                ));
            };
            let inner = &after_open[..end];
            if inner.starts_with('$') {
                found.push(Self::parse(inner)?);
            }
            remaining = &after_open[end + 1..];
        }
        Ok(found)
    }
}

impl Source {
    fn parse(text: &str) -> Result<Self, String> {
        if let Some(name) = text.strip_prefix("header.") {
            if !TOKEN.is_match(name) {
                return Err(format!("'{name}' is not a valid header token"));
            }
            return Ok(Self::Header(name.to_string()));
        }
        if let Some(name) = text.strip_prefix("query.") {
            return non_empty(name).map(Self::Query);
        }
        if let Some(name) = text.strip_prefix("path.") {
            return non_empty(name).map(Self::Path);
        }
        if text == "body" {
            return Ok(Self::Body(None));
        }
        if let Some(fragment) = text.strip_prefix("body#") {
            return JsonPointer::parse(fragment)
                .map(|p| Self::Body(Some(p)))
                .map_err(|_| format!("'{fragment}' is not a JSON Pointer"));
        }
        Err(format!("unknown source '{text}'"))
    }
}

fn non_empty(name: &str) -> Result<String, String> {
    if name.is_empty() {
        Err("a name is required".to_string())
    } else {
        Ok(name.to_string())
    }
}

impl fmt::Display for RuntimeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("$url"),
            Self::Method => f.write_str("$method"),
            Self::StatusCode => f.write_str("$statusCode"),
            Self::Request(source) => write!(f, "$request.{source}"),
            Self::Response(source) => write!(f, "$response.{source}"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(name) => write!(f, "header.{name}"),
            Self::Query(name) => write!(f, "query.{name}"),
            Self::Path(name) => write!(f, "path.{name}"),
            Self::Body(None) => f.write_str("body"),
            Self::Body(Some(pointer)) => write!(f, "body#{pointer}"),
        }
    }
}

impl FromStr for RuntimeExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
