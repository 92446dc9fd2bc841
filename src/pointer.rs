//! RFC 6901 JSON Pointers.
//!
//! Used for `$ref` fragments, runtime-expression body references and
//! document lookups. Array indices are forward-only: a segment addresses an
//! array element only when it is a canonical non-negative integer.

use crate::error::Error;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the whole document.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses the textual form (`""` or `/a/b~1c`).
    ///
    /// # Errors
    ///
    /// Returns a parse error if the pointer does not start with `/` or
    /// contains a `~` not followed by `0` or `1`.
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(Error::parse_error(
                text,
                "a JSON Pointer must be empty or start with '/'",
            ));
        };
        let segments = rest
            .split('/')
            .map(|raw| unescape(raw).ok_or_else(|| invalid_escape(text)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Parses a URI fragment (without the leading `#`), percent-decoding first.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the decoded fragment is not a JSON Pointer.
    pub fn from_uri_fragment(fragment: &str) -> Result<Self, Error> {
        let decoded = urlencoding::decode(fragment).map_err(|e| {
            Error::parse_error(format!("#{fragment}"), format!("invalid percent-encoding: {e}"))
        })?;
        Self::parse(&decoded).map_err(|_| {
            Error::parse_error(
                format!("#{fragment}"),
                "the fragment of a $ref must be a JSON Pointer",
            )
        })
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Returns a new pointer with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Evaluates the pointer against a JSON value.
    #[must_use]
    pub fn evaluate<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        evaluate_segments(&self.segments, value)
    }

    /// Renders the pointer as a URI fragment, including the leading `#`.
    #[must_use]
    pub fn to_uri_fragment(&self) -> String {
        format!("#{}", urlencoding::encode(&self.to_string()).replace("%2F", "/"))
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Evaluates pre-split key segments against a JSON value.
pub fn evaluate_segments<'v, S: AsRef<str>>(segments: &[S], value: &'v Value) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment.as_ref()),
            Value::Array(items) => parse_index(segment.as_ref()).and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Parses a canonical array index: digits only, no sign, no leading zeros.
#[must_use]
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty()
        || !segment.bytes().all(|b| b.is_ascii_digit())
        || (segment.len() > 1 && segment.starts_with('0'))
    {
        return None;
    }
    segment.parse().ok()
}

/// Escapes a single reference token (`~` → `~0`, `/` → `~1`).
#[must_use]
pub fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return None,
        }
    }
    Some(out)
}

fn invalid_escape(text: &str) -> Error {
    Error::parse_error(text, "'~' must be followed by '0' or '1' in a JSON Pointer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_unescapes() {
        let p = JsonPointer::parse("/paths/~1v2/a~0b").unwrap();
        assert_eq!(p.segments(), ["paths", "/v2", "a~b"]);
        assert_eq!(p.to_string(), "/paths/~1v2/a~0b");
    }

    #[test]
    fn empty_pointer_is_root() {
        let p = JsonPointer::parse("").unwrap();
        assert!(p.is_root());
        assert_eq!(p.evaluate(&json!(3)), Some(&json!(3)));
    }

    #[test]
    fn rejects_missing_slash_and_bad_escape() {
        assert!(JsonPointer::parse("paths").is_err());
        assert!(JsonPointer::parse("/a~2").is_err());
        assert!(JsonPointer::parse("/a~").is_err());
    }

    #[test]
    fn fragment_is_percent_decoded() {
        let p = JsonPointer::from_uri_fragment("/paths/~1pets%7Bid%7D").unwrap();
        assert_eq!(p.segments(), ["paths", "/pets{id}"]);
        assert!(JsonPointer::from_uri_fragment("$.not.a.pointer").is_err());
    }

    #[test]
    fn array_indices_are_forward_only() {
        let doc = json!({"a": [10, 20, 30]});
        let get = |p: &str| JsonPointer::parse(p).unwrap().evaluate(&doc).cloned();
        assert_eq!(get("/a/0"), Some(json!(10)));
        assert_eq!(get("/a/2"), Some(json!(30)));
        assert_eq!(get("/a/3"), None);
        assert_eq!(get("/a/-1"), None);
        assert_eq!(get("/a/-"), None);
        assert_eq!(get("/a/01"), None);
    }

    #[test]
    fn uri_fragment_keeps_slashes() {
        let p = JsonPointer::from_segments(["components", "schemas", "a b"]);
        assert_eq!(p.to_uri_fragment(), "#/components/schemas/a%20b");
    }
}
