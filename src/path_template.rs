//! Template-aware OpenAPI path keys.
//!
//! `/pets/{id}` and `/pets/{petId}` name the same route, so equality and
//! hashing ignore placeholder names. The original text is kept for output.

use crate::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Literal(String),
    Parameter(String),
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        raw.strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .filter(|name| !name.is_empty() && !name.contains(['{', '}']))
            .map_or_else(
                || Self::Literal(raw.to_string()),
                |name| Self::Parameter(name.to_string()),
            )
    }

    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Parameter(_), Self::Parameter(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Parameter(name) => write!(f, "{{{name}}}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathTemplate {
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    /// Parses a path key such as `/pets/{petId}`.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the path does not start with `/`.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(Error::parse_error(
                format!("/paths/{}", crate::pointer::escape(path)),
                format!("path '{path}' must start with '/'"),
            ));
        };
        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').map(PathSegment::parse).collect()
        };
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Placeholder names in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Parameter(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    /// Checks whether a concrete request path (`/pets/42`) fits this template.
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        parts.len() == self.segments.len()
            && self.segments.iter().zip(parts).all(|(seg, part)| match seg {
                PathSegment::Literal(text) => text == part,
                PathSegment::Parameter(_) => !part.is_empty(),
            })
    }
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.matches(b))
    }
}

impl Eq for PathTemplate {}

impl Hash for PathTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.len().hash(state);
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(text) => {
                    0u8.hash(state);
                    text.hash(state);
                }
                PathSegment::Parameter(_) => 1u8.hash(state),
            }
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(t: &PathTemplate) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn placeholder_names_do_not_matter() {
        let a = PathTemplate::parse("/pets/{id}").unwrap();
        let b = PathTemplate::parse("/pets/{petId}").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn literals_must_match() {
        let a = PathTemplate::parse("/pets/{id}").unwrap();
        let b = PathTemplate::parse("/owners/{id}").unwrap();
        assert_ne!(a, b);
        let c = PathTemplate::parse("/pets/mine").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn length_matters() {
        let a = PathTemplate::parse("/pets").unwrap();
        let b = PathTemplate::parse("/pets/{id}").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn display_keeps_original_text() {
        for text in ["/", "/pets/{petId}", "/a/{b}.json", "/v2/"] {
            assert_eq!(PathTemplate::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn mixed_segment_is_literal() {
        let t = PathTemplate::parse("/files/{name}.json").unwrap();
        assert_eq!(
            t.segments()[1],
            PathSegment::Literal("{name}.json".to_string())
        );
        assert_eq!(t.parameter_names().count(), 0);
    }

    #[test]
    fn requires_leading_slash() {
        assert!(PathTemplate::parse("pets").is_err());
    }

    #[test]
    fn matches_concrete_paths() {
        let t = PathTemplate::parse("/pets/{id}").unwrap();
        assert!(t.matches_path("/pets/42"));
        assert!(!t.matches_path("/pets"));
        assert!(!t.matches_path("/owners/42"));
    }
}
