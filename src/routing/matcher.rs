//! Path and method matching.
//!
//! # Responsibilities
//! - Match request paths against segment patterns (`/users/:id`, `/files/{*rest}`)
//! - Match leading path prefixes for mounted sub-routers
//! - Match HTTP methods, including the "all methods" set
//!
//! # Design Decisions
//! - Path matching is case-sensitive, method matching is not
//! - Matching works on whole segments: `/api` never matches `/apiary`
//! - Empty segments and trailing slashes are ignored
//! - No regex to guarantee O(n) matching

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix("{*").and_then(|s| s.strip_suffix('}')) {
            Segment::Wildcard(name.to_string())
        } else if let Some(name) = raw.strip_prefix('*') {
            Segment::Wildcard(name.to_string())
        } else if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Segment::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }
}

/// Splits a path into its non-empty segments, each paired with the byte
/// offset just past its end.
fn segments(path: &str) -> impl Iterator<Item = (&str, usize)> {
    let mut offset = 0;
    path.split('/').filter_map(move |segment| {
        let end = offset + segment.len();
        offset = end + 1;
        (!segment.is_empty()).then_some((segment, end))
    })
}

/// Named values captured while matching a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    pub(crate) fn extend(&mut self, other: PathParams) {
        self.0.extend(other.0);
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PathParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<PathParams>().cloned().unwrap_or_default())
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = segments(&raw).map(|(s, _)| Segment::parse(s)).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match the whole path.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let (consumed, params) = self.match_prefix(path)?;
        path[consumed..]
            .trim_matches('/')
            .is_empty()
            .then_some(params)
    }

    /// Match a leading run of whole segments.
    ///
    /// Returns the number of bytes of `path` consumed along with any captured
    /// parameters. A pattern with no segments (`/`) matches every path and
    /// consumes nothing.
    pub fn match_prefix(&self, path: &str) -> Option<(usize, PathParams)> {
        let mut params = PathParams::default();
        let mut consumed = 0;
        let mut input = segments(path);

        for segment in &self.segments {
            match segment {
                Segment::Wildcard(name) => {
                    let (first, end) = input.next()?;
                    let start = end - first.len();
                    let rest = path[start..].trim_end_matches('/');
                    params.push(name, rest);
                    return Some((path.len(), params));
                }
                Segment::Literal(expected) => {
                    let (actual, end) = input.next()?;
                    if actual != expected {
                        return None;
                    }
                    consumed = end;
                }
                Segment::Param(name) => {
                    let (actual, end) = input.next()?;
                    params.push(name, actual);
                    consumed = end;
                }
            }
        }

        Some((consumed, params))
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

/// The HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    /// Every method, including extension methods.
    All,
    Only(Vec<Method>),
}

impl MethodSet {
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        MethodSet::Only(methods.into_iter().collect())
    }

    /// Add a method to the set. Adding to [`MethodSet::All`] is a no-op.
    pub fn and(self, method: Method) -> Self {
        match self {
            MethodSet::All => MethodSet::All,
            MethodSet::Only(mut methods) => {
                if !methods.contains(&method) {
                    methods.push(method);
                }
                MethodSet::Only(methods)
            }
        }
    }

    /// Returns true if `method` is accepted. Comparison ignores ASCII case.
    pub fn contains(&self, method: &str) -> bool {
        match self {
            MethodSet::All => true,
            MethodSet::Only(methods) => methods
                .iter()
                .any(|m| m.as_str().eq_ignore_ascii_case(method)),
        }
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::Only(vec![method])
    }
}

impl<const N: usize> From<[Method; N]> for MethodSet {
    fn from(methods: [Method; N]) -> Self {
        MethodSet::only(methods)
    }
}
