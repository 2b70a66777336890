//! Response metadata as observed by a caller.

use std::collections::BTreeMap;
use std::fmt;

use http::{HeaderMap, HeaderName};

use crate::TRAILER_PREFIX;

/// Response metadata wrapper around HTTP headers.
///
/// Used for both header and trailer metadata, whichever transport produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    headers: HeaderMap,
}

impl Metadata {
    /// Create new metadata from HTTP headers.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Create empty metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split Connect unary response headers into header and trailer metadata.
    ///
    /// Connect unary responses carry trailers as `trailer-`-prefixed headers;
    /// the prefix is stripped on the trailer side.
    pub fn split_unary(headers: HeaderMap) -> (Metadata, Metadata) {
        let mut leading = HeaderMap::new();
        let mut trailing = HeaderMap::new();
        let mut current: Option<HeaderName> = None;

        // `HeaderMap::into_iter` yields the name only for the first value of each key.
        for (name, value) in headers {
            if let Some(name) = name {
                current = Some(name);
            }
            let Some(name) = current.as_ref() else {
                continue;
            };
            match name.as_str().strip_prefix(TRAILER_PREFIX) {
                Some(stripped) if !stripped.is_empty() => {
                    if let Ok(trailer_name) = HeaderName::from_bytes(stripped.as_bytes()) {
                        trailing.append(trailer_name, value);
                    }
                }
                _ => {
                    leading.append(name.clone(), value);
                }
            }
        }

        (Metadata::new(leading), Metadata::new(trailing))
    }

    /// Get a header value by name.
    ///
    /// Returns `None` if the header is not present or cannot be converted to a string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// Get all values for a header (for headers that appear multiple times).
    pub fn get_all(&self, key: &str) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(key)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Renders as `{key: [v1, v2], ...}` with keys sorted.
impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, value) in self.headers.iter() {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            grouped.entry(name.as_str()).or_default().push(value);
        }

        f.write_str("{")?;
        for (i, (name, values)) in grouped.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: [{}]", name, values.join(", "))?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_get_and_get_all() {
        let meta = Metadata::new(headers(&[
            ("custom-key", "value"),
            ("x-multi", "a"),
            ("x-multi", "b"),
        ]));

        assert_eq!(meta.get("custom-key"), Some("value"));
        assert!(meta.contains("x-multi"));
        assert_eq!(meta.get_all("x-multi").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(meta.len(), 3);
        assert!(meta.get("missing").is_none());
    }

    #[test]
    fn test_split_unary_strips_trailer_prefix() {
        let (header, trailer) = Metadata::split_unary(headers(&[
            ("content-type", "application/json"),
            ("custom-key", "value"),
            ("trailer-x-checksum", "abc"),
            ("trailer-x-multi", "1"),
            ("trailer-x-multi", "2"),
        ]));

        assert_eq!(header.get("custom-key"), Some("value"));
        assert_eq!(header.get("content-type"), Some("application/json"));
        assert!(!header.contains("trailer-x-checksum"));

        assert_eq!(trailer.get("x-checksum"), Some("abc"));
        assert_eq!(trailer.get_all("x-multi").collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(trailer.len(), 3);
    }

    #[test]
    fn test_split_unary_without_trailers() {
        let (header, trailer) = Metadata::split_unary(headers(&[("custom-key", "value")]));
        assert_eq!(header.len(), 1);
        assert!(trailer.is_empty());
    }

    #[test]
    fn test_display_sorted_and_grouped() {
        let meta = Metadata::new(headers(&[
            ("x-multi", "a"),
            ("custom-key", "value"),
            ("x-multi", "b"),
        ]));
        assert_eq!(meta.to_string(), "{custom-key: [value], x-multi: [a, b]}");
        assert_eq!(Metadata::empty().to_string(), "{}");
    }
}
