//! URL resolution and parsing.

use serde::Serialize;
use url::{ParseError, Url};

use crate::error::{RuntimeError, RuntimeResult};

/// Components of a parsed URL, laid out like a DOM anchor element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedUrl {
    /// The full resolved URL.
    pub href: String,
    /// Scheme with the trailing `:`.
    pub protocol: String,
    /// Host without the port.
    pub hostname: String,
    /// Empty when the scheme's default port is used.
    pub port: String,
    /// Path, starting with `/` for hierarchical URLs.
    pub pathname: String,
    /// Query with the leading `?`, or empty.
    pub search: String,
    /// Fragment with the leading `#`, or empty.
    pub hash: String,
    /// `hostname` plus `:port` when a port is present.
    pub host: String,
}

impl From<&Url> for ParsedUrl {
    fn from(url: &Url) -> Self {
        let hostname = url.host_str().unwrap_or_default().to_string();
        let port = url.port().map(|p| p.to_string()).unwrap_or_default();
        let host = if port.is_empty() {
            hostname.clone()
        } else {
            format!("{hostname}:{port}")
        };
        Self {
            href: url.as_str().to_string(),
            protocol: format!("{}:", url.scheme()),
            hostname,
            port,
            pathname: url.path().to_string(),
            search: prefixed('?', url.query()),
            hash: prefixed('#', url.fragment()),
            host,
        }
    }
}

fn prefixed(prefix: char, part: Option<&str>) -> String {
    match part {
        Some(part) if !part.is_empty() => format!("{prefix}{part}"),
        _ => String::new(),
    }
}

/// Resolves URLs against an optional document base.
#[derive(Debug, Clone, Default)]
pub struct UrlResolver {
    base: Option<Url>,
}

impl UrlResolver {
    /// A resolver that resolves relative URLs against `base`.
    pub fn new(base: Url) -> Self {
        Self { base: Some(base) }
    }

    /// A resolver with no base. Only absolute URLs resolve.
    pub fn detached() -> Self {
        Self { base: None }
    }

    /// The document base, if any.
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Resolve `input` to an absolute URL string.
    pub fn resolve_url(&self, input: &str) -> RuntimeResult<String> {
        Ok(self.resolve(input)?.into())
    }

    /// Resolve `input` and split it into components.
    pub fn parse_url(&self, input: &str) -> RuntimeResult<ParsedUrl> {
        Ok(ParsedUrl::from(&self.resolve(input)?))
    }

    fn resolve(&self, input: &str) -> RuntimeResult<Url> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RuntimeError::MissingUrl);
        }
        let invalid = |source| RuntimeError::InvalidUrl {
            input: input.to_string(),
            source,
        };
        match Url::parse(input) {
            Ok(url) => Ok(url),
            Err(ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base.join(input).map_err(invalid),
                None => Err(RuntimeError::UrlResolutionUnavailable(input.to_string())),
            },
            Err(source) => Err(invalid(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> UrlResolver {
        UrlResolver::new(Url::parse("https://example.com/app/index.html").unwrap())
    }

    #[test]
    fn resolves_relative_against_base() {
        let r = resolver();
        assert_eq!(
            r.resolve_url("models/cube.glb").unwrap(),
            "https://example.com/app/models/cube.glb"
        );
        assert_eq!(
            r.resolve_url("/root.json").unwrap(),
            "https://example.com/root.json"
        );
        assert_eq!(
            r.resolve_url("../up").unwrap(),
            "https://example.com/up"
        );
    }

    #[test]
    fn absolute_urls_ignore_base() {
        assert_eq!(
            resolver().resolve_url("http://other.org/x").unwrap(),
            "http://other.org/x"
        );
        assert_eq!(
            UrlResolver::detached().resolve_url("http://other.org").unwrap(),
            "http://other.org/"
        );
    }

    #[test]
    fn empty_input_is_missing_url() {
        assert!(matches!(
            resolver().resolve_url(""),
            Err(RuntimeError::MissingUrl)
        ));
        assert!(matches!(
            resolver().parse_url("   "),
            Err(RuntimeError::MissingUrl)
        ));
    }

    #[test]
    fn relative_without_base_is_unavailable() {
        let err = UrlResolver::detached().resolve_url("cube.glb").unwrap_err();
        assert!(matches!(err, RuntimeError::UrlResolutionUnavailable(ref s) if s == "cube.glb"));
        assert_eq!(
            err.to_string(),
            "resolving relative URL \"cube.glb\" requires a base URL"
        );
    }

    #[test]
    fn malformed_url_is_invalid() {
        let err = resolver().resolve_url("http://[::1").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidUrl { .. }));
    }

    #[test]
    fn parse_url_components() {
        let parsed = resolver()
            .parse_url("https://example.com:8443/a/b?x=1#top")
            .unwrap();
        insta::assert_debug_snapshot!(parsed, @r##"
        ParsedUrl {
            href: "https://example.com:8443/a/b?x=1#top",
            protocol: "https:",
            hostname: "example.com",
            port: "8443",
            pathname: "/a/b",
            search: "?x=1",
            hash: "#top",
            host: "example.com:8443",
        }
        "##);
    }

    #[test]
    fn default_port_and_empty_parts() {
        let parsed = resolver().parse_url("https://example.com:443/?#").unwrap();
        assert_eq!(parsed.port, "");
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.pathname, "/");
        assert_eq!(parsed.search, "");
        assert_eq!(parsed.hash, "");
    }

    #[test]
    fn parse_relative_uses_base() {
        let parsed = resolver().parse_url("scene.json?v=2").unwrap();
        assert_eq!(parsed.href, "https://example.com/app/scene.json?v=2");
        assert_eq!(parsed.pathname, "/app/scene.json");
        assert_eq!(parsed.search, "?v=2");
        assert_eq!(parsed.protocol, "https:");
    }
}
