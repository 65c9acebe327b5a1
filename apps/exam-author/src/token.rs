//! # Auth Tokens
//!
//! The token sent with create/update requests comes either from an explicit
//! value or from the `authToken` entry of a cookie header.

use exam_author_core::TokenProvider;

/// Name of the cookie holding the auth token.
pub const AUTH_COOKIE: &str = "authToken";

// =============================================================================
// COOKIE JAR
// =============================================================================

/// A parsed `Cookie:` header value (`name=value; name2=value2`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    pub fn parse(header: &str) -> Self {
        let entries = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    /// First value stored under `name`. Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// SESSION TOKEN
// =============================================================================

/// Token provider for the CLI session.
///
/// An explicit token wins over the cookie jar.
#[derive(Debug, Clone, Default)]
pub struct SessionToken {
    explicit: Option<String>,
    cookies: CookieJar,
}

impl SessionToken {
    pub fn new(explicit: Option<String>, cookie_header: Option<&str>) -> Self {
        Self {
            explicit: explicit.filter(|t| !t.trim().is_empty()),
            cookies: cookie_header.map(CookieJar::parse).unwrap_or_default(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token().is_none()
    }
}

impl TokenProvider for SessionToken {
    fn token(&self) -> Option<String> {
        self.explicit
            .clone()
            .or_else(|| self.cookies.get(AUTH_COOKIE).map(String::from))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cookie_header() {
        let jar = CookieJar::parse("theme=dark; authToken=abc.def; lang=en");
        assert_eq!(jar.len(), 3);
        assert_eq!(jar.get("authToken"), Some("abc.def"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn tolerates_malformed_pairs() {
        let jar = CookieJar::parse(";;junk; =x; authToken=; a=b=c");
        assert_eq!(jar.get("authToken"), None);
        assert_eq!(jar.get("a"), Some("b=c"));
        assert!(CookieJar::parse("").is_empty());
    }

    #[test]
    fn explicit_token_wins() {
        let tokens = SessionToken::new(Some("explicit".to_string()), Some("authToken=cookie"));
        assert_eq!(tokens.token().as_deref(), Some("explicit"));
    }

    #[test]
    fn falls_back_to_cookie() {
        let tokens = SessionToken::new(Some("  ".to_string()), Some("authToken=cookie"));
        assert_eq!(tokens.token().as_deref(), Some("cookie"));
    }

    #[test]
    fn anonymous_without_sources() {
        assert!(SessionToken::new(None, None).is_anonymous());
        assert!(SessionToken::new(None, Some("other=1")).is_anonymous());
    }
}
