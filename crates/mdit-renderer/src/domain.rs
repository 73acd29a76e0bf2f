//! Internal domain matching for link targets.

use url::{ParseError, Url};

/// The site's own domain, taken from the configured base URL.
///
/// A link is internal when its host is this domain or one of its
/// subdomains. Destinations without a scheme resolve against the base URL,
/// so relative paths and bare names such as `foo.jpg` are internal.
#[derive(Clone, Debug)]
pub struct InternalDomain {
    base: Url,
    domain: String,
}

impl InternalDomain {
    /// Parse a base URL (`https://example.com/docs`) or a bare domain name
    /// (`example.com`).
    ///
    /// Returns `None` when no domain name can be extracted, e.g. for IP
    /// addresses.
    pub fn new(base_url: &str) -> Option<Self> {
        let base = match Url::parse(base_url) {
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{base_url}")).ok()?
            }
            parsed => parsed.ok()?,
        };
        let domain = base.domain()?.to_owned();
        Some(Self { base, domain })
    }

    /// Domain name links are matched against.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether `url` stays inside the domain.
    pub fn matches(&self, url: &str) -> bool {
        let Ok(resolved) = Url::parse(url).or_else(|_| self.base.join(url)) else {
            return false;
        };
        resolved.domain().is_some_and(|domain| {
            domain == self.domain
                || domain
                    .strip_suffix(self.domain.as_str())
                    .is_some_and(|sub| sub.ends_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_from_url_or_domain() {
        let domain = InternalDomain::new("https://Shizuoka.jp/docs/").unwrap();
        assert_eq!(domain.domain(), "shizuoka.jp");

        let domain = InternalDomain::new("shizuoka.jp").unwrap();
        assert_eq!(domain.domain(), "shizuoka.jp");

        assert!(InternalDomain::new("127.0.0.1").is_none());
        assert!(InternalDomain::new("http://127.0.0.1:8000").is_none());
    }

    #[test]
    fn test_matches_domain_and_subdomains() {
        let domain = InternalDomain::new("https://shizuoka.jp").unwrap();
        assert!(domain.matches("https://shizuoka.jp"));
        assert!(domain.matches("http://shizuoka.jp/a"));
        assert!(domain.matches("https://fuji.shizuoka.jp/a"));
        assert!(!domain.matches("https://jp"));
        assert!(!domain.matches("https://notshizuoka.jp"));
        assert!(!domain.matches("https://nara.jp/shizuoka.jp"));
    }

    #[test]
    fn test_scheme_less_destinations_are_internal() {
        let domain = InternalDomain::new("https://shizuoka.jp").unwrap();
        assert!(domain.matches("/foo/bar"));
        assert!(domain.matches("foo.jpg"));
        assert!(domain.matches("nara.jp/foo"));
        assert!(domain.matches("#top"));
        assert!(!domain.matches("//nara.jp/x"));
        assert!(!domain.matches("mailto:a@shizuoka.jp"));
    }
}
