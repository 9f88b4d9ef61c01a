//! Cache key builder for consistent key naming.

use folio_core::ArticleQuery;
use std::fmt::Display;

/// Builds every key the application reads or writes, under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    /// Creates a key builder with the given namespace prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Single article, by id or by slug.
    #[must_use]
    pub fn article_detail(&self, id_or_slug: impl Display) -> String {
        format!("{}:articles:detail:{}", self.prefix, id_or_slug)
    }

    /// Article listing for a filter signature.
    #[must_use]
    pub fn article_list(&self, query: &ArticleQuery) -> String {
        format!("{}:articles:list:{}", self.prefix, query.fingerprint())
    }

    /// The public product listing.
    #[must_use]
    pub fn product_list(&self) -> String {
        format!("{}:articles:list", self.prefix)
    }

    /// Pattern matching every filtered article listing.
    #[must_use]
    pub fn article_list_pattern(&self) -> String {
        format!("{}:articles:list:*", self.prefix)
    }

    /// Public banner listing.
    #[must_use]
    pub fn banner_list(&self) -> String {
        format!("{}:banners:list", self.prefix)
    }

    /// Failed login counter for an identity from one client address.
    #[must_use]
    pub fn login_attempts(&self, identity: &str, client_address: &str) -> String {
        format!(
            "{}:login:ratelimit:{}:{}",
            self.prefix,
            identity.trim().to_lowercase(),
            client_address
        )
    }

    /// Admin setup attempt counter for one client address.
    #[must_use]
    pub fn admin_setup_attempts(&self, client_address: &str) -> String {
        format!("{}:admin:setup:attempts:{}", self.prefix, client_address)
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new("folio")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ArticleId;

    #[test]
    fn test_article_detail_keys() {
        let keys = CacheKeys::new("site");
        let id = ArticleId::new();
        assert_eq!(
            keys.article_detail(id),
            format!("site:articles:detail:{}", id)
        );
        assert_eq!(keys.article_detail("hello-world"), "site:articles:detail:hello-world");
    }

    #[test]
    fn test_list_keys() {
        let keys = CacheKeys::default();
        assert_eq!(keys.product_list(), "folio:articles:list");
        assert_eq!(
            keys.article_list(&ArticleQuery::admin()),
            "folio:articles:list:tag=~|archived=1|sort=newest|limit=all"
        );
        assert_eq!(keys.article_list_pattern(), "folio:articles:list:*");
        assert_eq!(keys.banner_list(), "folio:banners:list");
    }

    #[test]
    fn test_product_key_is_outside_list_pattern() {
        let keys = CacheKeys::default();
        assert!(!keys.product_list().starts_with(&keys.article_list_pattern().replace('*', "")));
    }

    #[test]
    fn test_login_attempts_key_lowercases_identity() {
        let keys = CacheKeys::default();
        assert_eq!(
            keys.login_attempts(" Admin@Example.COM ", "203.0.113.7"),
            "folio:login:ratelimit:admin@example.com:203.0.113.7"
        );
    }

    #[test]
    fn test_admin_setup_key() {
        let keys = CacheKeys::default();
        assert_eq!(
            keys.admin_setup_attempts("unknown-ip"),
            "folio:admin:setup:attempts:unknown-ip"
        );
    }
}
