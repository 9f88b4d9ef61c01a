//! List query model for article collections.

use super::article::PRODUCT_TAG;
use serde::{Deserialize, Serialize};

/// Ordering of a listing by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// Stable short name used in cache fingerprints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewestFirst => "newest",
            Self::OldestFirst => "oldest",
        }
    }
}

/// Filter, sort, and limit for an article listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleQuery {
    /// Only articles carrying this tag.
    pub tag: Option<String>,
    /// Include archived articles (admin listings).
    pub include_archived: bool,
    /// Ordering by creation time.
    pub sort: SortOrder,
    /// Maximum number of entries.
    pub limit: Option<usize>,
}

impl ArticleQuery {
    /// The public product listing: non-archived articles tagged `product`,
    /// newest first.
    #[must_use]
    pub fn products() -> Self {
        Self {
            tag: Some(PRODUCT_TAG.to_string()),
            ..Self::default()
        }
    }

    /// The admin listing: everything, newest first.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            include_archived: true,
            ..Self::default()
        }
    }

    /// Deterministic signature of this query, stable across processes.
    ///
    /// Tags are lower-cased and characters outside `[a-z0-9_-]` are
    /// percent-encoded so that the fingerprint never contains the key
    /// separator or glob metacharacters.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let tag = self
            .tag
            .as_deref()
            .map_or_else(|| "~".to_string(), |t| encode_component(&t.to_lowercase()));
        let limit = self.limit.map_or_else(|| "all".to_string(), |l| l.to_string());
        format!(
            "tag={}|archived={}|sort={}|limit={}",
            tag,
            u8::from(self.include_archived),
            self.sort.as_str(),
            limit
        )
    }
}

fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
