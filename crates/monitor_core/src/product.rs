use serde::{Deserialize, Serialize};

/// A listing scraped from the monitored page.
///
/// `url` is absolute, or empty when the listing had no hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Product {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Identity used for dedup and diff: both fields trimmed.
    pub fn key(&self) -> ProductKey {
        ProductKey {
            title: self.title.trim().to_string(),
            url: self.url.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductKey {
    pub title: String,
    pub url: String,
}

impl ProductKey {
    /// The ("", "") key never identifies a real listing.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.url.is_empty()
    }
}

impl From<ProductKey> for Product {
    fn from(key: ProductKey) -> Self {
        Self {
            title: key.title,
            url: key.url,
        }
    }
}
