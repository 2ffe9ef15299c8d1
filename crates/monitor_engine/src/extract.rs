use monitor_core::Product;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Anchors whose href mentions a product path.
pub const DEFAULT_SELECTOR: &str = r#"a[href*="/products/"]"#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid css selector {selector:?}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

/// What a selected node contributes to the product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// The node is a link, or contains one. `text` is trimmed; `href` is raw.
    LinkFound { text: String, href: String },
    /// No link, but the node has visible text.
    TextOnly(String),
    Empty,
}

/// Classifies a selected node.
///
/// The node itself counts as the link when it is an `<a>`, with or without
/// `href`. Otherwise the first descendant `<a href>` is used.
pub fn classify(node: ElementRef<'_>) -> Candidate {
    if let Some(link) = find_link(node) {
        return Candidate::LinkFound {
            text: trimmed_text(link),
            href: link.value().attr("href").unwrap_or_default().to_string(),
        };
    }
    let text = trimmed_text(node);
    if text.is_empty() {
        Candidate::Empty
    } else {
        Candidate::TextOnly(text)
    }
}

fn find_link(node: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if is_anchor(&node) {
        return Some(node);
    }
    node.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| is_anchor(element) && element.value().attr("href").is_some())
}

fn is_anchor(element: &ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("a")
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Turns page HTML into products using a CSS selector.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    selector: Selector,
    base_url: Option<Url>,
}

impl ProductExtractor {
    /// Relative hrefs are resolved against `base_url`; an unparsable base
    /// leaves them as written.
    pub fn new(selector: &str, base_url: &str) -> Result<Self, SelectorError> {
        let parsed = Selector::parse(selector).map_err(|err| SelectorError {
            selector: selector.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            selector: parsed,
            base_url: Url::parse(base_url).ok(),
        })
    }

    /// Products in document order; duplicates are kept.
    pub fn extract(&self, html: &str) -> Vec<Product> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .filter_map(|node| self.to_product(classify(node)))
            .collect()
    }

    pub fn to_product(&self, candidate: Candidate) -> Option<Product> {
        match candidate {
            Candidate::LinkFound { text, href } => {
                let url = resolve_href(&href, self.base_url.as_ref());
                let title = if text.is_empty() { url.clone() } else { text };
                Some(Product { title, url })
            }
            Candidate::TextOnly(text) => Some(Product {
                title: text,
                url: String::new(),
            }),
            Candidate::Empty => None,
        }
    }
}

/// Hrefs already starting with `http` are kept verbatim.
fn resolve_href(href: &str, base: Option<&Url>) -> String {
    if href.is_empty() || href.starts_with("http") {
        return href.to_string();
    }
    base.and_then(|base| base.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}
