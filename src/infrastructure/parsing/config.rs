//! Patterns used to pull data out of storefront pages
//!
//! Every JSON pattern must expose the embedded document as the named group
//! `json`; the description item pattern exposes each bullet as `item`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// `var meta = {"products": ...};` blob on listing pages
    pub listing_meta_pattern: String,

    /// Product template script on detail pages
    pub product_template_pattern: String,

    /// One `<li>` of the product description; `<\/li>` closers are accepted
    pub description_item_pattern: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            listing_meta_pattern: r#"(?s)var meta = (?P<json>\{"products":.+?\});\n"#.to_string(),
            product_template_pattern:
                r#"(?s)ProductJson-product-template">\s+(?P<json>\{.+?\})\n\s+</script>\s"#
                    .to_string(),
            description_item_pattern: r"<li(?:\s[^>\n]*)?>(?P<item>.+?)<\\?/li>".to_string(),
        }
    }
}
