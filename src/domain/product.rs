use serde::{Deserialize, Serialize};

use super::slug::CanonicalSlug;

/// Everything scraped for one box from its detail page.
///
/// The table and JSON shapes are projections of this record, so both always
/// carry the same bullets in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub slug: CanonicalSlug,
    /// Detail page the record was scraped from
    pub detail_url: String,
    /// Absolute URL of the featured image
    pub image_url: String,
    /// Link to the stored copy of the image, relative to the rendered output
    pub picture_link: String,
    /// Inner text of each `<li>` in the description, in document order
    pub bullets: Vec<String>,
}

/// Row shaped for the markdown table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// `[slug](detail_url)`
    pub name: String,
    /// `![slug](picture_link)`
    pub picture: String,
    /// `<ul><li>…</li>…</ul>`
    pub contents: String,
}

/// Row shaped for the JSON export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRow {
    pub name: CanonicalSlug,
    pub picture: String,
    pub contents: Vec<String>,
}

impl TableRow {
    pub const COLUMNS: [&'static str; 3] = ["name", "picture", "contents"];

    /// Cell value by column name
    pub fn cell(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "picture" => Some(&self.picture),
            "contents" => Some(&self.contents),
            _ => None,
        }
    }
}

impl ItemRecord {
    pub fn picture_markdown(&self) -> String {
        format!("![{}]({})", self.slug, self.picture_link)
    }

    pub fn to_table_row(&self) -> TableRow {
        let items: String = self
            .bullets
            .iter()
            .map(|bullet| format!("<li>{bullet}</li>"))
            .collect();

        TableRow {
            name: format!("[{}]({})", self.slug, self.detail_url),
            picture: self.picture_markdown(),
            contents: format!("<ul>{items}</ul>"),
        }
    }

    pub fn to_json_row(&self) -> JsonRow {
        JsonRow {
            name: self.slug.clone(),
            picture: self.picture_markdown(),
            contents: self.bullets.clone(),
        }
    }

    pub fn into_rows(self) -> (TableRow, JsonRow) {
        (self.to_table_row(), self.to_json_row())
    }
}
