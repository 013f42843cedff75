//! Catalog report and markdown rendering

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{ItemRecord, JsonRow, TableRow};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Missing header for: {row} (row {row_index} has no '{column}' column)")]
    MissingColumn {
        row_index: usize,
        column: String,
        row: String,
    },
}

/// A row whose cells can be looked up by column name
pub trait MarkdownRow: fmt::Debug {
    fn cell(&self, column: &str) -> Option<&str>;
}

impl MarkdownRow for TableRow {
    fn cell(&self, column: &str) -> Option<&str> {
        TableRow::cell(self, column)
    }
}

impl MarkdownRow for BTreeMap<String, String> {
    fn cell(&self, column: &str) -> Option<&str> {
        self.get(column).map(String::as_str)
    }
}

/// A validated markdown table.
///
/// Every row is checked against the headers on construction, so a table
/// that exists can always be rendered in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new<H, R>(headers: &[H], rows: &[R]) -> Result<Self, RenderError>
    where
        H: AsRef<str>,
        R: MarkdownRow,
    {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();

        let rows = rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                headers
                    .iter()
                    .map(|column| {
                        row.cell(column).map(str::to_string).ok_or_else(|| {
                            RenderError::MissingColumn {
                                row_index,
                                column: column.clone(),
                                row: format!("{row:?}"),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Header, separator and data lines, each newline-terminated.
    /// Cell values are written verbatim.
    pub fn generate(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, self.headers.iter().map(String::as_str));

        let separators: Vec<String> = self
            .headers
            .iter()
            .map(|h| "-".repeat(h.chars().count() + 2))
            .collect();
        out.push('|');
        for dashes in &separators {
            out.push(' ');
            out.push_str(dashes);
            out.push_str(" |");
        }
        out.push('\n');

        for row in &self.rows {
            push_line(&mut out, row.iter().map(String::as_str));
        }
        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out.push('\n');
}

impl fmt::Display for MarkdownTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generate())
    }
}

/// Everything collected in one run, in listing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub table_rows: Vec<TableRow>,
    pub json_rows: Vec<JsonRow>,
}

impl CatalogReport {
    pub fn push(&mut self, record: ItemRecord) {
        let (table_row, json_row) = record.into_rows();
        self.table_rows.push(table_row);
        self.json_rows.push(json_row);
    }

    pub fn to_markdown(&self) -> Result<String, RenderError> {
        Ok(MarkdownTable::new(&TableRow::COLUMNS, &self.table_rows)?.generate())
    }

    /// JSON rows with two-space indentation
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.json_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalSlug;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn renders_header_separator_and_rows() {
        let table = MarkdownTable::new(&["a", "b"], &[row(&[("a", "x"), ("b", "y")])]).unwrap();
        assert_eq!(table.generate(), "| a | b |\n| --- | --- |\n| x | y |\n");
    }

    #[test]
    fn separator_tracks_header_width() {
        let table = MarkdownTable::new(&["name", "picture"], &Vec::<TableRow>::new()).unwrap();
        assert_eq!(table.to_string(), "| name | picture |\n| ------ | --------- |\n");
    }

    #[test]
    fn values_are_written_verbatim() {
        let table =
            MarkdownTable::new(&["contents"], &[row(&[("contents", "<ul><li>a|b</li></ul>")])])
                .unwrap();
        assert!(table.generate().ends_with("| <ul><li>a|b</li></ul> |\n"));
    }

    #[test]
    fn missing_column_names_the_row() {
        let rows = [row(&[("a", "1"), ("b", "2")]), row(&[("a", "3")])];
        let err = MarkdownTable::new(&["a", "b"], &rows).unwrap_err();

        let RenderError::MissingColumn {
            row_index,
            column,
            row,
        } = &err;
        assert_eq!(*row_index, 1);
        assert_eq!(column, "b");
        assert!(row.contains("\"a\": \"3\""));
        assert!(err.to_string().starts_with("Missing header for: "));
    }

    #[test]
    fn report_keeps_projections_aligned() {
        let mut report = CatalogReport::default();
        for slug in ["hackerbox-0001-arduino", "hackerbox-0002-wifi"] {
            report.push(ItemRecord {
                slug: CanonicalSlug::new(slug),
                detail_url: format!("https://shop.test/products/{slug}"),
                image_url: format!("https://cdn.test/{slug}.jpg"),
                picture_link: format!("assets/{slug}.png"),
                bullets: vec!["Cable".to_string()],
            });
        }

        assert_eq!(report.table_rows.len(), 2);
        assert_eq!(report.json_rows[1].name.as_str(), "hackerbox-0002-wifi");

        let markdown = report.to_markdown().unwrap();
        assert_eq!(markdown.lines().count(), 4);
        assert!(markdown.starts_with("| name | picture | contents |\n"));

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\n  {\n    \"name\": \"hackerbox-0001-arduino\""));
    }
}
