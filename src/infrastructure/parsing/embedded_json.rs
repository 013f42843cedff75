//! Regex strategy for locating embedded JSON

use regex::Regex;
use tracing::debug;

use super::{EmbeddedJsonExtractor, ParsingError, ParsingResult};

/// Name of the capture group holding the JSON text
pub const JSON_GROUP: &str = "json";

/// Extracts the `json` capture group of the first match of a pattern
#[derive(Debug, Clone)]
pub struct RegexJsonExtractor {
    marker: String,
    pattern: Regex,
}

impl RegexJsonExtractor {
    pub fn new(marker: &str, pattern: &str) -> ParsingResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ParsingError::ConfigurationError {
            message: format!("invalid {marker} pattern: {e}"),
            field: marker.to_string(),
        })?;

        if !pattern.capture_names().flatten().any(|name| name == JSON_GROUP) {
            return Err(ParsingError::ConfigurationError {
                message: format!("{marker} pattern has no `{JSON_GROUP}` capture group"),
                field: marker.to_string(),
            });
        }

        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }
}

impl EmbeddedJsonExtractor for RegexJsonExtractor {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn extract<'a>(&self, body: &'a str) -> Option<&'a str> {
        let found = self
            .pattern
            .captures(body)
            .and_then(|caps| caps.name(JSON_GROUP))
            .map(|m| m.as_str())
            .filter(|json| !json.is_empty());

        debug!(
            "{} json {} in {} byte body",
            self.marker,
            if found.is_some() { "located" } else { "not found" },
            body.len()
        );
        found
    }
}
