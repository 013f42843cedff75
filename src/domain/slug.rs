//! Canonical slugs for catalog entries
//!
//! A listing page names each box with a display label such as
//! `"HackerBox #0095 - AI Camera Lab - Build a Vision System"`. Detail pages
//! are addressed by a slug derived from that label, patched by a small table
//! of known vendor inconsistencies.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

/// Length of the `"HackerBox #"` label prefix
pub const BRAND_PREFIX_LEN: usize = 11;

/// Separator between box number, title and subtitle in a display label
pub const TITLE_SEPARATOR: &str = " - ";

/// Leading segment of every canonical slug
pub const SLUG_PREFIX: &str = "hackerbox";

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s-]").expect("static pattern compiles"));

static WELL_FORMED_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static pattern compiles"));

/// URL-safe identifier of a single box, e.g. `hackerbox-0041-circuit-breaker`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSlug(String);

impl CanonicalSlug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase alphanumeric runs joined by single hyphens
    pub fn is_well_formed(&self) -> bool {
        WELL_FORMED_SLUG.is_match(&self.0)
    }

}

impl fmt::Display for CanonicalSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Slugs the storefront spells differently from what its labels imply.
///
/// Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameExceptionTable {
    entries: HashMap<String, String>,
}

impl NameExceptionTable {
    /// The inconsistencies known for the HackerBoxes storefront
    pub const KNOWN_EXCEPTIONS: &'static [(&'static str, &'static str)] = &[
        ("hackerbox-0095-ai-camera-lab", "hackerbox-0095-ai-camera"),
        ("hackerbox-0050-fifty", "hackerbox-0050"),
        ("hackerbox-0039-level-up", "hackerbox-0039-power-up"),
        ("hackerbox-0022-bbc-microbit", "hackerbox-0022-bbc-micro-bit"),
    ];

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Replacement slug for `generated`, or `generated` itself
    pub fn resolve(&self, generated: String) -> String {
        match self.entries.get(&generated) {
            Some(replacement) => replacement.clone(),
            None => generated,
        }
    }
}

impl Default for NameExceptionTable {
    fn default() -> Self {
        Self::from_pairs(Self::KNOWN_EXCEPTIONS.iter().copied())
    }
}

impl From<&BTreeMap<String, String>> for NameExceptionTable {
    fn from(map: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(map.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

/// Map a listing display label to its canonical slug.
///
/// The label must look like `"HackerBox #<number> - <title>[ - <subtitle>]"`.
/// Labels without a `" - "` after the brand prefix are rejected with
/// [`ParsingError::MalformedProductLabel`].
pub fn normalize_product_label(
    label: &str,
    exceptions: &NameExceptionTable,
) -> ParsingResult<CanonicalSlug> {
    let remainder = strip_brand_prefix(label);

    let (number, raw_name) = remainder
        .split_once(TITLE_SEPARATOR)
        .ok_or_else(|| ParsingError::malformed_product_label(label))?;
    let number = number.trim();

    // Subtitles never make it into the slug
    let raw_name = raw_name
        .split_once(TITLE_SEPARATOR)
        .map_or(raw_name, |(title, _)| title);

    let cleaned: Cow<'_, str> = if is_alphanumeric(raw_name) {
        Cow::Borrowed(raw_name)
    } else {
        NON_SLUG_CHARS.replace_all(raw_name, "")
    };

    let name = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    let slug = CanonicalSlug(exceptions.resolve(format!("{SLUG_PREFIX}-{number}-{name}")));
    if !slug.is_well_formed() {
        warn!("Label {:?} produced irregular slug {}", label, slug);
    }
    Ok(slug)
}

fn strip_brand_prefix(label: &str) -> &str {
    label
        .char_indices()
        .nth(BRAND_PREFIX_LEN)
        .map_or("", |(offset, _)| &label[offset..])
}

fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}
