//! Display name → URL slug.
//!
//! The site encodes a handful of names irregularly (apostrophes, gender
//! symbols, accents). Those live in an override table checked before the
//! generic rule, and the same table feeds both entry page and artwork URLs.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Returned when a name has no slug-able characters at all.
const EMPTY_SLUG: &str = "unknown";

/// Exact-match overrides, keyed by the lower-cased display name.
#[derive(Debug, Clone)]
pub struct SlugPolicy {
    overrides: Vec<(String, String)>,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        Self::empty()
            .with_override("Farfetch'd", "farfetchd")
            .with_override("Farfetch’d", "farfetchd")
            .with_override("Sirfetch'd", "sirfetchd")
            .with_override("Sirfetch’d", "sirfetchd")
            .with_override("Nidoran♀", "nidoran-f")
            .with_override("Nidoran-F", "nidoran-f")
            .with_override("Nidoran♂", "nidoran-m")
            .with_override("Nidoran-M", "nidoran-m")
            .with_override("Flabébé", "flabebe")
    }
}

impl SlugPolicy {
    /// A policy that only applies the generic rule.
    pub fn empty() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Adds (or replaces) an override. Matching is case-insensitive.
    pub fn with_override(mut self, name: &str, slug: &str) -> Self {
        let key = name.trim().to_lowercase();
        match self.overrides.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = slug.to_string(),
            None => self.overrides.push((key, slug.to_string())),
        }
        self
    }

    pub fn slug(&self, name: &str) -> String {
        let key = name.trim().to_lowercase();
        if let Some((_, slug)) = self.overrides.iter().find(|(k, _)| *k == key) {
            return slug.clone();
        }
        normalize(name)
    }

    /// Entry page URL: `base` followed by the slug, no extension.
    pub fn entry_url(&self, base: &str, name: &str) -> String {
        format!("{base}{}", self.slug(name))
    }

    /// Artwork file name, e.g. `farfetchd.jpg`. `ext` includes the dot.
    pub fn image_file(&self, name: &str, ext: &str) -> String {
        format!("{}{ext}", self.slug(name))
    }

    pub fn image_url(&self, base: &str, name: &str, ext: &str) -> String {
        format!("{base}{}", self.image_file(name, ext))
    }
}

/// Generic rule: lower-case, collapse every run outside `[a-z0-9]` into one
/// hyphen, trim hyphens at both ends. Never returns an empty string.
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = NON_SLUG_RUN.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
