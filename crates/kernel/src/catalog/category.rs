//! Collectible categories.
//!
//! A category has three spellings: the value stored on records
//! (`Pokémon TCG`), the URL slug (`cartas`), and the display label.

use serde::Serialize;

/// A browsable category.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Category {
    /// Value stored in the record's category field.
    pub value: &'static str,
    /// URL path segment.
    pub slug: &'static str,
    pub label: &'static str,
}

/// Slug for records whose category is missing or unrecognized.
pub const FALLBACK_SLUG: &str = "otros";

pub const CATEGORIES: &[Category] = &[
    Category {
        value: "Pokémon TCG",
        slug: "cartas",
        label: "Cartas Pokémon",
    },
    Category {
        value: "Monedas Antiguas",
        slug: "numismatica",
        label: "Numismática",
    },
    Category {
        value: "Otros",
        slug: "otros",
        label: "Otros coleccionables",
    },
];

/// Old slugs still found in links, mapped to the current slug.
const LEGACY_SLUGS: &[(&str, &str)] = &[("pokemon", "cartas"), ("monedas", "numismatica")];

fn canonical_slug(slug: &str) -> &str {
    LEGACY_SLUGS
        .iter()
        .find(|(legacy, _)| *legacy == slug)
        .map(|(_, current)| *current)
        .unwrap_or(slug)
}

/// Look up a category by URL slug, accepting legacy slugs.
pub fn by_slug(slug: &str) -> Option<&'static Category> {
    let slug = canonical_slug(slug);
    CATEGORIES.iter().find(|c| c.slug == slug)
}

/// Look up a category by its stored value.
pub fn by_value(value: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.value == value)
}

/// URL slug for a stored category value; unknown or missing → `otros`.
pub fn slug_for(value: Option<&str>) -> &'static str {
    value
        .and_then(by_value)
        .map(|c| c.slug)
        .unwrap_or(FALLBACK_SLUG)
}

/// Stored value for a URL slug.
pub fn value_for(slug: &str) -> Option<&'static str> {
    by_slug(slug).map(|c| c.value)
}

/// Display label for a URL slug.
pub fn label_for(slug: &str) -> Option<&'static str> {
    by_slug(slug).map(|c| c.label)
}
