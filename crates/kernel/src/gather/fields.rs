//! Per-resource field accessor maps.
//!
//! Each resource kind stores the same concepts under slightly different
//! names (a bundle's asset count is `items_count`, a collection's falls back
//! through three fields). These tables map a filter key to where the value
//! lives on the record, what kind of value it is, and what to assume when it
//! is missing, so one predicate routine serves all kinds.

use serde_json::Value;

use super::types::ResourceKind;
use crate::models::{ListingRecord, coerce_number};

/// Value kind of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string compared by equality.
    Text,
    /// Number; accepts numeric strings on both sides.
    Number,
    /// List of strings.
    Tags,
}

/// How multiple source fields combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// Use the first source that is present.
    First,
    /// The predicate passes if any present source passes.
    Any,
}

/// Where a filter key's value lives on a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub sources: &'static [&'static str],
    pub resolve: Resolve,
    /// Numeric value assumed when every source is missing.
    pub default: Option<f64>,
}

impl FieldSpec {
    const fn text(sources: &'static [&'static str]) -> Self {
        Self {
            kind: FieldKind::Text,
            sources,
            resolve: Resolve::First,
            default: None,
        }
    }

    const fn numeric(sources: &'static [&'static str]) -> Self {
        Self {
            kind: FieldKind::Number,
            sources,
            resolve: Resolve::First,
            default: None,
        }
    }

    const fn tags(sources: &'static [&'static str]) -> Self {
        Self {
            kind: FieldKind::Tags,
            sources,
            resolve: Resolve::First,
            default: None,
        }
    }

    const fn any_of(self) -> Self {
        Self {
            resolve: Resolve::Any,
            ..self
        }
    }

    const fn or_default(self, default: f64) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Values this field contributes for a record. Empty when every source
    /// is missing.
    pub fn values<'r>(&self, record: &'r ListingRecord) -> Vec<&'r Value> {
        let mut present = self.sources.iter().filter_map(|key| record.get(key));
        match self.resolve {
            Resolve::First => present.next().into_iter().collect(),
            Resolve::Any => present.collect(),
        }
    }

    /// Numeric value of this field, with the field default applied when
    /// missing. `None` when missing without a default, or when the present
    /// value is not numeric.
    pub fn number(&self, record: &ListingRecord) -> Option<f64> {
        match self.values(record).first() {
            Some(value) => coerce_number(value),
            None => self.default,
        }
    }
}

/// Field table for one resource kind.
#[derive(Debug)]
pub struct FieldMap {
    pub kind: ResourceKind,
    fields: &'static [(&'static str, FieldSpec)],
    /// Field the price sorts order by.
    pub sort_price: FieldSpec,
    /// Field the newest/oldest sorts order by.
    pub sort_token: &'static str,
}

impl FieldMap {
    /// Look up a filter key.
    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, spec)| spec)
    }

    /// Filter keys this kind understands.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }
}

const CATEGORY: FieldSpec = FieldSpec::text(&["category", "blockchain"]);
const SLUG: FieldSpec = FieldSpec::text(&["slug", "token"]).any_of();

static ASSET_FIELDS: FieldMap = FieldMap {
    kind: ResourceKind::Assets,
    fields: &[
        ("category", CATEGORY),
        ("blockchain", CATEGORY),
        ("slug", SLUG),
        ("subcategory", FieldSpec::text(&["subcategory"])),
        ("billing_type", FieldSpec::text(&["billing_type"])),
        ("price", FieldSpec::numeric(&["price"])),
        ("year", FieldSpec::numeric(&["year"])),
        ("grade", FieldSpec::numeric(&["grade"])),
        ("authenticator", FieldSpec::text(&["authenticator"])),
        ("card_type", FieldSpec::tags(&["card_type"])),
        ("item_type", FieldSpec::tags(&["item_type"])),
        ("set", FieldSpec::text(&["set"])),
        ("rarity", FieldSpec::text(&["rarity"])),
        ("metal", FieldSpec::text(&["metal"])),
        ("coin_type", FieldSpec::text(&["coin_type"])),
        ("country", FieldSpec::text(&["country"])),
    ],
    sort_price: FieldSpec::numeric(&["price"]),
    sort_token: "token",
};

const BUNDLE_ITEMS: FieldSpec = FieldSpec::numeric(&["items_count"]).or_default(0.0);

static BUNDLE_FIELDS: FieldMap = FieldMap {
    kind: ResourceKind::Bundles,
    fields: &[
        ("category", CATEGORY),
        ("blockchain", CATEGORY),
        ("slug", SLUG),
        ("cached_assets_count", BUNDLE_ITEMS),
        ("items_count", BUNDLE_ITEMS),
        ("price", FieldSpec::numeric(&["price"]).or_default(0.0)),
    ],
    sort_price: FieldSpec::numeric(&["price"]),
    sort_token: "token",
};

static COLLECTION_FIELDS: FieldMap = FieldMap {
    kind: ResourceKind::Collections,
    fields: &[
        ("category", CATEGORY),
        ("blockchain", CATEGORY),
        ("slug", SLUG),
        (
            "cached_assets_count",
            FieldSpec::numeric(&["cached_assets_count", "listed_count", "supply"]).or_default(0.0),
        ),
    ],
    sort_price: FieldSpec::numeric(&["sales_volume"]),
    sort_token: "token",
};

impl ResourceKind {
    /// Field table for this kind.
    pub fn field_map(self) -> &'static FieldMap {
        match self {
            ResourceKind::Assets => &ASSET_FIELDS,
            ResourceKind::Bundles => &BUNDLE_FIELDS,
            ResourceKind::Collections => &COLLECTION_FIELDS,
        }
    }
}
