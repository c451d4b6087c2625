//! Vitrina test utilities.
//!
//! Helpers for integration testing: listing fixtures, record store
//! documents, and assertion utilities for query results.

use serde_json::{Map, Value as JsonValue, json};

pub const POKEMON: &str = "Pokémon TCG";
pub const COINS: &str = "Monedas Antiguas";

/// Create a test listing with default values.
///
/// Defaults to a fixed-price Pokémon card priced at 10.
pub fn test_listing(token: &str) -> TestListing {
    TestListing {
        token: token.to_string(),
        slug: format!("item-{token}"),
        name: format!("Item {token}"),
        category: Some(POKEMON.to_string()),
        price: Some(json!(10)),
        billing_type: "fixed_price".to_string(),
        fields: Map::new(),
    }
}

/// A test listing builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestListing {
    pub token: String,
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<JsonValue>,
    pub billing_type: String,
    pub fields: Map<String, JsonValue>,
}

impl TestListing {
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Drop the category field entirely.
    pub fn without_category(mut self) -> Self {
        self.category = None;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(json!(price));
        self
    }

    /// Price stored as a string, the way scraped listings often arrive.
    pub fn with_price_text(mut self, price: &str) -> Self {
        self.price = Some(json!(price));
        self
    }

    pub fn without_price(mut self) -> Self {
        self.price = None;
        self
    }

    /// Mark as an auction ending at `ends_at` (RFC 3339).
    pub fn auction(mut self, ends_at: &str) -> Self {
        self.billing_type = "auction".to_string();
        self.fields
            .insert("auction_ends_at".to_string(), json!(ends_at));
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Render the listing as a store record.
    pub fn to_json(&self) -> JsonValue {
        let mut record = Map::new();
        record.insert("token".to_string(), json!(self.token));
        record.insert("slug".to_string(), json!(self.slug));
        record.insert("name".to_string(), json!(self.name));
        record.insert("billing_type".to_string(), json!(self.billing_type));
        if let Some(category) = &self.category {
            record.insert("category".to_string(), json!(category));
        }
        if let Some(price) = &self.price {
            record.insert("price".to_string(), price.clone());
        }
        for (key, value) in &self.fields {
            record.insert(key.clone(), value.clone());
        }
        JsonValue::Object(record)
    }
}

/// Record sets used across integration tests.
pub mod fixtures {
    use super::{COINS, POKEMON, TestListing, test_listing};

    /// 25 assets, 15 Pokémon cards and 10 coins, tokens `t01`..`t25`.
    ///
    /// Prices are a permutation of 1..=25 that does not follow token order.
    pub fn mixed_assets() -> Vec<TestListing> {
        (1..=25u32)
            .map(|n| {
                let price = f64::from((n * 7) % 25 + 1);
                let listing = test_listing(&format!("t{n:02}")).with_price(price);
                if matches!(n % 5, 1..=3) {
                    listing.with_category(POKEMON)
                } else {
                    listing.with_category(COINS)
                }
            })
            .collect()
    }

    /// Four coins with metal and year fields.
    pub fn coins() -> Vec<TestListing> {
        [
            ("c1", "Gold", 1890, 300.0),
            ("c2", "Silver", 1920, 45.0),
            ("c3", "Gold", 1950, 120.0),
            ("c4", "Bronze", 1800, 15.0),
        ]
        .into_iter()
        .map(|(token, metal, year, price)| {
            test_listing(token)
                .with_category(COINS)
                .with_price(price)
                .with_field("metal", serde_json::json!(metal))
                .with_field("year", serde_json::json!(year))
        })
        .collect()
    }
}

/// Record store document builders.
pub mod documents {
    use serde_json::{Value, json};

    use super::TestListing;

    /// Build a store document with the given assets and no bundles or
    /// collections.
    pub fn with_assets(assets: &[TestListing]) -> Value {
        document(assets, Vec::new(), Vec::new())
    }

    /// Build a full store document.
    pub fn document(assets: &[TestListing], bundles: Vec<Value>, collections: Vec<Value>) -> Value {
        json!({
            "items": assets.iter().map(TestListing::to_json).collect::<Vec<_>>(),
            "bundles": bundles,
            "collections": collections,
        })
    }

    /// A bundle record with an item count.
    pub fn bundle(token: &str, category: &str, items_count: Option<u64>) -> Value {
        let mut bundle = json!({
            "token": token,
            "slug": format!("bundle-{token}"),
            "category": category,
            "price": 50,
        });
        if let (Some(count), Some(obj)) = (items_count, bundle.as_object_mut()) {
            obj.insert("items_count".to_string(), json!(count));
        }
        bundle
    }

    /// A collection record with a listed count and sales volume.
    pub fn collection(token: &str, listed_count: u64, sales_volume: f64) -> Value {
        json!({
            "token": token,
            "slug": format!("collection-{token}"),
            "category": "Pokémon TCG",
            "listed_count": listed_count,
            "sales_volume": sales_volume,
        })
    }
}

/// Assertion helpers for JSON results.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Tokens of the records in a result page, in order.
    pub fn page_tokens(page: &Value) -> Vec<String> {
        page["records"]
            .as_array()
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| r["token"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Assert that a result page holds exactly `expected` tokens, in order.
    pub fn tokens_eq(page: &Value, expected: &[&str]) {
        let actual = page_tokens(page);
        assert_eq!(actual, expected, "token mismatch in page: {page}");
    }
}
