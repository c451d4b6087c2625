//! Listing record model.
//!
//! A listing is a sellable record (item, bundle, or collection) as stored in
//! the record store. Records are kept as the raw JSON object so that callers
//! get back exactly what the store holds; typed accessors read the handful of
//! well-known fields the query engine and detail pages need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::auction::{AuctionStatus, TimeRemaining};

/// How a listing is sold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    /// Buy-now at a fixed price.
    FixedPrice,
    /// Time-boxed bidding.
    Auction,
}

impl BillingType {
    /// Parse the wire value (`fixed_price` / `auction`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed_price" => Some(Self::FixedPrice),
            "auction" => Some(Self::Auction),
            _ => None,
        }
    }
}

/// A listing record, kept verbatim as a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: Map<String, Value>,
}

impl ListingRecord {
    /// Wrap a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from an arbitrary JSON value.
    ///
    /// Returns `None` when the value is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Raw field access. JSON `null` is reported as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Stable unique id. Missing or non-string tokens read as empty.
    pub fn token(&self) -> &str {
        self.str_field("token").unwrap_or_default()
    }

    /// Human-readable id. May collide across categories.
    pub fn slug(&self) -> &str {
        self.str_field("slug").unwrap_or_default()
    }

    /// Collectible family. Older records carry it under `blockchain`.
    pub fn category(&self) -> Option<&str> {
        self.str_field("category")
            .or_else(|| self.str_field("blockchain"))
    }

    /// Listing price, if present and numeric.
    pub fn price(&self) -> Option<f64> {
        self.get("price").and_then(coerce_number)
    }

    pub fn billing_type(&self) -> Option<BillingType> {
        self.str_field("billing_type").and_then(BillingType::parse)
    }

    pub fn is_auction(&self) -> bool {
        self.billing_type() == Some(BillingType::Auction)
    }

    /// Auction end time. Only meaningful for auction listings; always `None`
    /// for anything else, even if the field is set.
    pub fn auction_ends_at(&self) -> Option<DateTime<Utc>> {
        if !self.is_auction() {
            return None;
        }
        self.str_field("auction_ends_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Auction state at `now`.
    pub fn auction_status(&self, now: DateTime<Utc>) -> AuctionStatus {
        if !self.is_auction() {
            return AuctionStatus::NotAuction;
        }
        match self.auction_ends_at() {
            None => AuctionStatus::Unscheduled,
            Some(ends_at) => match TimeRemaining::until(ends_at, now) {
                Some(remaining) => AuctionStatus::Open { ends_at, remaining },
                None => AuctionStatus::Ended { ends_at },
            },
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ListingRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Read a JSON value as a finite number.
///
/// Numbers pass through; strings are parsed after trimming. Anything else,
/// and any NaN/infinite result, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
