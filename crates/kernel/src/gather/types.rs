//! Gather query engine types.
//!
//! Provides type definitions for listing queries:
//! - QueryDescriptor: filters, sort key, and pagination window
//! - FilterPredicate: the four per-field matching rules
//! - ResultPage: one page of records plus the total match count

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::GatherError;
use crate::models::ListingRecord;

/// Resource collections served by the record store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Individual items. `items` is accepted as an alias.
    #[default]
    #[serde(alias = "items")]
    Assets,
    Bundles,
    Collections,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Assets, Self::Bundles, Self::Collections];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Bundles => "bundles",
            Self::Collections => "collections",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assets" | "items" => Ok(Self::Assets),
            "bundles" => Ok(Self::Bundles),
            "collections" => Ok(Self::Collections),
            other => Err(GatherError::invalid(format!(
                "unknown resource kind '{other}'"
            ))),
        }
    }
}

/// Scalar filter value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl FilterValue {
    /// Convert to string representation.
    pub fn as_string(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
        }
    }

    /// Convert to a number if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::String(s) => s.trim().parse().ok(),
            FilterValue::Boolean(_) => None,
        }
    }

    /// Empty strings carry no constraint.
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterValue::String(s) if s.is_empty())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

/// Per-field matching rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterPredicate {
    /// Field equals the value.
    Exact { value: FilterValue },
    /// Field equals one of the values.
    OneOf { values: Vec<FilterValue> },
    /// Inclusive numeric bounds; either end may be open.
    Range {
        #[serde(default, deserialize_with = "lenient_bound")]
        from: Option<f64>,
        #[serde(default, deserialize_with = "lenient_bound")]
        to: Option<f64>,
    },
    /// List field shares at least one element with the values.
    Intersects { values: Vec<FilterValue> },
}

impl FilterPredicate {
    pub fn exact(value: impl Into<FilterValue>) -> Self {
        Self::Exact {
            value: value.into(),
        }
    }

    pub fn one_of<V: Into<FilterValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(from: Option<f64>, to: Option<f64>) -> Self {
        Self::Range { from, to }
    }

    pub fn intersects<V: Into<FilterValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Intersects {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this predicate constrains nothing (empty value, empty list,
    /// or a range with no bounds).
    pub fn is_vacuous(&self) -> bool {
        match self {
            Self::Exact { value } => value.is_empty(),
            Self::OneOf { values } | Self::Intersects { values } => {
                values.iter().all(FilterValue::is_empty)
            }
            Self::Range { from, to } => from.is_none() && to.is_none(),
        }
    }

    /// Short name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Exact { .. } => "exact",
            Self::OneOf { .. } => "one_of",
            Self::Range { .. } => "range",
            Self::Intersects { .. } => "intersects",
        }
    }
}

/// Accept a range bound as a JSON number or a numeric string.
fn lenient_bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bound {
        Number(f64),
        Text(String),
    }

    match Option::<Bound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Bound::Number(n)) => Ok(Some(n)),
        Some(Bound::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Bound::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("range bound '{s}' is not a number"))),
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SortKey {
    /// Descending by token.
    #[default]
    Newest,
    /// Ascending by token.
    Oldest,
    /// Ascending by price.
    MinPrice,
    /// Descending by price.
    MaxPrice,
}

impl SortKey {
    /// Parse a sort key, falling back to `Newest` for anything unknown.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "newest" => Self::Newest,
            "oldest" => Self::Oldest,
            "min_price" => Self::MinPrice,
            "max_price" => Self::MaxPrice,
            other => {
                tracing::debug!(sort = %other, "unknown sort key, using newest");
                Self::Newest
            }
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::parse_or_default(&value)
    }
}

/// Offset/limit window.
///
/// Signed so that out-of-range input reaches validation instead of failing
/// deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 20;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Create a validated window.
    pub fn new(limit: i64, offset: i64) -> Result<Self, GatherError> {
        let pagination = Self { limit, offset };
        pagination.validate()?;
        Ok(pagination)
    }

    pub fn validate(&self) -> Result<(), GatherError> {
        if self.limit <= 0 {
            return Err(GatherError::invalid(format!(
                "limit must be positive, got {}",
                self.limit
            )));
        }
        if self.offset < 0 {
            return Err(GatherError::invalid(format!(
                "offset must be non-negative, got {}",
                self.offset
            )));
        }
        Ok(())
    }

    /// The next window of the same size.
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

/// Complete query: which collection, which filters, what order, which page.
///
/// Built once per query and never mutated while the query runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct QueryDescriptor {
    #[serde(default)]
    pub kind: ResourceKind,

    /// Filter key to predicate. Ordered so evaluation is deterministic.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterPredicate>,

    #[serde(default)]
    pub sort: SortKey,

    #[serde(default)]
    pub pagination: Pagination,
}

impl QueryDescriptor {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Same filters and sort, next page.
    pub fn next_page(&self) -> Self {
        Self {
            pagination: self.pagination.next(),
            ..self.clone()
        }
    }
}

/// Pagination echo plus total match count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paginate {
    /// Records matching the filters before paging.
    pub count: usize,
    pub limit: usize,
    pub offset: usize,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultPage {
    pub records: Vec<ListingRecord>,
    pub paginate: Paginate,
}

impl ResultPage {
    /// Create an empty page.
    pub fn empty(limit: usize, offset: usize) -> Self {
        Self {
            records: Vec::new(),
            paginate: Paginate {
                count: 0,
                limit,
                offset,
            },
        }
    }

    /// Total records matching the filters.
    pub fn total_count(&self) -> usize {
        self.paginate.count
    }

    /// Whether a further page exists after this one.
    pub fn has_more(&self) -> bool {
        self.paginate.offset + self.records.len() < self.paginate.count
    }
}
