//! Query descriptor construction.
//!
//! Listing pages keep their filter state in the URL, so descriptors usually
//! start life as a query string such as
//! `filters[blockchain][]=Pokémon TCG&filters[price][from]=50&sort=min_price`.
//! Every value there is a string; this module is where strings become
//! numbers, lists become set-membership or intersection predicates, and
//! bound objects become ranges. Nothing downstream coerces again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GatherError;
use super::fields::FieldKind;
use super::types::{
    DEFAULT_LIMIT, FilterPredicate, FilterValue, Pagination, QueryDescriptor, ResourceKind,
    SortKey,
};

/// Bound names accepted for the lower end of a range.
const LOWER_BOUNDS: &[&str] = &["from", "ge", "gte", "min"];
/// Bound names accepted for the upper end of a range.
const UPPER_BOUNDS: &[&str] = &["to", "le", "lte", "max"];

/// Filter value as it arrives from a query string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawFilterValue {
    Text(String),
    List(Vec<String>),
    Bounds(BTreeMap<String, String>),
}

/// Query-string parameters before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQueryParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort: Option<String>,
    pub filters: BTreeMap<String, RawFilterValue>,
}

/// Parse a URL query string into raw listing parameters.
///
/// Filter keys may be wrapped (`filters[metal][]=Gold`) or bare
/// (`metal[]=Gold`). `key[]` and `key[0]` append to a list, `key[from]`
/// sets a bound, and a repeated plain key turns into a list. Empty values
/// are dropped.
pub fn parse_query_string(query: &str) -> Result<ListingQueryParams, GatherError> {
    let mut params = ListingQueryParams::default();

    for (raw_key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let segments = split_key(&raw_key)?;
        let (name, rest) = match segments.as_slice() {
            [wrapper, name, rest @ ..] if *wrapper == "filters" => (*name, rest),
            [name, rest @ ..] => (*name, rest),
            [] => continue,
        };

        if params_slot(&mut params, name, rest, &value) {
            continue;
        }
        if value.is_empty() {
            continue;
        }

        let value = value.into_owned();
        let entry = params.filters.remove(name);
        let merged = match (rest, entry) {
            ([], None) => RawFilterValue::Text(value),
            ([], Some(RawFilterValue::Text(prev))) => RawFilterValue::List(vec![prev, value]),
            ([index], None) if is_list_index(index) => RawFilterValue::List(vec![value]),
            ([index], Some(RawFilterValue::Text(prev))) if is_list_index(index) => {
                RawFilterValue::List(vec![prev, value])
            }
            ([] | [_], Some(RawFilterValue::List(mut items)))
                if rest.first().is_none_or(|i| is_list_index(i)) =>
            {
                items.push(value);
                RawFilterValue::List(items)
            }
            ([bound], None) => RawFilterValue::Bounds(BTreeMap::from([(bound.to_string(), value)])),
            ([bound], Some(RawFilterValue::Bounds(mut bounds))) => {
                bounds.insert(bound.to_string(), value);
                RawFilterValue::Bounds(bounds)
            }
            _ => {
                return Err(GatherError::invalid(format!(
                    "conflicting or nested values for filter '{name}'"
                )));
            }
        };
        params.filters.insert(name.to_string(), merged);
    }

    Ok(params)
}

/// Store top-level paging/sort parameters. Returns true if `name` was one.
fn params_slot(params: &mut ListingQueryParams, name: &str, rest: &[&str], value: &str) -> bool {
    if !rest.is_empty() {
        return false;
    }
    let slot = match name {
        "limit" => &mut params.limit,
        "offset" => &mut params.offset,
        "sort" => &mut params.sort,
        _ => return false,
    };
    if !value.is_empty() {
        *slot = Some(value.to_string());
    }
    true
}

/// Split `filters[price][from]` into `["filters", "price", "from"]`.
fn split_key(key: &str) -> Result<Vec<&str>, GatherError> {
    let malformed = || GatherError::invalid(format!("malformed query key '{key}'"));

    let (head, mut tail) = match key.find('[') {
        Some(i) => key.split_at(i),
        None => return Ok(if key.is_empty() { vec![] } else { vec![key] }),
    };
    if head.is_empty() {
        return Err(malformed());
    }

    let mut segments = vec![head];
    while !tail.is_empty() {
        let inner = tail.strip_prefix('[').ok_or_else(malformed)?;
        let close = inner.find(']').ok_or_else(malformed)?;
        segments.push(&inner[..close]);
        tail = &inner[close + 1..];
    }
    Ok(segments)
}

fn is_list_index(segment: &str) -> bool {
    segment.chars().all(|c| c.is_ascii_digit())
}

/// Builds one immutable [`QueryDescriptor`] for a resource kind.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    descriptor: QueryDescriptor,
    max_limit: i64,
}

impl DescriptorBuilder {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            descriptor: QueryDescriptor::new(kind),
            max_limit: i64::MAX,
        }
    }

    /// Page size used when none is given.
    pub fn default_limit(mut self, limit: i64) -> Self {
        self.descriptor.pagination.limit = limit;
        self
    }

    /// Requested page sizes above this are clamped.
    pub fn max_limit(mut self, max: i64) -> Self {
        self.max_limit = max;
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.descriptor.sort = sort;
        self
    }

    pub fn paginate(mut self, limit: i64, offset: i64) -> Result<Self, GatherError> {
        self.descriptor.pagination = Pagination::new(limit, offset)?;
        Ok(self)
    }

    /// Set a predicate directly, replacing any previous one for `key`.
    pub fn filter(mut self, key: impl Into<String>, predicate: FilterPredicate) -> Self {
        self.descriptor.filters.insert(key.into(), predicate);
        self
    }

    /// Drop any predicate for `key`.
    pub fn clear_filter(mut self, key: &str) -> Self {
        self.descriptor.filters.remove(key);
        self
    }

    /// Normalize a raw filter value by its field's kind and add it.
    ///
    /// Keys the resource kind does not define are dropped.
    pub fn raw_filter(self, key: &str, raw: RawFilterValue) -> Result<Self, GatherError> {
        let Some(spec) = self.descriptor.kind.field_map().get(key) else {
            debug!(key = %key, kind = %self.descriptor.kind, "dropping unknown filter key");
            return Ok(self);
        };
        let predicate = normalize(key, spec.kind, raw)?;
        Ok(self.filter(key, predicate))
    }

    /// Apply every parameter from a parsed query string.
    pub fn params(mut self, params: ListingQueryParams) -> Result<Self, GatherError> {
        if let Some(sort) = params.sort.as_deref() {
            self = self.sort(SortKey::parse_or_default(sort));
        }

        let limit = match params.limit.as_deref() {
            Some(raw) => parse_integer("limit", raw)?,
            None => self.descriptor.pagination.limit,
        };
        let offset = match params.offset.as_deref() {
            Some(raw) => parse_integer("offset", raw)?,
            None => 0,
        };
        self = self.paginate(limit, offset)?;

        for (key, raw) in params.filters {
            self = self.raw_filter(&key, raw)?;
        }
        Ok(self)
    }

    pub fn build(self) -> QueryDescriptor {
        let mut descriptor = self.descriptor;
        if descriptor.pagination.limit > self.max_limit {
            debug!(
                requested = descriptor.pagination.limit,
                max = self.max_limit,
                "clamping page size"
            );
            descriptor.pagination.limit = self.max_limit;
        }
        descriptor
    }
}

/// Build a descriptor straight from a query string.
pub fn descriptor_from_query(
    kind: ResourceKind,
    query: &str,
) -> Result<QueryDescriptor, GatherError> {
    let params = parse_query_string(query)?;
    Ok(DescriptorBuilder::new(kind)
        .default_limit(DEFAULT_LIMIT)
        .params(params)?
        .build())
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, GatherError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GatherError::invalid(format!("{name} must be an integer, got '{raw}'")))
}

fn normalize(key: &str, kind: FieldKind, raw: RawFilterValue) -> Result<FilterPredicate, GatherError> {
    match (kind, raw) {
        (FieldKind::Number, RawFilterValue::Text(v)) => Ok(FilterPredicate::exact(number(key, &v)?)),
        (FieldKind::Number, RawFilterValue::List(vs)) => {
            let values = vs
                .iter()
                .filter(|v| !v.trim().is_empty())
                .map(|v| number(key, v).map(FilterValue::Number))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FilterPredicate::OneOf { values })
        }
        (FieldKind::Number, RawFilterValue::Bounds(bounds)) => range(key, &bounds),
        (FieldKind::Text, RawFilterValue::Text(v)) => Ok(FilterPredicate::exact(v)),
        (FieldKind::Text, RawFilterValue::List(vs)) => Ok(FilterPredicate::one_of(vs)),
        (FieldKind::Tags, RawFilterValue::Text(v)) => Ok(FilterPredicate::intersects([v])),
        (FieldKind::Tags, RawFilterValue::List(vs)) => Ok(FilterPredicate::intersects(vs)),
        (FieldKind::Text | FieldKind::Tags, RawFilterValue::Bounds(_)) => Err(
            GatherError::invalid(format!("filter '{key}' does not accept range bounds")),
        ),
    }
}

fn number(key: &str, raw: &str) -> Result<f64, GatherError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| GatherError::invalid(format!("filter '{key}' expects a number, got '{raw}'")))
}

fn range(key: &str, bounds: &BTreeMap<String, String>) -> Result<FilterPredicate, GatherError> {
    let mut from = None;
    let mut to = None;
    for (name, raw) in bounds {
        let slot = if LOWER_BOUNDS.contains(&name.as_str()) {
            &mut from
        } else if UPPER_BOUNDS.contains(&name.as_str()) {
            &mut to
        } else {
            return Err(GatherError::invalid(format!(
                "unknown range bound '{name}' for filter '{key}'"
            )));
        };
        if raw.trim().is_empty() {
            continue;
        }
        *slot = Some(number(key, raw)?);
    }
    Ok(FilterPredicate::Range { from, to })
}
