//! Listing query engine.
//!
//! Filters, sorts, and pages an in-memory record set:
//! - every active filter must hold (conjunction)
//! - sorting is stable, so ties keep their input order
//! - the total count is taken before paging
//!
//! The engine never mutates its input and holds no state between calls.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::trace;

use super::error::GatherError;
use super::fields::{FieldKind, FieldMap, FieldSpec};
use super::types::{FilterPredicate, FilterValue, Paginate, QueryDescriptor, ResultPage, SortKey};
use crate::models::{ListingRecord, coerce_number};

/// A filter that survived validation, bound to its field.
struct ActiveFilter<'q> {
    key: &'q str,
    spec: &'static FieldSpec,
    predicate: &'q FilterPredicate,
}

/// Run a query over `records`.
///
/// The descriptor is validated in full before any record is looked at.
pub fn query(
    records: &[ListingRecord],
    descriptor: &QueryDescriptor,
) -> Result<ResultPage, GatherError> {
    let fields = descriptor.kind.field_map();
    let filters = validate(descriptor, fields)?;

    // Validated above: limit > 0 and offset >= 0.
    let limit = usize::try_from(descriptor.pagination.limit).unwrap_or(usize::MAX);
    let offset = usize::try_from(descriptor.pagination.offset).unwrap_or(usize::MAX);

    let mut matched: Vec<&ListingRecord> = records
        .iter()
        .filter(|record| filters.iter().all(|f| matches(f, record)))
        .collect();

    sort_records(&mut matched, descriptor.sort, fields);

    let count = matched.len();
    let page: Vec<ListingRecord> = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    Ok(ResultPage {
        records: page,
        paginate: Paginate {
            count,
            limit,
            offset,
        },
    })
}

/// Check pagination and every predicate against its field kind.
///
/// Unknown keys and vacuous predicates are dropped here rather than
/// rejected.
fn validate<'q>(
    descriptor: &'q QueryDescriptor,
    fields: &'static FieldMap,
) -> Result<Vec<ActiveFilter<'q>>, GatherError> {
    descriptor.pagination.validate()?;

    let mut active = Vec::with_capacity(descriptor.filters.len());
    for (key, predicate) in &descriptor.filters {
        let Some(spec) = fields.get(key) else {
            trace!(key = %key, kind = %descriptor.kind, "ignoring unknown filter key");
            continue;
        };
        check_shape(key, spec, predicate)?;
        if predicate.is_vacuous() {
            continue;
        }
        active.push(ActiveFilter {
            key: key.as_str(),
            spec,
            predicate,
        });
    }
    Ok(active)
}

fn check_shape(key: &str, spec: &FieldSpec, predicate: &FilterPredicate) -> Result<(), GatherError> {
    let compatible = match (predicate, spec.kind) {
        (FilterPredicate::Range { from, to }, FieldKind::Number) => {
            if from.is_some_and(|v| !v.is_finite()) || to.is_some_and(|v| !v.is_finite()) {
                return Err(GatherError::invalid(format!(
                    "range bounds for '{key}' must be finite numbers"
                )));
            }
            true
        }
        (FilterPredicate::Range { .. }, _) => false,
        (FilterPredicate::Intersects { .. }, FieldKind::Tags) => true,
        (FilterPredicate::Intersects { .. }, _) => false,
        (FilterPredicate::Exact { .. } | FilterPredicate::OneOf { .. }, FieldKind::Tags) => false,
        (FilterPredicate::Exact { .. } | FilterPredicate::OneOf { .. }, _) => true,
    };
    if compatible {
        Ok(())
    } else {
        Err(GatherError::invalid(format!(
            "filter '{key}' does not accept a {} predicate",
            predicate.shape()
        )))
    }
}

fn matches(filter: &ActiveFilter<'_>, record: &ListingRecord) -> bool {
    let values = filter.spec.values(record);
    if values.is_empty() && filter.spec.default.is_none() {
        trace!(
            token = %record.token(),
            field = %filter.key,
            "record missing filtered field"
        );
    }

    match filter.predicate {
        FilterPredicate::Exact { value } => {
            any_value(filter.spec, &values, |v| scalar_eq(filter.spec.kind, v, value))
        }
        FilterPredicate::OneOf { values: wanted } => any_value(filter.spec, &values, |v| {
            wanted.iter().any(|w| scalar_eq(filter.spec.kind, v, w))
        }),
        FilterPredicate::Range { from, to } => {
            let Some(n) = filter.spec.number(record) else {
                return false;
            };
            from.is_none_or(|lo| n >= lo) && to.is_none_or(|hi| n <= hi)
        }
        FilterPredicate::Intersects { values: wanted } => values.iter().any(|v| {
            list_items(v).any(|item| wanted.iter().any(|w| scalar_eq(FieldKind::Text, item, w)))
        }),
    }
}

/// Apply `test` to each present value; fall back to the field default when
/// nothing is present.
fn any_value(spec: &FieldSpec, values: &[&Value], test: impl Fn(&Value) -> bool) -> bool {
    if values.is_empty() {
        return spec.default.is_some_and(|d| test(&Value::from(d)));
    }
    values.iter().any(|v| test(v))
}

/// Strict equality, except that numeric fields compare by numeric value.
fn scalar_eq(kind: FieldKind, value: &Value, wanted: &FilterValue) -> bool {
    if kind == FieldKind::Number {
        return match (coerce_number(value), wanted.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    match (value, wanted) {
        (Value::String(a), FilterValue::String(b)) => a == b,
        (Value::Bool(a), FilterValue::Boolean(b)) => a == b,
        (Value::Number(a), FilterValue::Number(b)) => a.as_f64() == Some(*b),
        _ => false,
    }
}

/// Elements of a list value; a lone scalar counts as a one-element list.
fn list_items(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}

fn sort_records(records: &mut [&ListingRecord], sort: SortKey, fields: &FieldMap) {
    let token = |r: &ListingRecord| -> String {
        r.get(fields.sort_token)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let price = |r: &ListingRecord| fields.sort_price.number(r).unwrap_or(0.0);

    // `sort_by` is stable; equal keys keep input order.
    match sort {
        SortKey::Newest => records.sort_by_cached_key(|r| std::cmp::Reverse(token(r))),
        SortKey::Oldest => records.sort_by_cached_key(|r| token(r)),
        SortKey::MinPrice => records.sort_by(|a, b| cmp_f64(price(a), price(b))),
        SortKey::MaxPrice => records.sort_by(|a, b| cmp_f64(price(b), price(a))),
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gather::types::{Pagination, ResourceKind};
    use serde_json::json;

    fn record(value: Value) -> ListingRecord {
        ListingRecord::from_value(value).unwrap()
    }

    fn tokens(page: &ResultPage) -> Vec<&str> {
        page.records.iter().map(ListingRecord::token).collect()
    }

    fn descriptor(filters: &[(&str, FilterPredicate)]) -> QueryDescriptor {
        QueryDescriptor {
            filters: filters
                .iter()
                .map(|(k, p)| (k.to_string(), p.clone()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn range_fails_closed_on_missing_price() {
        let records = vec![
            record(json!({"token": "a", "price": 10})),
            record(json!({"token": "b", "price": 50})),
            record(json!({"token": "c", "price": 100})),
            record(json!({"token": "d", "price": null})),
        ];
        let mut d = descriptor(&[("price", FilterPredicate::range(Some(50.0), None))]);
        d.sort = SortKey::Oldest;

        let page = query(&records, &d).unwrap();
        assert_eq!(tokens(&page), vec!["b", "c"]);
        assert_eq!(page.total_count(), 2);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let records = vec![
            record(json!({"token": "a", "year": 1999})),
            record(json!({"token": "b", "year": "2000"})),
            record(json!({"token": "c", "year": 2001})),
            record(json!({"token": "d", "year": "unknown"})),
        ];
        let d = descriptor(&[("year", FilterPredicate::range(Some(1999.0), Some(2000.0)))]);
        let page = query(&records, &d).unwrap();
        assert_eq!(tokens(&page), vec!["b", "a"]);
    }

    #[test]
    fn limit_zero_is_invalid() {
        let mut d = QueryDescriptor::default();
        d.pagination = Pagination { limit: 0, offset: 0 };
        let err = query(&[], &d).unwrap_err();
        assert!(matches!(err, GatherError::InvalidArgument(_)));
    }

    #[test]
    fn negative_offset_is_invalid() {
        let mut d = QueryDescriptor::default();
        d.pagination = Pagination {
            limit: 10,
            offset: -3,
        };
        assert!(query(&[], &d).is_err());
    }

    #[test]
    fn incompatible_shape_is_invalid() {
        let d = descriptor(&[("country", FilterPredicate::range(Some(1.0), None))]);
        assert!(query(&[], &d).is_err());

        let d = descriptor(&[("card_type", FilterPredicate::exact("Holo"))]);
        assert!(query(&[], &d).is_err());

        let d = descriptor(&[("price", FilterPredicate::range(Some(f64::NAN), None))]);
        assert!(query(&[], &d).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let records = vec![record(json!({"token": "a"}))];
        let d = descriptor(&[("wingspan", FilterPredicate::exact("wide"))]);
        assert_eq!(query(&records, &d).unwrap().total_count(), 1);
    }

    #[test]
    fn slug_matches_token_too() {
        let records = vec![
            record(json!({"token": "tok-1", "slug": "pikachu"})),
            record(json!({"token": "tok-2", "slug": "charizard"})),
        ];
        let d = descriptor(&[("slug", FilterPredicate::exact("tok-2"))]);
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["tok-2"]);

        let d = descriptor(&[("slug", FilterPredicate::exact("pikachu"))]);
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["tok-1"]);
    }

    #[test]
    fn intersection_over_tag_lists() {
        let records = vec![
            record(json!({"token": "a", "card_type": ["Holo", "Promo"]})),
            record(json!({"token": "b", "card_type": ["Shadowless"]})),
            record(json!({"token": "c", "card_type": "Promo"})),
            record(json!({"token": "d"})),
        ];
        let mut d = descriptor(&[(
            "card_type",
            FilterPredicate::intersects(["Promo", "1st Edition"]),
        )]);
        d.sort = SortKey::Oldest;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn set_membership_on_category_alias() {
        let records = vec![
            record(json!({"token": "a", "blockchain": "Pokémon TCG"})),
            record(json!({"token": "b", "category": "Monedas Antiguas"})),
            record(json!({"token": "c", "blockchain": "Otros"})),
        ];
        let mut d = descriptor(&[(
            "blockchain",
            FilterPredicate::one_of(["Pokémon TCG", "Monedas Antiguas"]),
        )]);
        d.sort = SortKey::Oldest;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn empty_list_is_no_constraint() {
        let records = vec![record(json!({"token": "a"})), record(json!({"token": "b"}))];
        let d = descriptor(&[("metal", FilterPredicate::one_of(Vec::<String>::new()))]);
        assert_eq!(query(&records, &d).unwrap().total_count(), 2);
    }

    #[test]
    fn exact_on_numeric_field_compares_numbers() {
        let records = vec![
            record(json!({"token": "a", "grade": 10})),
            record(json!({"token": "b", "grade": "9"})),
        ];
        let d = descriptor(&[("grade", FilterPredicate::exact(9.0))]);
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["b"]);
    }

    #[test]
    fn price_sorts_treat_missing_as_zero() {
        let records = vec![
            record(json!({"token": "a", "price": 30})),
            record(json!({"token": "b"})),
            record(json!({"token": "c", "price": 10})),
            record(json!({"token": "d", "price": "abc"})),
        ];
        let mut d = QueryDescriptor::default();
        d.sort = SortKey::MinPrice;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["b", "d", "c", "a"]);

        d.sort = SortKey::MaxPrice;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn token_sorts() {
        let records = vec![
            record(json!({"token": "b"})),
            record(json!({"token": "c"})),
            record(json!({"token": "a"})),
        ];
        let mut d = QueryDescriptor::default();
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["c", "b", "a"]);
        d.sort = SortKey::Oldest;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn bundles_filter_on_items_count() {
        let records = vec![
            record(json!({"token": "a", "items_count": 3})),
            record(json!({"token": "b", "items_count": 12})),
            record(json!({"token": "c"})),
        ];
        let mut d = QueryDescriptor::new(ResourceKind::Bundles);
        d.filters.insert(
            "cached_assets_count".into(),
            FilterPredicate::range(None, Some(5.0)),
        );
        d.sort = SortKey::Oldest;
        assert_eq!(tokens(&query(&records, &d).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn offset_past_end_is_empty_with_count() {
        let records: Vec<_> = (0..15)
            .map(|i| record(json!({"token": format!("t{i:02}")})))
            .collect();
        let mut d = QueryDescriptor::default();
        d.pagination = Pagination {
            limit: 20,
            offset: 20,
        };
        let page = query(&records, &d).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count(), 15);
        assert_eq!(page.paginate.limit, 20);
        assert_eq!(page.paginate.offset, 20);
    }
}
