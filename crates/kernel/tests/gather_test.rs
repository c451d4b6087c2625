#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Listing query engine integration tests.
//!
//! Runs the engine over fixture record sets and checks filtering, ordering,
//! and paging end to end.

use serde_json::json;
use vitrina_kernel::gather::{
    FilterPredicate, GatherError, Pagination, QueryDescriptor, ResourceKind, SortKey,
    descriptor_from_query, query,
};
use vitrina_kernel::models::ListingRecord;
use vitrina_test_utils::{COINS, POKEMON, TestListing, fixtures, test_listing};

fn records(listings: &[TestListing]) -> Vec<ListingRecord> {
    listings
        .iter()
        .map(|l| ListingRecord::from_value(l.to_json()).unwrap())
        .collect()
}

fn tokens(records: &[ListingRecord]) -> Vec<&str> {
    records.iter().map(ListingRecord::token).collect()
}

fn descriptor(filters: &[(&str, FilterPredicate)], sort: SortKey, limit: i64, offset: i64) -> QueryDescriptor {
    QueryDescriptor {
        kind: ResourceKind::Assets,
        filters: filters
            .iter()
            .map(|(k, p)| (k.to_string(), p.clone()))
            .collect(),
        sort,
        pagination: Pagination::new(limit, offset).unwrap(),
    }
}

// -------------------------------------------------------------------------
// Filtering
// -------------------------------------------------------------------------

#[test]
fn category_filter_with_min_price_sort() {
    let all = records(&fixtures::mixed_assets());
    let d = descriptor(
        &[("category", FilterPredicate::one_of([POKEMON]))],
        SortKey::MinPrice,
        10,
        0,
    );

    let page = query(&all, &d).unwrap();

    assert_eq!(page.records.len(), 10);
    assert_eq!(page.total_count(), 15);
    assert!(page.records.iter().all(|r| r.category() == Some(POKEMON)));
    let prices: Vec<f64> = page.records.iter().map(|r| r.price().unwrap()).collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "not ascending: {prices:?}");
    assert_eq!(page.records[0].token(), "t18");
}

#[test]
fn blockchain_key_is_an_alias_for_category() {
    let all = records(&fixtures::mixed_assets());
    let by_category = descriptor(
        &[("category", FilterPredicate::one_of([COINS]))],
        SortKey::Newest,
        100,
        0,
    );
    let by_blockchain = descriptor(
        &[("blockchain", FilterPredicate::one_of([COINS]))],
        SortKey::Newest,
        100,
        0,
    );

    assert_eq!(
        query(&all, &by_category).unwrap(),
        query(&all, &by_blockchain).unwrap()
    );
}

#[test]
fn range_excludes_records_without_a_price() {
    let all = records(&[
        test_listing("a").with_price(10.0),
        test_listing("b").with_price(50.0),
        test_listing("c").with_price(100.0),
        test_listing("d").without_price(),
    ]);
    let d = descriptor(
        &[("price", FilterPredicate::range(Some(50.0), None))],
        SortKey::Oldest,
        20,
        0,
    );

    let page = query(&all, &d).unwrap();
    assert_eq!(tokens(&page.records), ["b", "c"]);
    assert_eq!(page.total_count(), 2);
}

#[test]
fn string_prices_are_compared_numerically() {
    let all = records(&[
        test_listing("a").with_price_text("60"),
        test_listing("b").with_price_text(" 9.5 "),
        test_listing("c").with_price_text("n/a"),
    ]);
    let d = descriptor(
        &[("price", FilterPredicate::range(Some(10.0), Some(100.0)))],
        SortKey::Oldest,
        20,
        0,
    );

    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["a"]);
}

#[test]
fn filters_are_a_conjunction() {
    let all = records(&fixtures::coins());
    let d = descriptor(
        &[
            ("category", FilterPredicate::one_of([COINS])),
            ("metal", FilterPredicate::exact("Gold")),
            ("price", FilterPredicate::range(None, Some(200.0))),
        ],
        SortKey::Oldest,
        20,
        0,
    );

    let page = query(&all, &d).unwrap();
    assert_eq!(tokens(&page.records), ["c3"]);

    // Every returned record satisfies each filter on its own.
    for (key, predicate) in &d.filters {
        let single = descriptor(&[(key.as_str(), predicate.clone())], SortKey::Oldest, 20, 0);
        let alone = query(&all, &single).unwrap();
        for record in &page.records {
            assert!(alone.records.contains(record), "{key} rejects {}", record.token());
        }
    }
}

#[test]
fn year_filter_accepts_numeric_strings_in_records() {
    let all = records(&[
        test_listing("a").with_field("year", json!("1890")),
        test_listing("b").with_field("year", json!(1950)),
    ]);
    let d = descriptor(
        &[("year", FilterPredicate::range(None, Some(1900.0)))],
        SortKey::Oldest,
        20,
        0,
    );

    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["a"]);
}

#[test]
fn tag_filters_intersect() {
    let all = records(&[
        test_listing("a").with_field("card_type", json!(["Holo", "Promo"])),
        test_listing("b").with_field("card_type", json!(["Reverse"])),
        test_listing("c").with_field("card_type", json!("Promo")),
        test_listing("d"),
    ]);
    let d = descriptor(
        &[("card_type", FilterPredicate::intersects(["Promo", "Full Art"]))],
        SortKey::Oldest,
        20,
        0,
    );

    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["a", "c"]);
}

#[test]
fn vacuous_filters_match_everything() {
    let all = records(&fixtures::mixed_assets());
    let unfiltered = descriptor(&[], SortKey::Newest, 100, 0);
    let vacuous = descriptor(
        &[
            ("category", FilterPredicate::one_of(Vec::<&str>::new())),
            ("price", FilterPredicate::range(None, None)),
        ],
        SortKey::Newest,
        100,
        0,
    );

    assert_eq!(query(&all, &unfiltered).unwrap(), query(&all, &vacuous).unwrap());
}

#[test]
fn unknown_filter_keys_are_ignored() {
    let all = records(&fixtures::mixed_assets());
    let d = descriptor(
        &[("colour", FilterPredicate::exact("red"))],
        SortKey::Newest,
        100,
        0,
    );

    assert_eq!(query(&all, &d).unwrap().total_count(), 25);
}

#[test]
fn mismatched_predicate_shape_is_rejected() {
    let all = records(&fixtures::coins());
    let d = descriptor(
        &[("metal", FilterPredicate::range(Some(1.0), None))],
        SortKey::Newest,
        20,
        0,
    );

    assert!(matches!(query(&all, &d), Err(GatherError::InvalidArgument(_))));
}

// -------------------------------------------------------------------------
// Pagination
// -------------------------------------------------------------------------

#[test]
fn offset_past_the_end_returns_an_empty_page() {
    let all = records(&fixtures::mixed_assets()[..15]);
    let d = descriptor(&[], SortKey::Newest, 20, 20);

    let page = query(&all, &d).unwrap();
    assert!(page.records.is_empty());
    assert_eq!(page.total_count(), 15);
    assert!(!page.has_more());
}

#[test]
fn zero_limit_is_invalid() {
    let all = records(&fixtures::mixed_assets());
    let mut d = descriptor(&[], SortKey::Newest, 1, 0);
    d.pagination.limit = 0;

    assert!(matches!(query(&all, &d), Err(GatherError::InvalidArgument(_))));
}

#[test]
fn negative_offset_is_invalid() {
    let all = records(&fixtures::mixed_assets());
    let mut d = descriptor(&[], SortKey::Newest, 10, 0);
    d.pagination.offset = -1;

    assert!(matches!(query(&all, &d), Err(GatherError::InvalidArgument(_))));
}

#[test]
fn load_more_pages_concatenate_to_the_full_result() {
    let all = records(&fixtures::mixed_assets());
    let first = descriptor(
        &[("category", FilterPredicate::one_of([POKEMON]))],
        SortKey::MaxPrice,
        4,
        0,
    );
    let mut whole = first.clone();
    whole.pagination.limit = 100;
    let expected = query(&all, &whole).unwrap().records;

    let mut accumulated = Vec::new();
    let mut d = first;
    loop {
        let page = query(&all, &d).unwrap();
        assert_eq!(page.total_count(), 15);
        accumulated.extend(page.records.iter().cloned());
        if !page.has_more() {
            break;
        }
        d = d.next_page();
    }

    assert_eq!(accumulated, expected);
}

// -------------------------------------------------------------------------
// Ordering
// -------------------------------------------------------------------------

#[test]
fn newest_and_oldest_order_by_token() {
    let all = records(&fixtures::mixed_assets());

    let newest = query(&all, &descriptor(&[], SortKey::Newest, 3, 0)).unwrap();
    assert_eq!(tokens(&newest.records), ["t25", "t24", "t23"]);

    let oldest = query(&all, &descriptor(&[], SortKey::Oldest, 3, 0)).unwrap();
    assert_eq!(tokens(&oldest.records), ["t01", "t02", "t03"]);
}

#[test]
fn price_ties_keep_input_order() {
    let all = records(&[
        test_listing("x").with_price(5.0),
        test_listing("a").with_price(1.0),
        test_listing("m").with_price(5.0),
        test_listing("b").with_price(5.0),
    ]);

    let asc = query(&all, &descriptor(&[], SortKey::MinPrice, 10, 0)).unwrap();
    assert_eq!(tokens(&asc.records), ["a", "x", "m", "b"]);

    let desc = query(&all, &descriptor(&[], SortKey::MaxPrice, 10, 0)).unwrap();
    assert_eq!(tokens(&desc.records), ["x", "m", "b", "a"]);
}

#[test]
fn missing_price_sorts_as_zero() {
    let all = records(&[
        test_listing("a").with_price(3.0),
        test_listing("b").without_price(),
        test_listing("c").with_price(1.0),
    ]);

    let asc = query(&all, &descriptor(&[], SortKey::MinPrice, 10, 0)).unwrap();
    assert_eq!(tokens(&asc.records), ["b", "c", "a"]);
}

// -------------------------------------------------------------------------
// Purity
// -------------------------------------------------------------------------

#[test]
fn query_is_idempotent_and_leaves_input_untouched() {
    let all = records(&fixtures::mixed_assets());
    let snapshot = all.clone();
    let d = descriptor(
        &[("price", FilterPredicate::range(Some(5.0), Some(20.0)))],
        SortKey::MinPrice,
        6,
        2,
    );

    let first = query(&all, &d).unwrap();
    let second = query(&all, &d).unwrap();

    assert_eq!(first, second);
    assert_eq!(all, snapshot);
}

// -------------------------------------------------------------------------
// Other resource kinds
// -------------------------------------------------------------------------

#[test]
fn bundles_default_missing_counts_and_prices_to_zero() {
    let all: Vec<ListingRecord> = [
        json!({"token": "b1", "items_count": 3, "price": 40}),
        json!({"token": "b2"}),
    ]
    .into_iter()
    .map(|v| ListingRecord::from_value(v).unwrap())
    .collect();

    let mut d = QueryDescriptor::new(ResourceKind::Bundles);
    d.filters.insert(
        "cached_assets_count".to_string(),
        FilterPredicate::range(None, Some(0.0)),
    );
    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["b2"]);

    let mut d = QueryDescriptor::new(ResourceKind::Bundles);
    d.filters
        .insert("price".to_string(), FilterPredicate::range(None, Some(10.0)));
    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["b2"]);
}

#[test]
fn collections_sort_by_sales_volume() {
    let all: Vec<ListingRecord> = [
        json!({"token": "c1", "sales_volume": 10, "listed_count": 4}),
        json!({"token": "c2", "sales_volume": 900, "supply": 100}),
        json!({"token": "c3", "sales_volume": 55}),
    ]
    .into_iter()
    .map(|v| ListingRecord::from_value(v).unwrap())
    .collect();

    let mut d = QueryDescriptor::new(ResourceKind::Collections);
    d.sort = SortKey::MaxPrice;
    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["c2", "c3", "c1"]);

    d.filters.insert(
        "cached_assets_count".to_string(),
        FilterPredicate::range(Some(1.0), None),
    );
    assert_eq!(tokens(&query(&all, &d).unwrap().records), ["c2", "c1"]);
}

// -------------------------------------------------------------------------
// Query strings
// -------------------------------------------------------------------------

#[test]
fn query_string_descriptor_runs_end_to_end() {
    let all = records(&fixtures::mixed_assets());
    let d = descriptor_from_query(
        ResourceKind::Assets,
        "filters[blockchain][]=Pok%C3%A9mon%20TCG&filters[price][from]=5&sort=min_price&limit=5",
    )
    .unwrap();

    assert_eq!(d.sort, SortKey::MinPrice);
    assert_eq!(d.pagination.limit, 5);

    let page = query(&all, &d).unwrap();
    assert_eq!(page.records.len(), 5);
    assert!(page.records.iter().all(|r| r.category() == Some(POKEMON)));
    assert!(page.records.iter().all(|r| r.price().unwrap() >= 5.0));
}

#[test]
fn non_numeric_range_bound_is_invalid() {
    let result = descriptor_from_query(ResourceKind::Assets, "filters[price][from]=cheap");
    assert!(matches!(result, Err(GatherError::InvalidArgument(_))));
}

#[test]
fn unknown_sort_falls_back_to_newest() {
    let d = descriptor_from_query(ResourceKind::Assets, "sort=popular").unwrap();
    assert_eq!(d.sort, SortKey::Newest);
}
