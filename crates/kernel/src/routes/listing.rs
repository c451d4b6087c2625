//! Listing API routes.
//!
//! Raw collections, queried pages, category pages, and detail lookups.

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;

use crate::catalog::category;
use crate::error::{AppError, AppResult};
use crate::gather::{FilterPredicate, QueryDescriptor, ResourceKind, ResultPage, parse_query_string};
use crate::models::{AuctionStatus, ListingRecord};
use crate::state::AppState;

/// Create the listing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assets", get(list_assets))
        .route("/api/items", get(list_assets))
        .route("/api/bundles", get(list_bundles))
        .route("/api/collections", get(list_collections))
        .route("/api/listings/{kind}", get(query_listings).post(query_listings_json))
        .route("/api/items/{category}", get(query_category))
        .route("/api/items/{category}/{slug}", get(get_category_item))
        .route("/api/item/{slug}", get(get_item))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

/// Category reference embedded in detail responses.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub slug: &'static str,
    pub label: Option<&'static str>,
}

/// Auction countdown embedded in detail responses.
#[derive(Debug, Serialize)]
pub struct AuctionView {
    #[serde(flatten)]
    pub status: AuctionStatus,
    /// Detail-page label, e.g. `3h 5m 10s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Card label, e.g. `3h 5m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_label: Option<String>,
}

impl From<AuctionStatus> for AuctionView {
    fn from(status: AuctionStatus) -> Self {
        let (label, compact_label) = match &status {
            AuctionStatus::Open { remaining, .. } => (
                Some(remaining.detailed_label()),
                Some(remaining.compact_label()),
            ),
            AuctionStatus::Ended { .. } => (
                Some("Subasta finalizada".to_string()),
                Some("Finalizada".to_string()),
            ),
            AuctionStatus::NotAuction | AuctionStatus::Unscheduled => (None, None),
        };
        Self {
            status,
            label,
            compact_label,
        }
    }
}

/// Single listing with derived display data.
#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    pub record: ListingRecord,
    pub category: CategoryRef,
    pub auction: AuctionView,
}

impl ListingDetailResponse {
    fn new(record: ListingRecord) -> Self {
        let slug = category::slug_for(record.category());
        let auction = record.auction_status(Utc::now()).into();
        Self {
            category: CategoryRef {
                slug,
                label: category::label_for(slug),
            },
            auction,
            record,
        }
    }
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_all(state: &AppState, kind: ResourceKind) -> AppResult<Json<Vec<ListingRecord>>> {
    let records = state.gather().fetch_all(kind).await?;
    Ok(Json(records.to_vec()))
}

async fn list_assets(State(state): State<AppState>) -> AppResult<Json<Vec<ListingRecord>>> {
    list_all(&state, ResourceKind::Assets).await
}

async fn list_bundles(State(state): State<AppState>) -> AppResult<Json<Vec<ListingRecord>>> {
    list_all(&state, ResourceKind::Bundles).await
}

async fn list_collections(State(state): State<AppState>) -> AppResult<Json<Vec<ListingRecord>>> {
    list_all(&state, ResourceKind::Collections).await
}

fn parse_kind(raw: &str) -> AppResult<ResourceKind> {
    raw.parse().map_err(|_| AppError::NotFound)
}

/// Query a collection with descriptor state from the query string.
async fn query_listings(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ResultPage>> {
    let kind = parse_kind(&kind)?;
    let descriptor = state
        .gather()
        .descriptor_from_query(kind, query.as_deref().unwrap_or_default())?;
    Ok(Json(state.gather().execute(&descriptor).await?))
}

/// Query a collection with a JSON descriptor body.
///
/// The path decides the resource kind; any `kind` in the body is ignored.
/// A body that does not decode is a 400, not axum's default 422.
async fn query_listings_json(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<QueryDescriptor>, JsonRejection>,
) -> AppResult<Json<ResultPage>> {
    let kind = parse_kind(&kind)?;
    let Json(descriptor) = body?;
    let descriptor = state.gather().clamp(QueryDescriptor {
        kind,
        ..descriptor
    });
    Ok(Json(state.gather().execute(&descriptor).await?))
}

/// Asset query scoped to one category page.
///
/// The category comes from the path and replaces any category filter in
/// the query string.
async fn query_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ResultPage>> {
    let scope = category::by_slug(&slug).ok_or(AppError::NotFound)?;
    let gather = state.gather();

    let params = parse_query_string(query.as_deref().unwrap_or_default())?;
    let descriptor = gather
        .builder(ResourceKind::Assets)
        .params(params)?
        // `blockchain` aliases `category`; the insert below replaces the other.
        .clear_filter("blockchain")
        .filter("category", FilterPredicate::one_of([scope.value]))
        .build();

    Ok(Json(gather.execute(&descriptor).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ListingDetailResponse>> {
    let record = state.gather().find_asset(&slug, None).await?;
    Ok(Json(ListingDetailResponse::new(record)))
}

async fn get_category_item(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> AppResult<Json<ListingDetailResponse>> {
    let record = state.gather().find_asset(&slug, Some(category.as_str())).await?;
    Ok(Json(ListingDetailResponse::new(record)))
}
